use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};
use serde::Deserialize;

use crate::{
    AppResult,
    models::{Dish, DishCategory, ImageSource},
    resources::DEFAULT_LOCALE,
    server::AppState,
};

pub(super) fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category)
                .put(update_category)
                .delete(remove_category),
        )
        .route("/categories/{id}/number", put(set_category_number))
        .route("/categories/by-name/{name}/dishes", get(dishes_by_category_name))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListQuery {
    sort_by_number: bool,
    top_level: bool,
}

#[derive(Debug, Deserialize)]
struct CategoryPayload {
    name: String,
    /// `0` или отсутствие означает категорию верхнего уровня
    #[serde(default)]
    parent_id: Option<i32>,
    #[serde(default)]
    image: Option<ImageSource>,
}

#[derive(Debug, Deserialize)]
pub(super) struct NumberPayload {
    pub(super) number: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DishesQuery {
    sort_by_number: bool,
    include_hidden: bool,
    locale: Option<String>,
}

async fn list_categories(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<DishCategory>>> {
    let service = &state.catalog_service;
    let categories = if query.top_level {
        service.list_top_level_categories(query.sort_by_number).await?
    } else {
        service.list_categories(query.sort_by_number).await?
    };
    Ok(Json(categories))
}

async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CategoryPayload>,
) -> AppResult<(StatusCode, Json<DishCategory>)> {
    let category = state
        .catalog_service
        .create_category(&payload.name, payload.parent_id, payload.image)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<DishCategory>> {
    Ok(Json(state.catalog_service.get_category(id).await?))
}

async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<CategoryPayload>,
) -> AppResult<Json<DishCategory>> {
    let category = state
        .catalog_service
        .update_category(id, &payload.name, payload.parent_id, payload.image)
        .await?;
    Ok(Json(category))
}

async fn remove_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<DishCategory>> {
    Ok(Json(state.catalog_service.remove_category(id).await?))
}

async fn set_category_number(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<NumberPayload>,
) -> AppResult<Json<DishCategory>> {
    let category = state
        .catalog_service
        .set_category_number(id, payload.number)
        .await?;
    Ok(Json(category))
}

async fn dishes_by_category_name(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<DishesQuery>,
) -> AppResult<Json<Vec<Dish>>> {
    let locale = query.locale.as_deref().unwrap_or(DEFAULT_LOCALE);
    let dishes = state
        .catalog_service
        .get_dishes_by_category_name(&name, locale, query.sort_by_number, query.include_hidden)
        .await?;
    Ok(Json(dishes))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::super::test_helpers::TestApp;

    #[tokio::test]
    async fn test_create_and_get_category() {
        let app = TestApp::new();
        let (status, created) = app
            .json(
                "POST",
                "/api/v1/categories",
                Some(json!({"name": "Food", "parent_id": 0})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["parent_id"], serde_json::Value::Null);

        let id = created["id"].as_i64().unwrap();
        let (status, fetched) = app
            .json("GET", &format!("/api/v1/categories/{id}"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["name"], "Food");
    }

    #[tokio::test]
    async fn test_missing_category() {
        let app = TestApp::new();
        let (status, body) = app.json("GET", "/api/v1/categories/42", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "fail");

        let (status, _) = app.json("DELETE", "/api/v1/categories/42", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_blank_category_name() {
        let app = TestApp::new();
        let (status, body) = app
            .json("POST", "/api/v1/categories", Some(json!({"name": " "})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "fail");
    }

    #[tokio::test]
    async fn test_top_level_and_number() {
        let app = TestApp::new();
        let (_, soups) = app
            .json("POST", "/api/v1/categories", Some(json!({"name": "Soups"})))
            .await;
        let (_, drinks) = app
            .json("POST", "/api/v1/categories", Some(json!({"name": "Drinks"})))
            .await;
        app.json(
            "POST",
            "/api/v1/categories",
            Some(json!({"name": "Cold", "parent_id": soups["id"]})),
        )
        .await;
        let (status, _) = app
            .json(
                "PUT",
                &format!("/api/v1/categories/{}/number", drinks["id"]),
                Some(json!({"number": 5})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (_, top) = app
            .json("GET", "/api/v1/categories?top_level=true&sort_by_number=true", None)
            .await;
        let names: Vec<_> = top
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["Soups", "Drinks"]);

        let (_, all) = app.json("GET", "/api/v1/categories", None).await;
        assert_eq!(all.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_dishes_by_unknown_category_name() {
        let app = TestApp::new();
        let (status, body) = app
            .json("GET", "/api/v1/categories/by-name/NoSuchCategory/dishes", None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Category 'NoSuchCategory' not found");
    }

    #[tokio::test]
    async fn test_delete_category_cascades() {
        let app = TestApp::new();
        let (_, food) = app
            .json("POST", "/api/v1/categories", Some(json!({"name": "Food"})))
            .await;
        app.json(
            "POST",
            "/api/v1/dishes",
            Some(json!({"name": "Plov", "price": 25000.0, "category_id": food["id"]})),
        )
        .await;
        let (status, _) = app
            .json("DELETE", &format!("/api/v1/categories/{}", food["id"]), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(app.storage.dishes().is_empty());
    }
}
