use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppResult,
    models::{CartItem, Dish, DishForm, ImageSource},
    server::AppState,
};

use super::categories::NumberPayload;

pub(super) fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/dishes", get(list_dishes).post(create_dish))
        .route(
            "/dishes/{id}",
            get(get_dish).put(update_dish).delete(remove_dish),
        )
        .route("/dishes/{id}/toggle-hidden", post(toggle_hidden))
        .route("/dishes/{id}/number", put(set_dish_number))
        .route("/dishes/{id}/cart-items", get(list_cart_items))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct DishPayload {
    #[serde(flatten)]
    form: DishForm,
    #[serde(default)]
    image: Option<ImageSource>,
    /// Удалить текущее изображение; важнее нового `image`
    #[serde(default)]
    delete_image: bool,
}

/// Все блюда, отсортированные по описанию
async fn list_dishes(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Dish>>> {
    Ok(Json(state.catalog_service.list_dishes_by_description().await?))
}

async fn create_dish(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DishPayload>,
) -> AppResult<(StatusCode, Json<Dish>)> {
    let dish = state
        .catalog_service
        .create_dish(payload.form, payload.image)
        .await?;
    Ok((StatusCode::CREATED, Json(dish)))
}

async fn get_dish(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<Dish>> {
    Ok(Json(state.catalog_service.get_dish(id).await?))
}

async fn update_dish(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<DishPayload>,
) -> AppResult<Json<Dish>> {
    let dish = state
        .catalog_service
        .update_dish(id, payload.form, payload.image, payload.delete_image)
        .await?;
    Ok(Json(dish))
}

async fn remove_dish(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<Dish>> {
    Ok(Json(state.catalog_service.remove_dish(id).await?))
}

async fn toggle_hidden(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<Value>> {
    let is_hidden = state.catalog_service.toggle_hidden(id).await?;
    Ok(Json(json!({ "id": id, "is_hidden": is_hidden })))
}

async fn set_dish_number(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<NumberPayload>,
) -> AppResult<Json<Dish>> {
    let dish = state
        .catalog_service
        .set_dish_number(id, payload.number)
        .await?;
    Ok(Json(dish))
}

async fn list_cart_items(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<CartItem>>> {
    Ok(Json(state.catalog_service.list_cart_items_for_dish(id).await?))
}
