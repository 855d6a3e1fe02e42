use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    routing::post,
};
use bytes::Bytes;

use crate::{AppError, AppResult, server::AppState, services::ImportReport};

/// Книги с каталогом больше стандартного лимита axum в 2 МБ
const MAX_WORKBOOK_SIZE: usize = 32 * 1024 * 1024;

pub(super) fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/import", post(import_workbook))
        .layer(DefaultBodyLimit::max(MAX_WORKBOOK_SIZE))
        .with_state(state)
}

/// Принимает книгу `.xlsx`, `.xls` или `.ods` в теле запроса
async fn import_workbook(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> AppResult<Json<ImportReport>> {
    if body.is_empty() {
        return Err(AppError::InvalidInput("empty workbook".to_string()));
    }
    Ok(Json(state.importer.import_bytes(body).await?))
}
