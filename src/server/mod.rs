//! HTTP API панели администратора

mod routes;
use std::sync::Arc;

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use serde::Serialize;

use crate::{
    AppError, AppResult,
    services::{CatalogService, ExcelImporter},
    settings::ServerSettings,
};

pub struct Server {
    addr: String,
    origin: Option<String>,
    state: Arc<AppState>,
}
impl Server {
    pub fn new(settings: ServerSettings, state: Arc<AppState>) -> Self {
        Self {
            addr: settings.server_address(),
            origin: settings.origin,
            state,
        }
    }
    pub async fn start(&self) -> AppResult<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        tracing::info!("Server listening on {addr}", addr = self.addr);
        let app = routes::init(self.state.clone(), &self.origin);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        tracing::info!("Server shutting down gracefully");
        Ok(())
    }
}

#[derive(Clone)]
pub struct AppState {
    pub catalog_service: Arc<CatalogService>,
    pub importer: Arc<ExcelImporter>,
}
impl AppState {
    pub fn new(catalog_service: Arc<CatalogService>, importer: Arc<ExcelImporter>) -> Self {
        Self {
            catalog_service,
            importer,
        }
    }
}

async fn shutdown_signal() {
    use tokio::signal;
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::EntryNotFound | AppError::CategoryNotFound(_) => StatusCode::NOT_FOUND,
            AppError::EntryAlreadyExists => StatusCode::CONFLICT,
            AppError::InvalidInput(_)
            | AppError::ValidationErrors(_)
            | AppError::SpreadsheetError(_)
            | AppError::BuilderError(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("{self}");
        }
        let body = ErrorResponse {
            status: "fail",
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
