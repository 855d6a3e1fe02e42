mod categories;
mod dishes;
mod import;
mod public;
use std::sync::Arc;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info_span};

use crate::server::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Импорт больших таблиц может идти дольше обычного запроса
const REQUEST_TIMEOUT_SECS: u64 = 60;

pub(super) fn init(state: Arc<AppState>, origin: &Option<String>) -> Router {
    let x_request_id = axum::http::HeaderName::from_static(REQUEST_ID_HEADER);
    let request_id_middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                match request.headers().get(REQUEST_ID_HEADER) {
                    Some(request_id) => info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = ?request_id,
                    ),
                    None => {
                        error!("could not extract request_id");
                        info_span!("http_request")
                    }
                }
            }),
        )
        .layer(PropagateRequestIdLayer::new(x_request_id));

    let timeout_layer = TimeoutLayer::with_status_code(
        axum::http::StatusCode::REQUEST_TIMEOUT,
        std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS),
    );

    // панель администратора может жить на отдельном домене
    let cors_layer = origin
        .as_ref()
        .and_then(|o| o.parse::<axum::http::HeaderValue>().ok())
        .map(|hv| CorsLayer::new().allow_origin(hv).allow_methods(Any))
        .unwrap_or_else(|| CorsLayer::new().allow_origin(Any).allow_methods(Any));

    let api = Router::new()
        .merge(public::routes())
        .merge(categories::routes(state.clone()))
        .merge(dishes::routes(state.clone()))
        .merge(import::routes(state));
    Router::new()
        .nest("/api/v1", api)
        .layer(CatchPanicLayer::new())
        .layer(request_id_middleware)
        .layer(timeout_layer)
        .layer(cors_layer)
        .layer(CompressionLayer::new())
        .fallback(fallback_handler)
}

async fn fallback_handler(uri: axum::http::Uri) -> (axum::http::StatusCode, String) {
    (
        axum::http::StatusCode::NOT_FOUND,
        format!("No route for {uri}"),
    )
}


#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request};

    use super::test_helpers::TestApp;

    #[tokio::test]
    async fn test_fallback() {
        let app = TestApp::new();
        let response = app
            .send(Request::get("/no/such/route").body(Body::empty()).unwrap())
            .await;
        assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_request_id_propagated() {
        let app = TestApp::new();
        let response = app
            .send(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await;
        assert!(response.headers().contains_key("x-request-id"));
    }
}
