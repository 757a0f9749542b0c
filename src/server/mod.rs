//! HTTP surface
//!
//! The router is plain glue: every review endpoint delegates to the
//! scheduler, `/ws` hands the connection to the realtime relay, and the
//! bundled web client is served from the configured static directory.

pub mod phrases;
pub mod relay;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::config::ServerConfig;
use crate::srs::{ReviewScheduler, SchedulerError};
use crate::store::StoreError;

#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<ReviewScheduler>,
    pub config: Arc<ServerConfig>,
}

/// Scheduler failure mapped onto an HTTP response.
pub struct ApiError(SchedulerError);

impl From<SchedulerError> for ApiError {
    fn from(err: SchedulerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SchedulerError::InvalidLimit(_) => StatusCode::BAD_REQUEST,
            SchedulerError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            SchedulerError::Store(err) => {
                log::error!("store failure: {err}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(phrases::root))
        .route("/phrases/due", get(phrases::due_phrases))
        .route("/phrases/{id}/review", post(phrases::review_phrase))
        .route("/phrases/stats", get(phrases::phrase_stats))
        .route("/daily_phrases", get(phrases::daily_phrases))
        .route("/phrase_response", post(phrases::phrase_response))
        .route("/system_prompt", get(phrases::system_prompt))
        .route("/ws", get(relay::ws_handler));

    if state.config.static_dir.is_dir() {
        router = router.nest_service("/static", ServeDir::new(&state.config.static_dir));
    } else {
        log::debug!(
            "static dir {} not found, skipping client asset routes",
            state.config.static_dir.display()
        );
    }

    router.layer(CorsLayer::permissive()).with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn serve(config: ServerConfig, scheduler: Arc<ReviewScheduler>) -> std::io::Result<()> {
    let state = AppState { scheduler, config: Arc::new(config) };
    let addr = state.config.bind_addr();
    let app = router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("failed to install ctrl-c handler: {err}");
        return;
    }
    log::info!("shutdown signal received");
}
