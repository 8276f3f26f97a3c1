use std::{path::Path, sync::Arc};

use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tokio_util::task::TaskTracker;
use tracing::Level;

use common::types::Health;
use service::profile::{repository::ProfileRepository, switcher::ProfileSwitcher};

use crate::errors::ApiError;
use crate::shutdown::ShutdownHandle;

pub mod extract;
pub mod profiles;

/// Shared handler state. Every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<dyn ProfileRepository>,
    pub switcher: Arc<dyn ProfileSwitcher>,
    pub shutdown: ShutdownHandle,
    /// Background switch tasks, drained after the listener stops.
    pub tasks: TaskTracker,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn invalid_method() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Build the full application router: profile API plus the static UI under `/web/`.
pub fn build_router(state: AppState, web_dir: impl AsRef<Path>, cors: CorsLayer) -> Router {
    let static_dir = ServeDir::new(web_dir.as_ref());

    let api = Router::new()
        .route("/list", get(profiles::list_profiles).fallback(invalid_method))
        .route("/add", post(profiles::add_profile).fallback(invalid_method))
        .route("/update", post(profiles::update_profile).fallback(invalid_method))
        .route("/switch", post(profiles::switch_profile).fallback(invalid_method))
        .route("/close", get(profiles::close).fallback(invalid_method))
        .route("/health", get(health));

    Router::new()
        .nest_service("/web", static_dir)
        .merge(api)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
