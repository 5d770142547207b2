//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the scene provider and trajectory sink endpoints under a
//! single Axum router. Reference images are served as static files from the
//! data directory at `/images`.

pub mod scenes;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Full HTTP surface of the annotation backend.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let images = ServeDir::new(state.config.data_dir.clone());

    Router::new()
        .route("/scenes", get(scenes::list_scenes))
        .route("/scene/{id}", get(scenes::get_scene))
        .route("/save_trajectory/{id}", post(scenes::save_trajectory))
        .route("/healthz", get(healthz))
        .nest_service("/images", images)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
