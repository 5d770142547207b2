//! Scene provider and trajectory sink routes.

#[cfg(test)]
#[path = "scenes_test.rs"]
mod scenes_test;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use canvas::engine::SceneBundle;
use canvas::trajectory::SavePayload;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::services::scenes::{self, SceneStoreError};
use crate::services::trajectory::{self, TrajectoryStoreError};
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct SceneListResponse {
    pub scene_ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveAck {
    pub message: String,
}

/// `GET /scenes`: sorted ids of every recorded scene.
pub async fn list_scenes(State(state): State<AppState>) -> Result<Json<SceneListResponse>, StatusCode> {
    let scene_ids = scenes::list_scene_ids(&state.config).await.map_err(scene_error_to_status)?;
    Ok(Json(SceneListResponse { scene_ids }))
}

/// `GET /scene/:id`: objects, image handle, lid map and initial relations.
pub async fn get_scene(
    State(state): State<AppState>,
    Path(scene_id): Path<String>,
) -> Result<Json<SceneBundle>, StatusCode> {
    let bundle = scenes::load_bundle(&state.config, &scene_id)
        .await
        .map_err(scene_error_to_status)?;
    Ok(Json(bundle))
}

/// `POST /save_trajectory/:id`: persist actions and relations for a scene.
pub async fn save_trajectory(
    State(state): State<AppState>,
    Path(scene_id): Path<String>,
    body: Bytes,
) -> Result<Json<SaveAck>, StatusCode> {
    let payload: SavePayload = serde_json::from_slice(&body).map_err(|e| {
        warn!(%scene_id, error = %e, "rejecting malformed trajectory body");
        StatusCode::BAD_REQUEST
    })?;

    let _guard = state.save_lock.lock().await;
    let saved = trajectory::save(&state.config, &scene_id, &payload)
        .await
        .map_err(trajectory_error_to_status)?;
    debug!(%scene_id, problem = %saved.problem.display(), "problem file written");

    Ok(Json(SaveAck { message: "Trajectory saved successfully".to_owned() }))
}

pub(crate) fn scene_error_to_status(err: SceneStoreError) -> StatusCode {
    match err {
        SceneStoreError::NotFound(_) => StatusCode::NOT_FOUND,
        SceneStoreError::InvalidId(_) => StatusCode::BAD_REQUEST,
        SceneStoreError::Io(e) => {
            error!(error = %e, "scene store read failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
        SceneStoreError::Malformed(e) => {
            error!(error = %e, "scene store data malformed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub(crate) fn trajectory_error_to_status(err: TrajectoryStoreError) -> StatusCode {
    match err {
        TrajectoryStoreError::Scene(e) => scene_error_to_status(e),
        TrajectoryStoreError::Io(e) => {
            error!(error = %e, "trajectory write failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
        TrajectoryStoreError::Encode(e) => {
            error!(error = %e, "trajectory encoding failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
