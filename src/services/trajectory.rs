//! Trajectory store: durable sink for annotated action lists.
//!
//! DESIGN
//! ======
//! A save writes two files under `OUTPUT_DIR`, each replaced wholesale:
//! `trajectories/<id>.json` holds the action list, and `pddl/<id>.pddl` holds
//! a problem file with the scene's objects and the relations at save time.
//! The scene is resolved first so an unknown id writes nothing.
//!
//! ERROR HANDLING
//! ==============
//! Scene lookup failures keep their `SceneStoreError` so the route layer can
//! answer 404/400; everything else is an I/O or serialisation failure.

#[cfg(test)]
#[path = "trajectory_test.rs"]
mod trajectory_test;

use std::path::{Path, PathBuf};

use canvas::trajectory::SavePayload;
use tracing::info;

use crate::config::ServerConfig;
use crate::services::pddl;
use crate::services::scenes::{self, SceneStoreError};

#[derive(Debug, thiserror::Error)]
pub enum TrajectoryStoreError {
    #[error(transparent)]
    Scene(#[from] SceneStoreError),
    #[error("trajectory write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("trajectory encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Where a save landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFiles {
    pub trajectory: PathBuf,
    pub problem: PathBuf,
}

#[must_use]
pub fn trajectory_path(config: &ServerConfig, scene_id: &str) -> PathBuf {
    config.output_dir.join("trajectories").join(format!("{scene_id}.json"))
}

#[must_use]
pub fn problem_path(config: &ServerConfig, scene_id: &str) -> PathBuf {
    config.output_dir.join("pddl").join(format!("{scene_id}.pddl"))
}

/// Persist `payload` for `scene_id`.
///
/// # Errors
///
/// Returns `Scene(NotFound)` for unknown scenes, `Scene(InvalidId)` for
/// unsafe ids, or the underlying write/encode failure.
pub async fn save(config: &ServerConfig, scene_id: &str, payload: &SavePayload) -> Result<SavedFiles, TrajectoryStoreError> {
    let scene = scenes::load_document(config, scene_id).await?;

    let trajectory = trajectory_path(config, scene_id);
    let body = serde_json::to_vec_pretty(&payload.actions)?;
    write_file(&trajectory, &body).await?;

    let problem = problem_path(config, scene_id);
    let text = pddl::render_problem(scene_id, &scene.objects, &payload.relations);
    write_file(&problem, text.as_bytes()).await?;

    info!(
        %scene_id,
        actions = payload.actions.len(),
        path = %trajectory.display(),
        "trajectory saved"
    );
    Ok(SavedFiles { trajectory, problem })
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), std::io::Error> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(path, bytes).await
}
