//! Scene store: read-only access to recorded scenes under `DATA_DIR`.
//!
//! DESIGN
//! ======
//! `poses.json` is a list of `{ task_id, objects }` records and is re-read on
//! every request, so scenes can be added without a restart. Initial relations
//! come from `pddl/<id>.pddl` when present; a missing file means no relations.
//! Provider-side normalisation rewrites a mapped lid resting on its own
//! container as that container being closed.
//!
//! ERROR HANDLING
//! ==============
//! Unknown ids are `NotFound`; ids that could escape the data directory are
//! rejected before touching the filesystem. I/O and JSON failures propagate
//! unchanged for the route layer to map to 500.

#[cfg(test)]
#[path = "scenes_test.rs"]
mod scenes_test;

use std::io::ErrorKind;

use canvas::engine::{SceneBundle, SceneDocument};
use canvas::relations::RelationSet;
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::services::pddl;

#[derive(Debug, thiserror::Error)]
pub enum SceneStoreError {
    #[error("scene not found: {0}")]
    NotFound(String),
    #[error("invalid scene id: {0:?}")]
    InvalidId(String),
    #[error("scene data unreadable: {0}")]
    Io(#[from] std::io::Error),
    #[error("scene data malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Reject ids that are empty or could address a path outside the data dirs.
///
/// # Errors
///
/// Returns `InvalidId` for empty ids and ids containing separators or `..`.
pub fn validate_scene_id(scene_id: &str) -> Result<(), SceneStoreError> {
    let bad = scene_id.is_empty()
        || scene_id.contains(['/', '\\'])
        || scene_id.contains("..")
        || scene_id.chars().any(char::is_control);
    if bad {
        return Err(SceneStoreError::InvalidId(scene_id.to_owned()));
    }
    Ok(())
}

/// All recorded scene ids, sorted.
///
/// # Errors
///
/// Returns an error if `poses.json` cannot be read or parsed.
pub async fn list_scene_ids(config: &ServerConfig) -> Result<Vec<String>, SceneStoreError> {
    let mut ids: Vec<String> = read_poses(config).await?.into_iter().map(|doc| doc.task_id).collect();
    ids.sort();
    ids.dedup();
    Ok(ids)
}

/// Object list for one scene.
///
/// # Errors
///
/// Returns `NotFound` for unknown ids, or the underlying read error.
pub async fn load_document(config: &ServerConfig, scene_id: &str) -> Result<SceneDocument, SceneStoreError> {
    validate_scene_id(scene_id)?;
    read_poses(config)
        .await?
        .into_iter()
        .find(|doc| doc.task_id == scene_id)
        .ok_or_else(|| SceneStoreError::NotFound(scene_id.to_owned()))
}

/// Initial relations for one scene, normalised against the lid map.
///
/// # Errors
///
/// Returns an error only if the PDDL file exists but cannot be read.
pub async fn load_relations(config: &ServerConfig, scene_id: &str) -> Result<RelationSet, SceneStoreError> {
    validate_scene_id(scene_id)?;
    let path = config.initial_pddl_dir().join(format!("{scene_id}.pddl"));
    let mut relations = match tokio::fs::read_to_string(&path).await {
        Ok(text) => pddl::parse_init(&text),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(%scene_id, path = %path.display(), "no initial pddl; starting without relations");
            RelationSet::new()
        }
        Err(e) => return Err(e.into()),
    };
    relations.normalize_closures(&config.lid_map);
    Ok(relations)
}

/// Everything the engine needs to start annotating a scene.
///
/// # Errors
///
/// See [`load_document`] and [`load_relations`].
pub async fn load_bundle(config: &ServerConfig, scene_id: &str) -> Result<SceneBundle, SceneStoreError> {
    let scene = load_document(config, scene_id).await?;
    let relations = load_relations(config, scene_id).await?;
    info!(%scene_id, objects = scene.objects.len(), "scene loaded");
    Ok(SceneBundle {
        scene,
        image: image_handle(scene_id),
        lid_map: config.lid_map.clone(),
        relations,
    })
}

/// URL of the reference image, relative to the server root.
#[must_use]
pub fn image_handle(scene_id: &str) -> String {
    format!("/images/scene_{scene_id}_rgb.png")
}

async fn read_poses(config: &ServerConfig) -> Result<Vec<SceneDocument>, SceneStoreError> {
    let bytes = tokio::fs::read(config.poses_file()).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
