//! Server configuration loaded from environment variables.
//!
//! Every knob has a typed default so the server starts with no environment
//! at all: it then serves `./data` and writes to `./output` on port 8000.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;

use canvas::scene::LidMap;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_OUTPUT_DIR: &str = "output";

/// Fixed container-to-lid pairs of the annotated tabletop scenes.
const DEFAULT_LID_MAP: &[(&str, &str)] = &[
    ("container_07", "lid_01"),
    ("container_08", "lid_02"),
    ("container_09", "lid_03"),
    ("container_10", "lid_04"),
];

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Holds `poses.json`, `pddl/<id>.pddl` and the reference images.
    pub data_dir: PathBuf,
    /// Receives `trajectories/<id>.json` and `pddl/<id>.pddl`.
    pub output_dir: PathBuf,
    pub lid_map: LidMap,
}

impl ServerConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::with_dirs(
            env_path("DATA_DIR", DEFAULT_DATA_DIR),
            env_path("OUTPUT_DIR", DEFAULT_OUTPUT_DIR),
        );
        config.port = env_parse("PORT", DEFAULT_PORT);
        config
    }

    /// Configuration rooted at explicit directories, default lid map.
    #[must_use]
    pub fn with_dirs(data_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            port: DEFAULT_PORT,
            data_dir: data_dir.into(),
            output_dir: output_dir.into(),
            lid_map: default_lid_map(),
        }
    }

    #[must_use]
    pub fn poses_file(&self) -> PathBuf {
        self.data_dir.join("poses.json")
    }

    #[must_use]
    pub fn initial_pddl_dir(&self) -> PathBuf {
        self.data_dir.join("pddl")
    }
}

#[must_use]
pub fn default_lid_map() -> LidMap {
    DEFAULT_LID_MAP.iter().copied().collect()
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

pub(crate) fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map_or_else(|| PathBuf::from(default), PathBuf::from)
}
