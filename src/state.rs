//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. The
//! server keeps no scene data in memory; it holds the configuration and a
//! write lock so concurrent saves never interleave their file writes.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::ServerConfig;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub save_lock: Arc<Mutex<()>>,
}

impl AppState {
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self { config: Arc::new(config), save_lock: Arc::new(Mutex::new(())) }
    }
}
