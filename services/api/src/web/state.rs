//! services/api/src/web/state.rs
//!
//! Defines the application's shared and session-specific states.

use crate::adapters::{HttpBackend, LocalProgressCache};
use crate::config::Config;
use std::sync::Arc;
use visa_guide_core::{FlowController, JourneyController, ProgressGateway, ResilientCatalog};

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub progress: Arc<ProgressGateway>,
    pub catalog: Arc<ResilientCatalog>,
}

impl AppState {
    /// Wires the backend adapter and the local cache behind the gateways.
    pub fn new(config: Arc<Config>, client: reqwest::Client) -> Self {
        let backend = Arc::new(HttpBackend::new(client, config.api_base_url.clone()));
        let cache = Arc::new(LocalProgressCache::new(config.progress_cache_path.clone()));
        Self {
            progress: Arc::new(ProgressGateway::new(backend.clone(), cache)),
            catalog: Arc::new(ResilientCatalog::new(backend)),
            config,
        }
    }
}

//=========================================================================================
// SessionState (Specific to One WebSocket Connection)
//=========================================================================================

/// The state for a single wizard connection.
pub struct SessionState {
    pub app_state: Arc<AppState>,
    pub flow: FlowController,
    /// Present while the detail screen is shown. Dropping it ends its event
    /// subscriptions.
    pub journey: Option<JourneyController>,
}

impl SessionState {
    pub fn new(app_state: Arc<AppState>) -> Self {
        Self {
            app_state,
            flow: FlowController::new(),
            journey: None,
        }
    }
}
