use std::sync::Arc;

use crate::config::Config;
use crate::matching::MatchEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<MatchEngine>,
    /// Deployment configuration. No handler reads it yet; kept so handlers
    /// gaining config-dependent behavior do not need a state change.
    #[allow(dead_code)]
    pub config: Config,
}
