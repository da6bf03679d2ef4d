pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use services::backend_client::{AnalysisBackend, HttpAnalysisBackend};
use services::session::SessionOrchestrator;

// Application state
pub struct AppState {
    pub config: config::Config,
    pub sessions: SessionOrchestrator,
}

impl AppState {
    pub fn new(config: config::Config) -> Self {
        let backend = Arc::new(HttpAnalysisBackend::new(config.api_base.clone()));
        Self::with_backend(config, backend)
    }

    pub fn with_backend(config: config::Config, backend: Arc<dyn AnalysisBackend>) -> Self {
        let sessions = SessionOrchestrator::new(backend, config.poll_policy(), config.max_file_size);
        Self { config, sessions }
    }
}
