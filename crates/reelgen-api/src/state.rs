//! Application state.

use std::sync::Arc;

use reelgen_pipeline::ReelPipeline;
use tokio::sync::Semaphore;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pipeline: Arc<ReelPipeline>,
    /// Permits for concurrently running renders
    pub render_slots: Arc<Semaphore>,
}

impl AppState {
    pub fn new(config: ApiConfig, pipeline: ReelPipeline) -> Self {
        let permits = config.max_concurrent_renders.max(1);
        Self {
            config,
            pipeline: Arc::new(pipeline),
            render_slots: Arc::new(Semaphore::new(permits)),
        }
    }
}
