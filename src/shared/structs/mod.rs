use crate::controller::discord::pipeline::InteractionPipeline;

pub mod config;
pub mod discord;

/// axum state. Cloned per request; the pipeline already shares its configuration.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pipeline: InteractionPipeline,
}

impl AppState {
    pub fn new(pipeline: InteractionPipeline) -> Self {
        AppState { pipeline }
    }
}
