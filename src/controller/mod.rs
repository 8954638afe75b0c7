use axum::{Router, middleware::from_fn, routing::post};

use crate::controller::discord::interaction::handle_interaction;
use crate::shared::INTERACTION_ENDPOINT;
use crate::shared::middleware::request_context::attach_request_id;
use crate::shared::structs::AppState;

pub mod discord;

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route(INTERACTION_ENDPOINT, post(handle_interaction))
        .layer(from_fn(attach_request_id))
        .with_state(app_state)
}
