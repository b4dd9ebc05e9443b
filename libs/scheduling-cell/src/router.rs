use std::sync::Arc;

use axum::{routing::post, Router};

use shared_config::AppConfig;

use crate::handlers::{self, SchedulingState};

pub fn scheduling_routes(config: Arc<AppConfig>) -> Router {
    let state = Arc::new(SchedulingState::new(&config));

    Router::new()
        .route("/start", post(handlers::start_form))
        .route("/validate", post(handlers::validate_field))
        .route("/message", post(handlers::handle_message))
        .route("/finalize", post(handlers::finalize_booking))
        .route("/cancel", post(handlers::cancel_form))
        .with_state(state)
}
