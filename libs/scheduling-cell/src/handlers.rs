use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::Value;

use availability_cell::{AvailabilityClient, HttpAvailabilityClient};
use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::error::SchedulingError;
use crate::models::{BookingOutcome, FormField, FormState, TurnOutcome};
use crate::services::{BookingFinalizer, FormStateMachine};

/// Engine shared by every request of the router. Both services use the same
/// pooled backend client; the form itself always travels with the request.
pub struct SchedulingState {
    pub machine: FormStateMachine,
    pub finalizer: BookingFinalizer,
}

impl SchedulingState {
    pub fn new(config: &AppConfig) -> Self {
        let client: Arc<dyn AvailabilityClient> = Arc::new(HttpAvailabilityClient::new(config));
        Self {
            machine: FormStateMachine::new(client.clone()),
            finalizer: BookingFinalizer::new(client),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub field: FormField,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub form: FormState,
    #[serde(default)]
    pub latest_text: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    #[serde(default)]
    pub form: FormState,
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct FormRequest {
    #[serde(default)]
    pub form: FormState,
}

/// Slot values arrive as whatever JSON type the dialogue manager stored.
fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn into_app_error(err: SchedulingError) -> AppError {
    let message = err.to_string();
    match err {
        SchedulingError::FormComplete => AppError::Conflict(message),
        _ => AppError::BadRequest(message),
    }
}

#[axum::debug_handler]
pub async fn start_form(
    State(state): State<Arc<SchedulingState>>,
) -> Json<TurnOutcome> {
    Json(state.machine.start().await)
}

#[axum::debug_handler]
pub async fn validate_field(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<ValidateRequest>,
) -> Result<Json<TurnOutcome>, AppError> {
    let raw_value = value_text(&request.value);

    let outcome = state
        .machine
        .validate(request.field, &raw_value, request.form, &request.latest_text)
        .await
        .map_err(into_app_error)?;

    Ok(Json(outcome))
}

#[axum::debug_handler]
pub async fn handle_message(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<TurnOutcome>, AppError> {
    let outcome = state
        .machine
        .handle_message(request.form, &request.text)
        .await
        .map_err(into_app_error)?;

    Ok(Json(outcome))
}

#[axum::debug_handler]
pub async fn finalize_booking(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<FormRequest>,
) -> Json<BookingOutcome> {
    Json(state.finalizer.finalize(request.form).await)
}

#[axum::debug_handler]
pub async fn cancel_form(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<FormRequest>,
) -> Json<TurnOutcome> {
    Json(state.machine.cancel(request.form))
}
