use thiserror::Error;

use shared_database::ApiError;

/// Backend failures. A successful empty result is never an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error("Clinic backend unreachable: {0}")]
    BackendUnreachable(String),

    #[error("Malformed clinic backend response: {0}")]
    MalformedResponse(String),
}

impl From<ApiError> for AvailabilityError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Malformed(msg) => AvailabilityError::MalformedResponse(msg),
            other => AvailabilityError::BackendUnreachable(other.to_string()),
        }
    }
}
