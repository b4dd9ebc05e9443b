use thiserror::Error;

use availability_cell::AvailabilityError;

use crate::models::FormField;

/// Misuse of the form protocol by the caller. User input that fails
/// validation is not an error; it is answered with a re-prompt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulingError {
    #[error("{field} cannot be validated before {requires}")]
    MissingPrerequisite { field: FormField, requires: FormField },

    #[error("Form is already complete, finalize or cancel it")]
    FormComplete,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error("Booking invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Could not resolve patient: {0}")]
    Patient(AvailabilityError),

    #[error("Appointment was not created: {0}")]
    Appointment(AvailabilityError),
}
