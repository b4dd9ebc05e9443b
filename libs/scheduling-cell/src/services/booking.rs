use std::sync::Arc;

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use tracing::{debug, error, info};

use availability_cell::AvailabilityClient;
use shared_models::Appointment;

use crate::error::BookingError;
use crate::models::{BookingOutcome, BotMessage, FormState, FormStep};
use super::prompts;

/// Books the appointment described by a completed form.
pub struct BookingFinalizer {
    client: Arc<dyn AvailabilityClient>,
}

impl BookingFinalizer {
    pub fn new(client: Arc<dyn AvailabilityClient>) -> Self {
        Self { client }
    }

    /// Attempts the booking. The form is cleared afterwards whatever the
    /// outcome; a failed attempt is never resumed half-way.
    pub async fn finalize(&self, state: FormState) -> BookingOutcome {
        let result = self.book(&state).await;

        let (step, appointment_id, message) = match result {
            Ok(appointment) => {
                info!("Appointment {} booked", appointment.id);
                let message = prompts::confirmation(&state, appointment.id.as_str());
                (FormStep::Complete, Some(appointment.id), message)
            }
            Err(e) => {
                error!("Booking failed: {}", e);
                (FormStep::Abandoned, None, BotMessage::text(prompts::BOOKING_FAILURE))
            }
        };

        let mut form = state;
        form.reset();
        BookingOutcome {
            step,
            appointment_id,
            slots: form.snapshot(),
            form,
            messages: vec![message],
        }
    }

    async fn book(&self, state: &FormState) -> Result<Appointment, BookingError> {
        let date_time = appointment_time(state)?;
        let doctor_id = required(state.doctor_id.as_ref(), "doctorId")?;
        let name = required(state.patient_name.as_ref(), "patientName")?;
        let email = required(state.patient_email.as_ref(), "patientEmail")?;

        let patient = self
            .client
            .find_or_create_patient(email, name)
            .await
            .map_err(BookingError::Patient)?;
        debug!("Booking for patient {} ({})", patient.id, patient.email);

        self.client
            .create_appointment(&patient.id, doctor_id, date_time)
            .await
            .map_err(BookingError::Appointment)
    }
}

/// Resolved date and chosen time as one UTC instant.
pub fn appointment_time(state: &FormState) -> Result<DateTime<Utc>, BookingError> {
    let date = state
        .date
        .ok_or_else(|| BookingError::InvariantViolation("date is not set".to_string()))?;
    let chosen = required(state.chosen_time.as_ref(), "chosenTime")?;
    if !state.available_slots.iter().any(|slot| slot == chosen) {
        return Err(BookingError::InvariantViolation(format!(
            "chosen time '{}' is not one of the offered slots",
            chosen
        )));
    }
    let time = NaiveTime::parse_from_str(chosen, "%H:%M")
        .map_err(|_| BookingError::InvariantViolation(format!("chosen time '{}' is not HH:MM", chosen)))?;

    Ok(Utc.from_utc_datetime(&date.and_time(time)))
}

fn required<'a, T>(value: Option<&'a T>, field: &str) -> Result<&'a T, BookingError> {
    value.ok_or_else(|| BookingError::InvariantViolation(format!("{} is not set", field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    #[test]
    fn test_appointment_time_combines_date_and_time() {
        let state = FormState {
            date: NaiveDate::from_ymd_opt(2026, 10, 19),
            available_slots: vec!["09:00".to_string(), "10:30".to_string()],
            chosen_time: Some("09:00".to_string()),
            ..FormState::default()
        };

        assert_eq!(
            appointment_time(&state),
            Ok(Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_appointment_time_without_chosen_time_is_invariant_violation() {
        let state = FormState {
            date: NaiveDate::from_ymd_opt(2026, 10, 19),
            ..FormState::default()
        };

        assert_matches!(appointment_time(&state), Err(BookingError::InvariantViolation(_)));
    }

    #[test]
    fn test_appointment_time_outside_offered_slots_is_invariant_violation() {
        let state = FormState {
            date: NaiveDate::from_ymd_opt(2026, 10, 19),
            available_slots: vec!["09:00".to_string(), "10:30".to_string()],
            chosen_time: Some("03:00".to_string()),
            ..FormState::default()
        };

        assert_matches!(appointment_time(&state), Err(BookingError::InvariantViolation(_)));
    }
}
