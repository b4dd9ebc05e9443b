use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use availability_cell::AvailabilityClient;

use crate::error::SchedulingError;
use crate::models::{BotMessage, FormField, FormState, FormStep, TurnOutcome};
use super::prompts;
use super::validators::{
    DateValidator, DoctorValidator, FieldValidator, PatientEmailValidator, PatientNameValidator,
    SpecialtyValidator, TimeValidator, ValidationInput, Verdict,
};

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// One validation strategy per form field, fixed at construction.
struct Validators {
    specialty: SpecialtyValidator,
    doctor: DoctorValidator,
    date: DateValidator,
    time: TimeValidator,
    patient_name: PatientNameValidator,
    patient_email: PatientEmailValidator,
}

impl Validators {
    fn new(client: Arc<dyn AvailabilityClient>) -> Self {
        Self {
            specialty: SpecialtyValidator::new(client.clone()),
            doctor: DoctorValidator::new(client.clone()),
            date: DateValidator::new(client),
            time: TimeValidator::new(),
            patient_name: PatientNameValidator,
            patient_email: PatientEmailValidator::new(),
        }
    }

    fn for_field(&self, field: FormField) -> &dyn FieldValidator {
        match field {
            FormField::Specialty => &self.specialty,
            FormField::DoctorId => &self.doctor,
            FormField::Date => &self.date,
            FormField::ChosenTime => &self.time,
            FormField::PatientName => &self.patient_name,
            FormField::PatientEmail => &self.patient_email,
        }
    }
}

/// Drives the ordered collection of the scheduling form:
/// specialty, doctor, date, time, then patient name and email.
pub struct FormStateMachine {
    client: Arc<dyn AvailabilityClient>,
    validators: Validators,
    clock: Clock,
}

impl FormStateMachine {
    pub fn new(client: Arc<dyn AvailabilityClient>) -> Self {
        Self {
            validators: Validators::new(client.clone()),
            client,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replaces the wall clock used to interpret relative dates.
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// Opens a fresh form and offers the specialties.
    pub async fn start(&self) -> TurnOutcome {
        info!("Starting scheduling form");

        let message = match self.client.list_specialties().await {
            Ok(specialties) => prompts::greeting(&specialties),
            Err(e) => {
                warn!("Could not list specialties: {}", e);
                BotMessage::text(prompts::BACKEND_APOLOGY)
            }
        };

        let form = FormState::default();
        TurnOutcome {
            step: form.step(),
            accepted: false,
            slots: form.snapshot(),
            form,
            messages: vec![message],
        }
    }

    /// Validates `raw_value` for `field`. Rejected input leaves the field
    /// unset and answers with a corrective message.
    pub async fn validate(
        &self,
        field: FormField,
        raw_value: &str,
        state: FormState,
        latest_text: &str,
    ) -> Result<TurnOutcome, SchedulingError> {
        if let Some(requires) = field.prerequisite() {
            if !state.is_set(requires) {
                return Err(SchedulingError::MissingPrerequisite { field, requires });
            }
        }

        let validator = self.validators.for_field(field);

        let input = ValidationInput {
            raw_value,
            latest_text,
            reference_now: (self.clock)(),
        };

        let before = state.clone();
        let mut draft = state;
        let outcome = validator.validate(&input, &mut draft).await;

        let accepted = outcome.verdict == Verdict::Accepted;
        let mut messages = outcome.messages;
        if accepted {
            if let Some(prompt) = prompts::ask_for(&draft) {
                messages.push(prompt);
            }
        }

        let step = draft.step();
        debug!("Field {} {:?}, form now at {:?}", field, outcome.verdict, step);

        Ok(TurnOutcome {
            step,
            accepted,
            slots: draft.changes_since(&before, Some(field)),
            form: draft,
            messages,
        })
    }

    /// Validates the user's message against whichever field the form is waiting for.
    pub async fn handle_message(&self, state: FormState, text: &str) -> Result<TurnOutcome, SchedulingError> {
        let field = state.next_field().ok_or(SchedulingError::FormComplete)?;
        self.validate(field, text, state, text).await
    }

    pub fn cancel(&self, state: FormState) -> TurnOutcome {
        info!("Scheduling form cancelled at {:?}", state.step());

        let mut form = state;
        form.reset();
        TurnOutcome {
            step: FormStep::Cancelled,
            accepted: false,
            slots: form.snapshot(),
            form,
            messages: vec![prompts::cancelled()],
        }
    }
}
