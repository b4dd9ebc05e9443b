use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::{debug, warn};

use availability_cell::{AvailabilityClient, AvailabilityError};
use shared_models::{Doctor, Specialty};

use crate::models::{BotMessage, FormField, FormState, ANY_DOCTOR};
use super::date_resolver::DateResolver;
use super::prompts;
use super::text::{fold, squash_whitespace};
use super::time_matcher::TimeChoiceMatcher;

const NO_PREFERENCE: [&str; 5] = [ANY_DOCTOR, "qualquer", "qualquer um", "sem preferencia", "tanto faz"];
const MAX_NAME_CHARS: usize = 100;
const MAX_EMAIL_LEN: usize = 254;

/// What the dialogue manager handed over for one field.
#[derive(Debug, Clone)]
pub struct ValidationInput<'a> {
    pub raw_value: &'a str,
    pub latest_text: &'a str,
    pub reference_now: DateTime<Utc>,
}

impl<'a> ValidationInput<'a> {
    /// The extracted value first, then the user's whole message.
    pub fn texts(&self) -> Vec<&'a str> {
        let mut texts = Vec::with_capacity(2);
        for text in [self.raw_value, self.latest_text] {
            if !text.trim().is_empty() && !texts.contains(&text) {
                texts.push(text);
            }
        }
        texts
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected,
    BackendFailure,
}

#[derive(Debug, Clone)]
pub struct FieldOutcome {
    pub verdict: Verdict,
    pub messages: Vec<BotMessage>,
}

impl FieldOutcome {
    fn accepted(messages: Vec<BotMessage>) -> Self {
        Self { verdict: Verdict::Accepted, messages }
    }

    fn rejected(message: BotMessage) -> Self {
        Self { verdict: Verdict::Rejected, messages: vec![message] }
    }

    fn backend_failure(field: FormField, err: &AvailabilityError) -> Self {
        warn!("Backend failure while validating {}: {}", field, err);
        Self {
            verdict: Verdict::BackendFailure,
            messages: vec![BotMessage::text(prompts::BACKEND_APOLOGY)],
        }
    }
}

/// Validation strategy for one form field. Implementations only touch the
/// draft state when the value is accepted, apart from clearing fields that
/// depended on it.
#[async_trait]
pub trait FieldValidator: Send + Sync {
    async fn validate(&self, input: &ValidationInput<'_>, state: &mut FormState) -> FieldOutcome;
}

pub struct SpecialtyValidator {
    client: Arc<dyn AvailabilityClient>,
}

impl SpecialtyValidator {
    pub fn new(client: Arc<dyn AvailabilityClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FieldValidator for SpecialtyValidator {
    async fn validate(&self, input: &ValidationInput<'_>, state: &mut FormState) -> FieldOutcome {
        let specialties = match self.client.list_specialties().await {
            Ok(specialties) => specialties,
            Err(e) => return FieldOutcome::backend_failure(FormField::Specialty, &e),
        };

        let chosen = input
            .texts()
            .into_iter()
            .find_map(|text| match_specialty(text, &specialties))
            .cloned();

        let Some(specialty) = chosen else {
            debug!("No specialty matched {:?}", input.texts());
            return FieldOutcome::rejected(prompts::unknown_specialty(&specialties));
        };

        let doctors = match self.client.list_doctors(&specialty.id).await {
            Ok(doctors) => doctors,
            Err(e) => return FieldOutcome::backend_failure(FormField::Specialty, &e),
        };

        if doctors.is_empty() {
            debug!("Specialty {} has no doctors", specialty.name);
            return FieldOutcome::rejected(prompts::no_doctors(&specialty.name, &specialties));
        }

        let message = prompts::doctor_choices(&specialty.name, &doctors);
        state.specialty = Some(specialty.name);
        state.specialty_id = Some(specialty.id);
        state.invalidate_after(FormField::Specialty);

        FieldOutcome::accepted(vec![message])
    }
}

fn match_specialty<'s>(text: &str, specialties: &'s [Specialty]) -> Option<&'s Specialty> {
    let wanted = fold(text);
    specialties
        .iter()
        .find(|s| fold(&s.name) == wanted || s.id.as_str() == text.trim())
        .or_else(|| specialties.iter().find(|s| wanted.contains(&fold(&s.name))))
}

pub struct DoctorValidator {
    client: Arc<dyn AvailabilityClient>,
}

impl DoctorValidator {
    pub fn new(client: Arc<dyn AvailabilityClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FieldValidator for DoctorValidator {
    async fn validate(&self, input: &ValidationInput<'_>, state: &mut FormState) -> FieldOutcome {
        let (Some(specialty_id), Some(specialty)) = (state.specialty_id.clone(), state.specialty.clone()) else {
            return FieldOutcome::rejected(BotMessage::text("Primeiro, escolha uma especialidade."));
        };

        let doctors = match self.client.list_doctors(&specialty_id).await {
            Ok(doctors) => doctors,
            Err(e) => return FieldOutcome::backend_failure(FormField::DoctorId, &e),
        };

        if doctors.is_empty() {
            debug!("Specialty {} no longer has doctors, asking for another one", specialty);
            state.specialty = None;
            state.specialty_id = None;
            state.invalidate_after(FormField::Specialty);

            let specialties = match self.client.list_specialties().await {
                Ok(specialties) => specialties,
                Err(e) => return FieldOutcome::backend_failure(FormField::DoctorId, &e),
            };
            return FieldOutcome::rejected(prompts::no_doctors(&specialty, &specialties));
        }

        let chosen = input
            .texts()
            .into_iter()
            .find_map(|text| match_doctor(text, &doctors))
            .cloned();

        let Some(doctor) = chosen else {
            return FieldOutcome::rejected(prompts::unknown_doctor(&specialty, &doctors));
        };

        debug!("Doctor {} ({}) chosen for {}", doctor.name, doctor.id, specialty);
        state.doctor_id = Some(doctor.id);
        state.doctor_name = Some(doctor.name);
        state.invalidate_after(FormField::DoctorId);

        FieldOutcome::accepted(Vec::new())
    }
}

/// "No preference" picks the first doctor in backend order.
fn match_doctor<'d>(text: &str, doctors: &'d [Doctor]) -> Option<&'d Doctor> {
    let wanted = fold(text);

    if NO_PREFERENCE.contains(&wanted.as_str()) {
        return doctors.first();
    }

    doctors
        .iter()
        .find(|d| d.id.as_str() == text.trim() || fold(&d.name) == wanted)
        .or_else(|| {
            doctors.iter().find(|d| {
                let name = fold(&d.name);
                wanted.contains(&name) || (wanted.chars().count() >= 4 && name.contains(&wanted))
            })
        })
}

pub struct DateValidator {
    client: Arc<dyn AvailabilityClient>,
    resolver: DateResolver,
}

impl DateValidator {
    pub fn new(client: Arc<dyn AvailabilityClient>) -> Self {
        Self {
            client,
            resolver: DateResolver::new(),
        }
    }
}

#[async_trait]
impl FieldValidator for DateValidator {
    async fn validate(&self, input: &ValidationInput<'_>, state: &mut FormState) -> FieldOutcome {
        let Some(doctor_id) = state.doctor_id.clone() else {
            return FieldOutcome::rejected(prompts::ask_date(None));
        };

        let resolved = input
            .texts()
            .into_iter()
            .find_map(|text| self.resolver.resolve(text, input.reference_now));

        let Some(resolved) = resolved else {
            return FieldOutcome::rejected(prompts::unknown_date());
        };

        let date = resolved.date();
        if date < input.reference_now.date_naive() {
            return FieldOutcome::rejected(prompts::past_date(date));
        }

        let slots = match self.client.list_available_slots(&doctor_id, date).await {
            Ok(slots) => slots,
            Err(e) => return FieldOutcome::backend_failure(FormField::Date, &e),
        };

        state.invalidate_after(FormField::Date);

        if slots.is_empty() {
            debug!("Doctor {} has no availability on {}", doctor_id, resolved.date_key());
            state.date = None;
            return FieldOutcome::rejected(prompts::no_availability(date));
        }

        state.date = Some(date);
        state.available_slots = slots;

        FieldOutcome::accepted(Vec::new())
    }
}

pub struct TimeValidator {
    matcher: TimeChoiceMatcher,
}

impl TimeValidator {
    pub fn new() -> Self {
        Self {
            matcher: TimeChoiceMatcher::new(),
        }
    }
}

impl Default for TimeValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FieldValidator for TimeValidator {
    async fn validate(&self, input: &ValidationInput<'_>, state: &mut FormState) -> FieldOutcome {
        if state.available_slots.is_empty() {
            state.date = None;
            return FieldOutcome::rejected(prompts::ask_date(state.doctor_name.as_deref()));
        }

        let chosen = input
            .texts()
            .into_iter()
            .find_map(|text| self.matcher.match_choice(text, &state.available_slots))
            .map(str::to_string);

        match chosen {
            Some(time) => {
                debug!("Time {} chosen", time);
                state.chosen_time = Some(time);
                FieldOutcome::accepted(Vec::new())
            }
            None => FieldOutcome::rejected(prompts::unknown_time(&state.available_slots)),
        }
    }
}

pub struct PatientNameValidator;

#[async_trait]
impl FieldValidator for PatientNameValidator {
    async fn validate(&self, input: &ValidationInput<'_>, state: &mut FormState) -> FieldOutcome {
        let name = input
            .texts()
            .into_iter()
            .map(squash_whitespace)
            .find(|name| is_plausible_name(name));

        match name {
            Some(name) => {
                state.patient_name = Some(name);
                FieldOutcome::accepted(Vec::new())
            }
            None => FieldOutcome::rejected(prompts::invalid_name()),
        }
    }
}

fn is_plausible_name(name: &str) -> bool {
    let chars = name.chars().count();
    (2..=MAX_NAME_CHARS).contains(&chars)
        && name.chars().any(char::is_alphabetic)
        && !name.contains('@')
}

pub struct PatientEmailValidator {
    pattern: Regex,
}

impl PatientEmailValidator {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")
                .expect("email pattern is valid"),
        }
    }
}

impl Default for PatientEmailValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FieldValidator for PatientEmailValidator {
    async fn validate(&self, input: &ValidationInput<'_>, state: &mut FormState) -> FieldOutcome {
        let email = input
            .texts()
            .into_iter()
            .filter_map(|text| self.pattern.find(text))
            .map(|m| m.as_str().to_lowercase())
            .find(|email| email.len() <= MAX_EMAIL_LEN);

        match email {
            Some(email) => {
                state.patient_email = Some(email);
                FieldOutcome::accepted(Vec::new())
            }
            None => FieldOutcome::rejected(prompts::invalid_email()),
        }
    }
}
