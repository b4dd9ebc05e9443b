use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use shared_models::EntityId;

/// Doctor value meaning "no preference".
pub const ANY_DOCTOR: &str = "any";

/// Fields collected by the scheduling form, in collection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    Specialty,
    DoctorId,
    Date,
    ChosenTime,
    PatientName,
    PatientEmail,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::Specialty,
        FormField::DoctorId,
        FormField::Date,
        FormField::ChosenTime,
        FormField::PatientName,
        FormField::PatientEmail,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FormField::Specialty => "specialty",
            FormField::DoctorId => "doctorId",
            FormField::Date => "date",
            FormField::ChosenTime => "chosenTime",
            FormField::PatientName => "patientName",
            FormField::PatientEmail => "patientEmail",
        }
    }

    /// The field that must already hold a value before this one can be validated.
    pub fn prerequisite(&self) -> Option<FormField> {
        match self {
            FormField::Specialty => None,
            FormField::DoctorId => Some(FormField::Specialty),
            FormField::Date => Some(FormField::DoctorId),
            FormField::ChosenTime => Some(FormField::Date),
            FormField::PatientName | FormField::PatientEmail => Some(FormField::ChosenTime),
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStep {
    CollectingSpecialty,
    CollectingDoctor,
    CollectingDate,
    CollectingTime,
    CollectingPatientIdentity,
    Complete,
    Cancelled,
    Abandoned,
}

/// Conversation form. Travels with every request; the engine never keeps it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormState {
    pub specialty: Option<String>,
    pub specialty_id: Option<EntityId>,
    pub doctor_id: Option<EntityId>,
    pub doctor_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub available_slots: Vec<String>,
    pub chosen_time: Option<String>,
    pub patient_name: Option<String>,
    pub patient_email: Option<String>,
}

impl FormState {
    pub fn reset(&mut self) {
        *self = FormState::default();
    }

    pub fn is_set(&self, field: FormField) -> bool {
        match field {
            FormField::Specialty => self.specialty.is_some() && self.specialty_id.is_some(),
            FormField::DoctorId => self.doctor_id.is_some(),
            // A date only counts together with the slots fetched for it.
            FormField::Date => self.date.is_some() && !self.available_slots.is_empty(),
            FormField::ChosenTime => self.chosen_time.is_some(),
            FormField::PatientName => self.patient_name.is_some(),
            FormField::PatientEmail => self.patient_email.is_some(),
        }
    }

    /// First field still waiting for a valid value.
    pub fn next_field(&self) -> Option<FormField> {
        FormField::ALL.into_iter().find(|field| !self.is_set(*field))
    }

    pub fn step(&self) -> FormStep {
        match self.next_field() {
            Some(FormField::Specialty) => FormStep::CollectingSpecialty,
            Some(FormField::DoctorId) => FormStep::CollectingDoctor,
            Some(FormField::Date) => FormStep::CollectingDate,
            Some(FormField::ChosenTime) => FormStep::CollectingTime,
            Some(FormField::PatientName) | Some(FormField::PatientEmail) => FormStep::CollectingPatientIdentity,
            None => FormStep::Complete,
        }
    }

    /// Clears everything that was derived from `field`. The field itself is kept.
    pub fn invalidate_after(&mut self, field: FormField) {
        match field {
            FormField::Specialty => {
                self.doctor_id = None;
                self.doctor_name = None;
                self.invalidate_after(FormField::DoctorId);
            }
            FormField::DoctorId => {
                self.date = None;
                self.invalidate_after(FormField::Date);
            }
            FormField::Date => {
                self.available_slots.clear();
                self.chosen_time = None;
            }
            FormField::ChosenTime | FormField::PatientName | FormField::PatientEmail => {}
        }
    }

    /// Every field as a slot-store entry, unset ones as null.
    pub fn snapshot(&self) -> Map<String, Value> {
        to_object(self)
    }

    /// Slot-store events for the dialogue manager: every key whose value
    /// differs from `before`, plus `field` itself (null when unset).
    pub fn changes_since(&self, before: &FormState, field: Option<FormField>) -> Map<String, Value> {
        let current = to_object(self);
        let previous = to_object(before);

        let mut changes = Map::new();
        for (key, value) in current {
            let forced = field.map(|f| f.name() == key).unwrap_or(false);
            if forced || previous.get(&key) != Some(&value) {
                changes.insert(key, value);
            }
        }
        changes
    }
}

fn to_object(state: &FormState) -> Map<String, Value> {
    match serde_json::to_value(state) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickReply {
    pub title: String,
    pub payload: String,
}

impl QuickReply {
    /// Button that fills `field` with `value` through the dialogue manager's inform intent.
    pub fn inform(title: impl Into<String>, field: FormField, value: impl Into<Value>) -> Self {
        let mut entities = Map::new();
        entities.insert(field.name().to_string(), value.into());

        Self {
            title: title.into(),
            payload: format!("/inform{}", Value::Object(entities)),
        }
    }

    pub fn intent(title: impl Into<String>, intent: &str) -> Self {
        Self {
            title: title.into(),
            payload: format!("/{}", intent),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotMessage {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quick_replies: Vec<QuickReply>,
}

impl BotMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quick_replies: Vec::new(),
        }
    }

    pub fn with_replies(text: impl Into<String>, quick_replies: Vec<QuickReply>) -> Self {
        Self {
            text: text.into(),
            quick_replies,
        }
    }
}

/// Result of one conversational turn against the form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutcome {
    pub step: FormStep,
    pub accepted: bool,
    pub form: FormState,
    pub slots: Map<String, Value>,
    pub messages: Vec<BotMessage>,
}

/// Result of a booking attempt. The form is always reset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingOutcome {
    pub step: FormStep,
    pub appointment_id: Option<EntityId>,
    pub form: FormState,
    pub slots: Map<String, Value>,
    pub messages: Vec<BotMessage>,
}

impl BookingOutcome {
    pub fn is_booked(&self) -> bool {
        self.appointment_id.is_some()
    }
}
