//! User-facing messages of the scheduling form.

use chrono::NaiveDate;

use shared_models::{Doctor, Specialty};

use crate::models::{BotMessage, FormField, FormState, FormStep, QuickReply, ANY_DOCTOR};

pub const BACKEND_APOLOGY: &str =
    "Desculpe, não consegui consultar a agenda da clínica agora. Por favor, tente novamente em instantes.";

pub const BOOKING_FAILURE: &str =
    "Desculpe, ocorreu um erro ao realizar o seu agendamento. Por favor, tente novamente.";

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn greeting(specialties: &[Specialty]) -> BotMessage {
    if specialties.is_empty() {
        return BotMessage::text(
            "No momento, não tenho a lista de especialidades. Por favor, tente mais tarde.",
        );
    }
    specialty_choices(
        format!(
            "Vamos agendar sua consulta! As especialidades disponíveis são: {}. Qual você deseja?",
            join_names(specialties.iter().map(|s| s.name.as_str()))
        ),
        specialties,
    )
}

pub fn unknown_specialty(specialties: &[Specialty]) -> BotMessage {
    specialty_choices(
        format!(
            "Não encontrei essa especialidade. Escolha uma das opções: {}.",
            join_names(specialties.iter().map(|s| s.name.as_str()))
        ),
        specialties,
    )
}

pub fn no_doctors(specialty: &str, specialties: &[Specialty]) -> BotMessage {
    specialty_choices(
        format!(
            "No momento não há médicos de {} disponíveis. Por favor, escolha outra especialidade.",
            specialty
        ),
        specialties,
    )
}

fn specialty_choices(text: String, specialties: &[Specialty]) -> BotMessage {
    let replies = specialties
        .iter()
        .map(|s| QuickReply::inform(s.name.clone(), FormField::Specialty, s.name.clone()))
        .collect();
    BotMessage::with_replies(text, replies)
}

pub fn doctor_choices(specialty: &str, doctors: &[Doctor]) -> BotMessage {
    doctor_list(
        format!(
            "Ótimo! Para {}, temos: {}. Com qual médico você prefere ser atendido?",
            specialty,
            join_names(doctors.iter().map(|d| d.name.as_str()))
        ),
        doctors,
    )
}

pub fn unknown_doctor(specialty: &str, doctors: &[Doctor]) -> BotMessage {
    doctor_list(
        format!(
            "Não encontrei esse médico. Os médicos de {} são: {}.",
            specialty,
            join_names(doctors.iter().map(|d| d.name.as_str()))
        ),
        doctors,
    )
}

fn doctor_list(text: String, doctors: &[Doctor]) -> BotMessage {
    let mut replies: Vec<QuickReply> = doctors
        .iter()
        .map(|d| QuickReply::inform(d.name.clone(), FormField::DoctorId, d.id.as_str()))
        .collect();
    replies.push(QuickReply::inform("Sem preferência", FormField::DoctorId, ANY_DOCTOR));
    BotMessage::with_replies(text, replies)
}

pub fn ask_date(doctor_name: Option<&str>) -> BotMessage {
    let text = match doctor_name {
        Some(name) => format!(
            "Para qual dia deseja a consulta com {}? Você pode dizer \"hoje\", \"amanhã\", um dia da semana ou uma data (DD/MM).",
            name
        ),
        None => "Para qual dia deseja a consulta? Você pode dizer \"hoje\", \"amanhã\", um dia da semana ou uma data (DD/MM).".to_string(),
    };
    BotMessage::text(text)
}

pub fn unknown_date() -> BotMessage {
    BotMessage::text(
        "Não entendi a data. Informe \"hoje\", \"amanhã\", um dia da semana (ex.: sexta-feira) ou uma data no formato DD/MM.",
    )
}

pub fn past_date(date: NaiveDate) -> BotMessage {
    BotMessage::text(format!(
        "A data {} já passou. Por favor, escolha uma data a partir de hoje.",
        format_date(date)
    ))
}

pub fn no_availability(date: NaiveDate) -> BotMessage {
    BotMessage::text(format!(
        "Não há horários disponíveis em {}. Por favor, escolha outra data.",
        format_date(date)
    ))
}

pub fn time_choices(date: NaiveDate, slots: &[String]) -> BotMessage {
    slot_list(
        format!(
            "Horários disponíveis em {}: {}. Qual você prefere?",
            format_date(date),
            slots.join(", ")
        ),
        slots,
    )
}

pub fn unknown_time(slots: &[String]) -> BotMessage {
    slot_list(
        format!(
            "Não consegui identificar o horário. Os horários disponíveis são: {}.",
            slots.join(", ")
        ),
        slots,
    )
}

fn slot_list(text: String, slots: &[String]) -> BotMessage {
    let replies = slots
        .iter()
        .map(|slot| QuickReply::inform(slot.clone(), FormField::ChosenTime, slot.clone()))
        .collect();
    BotMessage::with_replies(text, replies)
}

pub fn invalid_name() -> BotMessage {
    BotMessage::text("Por favor, informe seu nome completo.")
}

pub fn invalid_email() -> BotMessage {
    BotMessage::text("Esse e-mail não parece válido. Por favor, informe um e-mail como nome@exemplo.com.")
}

/// Question for the step the form is now in, when it needs no backend data.
/// Specialty and doctor lists are produced by their validators.
pub fn ask_for(state: &FormState) -> Option<BotMessage> {
    match state.step() {
        FormStep::CollectingDate => Some(ask_date(state.doctor_name.as_deref())),
        FormStep::CollectingTime => state
            .date
            .filter(|_| !state.available_slots.is_empty())
            .map(|date| time_choices(date, &state.available_slots)),
        FormStep::CollectingPatientIdentity => {
            if state.patient_name.is_none() {
                Some(BotMessage::text("Para finalizar, qual é o seu nome completo?"))
            } else {
                Some(BotMessage::text("E qual é o seu e-mail?"))
            }
        }
        FormStep::Complete => Some(summary(state)),
        _ => None,
    }
}

pub fn summary(state: &FormState) -> BotMessage {
    let date = state.date.map(format_date).unwrap_or_default();
    BotMessage::with_replies(
        format!(
            "Confirme os dados: {} com {} em {} às {}, paciente {} ({}). Posso agendar?",
            state.specialty.as_deref().unwrap_or_default(),
            state.doctor_name.as_deref().unwrap_or_default(),
            date,
            state.chosen_time.as_deref().unwrap_or_default(),
            state.patient_name.as_deref().unwrap_or_default(),
            state.patient_email.as_deref().unwrap_or_default(),
        ),
        vec![
            QuickReply::intent("Confirmar", "affirm"),
            QuickReply::intent("Cancelar", "deny"),
        ],
    )
}

pub fn confirmation(state: &FormState, appointment_id: &str) -> BotMessage {
    let date = state.date.map(format_date).unwrap_or_default();
    BotMessage::text(format!(
        "Consulta agendada com sucesso! {} com {} no dia {} às {}. Código do agendamento: {}.",
        state.specialty.as_deref().unwrap_or_default(),
        state.doctor_name.as_deref().unwrap_or_default(),
        date,
        state.chosen_time.as_deref().unwrap_or_default(),
        appointment_id
    ))
}

pub fn cancelled() -> BotMessage {
    BotMessage::text("Tudo bem, o agendamento foi cancelado. Se precisar, é só chamar!")
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}
