use assert_matches::assert_matches;
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::json;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{body_json, method, path, query_param};

use availability_cell::{AvailabilityClient, AvailabilityError, HttpAvailabilityClient};
use shared_models::EntityId;
use shared_utils::test_utils::{MockClinicResponses, TestConfig};

fn client_for(server: &MockServer) -> HttpAvailabilityClient {
    HttpAvailabilityClient::new(&TestConfig::with_url(server.uri()).to_app_config())
}

#[tokio::test]
async fn test_list_specialties() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/specialties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockClinicResponses::specialties()))
        .mount(&mock_server)
        .await;

    let specialties = client_for(&mock_server).list_specialties().await.unwrap();

    assert_eq!(specialties.len(), 5);
    assert_eq!(specialties[0].id, EntityId::new("1"));
    assert_eq!(specialties[4].name, "Clínica Geral");
}

#[tokio::test]
async fn test_list_doctors_keeps_backend_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/doctors/specialty/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockClinicResponses::cardiology_doctors()))
        .mount(&mock_server)
        .await;

    let doctors = client_for(&mock_server)
        .list_doctors(&EntityId::new("1"))
        .await
        .unwrap();

    let names: Vec<&str> = doctors.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Dr. João Silva", "Dra. Ana Costa"]);
}

#[tokio::test]
async fn test_available_slots_sends_date_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/doctors/1/available-slots"))
        .and(query_param("date", "2026-10-19"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["09:00", "10:30"])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let slots = client_for(&mock_server)
        .list_available_slots(&EntityId::new("1"), NaiveDate::from_ymd_opt(2026, 10, 19).unwrap())
        .await
        .unwrap();

    assert_eq!(slots, vec!["09:00", "10:30"]);
}

#[tokio::test]
async fn test_empty_slots_is_not_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/doctors/1/available-slots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let slots = client_for(&mock_server)
        .list_available_slots(&EntityId::new("1"), NaiveDate::from_ymd_opt(2026, 10, 25).unwrap())
        .await;

    assert_eq!(slots, Ok(vec![]));
}

#[tokio::test]
async fn test_invalid_slot_is_malformed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/doctors/1/available-slots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["9h"])))
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server)
        .list_available_slots(&EntityId::new("1"), NaiveDate::from_ymd_opt(2026, 10, 19).unwrap())
        .await;

    assert_matches!(result, Err(AvailabilityError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_missing_keys_are_malformed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/specialties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "title": "Cardiologia" }])))
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server).list_specialties().await;

    assert_matches!(result, Err(AvailabilityError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_server_error_is_unreachable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/doctors/specialty/1"))
        .respond_with(ResponseTemplate::new(500).set_body_json(MockClinicResponses::error_response()))
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server).list_doctors(&EntityId::new("1")).await;

    assert_matches!(result, Err(AvailabilityError::BackendUnreachable(_)));
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/specialties"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MockClinicResponses::specialties())
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let mut config = TestConfig::with_url(mock_server.uri());
    config.timeout_secs = 1;
    let client = HttpAvailabilityClient::new(&config.to_app_config());

    let result = client.list_specialties().await;

    assert_matches!(result, Err(AvailabilityError::BackendUnreachable(_)));
}

#[tokio::test]
async fn test_find_or_create_patient_posts_email_and_name() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/patients"))
        .and(body_json(json!({ "email": "maria@example.com", "name": "Maria Souza" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockClinicResponses::patient_response(12, "Maria Souza", "maria@example.com"),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let patient = client_for(&mock_server)
        .find_or_create_patient("maria@example.com", "Maria Souza")
        .await
        .unwrap();

    assert_eq!(patient.id, EntityId::new("12"));
    assert_eq!(patient.email, "maria@example.com");
}

#[tokio::test]
async fn test_create_appointment_posts_iso_timestamp() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/appointments"))
        .and(body_json(json!({
            "patientId": 12,
            "doctorId": 1,
            "dateTime": "2026-10-19T09:00:00Z"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(
            MockClinicResponses::appointment_response(99, 12, 1, "2026-10-19T09:00:00.000Z"),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let appointment = client_for(&mock_server)
        .create_appointment(
            &EntityId::new("12"),
            &EntityId::new("1"),
            Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(appointment.id, EntityId::new("99"));
}

#[tokio::test]
async fn test_appointment_without_id_is_malformed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "status": "SCHEDULED" })))
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server)
        .create_appointment(
            &EntityId::new("12"),
            &EntityId::new("1"),
            Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap(),
        )
        .await;

    assert_matches!(result, Err(AvailabilityError::MalformedResponse(_)));
}
