use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use appointment_cell::models::{
    Appointment, AppointmentPriority, AppointmentStatus, AppointmentType,
};
use appointment_cell::router::appointment_routes;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

fn test_config(store_url: &str) -> shared_config::AppConfig {
    let mut config = TestConfig::default().to_app_config();
    config.supabase_url = store_url.to_string();
    config
}

fn appointment_at(hour: u32, duration_minutes: i32) -> Appointment {
    Appointment {
        id: Uuid::new_v4(),
        patient_id: Uuid::new_v4(),
        doctor_id: Uuid::new_v4(),
        patient_name: Some("Asha Nair".to_string()),
        scheduled_time: Utc.with_ymd_and_hms(2027, 1, 15, hour, 0, 0).unwrap(),
        duration_minutes,
        appointment_type: AppointmentType::Video,
        status: AppointmentStatus::Scheduled,
        reason: None,
        symptoms: vec![],
        priority: AppointmentPriority::Medium,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn overlap_detection() {
    let first = appointment_at(10, 30);

    let mut adjacent = appointment_at(10, 30);
    adjacent.scheduled_time = first.end_time();
    assert!(!first.overlaps(&adjacent));

    let mut clashing = appointment_at(10, 30);
    clashing.scheduled_time = first.scheduled_time + Duration::minutes(15);
    assert!(first.overlaps(&clashing));
    assert!(clashing.overlaps(&first));

    let distant = appointment_at(14, 30);
    assert!(!first.overlaps(&distant));
}

#[test]
fn legal_status_transitions() {
    use AppointmentStatus::*;

    assert!(Scheduled.can_transition_to(Waiting));
    assert!(Waiting.can_transition_to(InProgress));
    assert!(InProgress.can_transition_to(Completed));

    assert!(Scheduled.can_transition_to(Cancelled));
    assert!(Waiting.can_transition_to(Cancelled));
    assert!(InProgress.can_transition_to(Cancelled));

    assert!(!Scheduled.can_transition_to(InProgress));
    assert!(!Scheduled.can_transition_to(Completed));
    assert!(!Completed.can_transition_to(Cancelled));
    assert!(!Cancelled.can_transition_to(Scheduled));
    assert!(!Waiting.can_transition_to(Waiting));
}

#[tokio::test]
async fn booking_requires_authentication() {
    let config = TestConfig::default().to_app_config();
    let app = appointment_routes(Arc::new(config));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "doctor_id": Uuid::new_v4(),
                        "scheduled_time": "2027-01-15T10:00:00Z",
                        "appointment_type": "video"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn booking_a_clashing_slot_conflicts() {
    let mock_server = MockServer::start().await;
    let patient = TestUser::patient("asha@example.com");
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": doctor_id, "is_available": true }
        ])))
        .mount(&mock_server)
        .await;

    // One open appointment at the requested time.
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": Uuid::new_v4(),
                "patient_id": Uuid::new_v4(),
                "doctor_id": doctor_id,
                "patient_name": "Someone Else",
                "scheduled_time": "2027-01-15T10:00:00Z",
                "duration_minutes": 30,
                "appointment_type": "video",
                "status": "scheduled",
                "reason": null,
                "symptoms": [],
                "priority": "medium",
                "created_at": "2026-08-01T00:00:00Z",
                "updated_at": "2026-08-01T00:00:00Z"
            }
        ])))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let token = JwtTestUtils::create_test_token(&patient, &config.supabase_jwt_secret, None);
    let app = appointment_routes(Arc::new(config));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("Authorization", format!("Bearer {}", token))
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "doctor_id": doctor_id,
                        "scheduled_time": "2027-01-15T10:15:00Z",
                        "appointment_type": "video",
                        "reason": "Follow-up"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn patient_cannot_list_another_patients_appointments() {
    let config = TestConfig::default().to_app_config();
    let patient = TestUser::patient("asha@example.com");
    let token = JwtTestUtils::create_test_token(&patient, &config.supabase_jwt_secret, None);
    let app = appointment_routes(Arc::new(config));

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/patient/{}", Uuid::new_v4()))
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
