use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};

use consultation_cell::models::{
    ConsultationError, ConsultationPatient, ConsultationRoom, PatientQueueStatus, RoomStatus,
    ScheduleContext, StatusFilter, TriagePriority,
};
use consultation_cell::services::scheduler::{schedule, start_consultation};

fn patient(id: &str, name: &str, status: PatientQueueStatus) -> ConsultationPatient {
    ConsultationPatient {
        id: id.to_string(),
        name: name.to_string(),
        age: Some(34),
        gender: None,
        appointment_time: Utc.with_ymd_and_hms(2026, 8, 6, 10, 0, 0).unwrap(),
        status,
        symptoms: vec!["fever".to_string()],
        priority: TriagePriority::Medium,
        avatar_url: None,
        last_consultation: None,
    }
}

fn sample_patients() -> Vec<ConsultationPatient> {
    vec![
        patient("1", "Sita", PatientQueueStatus::Waiting),
        patient("2", "Anjali Verma", PatientQueueStatus::Scheduled),
        patient("3", "Rahul Mehta", PatientQueueStatus::InProgress),
    ]
}

fn sample_room() -> ConsultationRoom {
    ConsultationRoom {
        id: "room-1".to_string(),
        patient_id: "3".to_string(),
        patient_name: "Rahul Mehta".to_string(),
        status: RoomStatus::Active,
        started_at: "09:45".to_string(),
        duration: "00:12".to_string(),
    }
}

fn context(search_term: &str, filter_status: StatusFilter) -> ScheduleContext {
    ScheduleContext {
        search_term: search_term.to_string(),
        filter_status,
        current_time: Utc.with_ymd_and_hms(2026, 8, 6, 10, 30, 0).unwrap(),
    }
}

#[test]
fn identity_on_all_and_empty_search() {
    let patients = sample_patients();
    let rooms = vec![sample_room()];

    let outcome = schedule(&patients, &rooms, &context("", StatusFilter::All));

    assert_eq!(outcome.scheduled_patients, patients);
    assert_eq!(outcome.new_rooms, rooms);
}

#[test]
fn filter_is_idempotent() {
    let patients = sample_patients();
    let rooms = vec![sample_room()];
    let ctx = context("a", StatusFilter::All);

    let first = schedule(&patients, &rooms, &ctx);
    let second = schedule(&patients, &rooms, &ctx);

    assert_eq!(first.scheduled_patients, second.scheduled_patients);
    assert_eq!(first.new_rooms, second.new_rooms);
}

#[test]
fn search_matches_name_case_insensitively() {
    // "an" appears only in "Anjali Verma"
    let patients = sample_patients();

    let outcome = schedule(&patients, &[], &context("an", StatusFilter::All));

    assert_eq!(outcome.scheduled_patients.len(), 1);
    assert_eq!(outcome.scheduled_patients[0].id, "2");
    assert_eq!(outcome.scheduled_patients[0].name, "Anjali Verma");
}

#[test]
fn status_filter_selects_waiting_only() {
    let patients = sample_patients();

    let outcome = schedule(&patients, &[], &context("", StatusFilter::Waiting));

    assert_eq!(outcome.scheduled_patients.len(), 1);
    assert_eq!(outcome.scheduled_patients[0].id, "1");
    assert_eq!(outcome.scheduled_patients[0].name, "Sita");
}

#[test]
fn status_partition_excludes_nothing_with_matching_status() {
    let mut patients = sample_patients();
    patients.push(patient("4", "Vikram Rao", PatientQueueStatus::Waiting));

    let outcome = schedule(&patients, &[], &context("", StatusFilter::Waiting));

    assert!(outcome
        .scheduled_patients
        .iter()
        .all(|p| p.status == PatientQueueStatus::Waiting));
    let ids: Vec<&str> = outcome.scheduled_patients.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "4"]);
}

#[test]
fn search_and_status_filters_compose() {
    let mut patients = sample_patients();
    patients.push(patient("4", "Anand Kumar", PatientQueueStatus::Waiting));

    let outcome = schedule(&patients, &[], &context("an", StatusFilter::Waiting));

    assert_eq!(outcome.scheduled_patients.len(), 1);
    assert_eq!(outcome.scheduled_patients[0].id, "4");
}

#[test]
fn order_is_preserved_no_resort() {
    let patients = vec![
        patient("9", "Zara Khan", PatientQueueStatus::Waiting),
        patient("2", "Anjali Verma", PatientQueueStatus::Waiting),
        patient("5", "Arun Nair", PatientQueueStatus::Waiting),
    ];

    let outcome = schedule(&patients, &[], &context("a", StatusFilter::All));

    let ids: Vec<&str> = outcome.scheduled_patients.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["9", "2", "5"]);
}

#[test]
fn rooms_pass_through_unchanged() {
    let patients = sample_patients();
    let rooms = vec![sample_room()];

    let outcome = schedule(&patients, &rooms, &context("sita", StatusFilter::Waiting));

    assert_eq!(outcome.new_rooms, rooms);
}

#[test]
fn empty_inputs_yield_empty_outputs() {
    let outcome = schedule(&[], &[], &context("anything", StatusFilter::Waiting));

    assert!(outcome.scheduled_patients.is_empty());
    assert!(outcome.new_rooms.is_empty());
}

#[test]
fn inputs_are_not_mutated() {
    let patients = sample_patients();
    let rooms = vec![sample_room()];
    let patients_before = patients.clone();
    let rooms_before = rooms.clone();

    let _ = schedule(&patients, &rooms, &context("an", StatusFilter::Waiting));

    assert_eq!(patients, patients_before);
    assert_eq!(rooms, rooms_before);
}

#[test]
fn unrecognized_filter_value_falls_back_to_all() {
    let filter: StatusFilter = serde_json::from_value(serde_json::json!("no-such-status")).unwrap();
    assert_eq!(filter, StatusFilter::All);

    let filter: StatusFilter = serde_json::from_value(serde_json::json!("in-progress")).unwrap();
    assert_eq!(filter, StatusFilter::InProgress);
}

// Worked example scenarios

#[test]
fn example_scenario_search_an_across_all() {
    let patients = sample_patients();

    let outcome = schedule(&patients, &[], &context("an", StatusFilter::All));

    let names: Vec<&str> = outcome.scheduled_patients.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Anjali Verma"]);
}

#[test]
fn example_scenario_waiting_filter() {
    let patients = sample_patients();

    let outcome = schedule(&patients, &[], &context("", StatusFilter::Waiting));

    let names: Vec<&str> = outcome.scheduled_patients.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Sita"]);
}

// start_consultation

#[test]
fn start_promotes_waiting_patient_and_appends_room() {
    let patients = sample_patients();
    let rooms = vec![sample_room()];
    let now = Utc.with_ymd_and_hms(2026, 8, 6, 10, 30, 0).unwrap();

    let started = start_consultation(&patients, &rooms, "1", now).unwrap();

    let sita = started.patients.iter().find(|p| p.id == "1").unwrap();
    assert_eq!(sita.status, PatientQueueStatus::InProgress);

    assert_eq!(started.rooms.len(), 2);
    assert_eq!(started.room.patient_id, "1");
    assert_eq!(started.room.patient_name, "Sita");
    assert_eq!(started.room.status, RoomStatus::Active);
    assert_eq!(started.room.started_at, "10:30");
    assert_eq!(started.room.duration, "00:00");

    // prior rooms survive untouched
    assert_eq!(started.rooms[0], rooms[0]);

    // inputs untouched
    assert_eq!(patients[0].status, PatientQueueStatus::Waiting);
    assert_eq!(rooms.len(), 1);
}

#[test]
fn start_rejects_unknown_patient() {
    let patients = sample_patients();
    let now = Utc::now();

    let err = start_consultation(&patients, &[], "missing", now).unwrap_err();
    assert_matches!(err, ConsultationError::PatientNotFound(id) if id == "missing");
}

#[test]
fn start_rejects_patient_not_waiting() {
    let patients = sample_patients();
    let now = Utc::now();

    let err = start_consultation(&patients, &[], "3", now).unwrap_err();
    assert_matches!(err, ConsultationError::PatientNotWaiting { .. });
}

#[test]
fn start_generates_fresh_room_ids() {
    let patients = sample_patients();
    let now = Utc::now();

    let first = start_consultation(&patients, &[], "1", now).unwrap();
    let second = start_consultation(&patients, &[], "1", now).unwrap();

    assert_ne!(first.room.id, second.room.id);
}
