use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{ConsultationError, ConsultationPatient, PatientQueueStatus, TriagePriority};

/// Builds the matcher's candidate list from appointment records.
pub struct ConsultationQueueService {
    supabase: SupabaseClient,
}

impl ConsultationQueueService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Fetch the doctor's open appointments and map each record into a
    /// `ConsultationPatient`. Records that are missing an id or a scheduled
    /// time are skipped; other malformed fields default rather than fail.
    pub async fn fetch_queue(
        &self,
        doctor_id: &str,
        auth_token: &str,
    ) -> Result<Vec<ConsultationPatient>, ConsultationError> {
        let filter = format!(
            "doctor_id=eq.{}&status=in.(scheduled,waiting,in_progress)&order=scheduled_time.asc",
            doctor_id
        );

        let rows = self
            .supabase
            .select_rows("appointments", &filter, auth_token)
            .await
            .map_err(|e| ConsultationError::StoreError(e.to_string()))?;

        debug!("Fetched {} open appointments for doctor {}", rows.len(), doctor_id);

        Ok(rows.iter().filter_map(patient_from_record).collect())
    }

    /// Persist an appointment status change (the store-side half of
    /// starting or ending a consultation).
    pub async fn update_appointment_status(
        &self,
        appointment_id: &str,
        status: &str,
        auth_token: &str,
    ) -> Result<(), ConsultationError> {
        let filter = format!("id=eq.{}", appointment_id);
        let updated = self
            .supabase
            .update_rows(
                "appointments",
                &filter,
                serde_json::json!({
                    "status": status,
                    "updated_at": Utc::now(),
                }),
                auth_token,
            )
            .await
            .map_err(|e| ConsultationError::StoreError(e.to_string()))?;

        if updated.is_empty() {
            return Err(ConsultationError::PatientNotFound(appointment_id.to_string()));
        }

        Ok(())
    }
}

/// Typed boundary: appointment record -> consultation candidate.
/// `None` only when the record lacks an id or a parseable scheduled time.
pub fn patient_from_record(record: &Value) -> Option<ConsultationPatient> {
    let id = record.get("id")?.as_str()?.to_string();

    let appointment_time = record
        .get("scheduled_time")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<DateTime<Utc>>().ok())?;

    let name = record
        .get("patient_name")
        .and_then(|v| v.as_str())
        .unwrap_or("Unknown patient")
        .to_string();

    let status = match record.get("status").and_then(|v| v.as_str()) {
        Some("waiting") => PatientQueueStatus::Waiting,
        Some("in_progress") => PatientQueueStatus::InProgress,
        Some("completed") => PatientQueueStatus::Completed,
        Some("scheduled") => PatientQueueStatus::Scheduled,
        other => {
            warn!("Appointment {} has unrecognized status {:?}, defaulting to scheduled", id, other);
            PatientQueueStatus::Scheduled
        }
    };

    let priority = match record.get("priority").and_then(|v| v.as_str()) {
        Some("low") => TriagePriority::Low,
        Some("high") => TriagePriority::High,
        _ => TriagePriority::default(),
    };

    let mut symptoms: Vec<String> = record
        .get("symptoms")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|s| s.as_str())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    if symptoms.is_empty() {
        if let Some(reason) = record.get("reason").and_then(|v| v.as_str()) {
            symptoms.push(reason.to_string());
        }
    }

    Some(ConsultationPatient {
        id,
        name,
        age: record.get("patient_age").and_then(|v| v.as_i64()).map(|v| v as i32),
        gender: record
            .get("patient_gender")
            .and_then(|v| v.as_str())
            .map(String::from),
        appointment_time,
        status,
        symptoms,
        priority,
        avatar_url: record
            .get("patient_avatar_url")
            .and_then(|v| v.as_str())
            .map(String::from),
        last_consultation: record
            .get("last_consultation")
            .and_then(|v| v.as_str())
            .map(String::from),
    })
}
