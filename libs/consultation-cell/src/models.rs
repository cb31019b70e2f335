use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A candidate for consultation, derived from an appointment record.
/// Held only in memory for the lifetime of a queue view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsultationPatient {
    pub id: String,
    pub name: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub appointment_time: DateTime<Utc>,
    pub status: PatientQueueStatus,
    pub symptoms: Vec<String>,
    pub priority: TriagePriority,
    pub avatar_url: Option<String>,
    pub last_consultation: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PatientQueueStatus {
    #[serde(rename = "scheduled")]
    Scheduled,
    #[serde(rename = "waiting")]
    Waiting,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
}

impl PatientQueueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientQueueStatus::Scheduled => "scheduled",
            PatientQueueStatus::Waiting => "waiting",
            PatientQueueStatus::InProgress => "in-progress",
            PatientQueueStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TriagePriority {
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "high")]
    High,
}

impl Default for TriagePriority {
    fn default() -> Self {
        TriagePriority::Medium
    }
}

/// An in-memory record of an active or pending one-to-one session.
/// Not persisted; lifetime bounded to the server process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsultationRoom {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub status: RoomStatus,
    pub started_at: String,
    pub duration: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RoomStatus {
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "waiting")]
    Waiting,
}

/// Filter context the matcher runs under. Recomputed on every invocation.
#[derive(Debug, Clone)]
pub struct ScheduleContext {
    pub search_term: String,
    pub filter_status: StatusFilter,
    pub current_time: DateTime<Utc>,
}

/// Displayed-subset restriction. Unrecognized wire values fall back to `All`
/// at the deserialization boundary; the matcher itself never validates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(from = "String")]
pub enum StatusFilter {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "scheduled")]
    Scheduled,
    #[serde(rename = "waiting")]
    Waiting,
    #[serde(rename = "in-progress")]
    InProgress,
}

impl From<String> for StatusFilter {
    fn from(value: String) -> Self {
        match value.as_str() {
            "scheduled" => StatusFilter::Scheduled,
            "waiting" => StatusFilter::Waiting,
            "in-progress" => StatusFilter::InProgress,
            _ => StatusFilter::All,
        }
    }
}

impl StatusFilter {
    pub fn matches(&self, status: PatientQueueStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Scheduled => status == PatientQueueStatus::Scheduled,
            StatusFilter::Waiting => status == PatientQueueStatus::Waiting,
            StatusFilter::InProgress => status == PatientQueueStatus::InProgress,
        }
    }
}

/// Output pair of the matcher.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleOutcome {
    pub scheduled_patients: Vec<ConsultationPatient>,
    pub new_rooms: Vec<ConsultationRoom>,
}

/// Result of the imperative start-consultation action: the updated lists
/// plus the room that was appended.
#[derive(Debug, Clone, Serialize)]
pub struct ConsultationStart {
    pub patients: Vec<ConsultationPatient>,
    pub rooms: Vec<ConsultationRoom>,
    pub room: ConsultationRoom,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartConsultationRequest {
    pub patient_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueueQuery {
    pub search_term: Option<String>,
    pub filter_status: Option<StatusFilter>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConsultationError {
    #[error("Patient {0} not found in the consultation queue")]
    PatientNotFound(String),

    #[error("Patient {patient_id} is not waiting (status: {status})")]
    PatientNotWaiting { patient_id: String, status: String },

    #[error("Consultation room {0} not found")]
    RoomNotFound(String),

    #[error("Store error: {0}")]
    StoreError(String),
}
