use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub patient_name: Option<String>,
    pub scheduled_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub appointment_type: AppointmentType,
    pub status: AppointmentStatus,
    pub reason: Option<String>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub priority: AppointmentPriority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn end_time(&self) -> DateTime<Utc> {
        self.scheduled_time + Duration::minutes(self.duration_minutes as i64)
    }

    /// Half-open interval overlap against another appointment.
    pub fn overlaps(&self, other: &Appointment) -> bool {
        self.scheduled_time < other.end_time() && other.scheduled_time < self.end_time()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AppointmentType {
    #[serde(rename = "video")]
    Video,
    #[serde(rename = "chat")]
    Chat,
    #[serde(rename = "in_person")]
    InPerson,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AppointmentStatus {
    #[serde(rename = "scheduled")]
    Scheduled,
    #[serde(rename = "waiting")]
    Waiting,
    #[serde(rename = "in_progress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl AppointmentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }

    /// Legal lifecycle moves: scheduled -> waiting -> in_progress ->
    /// completed, with cancellation allowed from any non-terminal state.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        if *self == next {
            return false;
        }
        match (self, next) {
            (_, AppointmentStatus::Cancelled) => !self.is_terminal(),
            (AppointmentStatus::Scheduled, AppointmentStatus::Waiting) => true,
            (AppointmentStatus::Waiting, AppointmentStatus::InProgress) => true,
            (AppointmentStatus::InProgress, AppointmentStatus::Completed) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Waiting => "waiting",
            AppointmentStatus::InProgress => "in_progress",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AppointmentPriority {
    #[serde(rename = "low")]
    Low,
    #[default]
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "high")]
    High,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentRequest {
    pub doctor_id: Uuid,
    pub scheduled_time: DateTime<Utc>,
    pub duration_minutes: Option<i32>,
    pub appointment_type: AppointmentType,
    pub reason: Option<String>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    pub priority: Option<AppointmentPriority>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor not found or unavailable")]
    DoctorUnavailable,

    #[error("Requested slot overlaps an existing appointment")]
    SlotConflict,

    #[error("Illegal status transition from {from} to {to}")]
    IllegalTransition { from: String, to: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Store error: {0}")]
    StoreError(String),
}
