use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A completed symptom-assessment questionnaire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomAssessment {
    pub id: Uuid,
    pub patient_id: String,
    pub symptoms: Vec<String>,
    pub severity: Severity,
    pub duration_days: Option<i32>,
    #[serde(default)]
    pub answers: Vec<AssessmentAnswer>,
    pub notes: Option<String>,
    pub suggested_specialty: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Severity {
    #[serde(rename = "mild")]
    Mild,
    #[serde(rename = "moderate")]
    Moderate,
    #[serde(rename = "severe")]
    Severe,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssessmentAnswer {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitAssessmentRequest {
    pub symptoms: Vec<String>,
    pub severity: Severity,
    pub duration_days: Option<i32>,
    #[serde(default)]
    pub answers: Vec<AssessmentAnswer>,
    pub notes: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error("Assessment not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Store error: {0}")]
    StoreError(String),
}
