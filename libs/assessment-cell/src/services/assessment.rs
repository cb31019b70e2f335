use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::User;

use crate::models::{AssessmentError, SubmitAssessmentRequest, SymptomAssessment};

/// Keyword table mapping reported symptoms to the specialty most likely to
/// handle them. First hit wins; unmatched symptom sets fall back to general
/// medicine at the caller's discretion (no suggestion is recorded).
const SPECIALTY_KEYWORDS: &[(&str, &str)] = &[
    ("chest pain", "Cardiology"),
    ("palpitation", "Cardiology"),
    ("breathless", "Cardiology"),
    ("rash", "Dermatology"),
    ("itch", "Dermatology"),
    ("acne", "Dermatology"),
    ("skin", "Dermatology"),
    ("headache", "Neurology"),
    ("migraine", "Neurology"),
    ("dizziness", "Neurology"),
    ("seizure", "Neurology"),
    ("joint pain", "Orthopedics"),
    ("back pain", "Orthopedics"),
    ("fracture", "Orthopedics"),
    ("anxiety", "Psychiatry"),
    ("depression", "Psychiatry"),
    ("insomnia", "Psychiatry"),
    ("stomach", "Gastroenterology"),
    ("abdominal", "Gastroenterology"),
    ("nausea", "Gastroenterology"),
    ("diarrhea", "Gastroenterology"),
    ("cough", "Pulmonology"),
    ("wheezing", "Pulmonology"),
    ("asthma", "Pulmonology"),
    ("ear", "ENT"),
    ("throat", "ENT"),
    ("sinus", "ENT"),
];

/// Suggest a specialty from reported symptom strings, case-insensitively.
pub fn suggest_specialty(symptoms: &[String]) -> Option<String> {
    for symptom in symptoms {
        let lowered = symptom.to_lowercase();
        for (keyword, specialty) in SPECIALTY_KEYWORDS {
            if lowered.contains(keyword) {
                return Some((*specialty).to_string());
            }
        }
    }
    None
}

pub struct AssessmentService {
    supabase: SupabaseClient,
}

impl AssessmentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn submit(
        &self,
        request: SubmitAssessmentRequest,
        user: &User,
        auth_token: &str,
    ) -> Result<SymptomAssessment, AssessmentError> {
        if request.symptoms.is_empty() {
            return Err(AssessmentError::ValidationError(
                "At least one symptom is required".to_string(),
            ));
        }

        let assessment = SymptomAssessment {
            id: Uuid::new_v4(),
            patient_id: user.id.clone(),
            suggested_specialty: suggest_specialty(&request.symptoms),
            symptoms: request.symptoms,
            severity: request.severity,
            duration_days: request.duration_days,
            answers: request.answers,
            notes: request.notes,
            created_at: Utc::now(),
        };

        let row = serde_json::to_value(&assessment)
            .map_err(|e| AssessmentError::StoreError(e.to_string()))?;

        let stored = self
            .supabase
            .insert_row("symptom_assessments", row, auth_token)
            .await
            .map_err(|e| AssessmentError::StoreError(e.to_string()))?;

        info!(
            "Stored symptom assessment {} for patient {}",
            assessment.id, assessment.patient_id
        );

        serde_json::from_value(stored).map_err(|e| AssessmentError::StoreError(e.to_string()))
    }

    pub async fn get(
        &self,
        assessment_id: &str,
        auth_token: &str,
    ) -> Result<SymptomAssessment, AssessmentError> {
        let filter = format!("id=eq.{}", assessment_id);
        let rows = self
            .supabase
            .select_rows("symptom_assessments", &filter, auth_token)
            .await
            .map_err(|e| AssessmentError::StoreError(e.to_string()))?;

        let row = rows.into_iter().next().ok_or(AssessmentError::NotFound)?;
        serde_json::from_value(row).map_err(|e| AssessmentError::StoreError(e.to_string()))
    }

    pub async fn list_for_patient(
        &self,
        patient_id: &str,
        auth_token: &str,
    ) -> Result<Vec<SymptomAssessment>, AssessmentError> {
        let filter = format!("patient_id=eq.{}&order=created_at.desc", patient_id);
        debug!("Listing assessments for patient {}", patient_id);

        let rows = self
            .supabase
            .select_rows("symptom_assessments", &filter, auth_token)
            .await
            .map_err(|e| AssessmentError::StoreError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .filter_map(|row| serde_json::from_value(row).ok())
            .collect())
    }
}
