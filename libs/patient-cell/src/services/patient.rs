use chrono::Utc;
use serde_json::json;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Patient, PatientError, UpdatePatientRequest};

pub struct PatientService {
    supabase: SupabaseClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn get_patient(
        &self,
        patient_id: &str,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        debug!("Fetching patient profile: {}", patient_id);

        let filter = format!("id=eq.{}", patient_id);
        let rows = self
            .supabase
            .select_rows("patients", &filter, auth_token)
            .await
            .map_err(|e| PatientError::StoreError(e.to_string()))?;

        let row = rows.into_iter().next().ok_or(PatientError::NotFound)?;
        serde_json::from_value(row).map_err(|e| PatientError::StoreError(e.to_string()))
    }

    pub async fn update_patient(
        &self,
        patient_id: &str,
        request: UpdatePatientRequest,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        debug!("Updating patient profile: {}", patient_id);

        let mut patch = serde_json::Map::new();

        if let Some(first_name) = request.first_name {
            patch.insert("first_name".to_string(), json!(first_name));
        }
        if let Some(last_name) = request.last_name {
            patch.insert("last_name".to_string(), json!(last_name));
        }
        if let Some(phone_number) = request.phone_number {
            patch.insert("phone_number".to_string(), json!(phone_number));
        }
        if let Some(gender) = request.gender {
            patch.insert("gender".to_string(), json!(gender));
        }
        if let Some(date_of_birth) = request.date_of_birth {
            patch.insert("date_of_birth".to_string(), json!(date_of_birth));
        }
        if let Some(address) = request.address {
            patch.insert("address".to_string(), json!(address));
        }
        if let Some(avatar_url) = request.avatar_url {
            patch.insert("avatar_url".to_string(), json!(avatar_url));
        }

        if patch.is_empty() {
            return Err(PatientError::ValidationError(
                "No fields provided to update".to_string(),
            ));
        }

        patch.insert("updated_at".to_string(), json!(Utc::now()));

        let filter = format!("id=eq.{}", patient_id);
        let updated = self
            .supabase
            .update_rows("patients", &filter, json!(patch), auth_token)
            .await
            .map_err(|e| PatientError::StoreError(e.to_string()))?;

        let row = updated.into_iter().next().ok_or(PatientError::NotFound)?;
        serde_json::from_value(row).map_err(|e| PatientError::StoreError(e.to_string()))
    }
}
