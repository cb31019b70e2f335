use serde_json::Value;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Doctor, DoctorError, DoctorSearchFilters};

pub struct DoctorService {
    supabase: SupabaseClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Search doctors by discovery filters. Defaults to verified-only,
    /// available doctors for the public surface.
    pub async fn search_doctors(
        &self,
        filters: DoctorSearchFilters,
        auth_token: &str,
        limit: Option<i32>,
        offset: Option<i32>,
    ) -> Result<Vec<Doctor>, DoctorError> {
        let mut query_parts = vec!["is_available=eq.true".to_string()];

        if let Some(ref specialty) = filters.specialty {
            query_parts.push(format!("specialty=ilike.*{}*", specialty));
        }
        if let Some(min_experience) = filters.min_experience {
            query_parts.push(format!("years_experience=gte.{}", min_experience));
        }
        if let Some(min_rating) = filters.min_rating {
            query_parts.push(format!("rating=gte.{}", min_rating));
        }
        if filters.is_verified_only.unwrap_or(true) {
            query_parts.push("is_verified=eq.true".to_string());
        }

        query_parts.push("order=rating.desc".to_string());
        query_parts.push(format!("limit={}", limit.unwrap_or(20)));
        if let Some(offset) = offset {
            query_parts.push(format!("offset={}", offset));
        }

        let filter = query_parts.join("&");
        debug!("Searching doctors with filter: {}", filter);

        let rows = self
            .supabase
            .select_rows("doctors", &filter, auth_token)
            .await
            .map_err(|e| DoctorError::StoreError(e.to_string()))?;

        let doctors = rows
            .into_iter()
            .filter_map(|row| serde_json::from_value::<Doctor>(row).ok())
            .collect();

        Ok(doctors)
    }

    pub async fn get_doctor(&self, doctor_id: &str, auth_token: &str) -> Result<Doctor, DoctorError> {
        let filter = format!("id=eq.{}", doctor_id);
        let rows = self
            .supabase
            .select_rows("doctors", &filter, auth_token)
            .await
            .map_err(|e| DoctorError::StoreError(e.to_string()))?;

        let row = rows.into_iter().next().ok_or(DoctorError::NotFound)?;

        serde_json::from_value(row).map_err(|e| DoctorError::StoreError(e.to_string()))
    }

    /// Insert the doctor row produced by an approved application.
    pub async fn create_doctor_row(
        &self,
        row: Value,
        auth_token: &str,
    ) -> Result<Doctor, DoctorError> {
        let stored = self
            .supabase
            .insert_row("doctors", row, auth_token)
            .await
            .map_err(|e| DoctorError::StoreError(e.to_string()))?;

        serde_json::from_value(stored).map_err(|e| DoctorError::StoreError(e.to_string()))
    }
}
