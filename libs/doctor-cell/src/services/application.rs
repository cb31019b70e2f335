use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::User;

use crate::models::{
    ApplicationStatus, Doctor, DoctorApplication, DoctorError, ReviewApplicationRequest,
    SubmitApplicationRequest,
};
use crate::services::doctor::DoctorService;

/// Doctor-application review workflow: submission by a prospective doctor,
/// approval/rejection by an admin. Approval creates the verified doctor row.
pub struct ApplicationService {
    supabase: SupabaseClient,
    doctor_service: DoctorService,
}

impl ApplicationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            doctor_service: DoctorService::new(config),
        }
    }

    pub async fn submit(
        &self,
        request: SubmitApplicationRequest,
        user: &User,
        auth_token: &str,
    ) -> Result<DoctorApplication, DoctorError> {
        if request.license_number.trim().is_empty() {
            return Err(DoctorError::ValidationError(
                "license_number cannot be empty".to_string(),
            ));
        }
        if request.specialty.trim().is_empty() {
            return Err(DoctorError::ValidationError(
                "specialty cannot be empty".to_string(),
            ));
        }

        // One open application per user.
        let filter = format!("user_id=eq.{}&status=eq.pending", user.id);
        let pending = self
            .supabase
            .select_rows("doctor_applications", &filter, auth_token)
            .await
            .map_err(|e| DoctorError::StoreError(e.to_string()))?;

        if !pending.is_empty() {
            return Err(DoctorError::DuplicateApplication);
        }

        let row = json!({
            "id": Uuid::new_v4(),
            "user_id": user.id,
            "first_name": request.first_name,
            "last_name": request.last_name,
            "email": request.email,
            "specialty": request.specialty,
            "license_number": request.license_number,
            "years_experience": request.years_experience,
            "bio": request.bio,
            "document_url": request.document_url,
            "status": "pending",
            "review_notes": null,
            "reviewed_by": null,
            "submitted_at": Utc::now(),
            "reviewed_at": null
        });

        let stored = self
            .supabase
            .insert_row("doctor_applications", row, auth_token)
            .await
            .map_err(|e| DoctorError::StoreError(e.to_string()))?;

        info!("Doctor application submitted by user {}", user.id);

        serde_json::from_value(stored).map_err(|e| DoctorError::StoreError(e.to_string()))
    }

    pub async fn list(
        &self,
        status: Option<ApplicationStatus>,
        auth_token: &str,
    ) -> Result<Vec<DoctorApplication>, DoctorError> {
        let filter = match status {
            Some(ApplicationStatus::Pending) => "status=eq.pending&order=submitted_at.asc",
            Some(ApplicationStatus::Approved) => "status=eq.approved&order=submitted_at.asc",
            Some(ApplicationStatus::Rejected) => "status=eq.rejected&order=submitted_at.asc",
            None => "order=submitted_at.asc",
        };

        let rows = self
            .supabase
            .select_rows("doctor_applications", filter, auth_token)
            .await
            .map_err(|e| DoctorError::StoreError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .filter_map(|row| serde_json::from_value(row).ok())
            .collect())
    }

    pub async fn get(
        &self,
        application_id: &str,
        auth_token: &str,
    ) -> Result<DoctorApplication, DoctorError> {
        let filter = format!("id=eq.{}", application_id);
        let rows = self
            .supabase
            .select_rows("doctor_applications", &filter, auth_token)
            .await
            .map_err(|e| DoctorError::StoreError(e.to_string()))?;

        let row = rows
            .into_iter()
            .next()
            .ok_or(DoctorError::ApplicationNotFound)?;

        serde_json::from_value(row).map_err(|e| DoctorError::StoreError(e.to_string()))
    }

    /// Approve: mark the application and create the verified doctor profile.
    pub async fn approve(
        &self,
        application_id: &str,
        request: ReviewApplicationRequest,
        reviewer: &User,
        auth_token: &str,
    ) -> Result<Doctor, DoctorError> {
        let application = self.get(application_id, auth_token).await?;

        if application.status.is_reviewed() {
            return Err(DoctorError::AlreadyReviewed(
                application.status.as_str().to_string(),
            ));
        }

        self.mark_reviewed(application_id, "approved", &request, reviewer, auth_token)
            .await?;

        let doctor_row = json!({
            "id": Uuid::new_v4(),
            "first_name": application.first_name,
            "last_name": application.last_name,
            "email": application.email,
            "specialty": application.specialty,
            "bio": application.bio,
            "profile_image_url": null,
            "license_number": application.license_number,
            "years_experience": application.years_experience,
            "is_verified": true,
            "is_available": true,
            "rating": 0.0,
            "total_consultations": 0,
            "created_at": Utc::now(),
            "updated_at": Utc::now()
        });

        let doctor = self
            .doctor_service
            .create_doctor_row(doctor_row, auth_token)
            .await?;

        info!(
            "Application {} approved by {}; doctor profile {} created",
            application_id, reviewer.id, doctor.id
        );

        Ok(doctor)
    }

    pub async fn reject(
        &self,
        application_id: &str,
        request: ReviewApplicationRequest,
        reviewer: &User,
        auth_token: &str,
    ) -> Result<DoctorApplication, DoctorError> {
        let application = self.get(application_id, auth_token).await?;

        if application.status.is_reviewed() {
            return Err(DoctorError::AlreadyReviewed(
                application.status.as_str().to_string(),
            ));
        }

        self.mark_reviewed(application_id, "rejected", &request, reviewer, auth_token)
            .await?;

        info!("Application {} rejected by {}", application_id, reviewer.id);

        self.get(application_id, auth_token).await
    }

    async fn mark_reviewed(
        &self,
        application_id: &str,
        status: &str,
        request: &ReviewApplicationRequest,
        reviewer: &User,
        auth_token: &str,
    ) -> Result<(), DoctorError> {
        let filter = format!("id=eq.{}", application_id);
        debug!("Marking application {} as {}", application_id, status);

        let updated = self
            .supabase
            .update_rows(
                "doctor_applications",
                &filter,
                json!({
                    "status": status,
                    "review_notes": request.review_notes,
                    "reviewed_by": reviewer.id,
                    "reviewed_at": Utc::now()
                }),
                auth_token,
            )
            .await
            .map_err(|e| DoctorError::StoreError(e.to_string()))?;

        if updated.is_empty() {
            return Err(DoctorError::ApplicationNotFound);
        }

        Ok(())
    }
}
