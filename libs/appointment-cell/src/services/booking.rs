use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::User;

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, CreateAppointmentRequest,
};

const DEFAULT_DURATION_MINUTES: i32 = 30;

pub struct AppointmentBookingService {
    supabase: SupabaseClient,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Book an appointment for the authenticated patient: the doctor must
    /// exist and be available, and the slot must not overlap one of the
    /// doctor's open appointments.
    pub async fn book(
        &self,
        request: CreateAppointmentRequest,
        user: &User,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let duration = request.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES);
        if duration <= 0 {
            return Err(AppointmentError::ValidationError(
                "duration_minutes must be positive".to_string(),
            ));
        }
        if request.scheduled_time <= Utc::now() {
            return Err(AppointmentError::ValidationError(
                "scheduled_time must be in the future".to_string(),
            ));
        }

        self.verify_doctor_available(&request.doctor_id, auth_token).await?;

        let candidate = Appointment {
            id: Uuid::new_v4(),
            patient_id: user
                .id
                .parse()
                .map_err(|_| AppointmentError::ValidationError("Invalid user id".to_string()))?,
            doctor_id: request.doctor_id,
            patient_name: user.email.clone(),
            scheduled_time: request.scheduled_time,
            duration_minutes: duration,
            appointment_type: request.appointment_type,
            status: AppointmentStatus::Scheduled,
            reason: request.reason,
            symptoms: request.symptoms,
            priority: request.priority.unwrap_or_default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        self.check_for_conflicts(&candidate, auth_token).await?;

        let row = serde_json::to_value(&candidate)
            .map_err(|e| AppointmentError::StoreError(e.to_string()))?;

        let stored = self
            .supabase
            .insert_row("appointments", row, auth_token)
            .await
            .map_err(|e| AppointmentError::StoreError(e.to_string()))?;

        info!(
            "Booked appointment {} for patient {} with doctor {}",
            candidate.id, candidate.patient_id, candidate.doctor_id
        );

        serde_json::from_value(stored).map_err(|e| AppointmentError::StoreError(e.to_string()))
    }

    pub async fn get(
        &self,
        appointment_id: &str,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let filter = format!("id=eq.{}", appointment_id);
        let rows = self
            .supabase
            .select_rows("appointments", &filter, auth_token)
            .await
            .map_err(|e| AppointmentError::StoreError(e.to_string()))?;

        let row = rows.into_iter().next().ok_or(AppointmentError::NotFound)?;
        serde_json::from_value(row).map_err(|e| AppointmentError::StoreError(e.to_string()))
    }

    pub async fn list_for_patient(
        &self,
        patient_id: &str,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        self.list(&format!("patient_id=eq.{}&order=scheduled_time.asc", patient_id), auth_token)
            .await
    }

    pub async fn list_for_doctor(
        &self,
        doctor_id: &str,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        self.list(&format!("doctor_id=eq.{}&order=scheduled_time.asc", doctor_id), auth_token)
            .await
    }

    /// Apply a status change after validating the lifecycle transition.
    pub async fn update_status(
        &self,
        appointment_id: &str,
        next: AppointmentStatus,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let current = self.get(appointment_id, auth_token).await?;

        if !current.status.can_transition_to(next) {
            return Err(AppointmentError::IllegalTransition {
                from: current.status.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }

        let filter = format!("id=eq.{}", appointment_id);
        let updated = self
            .supabase
            .update_rows(
                "appointments",
                &filter,
                json!({
                    "status": next.as_str(),
                    "updated_at": Utc::now()
                }),
                auth_token,
            )
            .await
            .map_err(|e| AppointmentError::StoreError(e.to_string()))?;

        let row = updated.into_iter().next().ok_or(AppointmentError::NotFound)?;
        serde_json::from_value(row).map_err(|e| AppointmentError::StoreError(e.to_string()))
    }

    async fn list(
        &self,
        filter: &str,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let rows = self
            .supabase
            .select_rows("appointments", filter, auth_token)
            .await
            .map_err(|e| AppointmentError::StoreError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .filter_map(|row| serde_json::from_value(row).ok())
            .collect())
    }

    async fn verify_doctor_available(
        &self,
        doctor_id: &Uuid,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        let filter = format!("id=eq.{}&is_available=eq.true", doctor_id);
        let rows = self
            .supabase
            .select_rows("doctors", &filter, auth_token)
            .await
            .map_err(|e| AppointmentError::StoreError(e.to_string()))?;

        if rows.is_empty() {
            return Err(AppointmentError::DoctorUnavailable);
        }

        Ok(())
    }

    async fn check_for_conflicts(
        &self,
        candidate: &Appointment,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        let filter = format!(
            "doctor_id=eq.{}&status=in.(scheduled,waiting,in_progress)",
            candidate.doctor_id
        );
        let open = self.list(&filter, auth_token).await?;

        debug!(
            "Checking {} open appointments for doctor {} against candidate slot",
            open.len(),
            candidate.doctor_id
        );

        if open.iter().any(|existing| existing.overlaps(candidate)) {
            return Err(AppointmentError::SlotConflict);
        }

        Ok(())
    }
}
