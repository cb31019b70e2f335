use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::models::{
    ConsultationError, ConsultationPatient, ConsultationRoom, ConsultationStart,
    PatientQueueStatus, RoomStatus, ScheduleContext, ScheduleOutcome,
};

/// Map the candidate list and current rooms to the displayed subset and a
/// room list, under the given filter context.
///
/// Pure and synchronous: safe to re-invoke on every queue refresh. The
/// status filter is applied first, then the search filter (case-insensitive
/// substring of the patient name; reason text is matched by the caller).
/// Order is preserved from the input and `rooms` passes through untouched —
/// room mutation happens only via [`start_consultation`].
pub fn schedule(
    patients: &[ConsultationPatient],
    rooms: &[ConsultationRoom],
    context: &ScheduleContext,
) -> ScheduleOutcome {
    let needle = context.search_term.to_lowercase();

    let scheduled_patients = patients
        .iter()
        .filter(|patient| context.filter_status.matches(patient.status))
        .filter(|patient| needle.is_empty() || patient.name.to_lowercase().contains(&needle))
        .cloned()
        .collect();

    ScheduleOutcome {
        scheduled_patients,
        new_rooms: rooms.to_vec(),
    }
}

/// Promote a waiting patient to in-progress and append a fresh active room.
///
/// This is the imperative counterpart to [`schedule`]: inputs are not
/// mutated, the updated lists are returned for the caller to install. There
/// is no capacity limit and no check for an existing room referencing the
/// same patient; callers are expected to re-run [`schedule`] afterwards to
/// refresh their view.
pub fn start_consultation(
    patients: &[ConsultationPatient],
    rooms: &[ConsultationRoom],
    patient_id: &str,
    now: DateTime<Utc>,
) -> Result<ConsultationStart, ConsultationError> {
    let patient = patients
        .iter()
        .find(|p| p.id == patient_id)
        .ok_or_else(|| ConsultationError::PatientNotFound(patient_id.to_string()))?;

    if patient.status != PatientQueueStatus::Waiting {
        return Err(ConsultationError::PatientNotWaiting {
            patient_id: patient_id.to_string(),
            status: patient.status.as_str().to_string(),
        });
    }

    let room = ConsultationRoom {
        id: format!("room-{}", Uuid::new_v4()),
        patient_id: patient.id.clone(),
        patient_name: patient.name.clone(),
        status: RoomStatus::Active,
        started_at: now.format("%H:%M").to_string(),
        duration: "00:00".to_string(),
    };

    debug!("Starting consultation {} for patient {}", room.id, patient.id);

    let updated_patients = patients
        .iter()
        .map(|p| {
            if p.id == patient_id {
                let mut promoted = p.clone();
                promoted.status = PatientQueueStatus::InProgress;
                promoted
            } else {
                p.clone()
            }
        })
        .collect();

    let mut updated_rooms = rooms.to_vec();
    updated_rooms.push(room.clone());

    Ok(ConsultationStart {
        patients: updated_patients,
        rooms: updated_rooms,
        room,
    })
}
