//! Consultation requests and their video-call rooms.
//!
//! Lifecycle: `Waiting -> InCall -> Completed`, or `Waiting -> Cancelled`.
//! Transitions run under the document store's write lock, so two doctors
//! cannot both pick up the same waiting patient.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::require_non_empty;
use crate::error::{AppError, AppResult};
use crate::storage::{DocumentStore, StoreError, COLLECTION_CONSULTATIONS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationStatus {
    Waiting,
    InCall,
    Completed,
    Cancelled,
}

impl ConsultationStatus {
    fn can_become(self, next: ConsultationStatus) -> bool {
        use ConsultationStatus::*;
        matches!((self, next), (Waiting, InCall) | (InCall, Completed) | (Waiting, Cancelled))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Consultation {
    pub consultation_id: String,
    pub patient_name: String,
    pub symptoms: String,
    pub requested_at: DateTime<Utc>,
    #[serde(default)]
    pub hospital_id: Option<i64>,
    #[serde(default)]
    pub department: Option<String>,
    pub status: ConsultationStatus,
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
}

impl Consultation {
    fn transition(&mut self, next: ConsultationStatus) -> AppResult<()> {
        if !self.status.can_become(next) {
            return Err(AppError::conflict(
                "invalid_transition".to_string(),
                format!("consultation {} cannot go from {:?} to {:?}", self.consultation_id, self.status, next),
            ));
        }
        self.status = next;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsultationRequest {
    pub patient_name: String,
    pub symptoms: String,
    #[serde(default)]
    pub hospital_id: Option<i64>,
    #[serde(default)]
    pub department: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VideoRoom {
    pub consultation_id: String,
    pub room_id: String,
}

fn not_found(id: &str) -> AppError {
    AppError::not_found("consultation_not_found".to_string(), format!("no consultation {}", id))
}

/// Run a transition closure against a stored consultation, mapping a missing document to 404.
fn modify<R>(docs: &DocumentStore, id: &str, f: impl FnOnce(&mut Consultation) -> AppResult<R>) -> AppResult<R> {
    match docs.update_with(COLLECTION_CONSULTATIONS, id, f) {
        Ok(inner) => inner,
        Err(StoreError::NotFound { .. }) => Err(not_found(id)),
        Err(e) => Err(e.into()),
    }
}

pub fn request_consultation(docs: &DocumentStore, req: ConsultationRequest) -> AppResult<Consultation> {
    require_non_empty("patient_name", &req.patient_name)?;
    let c = Consultation {
        consultation_id: Uuid::new_v4().to_string(),
        patient_name: req.patient_name,
        symptoms: req.symptoms,
        requested_at: Utc::now(),
        hospital_id: req.hospital_id,
        department: req.department,
        status: ConsultationStatus::Waiting,
        room_id: None,
        started_at: None,
        ended_at: None,
    };
    docs.set_as(COLLECTION_CONSULTATIONS, &c.consultation_id, &c)?;
    tracing::info!(target: "clinic", id = %c.consultation_id, "consultation requested");
    Ok(c)
}

pub fn get_consultation(docs: &DocumentStore, id: &str) -> AppResult<Consultation> {
    docs.get_as::<Consultation>(COLLECTION_CONSULTATIONS, id)?.ok_or_else(|| not_found(id))
}

/// Consultations oldest first, optionally restricted to one status.
pub fn list_consultations(docs: &DocumentStore, status: Option<ConsultationStatus>) -> AppResult<Vec<Consultation>> {
    let mut out = Vec::new();
    for (_, doc) in docs.stream(COLLECTION_CONSULTATIONS)? {
        let c: Consultation = serde_json::from_value(serde_json::Value::Object(doc)).map_err(StoreError::from)?;
        if status.map(|s| s == c.status).unwrap_or(true) {
            out.push(c);
        }
    }
    out.sort_by(|a, b| a.requested_at.cmp(&b.requested_at));
    Ok(out)
}

pub fn start_video_call(docs: &DocumentStore, id: &str) -> AppResult<VideoRoom> {
    let room = modify(docs, id, |c| {
        c.transition(ConsultationStatus::InCall)?;
        let room_id = format!("room-{}", Uuid::new_v4().simple());
        c.room_id = Some(room_id.clone());
        c.started_at = Some(Utc::now());
        Ok(VideoRoom { consultation_id: c.consultation_id.clone(), room_id })
    })?;
    tracing::info!(target: "clinic", id, room = %room.room_id, "video call started");
    Ok(room)
}

/// The room of a consultation that is currently in a call.
pub fn video_room(docs: &DocumentStore, id: &str) -> AppResult<VideoRoom> {
    let c = get_consultation(docs, id)?;
    match (c.status, c.room_id) {
        (ConsultationStatus::InCall, Some(room_id)) => Ok(VideoRoom { consultation_id: c.consultation_id, room_id }),
        (status, _) => Err(AppError::conflict("not_in_call".to_string(), format!("consultation {} is {:?}", id, status))),
    }
}

pub fn end_video_call(docs: &DocumentStore, id: &str) -> AppResult<Consultation> {
    modify(docs, id, |c| {
        c.transition(ConsultationStatus::Completed)?;
        c.ended_at = Some(Utc::now());
        Ok(c.clone())
    })
}

pub fn cancel_consultation(docs: &DocumentStore, id: &str) -> AppResult<Consultation> {
    modify(docs, id, |c| {
        c.transition(ConsultationStatus::Cancelled)?;
        c.ended_at = Some(Utc::now());
        Ok(c.clone())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn waiting(docs: &DocumentStore, patient: &str) -> Consultation {
        request_consultation(docs, ConsultationRequest {
            patient_name: patient.into(),
            symptoms: "cough, fever".into(),
            hospital_id: Some(7),
            department: Some("Pediatrics".into()),
        })
        .unwrap()
    }

    #[test]
    fn full_call_lifecycle() {
        let docs = DocumentStore::new();
        let c = waiting(&docs, "Hong Gildong");
        assert_eq!(c.status, ConsultationStatus::Waiting);

        let room = start_video_call(&docs, &c.consultation_id).unwrap();
        assert!(room.room_id.starts_with("room-"));
        assert_eq!(video_room(&docs, &c.consultation_id).unwrap(), room);

        let done = end_video_call(&docs, &c.consultation_id).unwrap();
        assert_eq!(done.status, ConsultationStatus::Completed);
        assert!(done.started_at.is_some() && done.ended_at.is_some());
        assert_eq!(video_room(&docs, &c.consultation_id).unwrap_err().http_status(), 409);
    }

    #[test]
    fn invalid_transitions_conflict_and_leave_state_untouched() {
        let docs = DocumentStore::new();
        let c = waiting(&docs, "Kim Cheolsu");
        assert_eq!(end_video_call(&docs, &c.consultation_id).unwrap_err().http_status(), 409);
        start_video_call(&docs, &c.consultation_id).unwrap();
        assert_eq!(start_video_call(&docs, &c.consultation_id).unwrap_err().http_status(), 409);
        assert_eq!(cancel_consultation(&docs, &c.consultation_id).unwrap_err().http_status(), 409);
        assert_eq!(get_consultation(&docs, &c.consultation_id).unwrap().status, ConsultationStatus::InCall);
    }

    #[test]
    fn unknown_consultation_is_not_found() {
        let docs = DocumentStore::new();
        assert_eq!(start_video_call(&docs, "nope").unwrap_err().http_status(), 404);
        assert_eq!(get_consultation(&docs, "nope").unwrap_err().http_status(), 404);
    }

    #[test]
    fn listing_filters_by_status() {
        let docs = DocumentStore::new();
        let a = waiting(&docs, "A");
        let b = waiting(&docs, "B");
        cancel_consultation(&docs, &b.consultation_id).unwrap();

        let waiting_only = list_consultations(&docs, Some(ConsultationStatus::Waiting)).unwrap();
        assert_eq!(waiting_only.len(), 1);
        assert_eq!(waiting_only[0].consultation_id, a.consultation_id);
        assert_eq!(list_consultations(&docs, None).unwrap().len(), 2);
    }
}
