use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::require_non_empty;
use crate::error::{AppError, AppResult};
use crate::storage::{DocumentStore, StoreError, COLLECTION_PRESCRIPTIONS};

/// Accepted both as JSON and as an HTML form post.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrescriptionRequest {
    pub patient_id: String,
    pub doctor_id: String,
    pub disease_code: String,
    pub medication_code: String,
    pub days: u32,
    #[serde(default)]
    pub memo: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prescription {
    pub prescription_id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub disease_code: String,
    pub medication_code: String,
    pub days: u32,
    pub memo: String,
    pub created_at: DateTime<Utc>,
}

pub fn submit_prescription(docs: &DocumentStore, req: PrescriptionRequest) -> AppResult<Prescription> {
    require_non_empty("patient_id", &req.patient_id)?;
    require_non_empty("doctor_id", &req.doctor_id)?;
    require_non_empty("disease_code", &req.disease_code)?;
    require_non_empty("medication_code", &req.medication_code)?;
    if req.days == 0 {
        return Err(AppError::user("invalid_days", "days must be at least 1"));
    }
    let p = Prescription {
        prescription_id: Uuid::new_v4().to_string(),
        patient_id: req.patient_id,
        doctor_id: req.doctor_id,
        disease_code: req.disease_code,
        medication_code: req.medication_code,
        days: req.days,
        memo: req.memo,
        created_at: Utc::now(),
    };
    docs.set_as(COLLECTION_PRESCRIPTIONS, &p.prescription_id, &p)?;
    tracing::info!(target: "clinic", id = %p.prescription_id, patient = %p.patient_id, "prescription stored");
    Ok(p)
}

pub fn prescriptions_for_patient(docs: &DocumentStore, patient_id: &str) -> AppResult<Vec<Prescription>> {
    let mut out = docs
        .query_eq(COLLECTION_PRESCRIPTIONS, &[("patient_id", json!(patient_id))])?
        .into_iter()
        .map(|(_, doc)| serde_json::from_value::<Prescription>(serde_json::Value::Object(doc)))
        .collect::<Result<Vec<_>, _>>()
        .map_err(StoreError::from)?;
    out.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(out)
}
