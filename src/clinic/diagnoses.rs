use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::require_non_empty;
use crate::error::AppResult;
use crate::storage::{DocumentStore, StoreError, COLLECTION_DIAGNOSES};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiagnosisRequest {
    pub patient_id: String,
    pub doctor_id: String,
    pub disease_code: String,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Diagnosis {
    pub diagnosis_id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub disease_code: String,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

pub fn record_diagnosis(docs: &DocumentStore, req: DiagnosisRequest) -> AppResult<Diagnosis> {
    require_non_empty("patient_id", &req.patient_id)?;
    require_non_empty("doctor_id", &req.doctor_id)?;
    require_non_empty("disease_code", &req.disease_code)?;
    let d = Diagnosis {
        diagnosis_id: Uuid::new_v4().to_string(),
        patient_id: req.patient_id,
        doctor_id: req.doctor_id,
        disease_code: req.disease_code,
        summary: req.summary,
        created_at: Utc::now(),
    };
    docs.set_as(COLLECTION_DIAGNOSES, &d.diagnosis_id, &d)?;
    Ok(d)
}

/// A patient's diagnoses, oldest first.
pub fn list_diagnoses(docs: &DocumentStore, patient_id: &str) -> AppResult<Vec<Diagnosis>> {
    let mut out = Vec::new();
    for (_, doc) in docs.query_eq(COLLECTION_DIAGNOSES, &[("patient_id", json!(patient_id))])? {
        out.push(serde_json::from_value::<Diagnosis>(serde_json::Value::Object(doc)).map_err(StoreError::from)?);
    }
    out.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnoses_are_scoped_to_patient_and_ordered() {
        let docs = DocumentStore::new();
        let first = record_diagnosis(&docs, DiagnosisRequest {
            patient_id: "p-1".into(),
            doctor_id: "482913".into(),
            disease_code: "J00".into(),
            summary: "common cold".into(),
        })
        .unwrap();
        let second = record_diagnosis(&docs, DiagnosisRequest {
            patient_id: "p-1".into(),
            doctor_id: "482913".into(),
            disease_code: "A09".into(),
            summary: String::new(),
        })
        .unwrap();
        record_diagnosis(&docs, DiagnosisRequest {
            patient_id: "p-2".into(),
            doctor_id: "482913".into(),
            disease_code: "J00".into(),
            summary: String::new(),
        })
        .unwrap();

        let listed = list_diagnoses(&docs, "p-1").unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].created_at <= listed[1].created_at);
        assert!(listed.contains(&first) && listed.contains(&second));
        assert!(list_diagnoses(&docs, "p-3").unwrap().is_empty());
    }

    #[test]
    fn disease_code_is_required() {
        let docs = DocumentStore::new();
        let err = record_diagnosis(&docs, DiagnosisRequest {
            patient_id: "p-1".into(),
            doctor_id: "d".into(),
            disease_code: " ".into(),
            summary: String::new(),
        })
        .unwrap_err();
        assert_eq!(err.http_status(), 400);
    }
}
