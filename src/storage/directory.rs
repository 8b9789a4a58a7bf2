//! Lookup capabilities the login resolver depends on, and their adapters over
//! the table and document stores.

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};

use super::{DocumentStore, StoreError, StoreResult, TableStore};
use super::{COLLECTION_ADMINS, COLLECTION_DOCTORS, TABLE_HOSPITALS};
use crate::identity::{AdminRecord, DoctorRecord, Principal};

/// Exact-match facility lookup by display name.
#[async_trait]
pub trait FacilityDirectory: Send + Sync {
    async fn lookup_facility_id(&self, name: &str) -> StoreResult<Option<i64>>;
}

/// Principal lookups scoped by facility.
#[async_trait]
pub trait PrincipalDirectory: Send + Sync {
    /// First doctor registered at (facility_id, department), if any.
    async fn lookup_doctor(&self, facility_id: i64, department: &str) -> StoreResult<Option<Principal>>;
    /// The admin account of a facility, if any.
    async fn lookup_admin(&self, facility_id: i64) -> StoreResult<Option<Principal>>;
}

/// Ids arrive as JSON numbers, integral floats or numeric strings depending on who wrote them.
pub fn coerce_i64(v: &JsonValue) -> Option<i64> {
    match v {
        JsonValue::Number(n) => n.as_i64().or_else(|| {
            n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64).map(|f| f as i64)
        }),
        JsonValue::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

#[async_trait]
impl FacilityDirectory for TableStore {
    async fn lookup_facility_id(&self, name: &str) -> StoreResult<Option<i64>> {
        let items = self.scan_eq(TABLE_HOSPITALS, "name", &json!(name))?;
        let Some(first) = items.first() else { return Ok(None); };
        let raw = first.get("hospital_id").ok_or_else(|| StoreError::Corrupt {
            location: format!("{}[name={}]", TABLE_HOSPITALS, name),
            detail: "hospital_id missing".into(),
        })?;
        coerce_i64(raw).map(Some).ok_or_else(|| StoreError::Corrupt {
            location: format!("{}[name={}]", TABLE_HOSPITALS, name),
            detail: format!("hospital_id is not an integer: {}", raw),
        })
    }
}

#[async_trait]
impl PrincipalDirectory for DocumentStore {
    async fn lookup_doctor(&self, facility_id: i64, department: &str) -> StoreResult<Option<Principal>> {
        let hits = self.query_eq(COLLECTION_DOCTORS, &[("department", json!(department))])?;
        let Some((license, doc)) = hits
            .into_iter()
            .find(|(_, doc)| doc.get("hospital_id").and_then(coerce_i64) == Some(facility_id))
        else {
            return Ok(None);
        };
        let mut record: DoctorRecord = serde_json::from_value(JsonValue::Object(doc))?;
        if record.license_number.is_empty() {
            record.license_number = license;
        }
        Ok(Some(Principal::Doctor(record)))
    }

    async fn lookup_admin(&self, facility_id: i64) -> StoreResult<Option<Principal>> {
        let Some(mut record) = self.get_as::<AdminRecord>(COLLECTION_ADMINS, &facility_id.to_string())? else {
            return Ok(None);
        };
        // Admin documents are keyed by facility id and may omit it from the body.
        record.hospital_id = facility_id;
        Ok(Some(Principal::Admin(record)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Document;

    fn doc(v: JsonValue) -> Document {
        match v { JsonValue::Object(m) => m, _ => unreachable!() }
    }

    #[test]
    fn coerce_i64_accepts_numbers_and_numeric_strings() {
        assert_eq!(coerce_i64(&json!(7)), Some(7));
        assert_eq!(coerce_i64(&json!(7.0)), Some(7));
        assert_eq!(coerce_i64(&json!(" 12 ")), Some(12));
        assert_eq!(coerce_i64(&json!(7.5)), None);
        assert_eq!(coerce_i64(&json!("seven")), None);
        assert_eq!(coerce_i64(&json!(null)), None);
    }

    #[tokio::test]
    async fn facility_lookup_takes_first_exact_match() {
        let t = TableStore::new();
        t.put_item(TABLE_HOSPITALS, json!({"hospital_id": "7", "name": "Central Clinic"})).unwrap();
        t.put_item(TABLE_HOSPITALS, json!({"hospital_id": 9, "name": "Central Clinic"})).unwrap();
        assert_eq!(t.lookup_facility_id("Central Clinic").await.unwrap(), Some(7));
        assert_eq!(t.lookup_facility_id("Unknown Clinic").await.unwrap(), None);
    }

    #[tokio::test]
    async fn string_facility_ids_resolve_for_doctors_and_admins() {
        let t = TableStore::new();
        t.put_item(TABLE_HOSPITALS, json!({"hospital_id": "7", "name": "Central Clinic"})).unwrap();
        let s = DocumentStore::new();
        s.set(COLLECTION_DOCTORS, "482913", doc(json!({
            "hospital_id": "7", "department": "Pediatrics", "password": "abc"
        }))).unwrap();
        s.set(COLLECTION_DOCTORS, "100001", doc(json!({
            "hospital_id": "8", "department": "Pediatrics", "password": "other"
        }))).unwrap();
        s.set(COLLECTION_ADMINS, "7", doc(json!({"hospital_id": "7", "password": "secret"}))).unwrap();

        let facility_id = t.lookup_facility_id("Central Clinic").await.unwrap().expect("facility");
        let Some(Principal::Doctor(d)) = s.lookup_doctor(facility_id, "Pediatrics").await.unwrap() else {
            panic!("expected a doctor principal");
        };
        assert_eq!(d.license_number, "482913");
        assert_eq!(d.hospital_id, 7);

        let admin = s.lookup_admin(facility_id).await.unwrap().expect("admin");
        assert_eq!(admin.facility_id(), 7);
        assert_eq!(admin.password(), "secret");
    }

    #[tokio::test]
    async fn facility_without_integer_id_is_corrupt() {
        let t = TableStore::new();
        t.put_item(TABLE_HOSPITALS, json!({"name": "Broken"})).unwrap();
        assert!(matches!(t.lookup_facility_id("Broken").await, Err(StoreError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn doctor_lookup_fills_license_from_document_id() {
        let s = DocumentStore::new();
        s.set(COLLECTION_DOCTORS, "482913", doc(json!({
            "hospital_id": 7, "department": "Pediatrics", "password": "abc", "name": "Dr. Han"
        }))).unwrap();

        let Some(Principal::Doctor(d)) = s.lookup_doctor(7, "Pediatrics").await.unwrap() else {
            panic!("expected a doctor principal");
        };
        assert_eq!(d.license_number, "482913");
        assert_eq!(d.name, "Dr. Han");
        assert!(s.lookup_doctor(7, "Surgery").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn admin_lookup_is_keyed_by_facility_id() {
        let s = DocumentStore::new();
        s.set(COLLECTION_ADMINS, "7", doc(json!({"password": "secret"}))).unwrap();
        let p = s.lookup_admin(7).await.unwrap().expect("admin");
        assert_eq!(p.facility_id(), 7);
        assert_eq!(p.password(), "secret");
        assert!(s.lookup_admin(8).await.unwrap().is_none());
    }
}
