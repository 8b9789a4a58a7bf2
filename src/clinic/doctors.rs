use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::require_non_empty;
use crate::error::{AppError, AppResult};
use crate::identity::DoctorRecord;
use crate::storage::{Document, DocumentStore, FacilityDirectory, TableStore, COLLECTION_DOCTORS};

pub const DEFAULT_PROFILE_URL: &str = "https://cdn-icons-png.flaticon.com/512/3870/3870822.png";

/// Fields an admin may change after registration.
pub const UPDATABLE_FIELDS: &[&str] = &["name", "email", "department", "contact", "gender", "bio", "availability", "profile_url"];

const LICENSE_ATTEMPTS: usize = 8;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DoctorRegistration {
    pub hospital_name: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub department: String,
    pub contact: String,
    #[serde(default)]
    pub gender: String,
}

/// A doctor as listed to admins; the password never leaves the store.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DoctorView {
    pub license_number: String,
    pub hospital_id: i64,
    pub name: String,
    pub email: String,
    pub department: String,
    pub contact: String,
    pub gender: String,
    pub profile_url: String,
    pub bio: Vec<String>,
    pub availability: serde_json::Map<String, JsonValue>,
    pub created_at: Option<chrono::DateTime<Utc>>,
}

impl From<DoctorRecord> for DoctorView {
    fn from(d: DoctorRecord) -> Self {
        Self {
            license_number: d.license_number,
            hospital_id: d.hospital_id,
            name: d.name,
            email: d.email,
            department: d.department,
            contact: d.contact,
            gender: d.gender,
            profile_url: d.profile_url,
            bio: d.bio,
            availability: d.availability,
            created_at: d.created_at,
        }
    }
}

/// Six decimal digits taken from the front of a random UUID.
fn new_license_number() -> String {
    let digits = Uuid::new_v4().as_u128().to_string();
    digits.chars().take(6).collect()
}

/// Register a doctor at the named hospital and return the allocated license number.
pub async fn register_doctor(tables: &TableStore, docs: &DocumentStore, req: DoctorRegistration) -> AppResult<String> {
    for (field, value) in [
        ("hospital_name", &req.hospital_name),
        ("name", &req.name),
        ("password", &req.password),
        ("department", &req.department),
    ] {
        require_non_empty(field, value)?;
    }

    let Some(hospital_id) = tables.lookup_facility_id(&req.hospital_name).await? else {
        return Err(AppError::not_found("facility_not_found".to_string(), format!("no hospital named '{}'", req.hospital_name)));
    };

    let mut license = None;
    for _ in 0..LICENSE_ATTEMPTS {
        let candidate = new_license_number();
        if !docs.exists(COLLECTION_DOCTORS, &candidate)? {
            license = Some(candidate);
            break;
        }
    }
    let Some(license_number) = license else {
        return Err(AppError::conflict("license_exhausted", "could not allocate a free license number"));
    };

    let record = DoctorRecord {
        license_number: license_number.clone(),
        hospital_id,
        name: req.name,
        email: req.email,
        password: req.password,
        department: req.department,
        contact: req.contact,
        gender: req.gender,
        profile_url: DEFAULT_PROFILE_URL.to_string(),
        bio: Vec::new(),
        availability: serde_json::Map::new(),
        created_at: Some(Utc::now()),
    };
    docs.set_as(COLLECTION_DOCTORS, &license_number, &record)?;
    tracing::info!(target: "clinic", license = %license_number, hospital_id, "doctor registered");
    Ok(license_number)
}

pub fn list_doctors(docs: &DocumentStore) -> AppResult<Vec<DoctorView>> {
    let mut out = Vec::new();
    for (id, doc) in docs.stream(COLLECTION_DOCTORS)? {
        let mut record: DoctorRecord = match serde_json::from_value(JsonValue::Object(doc)) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(target: "clinic", license = %id, "skipping unreadable doctor record: {}", e);
                continue;
            }
        };
        record.license_number = id;
        out.push(DoctorView::from(record));
    }
    Ok(out)
}

fn check_field_type(field: &str, value: &JsonValue) -> AppResult<()> {
    let ok = match field {
        "bio" => value.as_array().map(|a| a.iter().all(JsonValue::is_string)).unwrap_or(false),
        "availability" => value.is_object(),
        _ => value.is_string(),
    };
    if ok {
        Ok(())
    } else {
        Err(AppError::user("invalid_field".to_string(), format!("field '{}' has the wrong type", field)))
    }
}

/// Apply the updatable subset of `fields` to a doctor and return what was applied.
pub fn update_doctor(docs: &DocumentStore, license_number: &str, fields: Document) -> AppResult<Document> {
    let applied: Document = fields.into_iter().filter(|(k, _)| UPDATABLE_FIELDS.contains(&k.as_str())).collect();
    if applied.is_empty() {
        return Err(AppError::user("no_updatable_fields", "no updatable fields supplied"));
    }
    for (k, v) in applied.iter() {
        check_field_type(k, v)?;
    }
    if !docs.exists(COLLECTION_DOCTORS, license_number)? {
        return Err(AppError::not_found("doctor_not_found".to_string(), format!("no doctor with license {}", license_number)));
    }
    docs.update(COLLECTION_DOCTORS, license_number, applied.clone())?;
    Ok(applied)
}

pub fn delete_doctor(docs: &DocumentStore, license_number: &str) -> AppResult<()> {
    if !docs.delete(COLLECTION_DOCTORS, license_number)? {
        return Err(AppError::not_found("doctor_not_found".to_string(), format!("no doctor with license {}", license_number)));
    }
    tracing::info!(target: "clinic", license = license_number, "doctor deleted");
    Ok(())
}
