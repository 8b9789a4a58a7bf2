use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use super::role::Role;
use crate::storage::coerce_i64;

/// Facility ids written by other clients may be numbers or numeric strings.
fn deserialize_facility_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let raw = JsonValue::deserialize(deserializer)?;
    coerce_i64(&raw).ok_or_else(|| de::Error::custom(format!("hospital_id is not an integer: {}", raw)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    #[serde(rename = "hospital_id")]
    pub facility_id: i64,
    pub name: String,
}

/// Doctor document as stored in the `doctors` collection, keyed by license number.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DoctorRecord {
    #[serde(default)]
    pub license_number: String,
    #[serde(deserialize_with = "deserialize_facility_id")]
    pub hospital_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
    pub department: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub profile_url: String,
    #[serde(default)]
    pub bio: Vec<String>,
    #[serde(default)]
    pub availability: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Admin document as stored in the `admins` collection, keyed by facility id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminRecord {
    /// Filled from the document key by the directory adapter; the body copy is not read.
    #[serde(default, skip_deserializing)]
    pub hospital_id: i64,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Principal {
    Doctor(DoctorRecord),
    Admin(AdminRecord),
}

impl Principal {
    pub fn role(&self) -> Role {
        match self {
            Principal::Doctor(_) => Role::Doctor,
            Principal::Admin(_) => Role::Admin,
        }
    }

    pub fn facility_id(&self) -> i64 {
        match self {
            Principal::Doctor(d) => d.hospital_id,
            Principal::Admin(a) => a.hospital_id,
        }
    }

    pub fn password(&self) -> &str {
        match self {
            Principal::Doctor(d) => &d.password,
            Principal::Admin(a) => &a.password,
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        match self {
            Principal::Doctor(d) if !d.name.is_empty() => Some(d.name.as_str()),
            Principal::Doctor(_) => None,
            Principal::Admin(a) => a.name.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn doctor_facility_id_accepts_numeric_strings() {
        let d: DoctorRecord =
            serde_json::from_value(json!({"hospital_id": "7", "department": "Pediatrics", "password": "abc"})).unwrap();
        assert_eq!(d.hospital_id, 7);
        let bad = serde_json::from_value::<DoctorRecord>(json!({"hospital_id": "seven", "department": "x", "password": "y"}));
        assert!(bad.is_err());
    }

    #[test]
    fn admin_body_facility_id_never_fails_the_read() {
        for id in [json!(7), json!("7"), json!("not a number")] {
            let a: AdminRecord = serde_json::from_value(json!({"hospital_id": id, "password": "secret"})).unwrap();
            assert_eq!(a.password, "secret");
        }
    }
}
