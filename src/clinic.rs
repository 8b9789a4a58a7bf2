//! Clinic services: the CRUD surface over the stores behind the HTTP routes.
//!
//! Each sub-module owns one collection. Services are plain functions taking the
//! stores explicitly and returning `AppResult`, so handlers stay thin.

use serde_json::Value as JsonValue;

use crate::error::AppResult;
use crate::storage::{TableStore, TABLE_DISEASES, TABLE_HOSPITALS};

pub mod consultations;
pub mod diagnoses;
pub mod doctors;
pub mod prescriptions;

/// Every facility row, as stored.
pub fn list_hospitals(tables: &TableStore) -> AppResult<Vec<JsonValue>> {
    Ok(tables.scan(TABLE_HOSPITALS)?)
}

/// The disease code catalogue used when writing prescriptions and diagnoses.
pub fn list_diseases(tables: &TableStore) -> AppResult<Vec<JsonValue>> {
    Ok(tables.scan(TABLE_DISEASES)?)
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(crate::error::AppError::user("missing_field".to_string(), format!("{} must not be empty", field)));
    }
    Ok(())
}
