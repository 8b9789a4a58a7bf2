//! Storage adapters for the two managed stores the platform runs on.
//!
//! - `TableStore`: scan-oriented item tables (`hospitals`, `diseases`).
//! - `DocumentStore`: id-keyed document collections (`doctors`, `admins`,
//!   `prescriptions`, `diagnoses`, `consultations`).
//!
//! Both are in-memory, cheap to clone (shared `Arc` state) and can be seeded
//! from a JSON file at startup. The directory traits used by the login
//! resolver live in `directory`.

use thiserror::Error;

mod directory;
mod document;
mod seed;
mod table;

pub use directory::{FacilityDirectory, PrincipalDirectory, coerce_i64};
pub use document::{Document, DocumentStore};
pub use seed::SeedData;
pub use table::TableStore;

pub const TABLE_HOSPITALS: &str = "hospitals";
pub const TABLE_DISEASES: &str = "diseases";

pub const COLLECTION_DOCTORS: &str = "doctors";
pub const COLLECTION_ADMINS: &str = "admins";
pub const COLLECTION_PRESCRIPTIONS: &str = "prescriptions";
pub const COLLECTION_DIAGNOSES: &str = "diagnoses";
pub const COLLECTION_CONSULTATIONS: &str = "consultations";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("{collection}/{id} not found")]
    NotFound { collection: String, id: String },
    #[error("corrupt record in {location}: {detail}")]
    Corrupt { location: String, detail: String },
    #[error("serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
