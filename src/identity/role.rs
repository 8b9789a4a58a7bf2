use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Doctor,
    Admin,
    Patient,
}

impl Role {
    pub fn code(self) -> &'static str {
        match self {
            Role::Doctor => "doctor",
            Role::Admin => "admin",
            Role::Patient => "patient",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.code()) }
}

/// Localized labels shown on the login form, matched exactly.
const LOCALIZED_LABELS: &[(&str, Role)] = &[
    ("의사", Role::Doctor),
    ("관리자", Role::Admin),
    ("환자", Role::Patient),
];

const CANONICAL_CODES: &[Role] = &[Role::Doctor, Role::Admin, Role::Patient];

/// A role label after canonicalization. Unrecognized labels are carried through
/// verbatim rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalRole {
    Known(Role),
    Other(String),
}

impl CanonicalRole {
    pub fn role(&self) -> Option<Role> {
        match self {
            CanonicalRole::Known(r) => Some(*r),
            CanonicalRole::Other(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CanonicalRole::Known(r) => r.code(),
            CanonicalRole::Other(raw) => raw.as_str(),
        }
    }
}

/// Translate a raw role label to its canonical form.
///
/// Localized labels map through `LOCALIZED_LABELS`; canonical codes match
/// ASCII-case-insensitively. Anything else passes through unchanged.
pub fn canonicalize(label: &str) -> CanonicalRole {
    if let Some((_, role)) = LOCALIZED_LABELS.iter().find(|(l, _)| *l == label) {
        return CanonicalRole::Known(*role);
    }
    if let Some(role) = CANONICAL_CODES.iter().find(|r| r.code().eq_ignore_ascii_case(label)) {
        return CanonicalRole::Known(*role);
    }
    CanonicalRole::Other(label.to_string())
}
