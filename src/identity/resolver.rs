use std::sync::Arc;

use serde::Serialize;

use super::principal::Principal;
use super::request::LoginAttempt;
use super::role::{canonicalize, Role};
use crate::storage::{FacilityDirectory, PrincipalDirectory, StoreResult};
use crate::tprintln;

pub const LOGIN_SUCCEEDED: &str = "login succeeded";

/// Where a client lands after a successful login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectTarget {
    DoctorConsultation,
    AdminEmployeeList,
}

impl RedirectTarget {
    pub fn path(self) -> &'static str {
        match self {
            RedirectTarget::DoctorConsultation => "/doctor/consultation",
            RedirectTarget::AdminEmployeeList => "/admin/employees",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailure {
    FacilityNotFound,
    /// Covers both an unknown principal and a wrong password.
    InvalidCredentials,
}

impl LoginFailure {
    pub fn code(self) -> &'static str {
        match self {
            LoginFailure::FacilityNotFound => "facility_not_found",
            LoginFailure::InvalidCredentials => "invalid_credentials",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            LoginFailure::FacilityNotFound => "facility not found",
            LoginFailure::InvalidCredentials => "invalid credentials",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginResult {
    Success {
        message: String,
        role: Role,
        redirect_target: RedirectTarget,
        facility_id: i64,
        display_name: Option<String>,
    },
    Failure { reason: LoginFailure },
}

impl LoginResult {
    pub fn is_success(&self) -> bool { matches!(self, LoginResult::Success { .. }) }

    fn failure(reason: LoginFailure) -> Self { LoginResult::Failure { reason } }
}

/// Maps a (facility, role, department, password) tuple to a login decision.
///
/// Holds no state of its own; both lookups go through the injected
/// directories, facility first and then the principal scoped to it.
#[derive(Clone)]
pub struct LoginResolver {
    facilities: Arc<dyn FacilityDirectory>,
    principals: Arc<dyn PrincipalDirectory>,
}

impl LoginResolver {
    pub fn new(facilities: Arc<dyn FacilityDirectory>, principals: Arc<dyn PrincipalDirectory>) -> Self {
        Self { facilities, principals }
    }

    /// Only store faults are returned as `Err`; every credential outcome is a `LoginResult`.
    pub async fn resolve(
        &self,
        facility_name: &str,
        role: &str,
        department: Option<&str>,
        password: &str,
    ) -> StoreResult<LoginResult> {
        let canonical = canonicalize(role);

        let Some(facility_id) = self.facilities.lookup_facility_id(facility_name).await? else {
            tracing::info!(target: "auth", facility = facility_name, role = canonical.as_str(), "login rejected: facility not found");
            return Ok(LoginResult::failure(LoginFailure::FacilityNotFound));
        };

        let principal = match canonical.role() {
            Some(Role::Doctor) => match department.filter(|d| !d.is_empty()) {
                Some(dept) => self.principals.lookup_doctor(facility_id, dept).await?,
                None => None,
            },
            Some(Role::Admin) => self.principals.lookup_admin(facility_id).await?,
            // No principal store exists for patients or unrecognized roles.
            Some(Role::Patient) | None => None,
        };

        let outcome = match principal {
            Some(p) if p.password() == password => Self::success(facility_id, &p),
            _ => LoginResult::failure(LoginFailure::InvalidCredentials),
        };
        tprintln!("auth.resolve facility_id={} role={} success={}", facility_id, canonical.as_str(), outcome.is_success());
        if outcome.is_success() {
            tracing::info!(target: "auth", facility_id, role = canonical.as_str(), "login succeeded");
        } else {
            tracing::info!(target: "auth", facility_id, role = canonical.as_str(), "login rejected: invalid credentials");
        }
        Ok(outcome)
    }

    pub async fn resolve_attempt(&self, attempt: LoginAttempt<'_>) -> StoreResult<LoginResult> {
        self.resolve(attempt.facility_name, attempt.role, attempt.department, attempt.password).await
    }

    fn success(facility_id: i64, principal: &Principal) -> LoginResult {
        let redirect_target = match principal {
            Principal::Doctor(_) => RedirectTarget::DoctorConsultation,
            Principal::Admin(_) => RedirectTarget::AdminEmployeeList,
        };
        let role = principal.role();
        LoginResult::Success {
            message: LOGIN_SUCCEEDED.to_string(),
            role,
            redirect_target,
            facility_id,
            display_name: principal.display_name().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{AdminRecord, DoctorRecord};
    use crate::storage::StoreError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Fixture {
        facility_calls: AtomicUsize,
        principal_calls: AtomicUsize,
        facilities_down: bool,
        principals_down: bool,
    }

    #[async_trait]
    impl FacilityDirectory for Fixture {
        async fn lookup_facility_id(&self, name: &str) -> StoreResult<Option<i64>> {
            self.facility_calls.fetch_add(1, Ordering::SeqCst);
            if self.facilities_down {
                return Err(StoreError::Unavailable("scan timed out".into()));
            }
            Ok((name == "Central Clinic").then_some(7))
        }
    }

    #[async_trait]
    impl PrincipalDirectory for Fixture {
        async fn lookup_doctor(&self, facility_id: i64, department: &str) -> StoreResult<Option<Principal>> {
            self.principal_calls.fetch_add(1, Ordering::SeqCst);
            if self.principals_down {
                return Err(StoreError::Unavailable("query failed".into()));
            }
            Ok((facility_id == 7 && department == "Pediatrics").then(|| {
                Principal::Doctor(DoctorRecord {
                    license_number: "482913".into(),
                    hospital_id: 7,
                    name: "Dr. Han".into(),
                    password: "abc".into(),
                    department: "Pediatrics".into(),
                    ..Default::default()
                })
            }))
        }

        async fn lookup_admin(&self, facility_id: i64) -> StoreResult<Option<Principal>> {
            self.principal_calls.fetch_add(1, Ordering::SeqCst);
            if self.principals_down {
                return Err(StoreError::Unavailable("get failed".into()));
            }
            Ok((facility_id == 7).then(|| Principal::Admin(AdminRecord { hospital_id: 7, password: "secret".into(), name: None })))
        }
    }

    fn resolver_over(fixture: Fixture) -> (LoginResolver, Arc<Fixture>) {
        let f = Arc::new(fixture);
        (LoginResolver::new(f.clone(), f.clone()), f)
    }

    #[tokio::test]
    async fn doctor_with_matching_department_and_password_succeeds() {
        let (r, _) = resolver_over(Fixture::default());
        let out = r.resolve("Central Clinic", "Doctor", Some("Pediatrics"), "abc").await.unwrap();
        match out {
            LoginResult::Success { role, redirect_target, facility_id, display_name, message } => {
                assert_eq!(role, Role::Doctor);
                assert_eq!(redirect_target, RedirectTarget::DoctorConsultation);
                assert_eq!(facility_id, 7);
                assert_eq!(display_name.as_deref(), Some("Dr. Han"));
                assert_eq!(message, LOGIN_SUCCEEDED);
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn wrong_password_and_missing_principal_are_indistinguishable() {
        let (r, _) = resolver_over(Fixture::default());
        let wrong = r.resolve("Central Clinic", "Doctor", Some("Pediatrics"), "wrong").await.unwrap();
        let missing = r.resolve("Central Clinic", "Doctor", Some("Surgery"), "abc").await.unwrap();
        assert_eq!(wrong, LoginResult::Failure { reason: LoginFailure::InvalidCredentials });
        assert_eq!(wrong, missing);
    }

    #[tokio::test]
    async fn unknown_facility_short_circuits_before_principal_lookup() {
        let (r, f) = resolver_over(Fixture::default());
        for role in ["Admin", "Doctor", "patient", "janitor"] {
            let out = r.resolve("Unknown Clinic", role, Some("Pediatrics"), "x").await.unwrap();
            assert_eq!(out, LoginResult::Failure { reason: LoginFailure::FacilityNotFound });
        }
        assert_eq!(f.facility_calls.load(Ordering::SeqCst), 4);
        assert_eq!(f.principal_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn admin_ignores_department() {
        let (r, _) = resolver_over(Fixture::default());
        for dept in [None, Some(""), Some("Pediatrics"), Some("anything")] {
            let out = r.resolve("Central Clinic", "Admin", dept, "secret").await.unwrap();
            let LoginResult::Success { role, redirect_target, .. } = out else { panic!("expected success for {dept:?}") };
            assert_eq!(role, Role::Admin);
            assert_eq!(redirect_target, RedirectTarget::AdminEmployeeList);
            assert_eq!(redirect_target.path(), "/admin/employees");
        }
    }

    #[tokio::test]
    async fn doctor_without_department_fails_without_lookup() {
        let (r, f) = resolver_over(Fixture::default());
        for dept in [None, Some("")] {
            let out = r.resolve("Central Clinic", "doctor", dept, "abc").await.unwrap();
            assert_eq!(out, LoginResult::Failure { reason: LoginFailure::InvalidCredentials });
        }
        assert_eq!(f.principal_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn patient_and_unknown_roles_fall_through_to_invalid_credentials() {
        let (r, f) = resolver_over(Fixture::default());
        for role in ["patient", "환자", "Nurse"] {
            let out = r.resolve("Central Clinic", role, Some("Pediatrics"), "abc").await.unwrap();
            assert_eq!(out, LoginResult::Failure { reason: LoginFailure::InvalidCredentials });
        }
        assert_eq!(f.principal_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn localized_and_canonical_labels_resolve_identically() {
        let (r, _) = resolver_over(Fixture::default());
        let pairs = [("의사", "doctor"), ("관리자", "admin"), ("환자", "patient")];
        for (localized, canonical) in pairs {
            for pw in ["abc", "secret", "nope"] {
                let a = r.resolve("Central Clinic", localized, Some("Pediatrics"), pw).await.unwrap();
                let b = r.resolve("Central Clinic", canonical, Some("Pediatrics"), pw).await.unwrap();
                assert_eq!(a, b, "{localized} vs {canonical} with {pw}");
            }
        }
    }

    #[tokio::test]
    async fn password_comparison_is_case_sensitive() {
        let (r, _) = resolver_over(Fixture::default());
        let out = r.resolve("Central Clinic", "Admin", None, "SECRET").await.unwrap();
        assert!(!out.is_success());
    }

    #[tokio::test]
    async fn store_faults_propagate_as_errors() {
        let (r, _) = resolver_over(Fixture { facilities_down: true, ..Default::default() });
        assert!(matches!(r.resolve("Central Clinic", "Admin", None, "secret").await, Err(StoreError::Unavailable(_))));

        let (r, _) = resolver_over(Fixture { principals_down: true, ..Default::default() });
        assert!(matches!(r.resolve("Central Clinic", "Admin", None, "secret").await, Err(StoreError::Unavailable(_))));
        assert!(matches!(
            r.resolve("Central Clinic", "Doctor", Some("Pediatrics"), "abc").await,
            Err(StoreError::Unavailable(_))
        ));
    }
}
