//! Role-based login for facility staff.
//! Keep the public surface thin and split implementation across sub-modules.

mod principal;
mod request;
mod resolver;
mod role;

pub use principal::{AdminRecord, DoctorRecord, Facility, Principal};
pub use request::{AdminLoginRequest, DoctorLoginRequest, LoginAttempt, LoginForm};
pub use resolver::{LoginFailure, LoginResolver, LoginResult, RedirectTarget, LOGIN_SUCCEEDED};
pub use role::{canonicalize, CanonicalRole, Role};
