use serde::Deserialize;

use super::role::Role;

/// Login submitted from the browser form or as JSON to `/api/login`.
/// The role is a free-form label and is canonicalized by the resolver.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginForm {
    pub public_health_center: String,
    pub role: String,
    #[serde(default)]
    pub department: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DoctorLoginRequest {
    pub public_health_center: String,
    pub department: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminLoginRequest {
    pub public_health_center: String,
    pub password: String,
}

/// Borrowed view of any login request in the shape the resolver takes.
#[derive(Debug, Clone, Copy)]
pub struct LoginAttempt<'a> {
    pub facility_name: &'a str,
    pub role: &'a str,
    pub department: Option<&'a str>,
    pub password: &'a str,
}

impl LoginForm {
    pub fn attempt(&self) -> LoginAttempt<'_> {
        LoginAttempt {
            facility_name: &self.public_health_center,
            role: &self.role,
            department: self.department.as_deref(),
            password: &self.password,
        }
    }
}

impl DoctorLoginRequest {
    pub fn attempt(&self) -> LoginAttempt<'_> {
        LoginAttempt {
            facility_name: &self.public_health_center,
            role: Role::Doctor.code(),
            department: Some(&self.department),
            password: &self.password,
        }
    }
}

impl AdminLoginRequest {
    pub fn attempt(&self) -> LoginAttempt<'_> {
        LoginAttempt {
            facility_name: &self.public_health_center,
            role: Role::Admin.code(),
            department: None,
            password: &self.password,
        }
    }
}
