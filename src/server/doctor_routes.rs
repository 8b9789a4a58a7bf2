use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::{json, Value as JsonValue};

use super::AppState;
use crate::clinic::doctors::{self, DoctorRegistration};
use crate::error::AppResult;
use crate::storage::Document;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/doctors", get(list_doctors).post(register_doctor))
        .route("/api/doctors/{license_number}", put(update_doctor).delete(delete_doctor))
        .route("/admin/employees", get(employee_list))
}

async fn register_doctor(State(state): State<AppState>, Json(req): Json<DoctorRegistration>) -> AppResult<Json<JsonValue>> {
    let license_number = doctors::register_doctor(&state.tables, &state.documents, req).await?;
    Ok(Json(json!({"status": "ok", "message": "doctor registered", "license_number": license_number})))
}

async fn list_doctors(State(state): State<AppState>) -> AppResult<Json<JsonValue>> {
    Ok(Json(json!({"doctors": doctors::list_doctors(&state.documents)?})))
}

async fn update_doctor(
    State(state): State<AppState>,
    Path(license_number): Path<String>,
    Json(fields): Json<Document>,
) -> AppResult<Json<JsonValue>> {
    let applied = doctors::update_doctor(&state.documents, &license_number, fields)?;
    Ok(Json(json!({"status": "ok", "message": "doctor updated", "updated_fields": applied})))
}

async fn delete_doctor(State(state): State<AppState>, Path(license_number): Path<String>) -> AppResult<Json<JsonValue>> {
    doctors::delete_doctor(&state.documents, &license_number)?;
    Ok(Json(json!({"status": "ok", "message": "doctor deleted", "license_number": license_number})))
}

/// Landing view for admins after login.
async fn employee_list(State(state): State<AppState>) -> AppResult<Json<JsonValue>> {
    Ok(Json(json!({"view": "admin_employees", "employees": doctors::list_doctors(&state.documents)?})))
}
