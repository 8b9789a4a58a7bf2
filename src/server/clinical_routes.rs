use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use super::AppState;
use crate::clinic::consultations::{self, ConsultationRequest, ConsultationStatus};
use crate::clinic::diagnoses::{self, DiagnosisRequest};
use crate::clinic::prescriptions::{self, PrescriptionRequest};
use crate::error::AppResult;
use crate::identity::RedirectTarget;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/doctor/consultation", get(consultation_queue))
        .route("/doctor/video-call/{consultation_id}", get(video_call))
        .route("/api/consultations", get(list_consultations).post(request_consultation))
        .route("/api/consultations/{consultation_id}", get(get_consultation))
        .route("/api/consultations/{consultation_id}/start", post(start_call))
        .route("/api/consultations/{consultation_id}/end", post(end_call))
        .route("/api/consultations/{consultation_id}/cancel", post(cancel))
        .route("/prescription/submit", post(submit_prescription_form))
        .route("/api/prescription/submit", post(submit_prescription_api))
        .route("/api/prescriptions/{patient_id}", get(patient_prescriptions))
        .route("/api/diagnoses", post(record_diagnosis))
        .route("/api/diagnoses/{patient_id}", get(patient_diagnoses))
}

#[derive(Debug, Deserialize)]
struct ConsultationFilter {
    status: Option<ConsultationStatus>,
}

/// Landing view for doctors after login: patients waiting for a call.
async fn consultation_queue(State(state): State<AppState>) -> AppResult<Json<JsonValue>> {
    let waiting = consultations::list_consultations(&state.documents, Some(ConsultationStatus::Waiting))?;
    Ok(Json(json!({"view": "consultation_list", "consultations": waiting})))
}

async fn video_call(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<JsonValue>> {
    let room = consultations::video_room(&state.documents, &id)?;
    Ok(Json(json!({"view": "video_call", "room": room})))
}

async fn list_consultations(State(state): State<AppState>, Query(filter): Query<ConsultationFilter>) -> AppResult<Json<JsonValue>> {
    Ok(Json(json!({"consultations": consultations::list_consultations(&state.documents, filter.status)?})))
}

async fn request_consultation(State(state): State<AppState>, Json(req): Json<ConsultationRequest>) -> AppResult<Json<JsonValue>> {
    let c = consultations::request_consultation(&state.documents, req)?;
    Ok(Json(json!({"status": "ok", "consultation": c})))
}

async fn get_consultation(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<JsonValue>> {
    Ok(Json(json!({"consultation": consultations::get_consultation(&state.documents, &id)?})))
}

async fn start_call(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<JsonValue>> {
    let room = consultations::start_video_call(&state.documents, &id)?;
    Ok(Json(json!({"status": "ok", "room": room})))
}

async fn end_call(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<JsonValue>> {
    Ok(Json(json!({"status": "ok", "consultation": consultations::end_video_call(&state.documents, &id)?})))
}

async fn cancel(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<JsonValue>> {
    Ok(Json(json!({"status": "ok", "consultation": consultations::cancel_consultation(&state.documents, &id)?})))
}

async fn submit_prescription_form(State(state): State<AppState>, Form(req): Form<PrescriptionRequest>) -> AppResult<Redirect> {
    prescriptions::submit_prescription(&state.documents, req)?;
    Ok(Redirect::to(RedirectTarget::DoctorConsultation.path()))
}

async fn submit_prescription_api(State(state): State<AppState>, Json(req): Json<PrescriptionRequest>) -> AppResult<Json<JsonValue>> {
    let p = prescriptions::submit_prescription(&state.documents, req)?;
    Ok(Json(json!({"status": "ok", "message": "prescription saved", "prescription_id": p.prescription_id})))
}

async fn patient_prescriptions(State(state): State<AppState>, Path(patient_id): Path<String>) -> AppResult<Json<JsonValue>> {
    Ok(Json(json!({"prescriptions": prescriptions::prescriptions_for_patient(&state.documents, &patient_id)?})))
}

async fn record_diagnosis(State(state): State<AppState>, Json(req): Json<DiagnosisRequest>) -> AppResult<Json<JsonValue>> {
    let d = diagnoses::record_diagnosis(&state.documents, req)?;
    Ok(Json(json!({"status": "ok", "diagnosis": d})))
}

async fn patient_diagnoses(State(state): State<AppState>, Path(patient_id): Path<String>) -> AppResult<Json<JsonValue>> {
    Ok(Json(json!({"diagnoses": diagnoses::list_diagnoses(&state.documents, &patient_id)?})))
}
