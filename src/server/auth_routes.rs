//! Login endpoints. One resolver decision, two presentations: the browser form
//! gets a redirect, API clients get JSON.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::post;
use axum::{Form, Json, Router};
use serde_json::json;

use super::AppState;
use crate::error::{AppError, AppResult};
use crate::identity::{AdminLoginRequest, DoctorLoginRequest, LoginFailure, LoginForm, LoginResult};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login_form))
        .route("/api/login", post(login_api))
        .route("/api/login/doctor", post(login_doctor))
        .route("/api/login/admin", post(login_admin))
}

fn failure_status(reason: LoginFailure) -> StatusCode {
    match reason {
        LoginFailure::FacilityNotFound => StatusCode::NOT_FOUND,
        LoginFailure::InvalidCredentials => StatusCode::UNAUTHORIZED,
    }
}

fn json_outcome(result: LoginResult) -> Response {
    match result {
        LoginResult::Success { message, role, redirect_target, facility_id, display_name } => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "message": message,
                "role": role,
                "redirect": redirect_target.path(),
                "facility_id": facility_id,
                "display_name": display_name,
            })),
        )
            .into_response(),
        LoginResult::Failure { reason } => {
            let err = match reason {
                LoginFailure::FacilityNotFound => AppError::not_found(reason.code(), reason.message()),
                LoginFailure::InvalidCredentials => AppError::auth(reason.code(), reason.message()),
            };
            err.into_response()
        }
    }
}

async fn login_form(State(state): State<AppState>, Form(form): Form<LoginForm>) -> AppResult<Response> {
    let result = state.resolver.resolve_attempt(form.attempt()).await?;
    Ok(match result {
        LoginResult::Success { redirect_target, .. } => Redirect::to(redirect_target.path()).into_response(),
        LoginResult::Failure { reason } => (failure_status(reason), reason.message()).into_response(),
    })
}

async fn login_api(State(state): State<AppState>, Json(req): Json<LoginForm>) -> AppResult<Response> {
    Ok(json_outcome(state.resolver.resolve_attempt(req.attempt()).await?))
}

async fn login_doctor(State(state): State<AppState>, Json(req): Json<DoctorLoginRequest>) -> AppResult<Response> {
    Ok(json_outcome(state.resolver.resolve_attempt(req.attempt()).await?))
}

async fn login_admin(State(state): State<AppState>, Json(req): Json<AdminLoginRequest>) -> AppResult<Response> {
    Ok(json_outcome(state.resolver.resolve_attempt(req.attempt()).await?))
}
