use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value as JsonValue};

use super::AppState;
use crate::clinic;
use crate::error::AppResult;
use crate::notify::{NotificationRequest, PushMessage};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/hospitals", get(hospitals))
        .route("/api/diseases", get(diseases))
        .route("/api/send-notification", post(send_notification))
}

async fn hospitals(State(state): State<AppState>) -> AppResult<Json<JsonValue>> {
    Ok(Json(json!({"hospitals": clinic::list_hospitals(&state.tables)?})))
}

async fn diseases(State(state): State<AppState>) -> AppResult<Json<JsonValue>> {
    Ok(Json(json!({"diseases": clinic::list_diseases(&state.tables)?})))
}

async fn send_notification(State(state): State<AppState>, Json(req): Json<NotificationRequest>) -> AppResult<Json<JsonValue>> {
    let msg = PushMessage::try_from(req)?;
    let name = state.notifier.send(&msg).await?;
    Ok(Json(json!({"status": "ok", "message": "push notification sent", "fcm_response": name})))
}
