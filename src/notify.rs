//! Push notification dispatch.
//!
//! `FcmNotifier` talks to the FCM HTTP v1 API; `LogNotifier` only records the
//! message and is used when no FCM project is configured.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use thiserror::Error;

use crate::config::FcmSettings;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid notification: {0}")]
    InvalidMessage(String),
    #[error("push transport failed: {0}")]
    Transport(String),
    #[error("push provider rejected message (status {status}): {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationRequest {
    pub token: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub data: serde_json::Map<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    pub token: String,
    pub title: String,
    pub body: String,
    /// Push data payloads carry strings only.
    pub data: BTreeMap<String, String>,
}

/// Strings are passed through unquoted; null becomes empty; everything else is rendered as JSON.
pub fn stringify_value(v: &JsonValue) -> String {
    match v {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

impl TryFrom<NotificationRequest> for PushMessage {
    type Error = NotifyError;

    fn try_from(req: NotificationRequest) -> Result<Self, Self::Error> {
        if req.token.trim().is_empty() {
            return Err(NotifyError::InvalidMessage("device token must not be empty".into()));
        }
        let data = req.data.iter().map(|(k, v)| (k.clone(), stringify_value(v))).collect();
        Ok(PushMessage { token: req.token, title: req.title, body: req.body, data })
    }
}

#[async_trait]
pub trait PushNotifier: Send + Sync {
    /// Deliver one message; returns the provider's message name.
    async fn send(&self, msg: &PushMessage) -> Result<String, NotifyError>;
}

pub struct FcmNotifier {
    client: reqwest::Client,
    settings: FcmSettings,
}

impl FcmNotifier {
    pub fn new(settings: FcmSettings) -> Self {
        Self { client: reqwest::Client::new(), settings }
    }

    pub fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.settings.endpoint.trim_end_matches('/'),
            self.settings.project_id
        )
    }

    pub fn payload(msg: &PushMessage) -> JsonValue {
        json!({
            "message": {
                "token": msg.token,
                "notification": { "title": msg.title, "body": msg.body },
                "data": msg.data,
            }
        })
    }
}

#[derive(Deserialize)]
struct FcmSendResponse {
    name: String,
}

#[async_trait]
impl PushNotifier for FcmNotifier {
    async fn send(&self, msg: &PushMessage) -> Result<String, NotifyError> {
        let resp = self
            .client
            .post(self.send_url())
            .bearer_auth(&self.settings.access_token)
            .json(&Self::payload(msg))
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(target: "notify", status = status.as_u16(), "fcm rejected message");
            return Err(NotifyError::Rejected { status: status.as_u16(), body });
        }
        let parsed: FcmSendResponse = resp.json().await.map_err(|e| NotifyError::Transport(e.to_string()))?;
        tracing::debug!(target: "notify", name = %parsed.name, "fcm message sent");
        Ok(parsed.name)
    }
}

/// Records messages through `tracing` instead of delivering them.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl PushNotifier for LogNotifier {
    async fn send(&self, msg: &PushMessage) -> Result<String, NotifyError> {
        let name = format!("projects/local/messages/{}", uuid::Uuid::new_v4().simple());
        tracing::info!(target: "notify", title = %msg.title, data_keys = msg.data.len(), name = %name, "push notification logged (fcm not configured)");
        Ok(name)
    }
}
