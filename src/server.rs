//!
//! silmedy HTTP server
//! --------------------
//! This module defines the Axum-based HTTP API for the consultation platform.
//!
//! Responsibilities:
//! - Role-based login for doctors and facility admins (form and JSON flavours).
//! - Doctor registration and management for admins.
//! - Consultation queue and video-call room lifecycle.
//! - Prescriptions, diagnoses and the disease catalogue.
//! - Push notification dispatch.
//! - Seeding the stores on startup and logging what was loaded.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tracing::info;

use crate::config::ServerConfig;
use crate::identity::LoginResolver;
use crate::notify::{FcmNotifier, LogNotifier, PushNotifier};
use crate::storage::{DocumentStore, SeedData, TableStore};
use crate::storage::{COLLECTION_ADMINS, COLLECTION_DOCTORS, TABLE_DISEASES, TABLE_HOSPITALS};

pub mod auth_routes;
pub mod clinical_routes;
pub mod common_routes;
pub mod doctor_routes;

/// Shared server state injected into all handlers.
///
/// The stores are cheap handles over shared maps; the resolver holds its own
/// handles to the same stores through the directory traits.
#[derive(Clone)]
pub struct AppState {
    pub tables: TableStore,
    pub documents: DocumentStore,
    pub resolver: LoginResolver,
    pub notifier: Arc<dyn PushNotifier>,
}

impl AppState {
    pub fn new(tables: TableStore, documents: DocumentStore, notifier: Arc<dyn PushNotifier>) -> Self {
        let resolver = LoginResolver::new(Arc::new(tables.clone()), Arc::new(documents.clone()));
        Self { tables, documents, resolver, notifier }
    }

    /// Build state from configuration: seed the stores and pick the notifier.
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let tables = TableStore::new();
        let documents = DocumentStore::new();
        if let Some(path) = config.data_file.as_deref() {
            SeedData::from_file(path)?
                .apply(&tables, &documents)
                .with_context(|| format!("While seeding stores from {}", path.display()))?;
        }
        let notifier: Arc<dyn PushNotifier> = match config.fcm.clone() {
            Some(fcm) => {
                info!(target: "startup", project = %fcm.project_id, "push notifications via FCM");
                Arc::new(FcmNotifier::new(fcm))
            }
            None => {
                info!(target: "startup", "FCM not configured; push notifications will only be logged");
                Arc::new(LogNotifier)
            }
        };
        Ok(Self::new(tables, documents, notifier))
    }
}

/// Mount every route on one router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Json(json!({"message": "silmedy ok"})) }))
        .merge(auth_routes::router())
        .merge(doctor_routes::router())
        .merge(clinical_routes::router())
        .merge(common_routes::router())
        .with_state(state)
}

fn log_store_inventory(state: &AppState) {
    info!(
        target: "startup",
        "Store inventory: hospitals={}, diseases={}, doctors={}, admins={}",
        state.tables.len(TABLE_HOSPITALS),
        state.tables.len(TABLE_DISEASES),
        state.documents.count(COLLECTION_DOCTORS),
        state.documents.count(COLLECTION_ADMINS),
    );
    if state.tables.is_empty(TABLE_HOSPITALS) {
        tracing::warn!(target: "startup", "No hospitals loaded; every login will fail with 'facility not found'");
    }
}

/// Start the HTTP server with the given configuration and serve until shutdown.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    info!(
        target: "startup",
        "silmedy starting: bind={}, http_port={}, data_file={:?}, fcm={}",
        config.bind_addr, config.http_port, config.data_file, config.fcm.is_some()
    );
    let state = AppState::from_config(&config)?;
    log_store_inventory(&state);

    let app = build_router(state);
    let addr = SocketAddr::new(config.bind_addr, config.http_port);
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("While binding {}", addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}
