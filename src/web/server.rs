//! Web server setup: shared state, routes, and the listener

use axum::{
    routing::{get, post},
    Json, Router,
};
use axum_server::tls_rustls::RustlsConfig;
use serde_json::{json, Value};
use std::future::Future;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::info;

use super::{admin, events, payments, registrations, verify};
use crate::config::{ServerConfig, TlsPaths};
use crate::logging::SharedLogBuffer;
use crate::managers::{SharedPaymentManager, SharedRegistrationManager, SharedVerificationManager};
use crate::state::SharedEventStore;

/// Shared state for web handlers
#[derive(Clone)]
pub struct AppState {
    pub event_store: SharedEventStore,
    pub verification_manager: SharedVerificationManager,
    pub payment_manager: SharedPaymentManager,
    pub registration_manager: SharedRegistrationManager,
    pub log_buffer: SharedLogBuffer,
}

/// Build the full API router
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/events", get(events::list_events))
        .route("/api/events/:id", get(events::get_event))
        .route("/api/verify/request", post(verify::request_code))
        .route("/api/verify/confirm", post(verify::confirm_code))
        .route("/api/verify/status", get(verify::status))
        .route("/api/payments/intent", post(payments::create_intent))
        .route("/api/payments/confirm", post(payments::confirm_payment))
        .route("/api/payments/:id", get(payments::get_payment))
        .route("/api/registrations/me", get(registrations::my_registrations))
        .route("/api/registrations/preview", post(registrations::preview))
        .route("/api/registrations/register", post(registrations::register))
        .route("/api/admin/logs", get(admin::recent_logs))
        .route("/api/admin/logs/stream", get(admin::logs_stream))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the API until `shutdown` resolves
pub async fn start_web_server(
    config: &ServerConfig,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = api_router(state);
    let addr = config.socket_addr();

    match &config.tls {
        Some(tls) => {
            let tls_config = load_tls(tls).await?;
            let handle = axum_server::Handle::new();
            let shutdown_handle = handle.clone();
            tokio::spawn(async move {
                shutdown.await;
                shutdown_handle.graceful_shutdown(Some(Duration::from_secs(10)));
            });

            info!("Web server listening on https://{}", addr);
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            info!("Web server listening on http://{}", listener.local_addr()?);
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await?;
        }
    }

    info!("Web server stopped");
    Ok(())
}

async fn load_tls(tls: &TlsPaths) -> anyhow::Result<RustlsConfig> {
    info!("Loading TLS certificates:");
    info!("  Certificate: {}", tls.cert_path.display());
    info!("  Private key: {}", tls.key_path.display());

    if !tls.cert_path.exists() {
        return Err(anyhow::anyhow!(
            "Certificate file not found: {}",
            tls.cert_path.display()
        ));
    }
    if !tls.key_path.exists() {
        return Err(anyhow::anyhow!(
            "Private key file not found: {}",
            tls.key_path.display()
        ));
    }

    RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
        .await
        .map_err(|e| anyhow::anyhow!(
            "Failed to load TLS certificates: {}\n\nHint: The private key must be in PKCS#8 PEM format.",
            e
        ))
}

/// GET /api/health
async fn health() -> Json<Value> {
    Json(json!({
        "ok": true,
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
