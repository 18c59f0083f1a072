//! HTTP server: health check, payment webhook and WhatsApp Cloud API ingress.
//!
//! Spawned as a background task in the gateway, same pattern as the sweep
//! and report loops.

use crate::replies;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use funil_channels::whatsapp::{normalize_phone, WebhookPayload};
use funil_channels::WhatsAppCloudChannel;
use funil_core::config::ApiConfig;
use funil_core::message::OutgoingMessage;
use funil_core::traits::Channel;
use funil_memory::Store;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Channel that carries payment notices to customers.
const NOTICE_CHANNEL: &str = "whatsapp";

type ApiError = (StatusCode, Json<Value>);

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    channels: HashMap<String, Arc<dyn Channel>>,
    store: Store,
    api_key: Option<String>,
}

/// Payment platform event.
#[derive(Debug, Deserialize)]
struct PaymentEvent {
    #[serde(rename = "type", default)]
    event_type: String,
    #[serde(default)]
    customer_phone: String,
    #[serde(default)]
    product_name: String,
}

/// Constant-time string comparison to prevent timing attacks on API token validation.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Check bearer token auth. Returns `None` if authorized, `Some(response)` if rejected.
fn check_auth(headers: &HeaderMap, api_key: &Option<String>) -> Option<ApiError> {
    let key = api_key.as_ref()?;

    let Some(header) = headers.get("authorization") else {
        return Some((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "missing Authorization header"})),
        ));
    };

    let Ok(value) = header.to_str() else {
        return Some((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid Authorization header"})),
        ));
    };

    match value.strip_prefix("Bearer ") {
        Some(token) if constant_time_eq(token, key) => None,
        _ => Some((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid token"})),
        )),
    }
}

fn bad_request(msg: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({"error": msg})))
}

/// Downcast the WhatsApp channel from shared state.
fn get_whatsapp(state: &ApiState) -> Result<&WhatsAppCloudChannel, ApiError> {
    let ch = state.channels.get("whatsapp").ok_or((
        StatusCode::NOT_FOUND,
        Json(json!({"error": "WhatsApp channel not configured"})),
    ))?;

    ch.as_any().downcast_ref::<WhatsAppCloudChannel>().ok_or((
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "WhatsApp channel downcast failed"})),
    ))
}

/// `GET /health`
async fn health() -> &'static str {
    "OK"
}

/// `POST /webhook`: payment status events.
///
/// Counters change before the customer notice goes out, so a failed
/// delivery (500) still leaves the sale recorded.
async fn payment_webhook(
    headers: HeaderMap,
    State(state): State<ApiState>,
    body: Result<Json<PaymentEvent>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if let Some(err) = check_auth(&headers, &state.api_key) {
        return Err(err);
    }

    let Json(event) = body.map_err(|e| bad_request(&format!("invalid request: {e}")))?;

    if event.event_type.trim().is_empty() {
        return Err(bad_request("type must not be empty"));
    }
    if event.product_name.trim().is_empty() {
        return Err(bad_request("product_name must not be empty"));
    }
    let phone = normalize_phone(&event.customer_phone);
    if phone.is_empty() {
        return Err(bad_request("customer_phone must not be empty"));
    }
    let product = event.product_name.trim();

    let notice = match event.event_type.trim() {
        "pagamento_pendente" => {
            state.store.record_pending_payment().await;
            info!("webhook: payment pending for {phone} ({product})");
            replies::payment_pending(product)
        }
        "pagamento_aprovado" => {
            let closed = state.store.record_sale(&phone).await;
            info!(
                "webhook: payment approved for {phone} ({product}){}",
                if closed.is_some() { ", lead closed" } else { "" }
            );
            replies::payment_approved(product)
        }
        "cancelada" => {
            info!("webhook: order cancelled for {phone} ({product})");
            replies::order_cancelled(product)
        }
        other => {
            warn!("webhook: unknown event type '{other}' for {phone}, ignoring");
            return Ok((StatusCode::OK, Json(json!({"status": "ok"}))));
        }
    };

    let channel = state.channels.get(NOTICE_CHANNEL).ok_or_else(|| {
        error!("webhook: no {NOTICE_CHANNEL} channel to notify {phone}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "notice channel not configured"})),
        )
    })?;

    channel
        .send(OutgoingMessage::to(&phone, notice))
        .await
        .map_err(|e| {
            error!("webhook: notice to {phone} failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": format!("delivery failed: {e}")})),
            )
        })?;

    Ok((StatusCode::OK, Json(json!({"status": "ok"}))))
}

/// `GET /whatsapp`: Cloud API subscription handshake.
async fn whatsapp_verify(
    State(state): State<ApiState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<String, StatusCode> {
    let wa = get_whatsapp(&state).map_err(|(status, _)| status)?;
    let param = |k: &str| params.get(k).map(String::as_str).unwrap_or("");
    wa.verify_webhook(
        param("hub.mode"),
        param("hub.verify_token"),
        param("hub.challenge"),
    )
    .ok_or(StatusCode::FORBIDDEN)
}

/// `POST /whatsapp`: inbound messages pushed by Meta.
async fn whatsapp_ingest(
    State(state): State<ApiState>,
    body: Result<Json<WebhookPayload>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let wa = get_whatsapp(&state)?;
    let Json(payload) = body.map_err(|e| bad_request(&format!("invalid payload: {e}")))?;

    let queued = wa.ingest(&payload).await.map_err(|e| {
        error!("[whatsapp] ingest failed: {e}");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": "gateway unavailable"})),
        )
    })?;

    Ok(Json(json!({"status": "ok", "queued": queued})))
}

/// Build the axum router with shared state.
fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook", post(payment_webhook))
        .route("/whatsapp", get(whatsapp_verify).post(whatsapp_ingest))
        .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024)) // 1 MB max request body
        .with_state(state)
}

/// Start the HTTP server. Called from `Gateway::run()`.
pub async fn serve(config: ApiConfig, channels: HashMap<String, Arc<dyn Channel>>, store: Store) {
    let api_key = if config.api_key.is_empty() {
        None
    } else {
        Some(config.api_key.clone())
    };

    let state = ApiState {
        channels,
        store,
        api_key,
    };

    let app = build_router(state);
    let addr = format!("{}:{}", config.host, config.port);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("API server failed to bind to {addr}: {e}");
            return;
        }
    };

    info!("API server listening on {addr}");

    if let Err(e) = axum::serve(listener, app).await {
        error!("API server error: {e}");
    }
}
