//! HTTP ingestion: the WAHA webhook and a health endpoint.
//!
//! The webhook is accept-and-forget: validation happens inline, but all
//! downstream work (resolution, agent, reply) runs in a detached task so
//! a slow model call never stalls the gateway's delivery loop.

pub mod pipeline;

use crate::agent::AgentRunner;
use crate::api_client::ApiClient;
use crate::resolver::MappingService;
use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use finbot_channels::WahaClient;
use finbot_core::{error::BotError, event::WahaEvent};
use finbot_memory::audit::AuditLogger;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Long-lived services shared by every processing task.
pub struct Services {
    pub mapping: MappingService,
    pub api: Arc<ApiClient>,
    pub waha: Arc<WahaClient>,
    pub agent: AgentRunner,
    pub audit: AuditLogger,
}

/// Shared state for the axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<Services>,
    pub uptime: Instant,
}

/// `GET /health` — liveness plus uptime.
async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "uptime_secs": state.uptime.elapsed().as_secs(),
    }))
}

/// `POST /webhook/` — WAHA event intake.
///
/// Always answers 200: the gateway retries on other statuses and the
/// event would just be redelivered. Invalid events are acknowledged
/// with an `ignored` status and the reason.
async fn webhook(
    State(state): State<AppState>,
    body: Result<Json<WahaEvent>, axum::extract::rejection::JsonRejection>,
) -> Json<Value> {
    let Json(event) = match body {
        Ok(b) => b,
        Err(e) => {
            info!("webhook: malformed payload ignored: {e}");
            return Json(json!({"status": "ignored", "reason": "malformed payload"}));
        }
    };

    if let Some(reason) = event.rejection_reason() {
        info!("webhook: event {} ignored: {reason}", event.id);
        return Json(json!({"status": "ignored", "reason": reason}));
    }

    info!(
        "webhook: accepted message {} from {}",
        event.payload.id, event.payload.from_id
    );
    let services = state.services.clone();
    tokio::spawn(async move {
        pipeline::process(services, event).await;
    });

    Json(json!({"status": "accepted"}))
}

/// Build the router with shared state.
fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook/", post(webhook))
        .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024))
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(bind_addr: &str, services: Arc<Services>) -> Result<(), BotError> {
    let state = AppState {
        services,
        uptime: Instant::now(),
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .map_err(|e| BotError::Config(format!("failed to bind {bind_addr}: {e}")))?;

    info!("listening on {bind_addr}");
    if let Err(e) = axum::serve(listener, app).await {
        error!("server error: {e}");
        return Err(BotError::Io(e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use finbot_core::config::{BackendConfig, ProviderConfig, WahaConfig};
    use finbot_memory::Store;
    use finbot_providers::{GroqProvider, OpenAiProvider};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn test_state() -> AppState {
        let waha_cfg = WahaConfig {
            base_url: "http://127.0.0.1:9".into(),
            api_key: "test".into(),
            session: "default".into(),
        };
        let backend = BackendConfig {
            base_url: "http://127.0.0.1:9".into(),
            api_key: "test".into(),
        };
        let providers = ProviderConfig {
            groq_api_key: "test".into(),
            openai_api_key: "test".into(),
            primary_model: "llama-3.3-70b-versatile".into(),
            fallback_model: "gpt-5-mini".into(),
        };

        let waha = Arc::new(WahaClient::new(&waha_cfg, "55"));
        let api = Arc::new(ApiClient::new(&backend));
        let mapping = MappingService::new(waha.clone(), api.clone(), "55".into());
        let agent = AgentRunner::new(
            Box::new(GroqProvider::from_config(
                providers.groq_api_key.clone(),
                providers.primary_model.clone(),
            )),
            Box::new(OpenAiProvider::from_config(
                providers.openai_api_key.clone(),
                providers.fallback_model.clone(),
            )),
        );
        let store = Store::new(":memory:").await.unwrap();
        let audit = AuditLogger::new(store.pool().clone());

        AppState {
            services: Arc::new(Services {
                mapping,
                api,
                waha,
                agent,
                audit,
            }),
            uptime: Instant::now(),
        }
    }

    fn event_json(event: &str, from_me: bool, body: &str) -> String {
        format!(
            r#"{{
                "id": "evt_01",
                "timestamp": 1756512000,
                "event": "{event}",
                "session": "default",
                "payload": {{
                    "id": "msg_01",
                    "timestamp": 1756512000,
                    "from": "5519992115781@c.us",
                    "to": "5511988887777@c.us",
                    "body": "{body}",
                    "fromMe": {from_me}
                }}
            }}"#
        )
    }

    async fn post_webhook(body: String) -> (StatusCode, Value) {
        let app = build_router(test_state().await);
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/webhook/")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_reports_ok() {
        let app = build_router(test_state().await);
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert!(body["uptime_secs"].is_number());
    }

    #[tokio::test]
    async fn test_valid_message_accepted() {
        let (status, body) = post_webhook(event_json("message", false, "oi")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "accepted");
    }

    #[tokio::test]
    async fn test_own_echo_ignored() {
        let (status, body) = post_webhook(event_json("message", true, "oi")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ignored");
        assert_eq!(body["reason"], "own message echo");
    }

    #[tokio::test]
    async fn test_non_message_event_ignored() {
        let (_, body) = post_webhook(event_json("session.status", false, "x")).await;
        assert_eq!(body["status"], "ignored");
        assert_eq!(body["reason"], "not a message event");
    }

    #[tokio::test]
    async fn test_blank_body_ignored() {
        let (_, body) = post_webhook(event_json("message", false, "   ")).await;
        assert_eq!(body["status"], "ignored");
        assert_eq!(body["reason"], "empty body");
    }

    #[tokio::test]
    async fn test_malformed_payload_ignored() {
        let (status, body) = post_webhook("{\"not\": \"an event\"}".to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ignored");
        assert_eq!(body["reason"], "malformed payload");
    }
}
