//! Local HTTP surface.
//!
//! `GET /v1/healthcheck` reports liveness, environment, version and the
//! relay connection; `GET /v1/state` returns the current group snapshot.
//! Both work whether or not the relay is connected.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::warn;

use huelink_config::Environment;
use huelink_core::{Bridge, DeviceGroup, DeviceGroupProvider, RelayStatus};

/// Shared state for the handlers.
pub struct AppState<P> {
    pub bridge: Bridge<P>,
    /// Relay status feed, or `None` when the relay is disabled.
    pub relay: Option<watch::Receiver<RelayStatus>>,
    pub environment: Environment,
}

impl<P> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            bridge: self.bridge.clone(),
            relay: self.relay.clone(),
            environment: self.environment,
        }
    }
}

// ── Response bodies ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    environment: Environment,
    version: &'static str,
    relay: Option<RelayStatus>,
    groups: usize,
    last_refresh: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct StateResponse {
    state: Arc<Vec<DeviceGroup>>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

// ── Router ───────────────────────────────────────────────────────────

pub fn router<P: DeviceGroupProvider>(state: AppState<P>) -> Router {
    Router::new()
        .route("/v1/healthcheck", get(healthcheck::<P>))
        .route("/v1/state", get(local_state::<P>))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /v1/healthcheck
async fn healthcheck<P: DeviceGroupProvider>(State(state): State<AppState<P>>) -> Json<HealthResponse> {
    let relay = state.relay.as_ref().map(|rx| rx.borrow().clone());
    let store = state.bridge.store();
    Json(HealthResponse {
        status: "available",
        environment: state.environment,
        version: env!("CARGO_PKG_VERSION"),
        relay,
        groups: store.len(),
        last_refresh: store.last_refresh(),
    })
}

/// GET /v1/state
///
/// Refreshes from the bridge. When the bridge fails, the last good
/// snapshot is served; only a bridge that has never answered is an error.
async fn local_state<P: DeviceGroupProvider>(State(state): State<AppState<P>>) -> Response {
    match state.bridge.refresh().await {
        Ok(groups) => Json(StateResponse { state: groups }).into_response(),
        Err(e) if state.bridge.store().last_refresh().is_some() => {
            warn!(error = %e, "serving cached groups");
            Json(StateResponse {
                state: state.bridge.snapshot(),
            })
            .into_response()
        }
        Err(e) => error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            format!("failed to get groups: {e}"),
        ),
    }
}

async fn not_found() -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        "the requested resource could not be found",
    )
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::atomic::{AtomicBool, Ordering};

    use axum::body::Body;
    use axum::http::Request;
    use huelink_core::{CoreError, SessionState};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    #[derive(Default)]
    struct StubProvider {
        down: AtomicBool,
    }

    impl DeviceGroupProvider for StubProvider {
        async fn list_groups(&self) -> Result<Vec<DeviceGroup>, CoreError> {
            if self.down.load(Ordering::SeqCst) {
                return Err(CoreError::ProviderUnavailable {
                    reason: "connection refused".into(),
                });
            }
            Ok(vec![DeviceGroup::new("1", "Office", true, 128)])
        }

        async fn set_power(&self, _: &DeviceGroup, _: bool) -> Result<(), CoreError> {
            Ok(())
        }

        async fn set_brightness(&self, _: &DeviceGroup, _: u8) -> Result<(), CoreError> {
            Ok(())
        }
    }

    fn app_state(relay: Option<watch::Receiver<RelayStatus>>) -> AppState<StubProvider> {
        AppState {
            bridge: Bridge::new(StubProvider::default()),
            relay,
            environment: Environment::Staging,
        }
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), 64 * 1024)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn healthcheck_reports_environment_and_version() {
        let (status, body) = get_json(router(app_state(None)), "/v1/healthcheck").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "available");
        assert_eq!(body["environment"], "staging");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["relay"], Value::Null);
    }

    #[tokio::test]
    async fn healthcheck_includes_relay_status() {
        let (_tx, rx) = watch::channel(RelayStatus {
            state: SessionState::Dialing,
            last_error: Some("connection refused".into()),
            ..RelayStatus::default()
        });

        let (_, body) = get_json(router(app_state(Some(rx))), "/v1/healthcheck").await;

        assert_eq!(body["relay"]["state"], "dialing");
        assert_eq!(body["relay"]["lastError"], "connection refused");
        assert_eq!(body["relay"]["session"], Value::Null);
    }

    #[tokio::test]
    async fn state_returns_groups_from_bridge() {
        let (status, body) = get_json(router(app_state(None)), "/v1/state").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "state": [{ "id": "1", "name": "Office", "isOn": true, "brightness": 128 }] })
        );
    }

    #[tokio::test]
    async fn state_falls_back_to_cache_when_bridge_fails() {
        let state = app_state(None);
        state.bridge.refresh().await.unwrap();
        state.bridge.provider().down.store(true, Ordering::SeqCst);

        let (status, body) = get_json(router(state), "/v1/state").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"][0]["name"], "Office");
    }

    #[tokio::test]
    async fn state_without_any_snapshot_is_unavailable() {
        let state = app_state(None);
        state.bridge.provider().down.store(true, Ordering::SeqCst);

        let (status, body) = get_json(router(state), "/v1/state").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].as_str().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let (status, body) = get_json(router(app_state(None)), "/v1/nope").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "the requested resource could not be found");
    }
}
