use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use quotedraft_agent::DraftStrategy;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    strategy: DraftStrategy,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub drafting: HealthCheck,
    pub draft_mode: &'static str,
    pub checked_at: String,
}

pub fn router(strategy: DraftStrategy) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { strategy })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let drafting = match state.strategy {
        DraftStrategy::LocalTemplate => HealthCheck {
            status: "ready",
            detail: "drafts rendered from embedded templates".to_string(),
        },
        // Provider reachability is only known per request.
        DraftStrategy::RemoteProvider => HealthCheck {
            status: "ready",
            detail: "drafts requested from the configured completion provider".to_string(),
        },
    };

    let payload = HealthResponse {
        status: "ready",
        service: HealthCheck {
            status: "ready",
            detail: "quotedraft-server runtime initialized".to_string(),
        },
        drafting,
        draft_mode: state.strategy.as_str(),
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}
