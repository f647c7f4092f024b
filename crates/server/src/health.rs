use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use pollbot_db::PollRepository;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    polls: Arc<dyn PollRepository>,
}

impl HealthState {
    pub fn new(polls: Arc<dyn PollRepository>) -> Self {
        Self { polls }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PollStoreCheck {
    pub status: &'static str,
    pub detail: String,
    pub poll_count: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub poll_store: PollStoreCheck,
    pub checked_at: String,
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let poll_store = poll_store_check(state.polls.as_ref()).await;
    let ready = poll_store.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "pollbot-server runtime initialized".to_string(),
        },
        poll_store,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn poll_store_check(polls: &dyn PollRepository) -> PollStoreCheck {
    match polls.count().await {
        Ok(count) => PollStoreCheck {
            status: "ready",
            detail: "poll store reachable".to_string(),
            poll_count: Some(count),
        },
        Err(error) => PollStoreCheck {
            status: "degraded",
            detail: format!("poll store check failed: {error}"),
            poll_count: None,
        },
    }
}
