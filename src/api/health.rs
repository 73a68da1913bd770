// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Unauthenticated probes. Readiness depends on the signing key set being
//! obtainable, since no bearer token can be verified without it.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// `ok`, or `degraded` when no signing keys are available.
    pub status: String,
    pub signing_keys: KeySetStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct KeySetStatus {
    /// `cached` or `unavailable`.
    pub state: String,
    /// Key IDs currently accepted, sorted.
    pub key_ids: Vec<String>,
    /// Seconds since the key set was last fetched.
    pub age_secs: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Snapshot the key cache, fetching once if it has never been filled.
async fn key_set_status(state: &AppState) -> KeySetStatus {
    let keys = state.gate.verifier().keys();
    if let Err(err) = keys.ensure_loaded().await {
        tracing::warn!(error = %err, "signing key set unavailable for health check");
        return KeySetStatus {
            state: "unavailable".to_string(),
            key_ids: Vec::new(),
            age_secs: None,
        };
    }

    KeySetStatus {
        state: "cached".to_string(),
        key_ids: keys.key_ids().await,
        age_secs: keys
            .last_fetched()
            .await
            .map(|fetched| fetched.elapsed().as_secs()),
    }
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Signing keys are cached", body = ReadyResponse),
        (status = 503, description = "Signing keys cannot be fetched", body = ReadyResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let signing_keys = key_set_status(&state).await;
    let ready = signing_keys.state == "cached";

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = ReadyResponse {
        status: if ready { "ok" } else { "degraded" }.to_string(),
        signing_keys,
    };
    (status, Json(body))
}

#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses((status = 200, description = "Process is up", body = HealthResponse))
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Same checks as [`health`], exposed for orchestrator readiness probes.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Ready to verify tokens", body = ReadyResponse),
        (status = 503, description = "Not ready", body = ReadyResponse)
    )
)]
pub async fn readiness(state: State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    health(state).await
}
