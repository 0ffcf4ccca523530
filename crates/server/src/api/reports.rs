//! Report API handlers.
//!
//! Triggering is fire-and-forget: the handler spawns the run on a
//! detached task and answers immediately; progress is observed by
//! polling the status endpoint.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use opsdesk_core::ReportKind;

use crate::state::AppState;

/// Cache key for the rendered status snapshot. Invalidated before and
/// after every run so a poll never spans a run boundary with stale data.
pub const STATUS_CACHE_KEY: &str = "reports:status";

/// Acknowledgement for a trigger call.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub status: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ReportErrorResponse {
    pub error: String,
}

/// Get the report status and metrics snapshot.
///
/// Served from the cache when fresh; rebuilt from the tracker on a miss.
/// Never triggers computation.
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    if let Some(cached) = state.cache().get(STATUS_CACHE_KEY).await {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&cached) {
            return Json(value);
        }
    }

    let snapshot = state.pipeline().tracker().snapshot().await;
    let value = serde_json::to_value(&snapshot).unwrap_or_default();

    if let Ok(text) = serde_json::to_string(&value) {
        state
            .cache()
            .set(STATUS_CACHE_KEY, text, state.status_cache_ttl())
            .await;
    }

    Json(value)
}

/// Trigger a full pipeline run.
///
/// Always returns immediately with an accepted/processing acknowledgement,
/// never the run's outcome.
pub async fn generate_all(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.cache().delete(STATUS_CACHE_KEY).await;

    let pipeline = state.pipeline();
    let cache = state.cache();
    tokio::spawn(async move {
        if !pipeline.run_all().await {
            warn!("Report pipeline run reported failure");
        }
        cache.delete(STATUS_CACHE_KEY).await;
    });

    (
        StatusCode::ACCEPTED,
        Json(GenerateResponse {
            status: "processing".to_string(),
        }),
    )
}

/// Trigger a single report generator.
pub async fn generate_one(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<(StatusCode, Json<GenerateResponse>), impl IntoResponse> {
    let kind: ReportKind = match name.parse() {
        Ok(kind) => kind,
        Err(_) => {
            return Err((
                StatusCode::NOT_FOUND,
                Json(ReportErrorResponse {
                    error: format!("Unknown report: {} (expected accounts, yearly or fs)", name),
                }),
            ));
        }
    };

    state.cache().delete(STATUS_CACHE_KEY).await;

    let pipeline = state.pipeline();
    let cache = state.cache();
    tokio::spawn(async move {
        // Failure is already recorded in the report's status entry
        let _ = pipeline.run_report(kind).await;
        cache.delete(STATUS_CACHE_KEY).await;
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(GenerateResponse {
            status: "processing".to_string(),
        }),
    ))
}
