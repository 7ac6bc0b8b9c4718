use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::db::WheelRepository;
use crate::error::AppError;
use crate::state::WheelStore;
use crate::types::ChannelKey;

pub struct ApiState<R> {
    pub store: Arc<WheelStore<R>>,
    pub health: Arc<HealthState>,
    pub latency: Arc<LatencyStats>,
}

impl<R> Clone for ApiState<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            health: Arc::clone(&self.health),
            latency: Arc::clone(&self.latency),
        }
    }
}

pub fn router<R: WheelRepository>(state: ApiState<R>) -> Router {
    Router::new()
        .route("/health", get(get_health::<R>))
        .route("/wheels/:key", get(get_wheel::<R>))
        .route("/stats/latency", get(get_stats_latency::<R>))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub gateway_connected: bool,
    pub cached_wheels: usize,
    pub commands_handled: u64,
    pub commands_failed: u64,
    /// 0 = no command since start.
    pub last_command_at_ns: u64,
}

#[derive(Debug, Serialize)]
pub struct WheelResponse {
    pub key: String,
    pub count: usize,
    pub options: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct LatencyResponse {
    pub samples: u64,
    pub p50_ms: Option<f64>,
    pub p95_ms: Option<f64>,
    pub p99_ms: Option<f64>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_health<R: WheelRepository>(State(state): State<ApiState<R>>) -> Json<HealthResponse> {
    let connected = state.health.gateway_connected();
    Json(HealthResponse {
        status: if connected { "ok" } else { "degraded" },
        gateway_connected: connected,
        cached_wheels: state.store.cached_count(),
        commands_handled: state.health.commands_handled(),
        commands_failed: state.health.commands_failed(),
        last_command_at_ns: state.health.last_command_at_ns(),
    })
}

/// Options of one wheel, read through the cache. Unknown keys are empty wheels.
async fn get_wheel<R: WheelRepository>(
    State(state): State<ApiState<R>>,
    Path(key): Path<String>,
) -> Result<Json<WheelResponse>, AppError> {
    let key = ChannelKey::parse(&key)?;
    let options = state.store.snapshot(&key).await?;
    Ok(Json(WheelResponse {
        key: key.to_string(),
        count: options.len(),
        options,
    }))
}

async fn get_stats_latency<R: WheelRepository>(
    State(state): State<ApiState<R>>,
) -> Json<LatencyResponse> {
    let (p50_ms, p95_ms, p99_ms) = state.latency.percentiles_ms();
    Json(LatencyResponse {
        samples: state.latency.len(),
        p50_ms,
        p95_ms,
        p99_ms,
    })
}
