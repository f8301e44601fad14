use std::sync::Arc;

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::api::health::HealthState;
use crate::api::latency::{LatencySnapshot, LatencyStats};
use crate::db::{load_settings, save_settings, KeyValueStore};
use crate::error::AppError;
use crate::stats::history::{KEY_AVERAGE_LOG, KEY_MATCHED_LOG};
use crate::types::{AveragePriceLogEntry, MatchedOfferLogEntry, Settings};

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn KeyValueStore>,
    pub latency: Arc<LatencyStats>,
    pub health: Arc<HealthState>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/settings", get(get_settings).put(put_settings))
        .route("/logs/average-prices", get(get_average_prices))
        .route("/logs/matched-offers", get(get_matched_offers))
        .route("/stats/latency", get(get_stats_latency))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct HealthResponse {
    pub bridge_connected: bool,
    pub last_scan_at_ms: i64,
    pub scans_completed: u64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        bridge_connected: state.health.bridge_connected(),
        last_scan_at_ms: state.health.last_scan_at_ms(),
        scans_completed: state.health.scans_completed(),
    })
}

async fn get_settings(State(state): State<ApiState>) -> Json<Settings> {
    Json(load_settings(state.store.as_ref()).await)
}

/// Persist new thresholds. The running engine keeps its startup snapshot;
/// the record applies on the next restart.
async fn put_settings(
    State(state): State<ApiState>,
    Json(settings): Json<Settings>,
) -> Result<Json<Settings>, AppError> {
    save_settings(state.store.as_ref(), &settings).await?;
    Ok(Json(settings))
}

async fn get_average_prices(
    State(state): State<ApiState>,
) -> Result<Json<Vec<AveragePriceLogEntry>>, AppError> {
    Ok(Json(read_log(state.store.as_ref(), KEY_AVERAGE_LOG).await?))
}

async fn get_matched_offers(
    State(state): State<ApiState>,
) -> Result<Json<Vec<MatchedOfferLogEntry>>, AppError> {
    Ok(Json(read_log(state.store.as_ref(), KEY_MATCHED_LOG).await?))
}

async fn get_stats_latency(State(state): State<ApiState>) -> Json<LatencySnapshot> {
    Json(state.latency.snapshot())
}

async fn read_log<T: serde::de::DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Vec<T>, AppError> {
    match store.get(key).await? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn test_state() -> ApiState {
        ApiState {
            store: Arc::new(MemoryStore::default()),
            latency: Arc::new(LatencyStats::new()),
            health: Arc::new(HealthState::new()),
        }
    }

    #[tokio::test]
    async fn settings_put_then_get_round_trips() {
        let state = test_state();
        let settings = Settings {
            min_amount: Some(500.0),
            max_amount: Some(2_000.0),
            currency: Some("UAH".to_string()),
            max_price: Some(41.0),
            pages_to_check: 4,
        };

        let saved = put_settings(State(state.clone()), Json(settings))
            .await
            .expect("put succeeds");
        assert_eq!(saved.0.pages_to_check, 4);

        let loaded = get_settings(State(state)).await;
        assert_eq!(loaded.0.max_price, Some(41.0));
        assert_eq!(loaded.0.currency.as_deref(), Some("UAH"));
    }

    #[tokio::test]
    async fn logs_default_to_empty() {
        let state = test_state();
        let averages = get_average_prices(State(state.clone())).await.expect("ok");
        assert!(averages.0.is_empty());
        let matched = get_matched_offers(State(state)).await.expect("ok");
        assert!(matched.0.is_empty());
    }

    #[tokio::test]
    async fn health_reflects_state() {
        let state = test_state();
        state.health.set_bridge_connected(true);
        state.health.mark_scan(123);
        let resp = get_health(State(state)).await;
        assert!(resp.0.bridge_connected);
        assert_eq!(resp.0.last_scan_at_ms, 123);
        assert_eq!(resp.0.scans_completed, 1);
    }
}
