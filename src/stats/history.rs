//! Rolling price sample and bounded analytics logs.
//!
//! Prices recorded during scans accumulate in an unbounded history; the
//! page-cycle event folds the sample into a percentile-trimmed average
//! (lowest 35%, a floor estimate that shrugs off outlier asks). Both logs
//! are bounded, append-only, and sorted by timestamp by construction.
//!
//! Persistence is write-through but fire-and-forget: a failed write costs at
//! most the latest increment and is only logged.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{
    AVERAGE_LOG_CAP, MATCHED_LOG_CAP, MATCHED_LOG_STALE_MS, MIN_ANALYSIS_SAMPLE,
    PRICE_LOG_STALE_MS, TRIM_FRACTION,
};
use crate::db::KeyValueStore;
use crate::types::{now_ms, AveragePriceLogEntry, MatchedOfferLogEntry};

pub const KEY_PRICE_HISTORY: &str = "priceHistory";
pub const KEY_AVERAGE_LOG: &str = "averagePriceLog";
pub const KEY_MATCHED_LOG: &str = "matchedOffersLog";

pub struct StatsStore {
    store: Arc<dyn KeyValueStore>,
    price_history: Vec<f64>,
    average_price_log: Vec<AveragePriceLogEntry>,
    matched_offers_log: Vec<MatchedOfferLogEntry>,
}

impl StatsStore {
    /// Load persisted records and apply the staleness resets.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let price_history = read_json(store.as_ref(), KEY_PRICE_HISTORY).await;
        let average_price_log = read_json(store.as_ref(), KEY_AVERAGE_LOG).await;
        let matched_offers_log = read_json(store.as_ref(), KEY_MATCHED_LOG).await;
        let mut stats = Self {
            store,
            price_history,
            average_price_log,
            matched_offers_log,
        };
        stats.apply_staleness_resets(now_ms()).await;
        stats
    }

    /// Staleness rule 1: an average-price log whose newest entry is older
    /// than 4 hours invalidates the rolling sample. The history clears and a
    /// synthetic zero entry stamped "now" keeps the check from re-firing on
    /// the next load. Rule 2: a matched-offers log older than 12 hours is
    /// cleared outright.
    pub(crate) async fn apply_staleness_resets(&mut self, now: i64) {
        let price_stale = self
            .average_price_log
            .last()
            .is_some_and(|e| now - e.timestamp_ms > PRICE_LOG_STALE_MS);
        if price_stale {
            info!("price sample stale — clearing history and stamping a zero entry");
            self.price_history.clear();
            self.average_price_log.push(AveragePriceLogEntry {
                timestamp_ms: now,
                average: 0.0,
                total_prices: 0,
                prices_counted: 0,
            });
            cap(&mut self.average_price_log, AVERAGE_LOG_CAP);
            self.persist(KEY_PRICE_HISTORY, &self.price_history).await;
            self.persist(KEY_AVERAGE_LOG, &self.average_price_log).await;
        }

        let matched_stale = self
            .matched_offers_log
            .last()
            .is_some_and(|e| now - e.timestamp_ms > MATCHED_LOG_STALE_MS);
        if matched_stale {
            info!("matched-offers log stale — clearing");
            self.matched_offers_log.clear();
            self.persist(KEY_MATCHED_LOG, &self.matched_offers_log).await;
        }
    }

    /// Fold one observed price into the rolling sample.
    pub async fn record_price(&mut self, price: f64) {
        self.price_history.push(price);
        self.persist(KEY_PRICE_HISTORY, &self.price_history).await;
    }

    /// Append a matched offer, keeping the newest entries only.
    pub async fn add_matched_offer(&mut self, price: f64, offer_text: String) {
        self.matched_offers_log.push(MatchedOfferLogEntry {
            timestamp_ms: now_ms(),
            price,
            offer_text,
        });
        cap(&mut self.matched_offers_log, MATCHED_LOG_CAP);
        self.persist(KEY_MATCHED_LOG, &self.matched_offers_log).await;
    }

    /// Trimmed-average analysis, triggered before each page switch/reload.
    /// Skips small samples; otherwise every run fully consumes the history.
    pub async fn execute_price_analysis(&mut self) {
        self.execute_price_analysis_at(now_ms()).await;
    }

    pub(crate) async fn execute_price_analysis_at(&mut self, now: i64) {
        let total = self.price_history.len();
        if total <= MIN_ANALYSIS_SAMPLE {
            info!(sample = total, "price analysis skipped — sample too small");
            return;
        }

        let mut sorted = self.price_history.clone();
        sorted.sort_by(f64::total_cmp);
        let count = ((total as f64) * TRIM_FRACTION).ceil() as usize;
        let average = sorted[..count].iter().sum::<f64>() / count as f64;

        info!(
            total_prices = total,
            prices_counted = count,
            average,
            "price analysis complete"
        );

        self.average_price_log.push(AveragePriceLogEntry {
            timestamp_ms: now,
            average,
            total_prices: total,
            prices_counted: count,
        });
        cap(&mut self.average_price_log, AVERAGE_LOG_CAP);
        self.persist(KEY_AVERAGE_LOG, &self.average_price_log).await;

        self.price_history.clear();
        self.persist(KEY_PRICE_HISTORY, &self.price_history).await;
    }

    pub fn price_history(&self) -> &[f64] {
        &self.price_history
    }

    pub fn average_log(&self) -> &[AveragePriceLogEntry] {
        &self.average_price_log
    }

    pub fn matched_offers(&self) -> &[MatchedOfferLogEntry] {
        &self.matched_offers_log
    }

    async fn persist<T: Serialize>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("serializing {key} failed: {e}");
                return;
            }
        };
        if let Err(e) = self.store.set(key, &raw).await {
            warn!("persisting {key} failed: {e}");
        }
    }
}

/// Keep the newest `max` entries, evicting from the front.
fn cap<T>(log: &mut Vec<T>, max: usize) {
    if log.len() > max {
        let excess = log.len() - max;
        log.drain(..excess);
    }
}

async fn read_json<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> T {
    match store.get(key).await {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("stored {key} is corrupt, starting fresh: {e}");
            T::default()
        }),
        Ok(None) => T::default(),
        Err(e) => {
            warn!("loading {key} failed, starting fresh: {e}");
            T::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
