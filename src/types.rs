use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::dom::NodeId;
use crate::feed::messages::{MutationRecord, NodeSpec};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// User thresholds, written by the settings API and read by the scan engine
/// once at startup. Changes apply on restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub currency: Option<String>,
    pub max_price: Option<f64>,
    #[serde(default = "default_pages_to_check")]
    pub pages_to_check: u32,
}

fn default_pages_to_check() -> u32 {
    2
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_amount: None,
            max_amount: None,
            currency: None,
            max_price: None,
            pages_to_check: default_pages_to_check(),
        }
    }
}

impl Settings {
    /// The amount pass runs only with a full range and a currency code.
    pub fn has_amount_range(&self) -> bool {
        self.min_amount.is_some()
            && self.max_amount.is_some()
            && self.currency.as_deref().is_some_and(|c| !c.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Per-row parse results (ephemeral, recomputed on every rescan)
// ---------------------------------------------------------------------------

/// Amount range parsed out of a single cell's text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmountRange {
    pub min: f64,
    pub max: f64,
}

/// Reputation numbers extracted from a row's advertiser cell.
/// Either field is None when the cell text doesn't carry it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AdvertiserStats {
    pub completion: Option<f64>,
    pub orders: Option<i64>,
}

// ---------------------------------------------------------------------------
// Persisted analytics records
// ---------------------------------------------------------------------------

/// One trimmed-average computation over a consumed price sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AveragePriceLogEntry {
    #[serde(rename = "timestamp")]
    pub timestamp_ms: i64,
    pub average: f64,
    pub total_prices: usize,
    pub prices_counted: usize,
}

/// One matched offer, logged the first time its price cell highlights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedOfferLogEntry {
    #[serde(rename = "timestamp")]
    pub timestamp_ms: i64,
    pub price: f64,
    pub offer_text: String,
}

// ---------------------------------------------------------------------------
// Rescan requests
// ---------------------------------------------------------------------------

/// Scope of one rescan request. `Full` subsumes the narrower scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RescanScope {
    Full,
    /// One row and everything under it.
    Row(NodeId),
    /// A newly added node with no row ancestor.
    Node(NodeId),
}

// ---------------------------------------------------------------------------
// Channel message types
// ---------------------------------------------------------------------------

/// Routed from the bridge server to the scan engine.
#[derive(Debug)]
pub enum FeedEvent {
    /// Full document replacement (initial load, reload, resync).
    Snapshot(NodeSpec),
    /// A batch of mutation records, in delivery order.
    Mutations(Vec<MutationRecord>),
    /// The bridge is about to switch page or reload.
    PageCycle,
}

/// Routed from the scan engine to the notification consumer.
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    /// The badge element the bridge should blink.
    pub node: NodeId,
    pub price: f64,
    pub timestamp_ms: i64,
}

/// Unix epoch milliseconds.
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
