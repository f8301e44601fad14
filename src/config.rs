use crate::error::{AppError, Result};

pub const BRIDGE_ADDR: &str = "127.0.0.1:8765";

/// Advertiser eligibility floor: completion percentage and finished orders.
/// Both must be present and clear the floor for a row to highlight at all.
pub const ELIGIBLE_MIN_COMPLETION: f64 = 95.0;
pub const ELIGIBLE_MIN_ORDERS: i64 = 300;

/// VIP tier floor. Checked independently of the eligibility floor, not as
/// "eligible plus extra".
pub const VIP_MIN_COMPLETION: f64 = 97.0;
pub const VIP_MIN_ORDERS: i64 = 450;

/// Offers whose amount ceiling reaches this get the brighter green fill.
pub const BRIGHT_AMOUNT_THRESHOLD: f64 = 20_000.0;

/// Fallback full-document rescan period (seconds). The mutation feed is the
/// primary trigger; this catches anything the feed missed.
pub const FULL_RESCAN_INTERVAL_SECS: u64 = 4;

/// Price analysis runs only once the rolling sample exceeds this many prices.
pub const MIN_ANALYSIS_SAMPLE: usize = 50;

/// Fraction of the sorted sample (lowest prices first) folded into the
/// trimmed average. Count is rounded up.
pub const TRIM_FRACTION: f64 = 0.35;

/// Most recent entries kept per persisted log; older entries are evicted.
pub const AVERAGE_LOG_CAP: usize = 40;
pub const MATCHED_LOG_CAP: usize = 10;

/// A price-average log whose newest entry is older than this is stale: the
/// rolling sample it summarizes no longer reflects the market.
pub const PRICE_LOG_STALE_MS: i64 = 4 * 3_600 * 1_000;

/// A matched-offers log whose newest entry is older than this is stale.
pub const MATCHED_LOG_STALE_MS: i64 = 12 * 3_600 * 1_000;

/// Channel capacity for internal message routing.
pub const CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub struct Config {
    /// WebSocket listen address for the browser bridge (BRIDGE_ADDR).
    pub bridge_addr: String,
    pub log_level: String,
    pub db_path: String,
    pub api_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bridge_addr: std::env::var("BRIDGE_ADDR")
                .unwrap_or_else(|_| BRIDGE_ADDR.to_string()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| "highlighter.db".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| {
                    AppError::Config("API_PORT must be a valid port number".to_string())
                })?,
        })
    }
}
