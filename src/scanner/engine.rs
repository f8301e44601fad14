//! The scan engine task: owns the page mirror, applies feed events, and runs
//! classification passes over full/row/node scopes.
//!
//! All mirror and analytics mutation happens here, on one task, so rescans
//! are strictly ordered and each runs to completion before the next event is
//! taken.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::config::{BRIGHT_AMOUNT_THRESHOLD, FULL_RESCAN_INTERVAL_SECS};
use crate::dom::{Edit, NodeId, PageModel};
use crate::feed::messages::{BridgeCommand, MutationRecord};
use crate::feed::queue::{scope_for, RescanQueue};
use crate::parse::{normalize_ws, parse_number, ranges_overlap, RangePattern};
use crate::scanner::advertiser::{advertiser_eligible, advertiser_stats};
use crate::scanner::annotate;
use crate::stats::StatsStore;
use crate::types::{now_ms, FeedEvent, NotificationEvent, RescanScope, Settings};

/// Candidate tags for the amount pass; everything else never carries an
/// amount range.
const AMOUNT_TAGS: [&str; 3] = ["div", "span", "td"];

pub struct ScanEngine {
    settings: Settings,
    /// Compiled once from the configured currency; None disables Pass A.
    range_pattern: Option<RangePattern>,
    model: PageModel,
    stats: StatsStore,
    queue: RescanQueue,
    feed_rx: mpsc::Receiver<FeedEvent>,
    command_tx: mpsc::Sender<BridgeCommand>,
    notify_tx: mpsc::Sender<NotificationEvent>,
    latency: Arc<LatencyStats>,
    health: Arc<HealthState>,
}

impl ScanEngine {
    pub fn new(
        settings: Settings,
        stats: StatsStore,
        feed_rx: mpsc::Receiver<FeedEvent>,
        command_tx: mpsc::Sender<BridgeCommand>,
        notify_tx: mpsc::Sender<NotificationEvent>,
        latency: Arc<LatencyStats>,
        health: Arc<HealthState>,
    ) -> Self {
        let range_pattern = settings
            .has_amount_range()
            .then(|| RangePattern::new(settings.currency.as_deref().unwrap_or_default()));
        Self {
            settings,
            range_pattern,
            model: PageModel::new(),
            stats,
            queue: RescanQueue::default(),
            feed_rx,
            command_tx,
            notify_tx,
            latency,
            health,
        }
    }

    pub async fn run(mut self) {
        let mut ticker = interval(Duration::from_secs(FULL_RESCAN_INTERVAL_SECS));
        ticker.tick().await; // consume immediate first tick

        loop {
            tokio::select! {
                event = self.feed_rx.recv() => {
                    let Some(event) = event else { break };
                    self.handle_event(event).await;
                }
                _ = ticker.tick() => {
                    self.queue.push(RescanScope::Full);
                    self.drain_queue().await;
                }
            }
        }
    }

    async fn handle_event(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Snapshot(root) => {
                self.model.load_snapshot(&root);
                info!(rows = self.model.all_rows().len(), "document snapshot loaded");
                self.queue.push(RescanScope::Full);
                self.drain_queue().await;
            }
            FeedEvent::Mutations(records) => {
                for record in &records {
                    self.apply_record(record);
                }
                self.drain_queue().await;
            }
            FeedEvent::PageCycle => {
                self.stats.execute_price_analysis().await;
            }
        }
    }

    /// Apply one mutation to the mirror, then derive the scope it dirties.
    /// Scope derivation runs against the updated tree so a freshly added
    /// subtree can resolve its own row ancestry.
    fn apply_record(&mut self, record: &MutationRecord) {
        self.model.apply_mutation(record);
        for scope in scope_for(&self.model, record) {
            self.queue.push(scope);
        }
    }

    async fn drain_queue(&mut self) {
        for scope in self.queue.drain() {
            let started = Instant::now();
            let edits = self.scan(scope).await;
            self.latency.record(started.elapsed());
            self.health.mark_scan(now_ms());

            if !edits.is_empty() {
                debug!(?scope, edits = edits.len(), "scan produced edits");
                if let Err(e) = self.command_tx.try_send(BridgeCommand::Edits { edits }) {
                    warn!("command channel full, dropping edits: {e}");
                }
            }
        }
    }

    /// One sweep over a scope: fingerprint refresh, then the amount pass and
    /// the price pass.
    async fn scan(&mut self, scope: RescanScope) -> Vec<Edit> {
        let mut edits = Vec::new();
        for row in self.rows_in_scope(scope) {
            self.refresh_row(row, &mut edits);
        }
        if let Some(root) = self.scope_root(scope) {
            self.pass_amount(root, &mut edits);
            self.pass_price(root, &mut edits).await;
        }
        edits
    }

    fn scope_root(&self, scope: RescanScope) -> Option<NodeId> {
        match scope {
            RescanScope::Full => self.model.root(),
            RescanScope::Row(id) | RescanScope::Node(id) => {
                self.model.contains_node(id).then_some(id)
            }
        }
    }

    fn rows_in_scope(&self, scope: RescanScope) -> Vec<NodeId> {
        match scope {
            RescanScope::Full => self.model.all_rows(),
            RescanScope::Row(row) => {
                if self.model.contains_node(row) {
                    vec![row]
                } else {
                    Vec::new()
                }
            }
            RescanScope::Node(node) => match self.model.closest_row(node) {
                Some(row) => vec![row],
                None => self
                    .model
                    .scope_elements(node)
                    .into_iter()
                    .filter(|&e| self.model.tag(e) == Some("tr"))
                    .collect(),
            },
        }
    }

    /// Re-derive a recycled row. A fingerprint mismatch means the renderer
    /// reused this element for different data: parse and highlight flags no
    /// longer describe what is on screen, so they reset and the green/gold
    /// decoration is reverted. The sound/log one-shots survive — a recycled
    /// cell never re-alerts.
    fn refresh_row(&mut self, row: NodeId, edits: &mut Vec<Edit>) {
        if !self.model.contains_node(row) {
            return;
        }
        let current = self.model.fingerprint(row);
        let prior = self.model.row_flags(row).and_then(|f| f.fingerprint);
        if prior == Some(current) {
            return;
        }
        if prior.is_some() {
            for el in self.model.descendant_elements(row) {
                let green = self
                    .model
                    .cell_flags(el)
                    .is_some_and(|c| c.green_applied);
                if green {
                    annotate::clear_green(&mut self.model, el, edits);
                }
                if let Some(flags) = self.model.cell_flags_mut(el) {
                    flags.checked = false;
                }
            }
            if let Some(flags) = self.model.row_flags_mut(row) {
                flags.matched = false;
                flags.price_added = false;
                flags.offer_text = None;
            }
            let stats = advertiser_stats(&self.model, row);
            annotate::update_vip_outline(&mut self.model, row, &stats, false, edits);
        }
        if let Some(flags) = self.model.row_flags_mut(row) {
            flags.fingerprint = Some(current);
        }
    }

    /// Pass A: amount/eligibility. Walks candidate text-bearing elements,
    /// parses the amount range, classifies the owning row, and applies the
    /// green highlight plus VIP outline.
    fn pass_amount(&mut self, root: NodeId, edits: &mut Vec<Edit>) {
        let Some(pattern) = self.range_pattern.as_ref() else {
            return;
        };
        let currency_uc = self
            .settings
            .currency
            .as_deref()
            .unwrap_or_default()
            .to_uppercase();
        let (user_min, user_max) = (self.settings.min_amount, self.settings.max_amount);

        for el in self.model.scope_elements(root) {
            let is_candidate = self
                .model
                .tag(el)
                .is_some_and(|t| AMOUNT_TAGS.contains(&t));
            if !is_candidate {
                continue;
            }
            // Checked is set unconditionally: even a range-less element is
            // never regex-scanned twice in its lifetime.
            match self.model.cell_flags_mut(el) {
                Some(flags) if flags.checked => continue,
                Some(flags) => flags.checked = true,
                None => continue,
            }

            let text = self.model.text(el);
            if !text.to_uppercase().contains(&currency_uc) {
                continue;
            }
            let Some(range) = pattern.parse(&text) else {
                continue;
            };
            let Some(row) = self.model.closest_row(el) else {
                continue;
            };

            let stats = advertiser_stats(&self.model, row);
            let eligible = advertiser_eligible(&stats);

            // Provisionally non-VIP: guarantees no stale gold on reused rows
            // before eligibility is re-confirmed.
            annotate::update_vip_outline(&mut self.model, row, &stats, false, edits);

            if eligible && ranges_overlap(user_min, user_max, range.min, range.max) {
                let bright = range.max >= BRIGHT_AMOUNT_THRESHOLD;
                annotate::apply_green(&mut self.model, el, bright, edits);
                if let Some(flags) = self.model.row_flags_mut(row) {
                    flags.matched = true;
                    flags.offer_text = Some(normalize_ws(&text));
                }
                annotate::update_vip_outline(&mut self.model, row, &stats, true, edits);
            } else if let Some(flags) = self.model.row_flags_mut(row) {
                flags.matched = false;
            }
        }
    }

    /// Pass B: price. For every price cell in a matched row, fold the price
    /// into the rolling sample (census — independent of the threshold), then
    /// badge and alert when it clears `max_price`.
    async fn pass_price(&mut self, root: NodeId, edits: &mut Vec<Edit>) {
        let Some(max_price) = self.settings.max_price else {
            return;
        };

        let price_cells: Vec<NodeId> = self
            .model
            .scope_elements(root)
            .into_iter()
            .filter(|&el| {
                self.model.tag(el) == Some("td")
                    && self.model.attr(el, "aria-colindex") == Some("2")
                    && self.model.attr(el, "role") == Some("cell")
            })
            .collect();

        for cell in price_cells {
            let Some(row) = self.model.closest_row(cell) else {
                continue;
            };
            if !self.model.row_flags(row).is_some_and(|f| f.matched) {
                continue;
            }
            let Some(price) = parse_number(&self.model.text(cell)) else {
                continue;
            };

            if !self.model.row_flags(row).is_some_and(|f| f.price_added) {
                if let Some(flags) = self.model.row_flags_mut(row) {
                    flags.price_added = true;
                }
                self.stats.record_price(price).await;
            }

            if price > max_price {
                continue;
            }

            let badge = annotate::badge_target(&mut self.model, cell, edits);
            annotate::apply_badge_styles(&mut self.model, badge, edits);

            if !self.model.cell_flags(cell).is_some_and(|c| c.log_added) {
                if let Some(flags) = self.model.cell_flags_mut(cell) {
                    flags.log_added = true;
                }
                let offer_text = self
                    .model
                    .row_flags(row)
                    .and_then(|f| f.offer_text.clone())
                    .unwrap_or_default();
                self.stats.add_matched_offer(price, offer_text).await;
            }

            if !self.model.cell_flags(cell).is_some_and(|c| c.sound_played) {
                if let Some(flags) = self.model.cell_flags_mut(cell) {
                    flags.sound_played = true;
                }
                info!(price, node = %badge, "price match — notifying");
                let event = NotificationEvent {
                    node: badge,
                    price,
                    timestamp_ms: now_ms(),
                };
                if let Err(e) = self.notify_tx.try_send(event) {
                    warn!("notify channel full, dropping notification: {e}");
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
