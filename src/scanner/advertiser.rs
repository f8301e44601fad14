//! Advertiser reputation extraction and tiering.
//!
//! The advertiser cell renders merchant stats as free text ("519 orders |
//! 97.10% completion") somewhere inside a nest of layout elements. All
//! pattern matching stays behind this module; callers only see
//! [`AdvertiserStats`].

use std::sync::OnceLock;

use regex::Regex;

use crate::config::{
    ELIGIBLE_MIN_COMPLETION, ELIGIBLE_MIN_ORDERS, VIP_MIN_COMPLETION, VIP_MIN_ORDERS,
};
use crate::dom::{NodeId, PageModel};
use crate::types::AdvertiserStats;

fn orders_word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\borders\b").expect("static pattern"))
}

fn completion_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(\d{1,3}(?:\.\d+)?)%\s+completion").expect("static pattern")
    })
}

fn orders_count_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)([\d.,\s]*\d)\s+orders\b").expect("static pattern"))
}

/// The row's advertiser cell: the `td` marked as structural column 1, with a
/// plain first-`td` fallback.
pub fn advertiser_cell(model: &PageModel, row: NodeId) -> Option<NodeId> {
    let cells: Vec<NodeId> = model
        .children(row)
        .into_iter()
        .filter(|&c| model.tag(c) == Some("td"))
        .collect();
    cells
        .iter()
        .copied()
        .find(|&c| model.attr(c, "aria-colindex") == Some("1") && model.attr(c, "role") == Some("cell"))
        .or_else(|| cells.first().copied())
}

/// The smallest element inside the advertiser cell whose text carries both an
/// "orders" token and a "%" token. When no single element has both, falls
/// back to the lowest common ancestor of the element containing "orders" and
/// the element containing "%".
pub fn stats_element(model: &PageModel, adv_cell: NodeId) -> Option<NodeId> {
    let nodes = model.descendant_elements(adv_cell);

    let mut combined: Vec<(usize, NodeId)> = nodes
        .iter()
        .filter_map(|&n| {
            let text = model.text(n);
            let trimmed = text.trim();
            (orders_word_re().is_match(trimmed) && trimmed.contains('%'))
                .then(|| (trimmed.len(), n))
        })
        .collect();
    if !combined.is_empty() {
        combined.sort_by_key(|(len, _)| *len);
        return Some(combined[0].1);
    }

    let orders_node = nodes
        .iter()
        .copied()
        .find(|&n| orders_word_re().is_match(model.text(n).trim()))?;
    let percent_node = nodes
        .iter()
        .copied()
        .find(|&n| model.text(n).trim().contains('%'))?;
    let mut ancestor = Some(orders_node);
    while let Some(a) = ancestor {
        if model.subtree_contains(a, percent_node) {
            return Some(a);
        }
        ancestor = model.parent(a);
    }
    None
}

/// Extract reputation numbers for a row. Missing structure degrades to None
/// fields, never an error.
pub fn advertiser_stats(model: &PageModel, row: NodeId) -> AdvertiserStats {
    let Some(adv_cell) = advertiser_cell(model, row) else {
        return AdvertiserStats::default();
    };
    let text = match stats_element(model, adv_cell) {
        Some(stats_el) => model.text(stats_el),
        None => model.text(adv_cell),
    };

    let completion = completion_re()
        .captures(&text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok());

    // Order counts may carry grouping separators; strip everything but
    // digits before parsing.
    let orders = orders_count_re()
        .captures(&text)
        .and_then(|c| c.get(1))
        .and_then(|m| {
            let digits: String = m.as_str().chars().filter(char::is_ascii_digit).collect();
            digits.parse::<i64>().ok()
        });

    AdvertiserStats { completion, orders }
}

pub fn advertiser_eligible(stats: &AdvertiserStats) -> bool {
    let (Some(completion), Some(orders)) = (stats.completion, stats.orders) else {
        return false;
    };
    completion >= ELIGIBLE_MIN_COMPLETION && orders >= ELIGIBLE_MIN_ORDERS
}

pub fn advertiser_vip(stats: &AdvertiserStats) -> bool {
    let (Some(completion), Some(orders)) = (stats.completion, stats.orders) else {
        return false;
    };
    completion >= VIP_MIN_COMPLETION && orders >= VIP_MIN_ORDERS
}
