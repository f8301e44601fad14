//! Idempotent row/cell decoration.
//!
//! Every function here works the same way: decide the desired decoration
//! state from current content, emit the [`Edit`]s that move the mirror there,
//! and apply them to the mirror immediately so a repeat pass over unchanged
//! content is a no-op. The VIP outline is an explicit two-state machine per
//! row — wrap on enter, unwrap-preserving-children on leave.

use crate::dom::{Edit, NodeId, PageModel};
use crate::scanner::advertiser::{advertiser_cell, advertiser_vip, stats_element};
use crate::types::AdvertiserStats;

pub const OUTLINE_CLASS: &str = "p2p-stats-outline";
pub const BADGE_CLASS: &str = "p2p-price-highlight";

/// Exact substring bolded inside a VIP outline.
pub const BOLD_NEEDLE: &str = "100.00% completion";

const GREEN_BRIGHT: &str = "rgba(46, 189, 133, 0.25)";
const GREEN_FAINT: &str = "rgba(46, 189, 133, 0.08)";
const GREEN_RING: &str = "0 0 0 1px rgba(46, 189, 133, 0.8)";
const ORANGE_FILL: &str = "rgba(255, 159, 67, 0.25)";
const ORANGE_RING: &str = "0 0 0 1px rgba(255, 159, 67, 0.8)";
const GOLD_BORDER: &str = "2px solid rgba(255, 215, 0, 0.9)";

/// Apply an edit to the mirror and queue it for the bridge — unless the
/// mirror already shows it, in which case repeat passes stay silent.
fn push(model: &mut PageModel, edits: &mut Vec<Edit>, edit: Edit) {
    match &edit {
        Edit::SetStyle { node, prop, value } if model.style(*node, prop) == Some(value) => return,
        Edit::ClearStyle { node, prop } if model.style(*node, prop).is_none() => return,
        _ => {}
    }
    model.apply(&edit);
    edits.push(edit);
}

/// Green highlight on a matching amount cell. Intensity steps up for offers
/// whose ceiling clears the bright threshold.
pub fn apply_green(model: &mut PageModel, cell: NodeId, bright: bool, edits: &mut Vec<Edit>) {
    let fill = if bright { GREEN_BRIGHT } else { GREEN_FAINT };
    push(model, edits, Edit::set_style(cell, "background-color", fill));
    push(model, edits, Edit::set_style(cell, "border-radius", "6px"));
    push(model, edits, Edit::set_style(cell, "box-shadow", GREEN_RING));
    if let Some(flags) = model.cell_flags_mut(cell) {
        flags.green_applied = true;
    }
}

/// Full reversal of [`apply_green`], used when a recycled element no longer
/// holds the content that earned the highlight.
pub fn clear_green(model: &mut PageModel, cell: NodeId, edits: &mut Vec<Edit>) {
    push(model, edits, Edit::clear_style(cell, "background-color"));
    push(model, edits, Edit::clear_style(cell, "border-radius"));
    push(model, edits, Edit::clear_style(cell, "box-shadow"));
    if let Some(flags) = model.cell_flags_mut(cell) {
        flags.green_applied = false;
    }
}

/// Resolve the badge element for a price cell, wrapping at most once: an
/// existing badge is reused; a sole bare text node gets wrapped; anything
/// else makes the cell itself the badge target.
pub fn badge_target(model: &mut PageModel, cell: NodeId, edits: &mut Vec<Edit>) -> NodeId {
    if let Some(existing) = model.find_by_class(cell, BADGE_CLASS).into_iter().next() {
        return existing;
    }
    let children = model.children(cell);
    if children.len() == 1 && model.is_text(children[0]) {
        let wrapper = model.alloc_synthetic();
        push(
            model,
            edits,
            Edit::WrapText {
                parent: cell,
                wrapper,
                class: BADGE_CLASS.to_string(),
            },
        );
        return wrapper;
    }
    cell
}

/// Orange price badge styling.
pub fn apply_badge_styles(model: &mut PageModel, badge: NodeId, edits: &mut Vec<Edit>) {
    push(model, edits, Edit::set_style(badge, "background-color", ORANGE_FILL));
    push(model, edits, Edit::set_style(badge, "border-radius", "4px"));
    push(model, edits, Edit::set_style(badge, "box-shadow", ORANGE_RING));
    push(model, edits, Edit::set_style(badge, "padding", "0 4px"));
    push(model, edits, Edit::set_style(badge, "display", "inline-block"));
}

/// Reconcile the gold VIP outline for a row.
///
/// Desired state is `is_row_green && advertiser_vip(stats)`. Entering wraps
/// the stats element's children in a styled outline span and bolds the
/// perfect-completion substring; leaving unwraps the children back into
/// place. When the stats element itself has vanished (DOM reshuffle) every
/// stray outline under the advertiser cell is unwrapped.
pub fn update_vip_outline(
    model: &mut PageModel,
    row: NodeId,
    stats: &AdvertiserStats,
    is_row_green: bool,
    edits: &mut Vec<Edit>,
) {
    let Some(adv_cell) = advertiser_cell(model, row) else {
        return;
    };
    let need_vip = is_row_green && advertiser_vip(stats);

    let Some(stats_el) = stats_element(model, adv_cell) else {
        for wrapper in model.find_by_class(adv_cell, OUTLINE_CLASS) {
            push(model, edits, Edit::Unwrap { wrapper });
        }
        if let Some(flags) = model.row_flags_mut(row) {
            flags.vip_applied = false;
        }
        return;
    };

    let existing = model.find_by_class(stats_el, OUTLINE_CLASS).into_iter().next();

    match (need_vip, existing) {
        (true, Some(_)) => {
            if let Some(flags) = model.row_flags_mut(row) {
                flags.vip_applied = true;
            }
        }
        (true, None) => {
            let wrapper = model.alloc_synthetic();
            push(
                model,
                edits,
                Edit::WrapChildren {
                    parent: stats_el,
                    wrapper,
                    tag: "span".to_string(),
                    class: OUTLINE_CLASS.to_string(),
                },
            );
            // The stats element stops boxing so the outline hugs only the
            // "orders | completion" text.
            push(model, edits, Edit::set_style(stats_el, "display", "contents"));
            push(model, edits, Edit::set_style(wrapper, "display", "inline-flex"));
            push(model, edits, Edit::set_style(wrapper, "width", "max-content"));
            push(model, edits, Edit::set_style(wrapper, "max-width", "max-content"));
            push(model, edits, Edit::set_style(wrapper, "align-items", "center"));
            push(model, edits, Edit::set_style(wrapper, "border", GOLD_BORDER));
            push(model, edits, Edit::set_style(wrapper, "border-radius", "8px"));
            push(model, edits, Edit::set_style(wrapper, "padding", "2px 8px"));
            push(model, edits, Edit::set_style(wrapper, "background", "transparent"));
            push(model, edits, Edit::set_style(wrapper, "box-sizing", "border-box"));

            for node in model.scope_elements(wrapper) {
                if model.text(node).contains(BOLD_NEEDLE) {
                    push(
                        model,
                        edits,
                        Edit::BoldText {
                            node,
                            needle: BOLD_NEEDLE.to_string(),
                        },
                    );
                }
            }
            if let Some(flags) = model.row_flags_mut(row) {
                flags.vip_applied = true;
            }
        }
        (false, Some(wrapper)) => {
            push(model, edits, Edit::Unwrap { wrapper });
            if let Some(flags) = model.row_flags_mut(row) {
                flags.vip_applied = false;
            }
        }
        (false, None) => {
            if let Some(flags) = model.row_flags_mut(row) {
                flags.vip_applied = false;
            }
        }
    }
}
