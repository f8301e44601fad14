//! Shared builders for table-shaped fixtures.

use std::collections::HashMap;

use crate::dom::NodeId;
use crate::feed::messages::NodeSpec;

pub fn el(id: u64, tag: &str, attrs: &[(&str, &str)], children: Vec<NodeSpec>) -> NodeSpec {
    NodeSpec {
        id: NodeId(id),
        tag: Some(tag.to_string()),
        attrs: attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        children,
        text: None,
    }
}

pub fn txt(id: u64, content: &str) -> NodeSpec {
    NodeSpec {
        id: NodeId(id),
        tag: None,
        attrs: HashMap::new(),
        children: Vec::new(),
        text: Some(content.to_string()),
    }
}

/// A minimal document: table > tbody > rows.
pub fn doc(rows: Vec<NodeSpec>) -> NodeSpec {
    el(
        1,
        "table",
        &[],
        vec![el(2, "tbody", &[("class", "bn-web-table-tbody")], rows)],
    )
}

/// One offer row shaped like the marketplace table: advertiser cell
/// (colindex 1), price cell (colindex 2), amount cell (colindex 3).
/// Node ids occupy `base..base+9`.
pub fn offer_row(base: u64, reputation: &str, price: &str, amount: &str) -> NodeSpec {
    el(
        base,
        "tr",
        &[],
        vec![
            el(
                base + 1,
                "td",
                &[("aria-colindex", "1"), ("role", "cell")],
                vec![el(base + 2, "div", &[], vec![txt(base + 3, reputation)])],
            ),
            el(
                base + 4,
                "td",
                &[("aria-colindex", "2"), ("role", "cell")],
                vec![txt(base + 5, price)],
            ),
            el(
                base + 6,
                "td",
                &[("aria-colindex", "3"), ("role", "cell")],
                vec![el(base + 7, "div", &[], vec![txt(base + 8, amount)])],
            ),
        ],
    )
}
