use serde::Serialize;

use crate::dom::NodeId;

/// One structural or visual change, applied to the mirror and replayed by the
/// bridge against the live page.
///
/// Wrapper and badge ids are engine-assigned; the bridge records them when it
/// applies `WrapChildren`/`WrapText` and resolves later edits against them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Edit {
    SetStyle {
        node: NodeId,
        prop: String,
        value: String,
    },
    ClearStyle {
        node: NodeId,
        prop: String,
    },
    /// Move all current children of `parent` into a new element, then append
    /// that element to `parent`.
    WrapChildren {
        parent: NodeId,
        wrapper: NodeId,
        tag: String,
        class: String,
    },
    /// Move the wrapper's children back into its parent, then drop the
    /// wrapper. Children are appended at the end, never lost.
    Unwrap {
        wrapper: NodeId,
    },
    /// Wrap the element's sole text child in a new span.
    WrapText {
        parent: NodeId,
        wrapper: NodeId,
        class: String,
    },
    /// Bold every bare occurrence of `needle` in text nodes directly under
    /// `node`. Text already inside a bold element is left alone.
    BoldText {
        node: NodeId,
        needle: String,
    },
}

impl Edit {
    pub fn set_style(node: NodeId, prop: &str, value: &str) -> Self {
        Edit::SetStyle {
            node,
            prop: prop.to_string(),
            value: value.to_string(),
        }
    }

    pub fn clear_style(node: NodeId, prop: &str) -> Self {
        Edit::ClearStyle {
            node,
            prop: prop.to_string(),
        }
    }
}
