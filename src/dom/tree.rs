//! In-memory mirror of the offer table.
//!
//! The bridge streams the page as [`NodeSpec`] subtrees and mutation records;
//! the mirror holds them as a flat arena keyed by bridge-assigned ids. Ids
//! are stable for the lifetime of the live DOM node, which under the
//! marketplace's virtualized list can span many different logical rows —
//! annotation flags therefore ride on the node, exactly like `dataset`
//! attributes ride on a live element.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::dom::edit::Edit;
use crate::feed::messages::{MutationRecord, NodeSpec};

/// Bridge-assigned node identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ids minted for wrapper/badge elements the engine creates itself, kept far
/// above anything a bridge counter will reach.
const SYNTHETIC_ID_BASE: u64 = 1 << 48;

/// Per-row annotation flags.
#[derive(Debug, Clone, Default)]
pub struct RowFlags {
    pub matched: bool,
    pub vip_applied: bool,
    /// This row's price has been folded into the rolling sample.
    pub price_added: bool,
    /// Whitespace-normalized text of the amount cell that matched.
    pub offer_text: Option<String>,
    /// Hash of the row's raw text when it was last scanned. A mismatch means
    /// the renderer recycled the element for different data.
    pub fingerprint: Option<u64>,
}

/// Per-cell annotation flags.
#[derive(Debug, Clone, Default)]
pub struct CellFlags {
    /// Amount text already parsed; set unconditionally on first visit.
    pub checked: bool,
    pub green_applied: bool,
    /// One-shot gates for the price cell. Never reset for a reused element:
    /// a recycled cell does not re-alert or duplicate its log entry.
    pub log_added: bool,
    pub sound_played: bool,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Element {
        tag: String,
        attrs: HashMap<String, String>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub row: RowFlags,
    pub cell: CellFlags,
    /// Inline styles applied through edits; mirrors what the bridge rendered.
    pub styles: HashMap<String, String>,
}

impl Node {
    fn element(tag: &str, attrs: HashMap<String, String>, parent: Option<NodeId>) -> Self {
        Self {
            kind: NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
                attrs,
            },
            parent,
            children: Vec::new(),
            row: RowFlags::default(),
            cell: CellFlags::default(),
            styles: HashMap::new(),
        }
    }

    fn text(content: &str, parent: Option<NodeId>) -> Self {
        Self {
            kind: NodeKind::Text(content.to_string()),
            parent,
            children: Vec::new(),
            row: RowFlags::default(),
            cell: CellFlags::default(),
            styles: HashMap::new(),
        }
    }
}

pub struct PageModel {
    nodes: HashMap<NodeId, Node>,
    root: Option<NodeId>,
    next_synthetic: u64,
}

impl Default for PageModel {
    fn default() -> Self {
        Self::new()
    }
}

impl PageModel {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            root: None,
            next_synthetic: SYNTHETIC_ID_BASE,
        }
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn alloc_synthetic(&mut self) -> NodeId {
        let id = NodeId(self.next_synthetic);
        self.next_synthetic += 1;
        id
    }

    // -----------------------------------------------------------------------
    // Snapshot / mutation application
    // -----------------------------------------------------------------------

    /// Replace the whole document. Flags and applied styles ride on the live
    /// element, so ids that survive a resync keep them.
    pub fn load_snapshot(&mut self, spec: &NodeSpec) {
        let mut saved: HashMap<NodeId, (RowFlags, CellFlags, HashMap<String, String>)> =
            HashMap::new();
        for (id, n) in self.nodes.drain() {
            saved.insert(id, (n.row, n.cell, n.styles));
        }
        let root = self.insert_spec(spec, None);
        self.root = Some(root);
        for (id, (row, cell, styles)) in saved {
            if let Some(n) = self.nodes.get_mut(&id) {
                n.row = row;
                n.cell = cell;
                n.styles = styles;
            }
        }
    }

    pub fn apply_mutation(&mut self, record: &MutationRecord) {
        match record {
            MutationRecord::ChildList {
                target,
                added,
                removed,
            } => {
                for id in removed {
                    self.remove_subtree(*id);
                }
                if !self.nodes.contains_key(target) {
                    return;
                }
                for spec in added {
                    let child = self.insert_spec(spec, Some(*target));
                    if let Some(t) = self.nodes.get_mut(target) {
                        t.children.push(child);
                    }
                }
            }
            MutationRecord::Text { node, text } => {
                if let Some(n) = self.nodes.get_mut(node) {
                    if let NodeKind::Text(content) = &mut n.kind {
                        *content = text.clone();
                    }
                }
            }
            MutationRecord::Attributes { node, name, value } => {
                if let Some(n) = self.nodes.get_mut(node) {
                    if let NodeKind::Element { attrs, .. } = &mut n.kind {
                        match value {
                            Some(v) => {
                                attrs.insert(name.clone(), v.clone());
                            }
                            None => {
                                attrs.remove(name);
                            }
                        }
                    }
                }
            }
        }
    }

    /// Insert a spec subtree. An element moved by the renderer arrives as an
    /// added node while its id is still attached elsewhere; it is detached
    /// first and keeps its flags and styles.
    fn insert_spec(&mut self, spec: &NodeSpec, parent: Option<NodeId>) -> NodeId {
        let prior = self.detach(spec.id);
        let mut node = match (&spec.tag, &spec.text) {
            (Some(tag), _) => Node::element(tag, spec.attrs.clone(), parent),
            (None, Some(text)) => Node::text(text, parent),
            (None, None) => Node::text("", parent),
        };
        if let Some((row, cell, styles)) = prior {
            node.row = row;
            node.cell = cell;
            node.styles = styles;
        }
        self.nodes.insert(spec.id, node);
        let child_ids: Vec<NodeId> = spec
            .children
            .iter()
            .map(|c| self.insert_spec(c, Some(spec.id)))
            .collect();
        if let Some(n) = self.nodes.get_mut(&spec.id) {
            n.children = child_ids;
        }
        spec.id
    }

    /// Unlink a node from its parent and drop it, returning its sticky state.
    /// Children are left in the arena; a moved subtree re-specifies them.
    fn detach(&mut self, id: NodeId) -> Option<(RowFlags, CellFlags, HashMap<String, String>)> {
        let node = self.nodes.remove(&id)?;
        if let Some(p) = node.parent {
            if let Some(pn) = self.nodes.get_mut(&p) {
                pn.children.retain(|c| *c != id);
            }
        }
        Some((node.row, node.cell, node.styles))
    }

    /// Drop a node and its whole subtree. Flags die with it.
    pub fn remove_subtree(&mut self, id: NodeId) {
        if let Some(n) = self.nodes.get(&id) {
            if let Some(p) = n.parent {
                if let Some(pn) = self.nodes.get_mut(&p) {
                    pn.children.retain(|c| *c != id);
                }
            }
        }
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            if let Some(n) = self.nodes.remove(&cur) {
                stack.extend(n.children);
            }
        }
        if self.root == Some(id) {
            self.root = None;
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.nodes.get(&id)?.kind {
            NodeKind::Element { ref tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.nodes.get(&id)?.kind {
            NodeKind::Element { ref attrs, .. } => attrs.get(name).map(String::as_str),
            NodeKind::Text(_) => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id)?.parent
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes.get(&id).map(|n| n.children.clone()).unwrap_or_default()
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(&id).map(|n| &n.kind), Some(NodeKind::Text(_)))
    }

    /// Nearest row ancestor, the node itself included.
    pub fn closest_row(&self, id: NodeId) -> Option<NodeId> {
        let mut cur = Some(id);
        while let Some(c) = cur {
            if self.tag(c) == Some("tr") {
                return Some(c);
            }
            cur = self.nodes.get(&c)?.parent;
        }
        None
    }

    /// True when `node` sits inside `ancestor`'s subtree (or is `ancestor`).
    pub fn subtree_contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(c) = cur {
            if c == ancestor {
                return true;
            }
            cur = self.nodes.get(&c).and_then(|n| n.parent);
        }
        false
    }

    /// Element descendants of `id` in document order, excluding `id`.
    pub fn descendant_elements(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk_elements(id, false, &mut out);
        out
    }

    /// `id` (when it is an element) plus its element descendants.
    pub fn scope_elements(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk_elements(id, true, &mut out);
        out
    }

    fn walk_elements(&self, id: NodeId, include_self: bool, out: &mut Vec<NodeId>) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if include_self && matches!(node.kind, NodeKind::Element { .. }) {
            out.push(id);
        }
        for child in &node.children {
            self.walk_elements(*child, true, out);
        }
    }

    /// Every row element in the document.
    pub fn all_rows(&self) -> Vec<NodeId> {
        let Some(root) = self.root else {
            return Vec::new();
        };
        self.scope_elements(root)
            .into_iter()
            .filter(|&e| self.tag(e) == Some("tr"))
            .collect()
    }

    /// Concatenated text content of the subtree, document order.
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(content) => out.push_str(content),
            NodeKind::Element { .. } => {
                for child in &node.children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|c| c.split_whitespace().any(|t| t == class))
    }

    /// Elements under `root` (inclusive) carrying `class`, document order.
    pub fn find_by_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.scope_elements(root)
            .into_iter()
            .filter(|&e| self.has_class(e, class))
            .collect()
    }

    pub fn style(&self, id: NodeId, prop: &str) -> Option<&str> {
        self.nodes.get(&id)?.styles.get(prop).map(String::as_str)
    }

    /// Content hash over the row's raw text.
    pub fn fingerprint(&self, id: NodeId) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.text(id).hash(&mut hasher);
        hasher.finish()
    }

    // -----------------------------------------------------------------------
    // Annotation flags
    // -----------------------------------------------------------------------

    pub fn row_flags(&self, id: NodeId) -> Option<&RowFlags> {
        self.nodes.get(&id).map(|n| &n.row)
    }

    pub fn row_flags_mut(&mut self, id: NodeId) -> Option<&mut RowFlags> {
        self.nodes.get_mut(&id).map(|n| &mut n.row)
    }

    pub fn cell_flags(&self, id: NodeId) -> Option<&CellFlags> {
        self.nodes.get(&id).map(|n| &n.cell)
    }

    pub fn cell_flags_mut(&mut self, id: NodeId) -> Option<&mut CellFlags> {
        self.nodes.get_mut(&id).map(|n| &mut n.cell)
    }

    // -----------------------------------------------------------------------
    // Edit application
    // -----------------------------------------------------------------------

    /// Apply one edit to the mirror so it stays consistent with what the
    /// bridge will render.
    pub fn apply(&mut self, edit: &Edit) {
        match edit {
            Edit::SetStyle { node, prop, value } => {
                if let Some(n) = self.nodes.get_mut(node) {
                    n.styles.insert(prop.clone(), value.clone());
                }
            }
            Edit::ClearStyle { node, prop } => {
                if let Some(n) = self.nodes.get_mut(node) {
                    n.styles.remove(prop);
                }
            }
            Edit::WrapChildren {
                parent,
                wrapper,
                tag,
                class,
            } => self.apply_wrap_children(*parent, *wrapper, tag, class),
            Edit::Unwrap { wrapper } => self.apply_unwrap(*wrapper),
            Edit::WrapText {
                parent,
                wrapper,
                class,
            } => self.apply_wrap_text(*parent, *wrapper, class),
            Edit::BoldText { node, needle } => self.apply_bold(*node, needle),
        }
    }

    fn apply_wrap_children(&mut self, parent: NodeId, wrapper: NodeId, tag: &str, class: &str) {
        let Some(p) = self.nodes.get_mut(&parent) else {
            return;
        };
        let moved = std::mem::take(&mut p.children);
        p.children.push(wrapper);
        let mut attrs = HashMap::new();
        attrs.insert("class".to_string(), class.to_string());
        let mut node = Node::element(tag, attrs, Some(parent));
        node.children = moved.clone();
        self.nodes.insert(wrapper, node);
        for c in moved {
            if let Some(cn) = self.nodes.get_mut(&c) {
                cn.parent = Some(wrapper);
            }
        }
    }

    fn apply_unwrap(&mut self, wrapper: NodeId) {
        let Some(w) = self.nodes.get(&wrapper) else {
            return;
        };
        let Some(parent) = w.parent else {
            return;
        };
        let kids = w.children.clone();
        self.nodes.remove(&wrapper);
        if let Some(pn) = self.nodes.get_mut(&parent) {
            pn.children.retain(|c| *c != wrapper);
            pn.children.extend(kids.iter().copied());
        }
        for c in kids {
            if let Some(cn) = self.nodes.get_mut(&c) {
                cn.parent = Some(parent);
            }
        }
    }

    fn apply_wrap_text(&mut self, parent: NodeId, wrapper: NodeId, class: &str) {
        let Some(p) = self.nodes.get(&parent) else {
            return;
        };
        if p.children.len() != 1 {
            return;
        }
        let child = p.children[0];
        if !self.is_text(child) {
            return;
        }
        let mut attrs = HashMap::new();
        attrs.insert("class".to_string(), class.to_string());
        let mut span = Node::element("span", attrs, Some(parent));
        span.children = vec![child];
        self.nodes.insert(wrapper, span);
        if let Some(pn) = self.nodes.get_mut(&parent) {
            pn.children = vec![wrapper];
        }
        if let Some(cn) = self.nodes.get_mut(&child) {
            cn.parent = Some(wrapper);
        }
    }

    fn apply_bold(&mut self, node: NodeId, needle: &str) {
        if needle.is_empty() || self.tag(node) == Some("b") {
            return;
        }
        let children = self.children(node);
        let mut new_children: Vec<NodeId> = Vec::new();
        let mut changed = false;
        for child in children {
            let content = match self.nodes.get(&child).map(|n| &n.kind) {
                Some(NodeKind::Text(t)) if t.contains(needle) => t.clone(),
                _ => {
                    new_children.push(child);
                    continue;
                }
            };
            changed = true;
            self.nodes.remove(&child);
            let mut rest = content.as_str();
            while let Some(pos) = rest.find(needle) {
                if pos > 0 {
                    let tid = self.alloc_synthetic();
                    self.nodes.insert(tid, Node::text(&rest[..pos], Some(node)));
                    new_children.push(tid);
                }
                let bold = self.alloc_synthetic();
                let bold_text = self.alloc_synthetic();
                self.nodes
                    .insert(bold_text, Node::text(needle, Some(bold)));
                let mut b = Node::element("b", HashMap::new(), Some(node));
                b.children = vec![bold_text];
                b.styles.insert("font-weight".to_string(), "700".to_string());
                b.styles.insert("color".to_string(), "#fff".to_string());
                self.nodes.insert(bold, b);
                new_children.push(bold);
                rest = &rest[pos + needle.len()..];
            }
            if !rest.is_empty() {
                let tid = self.alloc_synthetic();
                self.nodes.insert(tid, Node::text(rest, Some(node)));
                new_children.push(tid);
            }
        }
        if changed {
            if let Some(n) = self.nodes.get_mut(&node) {
                n.children = new_children;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::testutil::{doc, el, txt};

    #[test]
    fn snapshot_builds_tree_and_text() {
        let mut model = PageModel::new();
        model.load_snapshot(&doc(vec![el(
            10,
            "tr",
            &[],
            vec![el(11, "td", &[("role", "cell")], vec![txt(12, "41.50")])],
        )]));

        assert_eq!(model.tag(NodeId(10)), Some("tr"));
        assert_eq!(model.attr(NodeId(11), "role"), Some("cell"));
        assert_eq!(model.text(NodeId(10)), "41.50");
        assert_eq!(model.closest_row(NodeId(12)), Some(NodeId(10)));
    }

    #[test]
    fn text_mutation_updates_content() {
        let mut model = PageModel::new();
        model.load_snapshot(&doc(vec![el(10, "tr", &[], vec![txt(11, "old")])]));
        model.apply_mutation(&MutationRecord::Text {
            node: NodeId(11),
            text: "new".to_string(),
        });
        assert_eq!(model.text(NodeId(10)), "new");
    }

    #[test]
    fn child_list_mutation_adds_and_removes() {
        let mut model = PageModel::new();
        model.load_snapshot(&doc(vec![el(10, "tr", &[], vec![])]));
        model.apply_mutation(&MutationRecord::ChildList {
            target: NodeId(10),
            added: vec![el(11, "td", &[], vec![txt(12, "x")])],
            removed: vec![],
        });
        assert_eq!(model.text(NodeId(10)), "x");

        model.apply_mutation(&MutationRecord::ChildList {
            target: NodeId(10),
            added: vec![],
            removed: vec![NodeId(11)],
        });
        assert!(!model.contains_node(NodeId(11)));
        assert!(!model.contains_node(NodeId(12)));
        assert_eq!(model.text(NodeId(10)), "");
    }

    #[test]
    fn attribute_mutation_sets_and_clears() {
        let mut model = PageModel::new();
        model.load_snapshot(&doc(vec![el(10, "td", &[], vec![])]));
        model.apply_mutation(&MutationRecord::Attributes {
            node: NodeId(10),
            name: "aria-colindex".to_string(),
            value: Some("2".to_string()),
        });
        assert_eq!(model.attr(NodeId(10), "aria-colindex"), Some("2"));
        model.apply_mutation(&MutationRecord::Attributes {
            node: NodeId(10),
            name: "aria-colindex".to_string(),
            value: None,
        });
        assert_eq!(model.attr(NodeId(10), "aria-colindex"), None);
    }

    #[test]
    fn resync_snapshot_keeps_flags_for_surviving_ids() {
        let mut model = PageModel::new();
        model.load_snapshot(&doc(vec![el(10, "tr", &[], vec![txt(11, "a")])]));
        model.cell_flags_mut(NodeId(10)).unwrap().sound_played = true;

        model.load_snapshot(&doc(vec![el(10, "tr", &[], vec![txt(11, "b")])]));
        assert!(model.cell_flags(NodeId(10)).unwrap().sound_played);
    }

    #[test]
    fn moved_element_keeps_flags() {
        let mut model = PageModel::new();
        model.load_snapshot(&doc(vec![
            el(10, "tr", &[], vec![el(11, "td", &[], vec![])]),
            el(20, "tr", &[], vec![]),
        ]));
        model.cell_flags_mut(NodeId(11)).unwrap().checked = true;

        // The renderer moves td#11 into the second row.
        model.apply_mutation(&MutationRecord::ChildList {
            target: NodeId(20),
            added: vec![el(11, "td", &[], vec![])],
            removed: vec![],
        });
        assert_eq!(model.parent(NodeId(11)), Some(NodeId(20)));
        assert!(model.cell_flags(NodeId(11)).unwrap().checked);
        assert!(model.children(NodeId(10)).is_empty());
    }

    #[test]
    fn wrap_children_then_unwrap_preserves_children() {
        let mut model = PageModel::new();
        model.load_snapshot(&doc(vec![el(
            10,
            "div",
            &[],
            vec![txt(11, "519 orders "), el(12, "span", &[], vec![txt(13, "97.10%")])],
        )]));

        let wrapper = model.alloc_synthetic();
        model.apply(&Edit::WrapChildren {
            parent: NodeId(10),
            wrapper,
            tag: "span".to_string(),
            class: "p2p-stats-outline".to_string(),
        });
        assert_eq!(model.children(NodeId(10)), vec![wrapper]);
        assert_eq!(model.children(wrapper), vec![NodeId(11), NodeId(12)]);
        assert_eq!(model.text(NodeId(10)), "519 orders 97.10%");

        model.apply(&Edit::Unwrap { wrapper });
        assert!(!model.contains_node(wrapper));
        assert_eq!(model.children(NodeId(10)), vec![NodeId(11), NodeId(12)]);
        assert_eq!(model.text(NodeId(10)), "519 orders 97.10%");
    }

    #[test]
    fn wrap_text_requires_single_text_child() {
        let mut model = PageModel::new();
        model.load_snapshot(&doc(vec![
            el(10, "td", &[], vec![txt(11, "41.50")]),
            el(20, "td", &[], vec![txt(21, "a"), txt(22, "b")]),
        ]));

        let badge = model.alloc_synthetic();
        model.apply(&Edit::WrapText {
            parent: NodeId(10),
            wrapper: badge,
            class: "p2p-price-highlight".to_string(),
        });
        assert_eq!(model.children(NodeId(10)), vec![badge]);
        assert_eq!(model.text(badge), "41.50");

        let badge2 = model.alloc_synthetic();
        model.apply(&Edit::WrapText {
            parent: NodeId(20),
            wrapper: badge2,
            class: "p2p-price-highlight".to_string(),
        });
        // Two children — wrap refused, tree untouched.
        assert!(!model.contains_node(badge2));
        assert_eq!(model.children(NodeId(20)), vec![NodeId(21), NodeId(22)]);
    }

    #[test]
    fn bold_splits_text_and_is_idempotent() {
        let mut model = PageModel::new();
        model.load_snapshot(&doc(vec![el(
            10,
            "span",
            &[],
            vec![txt(11, "772 orders | 100.00% completion rate")],
        )]));

        let edit = Edit::BoldText {
            node: NodeId(10),
            needle: "100.00% completion".to_string(),
        };
        model.apply(&edit);
        let kids = model.children(NodeId(10));
        assert_eq!(kids.len(), 3);
        assert_eq!(model.tag(kids[1]), Some("b"));
        assert_eq!(model.text(kids[1]), "100.00% completion");
        assert_eq!(model.text(NodeId(10)), "772 orders | 100.00% completion rate");

        // A second pass finds the needle only inside the bold element and
        // leaves the tree alone.
        model.apply(&edit);
        assert_eq!(model.children(NodeId(10)), kids);
    }

    #[test]
    fn fingerprint_tracks_text_changes() {
        let mut model = PageModel::new();
        model.load_snapshot(&doc(vec![el(10, "tr", &[], vec![txt(11, "a")])]));
        let before = model.fingerprint(NodeId(10));
        model.apply_mutation(&MutationRecord::Text {
            node: NodeId(11),
            text: "b".to_string(),
        });
        assert_ne!(before, model.fingerprint(NodeId(10)));
    }
}
