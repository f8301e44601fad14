//! Rescan request queue: both triggers (mutation stream and fallback timer)
//! funnel through here so ordering and deduplication live in one place.

use crate::dom::PageModel;
use crate::feed::messages::MutationRecord;
use crate::types::RescanScope;

/// Map one mutation record to the scope it dirties, if any.
///
/// Text and attribute changes matter only inside a row; an added element node
/// rescans its nearest row ancestor, falling back to the node itself (a
/// freshly attached tbody carries its rows with it).
pub fn scope_for(model: &PageModel, record: &MutationRecord) -> Vec<RescanScope> {
    match record {
        MutationRecord::Text { node, .. } | MutationRecord::Attributes { node, .. } => model
            .closest_row(*node)
            .map(RescanScope::Row)
            .into_iter()
            .collect(),
        MutationRecord::ChildList { added, .. } => added
            .iter()
            .filter(|spec| spec.tag.is_some())
            .map(|spec| match model.closest_row(spec.id) {
                Some(row) => RescanScope::Row(row),
                None => RescanScope::Node(spec.id),
            })
            .collect(),
    }
}

/// Pending rescan requests. A full scan subsumes every narrower scope.
#[derive(Debug, Default)]
pub struct RescanQueue {
    full: bool,
    scopes: Vec<RescanScope>,
}

impl RescanQueue {
    pub fn push(&mut self, scope: RescanScope) {
        match scope {
            RescanScope::Full => {
                self.full = true;
                self.scopes.clear();
            }
            other => {
                if !self.full && !self.scopes.contains(&other) {
                    self.scopes.push(other);
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.full && self.scopes.is_empty()
    }

    /// Take everything pending, in request order.
    pub fn drain(&mut self) -> Vec<RescanScope> {
        if self.full {
            self.full = false;
            self.scopes.clear();
            vec![RescanScope::Full]
        } else {
            std::mem::take(&mut self.scopes)
        }
    }
}
