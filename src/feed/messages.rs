use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dom::{Edit, NodeId};

static PARSE_FAILURES: AtomicU64 = AtomicU64::new(0);

/// Serialized DOM subtree sent by the bridge. Elements carry `tag` (plus
/// optional `attrs`/`children`); text nodes carry `text`.
///
/// Node ids are bridge-assigned and stable for the lifetime of the live
/// element. A node the renderer *moves* arrives as an added spec under its
/// new parent while keeping its id; `removed` is only reported for elements
/// the bridge observed being discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attrs: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// One observed mutation, in the bridge's delivery order.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MutationRecord {
    ChildList {
        target: NodeId,
        #[serde(default)]
        added: Vec<NodeSpec>,
        #[serde(default)]
        removed: Vec<NodeId>,
    },
    Text {
        node: NodeId,
        text: String,
    },
    Attributes {
        node: NodeId,
        name: String,
        #[serde(default)]
        value: Option<String>,
    },
}

/// Raw deserializable shape covering all bridge frames. Fields are optional
/// because different frame types carry different subsets.
#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    kind: Option<String>,
    root: Option<NodeSpec>,
    #[serde(default)]
    records: Vec<MutationRecord>,
}

/// Parsed event from a single bridge frame object.
#[derive(Debug)]
pub enum ParsedFrame {
    /// Full document replacement.
    Snapshot(NodeSpec),
    /// A batch of mutation records.
    Mutations(Vec<MutationRecord>),
    /// The bridge is about to switch page or reload.
    PageCycle,
}

/// Parse a raw WebSocket text frame into zero or more events.
///
/// Frames arrive as either a single JSON object or an array of objects.
/// Unrecognized frames are counted and skipped, never fatal.
pub fn parse_bridge_frame(raw: &str) -> Vec<ParsedFrame> {
    let msgs: Vec<RawFrame> = if raw.trim_start().starts_with('[') {
        serde_json::from_str(raw).unwrap_or_default()
    } else {
        match serde_json::from_str::<RawFrame>(raw) {
            Ok(m) => vec![m],
            Err(_) => vec![],
        }
    };

    if msgs.is_empty() {
        let count = PARSE_FAILURES.fetch_add(1, Ordering::Relaxed) + 1;
        if count <= 10 || count % 1000 == 0 {
            let sample = &raw[..500.min(raw.len())];
            warn!(count, "[BRIDGE PARSE] unrecognized frame: {sample}");
        }
        return vec![];
    }

    let mut frames = Vec::new();
    for msg in msgs {
        match msg.kind.as_deref() {
            Some("snapshot") => {
                if let Some(root) = msg.root {
                    frames.push(ParsedFrame::Snapshot(root));
                }
            }
            Some("mutations") => {
                if !msg.records.is_empty() {
                    frames.push(ParsedFrame::Mutations(msg.records));
                }
            }
            Some("page_cycle") => frames.push(ParsedFrame::PageCycle),
            _ => {}
        }
    }
    frames
}

/// Frames queued for delivery to the connected bridge.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeCommand {
    /// Sent once on connect; carries the page-cycler budget.
    Hello { pages_to_check: u32 },
    /// Annotation edits to replay, in order.
    Edits { edits: Vec<Edit> },
    /// Play the notification bundle (sound, title flash, icon flash, badge
    /// blink). Each effect self-expires bridge-side.
    Notify { node: NodeId, price: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_snapshot_frame() {
        let raw = r#"{"type":"snapshot","root":{"id":1,"tag":"table","children":[{"id":2,"text":"hi"}]}}"#;
        let frames = parse_bridge_frame(raw);
        assert_eq!(frames.len(), 1);
        match &frames[0] {
            ParsedFrame::Snapshot(root) => {
                assert_eq!(root.id, NodeId(1));
                assert_eq!(root.tag.as_deref(), Some("table"));
                assert_eq!(root.children.len(), 1);
                assert_eq!(root.children[0].text.as_deref(), Some("hi"));
            }
            other => panic!("expected Snapshot, got {other:?}"),
        }
    }

    #[test]
    fn parses_mutation_batch() {
        let raw = r#"{"type":"mutations","records":[
            {"kind":"text","node":7,"text":"41.50"},
            {"kind":"attributes","node":8,"name":"class","value":"active"},
            {"kind":"child_list","target":2,"added":[{"id":9,"tag":"tr"}],"removed":[3]}
        ]}"#;
        let frames = parse_bridge_frame(raw);
        assert_eq!(frames.len(), 1);
        match &frames[0] {
            ParsedFrame::Mutations(records) => {
                assert_eq!(records.len(), 3);
                assert!(matches!(&records[0], MutationRecord::Text { node, .. } if *node == NodeId(7)));
                assert!(matches!(
                    &records[1],
                    MutationRecord::Attributes { name, .. } if name == "class"
                ));
                match &records[2] {
                    MutationRecord::ChildList { target, added, removed } => {
                        assert_eq!(*target, NodeId(2));
                        assert_eq!(added.len(), 1);
                        assert_eq!(removed, &[NodeId(3)]);
                    }
                    other => panic!("expected ChildList, got {other:?}"),
                }
            }
            other => panic!("expected Mutations, got {other:?}"),
        }
    }

    #[test]
    fn parses_array_of_frames() {
        let raw = r#"[{"type":"page_cycle"},{"type":"mutations","records":[{"kind":"text","node":1,"text":"x"}]}]"#;
        let frames = parse_bridge_frame(raw);
        assert_eq!(frames.len(), 2);
        assert!(matches!(frames[0], ParsedFrame::PageCycle));
        assert!(matches!(&frames[1], ParsedFrame::Mutations(r) if r.len() == 1));
    }

    #[test]
    fn empty_mutation_batch_skipped() {
        let frames = parse_bridge_frame(r#"{"type":"mutations","records":[]}"#);
        assert!(frames.is_empty());
    }

    #[test]
    fn unknown_frame_type_returns_empty() {
        assert!(parse_bridge_frame(r#"{"type":"something_else"}"#).is_empty());
    }

    #[test]
    fn garbage_returns_empty() {
        assert!(parse_bridge_frame("not json at all").is_empty());
        assert!(parse_bridge_frame(r#"{"totally":"unrelated"}"#).is_empty());
    }

    #[test]
    fn commands_serialize_with_type_tag() {
        let cmd = BridgeCommand::Notify { node: NodeId(42), price: 41.5 };
        let json = serde_json::to_string(&cmd).expect("serializes");
        assert!(json.contains(r#""type":"notify""#), "{json}");
        assert!(json.contains(r#""node":42"#), "{json}");
    }
}
