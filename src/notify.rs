//! Notification fan-out.
//!
//! Consumes match events from the scan engine and forwards one `notify`
//! command per event to the bridge, which plays the bundle (sound, tab-title
//! flash, favicon flash, badge blink); every effect self-expires there.
//! One-shot gating happens upstream in the engine, so whatever arrives here
//! is meant to fire.

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::feed::messages::BridgeCommand;
use crate::types::NotificationEvent;

pub async fn run_notifier(
    mut notify_rx: mpsc::Receiver<NotificationEvent>,
    command_tx: mpsc::Sender<BridgeCommand>,
) {
    while let Some(event) = notify_rx.recv().await {
        info!(
            price = event.price,
            node = %event.node,
            timestamp_ms = event.timestamp_ms,
            "MATCH | price {:.2} | node {}",
            event.price,
            event.node,
        );
        let cmd = BridgeCommand::Notify {
            node: event.node,
            price: event.price,
        };
        if let Err(e) = command_tx.try_send(cmd) {
            warn!("command channel full, dropping notification: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeId;
    use crate::types::now_ms;

    #[tokio::test]
    async fn forwards_each_event_as_notify_command() {
        let (notify_tx, notify_rx) = mpsc::channel(8);
        let (command_tx, mut command_rx) = mpsc::channel(8);
        let task = tokio::spawn(run_notifier(notify_rx, command_tx));

        notify_tx
            .send(NotificationEvent {
                node: NodeId(7),
                price: 41.5,
                timestamp_ms: now_ms(),
            })
            .await
            .expect("send");
        drop(notify_tx);
        task.await.expect("notifier exits when input closes");

        match command_rx.try_recv().expect("command") {
            BridgeCommand::Notify { node, price } => {
                assert_eq!(node, NodeId(7));
                assert!((price - 41.5).abs() < 1e-9);
            }
            other => panic!("expected Notify, got {other:?}"),
        }
        assert!(command_rx.try_recv().is_err());
    }
}
