//! WebSocket bridge server.
//!
//! The browser-side bridge connects here, streams snapshot/mutation frames
//! in, and replays edit/notify commands going out. One bridge at a time;
//! a dropped connection just waits for the next accept.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::api::health::HealthState;
use crate::error::Result;
use crate::feed::messages::{parse_bridge_frame, BridgeCommand, ParsedFrame};
use crate::types::FeedEvent;

pub struct BridgeServer {
    addr: String,
    pages_to_check: u32,
    feed_tx: mpsc::Sender<FeedEvent>,
    command_rx: mpsc::Receiver<BridgeCommand>,
    health: Arc<HealthState>,
    /// Total frames received since process start (for flow diagnostics).
    frames_received: u64,
}

impl BridgeServer {
    pub fn new(
        addr: String,
        pages_to_check: u32,
        feed_tx: mpsc::Sender<FeedEvent>,
        command_rx: mpsc::Receiver<BridgeCommand>,
        health: Arc<HealthState>,
    ) -> Self {
        Self {
            addr,
            pages_to_check,
            feed_tx,
            command_rx,
            health,
            frames_received: 0,
        }
    }

    pub async fn run(mut self) {
        let listener = match TcpListener::bind(&self.addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("bridge cannot bind {}: {e}", self.addr);
                return;
            }
        };
        info!("bridge listening on {}", self.addr);

        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("bridge accept failed: {e}");
                    tokio::time::sleep(std::time::Duration::from_millis(500)).await;
                    continue;
                }
            };
            info!("bridge connected from {peer}");
            self.health.set_bridge_connected(true);
            match self.serve(stream).await {
                Ok(()) => info!("bridge disconnected"),
                Err(e) => error!("bridge connection error: {e}"),
            }
            self.health.set_bridge_connected(false);
        }
    }

    async fn serve(&mut self, stream: TcpStream) -> Result<()> {
        let ws = tokio_tungstenite::accept_async(stream).await?;
        let (mut write, mut read) = ws.split();

        let hello = serde_json::to_string(&BridgeCommand::Hello {
            pages_to_check: self.pages_to_check,
        })?;
        write.send(Message::Text(hello.into())).await?;

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            self.handle_frame(&text);
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            return Ok(());
                        }
                        Some(Err(e)) => return Err(e.into()),
                        Some(Ok(_)) => {}
                    }
                }

                cmd = self.command_rx.recv() => {
                    let Some(cmd) = cmd else {
                        // Command channel dropped — shut down.
                        return Ok(());
                    };
                    let frame = serde_json::to_string(&cmd)?;
                    write.send(Message::Text(frame.into())).await?;
                }
            }
        }
    }

    fn handle_frame(&mut self, text: &str) {
        self.frames_received += 1;
        if self.frames_received % 500 == 0 {
            info!(frames = self.frames_received, "[BRIDGE] {} frames received", self.frames_received);
        }

        for frame in parse_bridge_frame(text) {
            let event = match frame {
                ParsedFrame::Snapshot(root) => FeedEvent::Snapshot(root),
                ParsedFrame::Mutations(records) => {
                    debug!(records = records.len(), "mutation batch");
                    FeedEvent::Mutations(records)
                }
                ParsedFrame::PageCycle => FeedEvent::PageCycle,
            };
            if let Err(e) = self.feed_tx.try_send(event) {
                warn!("feed channel full, dropping frame: {e}");
            }
        }
    }
}
