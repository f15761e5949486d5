// SYNOID Hologram Command Server
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Request/reply endpoint for remote control. One request per line, one
// fixed two-byte acknowledgement per request. All waits are bounded by
// the poll timeout so the handlers notice shutdown promptly.
//
// This is plain TCP, not ZeroMQ REQ/REP. ZeroMQ controllers written for
// the old viewer cannot talk to it; use `hologram-core send` or any client
// that writes newline-terminated lines.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::command::{Command, ACK, MAX_REQUEST};
use crate::health::PipelineStats;
use crate::state::{ControlState, SwitchSender};

#[derive(Clone)]
struct Handler {
    control: Arc<ControlState>,
    switches: SwitchSender,
    stats: Arc<PipelineStats>,
    poll: Duration,
}

pub struct CommandServer {
    listener: TcpListener,
    handler: Handler,
}

impl CommandServer {
    pub async fn bind(
        addr: &str,
        control: Arc<ControlState>,
        switches: SwitchSender,
        stats: Arc<PipelineStats>,
        poll: Duration,
    ) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("bind command endpoint {}", addr))?;
        Ok(Self {
            listener,
            handler: Handler {
                control,
                switches,
                stats,
                poll,
            },
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the control state stops running.
    pub async fn serve(self) -> Result<()> {
        info!("[COMMAND] Listening on {}", self.local_addr()?);
        while self.handler.control.is_running() {
            let (stream, peer) = match timeout(self.handler.poll, self.listener.accept()).await {
                Err(_) => continue,
                Ok(Err(e)) => {
                    warn!("[COMMAND] Accept failed: {}", e);
                    continue;
                }
                Ok(Ok(conn)) => conn,
            };
            debug!("[COMMAND] Client connected: {}", peer);
            let handler = self.handler.clone();
            tokio::spawn(async move {
                if let Err(e) = handler.handle_conn(stream).await {
                    warn!("[COMMAND] Connection {} error: {:#}", peer, e);
                }
            });
        }
        info!("[COMMAND] Stopped.");
        Ok(())
    }
}

impl Handler {
    async fn handle_conn(self, stream: TcpStream) -> Result<()> {
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);
        let mut buf = Vec::with_capacity(64);
        while self.control.is_running() {
            // Never buffer more than one byte past the request cap.
            let room = (MAX_REQUEST + 1).saturating_sub(buf.len()) as u64;
            let mut limited = (&mut reader).take(room);
            // Bytes read before a timeout stay in `buf`.
            let n = match timeout(self.poll, limited.read_until(b'\n', &mut buf)).await {
                Err(_) => continue,
                Ok(n) => n.context("read request")?,
            };
            if buf.last() != Some(&b'\n') {
                if buf.len() > MAX_REQUEST {
                    warn!(
                        "[COMMAND] Request exceeds {} bytes without a newline, closing",
                        MAX_REQUEST
                    );
                    break;
                }
                if n == 0 {
                    break;
                }
                continue;
            }

            let line = String::from_utf8_lossy(&buf).into_owned();
            buf.clear();
            info!("[COMMAND] REQ > {}", line.trim_end());
            PipelineStats::bump(&self.stats.commands);
            Command::parse(&line).apply(&self.control, &self.switches);
            write_half.write_all(ACK).await.context("send ack")?;
        }
        Ok(())
    }
}
