// SYNOID Hologram Command Client
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use anyhow::{bail, Context, Result};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// A persistent connection to a running viewer.
pub struct CommandClient {
    stream: TcpStream,
    timeout: Duration,
}

impl CommandClient {
    pub async fn connect(addr: &str, wait: Duration) -> Result<Self> {
        let stream = timeout(wait, TcpStream::connect(addr))
            .await
            .with_context(|| format!("connect to {} timed out", addr))?
            .with_context(|| format!("connect to {}", addr))?;
        Ok(Self {
            stream,
            timeout: wait,
        })
    }

    /// One request/reply round trip. Returns the reply text.
    pub async fn send(&mut self, message: &str) -> Result<String> {
        if message.contains('\n') {
            bail!("command must be a single line");
        }
        let mut line = message.to_string();
        line.push('\n');
        self.stream.write_all(line.as_bytes()).await?;

        let mut reply = [0u8; 2];
        timeout(self.timeout, self.stream.read_exact(&mut reply))
            .await
            .context("reply timed out")?
            .context("read reply")?;
        Ok(String::from_utf8_lossy(&reply).into_owned())
    }
}

/// Connect, send one message, return the reply.
pub async fn send_command(addr: &str, message: &str, wait: Duration) -> Result<String> {
    let mut client = CommandClient::connect(addr, wait).await?;
    client.send(message).await
}
