//! Executor RPC: request types, connector traits and the TCP JSON transport.
//!
//! One connection carries one call. The client writes a JSON
//! [`TestCheckRequest`], closes its write half, and reads a JSON
//! [`TestCheckResponse`] until the executor closes the stream.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use super::route::ExecutorRoute;
use crate::types::{Check, CheckResponse};

/// Largest response accepted from an executor
pub const MAX_RESPONSE_BYTES: u64 = 8 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCheckRequest {
    /// Absolute time after which the executor should give up
    pub deadline: DateTime<Utc>,
    pub check: Check,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestCheckResponse {
    #[serde(default)]
    pub responses: Vec<CheckResponse>,
    /// Set when the executor could not run the check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// An open connection to one executor
#[async_trait]
pub trait ExecutorClient: Send {
    async fn test_check(&mut self, request: TestCheckRequest) -> Result<TestCheckResponse>;
}

/// Opens connections to executors found in the directory
#[async_trait]
pub trait ExecutorConnector: Send + Sync {
    /// Connect within `dial_timeout`
    async fn connect(&self, route: &ExecutorRoute, dial_timeout: Duration) -> Result<Box<dyn ExecutorClient>>;
}

/// Write one JSON message and close the write side
pub async fn write_message<T, W>(io: &mut W, message: &T) -> Result<()>
where
    T: Serialize,
    W: AsyncWrite + Unpin,
{
    let json_data = serde_json::to_vec(message)?;
    io.write_all(&json_data).await?;
    io.shutdown().await?;
    Ok(())
}

/// Read one JSON message up to EOF
pub async fn read_message<T, R>(io: &mut R) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    io.take(MAX_RESPONSE_BYTES + 1).read_to_end(&mut buf).await?;

    if buf.len() as u64 > MAX_RESPONSE_BYTES {
        return Err(anyhow!("message exceeds {} bytes", MAX_RESPONSE_BYTES));
    }

    Ok(serde_json::from_slice(&buf)?)
}

/// Plain TCP transport
#[derive(Debug, Clone, Default)]
pub struct TcpExecutorConnector;

pub struct TcpExecutorClient {
    address: String,
    stream: Option<TcpStream>,
}

#[async_trait]
impl ExecutorConnector for TcpExecutorConnector {
    async fn connect(&self, route: &ExecutorRoute, dial_timeout: Duration) -> Result<Box<dyn ExecutorClient>> {
        let address = route.address();

        let stream = timeout(dial_timeout, TcpStream::connect(&address))
            .await
            .map_err(|_| anyhow!("dial to {} timed out after {:?}", address, dial_timeout))?
            .with_context(|| format!("dial to {address} failed"))?;

        Ok(Box::new(TcpExecutorClient { address, stream: Some(stream) }))
    }
}

#[async_trait]
impl ExecutorClient for TcpExecutorClient {
    async fn test_check(&mut self, request: TestCheckRequest) -> Result<TestCheckResponse> {
        let mut stream = self
            .stream
            .take()
            .ok_or_else(|| anyhow!("connection to {} was already used", self.address))?;

        write_message(&mut stream, &request).await.with_context(|| format!("sending to {} failed", self.address))?;
        read_message(&mut stream).await.with_context(|| format!("reading from {} failed", self.address))
    }
}
