//! Transport seam between sessions and the MentraOS cloud
//!
//! Outbound messages go through the `MessageSink` trait; inbound traffic
//! arrives as `TransportEvent`s on an mpsc channel. The WebSocket
//! implementation lives in `ws`; tests substitute in-memory sinks/channels.

mod ws;

use anyhow::Result;
use serde_json::Value;

pub use ws::{connect, WsSink};

/// Outbound half of a session's connection.
#[async_trait::async_trait]
pub trait MessageSink: Send + Sync {
    /// Send one JSON message to the cloud.
    async fn send(&self, message: Value) -> Result<()>;
}

/// Inbound half: everything the transport can hand to the session pump.
///
/// Interceptors observe `Message` payloads only; connection lifecycle and
/// binary audio frames are not "message received" events.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// Connection established; the session answers with its connection init
    Connected,
    /// A JSON message from the cloud
    Message(Value),
    /// A binary frame (raw audio chunk)
    Binary(Vec<u8>),
    /// Connection closed or failed; terminal
    Disconnected,
}
