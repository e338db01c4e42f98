use super::{MessageSink, TransportEvent};
use anyhow::{Context, Result};
use futures::stream::{SplitSink, StreamExt};
use futures::SinkExt;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

type WsWriter = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Write half of a cloud WebSocket connection. JSON messages go out as text
/// frames.
pub struct WsSink {
    writer: Mutex<WsWriter>,
}

#[async_trait::async_trait]
impl MessageSink for WsSink {
    async fn send(&self, message: Value) -> Result<()> {
        let text = serde_json::to_string(&message)?;
        let mut writer = self.writer.lock().await;
        writer
            .send(Message::Text(text))
            .await
            .context("Failed to send WebSocket message")
    }
}

/// Connect to the cloud WebSocket endpoint.
///
/// Returns the outbound sink and a channel of inbound transport events. The
/// read half runs in a spawned task until the connection closes; there is no
/// reconnection. The caller sends the connection init itself once this
/// returns, so no `Connected` event is queued here.
pub async fn connect(url: &str) -> Result<(std::sync::Arc<WsSink>, mpsc::Receiver<TransportEvent>)> {
    info!("Connecting to {}", url);

    let (stream, _response) = connect_async(url)
        .await
        .with_context(|| format!("Failed to connect to {}", url))?;

    let (writer, mut reader) = stream.split();
    let sink = std::sync::Arc::new(WsSink {
        writer: Mutex::new(writer),
    });

    let (tx, rx) = mpsc::channel(256);

    tokio::spawn(async move {
        while let Some(frame) = reader.next().await {
            let event = match frame {
                Ok(Message::Text(text)) => match serde_json::from_str::<Value>(&text) {
                    Ok(message) => TransportEvent::Message(message),
                    Err(e) => {
                        warn!("Dropping non-JSON text frame: {}", e);
                        continue;
                    }
                },
                Ok(Message::Binary(data)) => TransportEvent::Binary(data),
                Ok(Message::Close(_)) => break,
                // Pings are answered by tungstenite itself
                Ok(_) => continue,
                Err(e) => {
                    warn!("WebSocket read error: {}", e);
                    break;
                }
            };

            if tx.send(event).await.is_err() {
                debug!("Session dropped transport receiver, stopping read task");
                return;
            }
        }

        let _ = tx.send(TransportEvent::Disconnected).await;
    });

    Ok((sink, rx))
}
