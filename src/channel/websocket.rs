use super::codec::{decode_frame, Frame, NAMESPACE_CONNECT, PONG};
use super::{EventChannel, MpscChannel};
use crate::config::{ChannelConfig, WireProtocol};
use crate::event::ChannelEvent;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket event channel.
///
/// A reader task owns the socket, answers protocol pings and forwards decoded
/// events into a bounded queue, which keeps `next_event` cancel-safe. When
/// the socket closes a final `Disconnected` is delivered and the channel
/// ends. There is no reconnect.
pub struct WsChannel {
    inner: MpscChannel,
    reader: JoinHandle<()>,
}

impl WsChannel {
    /// Connect to the state server and start the reader task
    pub async fn connect(config: &ChannelConfig) -> Result<Self> {
        info!(url = %config.url, protocol = ?config.protocol, "Connecting to state server");

        let (stream, _response) = connect_async(config.url.as_str())
            .await
            .with_context(|| format!("Failed to connect to {}", config.url))?;

        let (tx, inner) = MpscChannel::new(config.queue_capacity);
        let reader = tokio::spawn(run_reader(stream, config.protocol, tx));

        Ok(Self { inner, reader })
    }
}

impl Drop for WsChannel {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

#[async_trait]
impl EventChannel for WsChannel {
    async fn next_event(&mut self) -> Option<ChannelEvent> {
        self.inner.next_event().await
    }
}

/// Reader loop: decode frames, answer pings, forward events
async fn run_reader(mut stream: WsStream, protocol: WireProtocol, tx: mpsc::Sender<ChannelEvent>) {
    let mut connected = false;

    // Plain JSON servers have no namespace handshake
    if protocol == WireProtocol::Json {
        connected = true;
        if tx.send(ChannelEvent::Connected).await.is_err() {
            return;
        }
    }

    while let Some(msg) = stream.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(frame)) => {
                info!(frame = ?frame, "State server closed the connection");
                break;
            }
            Ok(_) => continue,
            Err(e) => {
                warn!(error = %e, "WebSocket error");
                break;
            }
        };

        let frame = match decode_frame(protocol, &text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Dropping undecodable frame");
                continue;
            }
        };

        let reply = match frame {
            Frame::Open => Some(NAMESPACE_CONNECT),
            Frame::Ping => Some(PONG),
            Frame::Ignored => None,
            Frame::Event(event) => {
                match event {
                    ChannelEvent::Connected if connected => continue,
                    ChannelEvent::Disconnected if !connected => continue,
                    ChannelEvent::Connected => connected = true,
                    ChannelEvent::Disconnected => connected = false,
                    ChannelEvent::Message { .. } => {}
                }
                if tx.send(event).await.is_err() {
                    debug!("Session dropped the channel, stopping reader");
                    return;
                }
                None
            }
        };

        if let Some(reply) = reply {
            if let Err(e) = stream.send(Message::Text(reply.to_string())).await {
                error!(error = %e, "Failed to write to WebSocket");
                break;
            }
        }
    }

    if connected {
        let _ = tx.send(ChannelEvent::Disconnected).await;
    }
    info!("WebSocket reader stopped");
}
