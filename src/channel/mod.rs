// Event channel collaborator: trait seam plus in-memory and WebSocket transports

mod codec;
mod websocket;

pub use codec::{decode_frame, Frame, FrameError};
pub use websocket::WsChannel;

use crate::event::ChannelEvent;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Source of channel events for a session.
///
/// `next_event` must be cancel-safe: the session polls it inside
/// `tokio::select!` next to the watchdog deadline. `None` ends the session.
#[async_trait]
pub trait EventChannel: Send {
    async fn next_event(&mut self) -> Option<ChannelEvent>;
}

/// In-memory channel backed by a bounded `mpsc` queue
pub struct MpscChannel {
    rx: mpsc::Receiver<ChannelEvent>,
}

impl MpscChannel {
    /// Create a channel and the sender feeding it
    pub fn new(capacity: usize) -> (mpsc::Sender<ChannelEvent>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self { rx })
    }
}

#[async_trait]
impl EventChannel for MpscChannel {
    async fn next_event(&mut self) -> Option<ChannelEvent> {
        self.rx.recv().await
    }
}
