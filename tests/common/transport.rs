//! Fake socket transport
//!
//! `fake_transport` returns the two halves a connection needs plus the
//! [`FakePeer`] that plays the client: it pushes inbound messages and
//! reads whatever the write loop sends.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::extract::ws::{Message, Utf8Bytes};
use futures_util::Sink;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use chathub::shared::frame::OutboundFrame;

/// How long a test waits for a frame before failing.
pub const RECV_TIMEOUT: Duration = Duration::from_secs(2);

pub type FakeStream = UnboundedReceiverStream<Result<Message, axum::Error>>;
pub type FakeSink = Pin<Box<dyn Sink<Message, Error = axum::Error> + Send>>;

/// The client end of a fake connection.
pub struct FakePeer {
    inbound: Option<mpsc::UnboundedSender<Result<Message, axum::Error>>>,
    outbound: mpsc::UnboundedReceiver<Message>,
}

/// Create a connected fake transport.
pub fn fake_transport() -> (FakePeer, FakeStream, FakeSink) {
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel::<Message>();

    let sink = futures_util::sink::unfold(outbound_tx, |tx, message: Message| async move {
        tx.send(message).map_err(|_| axum::Error::new("peer closed"))?;
        Ok::<_, axum::Error>(tx)
    });

    let peer = FakePeer {
        inbound: Some(inbound_tx),
        outbound: outbound_rx,
    };
    (peer, UnboundedReceiverStream::new(inbound_rx), Box::pin(sink))
}

/// Transport whose sink never accepts a write, like a peer that stopped
/// reading with a full TCP window.
pub fn stalled_transport() -> (FakePeer, FakeStream, FakeSink) {
    transport_with_sink(Box::pin(StalledSink))
}

/// Transport whose sink fails every write.
pub fn failing_transport() -> (FakePeer, FakeStream, FakeSink) {
    transport_with_sink(Box::pin(FailingSink))
}

fn transport_with_sink(sink: FakeSink) -> (FakePeer, FakeStream, FakeSink) {
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    // Nothing is ever written, so the peer's outbound side starts closed.
    let (_, outbound_rx) = mpsc::unbounded_channel::<Message>();

    let peer = FakePeer {
        inbound: Some(inbound_tx),
        outbound: outbound_rx,
    };
    (peer, UnboundedReceiverStream::new(inbound_rx), sink)
}

struct StalledSink;

impl Sink<Message> for StalledSink {
    type Error = axum::Error;

    fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Pending
    }

    fn start_send(self: Pin<&mut Self>, _item: Message) -> Result<(), Self::Error> {
        Ok(())
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Pending
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Pending
    }
}

struct FailingSink;

impl Sink<Message> for FailingSink {
    type Error = axum::Error;

    fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Err(axum::Error::new("broken pipe")))
    }

    fn start_send(self: Pin<&mut Self>, _item: Message) -> Result<(), Self::Error> {
        Err(axum::Error::new("broken pipe"))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }
}

impl FakePeer {
    /// Send a text frame to the server.
    pub fn send_text(&self, text: impl Into<String>) {
        self.push(Message::Text(Utf8Bytes::from(text.into())));
    }

    /// Send a JSON frame to the server.
    pub fn send_json(&self, value: serde_json::Value) {
        self.send_text(value.to_string());
    }

    pub fn send_binary(&self, data: Vec<u8>) {
        self.push(Message::Binary(data.into()));
    }

    pub fn send_close(&self) {
        self.push(Message::Close(None));
    }

    pub fn send_pong(&self) {
        self.push(Message::Pong(Default::default()));
    }

    /// Fail the transport, as a dropped TCP connection would.
    pub fn send_error(&self) {
        if let Some(tx) = &self.inbound {
            let _ = tx.send(Err(axum::Error::new("connection reset")));
        }
    }

    /// End the inbound stream.
    pub fn hang_up(&mut self) {
        self.inbound.take();
    }

    fn push(&self, message: Message) {
        if let Some(tx) = &self.inbound {
            let _ = tx.send(Ok(message));
        }
    }

    /// Next raw message from the server, pings included.
    pub async fn next_message(&mut self) -> Option<Message> {
        tokio::time::timeout(RECV_TIMEOUT, self.outbound.recv())
            .await
            .ok()
            .flatten()
    }

    /// Next data frame from the server, skipping pings.
    ///
    /// Panics if none arrives in time or the server closes first.
    pub async fn recv_frame(&mut self) -> OutboundFrame {
        loop {
            match self.next_message().await {
                Some(Message::Text(text)) => {
                    return serde_json::from_str(text.as_str())
                        .unwrap_or_else(|e| panic!("bad frame {text}: {e}"));
                }
                Some(Message::Ping(_)) => continue,
                other => panic!("expected a data frame, got {other:?}"),
            }
        }
    }

    /// Next data frame that is not a presence update.
    ///
    /// Presence frames are published through the event bus, so they can
    /// arrive at any point relative to the frames a test is waiting for.
    pub async fn recv_chat_frame(&mut self) -> OutboundFrame {
        loop {
            match self.recv_frame().await {
                OutboundFrame::Online(_) => continue,
                frame => return frame,
            }
        }
    }

    /// Assert that nothing but pings and presence updates arrives.
    pub async fn expect_no_frame(&mut self) {
        loop {
            match tokio::time::timeout(Duration::from_millis(100), self.outbound.recv()).await {
                Err(_) | Ok(None) => return,
                Ok(Some(Message::Ping(_))) => continue,
                Ok(Some(Message::Text(text))) => match serde_json::from_str(text.as_str()) {
                    Ok(OutboundFrame::Online(_)) => continue,
                    _ => panic!("expected no frame, got {text}"),
                },
                Ok(Some(message)) => panic!("expected no frame, got {message:?}"),
            }
        }
    }

    /// Wait for the server to close the connection.
    ///
    /// Data frames still in flight are skipped. Returns `true` when a close
    /// frame was seen before the transport ended.
    pub async fn wait_closed(&mut self) -> bool {
        loop {
            match self.next_message().await {
                Some(Message::Close(_)) => return true,
                Some(_) => continue,
                None => return false,
            }
        }
    }

    /// Data frames already written, without waiting.
    pub fn drain_frames(&mut self) -> Vec<OutboundFrame> {
        let mut frames = Vec::new();
        while let Ok(message) = self.outbound.try_recv() {
            if let Message::Text(text) = message {
                if let Ok(frame) = serde_json::from_str(text.as_str()) {
                    frames.push(frame);
                }
            }
        }
        frames
    }
}
