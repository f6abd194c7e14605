/**
 * Connection Read and Write Loops
 *
 * A live connection is two tasks sharing one [`ConnectionHandle`]:
 *
 * - the **write loop** owns the transport sink and the [`OutboundQueue`];
 *   it writes queued frames in order, sends a ping every
 *   `ping_period`, and bounds every write by `write_wait`
 * - the **read loop** owns the transport stream; it enforces the frame
 *   size limit and the idle deadline, decodes frames and dispatches them
 *
 * # Teardown
 *
 * Closing the handle is the one shutdown signal. Whichever loop fails first
 * closes it; the write loop then sends a close frame and unregisters, the
 * read loop stops and reports the disconnect to presence. Unregister is
 * idempotent, so both loops call it freely.
 *
 * ```text
 * Connecting -> Registered -> Draining -> Closed
 * ```
 *
 * # Idle deadline
 *
 * Only a pong pushes the deadline forward. A peer that keeps sending data
 * but never answers pings is still torn down after `pong_wait`.
 */
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{close_code, CloseFrame, Message, Utf8Bytes};
use bytes::Bytes;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use thiserror::Error;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::hub::Hub;
use super::policy;
use super::queue::{ConnectionHandle, OutboundQueue};
use super::Realtime;
use crate::backend::chat::error::ServiceError;
use crate::shared::config::HubConfig;
use crate::shared::frame::{InboundFrame, OutboundFrame, TypingContent, TypingDraft};
use crate::shared::message::{MessageDraft, Notification, NotificationDraft};

/// Why a connection stopped.
#[derive(Debug, Error)]
enum Shutdown {
    #[error("connection closed")]
    Closed,
    #[error("peer closed the connection")]
    PeerClosed,
    #[error("no pong within {0:?}")]
    Idle(Duration),
    #[error("write timed out after {0:?}")]
    WriteTimeout(Duration),
    #[error("transport error: {0}")]
    Transport(String),
}

pub(crate) struct Connection {
    handle: ConnectionHandle,
    realtime: Realtime,
}

impl Connection {
    pub(crate) fn new(handle: ConnectionHandle, realtime: Realtime) -> Self {
        Self { handle, realtime }
    }

    /// Run both loops to completion.
    ///
    /// The handle must already be registered. Returns after the read loop
    /// has finished, presence has been updated, and the write loop has
    /// flushed its close frame.
    pub(crate) async fn run<S, W, E>(self, stream: S, sink: W, queue: OutboundQueue)
    where
        S: Stream<Item = Result<Message, E>> + Unpin,
        E: fmt::Display,
        W: Sink<Message> + Unpin + Send + 'static,
        W::Error: fmt::Display,
    {
        let writer = tokio::spawn(write_loop(
            self.handle.clone(),
            queue,
            sink,
            self.realtime.config.clone(),
            self.realtime.hub.clone(),
        ));

        let reason = self.read_loop(stream).await;
        tracing::info!(
            user_id = %self.handle.user_id(),
            connection = %self.handle.id(),
            reason = %reason,
            "[Connection] Read loop stopped"
        );

        self.handle.close();
        self.realtime.presence.disconnected(&self.handle).await;

        if let Err(e) = writer.await {
            tracing::error!(connection = %self.handle.id(), error = %e, "[Connection] Write loop task failed");
        }
    }

    async fn read_loop<S, E>(&self, mut stream: S) -> Shutdown
    where
        S: Stream<Item = Result<Message, E>> + Unpin,
        E: fmt::Display,
    {
        let config = &self.realtime.config;
        let mut deadline = Instant::now() + config.pong_wait;

        loop {
            let next = tokio::select! {
                biased;
                _ = self.handle.closed() => return Shutdown::Closed,
                next = time::timeout_at(deadline, stream.next()) => next,
            };

            let message = match next {
                Err(_) => {
                    tracing::warn!(user_id = %self.handle.user_id(), connection = %self.handle.id(), "[Connection] Idle deadline passed");
                    return Shutdown::Idle(config.pong_wait);
                }
                Ok(None) => return Shutdown::PeerClosed,
                Ok(Some(Err(e))) => return Shutdown::Transport(e.to_string()),
                Ok(Some(Ok(message))) => message,
            };

            match message {
                Message::Pong(_) => deadline = Instant::now() + config.pong_wait,
                Message::Text(text) => self.receive(text.as_str()).await,
                Message::Binary(data) => match std::str::from_utf8(&data) {
                    Ok(text) => self.receive(text).await,
                    Err(_) => {
                        tracing::debug!(connection = %self.handle.id(), "[Connection] Non-UTF-8 binary frame skipped");
                    }
                },
                Message::Ping(_) => {}
                Message::Close(_) => return Shutdown::PeerClosed,
            }
        }
    }

    async fn receive(&self, text: &str) {
        let limit = self.realtime.config.max_message_size;
        if text.len() > limit {
            tracing::warn!(
                user_id = %self.handle.user_id(),
                size = text.len(),
                limit,
                "[Connection] Oversized frame dropped"
            );
            return;
        }

        let frame = match InboundFrame::decode(text) {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                tracing::debug!(user_id = %self.handle.user_id(), "[Connection] Unknown frame type ignored");
                return;
            }
            Err(e) => {
                tracing::warn!(user_id = %self.handle.user_id(), error = %e, "[Connection] Malformed frame skipped");
                return;
            }
        };

        match frame {
            InboundFrame::Chat(draft) => {
                if let Err(e) = self.on_chat(draft).await {
                    self.reject(&e);
                }
            }
            InboundFrame::Typing(draft) => {
                if let Err(e) = self.on_typing(draft).await {
                    self.reject(&e);
                }
            }
            InboundFrame::Notification(draft) => self.on_notification(draft).await,
            InboundFrame::Read(draft) => {
                let user_id = self.handle.user_id();
                if let Err(e) = self.realtime.messages.mark_as_read(draft.message_id, user_id).await {
                    tracing::warn!(user_id = %user_id, message_id = %draft.message_id, error = %e, "[Connection] Read receipt failed");
                }
            }
        }
    }

    async fn on_chat(&self, draft: MessageDraft) -> Result<(), ServiceError> {
        let message = self
            .realtime
            .messages
            .persist(self.handle.user_id(), draft)
            .await?;
        let target = policy::message_target(&message)?;
        self.realtime
            .fanout
            .deliver(&target, &OutboundFrame::Chat(message))
            .await;
        Ok(())
    }

    async fn on_typing(&self, draft: TypingDraft) -> Result<(), ServiceError> {
        let user_id = self.handle.user_id();
        let target = policy::address(user_id, draft.receiver_id.as_deref(), draft.group_id.as_deref())?;
        let content = TypingContent {
            user_id: user_id.to_string(),
            receiver_id: draft.receiver_id,
            group_id: draft.group_id,
            is_typing: draft.is_typing,
        };
        self.realtime
            .fanout
            .deliver(&target, &OutboundFrame::Typing(content))
            .await;
        Ok(())
    }

    async fn on_notification(&self, draft: NotificationDraft) {
        if let Err(e) = draft.validate() {
            tracing::warn!(user_id = %self.handle.user_id(), error = %e, "[Connection] Notification dropped");
            return;
        }
        let notification = Notification::from_draft(Some(self.handle.user_id().to_string()), draft);
        let target = policy::notification_target(&notification);
        self.realtime
            .fanout
            .deliver(&target, &OutboundFrame::Notification(notification))
            .await;
    }

    /// Tell the sender why its frame was not delivered.
    fn reject(&self, error: &ServiceError) {
        tracing::debug!(user_id = %self.handle.user_id(), error = %error, "[Connection] Send rejected");

        let frame = match OutboundFrame::error(error.client_message()).encode() {
            Ok(text) => Utf8Bytes::from(text),
            Err(e) => {
                tracing::error!(error = %e, "[Connection] Failed to encode error frame");
                return;
            }
        };
        if let Err(e) = self.handle.try_send(frame) {
            tracing::warn!(connection = %self.handle.id(), reason = %e, "[Connection] Could not queue error frame, closing");
            self.handle.close();
        }
    }
}

async fn write_loop<W>(
    handle: ConnectionHandle,
    mut queue: OutboundQueue,
    mut sink: W,
    config: Arc<HubConfig>,
    hub: Arc<Hub>,
) where
    W: Sink<Message> + Unpin,
    W::Error: fmt::Display,
{
    let write_wait = config.write_wait;
    let mut ping = time::interval_at(Instant::now() + config.ping_period, config.ping_period);
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut written = 0usize;

    let reason = loop {
        tokio::select! {
            biased;
            _ = handle.closed() => {
                let dropped = queue.close_and_drain().len();
                if dropped > 0 {
                    tracing::debug!(connection = %handle.id(), dropped, "[Connection] Pending frames dropped on close");
                }
                let close = Message::Close(Some(CloseFrame {
                    code: close_code::NORMAL,
                    reason: Utf8Bytes::from_static("connection closed"),
                }));
                let _ = write(&mut sink, close, write_wait).await;
                break Shutdown::Closed;
            }
            frame = queue.recv() => {
                let Some(text) = frame else { break Shutdown::Closed };
                if let Err(reason) = write(&mut sink, Message::Text(text), write_wait).await {
                    break reason;
                }
                written += 1;
            }
            _ = ping.tick() => {
                if let Err(reason) = write(&mut sink, Message::Ping(Bytes::new()), write_wait).await {
                    break reason;
                }
            }
        }
    };

    handle.close();
    hub.unregister(&handle);
    if time::timeout(write_wait, sink.close()).await.is_err() {
        tracing::debug!(connection = %handle.id(), "[Connection] Transport close timed out");
    }

    tracing::info!(
        user_id = %handle.user_id(),
        connection = %handle.id(),
        written,
        reason = %reason,
        "[Connection] Write loop stopped"
    );
}

async fn write<W>(sink: &mut W, message: Message, write_wait: Duration) -> Result<(), Shutdown>
where
    W: Sink<Message> + Unpin,
    W::Error: fmt::Display,
{
    match time::timeout(write_wait, sink.send(message)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(Shutdown::Transport(e.to_string())),
        Err(_) => Err(Shutdown::WriteTimeout(write_wait)),
    }
}
