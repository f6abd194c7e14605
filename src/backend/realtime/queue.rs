/**
 * Connection Handles and Outbound Queues
 *
 * Every live connection is represented by a pair:
 *
 * - a [`ConnectionHandle`], cheap to clone, held by the hub and by the
 *   connection's own tasks; it is the only way to put frames on the
 *   connection's queue or to ask it to close
 * - an [`OutboundQueue`], owned by the connection's write loop, which is
 *   the single consumer of the queue
 *
 * The queue is a bounded `tokio::sync::mpsc` channel of encoded frames.
 * Closing is signalled separately through a `watch` channel because the
 * hub cannot drop every sender clone to close the mpsc side.
 */
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::ws::Utf8Bytes;
use thiserror::Error;
use tokio::sync::{mpsc, watch};

/// Process-unique identity of one connection.
///
/// Two connections for the same user always have different IDs, which is
/// what lets the hub tell a stale unregister from a current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Why a frame could not be queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("outbound queue is full")]
    Full,
    #[error("connection is closed")]
    Closed,
}

#[derive(Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    user_id: Arc<str>,
    sender: mpsc::Sender<Utf8Bytes>,
    closed: Arc<watch::Sender<bool>>,
}

impl fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Consumer side of a connection's queue.
pub struct OutboundQueue {
    receiver: mpsc::Receiver<Utf8Bytes>,
}

/// Create a handle and its queue for `user_id`.
///
/// # Panics
///
/// Panics if `capacity` is zero; [`HubConfig::validate`](crate::shared::HubConfig::validate)
/// rejects that value before it gets here.
pub fn outbound_queue(user_id: impl Into<String>, capacity: usize) -> (ConnectionHandle, OutboundQueue) {
    let (sender, receiver) = mpsc::channel(capacity);
    let (closed, _) = watch::channel(false);
    let user_id: String = user_id.into();
    let handle = ConnectionHandle {
        id: ConnectionId::next(),
        user_id: Arc::from(user_id),
        sender,
        closed: Arc::new(closed),
    };
    (handle, OutboundQueue { receiver })
}

impl ConnectionHandle {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Queue a frame without waiting.
    pub fn try_send(&self, frame: Utf8Bytes) -> Result<(), QueueError> {
        if self.is_closed() {
            return Err(QueueError::Closed);
        }
        self.sender.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => QueueError::Full,
            mpsc::error::TrySendError::Closed(_) => QueueError::Closed,
        })
    }

    /// Ask the connection to shut down.
    ///
    /// Returns `true` for the call that actually closed it; later calls
    /// are no-ops and return `false`.
    pub fn close(&self) -> bool {
        self.closed.send_if_modified(|closed| {
            if *closed {
                false
            } else {
                *closed = true;
                true
            }
        })
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Resolve once [`close`](Self::close) has been called.
    pub async fn closed(&self) {
        let mut signal = self.closed.subscribe();
        loop {
            if *signal.borrow_and_update() {
                return;
            }
            if signal.changed().await.is_err() {
                return;
            }
        }
    }

    pub fn same_connection(&self, other: &ConnectionHandle) -> bool {
        self.id == other.id
    }
}

impl OutboundQueue {
    /// Wait for the next frame.
    pub async fn recv(&mut self) -> Option<Utf8Bytes> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Utf8Bytes> {
        self.receiver.try_recv().ok()
    }

    /// Refuse further frames and return whatever is still queued.
    pub fn close_and_drain(&mut self) -> Vec<Utf8Bytes> {
        self.receiver.close();
        let mut pending = Vec::new();
        while let Ok(frame) = self.receiver.try_recv() {
            pending.push(frame);
        }
        pending
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}
