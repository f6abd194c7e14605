/**
 * Connection Registry (Hub)
 *
 * The hub is the single authoritative map from user ID to that user's live
 * connection. It is the only component allowed to enumerate connections.
 *
 * # Locking
 *
 * One `std::sync::RwLock` guards the map. It is held only for map
 * operations and for non-blocking `try_send` calls onto connection queues;
 * nothing awaits while holding it, and no socket is ever written under
 * it. Deliveries run under the read lock, so presence queries and sends
 * proceed in parallel while register/unregister are exclusive.
 *
 * # Slow consumers
 *
 * A connection whose queue is full (or already closed) when a frame is
 * delivered is evicted: removed from the map if it is still the current
 * entry for its user, and closed. The frame is dropped for that connection
 * only; delivery to everyone else continues.
 *
 * # Superseding
 *
 * Registering a second connection for a user replaces the entry and closes
 * the previous connection, so it cannot linger unreachable.
 */
use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use axum::extract::ws::Utf8Bytes;

use super::queue::{ConnectionHandle, QueueError};

#[derive(Debug, Default)]
pub struct Hub {
    connections: RwLock<HashMap<String, ConnectionHandle>>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, ConnectionHandle>> {
        self.connections.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, ConnectionHandle>> {
        self.connections.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make `handle` the live connection for its user.
    ///
    /// # Returns
    ///
    /// The connection it replaced, already closed, if there was one.
    pub fn register(&self, handle: ConnectionHandle) -> Option<ConnectionHandle> {
        let user_id = handle.user_id().to_string();
        let connection_id = handle.id();
        let previous = self.write().insert(user_id.clone(), handle);

        match &previous {
            Some(old) if old.id() != connection_id => {
                old.close();
                tracing::info!(
                    user_id = %user_id,
                    connection = %connection_id,
                    superseded = %old.id(),
                    "[Hub] Connection registered, previous connection closed"
                );
            }
            _ => {
                tracing::info!(user_id = %user_id, connection = %connection_id, "[Hub] Connection registered");
            }
        }
        previous
    }

    /// Remove `handle` from the registry and close it.
    ///
    /// The entry is removed only if it still belongs to this exact
    /// connection, so a late unregister from a superseded connection leaves
    /// the newer one alone. Safe to call any number of times.
    ///
    /// # Returns
    ///
    /// Whether this call removed the entry.
    pub fn unregister(&self, handle: &ConnectionHandle) -> bool {
        let removed = {
            let mut connections = self.write();
            match connections.get(handle.user_id()) {
                Some(current) if current.same_connection(handle) => {
                    connections.remove(handle.user_id());
                    true
                }
                _ => false,
            }
        };
        handle.close();

        if removed {
            tracing::info!(user_id = %handle.user_id(), connection = %handle.id(), "[Hub] Connection unregistered");
        }
        removed
    }

    /// Queue `frame` for `user_id`.
    ///
    /// No connection for `user_id` is a silent no-op.
    ///
    /// # Returns
    ///
    /// Whether the frame was queued.
    pub fn send_to_user(&self, user_id: &str, frame: &Utf8Bytes) -> bool {
        let failed = {
            let connections = self.read();
            match connections.get(user_id) {
                None => return false,
                Some(handle) => match handle.try_send(frame.clone()) {
                    Ok(()) => return true,
                    Err(reason) => (handle.clone(), reason),
                },
            }
        };
        self.evict(vec![failed]);
        false
    }

    /// Queue `frame` for each of `user_ids`; absent users are skipped and
    /// a failing connection does not stop delivery to the rest.
    ///
    /// # Returns
    ///
    /// Number of connections the frame was queued on.
    pub fn broadcast_to_set<I, S>(&self, user_ids: I, frame: &Utf8Bytes) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut delivered = 0;
        let mut failed = Vec::new();
        {
            let connections = self.read();
            let mut seen = BTreeSet::new();
            for user_id in user_ids {
                let user_id = user_id.as_ref();
                if !seen.insert(user_id.to_string()) {
                    continue;
                }
                if let Some(handle) = connections.get(user_id) {
                    match handle.try_send(frame.clone()) {
                        Ok(()) => delivered += 1,
                        Err(reason) => failed.push((handle.clone(), reason)),
                    }
                }
            }
        }
        self.evict(failed);
        delivered
    }

    /// Queue `frame` on every registered connection.
    pub fn broadcast_all(&self, frame: &Utf8Bytes) -> usize {
        let mut delivered = 0;
        let mut failed = Vec::new();
        {
            let connections = self.read();
            for handle in connections.values() {
                match handle.try_send(frame.clone()) {
                    Ok(()) => delivered += 1,
                    Err(reason) => failed.push((handle.clone(), reason)),
                }
            }
        }
        self.evict(failed);
        delivered
    }

    fn evict(&self, failed: Vec<(ConnectionHandle, QueueError)>) {
        for (handle, reason) in failed {
            tracing::warn!(
                user_id = %handle.user_id(),
                connection = %handle.id(),
                reason = %reason,
                "[Hub] Evicting unresponsive connection"
            );
            self.unregister(&handle);
        }
    }

    /// Snapshot: does `user_id` have a live connection right now?
    pub fn is_online(&self, user_id: &str) -> bool {
        self.read().contains_key(user_id)
    }

    /// Snapshot of every user with a live connection.
    pub fn list_online(&self) -> BTreeSet<String> {
        self.read().keys().cloned().collect()
    }

    pub fn connection_for(&self, user_id: &str) -> Option<ConnectionHandle> {
        self.read().get(user_id).cloned()
    }

    pub fn connection_count(&self) -> usize {
        self.read().len()
    }
}
