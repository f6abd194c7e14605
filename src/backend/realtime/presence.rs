/**
 * Presence Tracker
 *
 * Presence is the key set of the hub and nothing else. This module ties
 * registry changes to the online service so the store flag and the
 * `online` broadcasts follow connections as they come and go.
 *
 * A superseded connection's teardown finds a newer connection registered
 * for the same user and leaves the user online.
 *
 * Transitions for one user run one at a time. A teardown holds the user's
 * lock from its registry check until its offline write is done, so a
 * reconnect cannot slip its online write in between and end up
 * overwritten by a stale offline one.
 */
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Mutex as AsyncMutex;

use super::hub::Hub;
use super::queue::ConnectionHandle;
use crate::backend::chat::online::OnlineService;

type TransitionLocks = HashMap<String, Arc<AsyncMutex<()>>>;

#[derive(Clone)]
pub struct Presence {
    hub: Arc<Hub>,
    online: OnlineService,
    transitions: Arc<Mutex<TransitionLocks>>,
}

impl Presence {
    pub fn new(hub: Arc<Hub>, online: OnlineService) -> Self {
        Self {
            hub,
            online,
            transitions: Arc::default(),
        }
    }

    /// Register `handle` and mark its user online.
    pub async fn connected(&self, handle: ConnectionHandle) {
        let user_id = handle.user_id().to_string();
        let lock = self.transition_lock(&user_id);
        {
            let _transition = lock.lock().await;
            self.hub.register(handle);
            // Store failures are logged by the online service.
            let _ = self.online.set_user_online(&user_id).await;
        }
        self.release(&user_id, lock);
    }

    /// Unregister `handle`; mark its user offline unless another
    /// connection for the user has taken its place.
    ///
    /// # Returns
    ///
    /// Whether the user went offline.
    pub async fn disconnected(&self, handle: &ConnectionHandle) -> bool {
        let user_id = handle.user_id();
        let lock = self.transition_lock(user_id);
        let went_offline = {
            let _transition = lock.lock().await;
            self.hub.unregister(handle);
            if self.hub.is_online(user_id) {
                tracing::debug!(user_id = %user_id, connection = %handle.id(), "[Presence] Superseded connection closed, user stays online");
                false
            } else {
                let _ = self.online.set_user_offline(user_id).await;
                true
            }
        };
        self.release(user_id, lock);
        went_offline
    }

    fn transition_lock(&self, user_id: &str) -> Arc<AsyncMutex<()>> {
        self.transitions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(user_id.to_string())
            .or_default()
            .clone()
    }

    /// Drop the user's lock entry once nobody else holds it.
    fn release(&self, user_id: &str, lock: Arc<AsyncMutex<()>>) {
        drop(lock);
        let mut transitions = self.transitions.lock().unwrap_or_else(PoisonError::into_inner);
        if transitions
            .get(user_id)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            transitions.remove(user_id);
        }
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.hub.is_online(user_id)
    }

    pub fn list_online(&self) -> BTreeSet<String> {
        self.hub.list_online()
    }
}
