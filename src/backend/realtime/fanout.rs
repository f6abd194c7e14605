/**
 * Fan-out
 *
 * Resolves a policy [`Target`] against the hub: encodes the frame once,
 * looks up group members through the store when needed, and hands the
 * bytes to the matching connections.
 *
 * Group membership is looked up at send time and never cached. A failed
 * lookup is logged and the delivery becomes a no-op; the sender is not
 * told.
 */
use std::sync::Arc;

use axum::extract::ws::Utf8Bytes;

use super::hub::Hub;
use super::policy::{self, Target};
use crate::backend::store::ChatStore;
use crate::shared::event::Event;
use crate::shared::frame::OutboundFrame;

#[derive(Clone)]
pub struct Fanout {
    hub: Arc<Hub>,
    store: Arc<dyn ChatStore>,
}

impl Fanout {
    pub fn new(hub: Arc<Hub>, store: Arc<dyn ChatStore>) -> Self {
        Self { hub, store }
    }

    /// Deliver `frame` to `target`.
    ///
    /// # Returns
    ///
    /// Number of connections the frame was queued on.
    pub async fn deliver(&self, target: &Target, frame: &OutboundFrame) -> usize {
        let bytes = match frame.encode() {
            Ok(text) => Utf8Bytes::from(text),
            Err(e) => {
                tracing::error!(frame = frame.frame_type(), error = %e, "[Fanout] Failed to encode frame");
                return 0;
            }
        };

        let delivered = match target {
            Target::User(user_id) => usize::from(self.hub.send_to_user(user_id, &bytes)),
            Target::All => self.hub.broadcast_all(&bytes),
            Target::Group { group_id, exclude } => {
                let members = match self.store.group_members(group_id).await {
                    Ok(members) => members,
                    Err(e) => {
                        tracing::warn!(group_id = %group_id, error = %e, "[Fanout] Group lookup failed, nothing delivered");
                        return 0;
                    }
                };
                let recipients = members
                    .iter()
                    .filter(|member| Some(member.as_str()) != exclude.as_deref());
                self.hub.broadcast_to_set(recipients, &bytes)
            }
        };

        tracing::debug!(frame = frame.frame_type(), target = ?target, delivered, "[Fanout] Frame delivered");
        delivered
    }

    /// Route a published event through the delivery policy.
    pub async fn deliver_event(&self, event: Event) -> usize {
        let kind = event.kind();
        let target = match policy::event_target(&event) {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!(kind = kind.as_str(), error = %e, "[Fanout] Event has no valid target, dropped");
                return 0;
            }
        };
        self.deliver(&target, &OutboundFrame::from(event)).await
    }
}
