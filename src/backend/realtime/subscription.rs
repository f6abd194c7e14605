/**
 * Hub Event Subscription
 *
 * Connects the event bus to the hub. One handler is registered per event
 * kind; each resolves the delivery target for the event and fans the
 * resulting frame out through [`Fanout`].
 *
 * Chat messages sent over a live connection are routed by the connection
 * itself and never published, so a message is delivered once whichever
 * path it took in.
 */
use super::event_bus::EventBus;
use super::fanout::Fanout;
use crate::shared::event::EventKind;

/// Subscribe `fanout` to every event kind on `bus`.
pub fn subscribe_hub(bus: &EventBus, fanout: Fanout) {
    for kind in EventKind::ALL {
        let fanout = fanout.clone();
        bus.subscribe(kind, move |event| {
            let fanout = fanout.clone();
            async move {
                fanout.deliver_event(event).await;
            }
        });
    }
    tracing::info!(kinds = EventKind::ALL.len(), "[Realtime] Hub subscribed to event bus");
}
