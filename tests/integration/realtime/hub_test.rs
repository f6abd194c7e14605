//! Registry behaviour seen through the public API

use std::sync::Arc;

use axum::extract::ws::Utf8Bytes;
use pretty_assertions::assert_eq;

use chathub::backend::realtime::{outbound_queue, Hub};

fn frame(text: &'static str) -> Utf8Bytes {
    Utf8Bytes::from_static(text)
}

#[test]
fn test_send_to_absent_user_is_noop() {
    let hub = Hub::new();
    assert!(!hub.send_to_user("nobody", &frame("x")));
    assert_eq!(hub.connection_count(), 0);
}

#[test]
fn test_broadcast_to_set_evicts_full_queue_only() {
    let hub = Hub::new();
    let (a, mut a_queue) = outbound_queue("a", 4);
    let (b, _b_queue) = outbound_queue("b", 1);
    let (c, mut c_queue) = outbound_queue("c", 4);
    hub.register(a);
    hub.register(b.clone());
    hub.register(c);

    b.try_send(frame("filler")).unwrap();

    let delivered = hub.broadcast_to_set(["a", "b", "c"], &frame("f"));

    assert_eq!(delivered, 2);
    assert_eq!(a_queue.try_recv(), Some(frame("f")));
    assert_eq!(c_queue.try_recv(), Some(frame("f")));
    assert!(!hub.is_online("b"));
    assert!(b.is_closed());
    assert_eq!(hub.list_online().into_iter().collect::<Vec<_>>(), vec!["a", "c"]);
}

#[test]
fn test_broadcast_to_set_order_does_not_matter() {
    for order in [["b", "a", "c"], ["c", "b", "a"], ["a", "c", "b"]] {
        let hub = Hub::new();
        let (a, _aq) = outbound_queue("a", 4);
        let (b, _bq) = outbound_queue("b", 1);
        let (c, _cq) = outbound_queue("c", 4);
        hub.register(a);
        hub.register(b.clone());
        hub.register(c);
        b.try_send(frame("filler")).unwrap();

        assert_eq!(hub.broadcast_to_set(order, &frame("f")), 2);
        assert!(!hub.is_online("b"));
    }
}

#[test]
fn test_broadcast_all_reaches_every_connection() {
    let hub = Hub::new();
    let mut queues = Vec::new();
    for user in ["a", "b", "c"] {
        let (handle, queue) = outbound_queue(user, 4);
        hub.register(handle);
        queues.push(queue);
    }

    assert_eq!(hub.broadcast_all(&frame("all")), 3);
    for queue in &mut queues {
        assert_eq!(queue.try_recv(), Some(frame("all")));
        assert_eq!(queue.try_recv(), None);
    }
}

#[test]
fn test_concurrent_double_unregister() {
    let hub = Arc::new(Hub::new());
    let (handle, _queue) = outbound_queue("a", 4);
    hub.register(handle.clone());

    let removed: Vec<bool> = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..2)
            .map(|_| {
                let hub = hub.clone();
                let handle = handle.clone();
                scope.spawn(move || hub.unregister(&handle))
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    assert_eq!(removed.iter().filter(|r| **r).count(), 1);
    assert!(!hub.is_online("a"));
    assert_eq!(hub.connection_count(), 0);
    assert!(handle.is_closed());
}

#[test]
fn test_stale_unregister_keeps_newer_connection() {
    let hub = Hub::new();
    let (old, _old_queue) = outbound_queue("a", 4);
    let (new, mut new_queue) = outbound_queue("a", 4);

    hub.register(old.clone());
    let superseded = hub.register(new.clone()).expect("previous connection");

    assert!(superseded.same_connection(&old));
    assert!(old.is_closed());
    assert!(!hub.unregister(&old));
    assert!(hub.is_online("a"));

    assert!(hub.send_to_user("a", &frame("still here")));
    assert_eq!(new_queue.try_recv(), Some(frame("still here")));
}

#[test]
fn test_queue_overflow_on_send_to_user_tears_down() {
    let hub = Hub::new();
    let (handle, mut queue) = outbound_queue("a", 2);
    hub.register(handle.clone());

    assert!(hub.send_to_user("a", &frame("1")));
    assert!(hub.send_to_user("a", &frame("2")));
    assert!(!hub.send_to_user("a", &frame("3")));

    assert!(!hub.is_online("a"));
    assert!(handle.is_closed());
    // Queued frames stay FIFO until the writer drains them.
    assert_eq!(queue.try_recv(), Some(frame("1")));
    assert_eq!(queue.try_recv(), Some(frame("2")));
}
