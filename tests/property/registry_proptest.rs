//! Property-based tests for the connection registry

use std::collections::HashMap;

use axum::extract::ws::Utf8Bytes;
use proptest::prelude::*;

use chathub::backend::realtime::{outbound_queue, ConnectionHandle, ConnectionId, Hub};

const USERS: [&str; 3] = ["a", "b", "c"];

#[derive(Debug, Clone)]
enum Op {
    /// Register a fresh connection for `USERS[n]`.
    Register(usize),
    /// Unregister the n-th connection created so far (wrapping).
    Unregister(usize),
    /// Send to `USERS[n]`.
    Send(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..USERS.len()).prop_map(Op::Register),
        any::<usize>().prop_map(Op::Unregister),
        (0..USERS.len()).prop_map(Op::Send),
    ]
}

proptest! {
    #[test]
    fn test_last_register_wins(ops in proptest::collection::vec(op(), 1..60)) {
        let hub = Hub::new();
        let mut created: Vec<ConnectionHandle> = Vec::new();
        let mut queues = Vec::new();
        let mut model: HashMap<&str, ConnectionId> = HashMap::new();

        for op in ops {
            match op {
                Op::Register(n) => {
                    let (handle, queue) = outbound_queue(USERS[n], 64);
                    model.insert(USERS[n], handle.id());
                    hub.register(handle.clone());
                    created.push(handle);
                    queues.push(queue);
                }
                Op::Unregister(n) if !created.is_empty() => {
                    let handle = &created[n % created.len()];
                    let removed = hub.unregister(handle);
                    let was_current = model.get(handle.user_id()) == Some(&handle.id());
                    prop_assert_eq!(removed, was_current);
                    if was_current {
                        model.remove(handle.user_id());
                    }
                }
                Op::Unregister(_) => {}
                Op::Send(n) => {
                    let delivered = hub.send_to_user(USERS[n], &Utf8Bytes::from_static("x"));
                    prop_assert_eq!(delivered, model.contains_key(USERS[n]));
                }
            }

            prop_assert_eq!(hub.connection_count(), model.len());
            for user in USERS {
                let live = hub.connection_for(user).map(|h| h.id());
                prop_assert_eq!(live, model.get(user).copied());
            }
        }

        // Only the live connections are still open.
        for handle in &created {
            let live = model.get(handle.user_id()) == Some(&handle.id());
            prop_assert_eq!(handle.is_closed(), !live);
        }
    }
}
