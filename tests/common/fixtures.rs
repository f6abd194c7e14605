//! Test fixtures
//!
//! Realtime contexts and full apps over a seeded [`MemoryStore`].
//!
//! Seeded groups:
//! - `team`: `alice`, `bob`, `carol`
//! - `pair`: `alice`, `bob`

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::task::JoinHandle;

use chathub::backend::auth::create_token;
use chathub::backend::realtime::{EventBus, Realtime};
use chathub::backend::routes::create_router;
use chathub::backend::server::AppState;
use chathub::backend::store::MemoryStore;
use chathub::shared::HubConfig;

use super::transport::{fake_transport, FakePeer};

pub const TEST_SECRET: &str = "test-secret";

/// In-memory store with the seeded groups.
pub async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.add_group("team", ["alice", "bob", "carol"]).await;
    store.add_group("pair", ["alice", "bob"]).await;
    store
}

/// Realtime context with default tunables.
pub async fn test_realtime() -> (Realtime, Arc<MemoryStore>) {
    test_realtime_with(HubConfig::default()).await
}

pub async fn test_realtime_with(config: HubConfig) -> (Realtime, Arc<MemoryStore>) {
    let store = seeded_store().await;
    let realtime = Realtime::new(config, store.clone(), EventBus::new()).expect("valid hub config");
    (realtime, store)
}

/// Connect `user_id` over a fake transport.
pub async fn connect(realtime: &Realtime, user_id: &str) -> (FakePeer, JoinHandle<()>) {
    let (peer, stream, sink) = fake_transport();
    let task = realtime.connect(user_id, stream, sink).await;
    (peer, task)
}

/// Full router over a seeded store, plus its state.
pub async fn test_app() -> (Router, AppState, Arc<MemoryStore>) {
    let store = seeded_store().await;
    let state = AppState::new(store.clone(), HubConfig::default(), TEST_SECRET).expect("valid hub config");
    (create_router(state.clone()), state, store)
}

/// `Authorization` header value for `user_id`.
pub fn bearer(user_id: &str) -> String {
    let token = create_token(user_id, None, TEST_SECRET, chrono::Duration::hours(1))
        .expect("Failed to create test token");
    format!("Bearer {token}")
}

/// Poll `condition` until it holds, failing after two seconds.
pub async fn eventually<F>(what: &str, condition: F)
where
    F: Fn() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        if tokio::time::Instant::now() >= deadline {
            panic!("timed out waiting for {what}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
