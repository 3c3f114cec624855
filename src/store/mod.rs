//! Remote document store boundary.
//!
//! Two backends implement [`DocumentStore`]: the Firestore REST backend
//! used in production and an in-memory backend for tests and offline demo
//! runs. CRUD operations and the change-feed listener only ever see the
//! trait.

pub mod firestore;
pub mod memory;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::StoreError;
use crate::types::{CustomerRecord, CustomerUpdate};

/// Channel capacity for change-feed subscriptions.
const FEED_CHANNEL_SIZE: usize = 16;

/// One item on a change-feed subscription.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// The entire current contents of the remote collection, not a diff.
    Snapshot(Vec<CustomerRecord>),
    /// A delivery cycle failed. The last-known-good snapshot stays up.
    Lapsed(String),
}

/// Async boundary to the remote collection.
///
/// `create` ignores the record's `id` field and returns the id the store
/// assigned. `subscribe` is push-based: each event carries full collection
/// contents, and the channel closes only on teardown.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create(&self, record: &CustomerRecord) -> Result<String, StoreError>;

    async fn update(&self, id: &str, update: &CustomerUpdate) -> Result<(), StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// One-shot full read, used at startup before the feed is confirmed
    /// live and for manual refresh.
    async fn fetch_all(&self) -> Result<Vec<CustomerRecord>, StoreError>;

    fn subscribe(&self) -> mpsc::Receiver<FeedEvent>;
}

fn feed_channel() -> (mpsc::Sender<FeedEvent>, mpsc::Receiver<FeedEvent>) {
    mpsc::channel(FEED_CHANNEL_SIZE)
}
