//! In-memory backend with a true push feed.
//!
//! Every mutation broadcasts the full collection contents to all
//! subscribers, so the feed behaves like the SDK's live listener. Used by
//! the test suite and by demo runs without a configured project.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::{CustomerRecord, CustomerUpdate};

use super::{feed_channel, DocumentStore, FeedEvent};

/// Failure injected into the next store call, for exercising notification
/// paths without a network.
#[derive(Debug, Clone, Copy)]
pub enum FailKind {
    Network,
    PermissionDenied,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    docs: RwLock<HashMap<String, CustomerRecord>>,
    subscribers: RwLock<Vec<mpsc::Sender<FeedEvent>>>,
    fail_next: RwLock<Option<FailKind>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with records that already carry ids.
    pub fn with_records(records: Vec<CustomerRecord>) -> Self {
        let store = Self::new();
        {
            let mut docs = store.inner.docs.write();
            for record in records {
                docs.insert(record.id.clone(), record);
            }
        }
        store
    }

    /// Make the next store call fail with the given class.
    pub fn fail_next(&self, kind: FailKind) {
        *self.inner.fail_next.write() = Some(kind);
    }

    fn take_failure(&self) -> Option<StoreError> {
        self.inner.fail_next.write().take().map(|kind| match kind {
            FailKind::Network => StoreError::Network("injected network failure".into()),
            FailKind::PermissionDenied => {
                StoreError::PermissionDenied("injected permission failure".into())
            }
        })
    }

    fn contents(&self) -> Vec<CustomerRecord> {
        self.inner.docs.read().values().cloned().collect()
    }

    /// Push the current contents to every live subscriber.
    async fn broadcast(&self) {
        let snapshot = self.contents();
        let senders: Vec<mpsc::Sender<FeedEvent>> = self.inner.subscribers.read().clone();
        for tx in senders {
            let _ = tx.send(FeedEvent::Snapshot(snapshot.clone())).await;
        }
        self.inner.subscribers.write().retain(|tx| !tx.is_closed());
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, record: &CustomerRecord) -> Result<String, StoreError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        let id = Uuid::new_v4().to_string();
        let mut stored = record.clone();
        stored.id = id.clone();
        self.inner.docs.write().insert(id.clone(), stored);
        self.broadcast().await;
        Ok(id)
    }

    async fn update(&self, id: &str, update: &CustomerUpdate) -> Result<(), StoreError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        {
            let mut docs = self.inner.docs.write();
            let existing = docs
                .get_mut(id)
                .ok_or_else(|| StoreError::Other(format!("no such document: {}", id)))?;
            existing.name = update.name.clone();
            existing.masked_name = update.masked_name.clone();
            existing.salesperson = update.salesperson.clone();
            existing.order_month = update.order_month;
            existing.product_type = update.product_type.clone();
            existing.amount = update.amount;
            existing.updated_at = Some(update.updated_at.clone());
            // id, createdAt, and seq are outside the update field set
        }
        self.broadcast().await;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        self.inner.docs.write().remove(id);
        self.broadcast().await;
        Ok(())
    }

    async fn fetch_all(&self) -> Result<Vec<CustomerRecord>, StoreError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        Ok(self.contents())
    }

    fn subscribe(&self) -> mpsc::Receiver<FeedEvent> {
        let (tx, rx) = feed_channel();
        // Fire immediately with current contents, like the SDK listener
        let _ = tx.try_send(FeedEvent::Snapshot(self.contents()));
        self.inner.subscribers.write().push(tx);
        rx
    }
}
