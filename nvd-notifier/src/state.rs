use crate::traits::{FingerprintStore, NotificationStore};
use crate::types::{CveItem, FeedMetadata, NotificationRecord, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// In-process store for feed fingerprints and notification records.
///
/// State lives as long as the value does, so a fresh process starts with no
/// prior state and fetches both feeds.
#[derive(Default)]
pub struct MemoryStore {
    fingerprints: RwLock<HashMap<String, FeedMetadata>>,
    notifications: RwLock<HashMap<String, NotificationRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the stored metadata for a feed.
    pub async fn with_fingerprint(self, feed: &str, metadata: FeedMetadata) -> Self {
        self.fingerprints.write().await.insert(feed.to_string(), metadata);
        self
    }

    pub async fn stored_fingerprint(&self, feed: &str) -> Option<FeedMetadata> {
        self.fingerprints.read().await.get(feed).cloned()
    }

    pub async fn notification_count(&self) -> usize {
        self.notifications.read().await.len()
    }

    pub async fn notification_records(&self) -> Vec<NotificationRecord> {
        self.notifications.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl FingerprintStore for MemoryStore {
    async fn get_fingerprint(&self, feed: &str) -> Result<Option<FeedMetadata>> {
        Ok(self.fingerprints.read().await.get(feed).cloned())
    }

    async fn put_fingerprint(&self, feed: &str, metadata: &FeedMetadata) -> Result<()> {
        debug!(feed, sha256 = %metadata.sha256, "Storing feed metadata");
        self.fingerprints
            .write()
            .await
            .insert(feed.to_string(), metadata.clone());
        Ok(())
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn is_notified(&self, item: &CveItem) -> Result<bool> {
        let fingerprint = item.fingerprint()?;
        Ok(self.notifications.read().await.contains_key(&fingerprint))
    }

    async fn mark_notified(&self, item: &CveItem) -> Result<()> {
        let fingerprint = item.fingerprint()?;
        self.notifications.write().await.insert(
            fingerprint.clone(),
            NotificationRecord {
                fingerprint,
                item: item.clone(),
            },
        );
        Ok(())
    }
}
