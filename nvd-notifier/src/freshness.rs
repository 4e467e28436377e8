use crate::traits::{DataFetcher, FingerprintStore, MetadataFetcher};
use crate::types::{FeedMetadata, NotifierError, RecordSet, Result};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Decides whether one feed has to be downloaded, and downloads it if so.
///
/// The stored fingerprint only moves forward after a download whose payload
/// hash matches the hash the metadata advertised.
#[derive(Clone)]
pub struct FreshnessCheck {
    feed: String,
    metadata: Arc<dyn MetadataFetcher>,
    data: Arc<dyn DataFetcher>,
    store: Arc<dyn FingerprintStore>,
}

impl FreshnessCheck {
    pub fn new(
        feed: impl Into<String>,
        metadata: Arc<dyn MetadataFetcher>,
        data: Arc<dyn DataFetcher>,
        store: Arc<dyn FingerprintStore>,
    ) -> Self {
        Self {
            feed: feed.into(),
            metadata,
            data,
            store,
        }
    }

    pub fn feed(&self) -> &str {
        &self.feed
    }

    pub async fn check(&self) -> Result<RecordSet> {
        let (current, updated) = self.has_been_updated().await?;
        info!(feed = %self.feed, updated, "Checked feed for updates");
        if !updated {
            return Ok(RecordSet::empty());
        }

        let records = self.data.fetch_data().await?;
        if records.fingerprint != current.sha256 {
            error!(
                feed = %self.feed,
                metadata = %current.sha256,
                data = %records.fingerprint,
                "Payload hash does not match metadata"
            );
            return Err(NotifierError::IntegrityMismatch {
                feed: self.feed.clone(),
                metadata: current.sha256,
                data: records.fingerprint,
            });
        }

        self.store.put_fingerprint(&self.feed, &current).await?;
        info!(feed = %self.feed, item_count = records.items.len(), "Fetched feed data");
        Ok(records)
    }

    async fn has_been_updated(&self) -> Result<(FeedMetadata, bool)> {
        let previous = self.store.get_fingerprint(&self.feed).await.map_err(|e| {
            error!(feed = %self.feed, error = %e, "Failed to get last metadata");
            e
        })?;
        let current = self.metadata.fetch_metadata().await.map_err(|e| {
            error!(feed = %self.feed, error = %e, "Failed to get current metadata");
            e
        })?;

        debug!(
            feed = %self.feed,
            previous = ?previous.as_ref().map(|m| m.sha256.as_str()),
            current = %current.sha256,
            "Previous and current hashes acquired"
        );

        let updated = match &previous {
            Some(previous) => previous.sha256 != current.sha256,
            None => true,
        };
        Ok((current, updated))
    }
}
