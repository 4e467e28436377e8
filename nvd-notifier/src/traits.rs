use crate::types::{CveItem, FeedMetadata, RecordSet, Result};
use async_trait::async_trait;

/// Reads the advertised state of one feed without downloading its data.
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    async fn fetch_metadata(&self) -> Result<FeedMetadata>;
}

/// Downloads the full contents of one feed.
///
/// The returned set carries the fingerprint of the payload actually received,
/// which is checked against the advertised metadata before anything is stored.
#[async_trait]
pub trait DataFetcher: Send + Sync {
    async fn fetch_data(&self) -> Result<RecordSet>;
}

/// Remembers the last verified metadata per feed.
#[async_trait]
pub trait FingerprintStore: Send + Sync {
    /// `Ok(None)` means the feed has never been fetched successfully.
    async fn get_fingerprint(&self, feed: &str) -> Result<Option<FeedMetadata>>;

    async fn put_fingerprint(&self, feed: &str, metadata: &FeedMetadata) -> Result<()>;
}

/// Remembers which entries have already been delivered, keyed by fingerprint.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn is_notified(&self, item: &CveItem) -> Result<bool>;

    async fn mark_notified(&self, item: &CveItem) -> Result<()>;
}

/// A delivery target for newly seen entries.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Human-readable name used in logs and errors
    fn name(&self) -> String;

    async fn notify(&self, item: &CveItem) -> Result<()>;
}

/// Decides whether an entry is of interest.
pub trait IncludeFilter: Send + Sync {
    fn include(&self, item: &CveItem) -> bool;
}

impl<F> IncludeFilter for F
where
    F: Fn(&CveItem) -> bool + Send + Sync,
{
    fn include(&self, item: &CveItem) -> bool {
        self(item)
    }
}
