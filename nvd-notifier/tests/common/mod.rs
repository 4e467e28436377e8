#![allow(dead_code)]

use async_trait::async_trait;
use nvd_notifier::{
    CveItem, DataFetcher, FeedMetadata, FingerprintStore, FreshnessCheck, MemoryStore, MetadataFetcher,
    NotificationStore, Notifier, NotifierError, RecordSet, Result,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn mock_cve(id: &str, vendor: &str, product: &str) -> CveItem {
    CveItem::new(id)
        .with_description(format!("{} affects {} {}", id, vendor, product))
        .with_affected(vendor, product)
}

/// A feed whose metadata and payload are fixed, counting every download.
pub struct StaticFeed {
    metadata: Mutex<Option<FeedMetadata>>,
    records: Mutex<Option<RecordSet>>,
    metadata_calls: AtomicUsize,
    data_calls: AtomicUsize,
}

impl StaticFeed {
    /// Metadata advertising `sha256`, and a payload that hashes to the same value.
    pub fn new(sha256: &str, items: Vec<CveItem>) -> Self {
        Self::with_payload_hash(sha256, sha256, items)
    }

    /// Metadata advertising `advertised`, and a payload that hashes to `actual`.
    pub fn with_payload_hash(advertised: &str, actual: &str, items: Vec<CveItem>) -> Self {
        Self {
            metadata: Mutex::new(Some(FeedMetadata::with_sha256(advertised))),
            records: Mutex::new(Some(RecordSet::new(items, actual))),
            metadata_calls: AtomicUsize::new(0),
            data_calls: AtomicUsize::new(0),
        }
    }

    /// Every metadata request fails.
    pub fn unreachable() -> Self {
        Self {
            metadata: Mutex::new(None),
            records: Mutex::new(None),
            metadata_calls: AtomicUsize::new(0),
            data_calls: AtomicUsize::new(0),
        }
    }

    pub fn data_calls(&self) -> usize {
        self.data_calls.load(Ordering::SeqCst)
    }

    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataFetcher for StaticFeed {
    async fn fetch_metadata(&self) -> Result<FeedMetadata> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        self.metadata
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| NotifierError::Transport("metadata unavailable".to_string()))
    }
}

#[async_trait]
impl DataFetcher for StaticFeed {
    async fn fetch_data(&self) -> Result<RecordSet> {
        self.data_calls.fetch_add(1, Ordering::SeqCst);
        self.records
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| NotifierError::Transport("data unavailable".to_string()))
    }
}

/// Records the id of every delivered entry, optionally failing for one id.
///
/// Sinks sharing a journal append `name:id` to it, which shows the order in
/// which several sinks were invoked.
pub struct RecordingNotifier {
    pub delivered: Mutex<Vec<String>>,
    name: String,
    fail_on: Option<String>,
    journal: Option<Arc<Mutex<Vec<String>>>>,
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            name: "recording".to_string(),
            fail_on: None,
            journal: None,
        }
    }
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(id: &str) -> Self {
        Self {
            fail_on: Some(id.to_string()),
            ..Default::default()
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_journal(mut self, journal: &Arc<Mutex<Vec<String>>>) -> Self {
        self.journal = Some(journal.clone());
        self
    }

    pub fn ids(&self) -> Vec<String> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> String {
        self.name.clone()
    }

    async fn notify(&self, item: &CveItem) -> Result<()> {
        if let Some(journal) = &self.journal {
            journal.lock().unwrap().push(format!("{}:{}", self.name, item.id()));
        }
        if self.fail_on.as_deref() == Some(item.id()) {
            return Err(NotifierError::Transport("webhook returned 500".to_string()));
        }
        self.delivered.lock().unwrap().push(item.id().to_string());
        Ok(())
    }
}

/// Wraps a [`MemoryStore`], counting writes and optionally failing reads.
#[derive(Default)]
pub struct CountingStore {
    pub inner: MemoryStore,
    pub fingerprint_writes: AtomicUsize,
    pub notification_writes: AtomicUsize,
    fail_reads_for: Option<String>,
    fail_lookups: bool,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_reads_for(feed: &str) -> Self {
        Self {
            fail_reads_for: Some(feed.to_string()),
            ..Default::default()
        }
    }

    pub fn failing_lookups() -> Self {
        Self {
            fail_lookups: true,
            ..Default::default()
        }
    }

    pub fn writes(&self) -> usize {
        self.fingerprint_writes.load(Ordering::SeqCst) + self.notification_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FingerprintStore for CountingStore {
    async fn get_fingerprint(&self, feed: &str) -> Result<Option<FeedMetadata>> {
        if self.fail_reads_for.as_deref() == Some(feed) {
            return Err(NotifierError::Store("unknown database err".to_string()));
        }
        self.inner.get_fingerprint(feed).await
    }

    async fn put_fingerprint(&self, feed: &str, metadata: &FeedMetadata) -> Result<()> {
        self.fingerprint_writes.fetch_add(1, Ordering::SeqCst);
        self.inner.put_fingerprint(feed, metadata).await
    }
}

#[async_trait]
impl NotificationStore for CountingStore {
    async fn is_notified(&self, item: &CveItem) -> Result<bool> {
        if self.fail_lookups {
            return Err(NotifierError::Store("unknown database err".to_string()));
        }
        self.inner.is_notified(item).await
    }

    async fn mark_notified(&self, item: &CveItem) -> Result<()> {
        self.notification_writes.fetch_add(1, Ordering::SeqCst);
        self.inner.mark_notified(item).await
    }
}

pub fn freshness(feed: &str, source: &Arc<StaticFeed>, store: &Arc<CountingStore>) -> FreshnessCheck {
    FreshnessCheck::new(feed, source.clone(), source.clone(), store.clone())
}
