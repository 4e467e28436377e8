use crate::checker::Checker;
use crate::filter::{self, FilterChain, VendorProductFilter};
use crate::freshness::FreshnessCheck;
use crate::sources::{Feed, NvdFeed};
use crate::state::MemoryStore;
use crate::traits::Notifier;
use crate::types::{FetchConfig, NotifierError, Result};
use crate::Fetcher;
use std::sync::Arc;
use url::Url;

/// Where one feed's metadata and payload are downloaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEndpoints {
    pub metadata_url: String,
    pub data_url: String,
}

#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub recent: FeedEndpoints,
    pub modified: FeedEndpoints,
    pub fetch: FetchConfig,
    pub include: Vec<VendorProductFilter>,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        let mut include = filter::golang();
        include.extend(filter::nodejs());
        Self {
            recent: Feed::Recent.default_endpoints(),
            modified: Feed::Modified.default_endpoints(),
            fetch: FetchConfig::default(),
            include,
        }
    }
}

impl NotifierConfig {
    /// Checks every setting and reports all problems at once.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        for (name, url) in [
            ("recent metadata URL", &self.recent.metadata_url),
            ("recent data URL", &self.recent.data_url),
            ("modified metadata URL", &self.modified.metadata_url),
            ("modified data URL", &self.modified.data_url),
        ] {
            if !is_valid_feed_url(url) {
                errors.push(format!("{} '{}' must be an http(s) URL", name, url));
            }
        }
        if self.include.is_empty() {
            errors.push("at least one include filter is required".to_string());
        }
        if self.fetch.timeout_seconds == 0 {
            errors.push("timeout must be greater than zero".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(NotifierError::Config(errors.join(", ")))
        }
    }

    /// Wires both NVD feeds, the given store and sinks into a [`Checker`].
    pub fn build_checker(&self, store: Arc<MemoryStore>, sinks: Vec<Arc<dyn Notifier>>) -> Result<Checker> {
        self.validate()?;

        let fetcher = Arc::new(Fetcher::new(self.fetch.clone())?);
        let recent = Arc::new(NvdFeed::new(Feed::Recent, self.recent.clone(), fetcher.clone()));
        let modified = Arc::new(NvdFeed::new(Feed::Modified, self.modified.clone(), fetcher));

        let mut builder = Checker::builder()
            .recent(FreshnessCheck::new(
                Feed::Recent.name(),
                recent.clone(),
                recent,
                store.clone(),
            ))
            .modified(FreshnessCheck::new(
                Feed::Modified.name(),
                modified.clone(),
                modified,
                store.clone(),
            ))
            .filters(FilterChain::from(self.include.clone()))
            .notification_store(store);

        for sink in sinks {
            builder = builder.notifier(sink);
        }
        builder.build()
    }
}

/// Parses a list of `vendor:product` include filters.
pub fn parse_include(pairs: &[String]) -> Result<Vec<VendorProductFilter>> {
    pairs.iter().map(|pair| VendorProductFilter::parse(pair)).collect()
}

pub fn is_valid_feed_url(url_str: &str) -> bool {
    match Url::parse(url_str) {
        Ok(url) => url.scheme() == "http" || url.scheme() == "https",
        Err(_) => false,
    }
}
