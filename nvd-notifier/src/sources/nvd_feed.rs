use crate::config::FeedEndpoints;
use crate::parser::{decompress_payload, parse_feed_data, parse_metadata};
use crate::traits::{DataFetcher, MetadataFetcher};
use crate::types::{FeedMetadata, RecordSet, Result};
use crate::Fetcher;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// The two NVD feeds the checker watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    /// Entries added in the last eight days.
    Recent,
    /// Entries modified in the last eight days.
    Modified,
}

impl Feed {
    pub fn name(&self) -> &'static str {
        match self {
            Feed::Recent => "recent",
            Feed::Modified => "modified",
        }
    }

    pub fn default_endpoints(&self) -> FeedEndpoints {
        let base = "https://nvd.nist.gov/feeds/json/cve/1.0";
        FeedEndpoints {
            metadata_url: format!("{}/nvdcve-1.0-{}.meta", base, self.name()),
            data_url: format!("{}/nvdcve-1.0-{}.json.gz", base, self.name()),
        }
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One NVD feed reachable over HTTP: a `.meta` file and the gzipped JSON
/// payload it describes.
pub struct NvdFeed {
    pub feed: Feed,
    pub endpoints: FeedEndpoints,
    fetcher: Arc<Fetcher>,
}

impl NvdFeed {
    pub fn new(feed: Feed, endpoints: FeedEndpoints, fetcher: Arc<Fetcher>) -> Self {
        Self {
            feed,
            endpoints,
            fetcher,
        }
    }

    pub fn recent(fetcher: Arc<Fetcher>) -> Self {
        Self::new(Feed::Recent, Feed::Recent.default_endpoints(), fetcher)
    }

    pub fn modified(fetcher: Arc<Fetcher>) -> Self {
        Self::new(Feed::Modified, Feed::Modified.default_endpoints(), fetcher)
    }
}

#[async_trait]
impl MetadataFetcher for NvdFeed {
    async fn fetch_metadata(&self) -> Result<FeedMetadata> {
        let content = self.fetcher.fetch_text(&self.endpoints.metadata_url).await?;
        parse_metadata(&content)
    }
}

#[async_trait]
impl DataFetcher for NvdFeed {
    async fn fetch_data(&self) -> Result<RecordSet> {
        let payload = self.fetcher.fetch_bytes(&self.endpoints.data_url).await?;
        let payload = decompress_payload(payload, self.fetcher.config().max_feed_size_mb)?;
        let records = parse_feed_data(&payload)?;
        info!(feed = %self.feed, item_count = records.items.len(), "Downloaded feed payload");
        Ok(records)
    }
}
