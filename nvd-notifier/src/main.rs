use anyhow::{Context, Result};
use clap::Parser;
use nvd_notifier::config::parse_include;
use nvd_notifier::{ConsoleNotifier, FeedEndpoints, FetchConfig, MemoryStore, NotifierConfig, Notifier};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "nvd-notifier",
    about = "Check the NVD recent and modified feeds and notify about new matching CVEs"
)]
struct Cli {
    /// Metadata file of the "recent" feed.
    #[arg(
        long,
        env = "NVD_RECENT_META_URL",
        default_value = "https://nvd.nist.gov/feeds/json/cve/1.0/nvdcve-1.0-recent.meta"
    )]
    recent_meta_url: String,

    /// JSON payload of the "recent" feed, plain or gzipped.
    #[arg(
        long,
        env = "NVD_RECENT_DATA_URL",
        default_value = "https://nvd.nist.gov/feeds/json/cve/1.0/nvdcve-1.0-recent.json.gz"
    )]
    recent_data_url: String,

    /// Metadata file of the "modified" feed.
    #[arg(
        long,
        env = "NVD_MODIFIED_META_URL",
        default_value = "https://nvd.nist.gov/feeds/json/cve/1.0/nvdcve-1.0-modified.meta"
    )]
    modified_meta_url: String,

    /// JSON payload of the "modified" feed.
    #[arg(
        long,
        env = "NVD_MODIFIED_DATA_URL",
        default_value = "https://nvd.nist.gov/feeds/json/cve/1.0/nvdcve-1.0-modified.json.gz"
    )]
    modified_data_url: String,

    /// vendor:product pairs to notify about. An entry matching any of them is included.
    #[arg(
        long,
        env = "NVD_INCLUDE",
        value_delimiter = ',',
        default_value = "golang:go,nodejs:node.js,nodejs:nodejs"
    )]
    include: Vec<String>,

    #[arg(long, env = "NVD_USER_AGENT", default_value = "NVD-Notifier/1.0")]
    user_agent: String,

    #[arg(long, env = "NVD_TIMEOUT_SECONDS", default_value_t = 60)]
    timeout_seconds: u64,

    #[arg(long, env = "NVD_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    #[arg(long, env = "NVD_RETRY_DELAY_SECONDS", default_value_t = 5)]
    retry_delay_seconds: u64,

    #[arg(long, env = "NVD_MAX_FEED_SIZE_MB", default_value_t = 128)]
    max_feed_size_mb: usize,

    /// One of trace, debug, info, warn, error.
    #[arg(long, env = "NVD_LOG_LEVEL", default_value = "info")]
    log_level: tracing::Level,
}

impl Cli {
    fn into_config(self) -> Result<NotifierConfig> {
        let include = parse_include(&self.include).context("invalid include filter")?;
        Ok(NotifierConfig {
            recent: FeedEndpoints {
                metadata_url: self.recent_meta_url,
                data_url: self.recent_data_url,
            },
            modified: FeedEndpoints {
                metadata_url: self.modified_meta_url,
                data_url: self.modified_data_url,
            },
            fetch: FetchConfig {
                user_agent: self.user_agent,
                timeout_seconds: self.timeout_seconds,
                max_retries: self.max_retries,
                retry_delay_seconds: self.retry_delay_seconds,
                max_feed_size_mb: self.max_feed_size_mb,
                ..FetchConfig::default()
            },
            include,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt().with_max_level(cli.log_level).init();

    let config = cli.into_config()?;
    let store = Arc::new(MemoryStore::new());
    let sinks: Vec<Arc<dyn Notifier>> = vec![Arc::new(ConsoleNotifier::new())];
    let checker = config
        .build_checker(store, sinks)
        .context("failed to build checker")?;

    info!("Starting NVD check with {} include filters", config.include.len());
    match checker.run().await {
        Ok(items) => {
            info!(item_count = items.len(), "complete");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "check failed");
            Err(e.into())
        }
    }
}
