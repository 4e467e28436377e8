use crate::types::{FetchConfig, NotifierError, Result};
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use reqwest::{Client, Response};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// HTTP client for the NVD feed files, with retries on transient failures.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let bytes = self.fetch_bytes(url).await?;
        String::from_utf8(bytes).map_err(|e| NotifierError::Parse(format!("{} is not valid UTF-8: {}", url, e)))
    }

    /// Downloads the body of `url`, retrying with exponential backoff.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let start_time = Instant::now();
        debug!("Fetching: {}", url);

        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: Duration::from_secs(self.config.retry_delay_seconds),
            initial_interval: Duration::from_secs(self.config.retry_delay_seconds),
            max_interval: Duration::from_secs(self.config.retry_delay_seconds * 32),
            multiplier: 2.0,
            max_elapsed_time: Some(Duration::from_secs(self.config.retry_delay_seconds * 60)),
            ..Default::default()
        };

        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match self.fetch_once(url).await {
                Ok(body) => {
                    info!(
                        "Fetched {} ({} bytes in {}ms)",
                        url,
                        body.len(),
                        start_time.elapsed().as_millis()
                    );
                    return Ok(body);
                }
                Err(e) if !e.is_transient() => {
                    error!("Giving up on {}: {}", url, e);
                    return Err(e);
                }
                Err(e) => {
                    last_error = Some(e);
                    if attempt < self.config.max_retries {
                        if let Some(delay) = backoff.next_backoff() {
                            warn!("Attempt {} failed for {}, retrying in {:?}", attempt + 1, url, delay);
                            tokio::time::sleep(delay).await;
                            continue;
                        }
                    }
                    break;
                }
            }
        }

        error!("Failed to fetch after {} attempts: {}", self.config.max_retries + 1, url);
        Err(last_error.unwrap_or_else(|| NotifierError::Transport(format!("failed to fetch {}", url))))
    }

    async fn fetch_once(&self, url: &str) -> Result<Vec<u8>> {
        let mut response: Response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(NotifierError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let limit_mb = self.config.max_feed_size_mb;
        let limit_bytes = limit_mb.saturating_mul(1024 * 1024);
        let too_large = || NotifierError::FeedTooLarge { limit_mb };

        if let Some(content_length) = response.content_length() {
            if content_length > limit_bytes as u64 {
                return Err(too_large());
            }
        }

        // Chunked and auto-decompressed bodies carry no usable length header.
        let mut body = Vec::with_capacity(response.content_length().unwrap_or(0) as usize);
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > limit_bytes {
                warn!("Aborting {} after {} bytes, limit is {}MB", url, body.len() + chunk.len(), limit_mb);
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}
