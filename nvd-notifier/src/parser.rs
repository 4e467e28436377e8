use crate::fingerprint::sha256_hex;
use crate::types::{CveItem, FeedMetadata, NotifierError, RecordSet, Result};
use chrono::DateTime;
use flate2::read::GzDecoder;
use serde::Deserialize;
use std::io::Read;
use tracing::debug;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Top level of an NVD JSON 1.0 feed file. Header fields are not needed.
#[derive(Debug, Deserialize)]
struct FeedPayload {
    #[serde(rename = "CVE_Items", default)]
    cve_items: Vec<CveItem>,
}

/// Parses an NVD `.meta` file.
///
/// ```text
/// lastModifiedDate:2018-11-17T14:01:52-05:00
/// size:13869565
/// zipSize:601309
/// gzSize:601165
/// sha256:A19EC051954B8B6EB49BB7CB911A2B194D729D409EBC2F9DD21B93E8B0418803
/// ```
///
/// Each line is split at its first colon. Lines without one and unknown keys
/// are skipped.
pub fn parse_metadata(content: &str) -> Result<FeedMetadata> {
    let mut metadata = FeedMetadata::default();

    for line in content.lines() {
        let line = line.trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };

        match key {
            "lastModifiedDate" => {
                let parsed = DateTime::parse_from_rfc3339(value).map_err(|e| {
                    NotifierError::Parse(format!("could not parse '{}' as time: {}", value, e))
                })?;
                metadata.last_modified_date = Some(parsed);
            }
            "size" => metadata.size = parse_size(key, value)?,
            "zipSize" => metadata.zip_size = parse_size(key, value)?,
            "gzSize" => metadata.gz_size = parse_size(key, value)?,
            "sha256" => metadata.sha256 = value.to_string(),
            _ => debug!("Ignoring metadata key {}", key),
        }
    }

    Ok(metadata)
}

fn parse_size(key: &str, value: &str) -> Result<i64> {
    value
        .parse::<i64>()
        .map_err(|e| NotifierError::Parse(format!("could not parse {} '{}' as int64: {}", key, value, e)))
}

/// Inflates a `.json.gz` download, refusing to produce more than `limit_mb`.
///
/// Bytes without the gzip magic are returned as they are: the transport may
/// already have decoded a gzip `Content-Encoding`.
pub fn decompress_payload(payload: Vec<u8>, limit_mb: usize) -> Result<Vec<u8>> {
    if !payload.starts_with(&GZIP_MAGIC) {
        return Ok(payload);
    }

    let limit_bytes = limit_mb.saturating_mul(1024 * 1024) as u64;
    let mut decoded = Vec::new();
    GzDecoder::new(payload.as_slice())
        .take(limit_bytes.saturating_add(1))
        .read_to_end(&mut decoded)
        .map_err(|e| NotifierError::Parse(format!("failed to decompress feed payload: {}", e)))?;

    if decoded.len() as u64 > limit_bytes {
        return Err(NotifierError::FeedTooLarge { limit_mb });
    }
    debug!("Inflated {} byte payload to {} bytes", payload.len(), decoded.len());
    Ok(decoded)
}

/// Decodes an uncompressed feed payload and tags it with the hash of its bytes,
/// the same hash the `.meta` file advertises.
pub fn parse_feed_data(payload: &[u8]) -> Result<RecordSet> {
    let fingerprint = sha256_hex(payload);
    let feed: FeedPayload = serde_json::from_slice(payload)
        .map_err(|e| NotifierError::Parse(format!("failed to decode feed payload: {}", e)))?;
    debug!("Decoded {} items from {} byte payload", feed.cve_items.len(), payload.len());
    Ok(RecordSet::new(feed.cve_items, fingerprint))
}
