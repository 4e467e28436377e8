use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A single vulnerability entry as published in the NVD JSON 1.0 feeds.
///
/// The fields needed for filtering and notification are typed. Everything
/// else (impact, configurations, references, problem types) is kept verbatim
/// in `extra`, whose keys serialize in sorted order, so the fingerprint covers
/// the whole entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CveItem {
    pub cve: Cve,
    #[serde(rename = "publishedDate", default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(rename = "lastModifiedDate", default, skip_serializing_if = "Option::is_none")]
    pub last_modified_date: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cve {
    #[serde(rename = "CVE_data_meta")]
    pub data_meta: DataMeta,
    #[serde(default)]
    pub affects: Affects,
    #[serde(default)]
    pub description: Description,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataMeta {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "ASSIGNER", default, skip_serializing_if = "String::is_empty")]
    pub assigner: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Affects {
    #[serde(default)]
    pub vendor: Vendor,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    #[serde(default)]
    pub vendor_data: Vec<VendorData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorData {
    pub vendor_name: String,
    #[serde(default)]
    pub product: Product,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub product_data: Vec<ProductData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductData {
    pub product_name: String,
    #[serde(default)]
    pub version: Version,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Version {
    #[serde(default)]
    pub version_data: Vec<VersionData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionData {
    pub version_value: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version_affected: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Description {
    #[serde(default)]
    pub description_data: Vec<LangString>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LangString {
    pub lang: String,
    pub value: String,
}

impl CveItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            cve: Cve {
                data_meta: DataMeta {
                    id: id.into(),
                    assigner: String::new(),
                },
                affects: Affects::default(),
                description: Description::default(),
                extra: BTreeMap::new(),
            },
            published_date: None,
            last_modified_date: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.cve.description.description_data.push(LangString {
            lang: "en".to_string(),
            value: description.into(),
        });
        self
    }

    /// Adds a (vendor, product) pair, grouping products under an existing
    /// vendor entry when there is one.
    pub fn with_affected(mut self, vendor: &str, product: &str) -> Self {
        let product = ProductData {
            product_name: product.to_string(),
            version: Version::default(),
        };
        let vendors = &mut self.cve.affects.vendor.vendor_data;
        match vendors.iter().position(|v| v.vendor_name == vendor) {
            Some(index) => vendors[index].product.product_data.push(product),
            None => vendors.push(VendorData {
                vendor_name: vendor.to_string(),
                product: Product {
                    product_data: vec![product],
                },
            }),
        }
        self
    }

    pub fn id(&self) -> &str {
        &self.cve.data_meta.id
    }

    /// The English description if present, otherwise the first one.
    pub fn description(&self) -> Option<&str> {
        let data = &self.cve.description.description_data;
        data.iter()
            .find(|d| d.lang == "en")
            .or_else(|| data.first())
            .map(|d| d.value.as_str())
    }

    /// Every (vendor, product) pair this entry declares as affected.
    pub fn affected(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.cve.affects.vendor.vendor_data.iter().flat_map(|vendor| {
            vendor
                .product
                .product_data
                .iter()
                .map(move |product| (vendor.vendor_name.as_str(), product.product_name.as_str()))
        })
    }
}

/// Describes the current state of one upstream feed, as advertised by its
/// `.meta` companion file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedMetadata {
    #[serde(rename = "lastModifiedDate")]
    pub last_modified_date: Option<DateTime<FixedOffset>>,
    pub size: i64,
    #[serde(rename = "zipSize")]
    pub zip_size: i64,
    #[serde(rename = "gzSize")]
    pub gz_size: i64,
    pub sha256: String,
}

impl FeedMetadata {
    pub fn with_sha256(sha256: impl Into<String>) -> Self {
        Self {
            sha256: sha256.into(),
            ..Default::default()
        }
    }
}

/// The items of one feed download, tagged with the fingerprint of the payload
/// they were decoded from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    pub items: Vec<CveItem>,
    pub fingerprint: String,
}

impl RecordSet {
    pub fn new(items: Vec<CveItem>, fingerprint: impl Into<String>) -> Self {
        Self {
            items,
            fingerprint: fingerprint.into(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// What the notification store keeps for every entry that reached all sinks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub fingerprint: String,
    pub item: CveItem,
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
    pub max_feed_size_mb: usize,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "NVD-Notifier/1.0".to_string(),
            timeout_seconds: 60,
            max_retries: 3,
            retry_delay_seconds: 5,
            max_feed_size_mb: 128,
            max_redirects: 5,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("feed exceeds the {limit_mb}MB size limit")]
    FeedTooLarge { limit_mb: usize },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("metadata hash ({metadata}) doesn't match data hash ({data}) for feed {feed}")]
    IntegrityMismatch {
        feed: String,
        metadata: String,
        data: String,
    },

    #[error("store error: {0}")]
    Store(String),

    #[error("error checking for notification of {id}: {source}")]
    NotificationLookup {
        id: String,
        #[source]
        source: Box<NotifierError>,
    },

    #[error("failed to mark {id} as notified: {source}")]
    MarkNotified {
        id: String,
        #[source]
        source: Box<NotifierError>,
    },

    #[error("failed to notify {id} via {sink}: {message}")]
    Delivery {
        id: String,
        sink: String,
        message: String,
    },

    #[error("error creating hash of CVE {id}: {source}")]
    Fingerprint {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("error getting {feed} data: {source}")]
    Feed {
        feed: String,
        #[source]
        source: Box<NotifierError>,
    },

    #[error("feed task failed: {0}")]
    Join(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl NotifierError {
    /// Whether a failed request is worth repeating: connection problems,
    /// timeouts and server-side statuses.
    pub fn is_transient(&self) -> bool {
        match self {
            NotifierError::Http(e) => e.is_connect() || e.is_timeout() || e.is_request() || e.is_body(),
            NotifierError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, NotifierError>;
