pub mod types;
pub mod fingerprint;
pub mod traits;
pub mod filter;
pub mod processing;
pub mod freshness;
pub mod fanout;
pub mod checker;
pub mod fetcher;
pub mod parser;
pub mod sources;
pub mod state;
pub mod notifiers;
pub mod config;

pub use types::*;
pub use checker::{Checker, CheckerBuilder};
pub use config::{FeedEndpoints, NotifierConfig};
pub use fanout::NotifierFanout;
pub use fetcher::Fetcher;
pub use filter::{FilterChain, VendorProductFilter};
pub use freshness::FreshnessCheck;
pub use notifiers::ConsoleNotifier;
pub use sources::{Feed, NvdFeed};
pub use state::MemoryStore;
pub use traits::{DataFetcher, FingerprintStore, IncludeFilter, MetadataFetcher, NotificationStore, Notifier};
