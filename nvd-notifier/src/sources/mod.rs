pub mod nvd_feed;

pub use nvd_feed::{Feed, NvdFeed};
