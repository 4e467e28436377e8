use crate::traits::IncludeFilter;
use crate::types::{CveItem, NotifierError, Result};
use tracing::debug;

/// Matches entries that list an exact (vendor, product) pair as affected.
///
/// Both fields are compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorProductFilter {
    pub vendor: String,
    pub product: String,
}

impl VendorProductFilter {
    pub fn new(vendor: impl Into<String>, product: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            product: product.into(),
        }
    }

    /// Parses a `vendor:product` pair, e.g. `golang:go`.
    pub fn parse(pair: &str) -> Result<Self> {
        let (vendor, product) = pair
            .split_once(':')
            .ok_or_else(|| NotifierError::Config(format!("include filter '{}' must be vendor:product", pair)))?;
        let (vendor, product) = (vendor.trim(), product.trim());
        if vendor.is_empty() || product.is_empty() {
            return Err(NotifierError::Config(format!(
                "include filter '{}' has an empty vendor or product",
                pair
            )));
        }
        Ok(Self::new(vendor, product))
    }
}

impl IncludeFilter for VendorProductFilter {
    fn include(&self, item: &CveItem) -> bool {
        item.affected()
            .any(|(vendor, product)| vendor == self.vendor && product == self.product)
    }
}

/// The Go toolchain.
pub fn golang() -> Vec<VendorProductFilter> {
    vec![VendorProductFilter::new("golang", "go")]
}

/// Node.js, which the NVD lists under two product names.
pub fn nodejs() -> Vec<VendorProductFilter> {
    vec![
        VendorProductFilter::new("nodejs", "node.js"),
        VendorProductFilter::new("nodejs", "nodejs"),
    ]
}

/// A set of independent predicates combined with logical OR.
///
/// An empty chain matches nothing.
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn IncludeFilter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: impl IncludeFilter + 'static) -> Self {
        self.add_filter(filter);
        self
    }

    pub fn add_filter(&mut self, filter: impl IncludeFilter + 'static) {
        self.filters.push(Box::new(filter));
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn matches(&self, item: &CveItem) -> bool {
        self.filters.iter().any(|f| f.include(item))
    }

    /// Keeps the matching entries, preserving their order.
    pub fn apply(&self, items: Vec<CveItem>) -> Vec<CveItem> {
        let before = items.len();
        let kept: Vec<CveItem> = items.into_iter().filter(|item| self.matches(item)).collect();
        debug!("Filter chain kept {}/{} items", kept.len(), before);
        kept
    }
}

impl From<Vec<VendorProductFilter>> for FilterChain {
    fn from(filters: Vec<VendorProductFilter>) -> Self {
        filters
            .into_iter()
            .fold(FilterChain::new(), |chain, filter| chain.with_filter(filter))
    }
}
