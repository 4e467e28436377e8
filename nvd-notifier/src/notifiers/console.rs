use crate::traits::Notifier;
use crate::types::{CveItem, Result};
use async_trait::async_trait;
use tracing::info;

/// Writes one log line per entry.
#[derive(Debug, Default, Clone)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    fn name(&self) -> String {
        "console".to_string()
    }

    async fn notify(&self, item: &CveItem) -> Result<()> {
        let affected: Vec<String> = item
            .affected()
            .map(|(vendor, product)| format!("{}:{}", vendor, product))
            .collect();
        info!(
            cve_id = item.id(),
            affected = %affected.join(","),
            description = item.description().unwrap_or(""),
            "New vulnerability"
        );
        Ok(())
    }
}
