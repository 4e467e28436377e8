use crate::traits::{NotificationStore, Notifier};
use crate::types::{CveItem, NotifierError, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Delivers entries to every registered sink, then records them as notified.
///
/// Delivery is at-least-once: an entry is marked only after all sinks accepted
/// it, so a crash in between repeats the notification on the next cycle. The
/// first sink failure stops the run; entries delivered before it stay marked.
#[derive(Default, Clone)]
pub struct NotifierFanout {
    sinks: Vec<Arc<dyn Notifier>>,
}

impl NotifierFanout {
    pub fn add_sink(&mut self, sink: Arc<dyn Notifier>) {
        self.sinks.push(sink);
    }

    pub async fn deliver(&self, items: Vec<CveItem>, store: &dyn NotificationStore) -> Result<Vec<CveItem>> {
        let mut delivered = Vec::with_capacity(items.len());

        for item in items {
            for sink in &self.sinks {
                sink.notify(&item).await.map_err(|e| NotifierError::Delivery {
                    id: item.id().to_string(),
                    sink: sink.name(),
                    message: e.to_string(),
                })?;
                debug!(cve_id = item.id(), sink = %sink.name(), "Delivered");
            }

            store
                .mark_notified(&item)
                .await
                .map_err(|e| NotifierError::MarkNotified {
                    id: item.id().to_string(),
                    source: Box::new(e),
                })?;
            info!(cve_id = item.id(), "Notified");
            delivered.push(item);
        }

        Ok(delivered)
    }
}
