use crate::traits::NotificationStore;
use crate::types::{CveItem, NotifierError, Result};
use std::collections::HashSet;
use tracing::debug;

/// Collapses entries with identical content.
///
/// Stable: the first occurrence of each fingerprint wins. A fingerprint
/// failure aborts the whole pass and no partial output is returned.
pub fn deduplicate(items: Vec<CveItem>) -> Result<Vec<CveItem>> {
    let mut seen = HashSet::with_capacity(items.len());
    let mut output = Vec::with_capacity(items.len());

    for item in items {
        let fingerprint = item.fingerprint()?;
        if seen.insert(fingerprint) {
            output.push(item);
        } else {
            debug!(cve_id = item.id(), "Dropping duplicate item");
        }
    }

    Ok(output)
}

/// Drops every entry the store reports as already notified.
///
/// Any lookup failure aborts the whole gate.
pub async fn remove_notified(items: Vec<CveItem>, store: &dyn NotificationStore) -> Result<Vec<CveItem>> {
    let mut output = Vec::with_capacity(items.len());

    for item in items {
        let notified = store
            .is_notified(&item)
            .await
            .map_err(|e| NotifierError::NotificationLookup {
                id: item.id().to_string(),
                source: Box::new(e),
            })?;

        if notified {
            debug!(cve_id = item.id(), "Already notified, skipping");
            continue;
        }
        output.push(item);
    }

    Ok(output)
}
