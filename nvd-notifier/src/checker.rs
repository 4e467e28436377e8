use crate::fanout::NotifierFanout;
use crate::filter::FilterChain;
use crate::freshness::FreshnessCheck;
use crate::processing::{deduplicate, remove_notified};
use crate::traits::{IncludeFilter, NotificationStore, Notifier};
use crate::types::{CveItem, NotifierError, RecordSet, Result};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Checks both NVD feeds and notifies about new entries of interest.
///
/// One call to [`Checker::run`] is one cycle: both feeds are checked
/// concurrently, their records merged (recent first), filtered, deduplicated,
/// gated against the notification store and finally delivered.
pub struct Checker {
    recent: FreshnessCheck,
    modified: FreshnessCheck,
    filters: FilterChain,
    notifications: Arc<dyn NotificationStore>,
    fanout: NotifierFanout,
}

impl Checker {
    pub fn builder() -> CheckerBuilder {
        CheckerBuilder::default()
    }

    /// Runs one cycle and returns the entries notified during it.
    pub async fn run(&self) -> Result<Vec<CveItem>> {
        let span = info_span!("cycle", cycle_id = %Uuid::new_v4());
        self.run_cycle().instrument(span).await
    }

    async fn run_cycle(&self) -> Result<Vec<CveItem>> {
        let recent_task = spawn_check(self.recent.clone());
        let modified_task = spawn_check(self.modified.clone());

        // Both branches run to completion before either result is looked at.
        let recent = join_check(recent_task).await;
        let modified = join_check(modified_task).await;

        let recent = recent.map_err(|e| feed_error(&self.recent, e))?;
        let modified = modified.map_err(|e| feed_error(&self.modified, e))?;

        let mut items = recent.items;
        items.extend(modified.items);
        info!(item_count = items.len(), "Fetched items from feeds");

        let items = self.filters.apply(items);
        let items = deduplicate(items)?;
        let items = remove_notified(items, self.notifications.as_ref()).await?;
        info!(item_count = items.len(), "New items to notify");

        self.fanout.deliver(items, self.notifications.as_ref()).await
    }
}

fn spawn_check(check: FreshnessCheck) -> JoinHandle<Result<RecordSet>> {
    tokio::spawn(async move { check.check().await }.in_current_span())
}

async fn join_check(task: JoinHandle<Result<RecordSet>>) -> Result<RecordSet> {
    task.await.map_err(|e| NotifierError::Join(e.to_string()))?
}

fn feed_error(check: &FreshnessCheck, source: NotifierError) -> NotifierError {
    NotifierError::Feed {
        feed: check.feed().to_string(),
        source: Box::new(source),
    }
}

/// Assembles a [`Checker`] from its capabilities.
#[derive(Default)]
pub struct CheckerBuilder {
    recent: Option<FreshnessCheck>,
    modified: Option<FreshnessCheck>,
    filters: FilterChain,
    notifications: Option<Arc<dyn NotificationStore>>,
    fanout: NotifierFanout,
}

impl CheckerBuilder {
    pub fn recent(mut self, check: FreshnessCheck) -> Self {
        self.recent = Some(check);
        self
    }

    pub fn modified(mut self, check: FreshnessCheck) -> Self {
        self.modified = Some(check);
        self
    }

    pub fn include(mut self, filter: impl IncludeFilter + 'static) -> Self {
        self.filters.add_filter(filter);
        self
    }

    pub fn filters(mut self, filters: FilterChain) -> Self {
        self.filters = filters;
        self
    }

    pub fn notification_store(mut self, store: Arc<dyn NotificationStore>) -> Self {
        self.notifications = Some(store);
        self
    }

    pub fn notifier(mut self, sink: Arc<dyn Notifier>) -> Self {
        self.fanout.add_sink(sink);
        self
    }

    pub fn build(self) -> Result<Checker> {
        let missing = |what: &str| NotifierError::Config(format!("checker is missing {}", what));
        Ok(Checker {
            recent: self.recent.ok_or_else(|| missing("the recent feed check"))?,
            modified: self.modified.ok_or_else(|| missing("the modified feed check"))?,
            filters: self.filters,
            notifications: self.notifications.ok_or_else(|| missing("a notification store"))?,
            fanout: self.fanout,
        })
    }
}
