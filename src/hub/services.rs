//! Background service starters: store eviction sweeps.

use crate::store::spawn_eviction_task;
use crate::types::Event;

use super::StudyHub;

impl StudyHub {
    /// Start periodic eviction for the task store and the pathway cache
    ///
    /// Both sweeps stop when the hub shuts down.
    pub(super) fn start_eviction_tasks(&self) {
        let interval = self.config.tasks.sweep_interval;

        let event_tx = self.event_tx.clone();
        spawn_eviction_task(
            self.task_store.clone(),
            interval,
            self.cancel_token.child_token(),
            move |count| {
                tracing::debug!(count, "expired tasks evicted");
                let _ = event_tx.send(Event::TasksEvicted { count });
            },
        );

        spawn_eviction_task(
            self.pathway_cache.clone(),
            interval,
            self.cancel_token.child_token(),
            |count| tracing::debug!(count, "expired pathways evicted"),
        );

        tracing::info!(
            interval_secs = interval.as_secs(),
            "store eviction background tasks started"
        );
    }
}
