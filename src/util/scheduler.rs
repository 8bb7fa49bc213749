//! Named periodic task scheduler
//!
//! The match runs a small number of independent cadences (fast zone tick,
//! phase-specific damage scan, director housekeeping). They all register here
//! under a stable name so each one can be rescheduled or cancelled on its own,
//! e.g. when a zone phase change alters the damage tick interval.

use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::debug;

/// Registry of named periodic tasks. Scheduling under an existing name
/// replaces the previous registration; cancelling an unknown name is a no-op.
pub struct TickScheduler {
    tasks: DashMap<String, JoinHandle<()>>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self {
            tasks: DashMap::new(),
        }
    }

    /// Run `f` every `period` until cancelled. Must be called from within a
    /// tokio runtime.
    pub fn schedule<F>(&self, name: &str, period: Duration, mut f: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.cancel(name);

        let task_name = name.to_string();
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                f();
            }
        });

        debug!(task = %name, period_ms = period.as_millis() as u64, "Scheduled periodic task");
        self.tasks.insert(task_name, handle);
    }

    /// Cancel a registration by name. Idempotent.
    pub fn cancel(&self, name: &str) {
        if let Some((_, handle)) = self.tasks.remove(name) {
            handle.abort();
            debug!(task = %name, "Cancelled periodic task");
        }
    }

    /// Cancel every registration. Idempotent.
    pub fn cancel_all(&self) {
        let names: Vec<String> = self.tasks.iter().map(|e| e.key().clone()).collect();
        for name in names {
            self.cancel(&name);
        }
    }

    pub fn is_scheduled(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn active_tasks(&self) -> usize {
        self.tasks.len()
    }
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        for entry in self.tasks.iter() {
            entry.value().abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn schedule_and_cancel_by_name() {
        let scheduler = TickScheduler::new();
        let count = Arc::new(AtomicUsize::new(0));

        let c = count.clone();
        scheduler.schedule("counter", Duration::from_millis(5), move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert!(scheduler.is_scheduled("counter"));

        tokio::time::sleep(Duration::from_millis(40)).await;
        scheduler.cancel("counter");
        assert!(!scheduler.is_scheduled("counter"));

        let seen = count.load(Ordering::SeqCst);
        assert!(seen >= 2, "expected several ticks, got {seen}");

        // No further ticks after cancellation
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), seen);
    }

    #[tokio::test]
    async fn rescheduling_replaces_previous_task() {
        let scheduler = TickScheduler::new();
        let count = Arc::new(AtomicUsize::new(0));

        let c = count.clone();
        scheduler.schedule("job", Duration::from_secs(3600), move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        let c = count.clone();
        scheduler.schedule("job", Duration::from_millis(5), move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(scheduler.active_tasks(), 1);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(count.load(Ordering::SeqCst) >= 2);

        scheduler.cancel_all();
        assert_eq!(scheduler.active_tasks(), 0);
    }

    #[test]
    fn cancel_before_schedule_is_safe() {
        let scheduler = TickScheduler::new();
        scheduler.cancel("never-registered");
        scheduler.cancel_all();
        assert_eq!(scheduler.active_tasks(), 0);
    }

    #[test]
    fn registrations_are_independent() {
        tokio_test::block_on(async {
            let scheduler = TickScheduler::new();
            scheduler.schedule("a", Duration::from_secs(3600), || {});
            scheduler.schedule("b", Duration::from_secs(3600), || {});
            assert_eq!(scheduler.active_tasks(), 2);

            scheduler.cancel("a");
            assert!(!scheduler.is_scheduled("a"));
            assert!(scheduler.is_scheduled("b"));

            scheduler.cancel_all();
            assert_eq!(scheduler.active_tasks(), 0);
        });
    }
}
