//! Notification-centre data and the poll schedule.
//!
//! The poller keeps the operator's pending-review count and activity feed
//! fresh without manual refresh. Unlike the list panes there is
//! deliberately no request-token guard here: overlapping polls resolve
//! last-write-wins on whichever completes last. The two fetches behind a
//! poll (stats and activity) run concurrently in the network worker.

use std::future::Future;
use std::time::Duration;

use crate::types::{ActivityEntry, StatusBucket};

/// Number of applications currently waiting on an administrator:
/// the sum of the SUBMITTED and UNDER_REVIEW bucket counts.
pub fn pending_count(buckets: &[StatusBucket]) -> u64 {
    buckets
        .iter()
        .filter(|bucket| bucket.status.is_pending())
        .map(|bucket| bucket.count)
        .sum()
}

/// Latest data shown in the notification panel.
#[derive(Debug, Default, Clone)]
pub struct NotificationSnapshot {
    pub buckets: Vec<StatusBucket>,
    pub activity: Vec<ActivityEntry>,
    /// Set after the first poll lands; the panel shows a placeholder until then.
    pub loaded: bool,
}

impl NotificationSnapshot {
    /// Replaces the snapshot wholesale — last write wins.
    pub fn apply(&mut self, buckets: Vec<StatusBucket>, activity: Vec<ActivityEntry>) {
        self.buckets = buckets;
        self.activity = activity;
        self.loaded = true;
    }

    pub fn pending_count(&self) -> u64 {
        pending_count(&self.buckets)
    }
}

/// Drives the repeating poll: fires `poll` immediately, then once per
/// `period`, forever. The caller spawns this on the runtime and aborts the
/// task on shutdown, which cancels the schedule at the next await point —
/// no timer outlives the console.
pub async fn poll_loop<F, Fut>(period: Duration, mut poll: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(period);
    loop {
        ticker.tick().await;
        poll().await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::types::ApplicationStatus;

    fn bucket(status: ApplicationStatus, count: u64) -> StatusBucket {
        StatusBucket { status, count }
    }

    #[test]
    fn pending_count_sums_submitted_and_under_review_only() {
        let buckets = [
            bucket(ApplicationStatus::Draft, 11),
            bucket(ApplicationStatus::Submitted, 4),
            bucket(ApplicationStatus::UnderReview, 3),
            bucket(ApplicationStatus::Approved, 99),
            bucket(ApplicationStatus::Rejected, 7),
        ];
        assert_eq!(pending_count(&buckets), 7);
        assert_eq!(pending_count(&[]), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn poll_loop_fires_immediately_then_on_the_period() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let handle = tokio::spawn(poll_loop(Duration::from_secs(60), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }));

        // First fetch happens on start, without waiting a full period.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        // After shutdown no further polls fire.
        handle.abort();
        let _ = handle.await;
        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}
