//! Polling refresh loop
//!
//! Fetches the full response collection once on start and then on every
//! tick, publishing each accepted result into a `watch` cell. The loop task
//! is the only writer of that cell.
//!
//! Ticks never wait for an earlier fetch: each fetch gets the next sequence
//! number and only a fetch that is still the latest issued may replace the
//! snapshot. Slower, older fetches are dropped when they complete.
//!
//! A failed fetch is logged and leaves the previous snapshot untouched.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lcx_common::SurveyResponse;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::ResponseSource;

/// Most recently accepted response collection
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Sequence number of the fetch that produced it; 0 before the first load
    pub seq: u64,
    pub responses: Arc<Vec<SurveyResponse>>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    fn initial() -> Self {
        Self {
            seq: 0,
            responses: Arc::new(Vec::new()),
            fetched_at: None,
        }
    }

    /// True once any fetch has been applied
    pub fn is_loaded(&self) -> bool {
        self.fetched_at.is_some()
    }
}

/// Issues fetch sequence numbers and remembers the latest one
#[derive(Debug, Default)]
struct SequenceGuard {
    latest_issued: AtomicU64,
}

impl SequenceGuard {
    fn issue(&self) -> u64 {
        self.latest_issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_latest(&self, seq: u64) -> bool {
        self.latest_issued.load(Ordering::SeqCst) == seq
    }
}

/// Replace the snapshot if `candidate` comes from the latest issued fetch
///
/// The check runs under the cell's write lock, so a stale result can never
/// overwrite a newer one that landed first.
fn apply_fetch(cell: &watch::Sender<Snapshot>, guard: &SequenceGuard, candidate: Snapshot) -> bool {
    cell.send_if_modified(|current| {
        if guard.is_latest(candidate.seq) && current.seq < candidate.seq {
            *current = candidate;
            true
        } else {
            false
        }
    })
}

/// Refresh loop configuration
pub struct RefreshLoop<S: ResponseSource> {
    source: Arc<S>,
    interval: Duration,
}

impl<S: ResponseSource> RefreshLoop<S> {
    pub fn new(source: Arc<S>, interval: Duration) -> Self {
        Self { source, interval }
    }

    /// Start the loop on the current runtime
    pub fn spawn(self) -> RefreshHandle {
        let (cell, snapshots) = watch::channel(Snapshot::initial());
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run(
            self.source,
            self.interval,
            Arc::new(cell),
            cancel.clone(),
        ));

        RefreshHandle {
            cancel,
            task: Some(task),
            snapshots,
        }
    }
}

async fn run<S: ResponseSource>(
    source: Arc<S>,
    interval: Duration,
    cell: Arc<watch::Sender<Snapshot>>,
    cancel: CancellationToken,
) {
    let guard = Arc::new(SequenceGuard::default());
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut in_flight = JoinSet::new();

    info!("Refresh loop started ({}ms interval)", interval.as_millis());

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            // First tick completes immediately: fetch on start
            _ = ticker.tick() => {
                let seq = guard.issue();
                debug!(seq, in_flight = in_flight.len(), "Issuing fetch");
                in_flight.spawn(fetch_and_apply(
                    source.clone(),
                    seq,
                    guard.clone(),
                    cell.clone(),
                ));
            }
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                if let Err(e) = joined {
                    warn!("Fetch task failed: {}", e);
                }
            }
        }
    }

    in_flight.abort_all();
    info!("Refresh loop stopped");
}

async fn fetch_and_apply<S: ResponseSource>(
    source: Arc<S>,
    seq: u64,
    guard: Arc<SequenceGuard>,
    cell: Arc<watch::Sender<Snapshot>>,
) {
    match source.fetch_responses().await {
        Ok(responses) => {
            let count = responses.len();
            let candidate = Snapshot {
                seq,
                responses: Arc::new(responses),
                fetched_at: Some(Utc::now()),
            };
            if apply_fetch(&cell, &guard, candidate) {
                debug!(seq, count, "Snapshot applied");
            } else {
                debug!(seq, "Discarding stale fetch");
            }
        }
        Err(e) => warn!(seq, "Refresh failed, keeping previous snapshot: {}", e),
    }
}

/// Owner of a running refresh loop
///
/// Dropping the handle cancels the loop.
pub struct RefreshHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    snapshots: watch::Receiver<Snapshot>,
}

impl RefreshHandle {
    /// Receiver notified on every applied snapshot
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    pub fn latest(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Cancel the loop and wait for it to exit
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Refresh loop task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientError, Result};
    use async_trait::async_trait;
    use lcx_common::{NetworkingInterest, Sector};
    use std::sync::atomic::AtomicUsize;

    fn response(id: i64) -> SurveyResponse {
        SurveyResponse {
            id,
            name: format!("Attendee {}", id),
            sector: Sector::Technology,
            origin: "Lab".to_string(),
            linkedin_url: format!("https://linkedin.com/in/a{}", id),
            profile_description: "Engineer".to_string(),
            event_goal: "Learn".to_string(),
            networking_interest: NetworkingInterest::Business,
            desired_connections: "Founders".to_string(),
            offer_to_others: "Mentoring".to_string(),
            key_skills: vec!["rust".to_string(), "sql".to_string(), "go".to_string()],
            legacy_key_skill: None,
        }
    }

    fn candidate(seq: u64) -> Snapshot {
        Snapshot {
            seq,
            responses: Arc::new(vec![response(seq as i64)]),
            fetched_at: Some(Utc::now()),
        }
    }

    /// Returns `n` responses on call `n`; fails every call from `fail_from` on
    struct CountingSource {
        calls: AtomicUsize,
        fail_from: Option<usize>,
    }

    impl CountingSource {
        fn new(fail_from: Option<usize>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_from,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ResponseSource for CountingSource {
        async fn fetch_responses(&self) -> Result<Vec<SurveyResponse>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_from.is_some_and(|n| call >= n) {
                return Err(ClientError::Network("connection refused".to_string()));
            }
            Ok((1..=call as i64).map(response).collect())
        }
    }

    #[test]
    fn test_sequence_numbers_increase() {
        let guard = SequenceGuard::default();
        assert_eq!(guard.issue(), 1);
        assert_eq!(guard.issue(), 2);
        assert!(guard.is_latest(2));
        assert!(!guard.is_latest(1));
    }

    #[test]
    fn test_latest_fetch_is_applied() {
        let (cell, rx) = watch::channel(Snapshot::initial());
        let guard = SequenceGuard::default();
        let seq = guard.issue();

        assert!(apply_fetch(&cell, &guard, candidate(seq)));
        assert_eq!(rx.borrow().seq, 1);
        assert!(rx.borrow().is_loaded());
    }

    #[test]
    fn test_older_fetch_is_discarded_when_newer_was_issued() {
        let (cell, rx) = watch::channel(Snapshot::initial());
        let guard = SequenceGuard::default();
        let first = guard.issue();
        let _second = guard.issue();

        // Older fetch completes first but a newer one is already in flight
        assert!(!apply_fetch(&cell, &guard, candidate(first)));
        assert_eq!(rx.borrow().seq, 0);
        assert!(!rx.borrow().is_loaded());
    }

    #[test]
    fn test_stale_fetch_never_overwrites_newer_snapshot() {
        let (cell, rx) = watch::channel(Snapshot::initial());
        let guard = SequenceGuard::default();
        let first = guard.issue();
        let second = guard.issue();

        assert!(apply_fetch(&cell, &guard, candidate(second)));
        assert!(!apply_fetch(&cell, &guard, candidate(first)));
        assert_eq!(rx.borrow().seq, second);
    }

    #[tokio::test]
    async fn test_loop_fetches_immediately_on_start() {
        let source = Arc::new(CountingSource::new(None));
        let handle = RefreshLoop::new(source.clone(), Duration::from_secs(60)).spawn();
        let mut rx = handle.subscribe();

        time::timeout(Duration::from_secs(2), rx.changed())
            .await
            .expect("first fetch should not wait for the interval")
            .unwrap();

        let snapshot = handle.latest();
        assert_eq!(snapshot.seq, 1);
        assert_eq!(snapshot.responses.len(), 1);
        assert_eq!(source.calls(), 1);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_loop_refreshes_on_interval() {
        let source = Arc::new(CountingSource::new(None));
        let handle = RefreshLoop::new(source.clone(), Duration::from_millis(20)).spawn();
        let mut rx = handle.subscribe();

        time::timeout(Duration::from_secs(2), async {
            while rx.borrow_and_update().responses.len() < 3 {
                rx.changed().await.unwrap();
            }
        })
        .await
        .expect("should pick up three refreshes");

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_snapshot() {
        // Call 1 succeeds, every later call fails
        let source = Arc::new(CountingSource::new(Some(2)));
        let handle = RefreshLoop::new(source.clone(), Duration::from_millis(20)).spawn();

        time::timeout(Duration::from_secs(2), async {
            while source.calls() < 4 {
                time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("loop should keep ticking after failures");

        let snapshot = handle.latest();
        assert_eq!(snapshot.seq, 1);
        assert_eq!(snapshot.responses.len(), 1);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_failure_before_first_load_leaves_snapshot_unloaded() {
        let source = Arc::new(CountingSource::new(Some(1)));
        let handle = RefreshLoop::new(source.clone(), Duration::from_millis(20)).spawn();

        time::timeout(Duration::from_secs(2), async {
            while source.calls() < 2 {
                time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        assert!(!handle.latest().is_loaded());
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_fetching() {
        let source = Arc::new(CountingSource::new(None));
        let handle = RefreshLoop::new(source.clone(), Duration::from_millis(10)).spawn();
        assert!(handle.is_running());

        time::sleep(Duration::from_millis(50)).await;
        handle.shutdown().await;

        let calls = source.calls();
        time::sleep(Duration::from_millis(60)).await;
        assert_eq!(source.calls(), calls);
    }

    #[tokio::test]
    async fn test_drop_cancels_loop() {
        let source = Arc::new(CountingSource::new(None));
        let handle = RefreshLoop::new(source.clone(), Duration::from_millis(10)).spawn();
        time::sleep(Duration::from_millis(30)).await;
        drop(handle);

        // Allow the task to observe cancellation
        time::sleep(Duration::from_millis(30)).await;
        let calls = source.calls();
        time::sleep(Duration::from_millis(60)).await;
        assert_eq!(source.calls(), calls);
    }
}
