use std::{future::Future, time::Duration};

use tokio::task::JoinHandle;
use tracing::trace;

/// Sequence tag handed to each scheduled lookup.
///
/// Only the ticket of the most recent [`QueryScheduler::schedule`] is current;
/// anything older, or anything issued before a [`QueryScheduler::cancel`], is
/// stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryTicket(u64);

impl QueryTicket {
    pub const fn sequence(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct PendingQuery {
    ticket: QueryTicket,
    timer: JoinHandle<()>,
}

/// Debounce timer for one search session.
///
/// At most one timer is armed at a time. When it fires the lookup is spawned
/// as its own task, so cancelling afterwards stops nothing already on the wire;
/// its ticket goes stale instead.
#[derive(Debug, Default)]
pub struct QueryScheduler {
    sequence: u64,
    pending: Option<PendingQuery>,
}

impl QueryScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disarm any previous timer, then arm one that runs `fire` after `delay`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F, Fut>(&mut self, delay: Duration, fire: F) -> QueryTicket
    where
        F: FnOnce(QueryTicket) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let ticket = QueryTicket(self.sequence);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            trace!(sequence = ticket.0, "Debounce elapsed");
            tokio::spawn(fire(ticket));
        });
        self.pending = Some(PendingQuery { ticket, timer });
        ticket
    }

    /// Disarm the pending timer, if any, and make every ticket issued so far
    /// stale. Returns whether a timer was still waiting.
    pub fn cancel(&mut self) -> bool {
        self.sequence += 1;
        self.pending.take().is_some_and(|pending| {
            let waiting = !pending.timer.is_finished();
            pending.timer.abort();
            waiting
        })
    }

    pub fn is_current(&self, ticket: QueryTicket) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| pending.ticket == ticket)
    }

    /// Whether a timer is armed and has not fired yet.
    pub fn is_waiting(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| !pending.timer.is_finished())
    }
}

impl Drop for QueryScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter_fire(
        counter: &Arc<AtomicUsize>,
    ) -> impl FnOnce(QueryTicket) -> std::future::Ready<()> + Send + 'static {
        let counter = Arc::clone(counter);
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_once_after_delay() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut scheduler = QueryScheduler::new();
        scheduler.schedule(Duration::from_millis(500), counter_fire(&fired));

        tokio::time::sleep(Duration::from_millis(499)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(scheduler.is_waiting());

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!scheduler.is_waiting());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_previous_timer() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut scheduler = QueryScheduler::new();

        let first = scheduler.schedule(Duration::from_millis(500), counter_fire(&fired));
        tokio::time::sleep(Duration::from_millis(300)).await;
        let second = scheduler.schedule(Duration::from_millis(500), counter_fire(&fired));

        assert!(second > first);
        assert!(!scheduler.is_current(first));
        assert!(scheduler.is_current(second));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_right_after_schedule() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut scheduler = QueryScheduler::new();

        let ticket = scheduler.schedule(Duration::from_millis(500), counter_fire(&fired));
        assert!(scheduler.cancel());
        assert!(!scheduler.is_current(ticket));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(!scheduler.cancel());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_disarms_timer() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut scheduler = QueryScheduler::new();
        scheduler.schedule(Duration::from_millis(500), counter_fire(&fired));
        drop(scheduler);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
