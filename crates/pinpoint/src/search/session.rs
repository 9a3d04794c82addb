use std::{
    pin::pin,
    sync::{Arc, Mutex, Weak},
    time::Duration,
};

use futures::{Stream, StreamExt};
use itertools::Itertools;
use tracing::{debug, instrument};

use super::scheduler::{QueryScheduler, QueryTicket};
use crate::{CoordinateState, Subscription, lock};
use pinpoint_geocode::{Geocoder, SearchResult};

/// Hard cap on how many results the panel ever holds.
pub const MAX_SEARCH_RESULTS: usize = 5;

/// Snapshot of what the search box should render.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchView {
    pub query_text: String,
    pub is_open: bool,
    pub results: Vec<SearchResult>,
}

impl SearchView {
    /// The clear control is only offered while there is text to clear.
    pub fn shows_clear_button(&self) -> bool {
        !self.query_text.is_empty()
    }
}

#[derive(Debug, Default)]
struct SessionInner {
    view: SearchView,
    scheduler: QueryScheduler,
}

impl SessionInner {
    fn apply_results(&mut self, ticket: QueryTicket, results: Vec<SearchResult>, limit: usize) {
        if !self.scheduler.is_current(ticket) {
            debug!(
                sequence = ticket.sequence(),
                count = results.len(),
                "Discarding stale search results"
            );
            return;
        }
        self.view.results = results.into_iter().take(limit).collect_vec();
        self.view.is_open = !self.view.results.is_empty();
    }

    fn clear(&mut self) {
        self.scheduler.cancel();
        self.view = SearchView::default();
    }
}

/// State and behaviour of one mounted search box.
///
/// Keystrokes update the text immediately and arm a debounced lookup; results
/// are applied only if they belong to the most recent lookup. Dropping the
/// session (unmount) disarms any pending lookup, and responses still on the
/// wire are ignored.
pub struct SearchSession {
    inner: Arc<Mutex<SessionInner>>,
    geocoder: Arc<dyn Geocoder>,
    coordinate: CoordinateState,
    debounce: Duration,
    max_results: usize,
}

impl SearchSession {
    /// `max_results` is clamped to `1..=MAX_SEARCH_RESULTS`.
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        coordinate: CoordinateState,
        debounce: Duration,
        max_results: usize,
    ) -> Self {
        Self {
            inner: Arc::default(),
            geocoder,
            coordinate,
            debounce,
            max_results: max_results.clamp(1, MAX_SEARCH_RESULTS),
        }
    }

    /// Record a keystroke and (re)arm the debounced lookup.
    ///
    /// Empty text cancels any pending lookup and clears the results right
    /// away without touching the network; `None` is returned in that case.
    pub fn on_input_change(&self, text: impl Into<String>) -> Option<QueryTicket> {
        let text = text.into();
        let mut inner = lock(&self.inner);
        inner.view.query_text.clone_from(&text);

        if text.is_empty() {
            inner.scheduler.cancel();
            inner.view.results.clear();
            inner.view.is_open = false;
            return None;
        }

        let session = Arc::downgrade(&self.inner);
        let geocoder = Arc::clone(&self.geocoder);
        let limit = self.max_results;
        let ticket = inner.scheduler.schedule(self.debounce, move |ticket| {
            lookup(geocoder, session, ticket, text, limit)
        });
        Some(ticket)
    }

    /// Apply the results of the lookup tagged `ticket`.
    ///
    /// Only the first `max_results` entries are kept, in order. Results for a
    /// ticket that is no longer current are dropped.
    pub fn on_results_ready(&self, ticket: QueryTicket, results: Vec<SearchResult>) {
        lock(&self.inner).apply_results(ticket, results, self.max_results);
    }

    /// Take `result` as the chosen place: its label fills the box, the panel
    /// closes and its coordinate becomes the shared coordinate. The result
    /// list is kept.
    pub fn select_result(&self, result: &SearchResult) {
        debug!(label = %result.label, coordinate = %result.coordinate, "Search result selected");
        {
            let mut inner = lock(&self.inner);
            inner.view.query_text.clone_from(&result.label);
            inner.view.is_open = false;
        }
        self.coordinate.set(result.coordinate);
    }

    /// Select the entry at `index` of the current list, if there is one.
    pub fn select_index(&self, index: usize) -> Option<SearchResult> {
        let result = lock(&self.inner).view.results.get(index).cloned()?;
        self.select_result(&result);
        Some(result)
    }

    pub fn clear(&self) {
        lock(&self.inner).clear();
    }

    /// Close the panel, leaving text and results alone.
    pub fn dismiss(&self) {
        lock(&self.inner).view.is_open = false;
    }

    /// Flip the panel, even when there is nothing to show.
    pub fn toggle_open(&self) -> bool {
        let mut inner = lock(&self.inner);
        inner.view.is_open = !inner.view.is_open;
        inner.view.is_open
    }

    /// Dismiss the panel on every outside-interaction signal from `signals`
    /// until the returned guard is dropped.
    ///
    /// Must be called from within a tokio runtime.
    pub fn bind_dismiss<S>(&self, signals: S) -> Subscription
    where
        S: Stream<Item = ()> + Send + 'static,
    {
        let session = Arc::downgrade(&self.inner);
        let task = tokio::spawn(async move {
            let mut signals = pin!(signals);
            while signals.next().await.is_some() {
                let Some(inner) = session.upgrade() else {
                    break;
                };
                lock(&inner).view.is_open = false;
            }
        });
        Subscription::from_task(task)
    }

    pub fn view(&self) -> SearchView {
        lock(&self.inner).view.clone()
    }

    pub fn query_text(&self) -> String {
        lock(&self.inner).view.query_text.clone()
    }

    pub fn is_open(&self) -> bool {
        lock(&self.inner).view.is_open
    }

    pub fn results(&self) -> Vec<SearchResult> {
        lock(&self.inner).view.results.clone()
    }

    /// Whether a debounce timer is armed and has not fired yet.
    pub fn has_pending_query(&self) -> bool {
        lock(&self.inner).scheduler.is_waiting()
    }
}

impl std::fmt::Debug for SearchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSession")
            .field("view", &self.view())
            .field("debounce", &self.debounce)
            .field("max_results", &self.max_results)
            .finish_non_exhaustive()
    }
}

#[instrument(
    name = "Search lookup",
    skip(geocoder, session, ticket, limit),
    fields(sequence = ticket.sequence()),
    level = "debug"
)]
async fn lookup(
    geocoder: Arc<dyn Geocoder>,
    session: Weak<Mutex<SessionInner>>,
    ticket: QueryTicket,
    text: String,
    limit: usize,
) {
    let results = geocoder.search(&text).await;
    match session.upgrade() {
        Some(inner) => lock(&inner).apply_results(ticket, results, limit),
        None => debug!("Search session gone before results arrived"),
    }
}
