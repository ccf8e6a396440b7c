//! Paginated collection controller
//!
//! Owns the fetch/accumulate/paginate lifecycle of one collection:
//!
//! ```text
//! refresh()        page 0  → replace items, next_page = 1
//! load_more()      page N  → append items,  next_page = N + 1
//! apply_filters()  ┐
//! clear_filters()  ├─ invalidate items, then exactly one refresh()
//! search_by_title()┘
//! ```
//!
//! # Race handling
//!
//! State sits behind a `std::sync::Mutex` that is never held across an
//! `.await`. Each refresh and each sign-out bumps a generation counter; a
//! response whose generation is no longer current is dropped. `load_more`
//! refuses to start while any fetch is outstanding, so page fetches are
//! serialized per controller.
//!
//! # Errors
//!
//! Nothing here returns an error. Failures are logged and mapped to a safe
//! state: a failed refresh empties the collection, a failed load-more leaves
//! it untouched so the caller can retry.

use std::sync::{Mutex, MutexGuard};

use super::source::{PageRequest, PageSource};
use crate::filters::FilterCriteria;

/// Page size for top-level lists
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Page size for team-member sub-lists
pub const MEMBER_PAGE_SIZE: usize = 10;

/// Observable state of a collection
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionState<T> {
    /// Accumulated items in server order
    pub items: Vec<T>,
    /// Next page to request
    pub next_page: usize,
    /// More pages may exist
    pub has_more: bool,
    pub is_loading_more: bool,
    pub is_refreshing: bool,
    pub filters: FilterCriteria,
    pub title_query: String,
}

impl<T> CollectionState<T> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            next_page: 0,
            has_more: true,
            is_loading_more: false,
            is_refreshing: false,
            filters: FilterCriteria::default(),
            title_query: String::new(),
        }
    }

    /// Empty, ready to fetch page 0 again
    fn reset_pages(&mut self) {
        self.items.clear();
        self.next_page = 0;
        self.has_more = true;
    }
}

/// Why a fetch was not issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Controller is signed out
    NotAuthenticated,
    /// Last page already loaded
    Exhausted,
    /// Another fetch is outstanding
    Busy,
}

/// What a refresh or load-more did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Page applied to the collection
    Loaded { page: usize, fetched: usize },
    /// No request was made
    Skipped(SkipReason),
    /// Request failed and was logged
    Failed,
    /// Response arrived after a newer refresh or a sign-out and was dropped
    Superseded,
}

struct Inner<T> {
    state: CollectionState<T>,
    authenticated: bool,
    generation: u64,
}

type ItemMapper<R, T> = Box<dyn Fn(R) -> T + Send + Sync>;

/// Paginated, filterable, title-searchable collection
pub struct CollectionController<S: PageSource, T> {
    source: S,
    page_size: usize,
    map_item: ItemMapper<S::Raw, T>,
    inner: Mutex<Inner<T>>,
}

impl<S: PageSource> CollectionController<S, S::Raw> {
    /// Controller that stores raw records unchanged
    #[allow(dead_code)]
    pub fn new(source: S) -> Self {
        Self::with_mapper(source, |raw| raw)
    }
}

impl<S: PageSource, T> CollectionController<S, T> {
    /// Controller applying `map_item` to every fetched record before storage
    ///
    /// Starts signed out; call [`set_authenticated`](Self::set_authenticated)
    /// to perform the initial load.
    pub fn with_mapper(
        source: S,
        map_item: impl Fn(S::Raw) -> T + Send + Sync + 'static,
    ) -> Self {
        Self {
            source,
            page_size: DEFAULT_PAGE_SIZE,
            map_item: Box::new(map_item),
            inner: Mutex::new(Inner {
                state: CollectionState::new(),
                authenticated: false,
                generation: 0,
            }),
        }
    }

    /// Override the page size (minimum 1)
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn request(&self, state: &CollectionState<T>, page: usize) -> PageRequest {
        PageRequest {
            page,
            size: self.page_size,
            filters: state.filters.clone(),
            title: state.title_query.clone(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Authentication gate
    // ─────────────────────────────────────────────────────────────────────

    /// Open or close the authentication gate
    ///
    /// false→true performs the initial refresh and returns its outcome.
    /// true→false behaves as [`sign_out`](Self::sign_out). Setting the current
    /// value again does nothing.
    pub async fn set_authenticated(&self, authenticated: bool) -> Option<FetchOutcome> {
        if !authenticated {
            self.sign_out();
            return None;
        }

        {
            let mut inner = self.lock();
            if inner.authenticated {
                return None;
            }
            inner.authenticated = true;
        }

        tracing::debug!("{}: authenticated, loading first page", self.source.name());
        Some(self.refresh().await)
    }

    /// Close the gate and drop all loaded data
    ///
    /// Synchronous so it can run from a session observer. Any response still
    /// in flight is discarded when it arrives.
    pub fn sign_out(&self) {
        let mut inner = self.lock();
        inner.authenticated = false;
        inner.generation += 1;
        inner.state.reset_pages();
        inner.state.is_loading_more = false;
        inner.state.is_refreshing = false;
        tracing::debug!("{}: signed out, collection cleared", self.source.name());
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().authenticated
    }

    // ─────────────────────────────────────────────────────────────────────
    // Fetching
    // ─────────────────────────────────────────────────────────────────────

    /// Fetch page 0 and replace the collection
    ///
    /// Not de-duplicated: a refresh started while another is in flight
    /// supersedes it, and only the newest response is applied.
    pub async fn refresh(&self) -> FetchOutcome {
        let (generation, request) = {
            let mut inner = self.lock();
            if !inner.authenticated {
                return FetchOutcome::Skipped(SkipReason::NotAuthenticated);
            }
            inner.generation += 1;
            inner.state.is_refreshing = true;
            inner.state.is_loading_more = false;
            (inner.generation, self.request(&inner.state, 0))
        };

        tracing::debug!(
            "{}: refreshing (size={}, title={:?}, filters={})",
            self.source.name(),
            request.size,
            request.title,
            request.filters
        );

        let result = self
            .source
            .fetch_page(&request)
            .await
            .map(|page| page.map(|raw| (self.map_item)(raw)));

        let mut inner = self.lock();
        if inner.generation != generation {
            tracing::debug!("{}: dropping superseded refresh", self.source.name());
            return FetchOutcome::Superseded;
        }

        let state = &mut inner.state;
        state.is_refreshing = false;

        match result {
            Ok(page) => {
                let fetched = page.content.len();
                state.items = page.content;
                state.next_page = 1;
                state.has_more = !page.last;
                FetchOutcome::Loaded { page: 0, fetched }
            }
            Err(e) => {
                tracing::warn!("{}: refresh failed: {}", self.source.name(), e);
                state.items.clear();
                state.next_page = 0;
                state.has_more = false;
                FetchOutcome::Failed
            }
        }
    }

    /// Fetch the next page and append it
    ///
    /// Returns immediately without a request when the last page is loaded,
    /// when another fetch is outstanding, or when signed out.
    pub async fn load_more(&self) -> FetchOutcome {
        let (generation, request) = {
            let mut inner = self.lock();
            if !inner.authenticated {
                return FetchOutcome::Skipped(SkipReason::NotAuthenticated);
            }
            if !inner.state.has_more {
                return FetchOutcome::Skipped(SkipReason::Exhausted);
            }
            if inner.state.is_loading_more || inner.state.is_refreshing {
                return FetchOutcome::Skipped(SkipReason::Busy);
            }
            inner.state.is_loading_more = true;
            let page = inner.state.next_page;
            (inner.generation, self.request(&inner.state, page))
        };

        let page_index = request.page;
        tracing::debug!("{}: loading page {}", self.source.name(), page_index);

        let result = self
            .source
            .fetch_page(&request)
            .await
            .map(|page| page.map(|raw| (self.map_item)(raw)));

        let mut inner = self.lock();
        if inner.generation != generation {
            tracing::debug!(
                "{}: dropping page {} fetched before a reset",
                self.source.name(),
                page_index
            );
            return FetchOutcome::Superseded;
        }

        let state = &mut inner.state;
        state.is_loading_more = false;

        match result {
            Ok(page) => {
                let fetched = page.content.len();
                state.items.extend(page.content);
                state.next_page = page_index + 1;
                state.has_more = !page.last;
                FetchOutcome::Loaded {
                    page: page_index,
                    fetched,
                }
            }
            Err(e) => {
                tracing::warn!(
                    "{}: loading page {} failed: {}",
                    self.source.name(),
                    page_index,
                    e
                );
                FetchOutcome::Failed
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Filters and search
    // ─────────────────────────────────────────────────────────────────────

    /// Replace the filter set and refetch from page 0
    pub async fn apply_filters(&self, filters: FilterCriteria) -> FetchOutcome {
        self.invalidate(|state| state.filters = filters);
        self.refresh().await
    }

    /// Drop all filters and the title query, then refetch from page 0
    pub async fn clear_filters(&self) -> FetchOutcome {
        self.invalidate(|state| {
            state.filters = FilterCriteria::default();
            state.title_query.clear();
        });
        self.refresh().await
    }

    /// Set the title query and refetch from page 0
    ///
    /// Callers debounce keystroke-driven input before calling this.
    pub async fn search_by_title(&self, query: impl Into<String>) -> FetchOutcome {
        let query = query.into();
        self.invalidate(|state| state.title_query = query);
        self.refresh().await
    }

    fn invalidate(&self, update: impl FnOnce(&mut CollectionState<T>)) {
        let mut inner = self.lock();
        update(&mut inner.state);
        inner.state.reset_pages();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    /// Copy of the full state
    pub fn snapshot(&self) -> CollectionState<T>
    where
        T: Clone,
    {
        self.lock().state.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().state.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_more(&self) -> bool {
        self.lock().state.has_more
    }

    pub fn filters(&self) -> FilterCriteria {
        self.lock().state.filters.clone()
    }
}

#[cfg(test)]
impl<S: PageSource, T> CollectionController<S, T> {
    pub fn items(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.lock().state.items.clone()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn next_page(&self) -> usize {
        self.lock().state.next_page
    }

    pub fn is_refreshing(&self) -> bool {
        self.lock().state.is_refreshing
    }

    pub fn is_loading_more(&self) -> bool {
        self.lock().state.is_loading_more
    }

    pub fn title_query(&self) -> String {
        self.lock().state.title_query.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, PageEnvelope};
    use crate::filters::TaskStatus;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Notify;

    type Response = Result<PageEnvelope<&'static str>, ApiError>;

    /// Scripted source: responses are handed out in call order; calls whose
    /// index is listed in `gated` wait for `gate` before returning.
    #[derive(Default)]
    struct MockSource {
        responses: Mutex<VecDeque<Response>>,
        calls: Mutex<Vec<PageRequest>>,
        gated: Vec<usize>,
        gate: Arc<Notify>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl MockSource {
        fn new(responses: Vec<Response>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                ..Default::default()
            }
        }

        fn gated(responses: Vec<Response>, gated: Vec<usize>) -> Self {
            Self {
                gated,
                ..Self::new(responses)
            }
        }

        fn calls(&self) -> Vec<PageRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl PageSource for MockSource {
        type Raw = &'static str;

        fn name(&self) -> &'static str {
            "mock"
        }

        async fn fetch_page(&self, request: &PageRequest) -> Response {
            let index = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(request.clone());
                calls.len() - 1
            };
            let response = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(PageEnvelope::new(vec![], true)));

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if self.gated.contains(&index) {
                self.gate.notified().await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            response
        }
    }

    fn page(items: &[&'static str], last: bool) -> Response {
        Ok(PageEnvelope::new(items.to_vec(), last))
    }

    fn network_error() -> Response {
        Err(ApiError::Network("connection refused".to_string()))
    }

    #[tokio::test]
    async fn test_paging_scenario() {
        let controller = CollectionController::new(MockSource::new(vec![
            page(&["A", "B"], false),
            page(&["C"], true),
        ]));

        let outcome = controller.set_authenticated(true).await;
        assert_eq!(outcome, Some(FetchOutcome::Loaded { page: 0, fetched: 2 }));
        assert_eq!(controller.items(), vec!["A", "B"]);
        assert!(controller.has_more());
        assert_eq!(controller.next_page(), 1);

        assert_eq!(
            controller.load_more().await,
            FetchOutcome::Loaded { page: 1, fetched: 1 }
        );
        assert_eq!(controller.items(), vec!["A", "B", "C"]);
        assert!(!controller.has_more());
        assert_eq!(controller.next_page(), 2);

        let before = controller.snapshot();
        assert_eq!(
            controller.load_more().await,
            FetchOutcome::Skipped(SkipReason::Exhausted)
        );
        assert_eq!(controller.snapshot(), before);
        assert_eq!(controller.source().calls().len(), 2);
        assert_eq!(controller.source().calls()[1].page, 1);
    }

    #[tokio::test]
    async fn test_refresh_replaces_items_regardless_of_prior_state() {
        let controller = CollectionController::new(MockSource::new(vec![
            page(&["A", "B"], false),
            page(&["C", "D"], false),
            page(&["X"], false),
        ]));
        controller.set_authenticated(true).await;
        controller.load_more().await;
        assert_eq!(controller.len(), 4);
        assert_eq!(controller.next_page(), 2);

        assert_eq!(
            controller.refresh().await,
            FetchOutcome::Loaded { page: 0, fetched: 1 }
        );
        assert_eq!(controller.items(), vec!["X"]);
        assert_eq!(controller.next_page(), 1);
        assert!(!controller.is_refreshing());
        assert_eq!(controller.source().calls()[2].page, 0);
    }

    #[tokio::test]
    async fn test_refresh_failure_resets_to_empty() {
        let controller = CollectionController::new(MockSource::new(vec![
            page(&["A", "B"], false),
            network_error(),
        ]));
        controller.set_authenticated(true).await;
        assert_eq!(controller.len(), 2);

        assert_eq!(controller.refresh().await, FetchOutcome::Failed);
        assert!(controller.is_empty());
        assert!(!controller.has_more());
        assert_eq!(controller.next_page(), 0);
        assert!(!controller.is_refreshing());

        // has_more=false blocks load-more until the next refresh
        assert_eq!(
            controller.load_more().await,
            FetchOutcome::Skipped(SkipReason::Exhausted)
        );
    }

    #[tokio::test]
    async fn test_load_more_failure_keeps_state_and_is_retryable() {
        let controller = CollectionController::new(MockSource::new(vec![
            page(&["A", "B"], false),
            network_error(),
            page(&["C"], true),
        ]));
        controller.set_authenticated(true).await;

        assert_eq!(controller.load_more().await, FetchOutcome::Failed);
        assert_eq!(controller.items(), vec!["A", "B"]);
        assert_eq!(controller.next_page(), 1);
        assert!(controller.has_more());
        assert!(!controller.is_loading_more());

        assert_eq!(
            controller.load_more().await,
            FetchOutcome::Loaded { page: 1, fetched: 1 }
        );
        assert_eq!(controller.items(), vec!["A", "B", "C"]);

        let calls = controller.source().calls();
        assert_eq!(calls[1].page, 1);
        assert_eq!(calls[2].page, 1);
    }

    #[tokio::test]
    async fn test_concurrent_load_more_issues_one_request() {
        let controller = CollectionController::new(MockSource::gated(
            vec![page(&["A", "B"], false), page(&["C"], false)],
            vec![1],
        ));
        controller.set_authenticated(true).await;
        let gate = controller.source().gate.clone();

        let (first, second) = tokio::join!(controller.load_more(), async {
            assert!(controller.is_loading_more());
            let outcome = controller.load_more().await;
            gate.notify_one();
            outcome
        });

        assert_eq!(first, FetchOutcome::Loaded { page: 1, fetched: 1 });
        assert_eq!(second, FetchOutcome::Skipped(SkipReason::Busy));
        assert_eq!(controller.source().calls().len(), 2);
        assert_eq!(controller.source().max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(controller.items(), vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_load_more_rejected_while_refreshing() {
        let controller = CollectionController::new(MockSource::gated(
            vec![page(&["A"], false), page(&["B"], false)],
            vec![1],
        ));
        controller.set_authenticated(true).await;
        let gate = controller.source().gate.clone();

        let (refreshed, more) = tokio::join!(controller.refresh(), async {
            assert!(controller.is_refreshing());
            assert!(!controller.is_loading_more());
            let outcome = controller.load_more().await;
            gate.notify_one();
            outcome
        });

        assert_eq!(refreshed, FetchOutcome::Loaded { page: 0, fetched: 1 });
        assert_eq!(more, FetchOutcome::Skipped(SkipReason::Busy));
        assert_eq!(controller.items(), vec!["B"]);
    }

    #[tokio::test]
    async fn test_refresh_supersedes_in_flight_load_more() {
        let controller = CollectionController::new(MockSource::gated(
            vec![
                page(&["A", "B"], false),
                page(&["stale"], false),
                page(&["X", "Y"], false),
            ],
            vec![1],
        ));
        controller.set_authenticated(true).await;
        let gate = controller.source().gate.clone();

        let (more, refreshed) = tokio::join!(controller.load_more(), async {
            let outcome = controller.refresh().await;
            gate.notify_one();
            outcome
        });

        assert_eq!(more, FetchOutcome::Superseded);
        assert_eq!(refreshed, FetchOutcome::Loaded { page: 0, fetched: 2 });
        assert_eq!(controller.items(), vec!["X", "Y"]);
        assert_eq!(controller.next_page(), 1);
        assert!(!controller.is_loading_more());
    }

    #[tokio::test]
    async fn test_overlapping_refreshes_apply_only_the_newest() {
        let controller = CollectionController::new(MockSource::gated(
            vec![page(&["A"], false), page(&["old"], true), page(&["new"], false)],
            vec![1],
        ));
        controller.set_authenticated(true).await;
        let gate = controller.source().gate.clone();

        let (older, newer) = tokio::join!(controller.refresh(), async {
            let outcome = controller.refresh().await;
            gate.notify_one();
            outcome
        });

        assert_eq!(older, FetchOutcome::Superseded);
        assert_eq!(newer, FetchOutcome::Loaded { page: 0, fetched: 1 });
        assert_eq!(controller.items(), vec!["new"]);
        assert!(controller.has_more());
        assert!(!controller.is_refreshing());
        assert_eq!(controller.source().calls().len(), 3);
    }

    #[tokio::test]
    async fn test_apply_filters_triggers_one_page_zero_fetch() {
        let controller = CollectionController::new(MockSource::new(vec![
            page(&["A", "B"], false),
            page(&["C"], false),
            page(&["done-1"], true),
        ]));
        controller.set_authenticated(true).await;
        controller.load_more().await;

        let filters = FilterCriteria {
            status: Some(TaskStatus::Done),
            ..Default::default()
        };
        let outcome = controller.apply_filters(filters.clone()).await;

        assert_eq!(outcome, FetchOutcome::Loaded { page: 0, fetched: 1 });
        assert_eq!(controller.items(), vec!["done-1"]);
        assert_eq!(controller.filters(), filters);

        let calls = controller.source().calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[2].page, 0);
        assert_eq!(calls[2].filters, filters);
    }

    #[tokio::test]
    async fn test_search_and_clear_filters() {
        let controller = CollectionController::new(MockSource::new(vec![
            page(&["A"], true),
            page(&["match"], true),
            page(&["A"], true),
        ]));
        controller.set_authenticated(true).await;

        controller
            .apply_filters(FilterCriteria {
                is_overdue: Some(true),
                ..Default::default()
            })
            .await;
        controller.search_by_title("launch").await;
        assert_eq!(controller.title_query(), "launch");

        let calls = controller.source().calls();
        assert_eq!(calls[2].title, "launch");
        assert_eq!(calls[2].filters.is_overdue, Some(true));

        controller.clear_filters().await;
        let calls = controller.source().calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[3].title, "");
        assert!(calls[3].filters.is_empty());
        assert_eq!(controller.title_query(), "");
    }

    #[tokio::test]
    async fn test_signed_out_controller_makes_no_requests() {
        let controller = CollectionController::new(MockSource::new(vec![page(&["A"], false)]));

        assert_eq!(
            controller.refresh().await,
            FetchOutcome::Skipped(SkipReason::NotAuthenticated)
        );
        assert_eq!(
            controller.load_more().await,
            FetchOutcome::Skipped(SkipReason::NotAuthenticated)
        );
        // Filters are remembered and used by the first authenticated load
        controller.search_by_title("alpha").await;
        assert!(controller.source().calls().is_empty());

        controller.set_authenticated(true).await;
        let calls = controller.source().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].title, "alpha");

        // Same value again is a no-op
        assert_eq!(controller.set_authenticated(true).await, None);
        assert_eq!(controller.source().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_sign_out_clears_state() {
        let controller = CollectionController::new(MockSource::new(vec![
            page(&["A", "B"], false),
            page(&["C"], true),
        ]));
        controller.set_authenticated(true).await;
        controller.load_more().await;
        assert!(!controller.has_more());

        controller.set_authenticated(false).await;

        let state = controller.snapshot();
        assert!(state.items.is_empty());
        assert_eq!(state.next_page, 0);
        assert!(state.has_more);
        assert!(!state.is_loading_more);
        assert!(!state.is_refreshing);
        assert!(!controller.is_authenticated());
    }

    #[tokio::test]
    async fn test_response_after_sign_out_is_discarded() {
        let controller = CollectionController::new(MockSource::gated(
            vec![page(&["A"], false), page(&["late"], false)],
            vec![1],
        ));
        controller.set_authenticated(true).await;
        let gate = controller.source().gate.clone();

        let (more, ()) = tokio::join!(controller.load_more(), async {
            controller.sign_out();
            gate.notify_one();
        });

        assert_eq!(more, FetchOutcome::Superseded);
        assert!(controller.is_empty());
        assert!(!controller.is_loading_more());
        assert_eq!(controller.next_page(), 0);
    }

    #[tokio::test]
    async fn test_mapper_and_page_size() {
        let controller = CollectionController::with_mapper(
            MockSource::new(vec![page(&["ada", "linus"], true)]),
            |raw: &'static str| raw.to_uppercase(),
        )
        .with_page_size(MEMBER_PAGE_SIZE);

        controller.set_authenticated(true).await;

        assert_eq!(controller.items(), vec!["ADA".to_string(), "LINUS".to_string()]);
        assert_eq!(controller.source().calls()[0].size, MEMBER_PAGE_SIZE);

        let tiny = CollectionController::new(MockSource::default()).with_page_size(0);
        assert_eq!(tiny.page_size(), 1);
    }
}
