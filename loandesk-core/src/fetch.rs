//! Debounced fetch control for the paginated admin list views.
//!
//! A [`ListPane`] owns everything one list view needs to stay consistent
//! under rapid query edits and out-of-order network completions:
//!
//! - the current [`ListQuery`] and the last applied [`ListResult`],
//! - a [`Debouncer`] that coalesces a burst of edits into one fetch,
//! - a monotonically increasing [`RequestToken`] counter implementing
//!   last-request-wins: a completion is applied only when its token equals
//!   the most recently minted one, regardless of arrival order.
//!
//! The pane performs no I/O itself. The event loop asks it what to fetch
//! (`take_due_fetch` on each tick, `force_fetch` for manual refresh), hands
//! the minted token to the network worker, and feeds the completion back
//! through [`ListPane::apply`]. Time is always passed in by the caller so
//! the whole controller is deterministic under test.

use std::time::{Duration, Instant};

use crate::error::ApiError;
use crate::query::{ListQuery, ListResult};
use crate::types::HasId;

/// Opaque id minted per outgoing fetch, strictly increasing per pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// Coalesces a burst of query edits into a single fire.
///
/// Every edit re-arms the deadline to `now + window`; the timer fires once
/// the deadline passes with no further edits. A fired or cancelled timer
/// stays quiet until the next edit.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Re-arms the timer: the pending deadline (if any) is replaced.
    pub fn note_edit(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// Returns `true` exactly once per armed deadline, when it has passed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drops any pending deadline without firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

/// Outcome of feeding a completion into [`ListPane::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The completion carried the current token and was applied.
    /// `rows_changed` is `true` when the displayed row identity set differs
    /// from before — the caller must clear its selection in that case.
    Current { rows_changed: bool },
    /// The completion was superseded by a newer request and was discarded.
    Stale,
}

/// Query state, debounce timer, and last-request-wins guard for one view.
pub struct ListPane<T> {
    query: ListQuery,
    result: ListResult<T>,
    debouncer: Debouncer,
    loading: bool,
    next_token: u64,
    current: Option<RequestToken>,
    /// Ids of the rows currently displayed, in display order.
    row_ids: Vec<String>,
}

impl<T: HasId> ListPane<T> {
    pub fn new(page_size: u32, debounce_window: Duration) -> Self {
        Self {
            query: ListQuery::new(page_size),
            result: ListResult::default(),
            debouncer: Debouncer::new(debounce_window),
            loading: false,
            next_token: 0,
            current: None,
            row_ids: Vec::new(),
        }
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn rows(&self) -> &[T] {
        &self.result.rows
    }

    pub fn meta(&self) -> crate::query::PageMeta {
        self.result.meta
    }

    /// `true` while the most recently minted request is still in flight.
    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Ids of the currently displayed rows, for select-all-visible.
    pub fn visible_ids(&self) -> impl Iterator<Item = &str> {
        self.row_ids.iter().map(String::as_str)
    }

    /// Edits the search text; arms the debounce timer when it changed.
    pub fn edit_search(&mut self, text: &str, now: Instant) {
        if self.query.set_search(text) {
            self.debouncer.note_edit(now);
        }
    }

    /// Sets or clears a named filter; arms the debounce timer when changed.
    pub fn edit_filter(&mut self, name: &str, value: Option<&str>, now: Instant) {
        if self.query.set_filter(name, value) {
            self.debouncer.note_edit(now);
        }
    }

    /// Changes the page size; arms the debounce timer when changed.
    pub fn edit_page_size(&mut self, page_size: u32, now: Instant) {
        if self.query.set_page_size(page_size) {
            self.debouncer.note_edit(now);
        }
    }

    /// Moves to another page; arms the debounce timer when changed.
    /// `page` is clamped to 1 below and, when the last known total is
    /// trustworthy, to `total_pages` above.
    pub fn edit_page(&mut self, page: u32, now: Instant) {
        let cap = self.result.meta.total_pages;
        let page = if cap > 0 { page.min(cap) } else { page };
        if self.query.set_page(page) {
            self.debouncer.note_edit(now);
        }
    }

    /// Fires the debounce timer if due, minting one request for the settled
    /// query. Called from the event loop's logic tick.
    pub fn take_due_fetch(&mut self, now: Instant) -> Option<(RequestToken, ListQuery)> {
        if self.debouncer.fire(now) {
            Some(self.mint())
        } else {
            None
        }
    }

    /// Mints a request for the current query immediately, cancelling any
    /// pending debounce. Used for the initial load and manual refresh.
    pub fn force_fetch(&mut self) -> (RequestToken, ListQuery) {
        self.debouncer.cancel();
        self.mint()
    }

    fn mint(&mut self) -> (RequestToken, ListQuery) {
        self.next_token += 1;
        let token = RequestToken(self.next_token);
        self.current = Some(token);
        self.loading = true;
        (token, self.query.clone())
    }

    /// Applies a fetch completion under the last-request-wins rule.
    ///
    /// A completion whose token is not the current one is discarded without
    /// touching any state — including the loading flag, which belongs to
    /// the current token's flight only. A current-token failure applies as
    /// an empty result set; the error itself is only logged.
    pub fn apply(
        &mut self,
        token: RequestToken,
        outcome: Result<ListResult<T>, ApiError>,
    ) -> Applied {
        if self.current != Some(token) {
            tracing::debug!(?token, "dropping superseded list response");
            return Applied::Stale;
        }
        self.current = None;
        self.loading = false;

        let result = match outcome {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(error = %err, "list fetch failed; showing empty result");
                ListResult::empty(&self.query)
            }
        };

        let new_ids: Vec<String> =
            result.rows.iter().map(|row| row.id().to_owned()).collect();
        let rows_changed = new_ids != self.row_ids;
        self.row_ids = new_ids;
        self.result = result;

        Applied::Current { rows_changed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::PageMeta;

    struct Row(&'static str);

    impl HasId for Row {
        fn id(&self) -> &str {
            self.0
        }
    }

    fn page(ids: &[&'static str]) -> ListResult<Row> {
        ListResult {
            rows: ids.iter().map(|id| Row(id)).collect(),
            meta: PageMeta::for_total(1, 20, ids.len() as u64),
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn burst_of_edits_issues_one_fetch_for_settled_query() {
        let t0 = Instant::now();
        let mut pane: ListPane<Row> = ListPane::new(20, ms(300));

        pane.edit_search("a", t0);
        pane.edit_search("ac", t0 + ms(80));
        pane.edit_search("acm", t0 + ms(160));
        pane.edit_search("acme", t0 + ms(240));

        // Quiet period not yet elapsed since the last edit.
        assert!(pane.take_due_fetch(t0 + ms(400)).is_none());

        let (_, query) = pane.take_due_fetch(t0 + ms(540)).expect("debounce due");
        assert_eq!(query.search_text, "acme");
        assert_eq!(query.page, 1);

        // Fired once; nothing further without a new edit.
        assert!(pane.take_due_fetch(t0 + ms(2000)).is_none());
    }

    #[test]
    fn later_token_wins_regardless_of_arrival_order() {
        let t0 = Instant::now();
        let mut pane: ListPane<Row> = ListPane::new(20, ms(300));

        pane.edit_search("first", t0);
        let (t1, _) = pane.take_due_fetch(t0 + ms(300)).unwrap();
        pane.edit_search("second", t0 + ms(400));
        let (t2, _) = pane.take_due_fetch(t0 + ms(700)).unwrap();
        assert!(t1 < t2);

        // T2 completes first and is applied.
        assert_eq!(
            pane.apply(t2, Ok(page(&["b-1", "b-2"]))),
            Applied::Current { rows_changed: true }
        );
        // T1 straggles in afterwards and must be discarded.
        assert_eq!(pane.apply(t1, Ok(page(&["a-1"]))), Applied::Stale);
        let shown: Vec<&str> = pane.rows().iter().map(|r| r.0).collect();
        assert_eq!(shown, ["b-1", "b-2"]);
    }

    #[test]
    fn loading_clears_only_on_current_token() {
        let t0 = Instant::now();
        let mut pane: ListPane<Row> = ListPane::new(20, ms(300));

        pane.edit_search("x", t0);
        let (t1, _) = pane.take_due_fetch(t0 + ms(300)).unwrap();
        pane.edit_search("xy", t0 + ms(350));
        let (t2, _) = pane.take_due_fetch(t0 + ms(650)).unwrap();
        assert!(pane.loading());

        // Stale completion: loading stays on.
        assert_eq!(pane.apply(t1, Ok(page(&["a"]))), Applied::Stale);
        assert!(pane.loading());

        assert!(matches!(pane.apply(t2, Ok(page(&["b"]))), Applied::Current { .. }));
        assert!(!pane.loading());
    }

    #[test]
    fn failure_applies_as_empty_result() {
        let mut pane: ListPane<Row> = ListPane::new(20, ms(300));
        let (token, _) = pane.force_fetch();
        pane.apply(token, Ok(page(&["a", "b"])));

        let (token, query) = pane.force_fetch();
        let outcome = pane.apply(
            token,
            Err(ApiError::Status {
                status: 502,
                body: "bad gateway".into(),
            }),
        );
        // Rows went from two to none: identity changed, caller clears selection.
        assert_eq!(outcome, Applied::Current { rows_changed: true });
        assert!(pane.rows().is_empty());
        assert_eq!(pane.meta().total, 0);
        assert_eq!(pane.meta().page, query.page);
        assert!(!pane.loading());
    }

    #[test]
    fn identical_rows_refresh_reports_unchanged_identity() {
        let mut pane: ListPane<Row> = ListPane::new(20, ms(300));
        let (t1, _) = pane.force_fetch();
        assert_eq!(
            pane.apply(t1, Ok(page(&["a", "b"]))),
            Applied::Current { rows_changed: true }
        );

        let (t2, _) = pane.force_fetch();
        assert_eq!(
            pane.apply(t2, Ok(page(&["a", "b"]))),
            Applied::Current { rows_changed: false }
        );
    }

    #[test]
    fn force_fetch_cancels_pending_debounce() {
        let t0 = Instant::now();
        let mut pane: ListPane<Row> = ListPane::new(20, ms(300));

        pane.edit_search("q", t0);
        let _ = pane.force_fetch();
        // The manual refresh swallowed the armed timer: no double fetch.
        assert!(pane.take_due_fetch(t0 + ms(1000)).is_none());
    }

    #[test]
    fn page_edit_is_clamped_by_known_total_pages() {
        let t0 = Instant::now();
        let mut pane: ListPane<Row> = ListPane::new(2, ms(300));
        let (token, _) = pane.force_fetch();
        let result = ListResult {
            rows: vec![Row("a"), Row("b")],
            meta: PageMeta::for_total(1, 2, 5), // 3 pages
        };
        pane.apply(token, Ok(result));

        pane.edit_page(9, t0);
        assert_eq!(pane.query().page, 3);
        assert!(pane.take_due_fetch(t0 + ms(300)).is_some());
    }
}
