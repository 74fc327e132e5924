//! Central application state for loandesk.
//!
//! This module owns all mutable UI state: the current mode and view, which
//! panel has focus, the two list panes with their debounced queries, the
//! row selection, both bulk-action modals, and the notification snapshot.
//! No ratatui rendering logic lives here — `app.rs` is pure state that is
//! read by the render module and mutated by the keybinding dispatcher and
//! the network-result handler.

use std::time::Instant;

use ratatui::layout::Rect;
use ratatui::widgets::TableState;
use tokio::sync::mpsc::UnboundedSender;

use loandesk_core::bulk::{AssignModal, StatusModal};
use loandesk_core::db::NewActionLog;
use loandesk_core::fetch::{Applied, ListPane};
use loandesk_core::notify::NotificationSnapshot;
use loandesk_core::selection::SelectionSet;
use loandesk_core::types::{
    ActionLogEntry, ApplicationStatus, LoanApplication, ReasonCode, Reviewer, UserAccount,
    UserRole,
};

use crate::net::types::{NetRequest, NetResult};

/// Statuses an administrator may move applications into. Drafts belong to
/// applicants and are never a bulk-change target.
pub const TARGET_STATUSES: [ApplicationStatus; 4] = [
    ApplicationStatus::Submitted,
    ApplicationStatus::UnderReview,
    ApplicationStatus::Approved,
    ApplicationStatus::Rejected,
];

/// Roles offered by the users view's role filter, in cycle order.
const ROLE_FILTERS: [UserRole; 3] = [UserRole::Applicant, UserRole::Reviewer, UserRole::Admin];

/// Input mode controlling which keybinding set is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Normal navigation/selection mode (default).
    #[default]
    Normal,
    /// The search box is being edited; keystrokes mutate the query.
    Search,
    /// The bulk status-change modal is open.
    StatusModal,
    /// The reviewer-assignment modal is open.
    AssignModal,
    /// Full-screen help overlay is shown above all panels.
    HelpOverlay,
    /// Quit-confirmation dialog shown when a selection would be discarded.
    ConfirmQuit,
}

/// Which list the centre table is showing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum View {
    #[default]
    Applications,
    Users,
}

impl View {
    pub fn title(self) -> &'static str {
        match self {
            View::Applications => "Applications",
            View::Users => "Users",
        }
    }
}

/// Which panel currently has keyboard focus.
///
/// Navigation cycles Notifications → Table → Detail via `next()` and in
/// reverse via `prev()`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    /// Left panel: review queue and recent activity.
    Notifications,
    /// Centre panel: the paginated applications/users table.
    #[default]
    Table,
    /// Right panel: detail card for the highlighted row.
    Detail,
}

impl PanelFocus {
    pub fn prev(self) -> Self {
        match self {
            PanelFocus::Notifications => PanelFocus::Detail,
            PanelFocus::Table => PanelFocus::Notifications,
            PanelFocus::Detail => PanelFocus::Table,
        }
    }

    pub fn next(self) -> Self {
        match self {
            PanelFocus::Notifications => PanelFocus::Table,
            PanelFocus::Table => PanelFocus::Detail,
            PanelFocus::Detail => PanelFocus::Notifications,
        }
    }
}

/// Which field of the status-change modal is focused.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ModalField {
    #[default]
    Status,
    Reason,
    Comment,
}

impl ModalField {
    pub fn next(self) -> Self {
        match self {
            ModalField::Status => ModalField::Reason,
            ModalField::Reason => ModalField::Comment,
            ModalField::Comment => ModalField::Status,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ModalField::Status => ModalField::Comment,
            ModalField::Reason => ModalField::Status,
            ModalField::Comment => ModalField::Reason,
        }
    }
}

/// All mutable UI state passed through every render cycle.
///
/// Bundled so the render function receives a single reference and the
/// keybinding dispatcher a single mutable reference.
pub struct AppState {
    pub mode: Mode,
    pub view: View,
    pub focus: PanelFocus,

    /// Applications list: query, debounce, token guard, current page.
    pub apps: ListPane<LoanApplication>,
    /// Users list: same machinery, independent state.
    pub users: ListPane<UserAccount>,
    /// Checked application ids for bulk actions. Applications only —
    /// there are no bulk user operations.
    pub selection: SelectionSet,

    /// Stateful highlight for the centre table (shared by both views).
    pub table_state: TableState,
    /// Inner height of the table panel after borders, cached per render.
    pub table_viewport_height: u16,
    /// Outer rects of the three panels, cached per render for mouse focus.
    pub panel_rects: [Rect; 3],

    pub notifications: NotificationSnapshot,
    /// Sticky error from the most recent failed poll, shown in the panel.
    pub poll_error: Option<String>,
    /// Most recent bulk actions submitted from this session, newest first.
    pub audit: Vec<ActionLogEntry>,

    /// Reviewer roster for the assignment modal.
    pub roster: Vec<Reviewer>,
    /// Cursor into `roster` while the assignment modal is open.
    pub roster_choice: usize,

    pub status_modal: StatusModal,
    pub assign_modal: AssignModal,
    /// Focused field of the status modal.
    pub modal_field: ModalField,

    /// Vertical scroll offset of the help overlay.
    pub help_scroll: u16,
    /// Transient message in the status bar (errors, bulk outcomes).
    pub status_message: Option<String>,

    /// Local console session the action log attaches to.
    pub session_id: String,

    /// Channel into the network worker. `None` only in tests.
    pub net_tx: Option<UnboundedSender<NetRequest>>,

    /// Whether the users view has issued its first fetch yet.
    users_started: bool,
}

impl AppState {
    pub fn new(page_size: u32, debounce: std::time::Duration, session_id: String) -> Self {
        Self {
            mode: Mode::default(),
            view: View::default(),
            focus: PanelFocus::default(),
            apps: ListPane::new(page_size, debounce),
            users: ListPane::new(page_size, debounce),
            selection: SelectionSet::default(),
            table_state: TableState::default(),
            table_viewport_height: 0,
            panel_rects: [Rect::default(); 3],
            notifications: NotificationSnapshot::default(),
            poll_error: None,
            audit: Vec::new(),
            roster: Vec::new(),
            roster_choice: 0,
            status_modal: StatusModal::default(),
            assign_modal: AssignModal::default(),
            modal_field: ModalField::default(),
            help_scroll: 0,
            status_message: None,
            session_id,
            net_tx: None,
            users_started: false,
        }
    }

    fn send(&self, request: NetRequest) {
        if let Some(tx) = &self.net_tx {
            let _ = tx.send(request);
        }
    }

    /// Issues the initial applications fetch and the roster request.
    /// Called once after the network worker is wired up.
    pub fn start(&mut self) {
        let (token, query) = self.apps.force_fetch();
        self.send(NetRequest::LoadApplications { token, query });
        self.send(NetRequest::LoadRoster);
    }

    /// Fires any due debounce timers. Called on every logic tick.
    pub fn on_tick(&mut self, now: Instant) {
        if let Some((token, query)) = self.apps.take_due_fetch(now) {
            self.send(NetRequest::LoadApplications { token, query });
        }
        if let Some((token, query)) = self.users.take_due_fetch(now) {
            self.send(NetRequest::LoadUsers { token, query });
        }
    }

    /// Asks the worker for a fresh stats + activity snapshot. Called on
    /// every firing of the poll schedule; deliberately unguarded, so a
    /// slow poll may overlap the next one (last write wins).
    pub fn poll_notifications(&self) {
        self.send(NetRequest::Poll);
    }

    /// Re-fetches the visible view with its current query, immediately.
    pub fn refresh_current(&mut self) {
        match self.view {
            View::Applications => {
                let (token, query) = self.apps.force_fetch();
                self.send(NetRequest::LoadApplications { token, query });
            }
            View::Users => {
                let (token, query) = self.users.force_fetch();
                self.send(NetRequest::LoadUsers { token, query });
            }
        }
    }

    /// Toggles between the applications and users views. The first switch
    /// to the users view triggers its initial fetch.
    pub fn switch_view(&mut self) {
        self.view = match self.view {
            View::Applications => View::Users,
            View::Users => View::Applications,
        };
        if self.view == View::Users && !self.users_started {
            self.users_started = true;
            let (token, query) = self.users.force_fetch();
            self.send(NetRequest::LoadUsers { token, query });
        }
        self.clamp_table_selection();
    }

    /// Number of rows the centre table currently shows.
    pub fn row_count(&self) -> usize {
        match self.view {
            View::Applications => self.apps.rows().len(),
            View::Users => self.users.rows().len(),
        }
    }

    fn clamp_table_selection(&mut self) {
        let count = self.row_count();
        if count == 0 {
            self.table_state.select(None);
        } else {
            let idx = self.table_state.selected().unwrap_or(0).min(count - 1);
            self.table_state.select(Some(idx));
        }
    }

    pub fn select_next_row(&mut self) {
        self.table_state.scroll_down_by(1);
        self.clamp_table_selection();
    }

    pub fn select_prev_row(&mut self) {
        self.table_state.scroll_up_by(1);
        self.clamp_table_selection();
    }

    /// Moves the highlight half a viewport down, using the table height
    /// cached by the previous render (1 on the very first frame).
    pub fn half_page_down(&mut self) {
        let half = (self.table_viewport_height / 2).max(1);
        self.table_state.scroll_down_by(half);
        self.clamp_table_selection();
    }

    /// Moves the highlight half a viewport up.
    pub fn half_page_up(&mut self) {
        let half = (self.table_viewport_height / 2).max(1);
        self.table_state.scroll_up_by(half);
        self.clamp_table_selection();
    }

    pub fn select_first_row(&mut self) {
        if self.row_count() > 0 {
            self.table_state.select(Some(0));
        }
    }

    pub fn select_last_row(&mut self) {
        let count = self.row_count();
        if count > 0 {
            self.table_state.select(Some(count - 1));
        }
    }

    /// The highlighted application, when the applications view is active.
    pub fn current_application(&self) -> Option<&LoanApplication> {
        if self.view != View::Applications {
            return None;
        }
        self.table_state
            .selected()
            .and_then(|idx| self.apps.rows().get(idx))
    }

    /// The highlighted user, when the users view is active.
    pub fn current_user(&self) -> Option<&UserAccount> {
        if self.view != View::Users {
            return None;
        }
        self.table_state
            .selected()
            .and_then(|idx| self.users.rows().get(idx))
    }

    /// Toggles selection of the highlighted application row.
    pub fn toggle_current(&mut self) {
        if let Some(id) = self.current_application().map(|a| a.id.clone()) {
            self.selection.toggle(&id);
        }
    }

    /// Selects every application row on the current page.
    pub fn select_all_visible(&mut self) {
        if self.view == View::Applications {
            let ids: Vec<String> = self.apps.visible_ids().map(str::to_owned).collect();
            self.selection.select_all_visible(ids.iter().map(String::as_str));
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Search text of the visible view, for the status bar and search box.
    pub fn current_search(&self) -> &str {
        match self.view {
            View::Applications => &self.apps.query().search_text,
            View::Users => &self.users.query().search_text,
        }
    }

    pub fn search_push(&mut self, ch: char, now: Instant) {
        let mut text = self.current_search().to_owned();
        text.push(ch);
        match self.view {
            View::Applications => self.apps.edit_search(&text, now),
            View::Users => self.users.edit_search(&text, now),
        }
    }

    pub fn search_pop(&mut self, now: Instant) {
        let mut text = self.current_search().to_owned();
        text.pop();
        match self.view {
            View::Applications => self.apps.edit_search(&text, now),
            View::Users => self.users.edit_search(&text, now),
        }
    }

    /// The active filter value of the visible view (status or role).
    pub fn current_filter(&self) -> Option<&str> {
        match self.view {
            View::Applications => self.apps.query().filters.get("status").map(String::as_str),
            View::Users => self.users.query().filters.get("role").map(String::as_str),
        }
    }

    /// Cycles the view's filter through unfiltered → each value → unfiltered.
    pub fn cycle_filter(&mut self, now: Instant) {
        match self.view {
            View::Applications => {
                let current = self.apps.query().filters.get("status").cloned();
                let next = next_in_cycle(
                    current.as_deref(),
                    &ApplicationStatus::ALL.map(ApplicationStatus::as_str),
                );
                self.apps.edit_filter("status", next, now);
            }
            View::Users => {
                let current = self.users.query().filters.get("role").cloned();
                let next =
                    next_in_cycle(current.as_deref(), &ROLE_FILTERS.map(UserRole::as_str));
                self.users.edit_filter("role", next, now);
            }
        }
    }

    /// Drops the view's filter entirely.
    pub fn clear_filter(&mut self, now: Instant) {
        match self.view {
            View::Applications => self.apps.edit_filter("status", None, now),
            View::Users => self.users.edit_filter("role", None, now),
        }
    }

    /// Moves to the previous/next page of the visible view.
    pub fn page_step(&mut self, step: i32, now: Instant) {
        let pane_page = match self.view {
            View::Applications => self.apps.query().page,
            View::Users => self.users.query().page,
        };
        let target = if step.is_negative() {
            pane_page.saturating_sub(step.unsigned_abs())
        } else {
            pane_page.saturating_add(step as u32)
        };
        match self.view {
            View::Applications => self.apps.edit_page(target, now),
            View::Users => self.users.edit_page(target, now),
        }
    }

    /// Opens the bulk status-change modal over the current selection.
    pub fn open_status_modal(&mut self) {
        if self.view != View::Applications {
            return;
        }
        if self.status_modal.open(&self.selection) {
            self.mode = Mode::StatusModal;
            self.modal_field = ModalField::Status;
        } else {
            self.status_message = Some("Select at least one application first.".to_owned());
        }
    }

    /// Opens the reviewer-assignment modal over the current selection.
    pub fn open_assign_modal(&mut self) {
        if self.view != View::Applications {
            return;
        }
        if self.roster.is_empty() {
            self.status_message = Some("Reviewer roster not loaded yet.".to_owned());
            return;
        }
        if self.assign_modal.open(&self.selection) {
            self.mode = Mode::AssignModal;
            self.roster_choice = 0;
        } else {
            self.status_message = Some("Select at least one application first.".to_owned());
        }
    }

    /// Cycles the status field of the status modal.
    pub fn cycle_modal_status(&mut self, step: i32) {
        let current = self.status_modal.draft().and_then(|d| d.status);
        let idx = current
            .and_then(|s| TARGET_STATUSES.iter().position(|t| *t == s))
            .map(|i| step_index(i, step, TARGET_STATUSES.len()))
            .unwrap_or(0);
        self.status_modal.choose_status(TARGET_STATUSES[idx]);
    }

    /// Cycles the reason field through "no reason" plus each allowed code.
    pub fn cycle_modal_reason(&mut self, step: i32) {
        let Some(draft) = self.status_modal.draft() else {
            return;
        };
        let Some(status) = draft.status else { return };
        let allowed = ReasonCode::allowed_for(status);
        if allowed.is_empty() {
            return;
        }
        // Positions: 0 = no reason, 1..=len = allowed[i - 1].
        let current = draft
            .reason
            .and_then(|r| allowed.iter().position(|a| *a == r))
            .map(|i| i + 1)
            .unwrap_or(0);
        let next = step_index(current, step, allowed.len() + 1);
        let choice = if next == 0 { None } else { Some(allowed[next - 1]) };
        self.status_modal.choose_reason(choice);
    }

    /// Cycles the roster cursor and applies the choice to the draft.
    pub fn cycle_roster(&mut self, step: i32) {
        if self.roster.is_empty() {
            return;
        }
        self.roster_choice = step_index(self.roster_choice, step, self.roster.len());
        let id = self.roster[self.roster_choice].id.clone();
        self.assign_modal.choose_reviewer(&id);
    }

    /// Validates and submits the status modal. On validation failure the
    /// error is already on the draft; nothing is sent.
    pub fn submit_status_modal(&mut self) {
        if let Some(request) = self.status_modal.submit() {
            self.send(NetRequest::SubmitStatus(request));
        }
    }

    pub fn submit_assign_modal(&mut self) {
        if let Some(request) = self.assign_modal.submit() {
            self.send(NetRequest::SubmitAssign(request));
        }
    }

    /// Dismisses whichever modal is open (no-op while submitting).
    pub fn cancel_modal(&mut self) {
        match self.mode {
            Mode::StatusModal => {
                self.status_modal.cancel();
                if !self.status_modal.is_open() {
                    self.mode = Mode::Normal;
                }
            }
            Mode::AssignModal => {
                self.assign_modal.cancel();
                if !self.assign_modal.is_open() {
                    self.mode = Mode::Normal;
                }
            }
            _ => {}
        }
    }

    /// Applies a network completion to the state.
    ///
    /// Returns an audit-log row to persist when the completion was a bulk
    /// submit outcome; the caller owns the database handle.
    pub fn apply_net(&mut self, result: NetResult) -> Option<NewActionLog> {
        match result {
            NetResult::Applications { token, outcome } => {
                let failed = outcome.is_err();
                if let Applied::Current { rows_changed } = self.apps.apply(token, outcome) {
                    if rows_changed {
                        // Rows on screen changed identity: stale selection
                        // must not survive into a bulk action.
                        self.selection.clear();
                    }
                    if failed {
                        self.status_message =
                            Some("Could not load applications — check the log.".to_owned());
                    }
                    if self.view == View::Applications {
                        self.clamp_table_selection();
                    }
                }
                None
            }
            NetResult::Users { token, outcome } => {
                let failed = outcome.is_err();
                if let Applied::Current { .. } = self.users.apply(token, outcome) {
                    if failed {
                        self.status_message =
                            Some("Could not load users — check the log.".to_owned());
                    }
                    if self.view == View::Users {
                        self.clamp_table_selection();
                    }
                }
                None
            }
            NetResult::Roster(outcome) => {
                match outcome {
                    Ok(roster) => {
                        self.roster = roster;
                        self.roster_choice = 0;
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "roster fetch failed");
                        self.status_message =
                            Some("Could not load the reviewer roster.".to_owned());
                    }
                }
                None
            }
            NetResult::Poll { stats, activity } => {
                match (stats, activity) {
                    (Ok(buckets), Ok(entries)) => {
                        self.notifications.apply(buckets, entries);
                        self.poll_error = None;
                    }
                    (stats, activity) => {
                        for err in [stats.err(), activity.err()].into_iter().flatten() {
                            tracing::warn!(error = %err, "notification poll failed");
                        }
                        self.poll_error = Some("Poll failed — retrying on schedule.".to_owned());
                    }
                }
                None
            }
            NetResult::StatusSubmitted { request, outcome } => {
                let ok = outcome.is_ok();
                if ok {
                    self.status_modal.resolve_success();
                    self.mode = Mode::Normal;
                    self.selection.clear();
                    self.status_message = Some(format!(
                        "Status set to {} for {} application(s).",
                        request.status.label(),
                        request.ids.len()
                    ));
                    self.refresh_current();
                } else {
                    self.status_modal
                        .resolve_failure("The batch was not applied. Try again.");
                }
                Some(NewActionLog {
                    session_id: self.session_id.clone(),
                    kind: "status_change".to_owned(),
                    application_ids: request.ids,
                    detail: request.status.as_str().to_owned(),
                    comment: request.comment,
                    outcome: if ok { "accepted" } else { "failed" }.to_owned(),
                })
            }
            NetResult::AssignSubmitted { request, outcome } => {
                let ok = outcome.is_ok();
                if ok {
                    self.assign_modal.resolve_success();
                    self.mode = Mode::Normal;
                    self.selection.clear();
                    self.status_message = Some(format!(
                        "Assigned {} application(s) for review.",
                        request.ids.len()
                    ));
                    self.refresh_current();
                } else {
                    self.assign_modal
                        .resolve_failure("The assignment was not applied. Try again.");
                }
                Some(NewActionLog {
                    session_id: self.session_id.clone(),
                    kind: "assign_reviewer".to_owned(),
                    application_ids: request.ids,
                    detail: request.reviewer_id,
                    comment: String::new(),
                    outcome: if ok { "accepted" } else { "failed" }.to_owned(),
                })
            }
        }
    }
}

/// Steps `index` by `step` within `len`, wrapping in both directions.
fn step_index(index: usize, step: i32, len: usize) -> usize {
    debug_assert!(len > 0);
    let len = len as i64;
    (((index as i64 + step as i64) % len + len) % len) as usize
}

/// The value after `current` in `values`, where `None` (unfiltered) sits
/// before the first and after the last entry.
fn next_in_cycle<'a>(current: Option<&str>, values: &[&'a str]) -> Option<&'a str> {
    match current {
        None => values.first().copied(),
        Some(value) => values
            .iter()
            .position(|v| *v == value)
            .and_then(|i| values.get(i + 1))
            .copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loandesk_core::error::ApiError;

    fn state_with_selection() -> (AppState, tokio::sync::mpsc::UnboundedReceiver<NetRequest>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let mut state = AppState::new(
            20,
            std::time::Duration::from_millis(300),
            "sess-1".to_owned(),
        );
        state.net_tx = Some(tx);
        state.selection.toggle("la-1");
        state.selection.toggle("la-2");
        let selection = state.selection.clone();
        state.status_modal.open(&selection);
        state.mode = Mode::StatusModal;
        state.status_modal.choose_status(ApplicationStatus::Approved);
        state.status_modal.push_comment_char('k');
        (state, rx)
    }

    #[test]
    fn bulk_success_clears_selection_and_issues_refresh() {
        let (mut state, mut rx) = state_with_selection();
        let request = state.status_modal.submit().expect("valid draft");

        let entry = state
            .apply_net(NetResult::StatusSubmitted {
                request,
                outcome: Ok(()),
            })
            .expect("audit row");

        assert_eq!(entry.outcome, "accepted");
        assert_eq!(entry.application_ids, ["la-1", "la-2"]);
        assert_eq!(state.selection.count(), 0);
        assert_eq!(state.mode, Mode::Normal);
        assert!(!state.status_modal.is_open());
        match rx.try_recv().expect("refresh fetch issued") {
            NetRequest::LoadApplications { .. } => {}
            other => panic!("expected a refresh fetch, got {other:?}"),
        }
    }

    #[test]
    fn bulk_failure_keeps_modal_open_and_selection_intact() {
        let (mut state, mut rx) = state_with_selection();
        let request = state.status_modal.submit().expect("valid draft");

        let entry = state
            .apply_net(NetResult::StatusSubmitted {
                request,
                outcome: Err(ApiError::Status {
                    status: 500,
                    body: "boom".into(),
                }),
            })
            .expect("audit row");

        assert_eq!(entry.outcome, "failed");
        assert_eq!(state.selection.count(), 2);
        assert_eq!(state.mode, Mode::StatusModal);
        assert!(state.status_modal.is_open());
        assert!(!state.status_modal.is_submitting());
        assert!(state.status_modal.draft().unwrap().error.is_some());
        // No refresh fetch on failure.
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn step_index_wraps_both_directions() {
        assert_eq!(step_index(0, 1, 3), 1);
        assert_eq!(step_index(2, 1, 3), 0);
        assert_eq!(step_index(0, -1, 3), 2);
    }

    #[test]
    fn filter_cycle_walks_values_then_clears() {
        let values = ["A", "B"];
        assert_eq!(next_in_cycle(None, &values), Some("A"));
        assert_eq!(next_in_cycle(Some("A"), &values), Some("B"));
        assert_eq!(next_in_cycle(Some("B"), &values), None);
        // An unknown stored value restarts the cycle from unfiltered.
        assert_eq!(next_in_cycle(Some("zzz"), &values), None);
    }
}
