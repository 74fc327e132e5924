//! Bulk-action modal state machines.
//!
//! Both modals follow the same tagged-union shape:
//!
//! `Closed -> Collecting -> (validate on submit) -> Submitting
//!   -> { Closed on success | Collecting with an error on failure }`
//!
//! The machine never performs I/O: `submit()` hands the caller a fully
//! built request exactly once, the caller sends it, and reports back via
//! `resolve_success` / `resolve_failure`. A failed batch returns to
//! `Collecting` with the draft intact so the operator can retry by hand —
//! nothing is ever re-sent automatically. The batch is atomic from the
//! client's perspective; partial backend failure is not modelled.

use serde::Serialize;

use crate::selection::SelectionSet;
use crate::types::{ApplicationStatus, ReasonCode};

/// Body of `PATCH /admin/applications/status/bulk`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkStatusRequest {
    pub ids: Vec<String>,
    pub status: ApplicationStatus,
    pub comment: String,
}

/// Body of `PATCH /admin/applications/bulk/assign`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAssignRequest {
    pub ids: Vec<String>,
    pub reviewer_id: String,
}

/// Encodes an optional reason code into the free-text comment.
///
/// The backend has no structured reason field: the reason label is
/// prefixed into the comment as `"[<label>] <comment>"`. Legacy format —
/// downstream log readers parse it back out with [`split_reason_prefix`].
pub fn encode_comment(reason: Option<ReasonCode>, comment: &str) -> String {
    let comment = comment.trim();
    match reason {
        Some(reason) => format!("[{}] {}", reason.label(), comment),
        None => comment.to_owned(),
    }
}

/// Splits a possibly reason-prefixed comment back into `(reason, comment)`.
///
/// Inverse of [`encode_comment`], tolerant of comments that never carried a
/// prefix. An unterminated `[` is treated as plain comment text.
pub fn split_reason_prefix(comment: &str) -> (Option<&str>, &str) {
    if let Some(rest) = comment.strip_prefix('[') {
        if let Some(end) = rest.find(']') {
            let reason = &rest[..end];
            let tail = rest[end + 1..].trim_start();
            if !reason.is_empty() {
                return (Some(reason), tail);
            }
        }
    }
    (None, comment)
}

/// Collected-so-far input of the status-change modal.
#[derive(Debug, Clone)]
pub struct StatusDraft {
    /// Target application ids, frozen at open time.
    pub ids: Vec<String>,
    pub status: Option<ApplicationStatus>,
    pub reason: Option<ReasonCode>,
    pub comment: String,
    /// Validation or submit error shown inline, cleared on the next edit.
    pub error: Option<String>,
}

/// State machine of the bulk status-change modal.
#[derive(Debug, Default)]
pub enum StatusModal {
    #[default]
    Closed,
    Collecting(StatusDraft),
    Submitting {
        draft: StatusDraft,
        request: BulkStatusRequest,
    },
}

impl StatusModal {
    /// Opens the modal over the current selection.
    ///
    /// Entry guard: refuses to open on an empty selection.
    pub fn open(&mut self, selection: &SelectionSet) -> bool {
        if selection.is_empty() || !matches!(self, StatusModal::Closed) {
            return false;
        }
        *self = StatusModal::Collecting(StatusDraft {
            ids: selection.ids(),
            status: None,
            reason: None,
            comment: String::new(),
            error: None,
        });
        true
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, StatusModal::Closed)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, StatusModal::Submitting { .. })
    }

    pub fn draft(&self) -> Option<&StatusDraft> {
        match self {
            StatusModal::Closed => None,
            StatusModal::Collecting(draft) | StatusModal::Submitting { draft, .. } => Some(draft),
        }
    }

    fn collecting_mut(&mut self) -> Option<&mut StatusDraft> {
        match self {
            StatusModal::Collecting(draft) => Some(draft),
            _ => None,
        }
    }

    /// Chooses the target status. Picking a different status than before
    /// resets any previously chosen reason code, since the allowed set is
    /// derived from the status.
    pub fn choose_status(&mut self, status: ApplicationStatus) {
        if let Some(draft) = self.collecting_mut() {
            if draft.status != Some(status) {
                draft.reason = None;
            }
            draft.status = Some(status);
            draft.error = None;
        }
    }

    /// Chooses (or clears) the reason code. Rejected silently unless the
    /// code is allowed for the currently chosen status.
    pub fn choose_reason(&mut self, reason: Option<ReasonCode>) {
        if let Some(draft) = self.collecting_mut() {
            let allowed = draft
                .status
                .map(ReasonCode::allowed_for)
                .unwrap_or_default();
            match reason {
                Some(code) if !allowed.contains(&code) => {}
                _ => {
                    draft.reason = reason;
                    draft.error = None;
                }
            }
        }
    }

    pub fn push_comment_char(&mut self, ch: char) {
        if let Some(draft) = self.collecting_mut() {
            draft.comment.push(ch);
            draft.error = None;
        }
    }

    pub fn pop_comment_char(&mut self) {
        if let Some(draft) = self.collecting_mut() {
            draft.comment.pop();
        }
    }

    /// Validates the draft and, when valid, builds the batch request and
    /// moves to `Submitting`. Returns the request to send exactly once;
    /// `None` means validation failed and the error is set on the draft.
    pub fn submit(&mut self) -> Option<BulkStatusRequest> {
        let draft = self.collecting_mut()?;
        let status = match draft.status {
            Some(status) => status,
            None => {
                draft.error = Some("Choose a target status.".to_owned());
                return None;
            }
        };
        if draft.comment.trim().is_empty() {
            draft.error = Some("A comment is required.".to_owned());
            return None;
        }

        let request = BulkStatusRequest {
            ids: draft.ids.clone(),
            status,
            comment: encode_comment(draft.reason, &draft.comment),
        };
        let draft = draft.clone();
        *self = StatusModal::Submitting {
            draft,
            request: request.clone(),
        };
        Some(request)
    }

    /// The batch was accepted: the modal closes. The caller clears the
    /// selection and issues the refresh fetch.
    pub fn resolve_success(&mut self) {
        if matches!(self, StatusModal::Submitting { .. }) {
            *self = StatusModal::Closed;
        }
    }

    /// The batch was rejected: back to `Collecting` with the draft intact
    /// and a retry-eligible error shown inline.
    pub fn resolve_failure(&mut self, message: &str) {
        if let StatusModal::Submitting { draft, .. } = self {
            let mut draft = draft.clone();
            draft.error = Some(message.to_owned());
            *self = StatusModal::Collecting(draft);
        }
    }

    /// Dismisses the modal, discarding the draft. Ignored while a batch is
    /// in flight — the request was already sent and its outcome decides.
    pub fn cancel(&mut self) {
        if matches!(self, StatusModal::Collecting(_)) {
            *self = StatusModal::Closed;
        }
    }
}

/// Collected-so-far input of the reviewer-assignment modal.
#[derive(Debug, Clone)]
pub struct AssignDraft {
    pub ids: Vec<String>,
    /// Selected reviewer id from the supplied roster; empty until chosen.
    pub reviewer_id: String,
    pub error: Option<String>,
}

/// State machine of the reviewer-assignment modal. Same shape as
/// [`StatusModal`] with a single required field and no reason-code step.
#[derive(Debug, Default)]
pub enum AssignModal {
    #[default]
    Closed,
    Collecting(AssignDraft),
    Submitting {
        draft: AssignDraft,
        request: BulkAssignRequest,
    },
}

impl AssignModal {
    /// Opens the modal over the current selection; refuses when empty.
    pub fn open(&mut self, selection: &SelectionSet) -> bool {
        if selection.is_empty() || !matches!(self, AssignModal::Closed) {
            return false;
        }
        *self = AssignModal::Collecting(AssignDraft {
            ids: selection.ids(),
            reviewer_id: String::new(),
            error: None,
        });
        true
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, AssignModal::Closed)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, AssignModal::Submitting { .. })
    }

    pub fn draft(&self) -> Option<&AssignDraft> {
        match self {
            AssignModal::Closed => None,
            AssignModal::Collecting(draft) | AssignModal::Submitting { draft, .. } => Some(draft),
        }
    }

    pub fn choose_reviewer(&mut self, reviewer_id: &str) {
        if let AssignModal::Collecting(draft) = self {
            draft.reviewer_id = reviewer_id.to_owned();
            draft.error = None;
        }
    }

    /// Submit gate: enabled only once a reviewer has been chosen.
    pub fn can_submit(&self) -> bool {
        matches!(self, AssignModal::Collecting(draft) if !draft.reviewer_id.is_empty())
    }

    pub fn submit(&mut self) -> Option<BulkAssignRequest> {
        let draft = match self {
            AssignModal::Collecting(draft) => draft,
            _ => return None,
        };
        if draft.reviewer_id.is_empty() {
            draft.error = Some("Choose a reviewer.".to_owned());
            return None;
        }
        let request = BulkAssignRequest {
            ids: draft.ids.clone(),
            reviewer_id: draft.reviewer_id.clone(),
        };
        let draft = draft.clone();
        *self = AssignModal::Submitting {
            draft,
            request: request.clone(),
        };
        Some(request)
    }

    pub fn resolve_success(&mut self) {
        if matches!(self, AssignModal::Submitting { .. }) {
            *self = AssignModal::Closed;
        }
    }

    pub fn resolve_failure(&mut self, message: &str) {
        if let AssignModal::Submitting { draft, .. } = self {
            let mut draft = draft.clone();
            draft.error = Some(message.to_owned());
            *self = AssignModal::Collecting(draft);
        }
    }

    pub fn cancel(&mut self) {
        if matches!(self, AssignModal::Collecting(_)) {
            *self = AssignModal::Closed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(ids: &[&str]) -> SelectionSet {
        let mut sel = SelectionSet::default();
        sel.select_all_visible(ids.iter().copied());
        sel
    }

    #[test]
    fn refuses_to_open_on_empty_selection() {
        let mut modal = StatusModal::default();
        assert!(!modal.open(&SelectionSet::default()));
        assert!(!modal.is_open());
    }

    #[test]
    fn switching_status_resets_chosen_reason() {
        let mut modal = StatusModal::default();
        modal.open(&selection(&["la-1"]));
        modal.choose_status(ApplicationStatus::Rejected);
        modal.choose_reason(Some(ReasonCode::BadCreditHistory));
        modal.push_comment_char('x');
        assert_eq!(modal.draft().unwrap().reason, Some(ReasonCode::BadCreditHistory));

        modal.choose_status(ApplicationStatus::Approved);
        assert_eq!(modal.draft().unwrap().reason, None);
        // Re-choosing the same status keeps whatever is set.
        modal.choose_status(ApplicationStatus::Approved);
        assert_eq!(modal.draft().unwrap().status, Some(ApplicationStatus::Approved));
    }

    #[test]
    fn reason_not_allowed_for_status_is_ignored() {
        let mut modal = StatusModal::default();
        modal.open(&selection(&["la-1"]));
        modal.choose_status(ApplicationStatus::Approved);
        modal.choose_reason(Some(ReasonCode::PolicyViolation));
        assert_eq!(modal.draft().unwrap().reason, None);
    }

    #[test]
    fn empty_comment_blocks_submission() {
        let mut modal = StatusModal::default();
        modal.open(&selection(&["la-1", "la-2"]));
        modal.choose_status(ApplicationStatus::Approved);
        assert!(modal.submit().is_none());
        assert!(modal.draft().unwrap().error.is_some());
        // Still collecting — no request was built.
        assert!(!modal.is_submitting());

        // Whitespace-only is still empty.
        modal.push_comment_char(' ');
        assert!(modal.submit().is_none());
    }

    #[test]
    fn missing_status_blocks_submission() {
        let mut modal = StatusModal::default();
        modal.open(&selection(&["la-1"]));
        for ch in "fine".chars() {
            modal.push_comment_char(ch);
        }
        assert!(modal.submit().is_none());
        assert!(!modal.is_submitting());
    }

    #[test]
    fn reason_code_is_prefixed_into_the_comment() {
        let mut modal = StatusModal::default();
        modal.open(&selection(&["la-2", "la-1"]));
        modal.choose_status(ApplicationStatus::Rejected);
        modal.choose_reason(Some(ReasonCode::BadCreditHistory));
        for ch in "see notes".chars() {
            modal.push_comment_char(ch);
        }

        let request = modal.submit().expect("valid draft");
        assert_eq!(request.status, ApplicationStatus::Rejected);
        assert_eq!(request.comment, "[Bad Credit History] see notes");
        // Ids come from the selection in stable order.
        assert_eq!(request.ids, ["la-1", "la-2"]);
        assert!(modal.is_submitting());
    }

    #[test]
    fn plain_comment_is_sent_unprefixed() {
        let mut modal = StatusModal::default();
        modal.open(&selection(&["la-1"]));
        modal.choose_status(ApplicationStatus::Approved);
        for ch in "docs verified".chars() {
            modal.push_comment_char(ch);
        }
        let request = modal.submit().unwrap();
        assert_eq!(request.comment, "docs verified");
    }

    #[test]
    fn failure_returns_to_collecting_with_draft_intact() {
        let mut modal = StatusModal::default();
        modal.open(&selection(&["la-1"]));
        modal.choose_status(ApplicationStatus::Rejected);
        modal.choose_reason(Some(ReasonCode::PolicyViolation));
        for ch in "kyc".chars() {
            modal.push_comment_char(ch);
        }
        modal.submit().unwrap();

        modal.resolve_failure("The batch update was not applied.");
        let draft = modal.draft().unwrap();
        assert_eq!(draft.status, Some(ApplicationStatus::Rejected));
        assert_eq!(draft.reason, Some(ReasonCode::PolicyViolation));
        assert_eq!(draft.comment, "kyc");
        assert!(draft.error.is_some());
        assert!(!modal.is_submitting());
    }

    #[test]
    fn success_closes_the_modal() {
        let mut modal = StatusModal::default();
        modal.open(&selection(&["la-1"]));
        modal.choose_status(ApplicationStatus::UnderReview);
        modal.push_comment_char('k');
        modal.submit().unwrap();
        modal.resolve_success();
        assert!(!modal.is_open());
    }

    #[test]
    fn assign_requires_a_reviewer() {
        let mut modal = AssignModal::default();
        assert!(!modal.open(&SelectionSet::default()));
        modal.open(&selection(&["la-1"]));
        assert!(!modal.can_submit());
        assert!(modal.submit().is_none());

        modal.choose_reviewer("u-9");
        assert!(modal.can_submit());
        let request = modal.submit().unwrap();
        assert_eq!(request.reviewer_id, "u-9");
        assert_eq!(request.ids, ["la-1"]);
    }

    #[test]
    fn assign_failure_keeps_the_chosen_reviewer() {
        let mut modal = AssignModal::default();
        modal.open(&selection(&["la-1", "la-2"]));
        modal.choose_reviewer("u-3");
        modal.submit().unwrap();
        modal.resolve_failure("assignment rejected");
        let draft = modal.draft().unwrap();
        assert_eq!(draft.reviewer_id, "u-3");
        assert!(draft.error.is_some());
    }

    #[test]
    fn split_reason_prefix_round_trips() {
        assert_eq!(
            split_reason_prefix("[Bad Credit History] see notes"),
            (Some("Bad Credit History"), "see notes")
        );
        assert_eq!(split_reason_prefix("no prefix here"), (None, "no prefix here"));
        assert_eq!(split_reason_prefix("[unclosed prefix"), (None, "[unclosed prefix"));
        assert_eq!(split_reason_prefix("[] empty"), (None, "[] empty"));
        assert_eq!(
            encode_comment(Some(ReasonCode::IncompleteDocuments), "  missing payslips "),
            "[Incomplete Documents] missing payslips"
        );
    }
}
