//! Message types exchanged with the network worker.
//!
//! All payloads are fully owned so they can cross task boundaries freely.
//! List requests carry the pane's [`RequestToken`] through to the result
//! untouched — the worker never interprets it; only `ListPane::apply`
//! decides whether a completion is still current.

use loandesk_core::bulk::{BulkAssignRequest, BulkStatusRequest};
use loandesk_core::error::ApiResult;
use loandesk_core::fetch::RequestToken;
use loandesk_core::query::{ListQuery, ListResult};
use loandesk_core::types::{
    ActivityEntry, LoanApplication, Reviewer, StatusBucket, UserAccount,
};

/// Commands sent from the main loop to the network worker.
#[derive(Debug)]
pub enum NetRequest {
    /// Fetch one page of the applications list.
    LoadApplications {
        token: RequestToken,
        query: ListQuery,
    },
    /// Fetch one page of the users list.
    LoadUsers {
        token: RequestToken,
        query: ListQuery,
    },
    /// Fetch the reviewer roster for the assignment modal.
    LoadRoster,
    /// Fetch stats + activity for the notification panel (concurrently).
    Poll,
    /// Send one bulk status-change batch. Never retried by the worker.
    SubmitStatus(BulkStatusRequest),
    /// Send one bulk reviewer-assignment batch. Never retried by the worker.
    SubmitAssign(BulkAssignRequest),
}

/// Completions sent from the network worker back to the main loop,
/// carried inside `AppEvent::Net(Box<NetResult>)`. `Box` keeps the event
/// enum small on the channel since list payloads can be a full page of rows.
#[derive(Debug)]
pub enum NetResult {
    Applications {
        token: RequestToken,
        outcome: ApiResult<ListResult<LoanApplication>>,
    },
    Users {
        token: RequestToken,
        outcome: ApiResult<ListResult<UserAccount>>,
    },
    Roster(ApiResult<Vec<Reviewer>>),
    /// The two poll fetches complete together; either may have failed
    /// independently. Deliberately token-free — overlapping polls resolve
    /// last-write-wins.
    Poll {
        stats: ApiResult<Vec<StatusBucket>>,
        activity: ApiResult<Vec<ActivityEntry>>,
    },
    /// Echoes the submitted batch so the caller can audit-log it.
    StatusSubmitted {
        request: BulkStatusRequest,
        outcome: ApiResult<()>,
    },
    /// Echoes the submitted batch so the caller can audit-log it.
    AssignSubmitted {
        request: BulkAssignRequest,
        outcome: ApiResult<()>,
    },
}
