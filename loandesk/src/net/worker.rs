//! Background task that owns the API client.
//!
//! All communication is via channels: `NetRequest` in, `AppEvent::Net`
//! out. Each request is handled on its own spawned task so a slow list
//! fetch never delays a bulk submit, and a slow poll can overlap the next
//! scheduled one. In-flight requests are never cancelled — once a list
//! request is superseded, its completion is simply discarded by the pane's
//! token check on the receiving side.

use loandesk_core::api::ApiClient;
use loandesk_core::query::ListQuery;
use loandesk_core::types::{Reviewer, UserRole};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::event::AppEvent;
use crate::net::types::{NetRequest, NetResult};

/// How many roster entries to request; a platform with more active
/// reviewers than this needs a paging roster picker first.
const ROSTER_PAGE_SIZE: u32 = 100;

/// Spawns the dispatcher task. It runs until the request channel closes
/// (all senders dropped), i.e. until the main loop exits.
pub fn spawn_net_worker(
    client: ApiClient,
    mut rx: UnboundedReceiver<NetRequest>,
    event_tx: UnboundedSender<AppEvent>,
) {
    tokio::spawn(async move {
        while let Some(request) = rx.recv().await {
            let client = client.clone();
            let event_tx = event_tx.clone();
            tokio::spawn(async move {
                let result = handle_request(&client, request).await;
                let _ = event_tx.send(AppEvent::Net(Box::new(result)));
            });
        }
    });
}

/// Performs one API round-trip and packages the outcome.
///
/// Errors are carried inside the result, not raised: the main loop and
/// the list panes decide how each failure surfaces.
async fn handle_request(client: &ApiClient, request: NetRequest) -> NetResult {
    match request {
        NetRequest::LoadApplications { token, query } => {
            tracing::debug!(?token, page = query.page, "loading applications page");
            NetResult::Applications {
                token,
                outcome: client.list_applications(&query).await,
            }
        }
        NetRequest::LoadUsers { token, query } => {
            tracing::debug!(?token, page = query.page, "loading users page");
            NetResult::Users {
                token,
                outcome: client.list_users(&query).await,
            }
        }
        NetRequest::LoadRoster => NetResult::Roster(load_roster(client).await),
        NetRequest::Poll => {
            // Stats and activity are independent; fetch them concurrently.
            let (stats, activity) = tokio::join!(client.stats(), client.activity());
            NetResult::Poll { stats, activity }
        }
        NetRequest::SubmitStatus(request) => {
            let outcome = client.bulk_status(&request).await;
            if let Err(err) = &outcome {
                tracing::warn!(error = %err, ids = request.ids.len(), "bulk status change failed");
            }
            NetResult::StatusSubmitted { request, outcome }
        }
        NetRequest::SubmitAssign(request) => {
            let outcome = client.bulk_assign(&request).await;
            if let Err(err) = &outcome {
                tracing::warn!(error = %err, ids = request.ids.len(), "bulk assignment failed");
            }
            NetResult::AssignSubmitted { request, outcome }
        }
    }
}

/// The roster is the reviewer slice of the users list — there is no
/// dedicated roster endpoint.
async fn load_roster(
    client: &ApiClient,
) -> loandesk_core::error::ApiResult<Vec<Reviewer>> {
    let mut query = ListQuery::new(ROSTER_PAGE_SIZE);
    query.set_filter("role", Some(UserRole::Reviewer.as_str()));
    let page = client.list_users(&query).await?;
    Ok(page.rows.iter().map(Reviewer::from).collect())
}
