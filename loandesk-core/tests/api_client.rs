//! Integration tests for the admin API client against a local mock server.
//!
//! Each test binds an axum router on an ephemeral port, points an
//! `ApiClient` at it, and asserts on the request the client produced and
//! the way it decoded the response.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde_json::{json, Value};

use loandesk_core::api::ApiClient;
use loandesk_core::bulk::{BulkAssignRequest, BulkStatusRequest};
use loandesk_core::error::ApiError;
use loandesk_core::query::ListQuery;
use loandesk_core::types::ApplicationStatus;

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client_for(addr: SocketAddr) -> ApiClient {
    // Trailing slash on purpose: the client must normalise it away.
    ApiClient::new(&format!("http://{addr}/"), "secret-token")
}

fn application_json(id: &str) -> Value {
    json!({
        "id": id,
        "applicantName": "Ana Duarte",
        "businessName": "Duarte Textiles",
        "product": "SME",
        "amount": 125000.0,
        "status": "UNDER_REVIEW",
        "reviewer": null,
        "submittedAt": "2026-07-30T09:12:00Z",
        "updatedAt": "2026-08-01T14:03:00Z"
    })
}

#[tokio::test]
async fn list_applications_sends_cursor_and_parses_envelope() {
    let seen: Arc<Mutex<Option<(HashMap<String, String>, Option<String>)>>> =
        Arc::new(Mutex::new(None));
    let capture = Arc::clone(&seen);

    let app = Router::new().route(
        "/admin/applications",
        get(move |headers: HeaderMap, Query(params): Query<HashMap<String, String>>| {
            let capture = Arc::clone(&capture);
            async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned);
                *capture.lock().unwrap() = Some((params, auth));
                Json(json!({
                    "data": [application_json("la-1"), application_json("la-2")],
                    "meta": { "page": 2, "pageSize": 2, "total": 5, "totalPages": 3 }
                }))
            }
        }),
    );
    let addr = serve(app).await;
    let client = client_for(addr);

    let mut query = ListQuery::new(2);
    query.set_search("duarte");
    query.set_filter("status", Some("UNDER_REVIEW"));
    query.set_page(2);

    let result = client.list_applications(&query).await.unwrap();
    assert_eq!(result.rows.len(), 2);
    assert_eq!(result.rows[0].id, "la-1");
    assert_eq!(result.rows[0].status, ApplicationStatus::UnderReview);
    assert_eq!(result.meta.total, 5);
    assert_eq!(result.meta.total_pages, 3);

    let (params, auth) = seen.lock().unwrap().clone().expect("request captured");
    assert_eq!(params.get("search").map(String::as_str), Some("duarte"));
    assert_eq!(params.get("status").map(String::as_str), Some("UNDER_REVIEW"));
    assert_eq!(params.get("page").map(String::as_str), Some("2"));
    assert_eq!(params.get("pageSize").map(String::as_str), Some("2"));
    assert_eq!(auth.as_deref(), Some("Bearer secret-token"));
}

#[tokio::test]
async fn missing_meta_is_reconstructed_from_the_query() {
    let app = Router::new().route(
        "/admin/applications",
        get(|| async { Json(json!({ "data": [application_json("la-7")] })) }),
    );
    let addr = serve(app).await;
    let client = client_for(addr);

    let result = client
        .list_applications(&ListQuery::new(20))
        .await
        .unwrap();
    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.meta.page, 1);
    assert_eq!(result.meta.page_size, 20);
    assert_eq!(result.meta.total, 1);
    assert_eq!(result.meta.total_pages, 1);
}

#[tokio::test]
async fn non_2xx_surfaces_as_status_error_with_body() {
    let app = Router::new().route(
        "/admin/users",
        get(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "role filter unknown") }),
    );
    let addr = serve(app).await;
    let client = client_for(addr);

    let err = client.list_users(&ListQuery::new(20)).await.unwrap_err();
    match err {
        ApiError::Status { status, body } => {
            assert_eq!(status, 422);
            assert_eq!(body, "role filter unknown");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn bulk_status_patches_the_encoded_batch_body() {
    let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    let capture = Arc::clone(&seen);

    let app = Router::new().route(
        "/admin/applications/status/bulk",
        patch(move |Json(body): Json<Value>| {
            let capture = Arc::clone(&capture);
            async move {
                *capture.lock().unwrap() = Some(body);
                Json(json!({ "updated": 2 }))
            }
        }),
    );
    let addr = serve(app).await;
    let client = client_for(addr);

    let request = BulkStatusRequest {
        ids: vec!["la-1".into(), "la-2".into()],
        status: ApplicationStatus::Rejected,
        comment: "[Bad Credit History] see notes".into(),
    };
    client.bulk_status(&request).await.unwrap();

    let body = seen.lock().unwrap().clone().expect("body captured");
    assert_eq!(
        body,
        json!({
            "ids": ["la-1", "la-2"],
            "status": "REJECTED",
            "comment": "[Bad Credit History] see notes"
        })
    );
}

#[tokio::test]
async fn bulk_assign_patches_reviewer_id_camel_cased() {
    let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    let capture = Arc::clone(&seen);

    let app = Router::new().route(
        "/admin/applications/bulk/assign",
        patch(move |Json(body): Json<Value>| {
            let capture = Arc::clone(&capture);
            async move {
                *capture.lock().unwrap() = Some(body);
                StatusCode::NO_CONTENT
            }
        }),
    );
    let addr = serve(app).await;
    let client = client_for(addr);

    let request = BulkAssignRequest {
        ids: vec!["la-4".into()],
        reviewer_id: "u-17".into(),
    };
    client.bulk_assign(&request).await.unwrap();

    let body = seen.lock().unwrap().clone().expect("body captured");
    assert_eq!(body, json!({ "ids": ["la-4"], "reviewerId": "u-17" }));
}

#[tokio::test]
async fn stats_and_activity_accept_bare_and_enveloped_arrays() {
    let app = Router::new()
        .route(
            "/admin/stats",
            get(|| async {
                // Bare array, no envelope.
                Json(json!([
                    { "status": "SUBMITTED", "count": 4 },
                    { "status": "UNDER_REVIEW", "count": 2 }
                ]))
            }),
        )
        .route(
            "/admin/activity",
            get(|| async {
                Json(json!({
                    "data": [{
                        "id": "ev-1",
                        "actor": "mikkel",
                        "message": "approved LA-1042",
                        "createdAt": "2026-08-02T08:00:00Z"
                    }]
                }))
            }),
        );
    let addr = serve(app).await;
    let client = client_for(addr);

    let stats = client.stats().await.unwrap();
    assert_eq!(stats.len(), 2);
    assert_eq!(loandesk_core::notify::pending_count(&stats), 6);

    let activity = client.activity().await.unwrap();
    assert_eq!(activity.len(), 1);
    assert_eq!(activity[0].actor, "mikkel");
}
