//! HTTP client for the platform's admin API.
//!
//! A thin typed wrapper over `reqwest`: every method maps to exactly one
//! endpoint, authenticates with the configured bearer token, and surfaces
//! any non-2xx response as [`ApiError::Status`] with the body attached.
//! List endpoints answer with a `{data, meta}` envelope; the stats and
//! activity endpoints answer either enveloped or as a bare array, so both
//! shapes are accepted.
//!
//! The client holds no mutable state and clones cheaply (the inner
//! `reqwest::Client` is an `Arc`), which is what lets the network worker
//! run overlapping requests on separate tasks.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::bulk::{BulkAssignRequest, BulkStatusRequest};
use crate::error::{ApiError, ApiResult};
use crate::query::{ListQuery, ListResult, PageMeta};
use crate::types::{ActivityEntry, LoanApplication, StatusBucket, UserAccount};

/// `{data, meta}` wrapper used by the paginated list endpoints.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
    meta: Option<PageMeta>,
}

/// Accepts both response shapes of the non-paginated endpoints:
/// `{"data": [...]}` or a bare `[...]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MaybeEnveloped<T> {
    Enveloped { data: T },
    Bare(T),
}

impl<T> MaybeEnveloped<T> {
    fn into_inner(self) -> T {
        match self {
            MaybeEnveloped::Enveloped { data } => data,
            MaybeEnveloped::Bare(data) => data,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    /// Creates a client for the platform at `base_url` (trailing slash
    /// tolerated) authenticating with `token`.
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            token: token.to_owned(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Maps a non-2xx response to `ApiError::Status`, reading the body for
    /// the log. 2xx responses pass through untouched.
    async fn check(response: reqwest::Response) -> ApiResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &ListQuery,
    ) -> ApiResult<ListResult<T>> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.token)
            .query(&query.to_params())
            .send()
            .await?;
        let envelope: Envelope<Vec<T>> = Self::check(response).await?.json().await?;

        let rows = envelope.data;
        // Servers that omit meta get it reconstructed from the query cursor.
        let meta = envelope.meta.unwrap_or_else(|| {
            PageMeta::for_total(query.page, query.page_size, rows.len() as u64)
        });
        if rows.len() > meta.page_size as usize {
            return Err(ApiError::Decode(format!(
                "{} rows on a page of {}",
                rows.len(),
                meta.page_size
            )));
        }
        Ok(ListResult { rows, meta })
    }

    async fn get_plain<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let body: MaybeEnveloped<T> = Self::check(response).await?.json().await?;
        Ok(body.into_inner())
    }

    /// `GET /admin/applications` with the query's search/filter/cursor.
    pub async fn list_applications(
        &self,
        query: &ListQuery,
    ) -> ApiResult<ListResult<LoanApplication>> {
        self.get_list("/admin/applications", query).await
    }

    /// `GET /admin/users` with the query's search/filter/cursor.
    pub async fn list_users(&self, query: &ListQuery) -> ApiResult<ListResult<UserAccount>> {
        self.get_list("/admin/users", query).await
    }

    /// `GET /admin/stats` — per-status application counts.
    pub async fn stats(&self) -> ApiResult<Vec<StatusBucket>> {
        self.get_plain("/admin/stats").await
    }

    /// `GET /admin/activity` — most recent admin/applicant actions.
    pub async fn activity(&self) -> ApiResult<Vec<ActivityEntry>> {
        self.get_plain("/admin/activity").await
    }

    /// `PATCH /admin/applications/bulk/assign` — one batch, sent once.
    pub async fn bulk_assign(&self, request: &BulkAssignRequest) -> ApiResult<()> {
        let response = self
            .http
            .patch(self.url("/admin/applications/bulk/assign"))
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// `PATCH /admin/applications/status/bulk` — one batch, sent once.
    pub async fn bulk_status(&self, request: &BulkStatusRequest) -> ApiResult<()> {
        let response = self
            .http
            .patch(self.url("/admin/applications/status/bulk"))
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
