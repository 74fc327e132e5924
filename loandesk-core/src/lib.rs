//! loandesk-core — workflow core for the loandesk admin console.
//!
//! Everything here is UI-framework-free: the TUI crate owns rendering and
//! key dispatch, this crate owns the behavior worth testing in isolation —
//! list-query state with debounced, token-guarded fetching; row selection;
//! the bulk-action modal state machines; notification polling; the typed
//! HTTP client for the platform's admin API; and the local SQLite store
//! for console sessions and the bulk-action audit trail.

pub mod api;
pub mod bulk;
pub mod db;
pub mod error;
pub mod fetch;
pub mod notify;
pub mod query;
pub mod schema;
pub mod selection;
pub mod types;
