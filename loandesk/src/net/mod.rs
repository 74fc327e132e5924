//! Network layer: request/result types and the background worker task
//! that owns the [`loandesk_core::api::ApiClient`].

pub mod types;
pub mod worker;
