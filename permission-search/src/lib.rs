//! Access to the permission-search service.
//!
//! The permission-search service owns the device and gateway inventories. It
//! lists, searches, filters by tag, paginates and orders them, always
//! restricted to what the calling user may see at the requested [`Right`].
//! The aggregator never makes access decisions itself; it only consumes what
//! this service returns.

mod client;
mod fake;

use async_trait::async_trait;
use model::{Caller, Kind, Query, Record, Right};
use thiserror::Error;

pub use client::{route, PermSearchClient, Route};
pub use fake::FakePermissionSearch;

#[derive(Debug, Error)]
pub enum PermissionError {
    #[error("invalid permission-search url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} answered with status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("unexpected response body from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Source of permission-filtered entity records.
#[async_trait]
pub trait PermissionSearch: Send + Sync {
    /// Records of `kind` matching `query` that `caller` holds `right` on.
    async fn select(
        &self,
        caller: &Caller,
        kind: Kind,
        right: Right,
        query: &Query,
    ) -> Result<Vec<Record>, PermissionError>;
}
