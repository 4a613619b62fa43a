//! Client for the connection-log service.
//!
//! The connection log records when devices and gateways connect and
//! disconnect. It exposes bulk endpoints that take a JSON list of entity ids
//! and answer with a mapping keyed by id:
//!
//! | Endpoint                                   | Response                  |
//! |--------------------------------------------|---------------------------|
//! | `POST /intern/state/{kind}/check`          | id → bool (connected)     |
//! | `POST /intern/history/{kind}/{duration}`   | `[{"Series": [...]}]`     |
//! | `POST /intern/logedge/{kind}/{duration}`   | id → opaque edge value    |
//! | `POST /intern/logstarts/{kind}`            | id → opaque start value   |
//!
//! Every call is made on behalf of a [`Caller`] whose `Authorization` header
//! is forwarded unchanged.

use std::collections::HashMap;

use model::{Caller, Kind, LogEdge, Series};
use reqwest::{header::AUTHORIZATION, Client, Url};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use tracing::{debug, error, warn};

// ------------------------------------------------------------------ //
//  Errors                                                             //
// ------------------------------------------------------------------ //

#[derive(Debug, Error)]
pub enum LogError {
    #[error("invalid connection-log url '{url}': {reason}")]
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

// ------------------------------------------------------------------ //
//  Wire types                                                         //
// ------------------------------------------------------------------ //

/// One result envelope of the history endpoint.
#[derive(Debug, Deserialize)]
struct HistoryResult {
    #[serde(rename = "Series", default)]
    series: Vec<Series>,
}

// ------------------------------------------------------------------ //
//  Client                                                             //
// ------------------------------------------------------------------ //

/// Bulk lookups against the connection-log service.
///
/// Built once at startup from configuration and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct ConnectionLogClient {
    http: Client,
    base_url: Url,
}

impl ConnectionLogClient {
    pub fn new(base_url: &str, http: Client) -> Result<Self, LogError> {
        let invalid = |reason: String| LogError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };
        let base_url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("not a base url".to_string()));
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Connected (`true`) / disconnected (`false`) per id. Ids the log has
    /// never seen are absent from the map.
    pub async fn states(
        &self,
        caller: &Caller,
        kind: Kind,
        ids: &[String],
    ) -> Result<HashMap<String, bool>, LogError> {
        let url = self.endpoint(&["intern", "state", kind.as_str(), "check"])?;
        self.post_ids(caller, url, ids).await
    }

    /// Bucketed connection history per id over `duration` (e.g. `"7d"`).
    ///
    /// The service does not key its answer by id; each series is re-keyed by
    /// the value of its `kind` tag.
    pub async fn history(
        &self,
        caller: &Caller,
        kind: Kind,
        ids: &[String],
        duration: &str,
    ) -> Result<HashMap<String, Series>, LogError> {
        let url = self.endpoint(&["intern", "history", kind.as_str(), duration])?;
        let results: Vec<HistoryResult> = self.post_ids(caller, url, ids).await?;
        Ok(key_series_by_id(kind, results))
    }

    /// State transitions per id over `duration`.
    pub async fn edges(
        &self,
        caller: &Caller,
        kind: Kind,
        ids: &[String],
        duration: &str,
    ) -> Result<HashMap<String, LogEdge>, LogError> {
        let url = self.endpoint(&["intern", "logedge", kind.as_str(), duration])?;
        self.post_ids(caller, url, ids).await
    }

    /// First recorded log entry per id.
    pub async fn log_starts(
        &self,
        caller: &Caller,
        kind: Kind,
        ids: &[String],
    ) -> Result<HashMap<String, serde_json::Value>, LogError> {
        let url = self.endpoint(&["intern", "logstarts", kind.as_str()])?;
        self.post_ids(caller, url, ids).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, LogError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| LogError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "not a base url".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post_ids<T: DeserializeOwned>(
        &self,
        caller: &Caller,
        url: Url,
        ids: &[String],
    ) -> Result<T, LogError> {
        let endpoint = url.path().to_string();
        debug!(endpoint = %endpoint, ids = ids.len(), "connection-log request");

        let resp = self
            .http
            .post(url)
            .header(AUTHORIZATION, caller.authorization())
            .json(ids)
            .send()
            .await
            .map_err(|source| {
                error!(endpoint = %endpoint, error = %source, "connection-log unreachable");
                LogError::Request {
                    endpoint: endpoint.clone(),
                    source,
                }
            })?;

        let status = resp.status();
        let body = resp.bytes().await.map_err(|source| LogError::Request {
            endpoint: endpoint.clone(),
            source,
        })?;

        if !status.is_success() {
            error!(endpoint = %endpoint, status = status.as_u16(), "connection-log rejected request");
            return Err(LogError::Status {
                endpoint,
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        serde_json::from_slice(&body).map_err(|source| LogError::Decode { endpoint, source })
    }
}

/// Merge every series of every envelope into an id-keyed map.
fn key_series_by_id(kind: Kind, results: Vec<HistoryResult>) -> HashMap<String, Series> {
    let mut by_id = HashMap::new();
    for series in results.into_iter().flat_map(|r| r.series) {
        let Some(id) = series.tagged_id(kind.as_str()).map(str::to_string) else {
            warn!(kind = %kind, series = %series.name, "history series without id tag");
            continue;
        };
        by_id.insert(id, series);
    }
    by_id
}
