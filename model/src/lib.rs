//! Domain and wire types shared across the aggregator workspace.
//!
//! The permission-search service hands out untyped JSON records; the
//! connection-log service answers bulk lookups keyed by entity id. This crate
//! holds the vocabulary both sides of the join agree on.

pub mod entity;
pub mod query;
pub mod series;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use entity::{ConnectionState, ContractError, Entity, EntityHistory, Record};
pub use query::{Direction, Order, Page, Query, Window};
pub use series::{LogEdge, Series};

// ------------------------------------------------------------------ //
//  Kind                                                               //
// ------------------------------------------------------------------ //

/// Which inventory an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Device,
    Gateway,
}

impl Kind {
    /// Tag used by the connection-log service (`device` / `gateway`).
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Device  => "device",
            Kind::Gateway => "gateway",
        }
    }

    /// Resource name used by the permission-search service.
    pub fn resource(self) -> &'static str {
        match self {
            Kind::Device  => "devices",
            Kind::Gateway => "gateways",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ------------------------------------------------------------------ //
//  Access right                                                       //
// ------------------------------------------------------------------ //

/// Access level the permission-search service checks a selection against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Right {
    Read,
}

impl Right {
    pub fn as_str(self) -> &'static str {
        match self {
            Right::Read => "r",
        }
    }
}

impl fmt::Display for Right {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ------------------------------------------------------------------ //
//  Caller                                                             //
// ------------------------------------------------------------------ //

/// Delegated identity of the end user a request is made on behalf of.
///
/// Holds the raw `Authorization` header value the caller presented. Every
/// outbound call forwards it unchanged so that upstream services apply the
/// caller's permissions, not ours. A `Caller` lives for one request only.
#[derive(Clone, PartialEq, Eq)]
pub struct Caller {
    authorization: String,
}

impl Caller {
    pub fn new(authorization: impl Into<String>) -> Self {
        Self {
            authorization: authorization.into(),
        }
    }

    /// Convenience for a bare token: prefixes `Bearer `.
    pub fn bearer(token: &str) -> Self {
        Self::new(format!("Bearer {token}"))
    }

    pub fn authorization(&self) -> &str {
        &self.authorization
    }
}

impl fmt::Debug for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Caller")
            .field("authorization", &"<redacted>")
            .finish()
    }
}

// ------------------------------------------------------------------ //
//  Token parsing                                                      //
// ------------------------------------------------------------------ //

/// A textual token that does not name any variant of the expected enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {expected} token '{token}'")]
pub struct InvalidToken {
    pub expected: &'static str,
    pub token: String,
}
