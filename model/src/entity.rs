//! Devices and gateways as handed to API consumers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{InvalidToken, LogEdge, Series};

/// Raw JSON object as returned by the permission-search service.
pub type Record = serde_json::Map<String, Value>;

/// Keys written by enrichment. Upstream values under these names are dropped.
const RESERVED_KEYS: [&str; 3] = ["log_state", "log_history", "log_edge"];

// ------------------------------------------------------------------ //
//  Errors                                                             //
// ------------------------------------------------------------------ //

/// A record that breaks the shape every entity must have.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("record #{position} has no id")]
    MissingId { position: usize },
    #[error("record #{position} has a non-string id")]
    IdNotString { position: usize },
    #[error("entity {id} has no string name")]
    MissingName { id: String },
}

// ------------------------------------------------------------------ //
//  Connection state                                                   //
// ------------------------------------------------------------------ //

/// Three-valued connectivity as last observed by the connection log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connected,
    Disconnected,
    Unknown,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Connected    => "connected",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Unknown      => "unknown",
        }
    }
}

impl From<Option<bool>> for ConnectionState {
    fn from(state: Option<bool>) -> Self {
        match state {
            Some(true)  => ConnectionState::Connected,
            Some(false) => ConnectionState::Disconnected,
            None        => ConnectionState::Unknown,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConnectionState {
    type Err = InvalidToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "connected"    => Ok(ConnectionState::Connected),
            "disconnected" => Ok(ConnectionState::Disconnected),
            "unknown"      => Ok(ConnectionState::Unknown),
            other          => Err(InvalidToken {
                expected: "connection state",
                token: other.to_string(),
            }),
        }
    }
}

// ------------------------------------------------------------------ //
//  Entity                                                             //
// ------------------------------------------------------------------ //

/// A device or gateway, optionally enriched with its connection state.
///
/// Serializes flat: `id`, `name`, `log_state` and then every other attribute
/// the permission-search service returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `None` means the connection log has no data for this entity at all,
    /// which is not the same as `Some(false)`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_state: Option<bool>,
    #[serde(flatten)]
    pub attributes: Record,
}

impl Entity {
    /// Validate a permission-search record. `position` is the record's index
    /// in its batch and only used for error reporting.
    pub fn from_record(position: usize, mut record: Record) -> Result<Self, ContractError> {
        let id = match record.remove("id") {
            Some(Value::String(id)) => id,
            Some(_) => return Err(ContractError::IdNotString { position }),
            None => return Err(ContractError::MissingId { position }),
        };

        let name = match record.remove("name") {
            Some(Value::String(name)) => Some(name),
            Some(other) => {
                record.insert("name".to_string(), other);
                None
            }
            None => None,
        };

        for key in RESERVED_KEYS {
            record.remove(key);
        }

        Ok(Self {
            id,
            name,
            log_state: None,
            attributes: record,
        })
    }

    pub fn connection_state(&self) -> ConnectionState {
        ConnectionState::from(self.log_state)
    }

    pub fn require_name(&self) -> Result<&str, ContractError> {
        self.name
            .as_deref()
            .ok_or_else(|| ContractError::MissingName { id: self.id.clone() })
    }
}

/// Entity enriched for history views: string state, series and edges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityHistory {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub log_state: ConnectionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_history: Option<Series>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_edge: Option<LogEdge>,
    #[serde(flatten)]
    pub attributes: Record,
}

impl EntityHistory {
    pub fn new(
        entity: Entity,
        state: Option<bool>,
        history: Option<Series>,
        edge: Option<LogEdge>,
    ) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            log_state: ConnectionState::from(state),
            log_history: history,
            log_edge: edge,
            attributes: entity.attributes,
        }
    }
}
