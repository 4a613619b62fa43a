//! Time-series payloads returned by the connection-log service.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One time-bucketed series for one entity over the requested duration.
///
/// `tags` carries the entity id under the kind tag (`device` / `gateway`);
/// that is the only way to tell which entity a series belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    #[serde(default)]
    pub columns: Vec<String>,
    /// Heterogeneous rows, typically `[timestamp, reading]`.
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

impl Series {
    /// Entity id this series was recorded for, if tagged.
    pub fn tagged_id(&self, kind_tag: &str) -> Option<&str> {
        self.tags.get(kind_tag).map(String::as_str)
    }
}

/// State-transition record for one entity; not interpreted by this layer.
pub type LogEdge = serde_json::Value;
