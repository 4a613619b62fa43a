//! Selection parameters understood by the permission-search service.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::InvalidToken;

/// Limit/offset pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc  => "asc",
            Direction::Desc => "desc",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Direction {
    type Err = InvalidToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc"  => Ok(Direction::Asc),
            "desc" => Ok(Direction::Desc),
            other  => Err(InvalidToken {
                expected: "direction",
                token: other.to_string(),
            }),
        }
    }
}

/// Upstream ordering by an arbitrary feature name (e.g. `name`, `device_type`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub feature: String,
    pub direction: Direction,
}

impl Order {
    pub fn new(feature: impl Into<String>, direction: Direction) -> Self {
        Self {
            feature: feature.into(),
            direction,
        }
    }
}

/// Pagination plus ordering, used by the ordered tag and id-set selections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub page: Page,
    pub order: Order,
}

impl Window {
    pub fn new(page: Page, order: Order) -> Self {
        Self { page, order }
    }
}

/// Which records to ask the permission-search service for.
///
/// `None` for `order`/`window` selects the plain variant of the operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    All,
    List {
        page: Page,
        order: Option<Order>,
    },
    Search {
        text: String,
        page: Page,
        order: Option<Order>,
    },
    Tag {
        tag: String,
        window: Option<Window>,
    },
    UserTag {
        tag: String,
        window: Option<Window>,
    },
    Ids {
        ids: Vec<String>,
        window: Option<Window>,
    },
}

impl Query {
    /// Short operation name for log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Query::All            => "list_all",
            Query::List { .. }    => "list",
            Query::Search { .. }  => "search",
            Query::Tag { .. }     => "tag",
            Query::UserTag { .. } => "user_tag",
            Query::Ids { .. }     => "ids",
        }
    }
}
