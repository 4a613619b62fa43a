//! Device and gateway views enriched with connection-log state.
//!
//! Entity records come from the permission-search service, already filtered
//! to what the caller may see. Connectivity state, history series and state
//! transitions come from the connection-log service. This crate joins the two
//! by entity id and layers in-memory state filtering, name search and name
//! sorting on top.
//!
//! ```text
//! permission-search ──records──▶ validate ──ids──▶ connection-log
//!                                    │                  │
//!                                    └──── join by id ◀─┘
//!                                            │
//!                          state filter ▶ name search ▶ name sort
//! ```
//!
//! Enrichment is all-or-nothing: if any upstream call fails the whole
//! operation fails and no partial listing is returned.

pub mod completion;
pub mod config;
pub mod error;
pub mod history;
pub mod name;
pub mod orchestrator;
pub mod telemetry;

pub use completion::complete;
pub use config::Config;
pub use error::AggregateError;
pub use history::complete_history;
pub use orchestrator::{filter_by_state, Aggregator};
