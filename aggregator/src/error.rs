use connection_log::LogError;
use model::{ContractError, InvalidToken};
use permission_search::PermissionError;
use thiserror::Error;

/// Why an aggregated listing could not be produced.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("permission-search: {0}")]
    Permission(#[from] PermissionError),
    #[error("connection-log: {0}")]
    Log(#[from] LogError),
    #[error("entity contract violated: {0}")]
    Contract(#[from] ContractError),
    #[error(transparent)]
    InvalidToken(#[from] InvalidToken),
}
