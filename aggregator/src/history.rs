//! Join records with connection state, history series and state edges.

use connection_log::ConnectionLogClient;
use model::{Caller, EntityHistory, Kind, Record};
use tracing::{debug, error};

use crate::completion::validate;
use crate::AggregateError;

/// History view of a batch over `duration` (e.g. `"24h"`, `"7d"`).
///
/// States, series and edges are fetched concurrently for the same id set;
/// the join only runs once all three have answered. `log_state` is
/// `"unknown"` for entities without recorded state, and `log_history` /
/// `log_edge` stay empty when the log has nothing for an id.
pub async fn complete_history(
    log: &ConnectionLogClient,
    caller: &Caller,
    kind: Kind,
    records: Vec<Record>,
    duration: &str,
) -> Result<Vec<EntityHistory>, AggregateError> {
    let (entities, ids) = validate(records).map_err(|e| {
        error!(kind = %kind, error = %e, "rejecting entity batch");
        e
    })?;

    let (states, series, edges) = tokio::try_join!(
        log.states(caller, kind, &ids),
        log.history(caller, kind, &ids, duration),
        log.edges(caller, kind, &ids, duration),
    )?;

    let enriched: Vec<EntityHistory> = entities
        .into_iter()
        .map(|entity| {
            let state = states.get(&entity.id).copied();
            let history = series.get(&entity.id).cloned();
            let edge = edges.get(&entity.id).cloned();
            EntityHistory::new(entity, state, history, edge)
        })
        .collect();

    debug!(
        kind = %kind,
        duration,
        entities = enriched.len(),
        series = series.len(),
        edges = edges.len(),
        "history completion done"
    );
    Ok(enriched)
}
