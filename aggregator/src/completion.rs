//! Join permission-search records with their connection state.

use std::collections::HashSet;

use connection_log::ConnectionLogClient;
use model::{Caller, ContractError, Entity, Kind, Record};
use tracing::{debug, error};

use crate::AggregateError;

/// Validate a batch of records and collect the ids to look up.
///
/// Entities keep input order. The id list keeps first-seen order and holds
/// each id once.
pub(crate) fn validate(records: Vec<Record>) -> Result<(Vec<Entity>, Vec<String>), ContractError> {
    let mut entities = Vec::with_capacity(records.len());
    let mut ids = Vec::with_capacity(records.len());
    let mut seen = HashSet::with_capacity(records.len());

    for (position, record) in records.into_iter().enumerate() {
        let entity = Entity::from_record(position, record)?;
        if seen.insert(entity.id.clone()) {
            ids.push(entity.id.clone());
        }
        entities.push(entity);
    }

    Ok((entities, ids))
}

/// Attach `log_state` to every entity the connection log knows.
///
/// One bulk state request covers the whole batch. Entities the log has no
/// state for keep `log_state == None`; none is dropped.
pub async fn complete(
    log: &ConnectionLogClient,
    caller: &Caller,
    kind: Kind,
    records: Vec<Record>,
) -> Result<Vec<Entity>, AggregateError> {
    let (mut entities, ids) = validate(records).map_err(|e| {
        error!(kind = %kind, error = %e, "rejecting entity batch");
        e
    })?;

    let states = log.states(caller, kind, &ids).await?;

    for entity in &mut entities {
        entity.log_state = states.get(&entity.id).copied();
    }

    debug!(
        kind = %kind,
        entities = entities.len(),
        with_state = states.len(),
        "entity completion done"
    );
    Ok(entities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn records(value: Value) -> Vec<Record> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn validate_keeps_order_and_dedups_ids() {
        let (entities, ids) = validate(records(json!([
            {"id": "b"}, {"id": "a"}, {"id": "b", "name": "again"}
        ])))
        .unwrap();

        let order: Vec<&str> = entities.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(order, ["b", "a", "b"]);
        assert_eq!(ids, ["b", "a"]);
    }

    #[test]
    fn validate_fails_whole_batch_on_bad_id() {
        let err = validate(records(json!([{"id": "a"}, {"id": 2}, {"name": "x"}]))).unwrap_err();
        assert_eq!(err, ContractError::IdNotString { position: 1 });
    }

    #[test]
    fn validate_empty_batch() {
        let (entities, ids) = validate(Vec::new()).unwrap();
        assert!(entities.is_empty());
        assert!(ids.is_empty());
    }
}
