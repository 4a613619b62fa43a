//! In-memory search and sort on entity names.
//!
//! Both operations expect every entity to carry a string `name`; a batch
//! with a nameless entity is rejected as a whole.

use model::{ContractError, Direction, Entity};

fn require_names(entities: &[Entity]) -> Result<(), ContractError> {
    entities
        .iter()
        .try_for_each(|e| e.require_name().map(|_| ()))
}

/// Keep entities whose name contains `text` (case-sensitive).
pub fn search_by_name(entities: Vec<Entity>, text: &str) -> Result<Vec<Entity>, ContractError> {
    require_names(&entities)?;
    Ok(entities
        .into_iter()
        .filter(|e| e.name.as_deref().is_some_and(|name| name.contains(text)))
        .collect())
}

/// Lexicographic sort on name. Ties keep their relative order.
pub fn sort_by_name(
    mut entities: Vec<Entity>,
    direction: Direction,
) -> Result<Vec<Entity>, ContractError> {
    require_names(&entities)?;
    match direction {
        Direction::Asc  => entities.sort_by(|a, b| a.name.cmp(&b.name)),
        Direction::Desc => entities.sort_by(|a, b| b.name.cmp(&a.name)),
    }
    Ok(entities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::Record;

    fn entity(id: &str, name: Option<&str>) -> Entity {
        Entity {
            id: id.to_string(),
            name: name.map(str::to_string),
            log_state: None,
            attributes: Record::new(),
        }
    }

    fn names(entities: &[Entity]) -> Vec<&str> {
        entities.iter().filter_map(|e| e.name.as_deref()).collect()
    }

    fn sample() -> Vec<Entity> {
        vec![
            entity("1", Some("Lamp")),
            entity("2", Some("Fan")),
            entity("3", Some("lamp shade")),
            entity("4", Some("Heater")),
        ]
    }

    #[test]
    fn search_is_case_sensitive_substring() {
        let found = search_by_name(sample(), "amp").unwrap();
        assert_eq!(names(&found), ["Lamp", "lamp shade"]);

        let found = search_by_name(sample(), "Lamp").unwrap();
        assert_eq!(names(&found), ["Lamp"]);
    }

    #[test]
    fn empty_search_keeps_everything() {
        assert_eq!(search_by_name(sample(), "").unwrap(), sample());
    }

    #[test]
    fn search_is_idempotent() {
        let once = search_by_name(sample(), "a").unwrap();
        let twice = search_by_name(once.clone(), "a").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn sort_ascending_and_descending_are_reversed() {
        let asc = sort_by_name(sample(), Direction::Asc).unwrap();
        assert_eq!(names(&asc), ["Fan", "Heater", "Lamp", "lamp shade"]);

        let mut desc = sort_by_name(sample(), Direction::Desc).unwrap();
        desc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn sort_is_idempotent() {
        let once = sort_by_name(sample(), Direction::Desc).unwrap();
        let twice = sort_by_name(once.clone(), Direction::Desc).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn nameless_entity_is_a_contract_error() {
        let mut batch = sample();
        batch.push(entity("5", None));

        assert_eq!(
            sort_by_name(batch.clone(), Direction::Asc),
            Err(ContractError::MissingName { id: "5".into() })
        );
        assert_eq!(
            search_by_name(batch, "x"),
            Err(ContractError::MissingName { id: "5".into() })
        );
    }
}
