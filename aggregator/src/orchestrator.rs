//! Listing, search and filter operations over devices and gateways.

use std::sync::Arc;

use anyhow::Result as AnyResult;
use connection_log::ConnectionLogClient;
use model::{
    Caller, ConnectionState, Direction, Entity, EntityHistory, Kind, Order, Page, Query, Record,
    Right, Window,
};
use permission_search::{PermSearchClient, PermissionSearch};
use tracing::{error, info, warn};

use crate::completion::complete;
use crate::history::complete_history;
use crate::name::{search_by_name, sort_by_name};
use crate::{AggregateError, Config};

type Result<T> = std::result::Result<T, AggregateError>;

/// Keep entities whose connection state equals `state`.
///
/// `Unknown` selects entities the connection log has no state for.
pub fn filter_by_state(entities: Vec<Entity>, state: ConnectionState) -> Vec<Entity> {
    entities
        .into_iter()
        .filter(|e| e.connection_state() == state)
        .collect()
}

// ------------------------------------------------------------------ //
//  Aggregator                                                         //
// ------------------------------------------------------------------ //

/// Entry point for every aggregated view.
///
/// Stateless between calls: each operation fetches, joins and returns; the
/// caller identity is passed per call and never kept.
pub struct Aggregator {
    permissions: Arc<dyn PermissionSearch>,
    log: ConnectionLogClient,
}

impl Aggregator {
    pub fn new(permissions: Arc<dyn PermissionSearch>, log: ConnectionLogClient) -> Self {
        Self { permissions, log }
    }

    /// Wire the HTTP permission-search and connection-log clients.
    pub fn from_config(config: &Config) -> AnyResult<Self> {
        let http = config.http_client()?;
        let permissions = PermSearchClient::new(&config.permission_search_url, http.clone())?;
        let log = ConnectionLogClient::new(&config.connection_log_url, http)?;
        info!(
            permission_search = %config.permission_search_url,
            connection_log = %config.connection_log_url,
            "aggregator configured"
        );
        Ok(Self::new(Arc::new(permissions), log))
    }

    async fn select(&self, caller: &Caller, kind: Kind, query: &Query) -> Result<Vec<Record>> {
        self.permissions
            .select(caller, kind, Right::Read, query)
            .await
            .map_err(|e| {
                error!(kind = %kind, query = query.label(), error = %e, "permission-search failed");
                AggregateError::from(e)
            })
    }

    /// Shared pipeline: permission-search selection, then state completion.
    async fn fetch(&self, caller: &Caller, kind: Kind, query: Query) -> Result<Vec<Entity>> {
        let records = self.select(caller, kind, &query).await?;
        let entities = complete(&self.log, caller, kind, records).await.map_err(|e| {
            error!(kind = %kind, query = query.label(), error = %e, "entity completion failed");
            e
        })?;
        info!(kind = %kind, query = query.label(), count = entities.len(), "listing complete");
        Ok(entities)
    }

    // -------------------------------------------------------------- //
    //  Permission-search backed listings                             //
    // -------------------------------------------------------------- //

    pub async fn list_all(&self, caller: &Caller, kind: Kind) -> Result<Vec<Entity>> {
        self.fetch(caller, kind, Query::All).await
    }

    pub async fn list(&self, caller: &Caller, kind: Kind, page: Page) -> Result<Vec<Entity>> {
        self.fetch(caller, kind, Query::List { page, order: None }).await
    }

    pub async fn list_ordered(
        &self,
        caller: &Caller,
        kind: Kind,
        page: Page,
        order: Order,
    ) -> Result<Vec<Entity>> {
        self.fetch(caller, kind, Query::List { page, order: Some(order) }).await
    }

    pub async fn search(
        &self,
        caller: &Caller,
        kind: Kind,
        text: &str,
        page: Page,
    ) -> Result<Vec<Entity>> {
        let query = Query::Search {
            text: text.to_string(),
            page,
            order: None,
        };
        self.fetch(caller, kind, query).await
    }

    pub async fn search_ordered(
        &self,
        caller: &Caller,
        kind: Kind,
        text: &str,
        page: Page,
        order: Order,
    ) -> Result<Vec<Entity>> {
        let query = Query::Search {
            text: text.to_string(),
            page,
            order: Some(order),
        };
        self.fetch(caller, kind, query).await
    }

    pub async fn by_tag(&self, caller: &Caller, kind: Kind, tag: &str) -> Result<Vec<Entity>> {
        let query = Query::Tag {
            tag: tag.to_string(),
            window: None,
        };
        self.fetch(caller, kind, query).await
    }

    pub async fn by_tag_ordered(
        &self,
        caller: &Caller,
        kind: Kind,
        tag: &str,
        window: Window,
    ) -> Result<Vec<Entity>> {
        let query = Query::Tag {
            tag: tag.to_string(),
            window: Some(window),
        };
        self.fetch(caller, kind, query).await
    }

    pub async fn by_user_tag(&self, caller: &Caller, kind: Kind, tag: &str) -> Result<Vec<Entity>> {
        let query = Query::UserTag {
            tag: tag.to_string(),
            window: None,
        };
        self.fetch(caller, kind, query).await
    }

    pub async fn by_user_tag_ordered(
        &self,
        caller: &Caller,
        kind: Kind,
        tag: &str,
        window: Window,
    ) -> Result<Vec<Entity>> {
        let query = Query::UserTag {
            tag: tag.to_string(),
            window: Some(window),
        };
        self.fetch(caller, kind, query).await
    }

    pub async fn by_ids(
        &self,
        caller: &Caller,
        kind: Kind,
        ids: Vec<String>,
    ) -> Result<Vec<Entity>> {
        self.fetch(caller, kind, Query::Ids { ids, window: None }).await
    }

    pub async fn by_ids_ordered(
        &self,
        caller: &Caller,
        kind: Kind,
        ids: Vec<String>,
        window: Window,
    ) -> Result<Vec<Entity>> {
        self.fetch(caller, kind, Query::Ids { ids, window: Some(window) }).await
    }

    // -------------------------------------------------------------- //
    //  In-memory connectivity filter, name search and sort           //
    // -------------------------------------------------------------- //

    /// Every visible entity in connection state `state`.
    pub async fn connection_filtered(
        &self,
        caller: &Caller,
        kind: Kind,
        state: ConnectionState,
    ) -> Result<Vec<Entity>> {
        let entities = self.list_all(caller, kind).await?;
        Ok(filter_by_state(entities, state))
    }

    /// [`connection_filtered`](Self::connection_filtered) for a state token
    /// as it arrives from a request (`connected`, `disconnected`, `unknown`).
    ///
    /// Any other token is rejected before an upstream call is made.
    pub async fn connection_filtered_token(
        &self,
        caller: &Caller,
        kind: Kind,
        token: &str,
    ) -> Result<Vec<Entity>> {
        let state: ConnectionState = token.parse().map_err(|e| {
            warn!(kind = %kind, token, "rejecting connection state filter");
            AggregateError::from(e)
        })?;
        self.connection_filtered(caller, kind, state).await
    }

    pub async fn connection_filtered_sorted(
        &self,
        caller: &Caller,
        kind: Kind,
        state: ConnectionState,
        direction: Direction,
    ) -> Result<Vec<Entity>> {
        let entities = self.connection_filtered(caller, kind, state).await?;
        Ok(sort_by_name(entities, direction)?)
    }

    /// State filter, then name substring search, then name sort.
    pub async fn connection_filtered_search_sorted(
        &self,
        caller: &Caller,
        kind: Kind,
        state: ConnectionState,
        text: &str,
        direction: Direction,
    ) -> Result<Vec<Entity>> {
        let entities = self.connection_filtered(caller, kind, state).await?;
        let entities = search_by_name(entities, text)?;
        Ok(sort_by_name(entities, direction)?)
    }

    // -------------------------------------------------------------- //
    //  History                                                       //
    // -------------------------------------------------------------- //

    /// Every visible entity with state, series and edges over `duration`.
    pub async fn history(
        &self,
        caller: &Caller,
        kind: Kind,
        duration: &str,
    ) -> Result<Vec<EntityHistory>> {
        let query = Query::All;
        let records = self.select(caller, kind, &query).await?;
        let enriched = complete_history(&self.log, caller, kind, records, duration)
            .await
            .map_err(|e| {
                error!(kind = %kind, duration, error = %e, "history completion failed");
                e
            })?;
        info!(kind = %kind, duration, count = enriched.len(), "history complete");
        Ok(enriched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(id: &str, state: Option<bool>) -> Entity {
        Entity {
            id: id.to_string(),
            name: Some(id.to_uppercase()),
            log_state: state,
            attributes: Record::new(),
        }
    }

    fn ids(entities: &[Entity]) -> Vec<&str> {
        entities.iter().map(|e| e.id.as_str()).collect()
    }

    fn sample() -> Vec<Entity> {
        vec![
            entity("a", Some(true)),
            entity("b", Some(false)),
            entity("c", None),
            entity("d", Some(true)),
        ]
    }

    #[test]
    fn connected_selects_true_states() {
        let kept = filter_by_state(sample(), ConnectionState::Connected);
        assert_eq!(ids(&kept), ["a", "d"]);
    }

    #[test]
    fn disconnected_selects_false_states() {
        let kept = filter_by_state(sample(), ConnectionState::Disconnected);
        assert_eq!(ids(&kept), ["b"]);
    }

    #[test]
    fn unknown_selects_missing_states() {
        let kept = filter_by_state(sample(), ConnectionState::Unknown);
        assert_eq!(ids(&kept), ["c"]);
    }

    #[test]
    fn filters_partition_the_input() {
        let total: usize = [
            ConnectionState::Connected,
            ConnectionState::Disconnected,
            ConnectionState::Unknown,
        ]
        .into_iter()
        .map(|s| filter_by_state(sample(), s).len())
        .sum();
        assert_eq!(total, sample().len());
    }
}
