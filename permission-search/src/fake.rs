//! In-memory [`PermissionSearch`] for tests and local wiring.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use model::{Caller, Kind, Query, Record, Right};

use crate::{PermissionError, PermissionSearch};

/// Answers every selection of a kind with the same canned records and keeps
/// a log of the selections it was asked for.
#[derive(Debug, Default, Clone)]
pub struct FakePermissionSearch {
    records: Arc<Mutex<HashMap<Kind, Vec<Record>>>>,
    failing: Arc<Mutex<bool>>,
    pub selections: Arc<Mutex<Vec<(Kind, Right, Query)>>>,
}

impl FakePermissionSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(self, kind: Kind, records: Vec<Record>) -> Self {
        self.records.lock().unwrap().insert(kind, records);
        self
    }

    /// Make every subsequent selection fail with a 503 status error.
    pub fn fail(&self) {
        *self.failing.lock().unwrap() = true;
    }

    /// Non-destructive snapshot of the selections made so far.
    pub fn snapshot(&self) -> Vec<(Kind, Right, Query)> {
        self.selections.lock().unwrap().clone()
    }
}

#[async_trait]
impl PermissionSearch for FakePermissionSearch {
    async fn select(
        &self,
        _caller: &Caller,
        kind: Kind,
        right: Right,
        query: &Query,
    ) -> Result<Vec<Record>, PermissionError> {
        self.selections
            .lock()
            .unwrap()
            .push((kind, right, query.clone()));

        if *self.failing.lock().unwrap() {
            return Err(PermissionError::Status {
                endpoint: format!("fake/{}", query.label()),
                status: 503,
                body: "unavailable".to_string(),
            });
        }

        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&kind)
            .cloned()
            .unwrap_or_default())
    }
}
