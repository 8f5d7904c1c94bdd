//! FixedWeightStore - テスト用の重量 DB

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::WeightRow;
use crate::ports::{WeightStore, WeightStoreError};

/// Returns preset rows per order reference; unknown references yield no rows.
#[derive(Default)]
pub struct FixedWeightStore {
    rows: HashMap<String, Vec<WeightRow>>,
    failing: HashSet<String>,
    queried: Mutex<Vec<String>>,
}

impl FixedWeightStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, reference: &str, rows: Vec<WeightRow>) -> Self {
        self.rows.insert(reference.to_string(), rows);
        self
    }

    pub fn failing_for(mut self, reference: &str) -> Self {
        self.failing.insert(reference.to_string());
        self
    }

    pub fn queried(&self) -> Vec<String> {
        self.queried
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl WeightStore for FixedWeightStore {
    async fn weights_for(&self, reference: &str) -> Result<Vec<WeightRow>, WeightStoreError> {
        self.queried
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(reference.to_string());
        if self.failing.contains(reference) {
            return Err(WeightStoreError::Connection("server has gone away".into()));
        }
        Ok(self.rows.get(reference).cloned().unwrap_or_default())
    }
}
