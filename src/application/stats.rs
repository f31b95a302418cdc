use crate::domain::error::DomainError;
use crate::domain::ports::record_repository::{RecordQuery, RecordRepository};
use crate::domain::ports::FacetStore;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordStats {
    pub total: u64,
}

pub struct StatsUseCase {
    store: Arc<dyn FacetStore>,
}

impl StatsUseCase {
    pub fn new(store: Arc<dyn FacetStore>) -> Self {
        Self { store }
    }

    pub fn stats(&self) -> Result<RecordStats, DomainError> {
        Ok(RecordStats {
            total: self.store.count(&RecordQuery::all())?,
        })
    }
}
