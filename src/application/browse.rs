use crate::application::filters::filter_set::{FacetView, FilterSet};
use crate::config::FacetSpec;
use crate::domain::entities::record::Record;
use crate::domain::error::DomainError;
use crate::domain::ports::record_repository::{RecordQuery, RecordRepository};
use crate::domain::ports::FacetStore;
use crate::domain::values::query_params::QueryParams;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// One page of filtered records together with the facets to refine it.
#[derive(Debug, Clone, Serialize)]
pub struct BrowseResult {
    pub total: u64,
    pub records: Vec<Record>,
    pub facets: Vec<FacetView>,
}

pub struct BrowseUseCase {
    store: Arc<dyn FacetStore>,
}

impl BrowseUseCase {
    pub fn new(store: Arc<dyn FacetStore>) -> Self {
        Self { store }
    }

    pub fn execute(
        &self,
        specs: &[FacetSpec],
        params: &QueryParams,
        limit: Option<usize>,
    ) -> Result<BrowseResult, DomainError> {
        let filters = FilterSet::from_specs(specs, params)?;
        let query = filters.apply(RecordQuery::all());
        debug!(facets = filters.len(), predicates = query.predicates().len(), "browsing");

        let store: &dyn FacetStore = self.store.as_ref();
        Ok(BrowseResult {
            total: store.count(&query)?,
            records: store.list(&query, limit)?,
            facets: filters.choices(store, &query)?,
        })
    }
}
