use super::{build_params, display_value, sort_choices, Filter, ParamChange, SelectionPolicy};
use crate::domain::error::DomainError;
use crate::domain::ports::record_repository::{RecordQuery, RecordRepository};
use crate::domain::ports::FacetStore;
use crate::domain::values::filter_choice::FilterChoice;
use crate::domain::values::query_params::QueryParams;
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ManyValuesFilterConfig {
    pub order_by_count: bool,
}

/// Filter on an array attribute such as tags or authors. Selections stack:
/// each chosen value narrows to records containing all of them.
pub struct ManyValuesFilter {
    field: String,
    query_param: String,
    params: QueryParams,
    chosen: Vec<String>,
    config: ManyValuesFilterConfig,
}

impl ManyValuesFilter {
    pub fn new(
        field: &str,
        query_param: Option<&str>,
        params: &QueryParams,
        config: ManyValuesFilterConfig,
    ) -> Self {
        let query_param = query_param.unwrap_or(field).to_string();
        let mut chosen: Vec<String> = Vec::new();
        for value in params.get_list(&query_param) {
            if !chosen.iter().any(|c| c == value) {
                chosen.push(value.to_string());
            }
        }
        Self {
            field: field.to_string(),
            query_param,
            params: params.clone(),
            chosen,
            config,
        }
    }

    pub fn chosen(&self) -> &[String] {
        &self.chosen
    }

    /// Elements of the records in `query`, minus the ones already chosen.
    pub fn get_choices_add(
        &self,
        store: &dyn FacetStore,
        query: &RecordQuery,
    ) -> Result<Vec<FilterChoice>, DomainError> {
        let counts = store.element_counts(query, &self.field, &self.chosen)?;
        Ok(counts
            .into_iter()
            .map(|(value, count)| {
                let params = build_params(
                    &self.params,
                    &self.query_param,
                    &self.chosen,
                    ParamChange::Add(&value),
                );
                FilterChoice::add(display_value(&value), count, params)
            })
            .collect())
    }

    /// One link per chosen value, each dropping only that value.
    pub fn get_choices_remove(&self) -> Vec<FilterChoice> {
        self.chosen
            .iter()
            .map(|value| {
                let params = build_params(
                    &self.params,
                    &self.query_param,
                    &self.chosen,
                    ParamChange::Remove(std::slice::from_ref(value)),
                );
                FilterChoice::remove(display_value(value), params)
            })
            .collect()
    }
}

impl Filter for ManyValuesFilter {
    fn field(&self) -> &str {
        &self.field
    }

    fn query_param(&self) -> &str {
        &self.query_param
    }

    fn apply_filter(&self, query: RecordQuery) -> RecordQuery {
        self.chosen
            .iter()
            .fold(query, |query, value| query.filter_contains(&self.field, value))
    }

    fn get_choices(
        &self,
        store: &dyn FacetStore,
        query: &RecordQuery,
    ) -> Result<Vec<FilterChoice>, DomainError> {
        SelectionPolicy::ChooseAgain.combine(self.get_choices_remove(), || {
            let add = self.get_choices_add(store, query)?;
            Ok(sort_choices(add, self.config.order_by_count))
        })
    }
}
