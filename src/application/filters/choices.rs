use super::values::{ValuesFilter, ValuesFilterConfig};
use super::Filter;
use crate::domain::error::DomainError;
use crate::domain::ports::record_repository::{RecordQuery, RecordRepository};
use crate::domain::ports::FacetStore;
use crate::domain::values::filter_choice::FilterChoice;
use crate::domain::values::query_params::QueryParams;
use serde::Deserialize;
use std::collections::HashMap;

/// A value filter over a fixed list of `(value, label)` pairs.
///
/// In TOML: `choices = [["poetry", "Poetry"], ["novel", "Novel"]]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChoicesFilterConfig {
    pub choices: Vec<(String, String)>,
    pub order_by_count: bool,
    pub nullable: bool,
}

impl ChoicesFilterConfig {
    pub fn new<V, L>(choices: impl IntoIterator<Item = (V, L)>) -> Self
    where
        V: Into<String>,
        L: Into<String>,
    {
        Self {
            choices: choices
                .into_iter()
                .map(|(value, label)| (value.into(), label.into()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.choices.is_empty() {
            return Err(DomainError::Config(
                "choices facet needs at least one choice".into(),
            ));
        }
        Ok(())
    }

    /// Declared label of `value`, or the value itself.
    pub fn label_for(&self, value: &str) -> String {
        self.choices
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, label)| label.clone())
            .unwrap_or_else(|| value.to_string())
    }
}

/// Offers only the declared values, in declared order and under their
/// declared labels. Values present in the data but not declared are hidden.
pub struct ChoicesFilter {
    inner: ValuesFilter,
    config: ChoicesFilterConfig,
}

impl ChoicesFilter {
    pub fn new(
        field: &str,
        query_param: Option<&str>,
        params: &QueryParams,
        config: ChoicesFilterConfig,
    ) -> Self {
        let values_config = ValuesFilterConfig {
            order_by_count: config.order_by_count,
            nullable: config.nullable,
        };
        Self {
            inner: ValuesFilter::new(field, query_param, params, values_config),
            config,
        }
    }

    pub fn chosen(&self) -> &[String] {
        self.inner.chosen()
    }

    pub fn get_choices_add(
        &self,
        store: &dyn FacetStore,
        query: &RecordQuery,
    ) -> Result<Vec<FilterChoice>, DomainError> {
        let counts: HashMap<String, u64> =
            store.value_counts(query, self.inner.field())?.into_iter().collect();
        Ok(self
            .config
            .choices
            .iter()
            .filter_map(|(value, label)| {
                let count = *counts.get(value)?;
                Some(self.inner.add_choice(value, label.clone(), count))
            })
            .collect())
    }

    pub fn get_choices_remove(&self) -> Vec<FilterChoice> {
        self.inner.remove_choices(|value| self.config.label_for(value))
    }
}

impl Filter for ChoicesFilter {
    fn field(&self) -> &str {
        self.inner.field()
    }

    fn query_param(&self) -> &str {
        self.inner.query_param()
    }

    fn apply_filter(&self, query: RecordQuery) -> RecordQuery {
        self.inner.apply_filter(query)
    }

    fn get_choices(
        &self,
        store: &dyn FacetStore,
        query: &RecordQuery,
    ) -> Result<Vec<FilterChoice>, DomainError> {
        self.inner
            .choose_once(self.get_choices_remove(), || self.get_choices_add(store, query))
    }
}
