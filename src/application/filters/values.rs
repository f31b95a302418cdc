use super::{
    build_params, display_value, normalize_add_choices, sort_choices, Filter, ParamChange,
    SelectionPolicy,
};
use crate::domain::error::DomainError;
use crate::domain::ports::record_repository::{RecordQuery, RecordRepository};
use crate::domain::ports::FacetStore;
use crate::domain::values::filter_choice::FilterChoice;
use crate::domain::values::query_params::QueryParams;
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValuesFilterConfig {
    pub order_by_count: bool,
    pub nullable: bool,
}

/// Filter on the plain value of an attribute. One value can be chosen at a
/// time; the empty string is a value like any other.
pub struct ValuesFilter {
    field: String,
    query_param: String,
    params: QueryParams,
    chosen: Vec<String>,
    config: ValuesFilterConfig,
}

impl ValuesFilter {
    pub fn new(
        field: &str,
        query_param: Option<&str>,
        params: &QueryParams,
        config: ValuesFilterConfig,
    ) -> Self {
        let query_param = query_param.unwrap_or(field).to_string();
        let chosen = params
            .get_list(&query_param)
            .into_iter()
            .map(String::from)
            .collect();
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

    pub fn config(&self) -> &ValuesFilterConfig {
        &self.config
    }

    pub(crate) fn add_choice(&self, value: &str, label: String, count: u64) -> FilterChoice {
        let params = build_params(
            &self.params,
            &self.query_param,
            &self.chosen,
            ParamChange::Add(value),
        );
        FilterChoice::add(label, count, params)
    }

    pub(crate) fn remove_choices<F>(&self, label: F) -> Vec<FilterChoice>
    where
        F: Fn(&str) -> String,
    {
        self.chosen
            .iter()
            .map(|value| {
                let params = build_params(
                    &self.params,
                    &self.query_param,
                    &self.chosen,
                    ParamChange::Remove(std::slice::from_ref(value)),
                );
                FilterChoice::remove(label(value), params)
            })
            .collect()
    }

    /// Remove links when something is chosen, otherwise `add()` normalized
    /// and sorted.
    pub(crate) fn choose_once<F>(
        &self,
        remove: Vec<FilterChoice>,
        add: F,
    ) -> Result<Vec<FilterChoice>, DomainError>
    where
        F: FnOnce() -> Result<Vec<FilterChoice>, DomainError>,
    {
        SelectionPolicy::ChooseOnce.combine(remove, || {
            let add = normalize_add_choices(add()?, self.config.nullable);
            Ok(sort_choices(add, self.config.order_by_count))
        })
    }

    pub fn get_choices_add(
        &self,
        store: &dyn FacetStore,
        query: &RecordQuery,
    ) -> Result<Vec<FilterChoice>, DomainError> {
        let counts = store.value_counts(query, &self.field)?;
        Ok(counts
            .into_iter()
            .map(|(value, count)| self.add_choice(&value, display_value(&value), count))
            .collect())
    }

    pub fn get_choices_remove(&self) -> Vec<FilterChoice> {
        self.remove_choices(display_value)
    }
}

impl Filter for ValuesFilter {
    fn field(&self) -> &str {
        &self.field
    }

    fn query_param(&self) -> &str {
        &self.query_param
    }

    fn apply_filter(&self, query: RecordQuery) -> RecordQuery {
        self.chosen
            .iter()
            .fold(query, |query, value| query.filter_equals(&self.field, value))
    }

    fn get_choices(
        &self,
        store: &dyn FacetStore,
        query: &RecordQuery,
    ) -> Result<Vec<FilterChoice>, DomainError> {
        self.choose_once(self.get_choices_remove(), || self.get_choices_add(store, query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::record::Record;
    use crate::domain::values::filter_choice::LinkType;
    use crate::infrastructure::memory::record_store::InMemoryRecordStore;
    use serde_json::json;

    fn store() -> InMemoryRecordStore {
        let store = InMemoryRecordStore::new();
        for genre in ["novel", "poetry", "novel", "novel", "memoir"] {
            let attrs = json!({ "genre": genre });
            store
                .add(&Record::new("Book".into(), attrs.as_object().cloned().unwrap()))
                .unwrap();
        }
        store
    }

    #[test]
    fn test_add_choices_in_value_order() {
        let store = store();
        let f = ValuesFilter::new("genre", None, &QueryParams::new(), ValuesFilterConfig::default());
        let choices = f.get_choices(&store, &RecordQuery::all()).unwrap();
        let summary: Vec<(&str, Option<u64>)> =
            choices.iter().map(|c| (c.label.as_str(), c.count)).collect();
        assert_eq!(summary, vec![("memoir", Some(1)), ("novel", Some(3)), ("poetry", Some(1))]);
        assert_eq!(
            choices[1].params.as_ref().unwrap().to_query_string(),
            "genre=novel"
        );
    }

    #[test]
    fn test_order_by_count() {
        let store = store();
        let config = ValuesFilterConfig {
            order_by_count: true,
            ..Default::default()
        };
        let f = ValuesFilter::new("genre", None, &QueryParams::new(), config);
        let choices = f.get_choices(&store, &RecordQuery::all()).unwrap();
        assert_eq!(choices[0].label, "novel");
    }

    #[test]
    fn test_chosen_value_only_offers_remove() {
        let store = store();
        let params = QueryParams::parse("genre=novel&page=4");
        let f = ValuesFilter::new("genre", None, &params, ValuesFilterConfig::default());
        let query = f.apply_filter(RecordQuery::all());
        assert_eq!(store.count(&query).unwrap(), 3);

        let choices = f.get_choices(&store, &query).unwrap();
        assert_eq!(choices.len(), 1);
        assert_eq!(choices[0].link_type, LinkType::Remove);
        assert_eq!(choices[0].label, "novel");
        assert!(choices[0].params.as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_empty_value_link_narrows() {
        let store = InMemoryRecordStore::new();
        for genre in ["", "novel", "novel"] {
            let attrs = json!({ "genre": genre });
            store
                .add(&Record::new("Book".into(), attrs.as_object().cloned().unwrap()))
                .unwrap();
        }
        let f = ValuesFilter::new("genre", None, &QueryParams::new(), ValuesFilterConfig::default());
        let choices = f.get_choices(&store, &RecordQuery::all()).unwrap();
        assert_eq!(choices[0].label, "(empty)");
        let next = choices[0].params.clone().unwrap();
        assert_eq!(next.to_query_string(), "genre=");

        let f = ValuesFilter::new("genre", None, &next, ValuesFilterConfig::default());
        assert_eq!(f.chosen(), [""]);
        let query = f.apply_filter(RecordQuery::all());
        assert_eq!(store.count(&query).unwrap(), 1);
        let choices = f.get_choices(&store, &query).unwrap();
        assert_eq!(choices.len(), 1);
        assert_eq!(choices[0].label, "(empty)");
        assert_eq!(choices[0].link_type, LinkType::Remove);
        assert!(choices[0].params.as_ref().unwrap().is_empty());
    }
}
