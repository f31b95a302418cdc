use super::choices::ChoicesFilter;
use super::date_time::DateTimeFilter;
use super::many_values::ManyValuesFilter;
use super::values::ValuesFilter;
use super::Filter;
use crate::config::{FacetKind, FacetSpec};
use crate::domain::error::DomainError;
use crate::domain::ports::record_repository::RecordQuery;
use crate::domain::ports::FacetStore;
use crate::domain::values::filter_choice::FilterChoice;
use crate::domain::values::query_params::QueryParams;
use serde::Serialize;

/// Rendered facet: its heading and the links to show under it.
#[derive(Debug, Clone, Serialize)]
pub struct FacetView {
    pub field: String,
    pub label: String,
    pub choices: Vec<FilterChoice>,
}

/// The filters of one request, applied in order.
#[derive(Default)]
pub struct FilterSet {
    filters: Vec<(String, Box<dyn Filter>)>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: &str, filter: Box<dyn Filter>) {
        self.filters.push((label.to_string(), filter));
    }

    pub fn from_specs(specs: &[FacetSpec], params: &QueryParams) -> Result<Self, DomainError> {
        let mut set = Self::new();
        for spec in specs {
            let query_param = spec.query_param.as_deref();
            let filter: Box<dyn Filter> = match &spec.kind {
                FacetKind::Date(config) => Box::new(DateTimeFilter::new(
                    &spec.field,
                    query_param,
                    params,
                    config.clone(),
                )?),
                FacetKind::Values(config) => Box::new(ValuesFilter::new(
                    &spec.field,
                    query_param,
                    params,
                    config.clone(),
                )),
                FacetKind::Choices(config) => Box::new(ChoicesFilter::new(
                    &spec.field,
                    query_param,
                    params,
                    config.clone(),
                )),
                FacetKind::Many(config) => Box::new(ManyValuesFilter::new(
                    &spec.field,
                    query_param,
                    params,
                    config.clone(),
                )),
            };
            set.push(&spec.display_label(), filter);
        }
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Narrows `query` by every filter's selection.
    pub fn apply(&self, query: RecordQuery) -> RecordQuery {
        self.filters
            .iter()
            .fold(query, |query, (_, filter)| filter.apply_filter(query))
    }

    /// Choices of each facet over `query`, which should already be the
    /// result of [`FilterSet::apply`].
    pub fn choices(
        &self,
        store: &dyn FacetStore,
        query: &RecordQuery,
    ) -> Result<Vec<FacetView>, DomainError> {
        self.filters
            .iter()
            .map(|(label, filter)| {
                Ok(FacetView {
                    field: filter.field().to_string(),
                    label: label.clone(),
                    choices: filter.get_choices(store, query)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::filters::date_time::DateFilterConfig;
    use crate::application::filters::values::ValuesFilterConfig;
    use crate::domain::entities::record::Record;
    use crate::domain::ports::record_repository::RecordRepository;
    use crate::domain::values::filter_choice::LinkType;
    use crate::infrastructure::memory::record_store::InMemoryRecordStore;
    use serde_json::json;

    fn store() -> InMemoryRecordStore {
        let store = InMemoryRecordStore::new();
        for (published, genre) in [
            ("1813-01-28", "novel"),
            ("1813-05-01", "poetry"),
            ("1814-05-09", "novel"),
            ("1815-12-23", "novel"),
        ] {
            let attrs = json!({ "date_published": published, "genre": genre });
            store
                .add(&Record::new("Book".into(), attrs.as_object().cloned().unwrap()))
                .unwrap();
        }
        store
    }

    fn specs() -> Vec<FacetSpec> {
        vec![
            FacetSpec::date("date_published", DateFilterConfig::default()),
            FacetSpec::values("genre", ValuesFilterConfig::default()),
        ]
    }

    #[test]
    fn test_filters_narrow_each_other() {
        let store = store();
        let params = QueryParams::parse("date_published=1813");
        let set = FilterSet::from_specs(&specs(), &params).unwrap();
        assert_eq!(set.len(), 2);

        let query = set.apply(RecordQuery::all());
        assert_eq!(store.count(&query).unwrap(), 2);

        let views = set.choices(&store, &query).unwrap();
        assert_eq!(views[0].label, "Date published");
        assert_eq!(views[0].choices[0].link_type, LinkType::Remove);
        assert_eq!(views[1].field, "genre");
        let genres: Vec<(&str, Option<u64>)> = views[1]
            .choices
            .iter()
            .map(|c| (c.label.as_str(), c.count))
            .collect();
        assert_eq!(genres, vec![("novel", Some(1)), ("poetry", Some(1))]);

        // Links from one facet keep the other facet's selection.
        let novel = views[1].choices[0].params.as_ref().unwrap();
        assert_eq!(novel.to_query_string(), "date_published=1813&genre=novel");
    }

    #[test]
    fn test_custom_query_param_and_label() {
        let mut spec = FacetSpec::values("genre", ValuesFilterConfig::default());
        spec.query_param = Some("g".into());
        spec.label = Some("Kind".into());
        let set = FilterSet::from_specs(&[spec], &QueryParams::parse("g=poetry")).unwrap();
        let store = store();
        let query = set.apply(RecordQuery::all());
        assert_eq!(store.count(&query).unwrap(), 1);
        let views = set.choices(&store, &query).unwrap();
        assert_eq!(views[0].label, "Kind");
        assert_eq!(views[0].choices[0].link_type, LinkType::Remove);
    }

    #[test]
    fn test_empty_set_is_identity() {
        let set = FilterSet::new();
        assert!(set.is_empty());
        assert_eq!(set.apply(RecordQuery::all()), RecordQuery::all());
        assert!(set.choices(&store(), &RecordQuery::all()).unwrap().is_empty());
    }
}
