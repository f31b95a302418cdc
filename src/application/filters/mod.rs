//! Facet filters: each one narrows a [`RecordQuery`] from its request
//! parameter and lists the choices for the next request.

pub mod choices;
pub mod date_time;
pub mod filter_set;
pub mod many_values;
pub mod values;

use crate::domain::error::DomainError;
use crate::domain::ports::record_repository::RecordQuery;
use crate::domain::ports::FacetStore;
use crate::domain::values::filter_choice::{FilterChoice, LinkType};
use crate::domain::values::query_params::QueryParams;
use std::cmp::Reverse;

pub trait Filter: Send + Sync {
    /// Record attribute this filter works on.
    fn field(&self) -> &str;

    /// Request parameter carrying the chosen values.
    fn query_param(&self) -> &str;

    fn apply_filter(&self, query: RecordQuery) -> RecordQuery;

    /// Remove/add/display entries for this facet, computed against `query`
    /// (normally the already filtered result set).
    fn get_choices(
        &self,
        store: &dyn FacetStore,
        query: &RecordQuery,
    ) -> Result<Vec<FilterChoice>, DomainError>;
}

/// How remove links and add links of one facet combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// A single active selection: once something is chosen only the remove
    /// link is offered.
    ChooseOnce,
    /// Selections stack (drill-down): remove links followed by add links.
    ChooseAgain,
}

impl SelectionPolicy {
    /// `add` is only evaluated when its result is shown.
    pub fn combine<F>(
        self,
        remove: Vec<FilterChoice>,
        add: F,
    ) -> Result<Vec<FilterChoice>, DomainError>
    where
        F: FnOnce() -> Result<Vec<FilterChoice>, DomainError>,
    {
        match self {
            SelectionPolicy::ChooseOnce if !remove.is_empty() => Ok(remove),
            SelectionPolicy::ChooseOnce => add(),
            SelectionPolicy::ChooseAgain => {
                let mut out = remove;
                out.extend(add()?);
                Ok(out)
            }
        }
    }
}

pub(crate) enum ParamChange<'a> {
    Add(&'a str),
    Remove(&'a [String]),
}

/// Parameters for the request reached by applying `change` to `chosen`.
/// Paging is always reset.
pub(crate) fn build_params(
    params: &QueryParams,
    query_param: &str,
    chosen: &[String],
    change: ParamChange<'_>,
) -> QueryParams {
    let mut params = params.clone();
    let mut chosen = chosen.to_vec();
    match change {
        ParamChange::Add(value) => {
            if !chosen.iter().any(|c| c == value) {
                chosen.push(value.to_string());
            }
        }
        ParamChange::Remove(values) => {
            for value in values {
                if let Some(pos) = chosen.iter().position(|c| c == value) {
                    chosen.remove(pos);
                }
            }
        }
    }
    if chosen.is_empty() {
        params.remove(query_param);
    } else {
        params.set_list(query_param, &chosen);
    }
    params.remove("page");
    params
}

/// Label for a plain attribute value; the empty string is shown as `(empty)`.
pub(crate) fn display_value(value: &str) -> String {
    if value.is_empty() {
        "(empty)".to_string()
    } else {
        value.to_string()
    }
}

/// A lone add choice on a non-nullable field would not narrow anything, so it
/// is shown as plain text instead.
pub(crate) fn normalize_add_choices(
    mut choices: Vec<FilterChoice>,
    nullable: bool,
) -> Vec<FilterChoice> {
    if nullable {
        return choices;
    }
    let mut adds = choices.iter_mut().filter(|c| c.link_type == LinkType::Add);
    if let (Some(only), None) = (adds.next(), adds.next()) {
        only.link_type = LinkType::Display;
        only.params = None;
    }
    choices
}

/// With `order_by_count`, add choices go most-frequent first; other entries
/// keep their place ahead of them.
pub(crate) fn sort_choices(mut choices: Vec<FilterChoice>, order_by_count: bool) -> Vec<FilterChoice> {
    if order_by_count {
        choices.sort_by_key(|c| (c.link_type == LinkType::Add, Reverse(c.count)));
    }
    choices
}
