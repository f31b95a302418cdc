//! Year → month → day drill-down over a date field.
//!
//! With nothing chosen, the first level shown is inferred from the spread of
//! the data (one min/max query). Once a selection pins the granularity only
//! the aggregate count query is issued. Counts are collapsed into range
//! buckets when there would be more than `max_links` choices, and display-only
//! "bridge" entries fill in any levels skipped on the way down.

use super::{build_params, normalize_add_choices, sort_choices, Filter, ParamChange, SelectionPolicy};
use crate::domain::error::DomainError;
use crate::domain::ports::date_aggregator::DateAggregator;
use crate::domain::ports::record_repository::RecordQuery;
use crate::domain::ports::FacetStore;
use crate::domain::values::bucketing::collapse_results;
use crate::domain::values::date_choice::DateChoice;
use crate::domain::values::date_range_type::{DateLevel, DateRangeType};
use crate::domain::values::filter_choice::FilterChoice;
use crate::domain::values::query_params::QueryParams;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

pub const DEFAULT_MAX_LINKS: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DateFilterConfig {
    /// Most choices shown per drill level.
    pub max_links: usize,
    /// Deepest level offered as a choice; `None` drills down to days.
    #[serde(deserialize_with = "deserialize_max_depth")]
    pub max_depth: Option<DateLevel>,
    pub order_by_count: bool,
    pub nullable: bool,
}

impl Default for DateFilterConfig {
    fn default() -> Self {
        Self {
            max_links: DEFAULT_MAX_LINKS,
            max_depth: None,
            order_by_count: false,
            nullable: false,
        }
    }
}

impl DateFilterConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.max_links == 0 {
            return Err(DomainError::Config("max_links must be at least 1".into()));
        }
        Ok(())
    }

    /// Level number past which add choices are suppressed.
    fn max_depth_level(&self) -> u8 {
        self.max_depth
            .map_or(DateLevel::Day.number() + 1, |level| level.number())
    }
}

/// Parses a `max_depth` setting: `year`, `month`, `day` or `none`.
pub fn parse_max_depth(s: &str) -> Result<Option<DateLevel>, DomainError> {
    match s.to_lowercase().as_str() {
        "" | "none" => Ok(None),
        other => other.parse().map(Some).map_err(DomainError::Config),
    }
}

fn deserialize_max_depth<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateLevel>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_max_depth(&raw).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

pub struct DateTimeFilter {
    field: String,
    query_param: String,
    params: QueryParams,
    chosen: Vec<DateChoice>,
    config: DateFilterConfig,
}

impl DateTimeFilter {
    /// Reads the chosen values of `query_param` (default: the field name)
    /// from `params`. Values that do not parse are dropped.
    pub fn new(
        field: &str,
        query_param: Option<&str>,
        params: &QueryParams,
        config: DateFilterConfig,
    ) -> Result<Self, DomainError> {
        config.validate()?;
        let query_param = query_param.unwrap_or(field).to_string();
        let mut chosen: Vec<DateChoice> = params
            .get_list(&query_param)
            .into_iter()
            .filter_map(|value| match DateChoice::parse(value) {
                Ok(choice) => Some(choice),
                Err(e) => {
                    debug!(param = %query_param, value, error = %e, "dropping date parameter");
                    None
                }
            })
            .collect();
        chosen.sort();

        Ok(Self {
            field: field.to_string(),
            query_param,
            params: params.clone(),
            chosen,
            config,
        })
    }

    /// Applied selections, broadest first.
    pub fn chosen(&self) -> &[DateChoice] {
        &self.chosen
    }

    pub fn config(&self) -> &DateFilterConfig {
        &self.config
    }

    pub fn get_choices_add<S: DateAggregator + ?Sized>(
        &self,
        store: &S,
        query: &RecordQuery,
    ) -> Result<Vec<FilterChoice>, DomainError> {
        let max_depth = self.config.max_depth_level();

        let range_type = match self.chosen.last() {
            Some(last) => match last.range_type().drilldown() {
                None => return Ok(vec![]),
                Some(next) if next.level().number() > max_depth => {
                    debug!(field = %self.field, next = %next, "drilldown below max depth");
                    return Ok(vec![]);
                }
                Some(next) => next,
            },
            None => match store.min_max(query, &self.field)? {
                (Some(first), Some(last)) => infer_range_type(first, last),
                _ => return Ok(vec![]),
            },
        };
        debug!(field = %self.field, granularity = %range_type, "querying date counts");

        let results = store.count_by_date_unit(query, &self.field, range_type.level())?;
        let date_choice_counts = collapse_results(&results, range_type, self.config.max_links);

        let mut choices = self.bridge_choices(&date_choice_counts);
        for (date_choice, count) in date_choice_counts {
            if self.chosen.contains(&date_choice) {
                continue;
            }
            // Checked after the bridges, which stay useful context.
            if range_type.level().number() > max_depth {
                continue;
            }
            let params = self.build_params(ParamChange::Add(&date_choice.to_param()));
            choices.push(FilterChoice::add(date_choice.display(), count, params));
        }
        Ok(choices)
    }

    /// One remove link per selection. Removing a selection also removes every
    /// selection at least as specific, since those were drilled from it.
    pub fn get_choices_remove(&self) -> Vec<FilterChoice> {
        self.chosen
            .iter()
            .map(|choice| {
                let to_remove: Vec<String> = self
                    .chosen
                    .iter()
                    .filter(|other| *other >= choice)
                    .map(DateChoice::to_param)
                    .collect();
                let params = self.build_params(ParamChange::Remove(&to_remove));
                FilterChoice::remove(choice.display(), params)
            })
            .collect()
    }

    /// Display entries for the levels between the current selection (or
    /// nothing) and the first bucketed result.
    fn bridge_choices(&self, date_choice_counts: &[(DateChoice, u64)]) -> Vec<FilterChoice> {
        let Some((first, _)) = date_choice_counts.first() else {
            return vec![];
        };
        let Some(template) = first.start_date() else {
            return vec![];
        };
        let chosen_level = self.chosen.last().map_or(0, |c| c.level().number());
        let new_level = first.level().number();
        let max_depth = self.config.max_depth_level();

        ((chosen_level + 1)..new_level)
            .filter(|level| *level <= max_depth)
            .filter_map(DateLevel::from_number)
            .map(|level| {
                let bridge = DateChoice::from_date(DateRangeType::of(level, true), template);
                FilterChoice::display(bridge.display(), None)
            })
            .collect()
    }

    fn build_params(&self, change: ParamChange<'_>) -> QueryParams {
        let chosen: Vec<String> = self.chosen.iter().map(DateChoice::to_param).collect();
        build_params(&self.params, &self.query_param, &chosen, change)
    }
}

/// First level to show when nothing is chosen: the coarsest level at which
/// the data is not already pinned to one value.
fn infer_range_type(first: NaiveDate, last: NaiveDate) -> DateRangeType {
    if first.year() == last.year() {
        if first.month() == last.month() {
            DateRangeType::Day
        } else {
            DateRangeType::Month
        }
    } else {
        DateRangeType::Year
    }
}

impl Filter for DateTimeFilter {
    fn field(&self) -> &str {
        &self.field
    }

    fn query_param(&self) -> &str {
        &self.query_param
    }

    fn apply_filter(&self, query: RecordQuery) -> RecordQuery {
        self.chosen
            .iter()
            .fold(query, |query, choice| match choice.to_lookup_bounds() {
                Ok((start, end)) => query.filter_by_range(&self.field, start, end),
                Err(e) => {
                    warn!(field = %self.field, choice = %choice, error = %e, "skipping date choice");
                    query
                }
            })
    }

    fn get_choices(
        &self,
        store: &dyn FacetStore,
        query: &RecordQuery,
    ) -> Result<Vec<FilterChoice>, DomainError> {
        SelectionPolicy::ChooseAgain.combine(self.get_choices_remove(), || {
            let add = self.get_choices_add(store, query)?;
            let add = normalize_add_choices(add, self.config.nullable);
            Ok(sort_choices(add, self.config.order_by_count))
        })
    }
}
