mod common;

use common::*;
use facetdrill::application::filters::date_time::{DateFilterConfig, DateTimeFilter};
use facetdrill::application::filters::Filter;
use facetdrill::domain::ports::record_repository::RecordQuery;
use facetdrill::domain::values::bucketing::collapse_results;
use facetdrill::domain::values::date_choice::DateChoice;
use facetdrill::domain::values::date_range_type::{DateLevel, DateRangeType};
use facetdrill::domain::values::filter_choice::LinkType;
use facetdrill::domain::values::query_params::QueryParams;

fn date_filter(query: &str, config: DateFilterConfig) -> DateTimeFilter {
    DateTimeFilter::new("date_published", None, &QueryParams::parse(query), config).unwrap()
}

#[test]
fn test_few_years_are_not_collapsed() {
    let results = [(ymd(2020, 3, 1), 5), (ymd(2021, 7, 1), 3), (ymd(2022, 1, 1), 2)];
    let out: Vec<(String, u64)> = collapse_results(&results, DateRangeType::Year, 10)
        .into_iter()
        .map(|(choice, count)| (choice.to_param(), count))
        .collect();
    assert_eq!(
        out,
        vec![("2020".to_string(), 5), ("2021".to_string(), 3), ("2022".to_string(), 2)]
    );
}

#[test]
fn test_fifty_years_into_ten_links() {
    let results: Vec<_> = (1800..1850).map(|y| (ymd(y, 1, 1), 1)).collect();
    let out = collapse_results(&results, DateRangeType::Year, 10);
    assert!(out.len() <= 10);
    assert_eq!(out.iter().map(|(_, c)| c).sum::<u64>(), 50);
    for (choice, _) in &out {
        assert_eq!(choice.range_type(), DateRangeType::YearGroup);
        let (start, end) = choice.to_lookup_bounds().unwrap();
        assert_eq!(start.checked_add_months(chrono::Months::new(60)), Some(end));
    }
}

#[test]
fn test_years_apart_start_at_year_level() {
    let store = store_with(&[("A", "1813-01-01", "novel"), ("B", "1814-06-01", "novel")]);
    let choices = date_filter("", DateFilterConfig::default())
        .get_choices(&store, &RecordQuery::all())
        .unwrap();
    assert!(summary(&choices, LinkType::Display).is_empty());
    assert_eq!(
        summary(&choices, LinkType::Add),
        vec![("1813".to_string(), Some(1)), ("1814".to_string(), Some(1))]
    );
}

#[test]
fn test_single_year_starts_at_month_level_with_bridge() {
    let store = store_with(&[("A", "1813-01-01", "novel"), ("B", "1813-06-01", "novel")]);
    let choices = date_filter("", DateFilterConfig::default())
        .get_choices(&store, &RecordQuery::all())
        .unwrap();
    assert_eq!(summary(&choices, LinkType::Display), vec![("1813".to_string(), None)]);
    assert_eq!(choices[0].link_type, LinkType::Display);
    assert_eq!(
        summary(&choices, LinkType::Add),
        vec![("January".to_string(), Some(1)), ("June".to_string(), Some(1))]
    );
}

#[test]
fn test_bridges_within_max_depth_survive_without_add_choices() {
    let store = store_with(&[("A", "1813-06-01", "novel"), ("B", "1813-06-20", "novel")]);
    let config = DateFilterConfig {
        max_depth: Some(DateLevel::Year),
        ..Default::default()
    };
    let choices = date_filter("", config)
        .get_choices(&store, &RecordQuery::all())
        .unwrap();
    assert_eq!(summary(&choices, LinkType::Display), vec![("1813".to_string(), None)]);
    assert!(summary(&choices, LinkType::Add).is_empty());
}

#[test]
fn test_garbage_parameter_same_as_none() {
    let store = book_store();
    let bad = date_filter("date_published=1818xx", DateFilterConfig::default());
    let none = date_filter("", DateFilterConfig::default());
    assert!(bad.chosen().is_empty());

    let query = bad.apply_filter(RecordQuery::all());
    assert_eq!(query, RecordQuery::all());
    let strip = |filter: &DateTimeFilter| {
        filter
            .get_choices(&store, &RecordQuery::all())
            .unwrap()
            .into_iter()
            .map(|c| (c.label, c.count, c.link_type, c.params.map(|p| p.to_query_string())))
            .collect::<Vec<_>>()
    };
    assert_eq!(strip(&bad), strip(&none));
}

#[test]
fn test_drilled_choice_sorts_after_and_is_removed_with_parent() {
    let parent = DateChoice::parse("1813").unwrap();
    let child = DateChoice::parse("1813-06").unwrap();
    let grandchild = DateChoice::parse("1813-06-01").unwrap();
    assert!(child >= parent);
    assert!(grandchild >= child);

    let filter = date_filter(
        "date_published=1813-06-01&date_published=1813&date_published=1813-06",
        DateFilterConfig::default(),
    );
    let removes = filter.get_choices_remove();
    assert_eq!(removes[0].label, "1813");
    assert!(removes[0].params.as_ref().unwrap().is_empty());
}

#[test]
fn test_params_round_trip() {
    for raw in ["1813", "1813..1817", "1813-06", "1813-01..1813-06", "1813-06-01", "1813-06-01..1813-06-05"] {
        let choice = DateChoice::parse(raw).unwrap();
        assert_eq!(choice.to_param(), raw);
        assert_eq!(DateChoice::parse(&choice.to_param()).unwrap(), choice);
    }
}
