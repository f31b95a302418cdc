//! Shared test helpers: a small catalogue of books published 1813–1870.
#![allow(dead_code)]

use chrono::NaiveDate;
use facetdrill::application::filters::date_time::DateFilterConfig;
use facetdrill::application::filters::values::ValuesFilterConfig;
use facetdrill::config::FacetSpec;
use facetdrill::domain::entities::record::Record;
use facetdrill::domain::error::DomainError;
use facetdrill::domain::ports::date_aggregator::DateAggregator;
use facetdrill::domain::ports::record_repository::{RecordQuery, RecordRepository};
use facetdrill::domain::values::date_range_type::DateLevel;
use facetdrill::domain::values::filter_choice::{FilterChoice, LinkType};
use facetdrill::infrastructure::sqlite::migrations::run_migrations;
use facetdrill::infrastructure::sqlite::record_repo::SqliteRecordRepo;
use rusqlite::Connection;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const BOOKS: &[(&str, &str, &str)] = &[
    ("Pride and Prejudice", "1813-01-28", "novel"),
    ("Mansfield Park", "1814-05-09", "novel"),
    ("Emma", "1815-12-23", "novel"),
    ("Persuasion", "1817-12-20", "novel"),
    ("Northanger Abbey", "1817-12-20", "novel"),
    ("Frankenstein", "1818-01-01", "novel"),
    ("Don Juan", "1819-07-15", "poetry"),
    ("Ivanhoe", "1819-12-20", "novel"),
    ("The Pickwick Papers", "1836-03-31", "novel"),
    ("Oliver Twist", "1838-02-01", "novel"),
    ("Jane Eyre", "1847-10-16", "novel"),
    ("Wuthering Heights", "1847-12-01", "novel"),
    ("Vanity Fair", "1848-01-01", "novel"),
    ("In Memoriam", "1850-06-01", "poetry"),
    ("Moby-Dick", "1851-10-18", "novel"),
    ("Bleak House", "1853-03-01", "novel"),
    ("Walden", "1854-08-09", "memoir"),
    ("Leaves of Grass", "1855-07-04", "poetry"),
    ("Great Expectations", "1861-08-01", "novel"),
    ("Our Mutual Friend", "1865-05-01", "novel"),
    ("Alice's Adventures in Wonderland", "1865-11-26", "novel"),
    ("The Moonstone", "1868-07-01", "novel"),
    ("Little Women", "1868-09-30", "novel"),
    ("The Mystery of Edwin Drood", "1870-04-01", "novel"),
];

pub fn book(title: &str, published: &str, genre: &str) -> Record {
    let attrs = json!({ "date_published": published, "genre": genre });
    Record::new(title.to_string(), attrs.as_object().cloned().unwrap())
}

pub fn empty_store() -> SqliteRecordRepo {
    let conn = Connection::open(":memory:").unwrap();
    run_migrations(&conn).unwrap();
    SqliteRecordRepo::new(conn)
}

pub fn store_with(books: &[(&str, &str, &str)]) -> SqliteRecordRepo {
    let store = empty_store();
    for (title, published, genre) in books {
        store.add(&book(title, published, genre)).unwrap();
    }
    store
}

pub fn book_store() -> SqliteRecordRepo {
    store_with(BOOKS)
}

pub fn date_facet() -> FacetSpec {
    FacetSpec::date("date_published", DateFilterConfig::default())
}

pub fn genre_facet() -> FacetSpec {
    FacetSpec::values("genre", ValuesFilterConfig::default())
}

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// `(label, count)` of the choices with the given link type.
pub fn summary(choices: &[FilterChoice], link_type: LinkType) -> Vec<(String, Option<u64>)> {
    choices
        .iter()
        .filter(|c| c.link_type == link_type)
        .map(|c| (c.label.clone(), c.count))
        .collect()
}

/// Wraps a store and counts the date aggregate queries sent to it.
pub struct CountingStore<S> {
    pub inner: S,
    date_queries: AtomicUsize,
}

impl<S> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            date_queries: AtomicUsize::new(0),
        }
    }

    pub fn date_queries(&self) -> usize {
        self.date_queries.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.date_queries.store(0, Ordering::SeqCst);
    }
}

impl<S: RecordRepository> RecordRepository for CountingStore<S> {
    fn add(&self, record: &Record) -> Result<(), DomainError> {
        self.inner.add(record)
    }

    fn list(&self, query: &RecordQuery, limit: Option<usize>) -> Result<Vec<Record>, DomainError> {
        self.inner.list(query, limit)
    }

    fn count(&self, query: &RecordQuery) -> Result<u64, DomainError> {
        self.inner.count(query)
    }

    fn value_counts(
        &self,
        query: &RecordQuery,
        field: &str,
    ) -> Result<Vec<(String, u64)>, DomainError> {
        self.inner.value_counts(query, field)
    }

    fn element_counts(
        &self,
        query: &RecordQuery,
        field: &str,
        exclude: &[String],
    ) -> Result<Vec<(String, u64)>, DomainError> {
        self.inner.element_counts(query, field, exclude)
    }
}

impl<S: DateAggregator> DateAggregator for CountingStore<S> {
    fn min_max(
        &self,
        query: &RecordQuery,
        field: &str,
    ) -> Result<(Option<NaiveDate>, Option<NaiveDate>), DomainError> {
        self.date_queries.fetch_add(1, Ordering::SeqCst);
        self.inner.min_max(query, field)
    }

    fn count_by_date_unit(
        &self,
        query: &RecordQuery,
        field: &str,
        level: DateLevel,
    ) -> Result<Vec<(NaiveDate, u64)>, DomainError> {
        self.date_queries.fetch_add(1, Ordering::SeqCst);
        self.inner.count_by_date_unit(query, field, level)
    }
}
