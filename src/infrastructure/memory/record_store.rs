use crate::domain::entities::record::Record;
use crate::domain::error::DomainError;
use crate::domain::ports::date_aggregator::DateAggregator;
use crate::domain::ports::record_repository::{RecordQuery, RecordRepository};
use crate::domain::values::date_range_type::DateLevel;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

/// Record store held in process memory. Evaluates queries with
/// [`RecordQuery::matches`], so it agrees with the SQLite store on every
/// predicate.
#[derive(Default)]
pub struct InMemoryRecordStore {
    records: Mutex<Vec<Record>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> Result<MutexGuard<'_, Vec<Record>>, DomainError> {
        self.records
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}

impl RecordRepository for InMemoryRecordStore {
    fn add(&self, record: &Record) -> Result<(), DomainError> {
        self.records()?.push(record.clone());
        Ok(())
    }

    fn list(&self, query: &RecordQuery, limit: Option<usize>) -> Result<Vec<Record>, DomainError> {
        let records = self.records()?;
        let mut matched: Vec<Record> = records.iter().filter(|r| query.matches(r)).cloned().collect();
        matched.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        if let Some(limit) = limit {
            matched.truncate(limit);
        }
        Ok(matched)
    }

    fn count(&self, query: &RecordQuery) -> Result<u64, DomainError> {
        Ok(self.records()?.iter().filter(|r| query.matches(r)).count() as u64)
    }

    fn value_counts(
        &self,
        query: &RecordQuery,
        field: &str,
    ) -> Result<Vec<(String, u64)>, DomainError> {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for record in self.records()?.iter().filter(|r| query.matches(r)) {
            if let Some(value) = record.text_value(field) {
                *counts.entry(value).or_default() += 1;
            }
        }
        Ok(counts.into_iter().collect())
    }

    fn element_counts(
        &self,
        query: &RecordQuery,
        field: &str,
        exclude: &[String],
    ) -> Result<Vec<(String, u64)>, DomainError> {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for record in self.records()?.iter().filter(|r| query.matches(r)) {
            let elements: BTreeSet<String> = record.element_values(field).into_iter().collect();
            for element in elements {
                if !exclude.contains(&element) {
                    *counts.entry(element).or_default() += 1;
                }
            }
        }
        Ok(counts.into_iter().collect())
    }
}

impl DateAggregator for InMemoryRecordStore {
    fn min_max(
        &self,
        query: &RecordQuery,
        field: &str,
    ) -> Result<(Option<NaiveDate>, Option<NaiveDate>), DomainError> {
        let records = self.records()?;
        let dates = records
            .iter()
            .filter(|r| query.matches(r))
            .filter_map(|r| r.date_value(field));
        let bounds = dates.fold(None, |acc: Option<(NaiveDate, NaiveDate)>, d| match acc {
            None => Some((d, d)),
            Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
        });
        Ok(match bounds {
            Some((lo, hi)) => (Some(lo), Some(hi)),
            None => (None, None),
        })
    }

    fn count_by_date_unit(
        &self,
        query: &RecordQuery,
        field: &str,
        level: DateLevel,
    ) -> Result<Vec<(NaiveDate, u64)>, DomainError> {
        let mut counts: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        for record in self.records()?.iter().filter(|r| query.matches(r)) {
            if let Some(date) = record.date_value(field) {
                *counts.entry(level.truncate(date)).or_default() += 1;
            }
        }
        Ok(counts.into_iter().collect())
    }
}
