use crate::domain::entities::record::Record;
use crate::domain::error::DomainError;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `start <= field < end`, on the date part of the attribute.
    DateRange {
        field: String,
        start: NaiveDate,
        end: NaiveDate,
    },
    /// Text form of the attribute equals `value`.
    Equals { field: String, value: String },
    /// The attribute is an array with an element whose text equals `value`.
    Contains { field: String, value: String },
}

/// A result set described by the predicates narrowing it. Stores execute it;
/// building it never touches a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordQuery {
    predicates: Vec<Predicate>,
}

impl RecordQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn filter_by_range(mut self, field: &str, start: NaiveDate, end: NaiveDate) -> Self {
        self.predicates.push(Predicate::DateRange {
            field: field.to_string(),
            start,
            end,
        });
        self
    }

    pub fn filter_equals(mut self, field: &str, value: &str) -> Self {
        self.predicates.push(Predicate::Equals {
            field: field.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn filter_contains(mut self, field: &str, value: &str) -> Self {
        self.predicates.push(Predicate::Contains {
            field: field.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.predicates.iter().all(|p| match p {
            Predicate::DateRange { field, start, end } => record
                .date_value(field)
                .is_some_and(|d| *start <= d && d < *end),
            Predicate::Equals { field, value } => {
                record.text_value(field).as_deref() == Some(value.as_str())
            }
            Predicate::Contains { field, value } => {
                record.element_values(field).contains(value)
            }
        })
    }
}

pub trait RecordRepository: Send + Sync {
    fn add(&self, record: &Record) -> Result<(), DomainError>;
    /// Records matching `query`, oldest first.
    fn list(&self, query: &RecordQuery, limit: Option<usize>) -> Result<Vec<Record>, DomainError>;
    fn count(&self, query: &RecordQuery) -> Result<u64, DomainError>;
    /// Distinct non-null text values of `field` with their counts, ascending by value.
    fn value_counts(&self, query: &RecordQuery, field: &str)
        -> Result<Vec<(String, u64)>, DomainError>;
    /// For each distinct element of the array attribute `field`, the number
    /// of matching records containing it, ascending by element. Elements in
    /// `exclude` are left out.
    fn element_counts(
        &self,
        query: &RecordQuery,
        field: &str,
        exclude: &[String],
    ) -> Result<Vec<(String, u64)>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_matches_combines_predicates() {
        let attrs = json!({"published": "1813-01-28", "genre": "novel"});
        let record = Record::new("Pride and Prejudice".into(), attrs.as_object().cloned().unwrap());

        let in_1813 = RecordQuery::all().filter_by_range("published", ymd(1813, 1, 1), ymd(1814, 1, 1));
        assert!(in_1813.matches(&record));
        assert!(in_1813.clone().filter_equals("genre", "novel").matches(&record));
        assert!(!in_1813.filter_equals("genre", "poetry").matches(&record));

        let end_exclusive = RecordQuery::all().filter_by_range("published", ymd(1812, 1, 1), ymd(1813, 1, 28));
        assert!(!end_exclusive.matches(&record));
        assert!(RecordQuery::all().matches(&record));
    }

    #[test]
    fn test_contains_needs_every_value() {
        let attrs = json!({"tags": ["Charlotte", "Emily", "Anne"], "author": "Emily"});
        let record = Record::new("Poems".into(), attrs.as_object().cloned().unwrap());

        let emily = RecordQuery::all().filter_contains("tags", "Emily");
        assert!(emily.matches(&record));
        assert!(emily.clone().filter_contains("tags", "Anne").matches(&record));
        assert!(!emily.filter_contains("tags", "Branwell").matches(&record));
        assert!(!RecordQuery::all().filter_contains("author", "Emily").matches(&record));
    }
}
