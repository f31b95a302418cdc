use crate::domain::error::DomainError;
use crate::domain::ports::record_repository::RecordQuery;
use crate::domain::values::date_range_type::DateLevel;
use chrono::NaiveDate;

/// Date aggregates a store computes over a result set. Each call is one
/// round-trip to the store.
pub trait DateAggregator: Send + Sync {
    /// Earliest and latest date of `field` over `query`; `(None, None)` when
    /// no record has a date.
    fn min_max(
        &self,
        query: &RecordQuery,
        field: &str,
    ) -> Result<(Option<NaiveDate>, Option<NaiveDate>), DomainError>;

    /// Record counts grouped by `field` truncated to `level`, ascending, one
    /// row per truncated date present.
    fn count_by_date_unit(
        &self,
        query: &RecordQuery,
        field: &str,
        level: DateLevel,
    ) -> Result<Vec<(NaiveDate, u64)>, DomainError>;
}
