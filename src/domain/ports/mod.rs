pub mod date_aggregator;
pub mod record_repository;

use date_aggregator::DateAggregator;
use record_repository::RecordRepository;

/// Everything a filter set needs from a store.
pub trait FacetStore: RecordRepository + DateAggregator {}

impl<T: RecordRepository + DateAggregator + ?Sized> FacetStore for T {}
