pub mod bucketing;
pub mod date_choice;
pub mod date_range_type;
pub mod filter_choice;
pub mod query_params;
