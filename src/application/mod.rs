pub mod add_record;
pub mod browse;
pub mod filters;
pub mod stats;
