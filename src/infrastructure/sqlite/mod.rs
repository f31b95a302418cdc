pub mod migrations;
pub mod record_repo;
