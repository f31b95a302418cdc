pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use crate::application::add_record::AddRecordUseCase;
use crate::application::browse::{BrowseResult, BrowseUseCase};
use crate::application::stats::{RecordStats, StatsUseCase};
use crate::config::FacetSpec;
use crate::domain::entities::record::Record;
use crate::domain::error::DomainError;
use crate::domain::ports::FacetStore;
use crate::domain::values::query_params::QueryParams;
use crate::infrastructure::sqlite::migrations::run_migrations;
use crate::infrastructure::sqlite::record_repo::SqliteRecordRepo;
use rusqlite::Connection;
use serde_json::{Map, Value};
use std::sync::Arc;

pub struct FacetDrill {
    add_record_uc: AddRecordUseCase,
    browse_uc: BrowseUseCase,
    stats_uc: StatsUseCase,
}

impl FacetDrill {
    /// Opens (creating if needed) the SQLite database at `db_path`.
    /// `":memory:"` gives a private in-memory database.
    pub fn new(db_path: &str) -> Result<Self, DomainError> {
        let conn = Connection::open(db_path)
            .map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
        if db_path != ":memory:" {
            conn.pragma_update(None, "journal_mode", "WAL")
                .map_err(|e| DomainError::Database(format!("WAL error: {e}")))?;
        }
        run_migrations(&conn)?;
        Ok(Self::with_store(Arc::new(SqliteRecordRepo::new(conn))))
    }

    pub fn with_store(store: Arc<dyn FacetStore>) -> Self {
        Self {
            add_record_uc: AddRecordUseCase::new(store.clone()),
            browse_uc: BrowseUseCase::new(store.clone()),
            stats_uc: StatsUseCase::new(store),
        }
    }

    pub fn add_record(&self, title: String, attributes: Map<String, Value>) -> Result<Record, DomainError> {
        self.add_record_uc.execute(title, attributes)
    }

    pub fn add_record_json(&self, json: &str) -> Result<Record, DomainError> {
        self.add_record_uc.execute_json(json)
    }

    pub fn browse(
        &self,
        specs: &[FacetSpec],
        params: &QueryParams,
        limit: Option<usize>,
    ) -> Result<BrowseResult, DomainError> {
        self.browse_uc.execute(specs, params, limit)
    }

    pub fn stats(&self) -> Result<RecordStats, DomainError> {
        self.stats_uc.stats()
    }
}
