use crate::domain::entities::record::Record;
use crate::domain::error::DomainError;
use crate::domain::ports::date_aggregator::DateAggregator;
use crate::domain::ports::record_repository::{Predicate, RecordQuery, RecordRepository};
use crate::domain::values::date_range_type::DateLevel;
use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::ToSql;
use rusqlite::{params, Connection};
use std::sync::Mutex;
use tracing::{debug, warn};

const SELECT_COLS: &str = "id, title, attributes, created_at";
const DATE_FORMAT: &str = "%Y-%m-%d";

static FIELD_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("field name regex"));

/// Records in SQLite. Attributes are one JSON column; facet fields are read
/// with `json_extract`, so any attribute can be filtered without a schema
/// change.
pub struct SqliteRecordRepo {
    conn: Mutex<Connection>,
}

type SqlParams = Vec<Box<dyn ToSql>>;

impl SqliteRecordRepo {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn row_to_record(row: &rusqlite::Row) -> Result<Record, rusqlite::Error> {
        let attributes_str: String = row.get(2)?;
        let created_str: String = row.get(3)?;
        Ok(Record {
            id: row.get(0)?,
            title: row.get(1)?,
            attributes: serde_json::from_str(&attributes_str).unwrap_or_default(),
            created_at: DateTime::parse_from_rfc3339(&created_str)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .unwrap_or_else(|_| chrono::Utc::now()),
        })
    }

    /// Binds the JSON path of `field` and returns its placeholder number.
    fn bind_path(field: &str, param_values: &mut SqlParams) -> Result<usize, DomainError> {
        if !FIELD_NAME.is_match(field) {
            return Err(DomainError::InvalidInput(format!(
                "Invalid field name '{field}': use letters, digits and underscores"
            )));
        }
        param_values.push(Box::new(format!("$.{field}")));
        Ok(param_values.len())
    }

    /// The attribute as a `YYYY-MM-DD` string, NULL unless it is a string
    /// starting with a real calendar date.
    fn date_expr(path: usize) -> String {
        let raw = format!(
            "(CASE WHEN json_type(attributes, ?{path}) = 'text' \
             THEN substr(json_extract(attributes, ?{path}), 1, 10) END)"
        );
        format!("(CASE WHEN date({raw}) = {raw} THEN {raw} END)")
    }

    /// A JSON scalar printed as text, NULL for null, arrays and objects.
    fn text_case(type_expr: &str, value_expr: &str) -> String {
        format!(
            "(CASE {type_expr} \
             WHEN 'true' THEN 'true' \
             WHEN 'false' THEN 'false' \
             WHEN 'text' THEN {value_expr} \
             WHEN 'integer' THEN CAST({value_expr} AS TEXT) \
             WHEN 'real' THEN CAST({value_expr} AS TEXT) \
             END)"
        )
    }

    /// The attribute printed as text.
    fn text_expr(path: usize) -> String {
        Self::text_case(
            &format!("json_type(attributes, ?{path})"),
            &format!("json_extract(attributes, ?{path})"),
        )
    }

    /// Text of the current element of a `json_each` row named `alias`.
    fn element_text_expr(alias: &str) -> String {
        Self::text_case(&format!("{alias}.type"), &format!("{alias}.value"))
    }

    fn where_clause(query: &RecordQuery, param_values: &mut SqlParams) -> Result<String, DomainError> {
        let mut sql = String::from(" WHERE 1=1");
        for predicate in query.predicates() {
            match predicate {
                Predicate::DateRange { field, start, end } => {
                    let path = Self::bind_path(field, param_values)?;
                    let expr = Self::date_expr(path);
                    sql.push_str(&format!(" AND {expr} >= ?{}", param_values.len() + 1));
                    param_values.push(Box::new(start.format(DATE_FORMAT).to_string()));
                    sql.push_str(&format!(" AND {expr} < ?{}", param_values.len() + 1));
                    param_values.push(Box::new(end.format(DATE_FORMAT).to_string()));
                }
                Predicate::Equals { field, value } => {
                    let path = Self::bind_path(field, param_values)?;
                    sql.push_str(&format!(
                        " AND {} = ?{}",
                        Self::text_expr(path),
                        param_values.len() + 1
                    ));
                    param_values.push(Box::new(value.clone()));
                }
                Predicate::Contains { field, value } => {
                    let path = Self::bind_path(field, param_values)?;
                    sql.push_str(&format!(
                        " AND EXISTS (SELECT 1 FROM json_each(attributes, ?{path}) AS jc \
                         WHERE json_type(attributes, ?{path}) = 'array' AND {} = ?{})",
                        Self::element_text_expr("jc"),
                        param_values.len() + 1
                    ));
                    param_values.push(Box::new(value.clone()));
                }
            }
        }
        Ok(sql)
    }

    fn parse_date(raw: &str) -> Result<NaiveDate, DomainError> {
        NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map_err(|e| DomainError::Database(format!("Unexpected date '{raw}': {e}")))
    }
}

impl RecordRepository for SqliteRecordRepo {
    fn add(&self, record: &Record) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let attributes = serde_json::to_string(&record.attributes)
            .map_err(|e| DomainError::InvalidInput(format!("Bad attributes: {e}")))?;
        conn.execute(
            "INSERT INTO records (id, title, attributes, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![record.id, record.title, attributes, record.created_at.to_rfc3339()],
        )
        .map_err(|e| DomainError::Database(format!("Failed to add record: {e}")))?;
        Ok(())
    }

    fn list(&self, query: &RecordQuery, limit: Option<usize>) -> Result<Vec<Record>, DomainError> {
        let mut param_values: SqlParams = Vec::new();
        let mut sql = format!(
            "SELECT {SELECT_COLS} FROM records{}",
            Self::where_clause(query, &mut param_values)?
        );
        sql.push_str(" ORDER BY created_at ASC, rowid ASC");
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT ?{}", param_values.len() + 1));
            param_values.push(Box::new(limit as i64));
        }

        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let params_refs: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let records = stmt
            .query_map(params_refs.as_slice(), Self::row_to_record)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| match r {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable record row");
                    None
                }
            })
            .collect();
        Ok(records)
    }

    fn count(&self, query: &RecordQuery) -> Result<u64, DomainError> {
        let mut param_values: SqlParams = Vec::new();
        let sql = format!(
            "SELECT COUNT(*) FROM records{}",
            Self::where_clause(query, &mut param_values)?
        );
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let params_refs: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
        let count: i64 = conn
            .query_row(&sql, params_refs.as_slice(), |row| row.get(0))
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(count as u64)
    }

    fn value_counts(
        &self,
        query: &RecordQuery,
        field: &str,
    ) -> Result<Vec<(String, u64)>, DomainError> {
        let mut param_values: SqlParams = Vec::new();
        let path = Self::bind_path(field, &mut param_values)?;
        let sql = format!(
            "SELECT v, COUNT(*) FROM (SELECT {} AS v FROM records{}) \
             WHERE v IS NOT NULL GROUP BY v ORDER BY v",
            Self::text_expr(path),
            Self::where_clause(query, &mut param_values)?
        );
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let params_refs: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params_refs.as_slice(), |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut counts = Vec::new();
        for row in rows {
            counts.push(row?);
        }
        Ok(counts)
    }

    fn element_counts(
        &self,
        query: &RecordQuery,
        field: &str,
        exclude: &[String],
    ) -> Result<Vec<(String, u64)>, DomainError> {
        let mut param_values: SqlParams = Vec::new();
        let path = Self::bind_path(field, &mut param_values)?;
        let mut sql = format!(
            "SELECT v, COUNT(DISTINCT rid) FROM (\
             SELECT records.rowid AS rid, {} AS v \
             FROM records, json_each(records.attributes, ?{path}) AS je{} \
             AND json_type(records.attributes, ?{path}) = 'array') \
             WHERE v IS NOT NULL",
            Self::element_text_expr("je"),
            Self::where_clause(query, &mut param_values)?
        );
        if !exclude.is_empty() {
            let placeholders: Vec<String> = exclude
                .iter()
                .map(|value| {
                    param_values.push(Box::new(value.clone()));
                    format!("?{}", param_values.len())
                })
                .collect();
            sql.push_str(&format!(" AND v NOT IN ({})", placeholders.join(", ")));
        }
        sql.push_str(" GROUP BY v ORDER BY v");

        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let params_refs: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params_refs.as_slice(), |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut counts = Vec::new();
        for row in rows {
            counts.push(row?);
        }
        Ok(counts)
    }
}

impl DateAggregator for SqliteRecordRepo {
    fn min_max(
        &self,
        query: &RecordQuery,
        field: &str,
    ) -> Result<(Option<NaiveDate>, Option<NaiveDate>), DomainError> {
        let mut param_values: SqlParams = Vec::new();
        let path = Self::bind_path(field, &mut param_values)?;
        let sql = format!(
            "SELECT MIN(d), MAX(d) FROM (SELECT {} AS d FROM records{}) WHERE d IS NOT NULL",
            Self::date_expr(path),
            Self::where_clause(query, &mut param_values)?
        );
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let params_refs: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
        let (min, max): (Option<String>, Option<String>) = conn
            .query_row(&sql, params_refs.as_slice(), |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(|e| DomainError::Database(e.to_string()))?;
        debug!(field, min = ?min, max = ?max, "date bounds");
        Ok((
            min.as_deref().map(Self::parse_date).transpose()?,
            max.as_deref().map(Self::parse_date).transpose()?,
        ))
    }

    fn count_by_date_unit(
        &self,
        query: &RecordQuery,
        field: &str,
        level: DateLevel,
    ) -> Result<Vec<(NaiveDate, u64)>, DomainError> {
        let unit = match level {
            DateLevel::Year => "date(d, 'start of year')",
            DateLevel::Month => "date(d, 'start of month')",
            DateLevel::Day => "date(d)",
        };
        let mut param_values: SqlParams = Vec::new();
        let path = Self::bind_path(field, &mut param_values)?;
        let sql = format!(
            "SELECT {unit} AS unit, COUNT(*) FROM (SELECT {} AS d FROM records{}) \
             WHERE d IS NOT NULL GROUP BY unit ORDER BY unit",
            Self::date_expr(path),
            Self::where_clause(query, &mut param_values)?
        );
        debug!(field, level = %level, %sql, "counting by date unit");
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let params_refs: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params_refs.as_slice(), |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut counts = Vec::new();
        for row in rows {
            let (unit, count) = row?;
            counts.push((Self::parse_date(&unit)?, count));
        }
        Ok(counts)
    }
}
