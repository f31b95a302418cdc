use crate::domain::entities::record::Record;
use crate::domain::error::DomainError;
use crate::domain::ports::record_repository::RecordRepository;
use crate::domain::ports::FacetStore;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

pub struct AddRecordUseCase {
    store: Arc<dyn FacetStore>,
}

impl AddRecordUseCase {
    pub fn new(store: Arc<dyn FacetStore>) -> Self {
        Self { store }
    }

    pub fn execute(&self, title: String, attributes: Map<String, Value>) -> Result<Record, DomainError> {
        if title.trim().is_empty() {
            return Err(DomainError::InvalidInput("Title cannot be empty".into()));
        }
        let record = Record::new(title, attributes);
        self.store.add(&record)?;
        debug!(id = %record.id, "record added");
        Ok(record)
    }

    /// Parses `{"title": ..., "attributes": {...}}` and stores it.
    pub fn execute_json(&self, json: &str) -> Result<Record, DomainError> {
        let data: Value = serde_json::from_str(json)
            .map_err(|e| DomainError::InvalidInput(format!("Invalid JSON: {e}")))?;
        let title = data["title"]
            .as_str()
            .ok_or("Missing required field: title")?
            .to_string();
        let attributes = match data.get("attributes") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => return Err("attributes must be a JSON object".into()),
        };
        self.execute(title, attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::record_repository::RecordQuery;
    use crate::infrastructure::memory::record_store::InMemoryRecordStore;

    #[test]
    fn test_execute_json() {
        let store = Arc::new(InMemoryRecordStore::new());
        let uc = AddRecordUseCase::new(store.clone());
        let record = uc
            .execute_json(r#"{"title": "Emma", "attributes": {"published": "1815-12-23"}}"#)
            .unwrap();
        assert_eq!(record.title, "Emma");
        assert_eq!(store.count(&RecordQuery::all()).unwrap(), 1);

        assert!(uc.execute_json(r#"{"title": "No attrs"}"#).is_ok());
        assert!(matches!(uc.execute_json("{}"), Err(DomainError::InvalidInput(_))));
        assert!(matches!(
            uc.execute_json(r#"{"title": "x", "attributes": [1]}"#),
            Err(DomainError::InvalidInput(_))
        ));
        assert!(matches!(uc.execute_json("not json"), Err(DomainError::InvalidInput(_))));
        assert!(uc.execute("  ".into(), Map::new()).is_err());
    }
}
