use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A filterable record. Facet fields live in `attributes`; date fields are
/// strings starting with `YYYY-MM-DD`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub title: String,
    pub attributes: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl Record {
    pub fn new(title: String, attributes: Map<String, Value>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            attributes,
            created_at: Utc::now(),
        }
    }

    /// The attribute as text: strings as-is, numbers and booleans printed,
    /// `None` for null, missing, arrays and objects.
    pub fn text_value(&self, field: &str) -> Option<String> {
        scalar_text(self.attributes.get(field)?)
    }

    /// Text of each scalar element of an array attribute. Anything that is
    /// not an array has no elements.
    pub fn element_values(&self, field: &str) -> Vec<String> {
        match self.attributes.get(field) {
            Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
            _ => Vec::new(),
        }
    }

    /// The date part of a date attribute; any time suffix is ignored.
    pub fn date_value(&self, field: &str) -> Option<NaiveDate> {
        let raw = self.attributes.get(field)?.as_str()?;
        let date_part = raw.get(..10)?;
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
