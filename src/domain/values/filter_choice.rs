use crate::domain::values::query_params::QueryParams;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    /// Narrows the result set further.
    Add,
    /// Undoes an applied selection.
    Remove,
    /// Informational only, not a link.
    Display,
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkType::Add => write!(f, "add"),
            LinkType::Remove => write!(f, "remove"),
            LinkType::Display => write!(f, "display"),
        }
    }
}

/// One entry in a facet's choice list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterChoice {
    pub label: String,
    /// Matching records; `None` where a count is not meaningful.
    pub count: Option<u64>,
    /// Parameters of the request this choice leads to.
    pub params: Option<QueryParams>,
    pub link_type: LinkType,
}

impl FilterChoice {
    pub fn add(label: String, count: u64, params: QueryParams) -> Self {
        Self {
            label,
            count: Some(count),
            params: Some(params),
            link_type: LinkType::Add,
        }
    }

    pub fn remove(label: String, params: QueryParams) -> Self {
        Self {
            label,
            count: None,
            params: Some(params),
            link_type: LinkType::Remove,
        }
    }

    pub fn display(label: String, count: Option<u64>) -> Self {
        Self {
            label,
            count,
            params: None,
            link_type: LinkType::Display,
        }
    }
}
