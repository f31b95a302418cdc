use crate::application::filters::many_values::ManyValuesFilterConfig;
use crate::application::filters::values::ValuesFilterConfig;
use crate::config::{AppConfig, FacetSpec};
use crate::domain::error::DomainError;
use crate::domain::values::query_params::QueryParams;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "facetdrill", about = "Faceted browsing with date drill-down")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a record
    Add {
        /// JSON data with title and attributes
        json: String,
    },
    /// List records with facet choices for the current selection
    Browse {
        /// Request parameter (repeatable), e.g. date_published=1813
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
        /// Full query string, e.g. 'date_published=1813&genre=novel'
        #[arg(long)]
        query: Option<String>,
        /// Date field to drill into (repeatable)
        #[arg(long = "date", value_name = "FIELD")]
        date_fields: Vec<String>,
        /// Field to facet by plain value (repeatable)
        #[arg(long = "values", value_name = "FIELD")]
        values_fields: Vec<String>,
        /// Array field to facet by element (repeatable)
        #[arg(long = "many", value_name = "FIELD")]
        many_fields: Vec<String>,
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Show record counts
    Stats,
}

/// Request parameters from `--query` followed by each `--param`.
pub fn collect_params(query: Option<&str>, params: &[String]) -> Result<QueryParams, DomainError> {
    let mut out = query.map(QueryParams::parse).unwrap_or_default();
    for param in params {
        let (key, value) = param
            .split_once('=')
            .ok_or_else(|| DomainError::InvalidInput(format!("Expected KEY=VALUE, got '{param}'")))?;
        out.append(key, value);
    }
    Ok(out)
}

/// Facets from the config file, then one per `--date`, `--values` or
/// `--many` field not already declared there.
pub fn collect_specs(
    config: &AppConfig,
    date_fields: &[String],
    values_fields: &[String],
    many_fields: &[String],
) -> Result<Vec<FacetSpec>, DomainError> {
    let mut specs = config.load_facets()?.facets;
    for field in date_fields {
        if !specs.iter().any(|s| &s.field == field) {
            specs.push(FacetSpec::date(field, config.date_defaults.clone()));
        }
    }
    for field in values_fields {
        if !specs.iter().any(|s| &s.field == field) {
            specs.push(FacetSpec::values(field, ValuesFilterConfig::default()));
        }
    }
    for field in many_fields {
        if !specs.iter().any(|s| &s.field == field) {
            specs.push(FacetSpec::many(field, ManyValuesFilterConfig::default()));
        }
    }
    Ok(specs)
}
