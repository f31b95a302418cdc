//! Runtime configuration: environment variables for the process, and an
//! optional TOML file declaring which facets to build.

use crate::application::filters::choices::ChoicesFilterConfig;
use crate::application::filters::date_time::{parse_max_depth, DateFilterConfig};
use crate::application::filters::many_values::ManyValuesFilterConfig;
use crate::application::filters::values::ValuesFilterConfig;
use crate::domain::error::DomainError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_DB_PATH: &str = "./facetdrill.db";

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FacetKind {
    Date(DateFilterConfig),
    Values(ValuesFilterConfig),
    Choices(ChoicesFilterConfig),
    /// Array attribute; values are chosen cumulatively.
    Many(ManyValuesFilterConfig),
}

/// One `[[facets]]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct FacetSpec {
    pub field: String,
    /// Heading shown for the facet; defaults to the field name.
    pub label: Option<String>,
    /// Request parameter; defaults to the field name.
    pub query_param: Option<String>,
    #[serde(flatten)]
    pub kind: FacetKind,
}

impl FacetSpec {
    pub fn date(field: &str, config: DateFilterConfig) -> Self {
        Self::with_kind(field, FacetKind::Date(config))
    }

    pub fn values(field: &str, config: ValuesFilterConfig) -> Self {
        Self::with_kind(field, FacetKind::Values(config))
    }

    pub fn choices(field: &str, config: ChoicesFilterConfig) -> Self {
        Self::with_kind(field, FacetKind::Choices(config))
    }

    pub fn many(field: &str, config: ManyValuesFilterConfig) -> Self {
        Self::with_kind(field, FacetKind::Many(config))
    }

    fn with_kind(field: &str, kind: FacetKind) -> Self {
        Self {
            field: field.to_string(),
            label: None,
            query_param: None,
            kind,
        }
    }

    /// `date_published` becomes `Date published`.
    pub fn display_label(&self) -> String {
        if let Some(label) = &self.label {
            return label.clone();
        }
        let spaced = self.field.replace('_', " ");
        let mut chars = spaced.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => spaced,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FacetsConfig {
    #[serde(default)]
    pub facets: Vec<FacetSpec>,
}

impl FacetsConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DomainError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            DomainError::Config(format!(
                "Failed to read {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, DomainError> {
        let config: FacetsConfig = toml::from_str(content)
            .map_err(|e| DomainError::Config(format!("Failed to parse facets: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), DomainError> {
        for spec in &self.facets {
            if spec.field.is_empty() {
                return Err(DomainError::Config("facet field cannot be empty".into()));
            }
            match &spec.kind {
                FacetKind::Date(date) => date.validate()?,
                FacetKind::Choices(choices) => choices.validate()?,
                FacetKind::Values(_) | FacetKind::Many(_) => {}
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

impl LoggingConfig {
    /// Installs the global subscriber, writing to stderr. A subscriber that
    /// is already installed is kept.
    pub fn init(&self) {
        if tracing::dispatcher::has_been_set() {
            return;
        }
        let filter = EnvFilter::try_from_env("FACETDRILL_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new(&self.level));

        let result = match self.format.as_str() {
            "json" => fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init(),
            _ => fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init(),
        };
        if let Err(e) = result {
            eprintln!("Failed to install log subscriber: {e}");
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: String,
    pub facets_path: Option<PathBuf>,
    /// Applied to date facets declared on the command line.
    pub date_defaults: DateFilterConfig,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.into(),
            facets_path: None,
            date_defaults: DateFilterConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(db) = lookup("FACETDRILL_DB") {
            config.db_path = db;
        }
        config.facets_path = lookup("FACETDRILL_CONFIG").map(PathBuf::from);
        if let Some(raw) = lookup("FACETDRILL_MAX_LINKS") {
            config.date_defaults.max_links = raw.trim().parse().map_err(|_| {
                DomainError::Config(format!("FACETDRILL_MAX_LINKS is not a number: {raw}"))
            })?;
        }
        if let Some(raw) = lookup("FACETDRILL_MAX_DEPTH") {
            config.date_defaults.max_depth = parse_max_depth(raw.trim())?;
        }
        if let Some(format) = lookup("FACETDRILL_LOG_FORMAT") {
            config.logging.format = format;
        }
        config.date_defaults.validate()?;
        Ok(config)
    }

    pub fn load_facets(&self) -> Result<FacetsConfig, DomainError> {
        match &self.facets_path {
            Some(path) => FacetsConfig::load(path),
            None => Ok(FacetsConfig::default()),
        }
    }
}
