//! Backend read API
//!
//! The site's records live in a hosted spreadsheet-style backend with four
//! tables. Everything outside this module talks to it through the [`Backend`]
//! trait so the data layer can be exercised against in-memory records.

pub mod client;

pub use client::AirtableClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Backend client errors
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Backend rejected credentials ({0})")]
    Unauthorized(u16),

    #[error("Backend rate limit exceeded")]
    RateLimitExceeded,

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Backend tables read by the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Artists,
    Reviews,
    Services,
    QuickFacts,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Artists => "Artists",
            Table::Reviews => "Reviews",
            Table::Services => "Services",
            Table::QuickFacts => "Quick Facts",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Untyped record as returned by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl RawRecord {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Sort direction for a list query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    pub field: &'static str,
    pub direction: SortDirection,
}

/// Record filters the site needs
///
/// Kept structured (rather than raw formula strings) so alternative backends
/// can evaluate them without parsing formulas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `{Featured} = 1`
    FeaturedOnly,
    /// Records whose id is in the list
    RecordIds(Vec<String>),
}

impl Filter {
    /// Render as a backend formula
    pub fn to_formula(&self) -> String {
        match self {
            Filter::FeaturedOnly => "{Featured} = 1".to_string(),
            Filter::RecordIds(ids) => {
                let clauses: Vec<String> = ids
                    .iter()
                    .map(|id| format!("RECORD_ID() = {}", quote_formula_string(id)))
                    .collect();
                match clauses.len() {
                    1 => clauses.into_iter().next().unwrap_or_default(),
                    _ => format!("OR({})", clauses.join(", ")),
                }
            }
        }
    }
}

/// Quote a string literal for use in a formula
///
/// Backslashes and single quotes are escaped so a crafted id cannot close
/// the literal and inject formula syntax.
pub fn quote_formula_string(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}

/// List query against one table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectQuery {
    /// Fields to return (empty = all fields)
    pub fields: Vec<&'static str>,
    pub sort: Vec<SortField>,
    pub filter: Option<Filter>,
    pub max_records: Option<usize>,
}

impl SelectQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn fields(mut self, fields: &[&'static str]) -> Self {
        self.fields = fields.to_vec();
        self
    }

    pub fn sort_by(mut self, field: &'static str, direction: SortDirection) -> Self {
        self.sort.push(SortField { field, direction });
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn max_records(mut self, max: usize) -> Self {
        self.max_records = Some(max);
        self
    }
}

/// Read access to the backend
///
/// Implementations return every matching record (following pagination).
#[async_trait]
pub trait Backend: Send + Sync {
    async fn select(&self, table: Table, query: &SelectQuery) -> Result<Vec<RawRecord>, BackendError>;
}

/// Backend used when credentials are missing
///
/// Every query fails with [`BackendError::NotConfigured`], which the data
/// layer turns into empty results.
#[derive(Debug, Clone)]
pub struct UnconfiguredBackend {
    reason: String,
}

impl UnconfiguredBackend {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Backend for UnconfiguredBackend {
    async fn select(&self, _table: Table, _query: &SelectQuery) -> Result<Vec<RawRecord>, BackendError> {
        Err(BackendError::NotConfigured(self.reason.clone()))
    }
}
