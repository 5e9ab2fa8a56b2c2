//! Warehouse adapter trait for inspecting tables and running DDL

use std::fmt;

/// Identifies a table in a warehouse
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableIdentifier {
    /// Project name
    pub project: String,

    /// Dataset name
    pub dataset: String,

    /// Table name
    pub table: String,
}

impl TableIdentifier {
    /// Create a new table identifier
    pub fn new(project: impl Into<String>, dataset: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            dataset: dataset.into(),
            table: table.into(),
        }
    }

    /// Get fully qualified name
    pub fn fqn(&self) -> String {
        format!("{}.{}.{}", self.project, self.dataset, self.table)
    }

    /// `dataset.table`, the form used in log lines and rewritten DDL
    pub fn dataset_qualified(&self) -> String {
        format!("{}.{}", self.dataset, self.table)
    }
}

impl fmt::Display for TableIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fqn())
    }
}

/// Errors reported by a warehouse adapter
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WarehouseError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Query failed: {0}")]
    QueryError(String),

    #[error("Query timed out: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl WarehouseError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, WarehouseError::TableNotFound(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, WarehouseError::Timeout(_))
    }
}

/// Trait for warehouse adapters that can look up tables and run DDL jobs
#[async_trait::async_trait]
pub trait WarehouseAdapter: Send + Sync {
    /// Get the adapter name (e.g., "BigQuery")
    fn name(&self) -> &'static str;

    /// Look up table metadata
    ///
    /// Must return [`WarehouseError::TableNotFound`] when the table does not
    /// exist, and a different variant for every other failure.
    async fn get_table(&self, table: &TableIdentifier) -> Result<(), WarehouseError>;

    /// Submit a standard-SQL statement as a job and wait for it to finish
    async fn execute_query(&self, query: &str) -> Result<(), WarehouseError>;

    /// Whether the table exists
    ///
    /// Not-found becomes `Ok(false)`; any other failure is returned as is so
    /// it cannot be mistaken for a missing table.
    async fn table_exists(&self, table: &TableIdentifier) -> Result<bool, WarehouseError> {
        match self.get_table(table).await {
            Ok(()) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => {
                tracing::error!("Unexpected error occurred while checking table existence: {}", e);
                Err(e)
            }
        }
    }
}
