//! Mock warehouse adapter for testing
//!
//! This adapter keeps a set of existing tables in memory and records every
//! lookup and submitted query, without connecting to any warehouse.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bqddl_catalog::{MockAdapter, WarehouseAdapter, TableIdentifier};
//!
//! let adapter = MockAdapterBuilder::new()
//!     .with_table("project", "analytics", "customers")
//!     .build();
//!
//! let table = TableIdentifier::new("project", "analytics", "customers");
//! assert!(adapter.table_exists(&table).await?);
//! ```
//!
//! ## Simulating Failures
//!
//! ```rust,ignore
//! // Lookup fails with something other than not-found
//! adapter.add_lookup_error(table, WarehouseError::PermissionDenied("no".into())).await;
//!
//! // Any query mentioning `orders` fails
//! adapter.add_query_error("orders", WarehouseError::Timeout("job".into())).await;
//! ```

use crate::adapter::{TableIdentifier, WarehouseAdapter, WarehouseError};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Mock warehouse adapter for testing
///
/// Clones share state, so a test can hand one clone to the code under test
/// and inspect the recorded calls through another.
pub struct MockAdapter {
    /// Existing tables by FQN
    tables: Arc<RwLock<HashSet<String>>>,

    /// Errors returned by `get_table` for specific tables
    lookup_errors: Arc<RwLock<HashMap<String, WarehouseError>>>,

    /// Errors returned by `execute_query` when the query contains the key
    query_errors: Arc<RwLock<Vec<(String, WarehouseError)>>>,

    /// Every table looked up, in order
    lookups: Arc<RwLock<Vec<TableIdentifier>>>,

    /// Every query submitted, in order
    queries: Arc<RwLock<Vec<String>>>,

    /// Simulate query latency (milliseconds)
    latency_ms: u64,
}

impl MockAdapter {
    /// Create a new mock adapter with no existing tables
    pub fn new() -> Self {
        MockAdapterBuilder::new().build()
    }

    /// Mark a table as existing
    pub async fn add_table(&self, table: TableIdentifier) {
        self.tables.write().await.insert(table.fqn());
    }

    /// Configure an error for looking up a specific table
    pub async fn add_lookup_error(&self, table: TableIdentifier, error: WarehouseError) {
        self.lookup_errors.write().await.insert(table.fqn(), error);
    }

    /// Fail every query containing `pattern`
    pub async fn add_query_error(&self, pattern: impl Into<String>, error: WarehouseError) {
        self.query_errors.write().await.push((pattern.into(), error));
    }

    /// Configure simulated latency for all operations
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Tables looked up so far
    pub async fn lookups(&self) -> Vec<TableIdentifier> {
        self.lookups.read().await.clone()
    }

    /// Queries submitted so far
    pub async fn executed_queries(&self) -> Vec<String> {
        self.queries.read().await.clone()
    }

    /// Check if a table currently exists
    pub async fn has_table(&self, table: &TableIdentifier) -> bool {
        self.tables.read().await.contains(&table.fqn())
    }

    async fn simulate_latency(&self) {
        if self.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.latency_ms)).await;
        }
    }
}

impl Default for MockAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockAdapter {
    fn clone(&self) -> Self {
        Self {
            tables: Arc::clone(&self.tables),
            lookup_errors: Arc::clone(&self.lookup_errors),
            query_errors: Arc::clone(&self.query_errors),
            lookups: Arc::clone(&self.lookups),
            queries: Arc::clone(&self.queries),
            latency_ms: self.latency_ms,
        }
    }
}

#[async_trait::async_trait]
impl WarehouseAdapter for MockAdapter {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn get_table(&self, table: &TableIdentifier) -> Result<(), WarehouseError> {
        self.simulate_latency().await;
        self.lookups.write().await.push(table.clone());

        if let Some(error) = self.lookup_errors.read().await.get(&table.fqn()) {
            return Err(error.clone());
        }

        if self.tables.read().await.contains(&table.fqn()) {
            Ok(())
        } else {
            Err(WarehouseError::TableNotFound(table.fqn()))
        }
    }

    async fn execute_query(&self, query: &str) -> Result<(), WarehouseError> {
        self.simulate_latency().await;
        self.queries.write().await.push(query.to_string());

        let errors = self.query_errors.read().await;
        match errors.iter().find(|(pattern, _)| query.contains(pattern.as_str())) {
            Some((_, error)) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

/// Builder for creating a MockAdapter with existing tables
pub struct MockAdapterBuilder {
    tables: HashSet<String>,
    lookup_errors: HashMap<String, WarehouseError>,
    latency_ms: u64,
}

impl MockAdapterBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            tables: HashSet::new(),
            lookup_errors: HashMap::new(),
            latency_ms: 0,
        }
    }

    /// Mark a table as existing
    pub fn with_table(mut self, project: &str, dataset: &str, table: &str) -> Self {
        self.tables.insert(TableIdentifier::new(project, dataset, table).fqn());
        self
    }

    /// Add a lookup error for a specific table
    pub fn with_lookup_error(mut self, project: &str, dataset: &str, table: &str, error: WarehouseError) -> Self {
        self.lookup_errors
            .insert(TableIdentifier::new(project, dataset, table).fqn(), error);
        self
    }

    /// Configure latency
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Build the MockAdapter
    pub fn build(self) -> MockAdapter {
        MockAdapter {
            tables: Arc::new(RwLock::new(self.tables)),
            lookup_errors: Arc::new(RwLock::new(self.lookup_errors)),
            query_errors: Arc::new(RwLock::new(Vec::new())),
            lookups: Arc::new(RwLock::new(Vec::new())),
            queries: Arc::new(RwLock::new(Vec::new())),
            latency_ms: self.latency_ms,
        }
    }
}

impl Default for MockAdapterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_existing_table() {
        let adapter = MockAdapterBuilder::new().with_table("p", "analytics", "orders").build();
        let table = TableIdentifier::new("p", "analytics", "orders");

        assert!(adapter.table_exists(&table).await.unwrap());
        assert_eq!(adapter.lookups().await, vec![table]);
    }

    #[tokio::test]
    async fn test_missing_table_is_not_an_error() {
        let adapter = MockAdapter::new();
        let table = TableIdentifier::new("p", "analytics", "orders");

        assert!(matches!(adapter.get_table(&table).await, Err(WarehouseError::TableNotFound(_))));
        assert!(!adapter.table_exists(&table).await.unwrap());
    }

    #[tokio::test]
    async fn test_lookup_error_propagates() {
        let adapter = MockAdapterBuilder::new()
            .with_lookup_error("p", "analytics", "orders", WarehouseError::PermissionDenied("denied".into()))
            .build();
        let table = TableIdentifier::new("p", "analytics", "orders");

        let err = adapter.table_exists(&table).await.unwrap_err();
        assert_eq!(err, WarehouseError::PermissionDenied("denied".into()));
    }

    #[tokio::test]
    async fn test_query_recording_and_errors() {
        let adapter = MockAdapter::new();
        adapter
            .add_query_error("broken", WarehouseError::QueryError("syntax".into()))
            .await;

        assert!(adapter.execute_query("CREATE TABLE a.ok (id INT64)").await.is_ok());
        assert!(adapter.execute_query("CREATE TABLE a.broken (id INT64)").await.is_err());
        assert_eq!(adapter.executed_queries().await.len(), 2);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let adapter = MockAdapter::new();
        let observer = adapter.clone();
        let table = TableIdentifier::new("p", "analytics", "orders");

        adapter.add_table(table.clone()).await;
        assert!(observer.has_table(&table).await);
    }
}
