//! Integration tests for warehouse adapters
//!
//! Tests requiring actual warehouse credentials are marked with `#[ignore]`
//! and can be run with `cargo test -- --ignored`.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all non-ignored tests (no credentials required)
//! cargo test -p bqddl-catalog --test integration_tests
//!
//! # Run BigQuery integration tests
//! GOOGLE_APPLICATION_CREDENTIALS=/path/to/key.json \
//! BQDDL_BIGQUERY_PROJECT=my-project \
//! BQDDL_BIGQUERY_REGION=US \
//! BQDDL_BIGQUERY_DATASET=my_dataset \
//! BQDDL_BIGQUERY_TABLE=my_table \
//! cargo test -p bqddl-catalog --features bigquery --test integration_tests -- --ignored
//! ```

use bqddl_catalog::{MockAdapter, MockAdapterBuilder, TableIdentifier, WarehouseAdapter, WarehouseError};

// =============================================================================
// Mock Adapter Tests (No credentials required)
// =============================================================================

#[tokio::test]
async fn test_mock_adapter_create_then_exists() {
    let adapter = MockAdapter::new();
    let table = TableIdentifier::new("project", "analytics", "orders");

    assert!(!adapter.table_exists(&table).await.unwrap());

    adapter
        .execute_query("CREATE TABLE analytics.orders (id INT64)")
        .await
        .unwrap();
    adapter.add_table(table.clone()).await;

    assert!(adapter.table_exists(&table).await.unwrap());
    assert_eq!(
        adapter.executed_queries().await,
        vec!["CREATE TABLE analytics.orders (id INT64)".to_string()]
    );
}

#[tokio::test]
async fn test_mock_adapter_distinguishes_not_found_from_failure() {
    let adapter = MockAdapterBuilder::new()
        .with_lookup_error(
            "project",
            "analytics",
            "restricted",
            WarehouseError::PermissionDenied("Access denied".to_string()),
        )
        .build();

    let missing = TableIdentifier::new("project", "analytics", "missing");
    let restricted = TableIdentifier::new("project", "analytics", "restricted");

    assert_eq!(adapter.table_exists(&missing).await, Ok(false));
    assert!(matches!(
        adapter.table_exists(&restricted).await,
        Err(WarehouseError::PermissionDenied(_))
    ));
}

#[tokio::test]
async fn test_mock_adapter_timeout_simulation() {
    let adapter = MockAdapter::new();
    adapter
        .add_query_error("slow_table", WarehouseError::Timeout("job_123".to_string()))
        .await;

    let err = adapter
        .execute_query("CREATE TABLE analytics.slow_table (id INT64)")
        .await
        .unwrap_err();

    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_mock_adapter_latency() {
    let adapter = MockAdapterBuilder::new().with_latency(20).build();
    let table = TableIdentifier::new("project", "analytics", "orders");

    let started = std::time::Instant::now();
    let _ = adapter.table_exists(&table).await;

    assert!(started.elapsed() >= std::time::Duration::from_millis(20));
}

#[test]
fn test_adapter_trait_object() {
    let adapter: Box<dyn WarehouseAdapter> = Box::new(MockAdapter::new());
    assert_eq!(adapter.name(), "Mock");
}

// =============================================================================
// BigQuery Tests (require credentials)
// =============================================================================

#[cfg(feature = "bigquery")]
mod bigquery {
    use super::*;
    use bqddl_catalog::BigQueryAdapter;

    fn env(name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }

    #[tokio::test]
    #[ignore]
    async fn test_bigquery_table_lookup() {
        let (Some(project), Some(dataset), Some(table)) = (
            env("BQDDL_BIGQUERY_PROJECT"),
            env("BQDDL_BIGQUERY_DATASET"),
            env("BQDDL_BIGQUERY_TABLE"),
        ) else {
            eprintln!("Skipping: BQDDL_BIGQUERY_* not set");
            return;
        };
        let region = env("BQDDL_BIGQUERY_REGION").unwrap_or_else(|| "US".to_string());

        let adapter = BigQueryAdapter::with_adc(&project, region).await.unwrap();

        let existing = TableIdentifier::new(&project, &dataset, &table);
        assert!(adapter.table_exists(&existing).await.unwrap());

        let missing = TableIdentifier::new(&project, &dataset, "bqddl_definitely_missing_table");
        assert!(!adapter.table_exists(&missing).await.unwrap());
    }
}
