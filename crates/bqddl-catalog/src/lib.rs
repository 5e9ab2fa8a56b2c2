//! Warehouse catalog adapters for table provisioning
//!
//! This module provides adapters that can tell whether a table exists and
//! run a DDL statement as a warehouse job.
//!
//! ## Features
//!
//! Enable warehouse support via Cargo features:
//! - `bigquery` - Google BigQuery support
//!
//! ## Example
//!
//! ```rust,ignore
//! use bqddl_catalog::{BigQueryAdapter, WarehouseAdapter, TableIdentifier};
//!
//! let adapter = BigQueryAdapter::with_adc("my-project", "US").await?;
//! let table = TableIdentifier::new("my-project", "my_dataset", "my_table");
//! let exists = adapter.table_exists(&table).await?;
//! ```

pub mod adapter;
pub mod bigquery;
pub mod mock;

pub use adapter::{TableIdentifier, WarehouseAdapter, WarehouseError};
pub use bigquery::{BigQueryAdapter, DEFAULT_QUERY_TIMEOUT};
pub use mock::{MockAdapter, MockAdapterBuilder};
