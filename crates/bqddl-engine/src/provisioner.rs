//! Provisioning run: for every DDL file, create its table unless it exists
//!
//! Files are processed one at a time and every warehouse call is awaited
//! before the next one is issued. Per file:
//! 1. The table name comes from the file name.
//! 2. If the table exists the file is skipped.
//! 3. Otherwise the DDL is loaded, rewritten once into the dataset and
//!    submitted. A failed or timed-out job is logged and the run continues.
//!
//! An existence check that fails for any reason other than not-found stops
//! the run.

use crate::error::ProvisionError;
use crate::report::{FileOutcome, ProvisionReport};
use bqddl_catalog::{TableIdentifier, WarehouseAdapter, WarehouseError};
use bqddl_core::{list_ddl_files, load_query, DdlFile, QueryRewriter};
use std::path::Path;

/// Applies DDL files against one dataset
pub struct Provisioner<'a> {
    adapter: &'a dyn WarehouseAdapter,
    project_id: String,
    dataset: String,
    rewriter: QueryRewriter,
}

impl<'a> Provisioner<'a> {
    pub fn new(adapter: &'a dyn WarehouseAdapter, project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            adapter,
            project_id: project_id.into(),
            dataset: dataset.into(),
            rewriter: QueryRewriter::default(),
        }
    }

    pub fn with_rewriter(mut self, rewriter: QueryRewriter) -> Self {
        self.rewriter = rewriter;
        self
    }

    fn table_id(&self, table_name: &str) -> TableIdentifier {
        TableIdentifier::new(&self.project_id, &self.dataset, table_name)
    }

    /// Whether `table_name` already exists in the dataset
    pub async fn table_exists(&self, table_name: &str) -> Result<bool, ProvisionError> {
        let table = self.table_id(table_name);
        self.adapter
            .table_exists(&table)
            .await
            .map_err(|source| ProvisionError::ExistenceCheck { table, source })
    }

    /// Load, rewrite and submit one DDL file
    ///
    /// Never fails: an empty query is a no-op and job errors are logged and
    /// returned as [`FileOutcome::Failed`].
    pub async fn create_table(&self, file: &DdlFile) -> FileOutcome {
        let query = load_query(&file.path);
        if query.is_empty() {
            tracing::debug!("Skipping empty DDL file {}", file);
            return FileOutcome::EmptyQuery;
        }

        let query = self.rewriter.rewrite(&query, &file.table_name, &self.dataset);
        if query.trim().is_empty() {
            tracing::debug!("Skipping DDL file {} with nothing to submit", file);
            return FileOutcome::EmptyQuery;
        }

        tracing::info!("Executing query");
        match self.adapter.execute_query(&query).await {
            Ok(()) => {
                tracing::info!("Query is executed successfully.");
                FileOutcome::Created
            }
            Err(WarehouseError::Timeout(detail)) => {
                tracing::error!("Query timed out: {}", detail);
                FileOutcome::Failed { reason: format!("Query timed out: {}", detail) }
            }
            Err(e) => {
                tracing::error!("Error occurred while executing query: {}", e);
                FileOutcome::Failed { reason: e.to_string() }
            }
        }
    }

    /// Skip or create the table for one file
    pub async fn provision_file(&self, file: &DdlFile) -> Result<FileOutcome, ProvisionError> {
        if self.table_exists(&file.table_name).await? {
            tracing::info!("Table {}.{} already exists.", self.dataset, file.table_name);
            return Ok(FileOutcome::Skipped);
        }

        Ok(self.create_table(file).await)
    }

    /// Process `files` in order
    pub async fn run(&self, files: &[DdlFile]) -> Result<ProvisionReport, ProvisionError> {
        let mut report = ProvisionReport::new(&self.dataset);

        for file in files {
            let outcome = self.provision_file(file).await?;
            report.record(file, outcome);
        }

        tracing::info!("All tables are created.");
        Ok(report)
    }

    /// List the DDL files in `folder` and process them
    pub async fn run_folder(&self, folder: &Path) -> Result<ProvisionReport, ProvisionError> {
        let files = list_ddl_files(folder);
        self.run(&files).await
    }
}
