use bqddl_catalog::{TableIdentifier, WarehouseError};

/// Failures that stop a provisioning run
///
/// Creation failures are not here: they are recorded per file and the run
/// carries on.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("Error checking if table {table} exists: {source}")]
    ExistenceCheck {
        table: TableIdentifier,
        #[source]
        source: WarehouseError,
    },
}
