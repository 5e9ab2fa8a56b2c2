//! BigQuery warehouse adapter
//!
//! Table existence is checked with `tables.get`; DDL is submitted through
//! `jobs.query` with standard SQL (`use_legacy_sql = false`) in the configured
//! location. If the job is still running when `jobs.query` returns, its status
//! is polled until it finishes or the query timeout elapses.
//!
//! Required IAM permissions:
//! - bigquery.tables.get
//! - bigquery.tables.create
//! - bigquery.jobs.create
//!
//! ## Authentication
//!
//! 1. Service account JSON file (explicit path)
//! 2. Application Default Credentials (ADC)
//!
//! ## Usage
//!
//! ```rust,ignore
//! let adapter = BigQueryAdapter::with_adc("my-project", "asia-northeast1").await?;
//! let table = TableIdentifier::new("my-project", "analytics", "orders");
//! if !adapter.table_exists(&table).await? {
//!     adapter.execute_query("CREATE TABLE analytics.orders (id INT64)").await?;
//! }
//! ```

use crate::adapter::{TableIdentifier, WarehouseAdapter, WarehouseError};
use std::time::Duration;

#[cfg(feature = "bigquery")]
use gcp_bigquery_client::{error::BQError, model::query_request::QueryRequest, Client as BigQueryClient};

/// How long a DDL job may run before it is reported as timed out
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(600);

#[cfg(feature = "bigquery")]
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// BigQuery warehouse adapter
pub struct BigQueryAdapter {
    /// Project ID jobs are billed to
    project_id: String,

    /// Location jobs run in
    region: String,

    /// Upper bound on waiting for a single job
    query_timeout: Duration,

    /// BigQuery client (only available with bigquery feature)
    #[cfg(feature = "bigquery")]
    client: BigQueryClient,
}

impl BigQueryAdapter {
    /// Create a new BigQuery adapter using Application Default Credentials (ADC)
    ///
    /// ADC automatically detects credentials from:
    /// - GOOGLE_APPLICATION_CREDENTIALS environment variable
    /// - gcloud CLI default credentials
    /// - GCE/GKE metadata service
    #[cfg(feature = "bigquery")]
    pub async fn with_adc(project_id: impl Into<String>, region: impl Into<String>) -> Result<Self, WarehouseError> {
        let client = BigQueryClient::from_application_default_credentials()
            .await
            .map_err(|e| WarehouseError::AuthenticationError(format!(
                "Failed to authenticate with ADC: {}. \
                 Ensure GOOGLE_APPLICATION_CREDENTIALS is set or run 'gcloud auth application-default login'",
                e
            )))?;

        Ok(Self {
            project_id: project_id.into(),
            region: region.into(),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            client,
        })
    }

    /// Create adapter without bigquery feature (returns error)
    #[cfg(not(feature = "bigquery"))]
    pub async fn with_adc(project_id: impl Into<String>, region: impl Into<String>) -> Result<Self, WarehouseError> {
        let _ = (project_id.into(), region.into());
        Err(not_compiled())
    }

    /// Create a new BigQuery adapter using a service account key file
    #[cfg(feature = "bigquery")]
    pub async fn from_service_account_file(
        project_id: impl Into<String>,
        region: impl Into<String>,
        key_path: impl AsRef<std::path::Path>,
    ) -> Result<Self, WarehouseError> {
        let key_path_str = key_path.as_ref().to_string_lossy().to_string();

        let client = BigQueryClient::from_service_account_key_file(&key_path_str)
            .await
            .map_err(|e| WarehouseError::AuthenticationError(format!(
                "Failed to read service account key file '{}': {}",
                key_path_str, e
            )))?;

        Ok(Self {
            project_id: project_id.into(),
            region: region.into(),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            client,
        })
    }

    /// Create adapter without bigquery feature (returns error)
    #[cfg(not(feature = "bigquery"))]
    pub async fn from_service_account_file(
        project_id: impl Into<String>,
        region: impl Into<String>,
        _key_path: impl AsRef<std::path::Path>,
    ) -> Result<Self, WarehouseError> {
        let _ = (project_id.into(), region.into());
        Err(not_compiled())
    }

    /// Override how long a DDL job may run
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Map an API response onto a [`WarehouseError`]
    ///
    /// A 404 status is always not-found. Any other status, or none at all, is
    /// classified from the message text.
    pub fn classify_response(context: &str, status_code: Option<i64>, message: &str) -> WarehouseError {
        match status_code {
            Some(404) => WarehouseError::TableNotFound(context.to_string()),
            _ => Self::classify_error(context, message),
        }
    }

    #[cfg(feature = "bigquery")]
    fn classify_client_error(context: &str, error: &BQError) -> WarehouseError {
        match error {
            BQError::ResponseError { error: response } => {
                Self::classify_response(context, Some(response.error.code), &error.to_string())
            }
            other => Self::classify_response(context, None, &other.to_string()),
        }
    }

    /// Map a BigQuery client error message onto a [`WarehouseError`]
    ///
    /// Transport failures carry no status code, so the condition is recovered
    /// from the message text the same way for lookups and jobs.
    pub fn classify_error(context: &str, message: &str) -> WarehouseError {
        if message.contains("Not found") || message.contains("NOT_FOUND") || message.contains("notFound") {
            WarehouseError::TableNotFound(context.to_string())
        } else if message.contains("Access Denied")
            || message.contains("PERMISSION_DENIED")
            || message.contains("Permission")
        {
            WarehouseError::PermissionDenied(format!("Cannot access {}: {}", context, message))
        } else {
            WarehouseError::QueryError(message.to_string())
        }
    }

    /// Poll a running job until it reports DONE
    #[cfg(feature = "bigquery")]
    async fn wait_for_job(&self, job_id: &str, location: Option<&str>) -> Result<(), WarehouseError> {
        let deadline = tokio::time::Instant::now() + self.query_timeout;

        loop {
            let job = self
                .client
                .job()
                .get_job(&self.project_id, job_id, location)
                .await
                .map_err(|e| WarehouseError::QueryError(e.to_string()))?;

            if let Some(status) = job.status {
                if status.state.as_deref() == Some("DONE") {
                    return match status.error_result {
                        Some(error) => Err(WarehouseError::QueryError(
                            error.message.unwrap_or_else(|| format!("job {} failed", job_id)),
                        )),
                        None => Ok(()),
                    };
                }
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(WarehouseError::Timeout(format!(
                    "job {} did not finish within {}s",
                    job_id,
                    self.query_timeout.as_secs()
                )));
            }

            tracing::debug!("Job {} still running", job_id);
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

#[cfg(not(feature = "bigquery"))]
fn not_compiled() -> WarehouseError {
    WarehouseError::ConfigError(
        "BigQuery support not compiled. Rebuild with: cargo build --features bigquery".to_string(),
    )
}

#[async_trait::async_trait]
impl WarehouseAdapter for BigQueryAdapter {
    fn name(&self) -> &'static str {
        "BigQuery"
    }

    #[cfg(feature = "bigquery")]
    async fn get_table(&self, table: &TableIdentifier) -> Result<(), WarehouseError> {
        self.client
            .table()
            .get(&table.project, &table.dataset, &table.table, None)
            .await
            .map(|_| ())
            .map_err(|e| Self::classify_client_error(&table.fqn(), &e))
    }

    #[cfg(not(feature = "bigquery"))]
    async fn get_table(&self, _table: &TableIdentifier) -> Result<(), WarehouseError> {
        Err(not_compiled())
    }

    #[cfg(feature = "bigquery")]
    async fn execute_query(&self, query: &str) -> Result<(), WarehouseError> {
        let mut request = QueryRequest::new(query.to_string());
        request.use_legacy_sql = false;
        request.location = Some(self.region.clone());

        let response = self
            .client
            .job()
            .query(&self.project_id, request)
            .await
            .map_err(|e| WarehouseError::QueryError(e.to_string()))?;

        if response.job_complete.unwrap_or(true) {
            return Ok(());
        }

        let job_ref = response
            .job_reference
            .ok_or_else(|| WarehouseError::QueryError("incomplete job returned no job reference".to_string()))?;
        let job_id = job_ref
            .job_id
            .ok_or_else(|| WarehouseError::QueryError("incomplete job returned no job id".to_string()))?;

        self.wait_for_job(&job_id, job_ref.location.as_deref()).await
    }

    #[cfg(not(feature = "bigquery"))]
    async fn execute_query(&self, _query: &str) -> Result<(), WarehouseError> {
        Err(not_compiled())
    }
}
