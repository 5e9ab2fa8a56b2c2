//! Run configuration read from the process environment
//!
//! All four settings are required and have no defaults. Every variable is
//! checked (and logged) before the result is decided, so a single run reports
//! every missing name at once.

use std::path::PathBuf;

/// Environment variable holding the GCP project id
pub const GCP_PROJECT_ID: &str = "GCP_PROJECT_ID";

/// Environment variable holding the GCP region jobs run in
pub const GCP_REGION: &str = "GCP_REGION";

/// Environment variable holding the target BigQuery dataset
pub const BQ_DATASET_NAME: &str = "BQ_DATASET_NAME";

/// Environment variable holding the folder of `.sql` files
pub const DDL_FOLDER_PATH: &str = "DDL_FOLDER_PATH";

/// Required variables, in the order they are checked
pub const REQUIRED_VARS: [&str; 4] = [GCP_PROJECT_ID, GCP_REGION, BQ_DATASET_NAME, DDL_FOLDER_PATH];

/// Immutable run configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Project the warehouse client is bound to
    pub project_id: String,

    /// Region (job location)
    pub region: String,

    /// Dataset new tables are created in
    pub dataset: String,

    /// Folder scanned for DDL files
    pub ddl_folder: PathBuf,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// A variable that is absent or empty counts as missing. One info line is
    /// logged per present variable and one warning per missing one.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();

        let [project_id, region, dataset, ddl_folder] = REQUIRED_VARS.map(|name| {
            let value = lookup(name).filter(|value| !value.is_empty());
            match &value {
                Some(value) => tracing::info!("{}: {}", name, value),
                None => {
                    tracing::warn!("Environment variable {} is not set.", name);
                    missing.push(name);
                }
            }
            value
        });

        match (project_id, region, dataset, ddl_folder) {
            (Some(project_id), Some(region), Some(dataset), Some(ddl_folder)) => Ok(Self {
                project_id,
                region,
                dataset,
                ddl_folder: PathBuf::from(ddl_folder),
            }),
            _ => Err(ConfigError::MissingVariables(missing)),
        }
    }
}

/// Config error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingVariables(Vec<&'static str>),
}

impl ConfigError {
    /// Names of the variables that were not set
    pub fn missing(&self) -> &[&'static str] {
        match self {
            ConfigError::MissingVariables(names) => names,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, String> {
        HashMap::from([
            (GCP_PROJECT_ID, "my-project".to_string()),
            (GCP_REGION, "asia-northeast1".to_string()),
            (BQ_DATASET_NAME, "analytics".to_string()),
            (DDL_FOLDER_PATH, "./ddl".to_string()),
        ])
    }

    #[test]
    fn loads_all_four_settings() {
        let env = full_env();
        let config = Config::from_lookup(|name| env.get(name).cloned()).unwrap();

        assert_eq!(config.project_id, "my-project");
        assert_eq!(config.region, "asia-northeast1");
        assert_eq!(config.dataset, "analytics");
        assert_eq!(config.ddl_folder, PathBuf::from("./ddl"));
    }

    #[test]
    fn each_missing_variable_fails() {
        for name in REQUIRED_VARS {
            let mut env = full_env();
            env.remove(name);

            let err = Config::from_lookup(|n| env.get(n).cloned()).unwrap_err();
            assert_eq!(err.missing(), &[name]);
        }
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let mut env = full_env();
        env.insert(BQ_DATASET_NAME, String::new());

        let err = Config::from_lookup(|n| env.get(n).cloned()).unwrap_err();
        assert_eq!(err, ConfigError::MissingVariables(vec![BQ_DATASET_NAME]));
    }

    #[test]
    fn reports_every_missing_variable() {
        let err = Config::from_lookup(|_| None).unwrap_err();
        assert_eq!(err.missing(), &REQUIRED_VARS);
        assert_eq!(
            err.to_string(),
            "missing required environment variables: GCP_PROJECT_ID, GCP_REGION, BQ_DATASET_NAME, DDL_FOLDER_PATH"
        );
    }
}
