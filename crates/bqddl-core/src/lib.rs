//! bqddl Core
//!
//! Domain model for provisioning warehouse tables from a folder of DDL files:
//! the run configuration, DDL file discovery and loading, and the rewrite
//! that qualifies table names with their dataset.

pub mod config;
pub mod ddl;
pub mod rewrite;

pub use config::{Config, ConfigError};
pub use ddl::{list_ddl_files, load_query, table_name_from_file_name, DdlFile, SQL_EXTENSION};
pub use rewrite::{qualify_table_name, QueryRewriter, RewriteMode};
