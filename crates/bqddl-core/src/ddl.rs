//! DDL file discovery and loading
//!
//! Both operations log their own failures and hand back an empty value, so
//! callers always receive something well defined.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Extension (without the dot) that marks a DDL file
pub const SQL_EXTENSION: &str = "sql";

/// A DDL file and the table it defines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdlFile {
    /// Full path to the file
    pub path: PathBuf,

    /// Bare table name derived from the file name
    pub table_name: String,
}

impl DdlFile {
    /// Create a reference for a file path, deriving the table name
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let table_name = path
            .file_name()
            .map(|name| table_name_from_file_name(&name.to_string_lossy()).to_string())
            .unwrap_or_default();

        Self { path, table_name }
    }

    /// File name without its directory
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl fmt::Display for DdlFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Everything before the first `.` of a file name
///
/// `orders.sql` gives `orders`, `orders.v2.sql` gives `orders`.
pub fn table_name_from_file_name(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

/// List the `.sql` files directly inside `folder`, sorted by file name
///
/// Subdirectories are not descended into. Any enumeration failure is logged
/// and yields an empty list.
pub fn list_ddl_files(folder: &Path) -> Vec<DdlFile> {
    match read_sql_entries(folder) {
        Ok(mut files) => {
            files.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
            tracing::debug!("Found {} DDL files in {}", files.len(), folder.display());
            files
        }
        Err(e) => {
            match e.kind() {
                io::ErrorKind::NotFound => {
                    tracing::error!("Folder {} not found.", folder.display())
                }
                io::ErrorKind::PermissionDenied => {
                    tracing::error!("No permission to read folder {}.", folder.display())
                }
                _ => tracing::error!("An error occurred: {}", e),
            }
            Vec::new()
        }
    }
}

fn read_sql_entries(folder: &Path) -> io::Result<Vec<DdlFile>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(folder)? {
        let entry = entry?;
        let path = entry.path();

        if !entry.file_type()?.is_file() && !path.is_file() {
            continue;
        }

        if path.extension().is_some_and(|ext| ext == SQL_EXTENSION) {
            files.push(DdlFile::new(path));
        }
    }

    Ok(files)
}

/// Read the full UTF-8 text of a DDL file
///
/// A file that cannot be read is logged and treated as an empty query.
pub fn load_query(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(query) => query,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::error!("File {} not found.", path.display());
            String::new()
        }
        Err(e) => {
            tracing::error!("Error occurred while reading file {}: {}", path.display(), e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_name_is_text_before_first_dot() {
        assert_eq!(table_name_from_file_name("orders.sql"), "orders");
        assert_eq!(table_name_from_file_name("orders.v2.sql"), "orders");
        assert_eq!(table_name_from_file_name("orders"), "orders");
        assert_eq!(table_name_from_file_name(".hidden.sql"), "");
    }

    #[test]
    fn ddl_file_derives_table_name() {
        let file = DdlFile::new("/tmp/ddl/customers.sql");
        assert_eq!(file.table_name, "customers");
        assert_eq!(file.file_name(), "customers.sql");
        assert_eq!(file.to_string(), "/tmp/ddl/customers.sql");
    }

    #[test]
    fn missing_folder_yields_empty_list() {
        let files = list_ddl_files(Path::new("/definitely/not/a/real/folder"));
        assert!(files.is_empty());
    }

    #[test]
    fn missing_file_loads_as_empty_query() {
        assert_eq!(load_query(Path::new("/definitely/not/a/real/file.sql")), "");
    }
}
