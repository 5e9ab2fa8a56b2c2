//! Qualifying bare table names with their dataset
//!
//! The default rewrite is a literal substring replacement of every occurrence
//! of the table name. It does not understand SQL: a column, comment or string
//! literal containing the table name is rewritten too, and applying it twice
//! qualifies twice (`analytics.analytics.orders`). Callers rewrite each loaded
//! query exactly once.
//!
//! [`RewriteMode::Parser`] is an opt-in alternative that parses the DDL with
//! the BigQuery dialect and only qualifies the name of the created object.

use sqlparser::ast::{Ident, ObjectName, Statement};
use sqlparser::dialect::BigQueryDialect;
use sqlparser::parser::Parser;
use std::fmt;
use std::str::FromStr;

/// How table names are qualified
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RewriteMode {
    /// Replace every literal occurrence of the table name
    #[default]
    Substring,

    /// Qualify only the name of `CREATE TABLE` / `CREATE VIEW` statements
    Parser,
}

impl FromStr for RewriteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "substring" => Ok(Self::Substring),
            "parser" => Ok(Self::Parser),
            other => Err(format!("unknown rewrite mode '{}' (expected 'substring' or 'parser')", other)),
        }
    }
}

impl fmt::Display for RewriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Substring => write!(f, "substring"),
            Self::Parser => write!(f, "parser"),
        }
    }
}

/// Replace every occurrence of `table_name` in `query` with `dataset.table_name`
pub fn qualify_table_name(query: &str, table_name: &str, dataset: &str) -> String {
    if table_name.is_empty() || !query.contains(table_name) {
        return query.to_string();
    }

    query.replace(table_name, &format!("{}.{}", dataset, table_name))
}

/// Applies the configured [`RewriteMode`]
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryRewriter {
    mode: RewriteMode,
}

impl QueryRewriter {
    pub fn new(mode: RewriteMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> RewriteMode {
        self.mode
    }

    /// Qualify `table_name` inside `query` with `dataset`
    pub fn rewrite(&self, query: &str, table_name: &str, dataset: &str) -> String {
        match self.mode {
            RewriteMode::Substring => qualify_table_name(query, table_name, dataset),
            RewriteMode::Parser => match qualify_created_object(query, table_name, dataset) {
                Ok(rewritten) => rewritten,
                Err(e) => {
                    tracing::warn!(
                        "Could not parse DDL for table {}, falling back to substring rewrite: {}",
                        table_name,
                        e
                    );
                    qualify_table_name(query, table_name, dataset)
                }
            },
        }
    }
}

/// Parse `query` and prefix `dataset` onto created objects named `table_name`
fn qualify_created_object(
    query: &str,
    table_name: &str,
    dataset: &str,
) -> Result<String, sqlparser::parser::ParserError> {
    let mut statements = Parser::parse_sql(&BigQueryDialect {}, query)?;

    // Comment-only DDL has nothing to qualify
    if statements.is_empty() {
        return Ok(query.to_string());
    }

    for statement in &mut statements {
        match statement {
            Statement::CreateTable(create) => qualify_object_name(&mut create.name, table_name, dataset),
            Statement::CreateView { name, .. } => qualify_object_name(name, table_name, dataset),
            _ => {}
        }
    }

    let rendered: Vec<String> = statements.iter().map(|s| s.to_string()).collect();
    Ok(rendered.join(";\n"))
}

fn qualify_object_name(name: &mut ObjectName, table_name: &str, dataset: &str) {
    let qualifier = match name.0.as_slice() {
        [ident] if ident.value == table_name => match ident.quote_style {
            Some(quote) => Ident::with_quote(quote, dataset),
            None => Ident::new(dataset),
        },
        _ => return,
    };

    name.0.insert(0, qualifier);
}
