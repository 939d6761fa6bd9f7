//! SQL identifier quoting for the statements seqmig builds itself
//!
//! Migration bodies are executed verbatim; only the tracking-table DDL and
//! bookkeeping queries are assembled here.

use crate::table_name::TableName;

/// Quote a SQL identifier, doubling embedded double quotes.
///
/// # Examples
/// ```
/// use seqmig_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("version"), r#""version""#);
/// assert_eq!(quote_ident(r#"my"col"#), r#""my""col""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote a possibly schema-qualified table name, one component at a time.
///
/// # Examples
/// ```
/// use seqmig_core::{sql_utils::quote_table, TableName};
/// let table = TableName::try_new("ops.schema_migrations").unwrap();
/// assert_eq!(quote_table(&table), r#""ops"."schema_migrations""#);
/// ```
pub fn quote_table(table: &TableName) -> String {
    table
        .split('.')
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(".")
}

/// Schema part of a qualified table name, if any.
pub fn table_schema(table: &TableName) -> Option<&str> {
    table.rsplit_once('.').map(|(schema, _)| schema)
}
