//! Name of the table that records applied migrations.

use crate::newtype_string::define_newtype_string;

/// Accepts `table` or `schema.table`, each part an unquoted SQL identifier.
fn is_plain_identifier_path(s: &str) -> bool {
    let parts: Vec<&str> = s.split('.').collect();
    parts.len() <= 2
        && parts.iter().all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

define_newtype_string! {
    /// Tracking table name, optionally schema-qualified.
    pub struct TableName;
    check = is_plain_identifier_path;
}

impl Default for TableName {
    fn default() -> Self {
        Self("schema_migrations".to_string())
    }
}
