//! Identifier under which an applied migration is recorded.

use crate::newtype_string::define_newtype_string;

fn is_non_empty(s: &str) -> bool {
    !s.is_empty()
}

define_newtype_string! {
    /// The recorded identity of a migration: its bare filename (e.g. `0_init.sql`).
    ///
    /// Applied migrations are keyed by filename, not by sequence number, so
    /// renaming a file makes it a new migration.
    pub struct MigrationId;
    check = is_non_empty;
}

impl MigrationId {
    pub(crate) fn from_parsed(filename: String) -> Self {
        debug_assert!(!filename.is_empty());
        Self(filename)
    }
}
