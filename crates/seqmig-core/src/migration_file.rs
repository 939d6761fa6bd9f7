//! Migration file naming: `<digits>_<label>.sql`.

use crate::error::{CoreError, CoreResult};
use crate::migration_id::MigrationId;
use regex::Regex;
use std::sync::OnceLock;

/// `^(\d+)_(.*)\.sql$`, captured as (sequence, label).
fn filename_pattern() -> &'static Regex {
    static FILENAME_PATTERN: OnceLock<Regex> = OnceLock::new();
    FILENAME_PATTERN
        .get_or_init(|| Regex::new(r"^(\d+)_(.*)\.sql$").expect("valid regex literal"))
}

/// A migration file identified by its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MigrationFile {
    /// Leading integer of the filename
    pub sequence: u64,
    /// Everything between the first `_` and `.sql`
    pub label: String,
    /// Bare filename, without directory
    pub filename: String,
}

impl MigrationFile {
    /// Parse a bare filename.
    ///
    /// Returns [`CoreError::InvalidFilenameFormat`] when the name does not
    /// match the pattern or the sequence number does not fit in a `u64`.
    pub fn parse(filename: &str) -> CoreResult<Self> {
        let invalid = || CoreError::InvalidFilenameFormat {
            filename: filename.to_string(),
        };

        let captures = filename_pattern().captures(filename).ok_or_else(invalid)?;
        let sequence = captures[1].parse::<u64>().map_err(|_| invalid())?;

        Ok(Self {
            sequence,
            label: captures[2].to_string(),
            filename: filename.to_string(),
        })
    }

    /// Identifier this file is recorded under once applied.
    pub fn id(&self) -> MigrationId {
        // The pattern guarantees a non-empty name.
        MigrationId::from_parsed(self.filename.clone())
    }
}

/// All migration files discovered in a directory, sorted by sequence number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationSet {
    files: Vec<MigrationFile>,
}

impl MigrationSet {
    /// Build a set, sorting by sequence number (ties broken by filename).
    pub fn new(mut files: Vec<MigrationFile>) -> Self {
        files.sort_by(|a, b| {
            a.sequence
                .cmp(&b.sequence)
                .then_with(|| a.filename.cmp(&b.filename))
        });
        Self { files }
    }

    /// Files in ascending sequence order.
    pub fn files(&self) -> &[MigrationFile] {
        &self.files
    }

    /// Sequence numbers in ascending order.
    pub fn sequence_numbers(&self) -> Vec<u64> {
        self.files.iter().map(|f| f.sequence).collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
