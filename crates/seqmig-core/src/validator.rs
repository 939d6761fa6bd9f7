//! Pre-flight validation of a migration directory.
//!
//! Runs before any database contact. Every file under the directory
//! (subdirectories included) must be named `<digits>_<label>.sql`, and the
//! sorted sequence numbers must be exactly `0, 1, ..., N-1`.

use crate::error::{CoreError, CoreResult};
use crate::migration_file::{MigrationFile, MigrationSet};
use std::path::Path;

/// Validate every file under `dir` and return the parsed set.
///
/// The first badly named file aborts validation; no partial set is returned.
pub fn validate_migration_dir(dir: &Path) -> CoreResult<MigrationSet> {
    let mut files = Vec::new();
    collect_recursive(dir, &mut files)?;

    if files.is_empty() {
        return Err(CoreError::NoMigrationsFound {
            path: dir.display().to_string(),
        });
    }

    let set = MigrationSet::new(files);
    check_sequence(&set.sequence_numbers())?;
    log::debug!(
        "Validated {} migration files in {}",
        set.len(),
        dir.display()
    );
    Ok(set)
}

/// Check that `numbers`, once sorted, are exactly `0..N-1`.
///
/// Reports the first index whose number differs from the index, so a gap
/// at `k` reads "expected k but got k+1" and a duplicate of `k` reads
/// "expected k+1 but got k".
pub fn check_sequence(numbers: &[u64]) -> CoreResult<()> {
    let mut sorted = numbers.to_vec();
    sorted.sort_unstable();

    for (expected, &actual) in (0u64..).zip(sorted.iter()) {
        if actual != expected {
            return Err(CoreError::SequenceBroken { expected, actual });
        }
    }
    Ok(())
}

fn collect_recursive(dir: &Path, files: &mut Vec<MigrationFile>) -> CoreResult<()> {
    let entries = std::fs::read_dir(dir).map_err(|source| CoreError::DirectoryUnreadable {
        path: dir.display().to_string(),
        source,
    })?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();

        // Symlinks are not followed; a linked directory is checked by its name.
        if entry.file_type()?.is_dir() {
            collect_recursive(&path, files)?;
            continue;
        }

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        files.push(MigrationFile::parse(&filename)?);
    }

    Ok(())
}

#[cfg(test)]
#[path = "validator_test.rs"]
mod tests;
