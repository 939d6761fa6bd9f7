//! Helpers shared by several commands

use seqmig_core::{ApplyOrder, MigrateConfig};
use seqmig_runner::{first_order_mismatch, list_candidates};

/// Warn on stderr when filename order would apply a higher sequence number
/// before a lower one.
///
/// Listing errors are ignored here; the command itself reports them.
pub(crate) fn warn_order_mismatch(config: &MigrateConfig) {
    if config.order != ApplyOrder::Lexicographic {
        return;
    }
    let Ok(candidates) = list_candidates(&config.migration_dir, config.order) else {
        return;
    };
    if let Some((earlier, later)) = first_order_mismatch(&candidates) {
        eprintln!(
            "Warning: {} sorts before {} and will be applied first. \
             Use --order sequence to apply by sequence number.",
            earlier, later
        );
    }
}
