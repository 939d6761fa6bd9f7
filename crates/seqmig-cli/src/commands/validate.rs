//! Validate command implementation

use anyhow::{Context, Result};
use seqmig_core::validate_migration_dir;

use crate::cli::{GlobalArgs, ValidateArgs};
use crate::commands::common::warn_order_mismatch;
use crate::context::CliContext;

/// Execute the validate command
pub async fn execute(args: &ValidateArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = CliContext::new(global)?;
    let dir = &ctx.config.migration_dir;

    let set = validate_migration_dir(dir)
        .with_context(|| format!("Validation failed for {}", dir.display()))?;

    if args.list {
        for file in set.files() {
            println!("  {:>4}  {}", file.sequence, file.filename);
        }
    }
    warn_order_mismatch(&ctx.config);
    println!(
        "{} migration files in {} are valid (0..{})",
        set.len(),
        dir.display(),
        set.len() - 1
    );
    Ok(())
}
