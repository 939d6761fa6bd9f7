//! Up command implementation

use anyhow::{Context, Result};
use seqmig_runner::{migrate, MigrationEvent};

use crate::cli::{GlobalArgs, UpArgs};
use crate::commands::common::warn_order_mismatch;
use crate::context::CliContext;

/// Execute the up command
pub async fn execute(args: &UpArgs, global: &GlobalArgs) -> Result<()> {
    let mut ctx = CliContext::new(global)?;
    if let Some(order) = args.order {
        ctx.config.order = order.into();
    }
    if args.no_transaction {
        ctx.config.transactional = false;
    }

    ctx.verbose(&format!("Target: {}", ctx.config.database.describe()));
    ctx.verbose(&format!(
        "Migrations: {} (order={}, transactional={}, table={})",
        ctx.config.migration_dir.display(),
        ctx.config.order,
        ctx.config.transactional,
        ctx.config.tracking_table
    ));
    warn_order_mismatch(&ctx.config);

    let summary = migrate(&ctx.config, |event| match event {
        MigrationEvent::Skipped(name) => {
            println!("Skipping already applied migration: {}", name);
        }
        MigrationEvent::Applying(name) => ctx.verbose(&format!("Applying {}", name)),
        MigrationEvent::Applied(name) => println!("Applied migration: {}", name),
        MigrationEvent::AppliedElsewhere(name) => {
            println!("Skipping migration applied by another process: {}", name);
        }
    })
    .await
    .context("Migration run aborted")?;

    ctx.verbose(&format!(
        "{} applied, {} skipped, {} applied elsewhere",
        summary.applied.len(),
        summary.skipped.len(),
        summary.applied_elsewhere.len()
    ));
    println!("All migrations applied successfully.");
    Ok(())
}
