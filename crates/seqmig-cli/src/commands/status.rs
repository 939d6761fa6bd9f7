//! Status command implementation

use anyhow::{Context, Result};
use seqmig_runner::StatusReport;

use crate::cli::{GlobalArgs, StatusArgs, StatusOutput};
use crate::commands::common::warn_order_mismatch;
use crate::context::CliContext;

/// Execute the status command
pub async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = CliContext::new(global)?;
    ctx.verbose(&format!("Target: {}", ctx.config.database.describe()));

    let report = seqmig_runner::status(&ctx.config)
        .await
        .context("Failed to read migration status")?;

    match args.output {
        StatusOutput::Json => {
            let json = serde_json::to_string_pretty(&report)
                .context("Failed to serialize status report")?;
            println!("{}", json);
        }
        StatusOutput::Table => {
            print_table(&report);
            warn_order_mismatch(&ctx.config);
        }
    }
    Ok(())
}

fn print_table(report: &StatusReport) {
    for entry in &report.entries {
        let state = if entry.applied { "applied" } else { "pending" };
        println!("  [{}] {}", state, entry.id);
    }
    for id in &report.missing {
        println!("  [missing] {}", id);
    }
    println!();
    println!(
        "{} applied, {} pending, {} recorded without a file",
        report.applied_count(),
        report.pending_count(),
        report.missing.len()
    );
}
