//! seqmig CLI - apply numbered SQL migrations exactly once, in order

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod context;

use cli::{Cli, Commands, UpArgs};
use commands::{status, up, validate};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        None => up::execute(&UpArgs::default(), &cli.global).await,
        Some(Commands::Up(args)) => up::execute(args, &cli.global).await,
        Some(Commands::Validate(args)) => validate::execute(args, &cli.global).await,
        Some(Commands::Status(args)) => status::execute(args, &cli.global).await,
    }
}
