//! Runtime context for CLI commands

use anyhow::{Context, Result};
use seqmig_core::config::DEFAULT_CONFIG_FILE;
use seqmig_core::MigrateConfig;
use std::path::Path;

use crate::cli::GlobalArgs;

/// Resolved configuration plus output settings shared by every command
pub(crate) struct CliContext {
    pub config: MigrateConfig,
    verbose: bool,
}

impl CliContext {
    /// Load the config file (if any), then apply command-line overrides.
    pub fn new(args: &GlobalArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => MigrateConfig::load(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => MigrateConfig::load_from_dir_or_default(Path::new("."))
                .with_context(|| format!("Failed to load {}", DEFAULT_CONFIG_FILE))?,
        };
        apply_overrides(&mut config, args);
        config.validate().context("Invalid configuration")?;
        log::debug!("Resolved configuration: {:?}", config);

        Ok(Self {
            config,
            verbose: args.verbose,
        })
    }

    /// Print verbose output if enabled
    pub fn verbose(&self, msg: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", msg);
        }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Flags win over file values; unset flags leave the file value alone.
fn apply_overrides(config: &mut MigrateConfig, args: &GlobalArgs) {
    if let Some(dir) = &args.migration_dir {
        config.migration_dir = dir.clone();
    }
    if let Some(table) = &args.tracking_table {
        config.tracking_table = table.clone();
    }

    let db = &mut config.database;
    if let Some(kind) = args.db_type {
        db.db_type = kind.into();
    }
    if let Some(host) = &args.db_host {
        db.host = host.clone();
    }
    if let Some(port) = args.db_port {
        db.port = port;
    }
    if let Some(user) = &args.db_user {
        db.user = user.clone();
    }
    if let Some(password) = &args.db_password {
        db.password = password.clone();
    }
    if let Some(name) = &args.db_name {
        db.name = name.clone();
    }
    if let Some(mode) = args.ssl_mode {
        db.ssl_mode = mode.into();
    }
    if let Some(path) = &args.db_path {
        db.path = path.clone();
    }
}
