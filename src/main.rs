//! Magic Drill - identify files by their magic bytes
//!
//! Command-line front end over the signature matcher: identify single
//! files, scan directory trees, and list the signature table.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use magic_drill::cli::{self, Cli};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .with(
            EnvFilter::from_default_env()
                .add_directive(format!("magic_drill={}", config.general.log_level).parse()?),
        )
        .init();

    tracing::debug!(config = ?config, "Resolved configuration");

    if cli::run(&cli, &config)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
