//! Snaptree CLI Binary
//!
//! Command-line interface for building, querying and storing snapshot trees.

use anyhow::Context;
use clap::Parser;
use snaptree::cli::{map_error, Cli, RunContext};
use snaptree::config::ConfigLoader;
use snaptree::error::ErrorCode;
use snaptree::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    // Build logging config from CLI args, env vars, and config file
    let logging_config = build_logging_config(&cli);

    // Initialize logging early
    if let Err(e) = init_logging(Some(&logging_config)).context("Failed to initialize logging") {
        eprintln!("{:#}", e);
        process::exit(1);
    }

    info!("snaptree starting");

    let context = match RunContext::new(cli.workspace.clone(), cli.config.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!(code = %ErrorCode::of(&e), "Error loading configuration: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    };

    match context.execute(&cli.command) {
        Ok(output) => {
            info!("Command completed successfully");
            println!("{}", output);
        }
        Err(e) => {
            error!(code = %ErrorCode::of(&e), "Command failed: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    }
}

/// Build logging configuration from CLI args, environment, and config file
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    // If --verbose is not set and no level is given, disable logging
    if !cli.verbose && cli.log_level.is_none() {
        return LoggingConfig {
            level: "off".to_string(),
            ..LoggingConfig::default()
        };
    }

    let mut config = if let Some(ref config_path) = cli.config {
        ConfigLoader::load_from_file(config_path)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    } else {
        ConfigLoader::load(&cli.workspace)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    };

    if cli.verbose && cli.log_level.is_none() && config.level == "warn" {
        config.level = "debug".to_string();
    }

    // Override with CLI arguments (highest priority)
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = file.clone();
    } else if config.file.is_relative() {
        config.file = cli.workspace.join(&config.file);
    }

    config
}
