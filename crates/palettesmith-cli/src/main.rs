//! `palettesmith` command-line front end.
//!
//! Validates plugin definitions, lists the plugins it knows about and renders
//! a plugin's config fragment to stdout. It never writes target files.

mod commands;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use palettesmith::config;
use palettesmith::plugin::SystemLookup;

/// Environment variable holding a tracing filter, e.g. `palettesmith=debug`.
const LOG_ENV: &str = "PALETTESMITH_LOG";

#[derive(Debug, Parser)]
#[command(name = "palettesmith", version, about = "Project one theme into many config files")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Plugin directory [default: <config dir>/plugins]
    #[arg(long, global = true, value_name = "DIR")]
    plugins: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check every plugin and its field defaults; exits 1 on any failure
    Validate,
    /// List built-in and discovered plugins
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print a plugin's rendered config fragment
    Render {
        /// Plugin ID
        id: String,
        /// Theme file with `defaults` and `overrides`
        #[arg(long, value_name = "FILE")]
        theme: Option<PathBuf>,
        /// Override a field value for this render
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
        sets: Vec<(String, String)>,
    },
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let plugins_dir = match cli.plugins {
        Some(dir) => dir,
        None => config::plugins_dir()?,
    };
    let mut stdout = io::stdout().lock();

    match cli.command {
        Command::Validate => {
            if commands::validate(&plugins_dir, &mut stdout)? {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Command::List { json } => {
            commands::list(&plugins_dir, json, &SystemLookup, &mut stdout)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Render { id, theme, sets } => {
            commands::render(&plugins_dir, &id, theme.as_deref(), &sets, &mut stdout)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {:#}", style("error:").red().bold(), err);
            ExitCode::FAILURE
        }
    }
}
