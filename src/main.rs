// src/main.rs
//
// unfoldhtml CLI.
//
//   unfoldhtml expand [DIR]   rewrite accordion/FAQ markup to expanded state
//   unfoldhtml rename [DIR]   slug-normalize filenames in one folder
//
// Both commands default DIR to the current directory, take --dry-run and
// --format text|json, and print a batch summary to stdout. Per-file errors
// never abort the batch; they are listed in the summary.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use unfoldhtml::batch::expand_tree;
use unfoldhtml::report::{render_expand, render_rename, OutputFormat};
use unfoldhtml::rules::DEFAULT_RULES;
use unfoldhtml::slug::rename_folder;

/// Expand accordion/FAQ widgets in HTML files and normalize filenames
#[derive(Parser)]
#[command(name = "unfoldhtml", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite accordion/FAQ markup under a directory to its expanded state
    Expand {
        /// Root directory to walk (recursive)
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Summary format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Enable debug logging
        #[arg(long, short)]
        verbose: bool,
    },

    /// Rename HTML files in one folder to canonical slug form (non-recursive)
    Rename {
        /// Folder whose files are renamed
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Report what would change without renaming anything
        #[arg(long)]
        dry_run: bool,

        /// Summary format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Enable debug logging
        #[arg(long, short)]
        verbose: bool,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Expand {
            dir,
            dry_run,
            format,
            verbose,
        } => {
            init_tracing(verbose);
            let stats = expand_tree(&dir, DEFAULT_RULES, dry_run)?;
            print!("{}", render_expand(&stats, format)?);
        }
        Commands::Rename {
            dir,
            dry_run,
            format,
            verbose,
        } => {
            init_tracing(verbose);
            let stats = rename_folder(&dir, dry_run)?;
            print!("{}", render_rename(&stats, format)?);
        }
    }
    Ok(())
}
