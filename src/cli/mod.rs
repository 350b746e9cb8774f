//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing. The commands are a
//! thin consumer of the search composer, standing in for the web layer.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod commands;
pub mod output;

/// Curate - search a curated directory of Ruby learning resources
#[derive(Parser, Debug)]
#[command(name = "curate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (default: ~/.config/curate/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file (overrides database.path)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load categories, authors and entries from a JSON file
    Import(commands::import::ImportArgs),

    /// Search curated entries
    Search(commands::search::SearchArgs),

    /// Search author profiles
    Authors(commands::authors::AuthorsArgs),

    /// List categories with their entry counts
    Categories(commands::categories::CategoriesArgs),
}
