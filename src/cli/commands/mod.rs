//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - `run()` function to execute the command

use crate::app::AppContext;
use crate::cli::Commands;
use crate::error::Result;

pub mod authors;
pub mod categories;
pub mod import;
pub mod search;

/// Dispatch a command to its handler
pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Import(args) => import::run(ctx, args),
        Commands::Search(args) => search::run(ctx, args),
        Commands::Authors(args) => authors::run(ctx, args),
        Commands::Categories(args) => categories::run(ctx, args),
    }
}
