//! curate - search a curated directory of Ruby learning resources
//!
//! Command-line front end for the search composer: import a directory
//! snapshot, then query entries, authors and categories.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use curate::Result;
use curate::app::AppContext;
use curate::cli::Cli;
use curate::cli::output::robot_error;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    // Until the config is loaded only --json can ask for JSON errors
    let mut robot_mode = cli.json;
    match run(&cli, &mut robot_mode) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if robot_mode {
                // JSON error envelope on stdout so scripts can parse it
                let response = robot_error(&e);
                println!(
                    "{}",
                    serde_json::to_string_pretty(&response).unwrap_or_default()
                );
            } else {
                eprintln!("Error: {e}");
                eprintln!("  {}", e.to_structured().suggestion);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, robot_mode: &mut bool) -> Result<()> {
    let config = AppContext::load_config(cli)?;
    *robot_mode = AppContext::wants_json(cli, &config);
    let ctx = AppContext::open(cli, config)?;
    curate::cli::commands::run(&ctx, &cli.command)
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn,curate=info",
        1 => "info,curate=debug",
        2 => "debug,curate=trace",
        _ => "trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.json {
        // JSON logging for machine-readable runs
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
