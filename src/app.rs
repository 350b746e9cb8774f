//! Per-invocation application context shared by all commands.

use std::path::PathBuf;

use tracing::debug;

use crate::cli::Cli;
use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::storage::Database;

pub struct AppContext {
    pub config: Config,
    pub db: Database,
    /// JSON output for scripts, from `--json` or `output.format = "json"`.
    pub robot_mode: bool,
    pub verbosity: u8,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("db", &self.db)
            .field("robot_mode", &self.robot_mode)
            .field("verbosity", &self.verbosity)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Load the configuration named by `--config`, applying `--db` on top.
    pub fn load_config(cli: &Cli) -> Result<Config> {
        let cwd = std::env::current_dir()?;
        let mut config = Config::load(cli.config.as_deref(), &cwd)?;
        if let Some(path) = &cli.db {
            config.database.path = PathBuf::from(path);
        }
        Ok(config)
    }

    /// Whether responses, including failures, go out as JSON.
    #[must_use]
    pub fn wants_json(cli: &Cli, config: &Config) -> bool {
        cli.json || config.output.format == OutputFormat::Json
    }

    /// Open the configured database.
    pub fn open(cli: &Cli, config: Config) -> Result<Self> {
        debug!(db = %config.database.path.display(), "opening database");
        let db = Database::open(&config.database.path)?;
        let robot_mode = Self::wants_json(cli, &config);

        Ok(Self {
            config,
            db,
            robot_mode,
            verbosity: cli.verbose,
        })
    }
}
