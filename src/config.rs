use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CurateError, Result};
use crate::search::{DEFAULT_PER_PAGE, SanitizeRules};

/// File name of the project-level config, looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "curate.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Defaults, then the global and project files (or an explicit file
    /// instead of both), then `CURATE_*` environment overrides.
    pub fn load(explicit_path: Option<&Path>, project_dir: &Path) -> Result<Self> {
        let global = dirs::config_dir().map(|dir| dir.join("curate/config.toml"));
        Self::load_from(explicit_path, project_dir, global.as_deref(), &|key| {
            std::env::var(key).ok()
        })
    }

    fn load_from(
        explicit_path: Option<&Path>,
        project_dir: &Path,
        global_path: Option<&Path>,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| env("CURATE_CONFIG").map(PathBuf::from));

        if let Some(path) = explicit {
            let patch = Self::load_patch(&path)?.ok_or_else(|| {
                CurateError::MissingConfig(format!("config file {}", path.display()))
            })?;
            config.merge_patch(patch);
        } else {
            if let Some(global) = global_path {
                if let Some(patch) = Self::load_patch(global)? {
                    config.merge_patch(patch);
                }
            }
            if let Some(project) = Self::load_patch(&project_dir.join(PROJECT_CONFIG_FILE))? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides(env)?;
        config.validate()?;

        Ok(config)
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| CurateError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw).map_err(|err| {
            CurateError::Config(format!("parse config {}: {err}", path.display()))
        })?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.database {
            self.database.merge(patch);
        }
        if let Some(patch) = patch.search {
            self.search.merge(patch);
        }
        if let Some(patch) = patch.output {
            self.output.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self, env: &dyn Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(path) = env_string(env, "CURATE_DB_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(value) = env_u32(env, "CURATE_SEARCH_PER_PAGE")? {
            self.search.per_page = value;
        }
        if let Some(value) = env_u32(env, "CURATE_SEARCH_MAX_PER_PAGE")? {
            self.search.max_per_page = value;
        }
        if let Some(value) = env_bool(env, "CURATE_SEARCH_ENTRY_STRIP_APOSTROPHES")? {
            self.search.entry_strip_apostrophes = value;
        }
        if let Some(value) = env_bool(env, "CURATE_SEARCH_AUTHOR_STRIP_APOSTROPHES")? {
            self.search.author_strip_apostrophes = value;
        }
        if let Some(value) = env_string(env, "CURATE_OUTPUT_FORMAT") {
            self.output.format = OutputFormat::parse(&value).ok_or_else(|| {
                CurateError::Config(format!(
                    "invalid CURATE_OUTPUT_FORMAT value {value} (expected human|json)"
                ))
            })?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.search.per_page == 0 {
            return Err(CurateError::Config(
                "search.per_page must be at least 1".to_string(),
            ));
        }
        if self.search.max_per_page < self.search.per_page {
            return Err(CurateError::Config(format!(
                "search.max_per_page ({}) is below search.per_page ({})",
                self.search.max_per_page, self.search.per_page
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl DatabaseConfig {
    fn merge(&mut self, patch: DatabasePatch) {
        if let Some(value) = patch.path {
            self.path = value;
        }
    }
}

fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("curate")
        .join("curate.db")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub per_page: u32,
    pub max_per_page: u32,
    pub entry_strip_apostrophes: bool,
    pub author_strip_apostrophes: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            max_per_page: 100,
            entry_strip_apostrophes: true,
            author_strip_apostrophes: false,
        }
    }
}

impl SearchConfig {
    fn merge(&mut self, patch: SearchPatch) {
        if let Some(value) = patch.per_page {
            self.per_page = value;
        }
        if let Some(value) = patch.max_per_page {
            self.max_per_page = value;
        }
        if let Some(value) = patch.entry_strip_apostrophes {
            self.entry_strip_apostrophes = value;
        }
        if let Some(value) = patch.author_strip_apostrophes {
            self.author_strip_apostrophes = value;
        }
    }

    /// Requested page size clamped to `1..=max_per_page`.
    #[must_use]
    pub fn page_size(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.per_page)
            .clamp(1, self.max_per_page.max(1))
    }

    #[must_use]
    pub const fn entry_rules(&self) -> SanitizeRules {
        SanitizeRules {
            strip_apostrophes: self.entry_strip_apostrophes,
        }
    }

    #[must_use]
    pub const fn author_rules(&self) -> SanitizeRules {
        SanitizeRules {
            strip_apostrophes: self.author_strip_apostrophes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

impl OutputFormat {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "human" | "text" => Some(Self::Human),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

impl OutputConfig {
    fn merge(&mut self, patch: OutputPatch) {
        if let Some(value) = patch.format {
            self.format = value;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    pub database: Option<DatabasePatch>,
    pub search: Option<SearchPatch>,
    pub output: Option<OutputPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchPatch {
    pub per_page: Option<u32>,
    pub max_per_page: Option<u32>,
    pub entry_strip_apostrophes: Option<bool>,
    pub author_strip_apostrophes: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct OutputPatch {
    pub format: Option<OutputFormat>,
}

fn env_string(env: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    env(key).filter(|value| !value.trim().is_empty())
}

fn env_bool(env: &dyn Fn(&str) -> Option<String>, key: &str) -> Result<Option<bool>> {
    let Some(value) = env(key) else {
        return Ok(None);
    };
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(CurateError::Config(format!(
            "invalid {key} value {value} (expected true|false)"
        ))),
    }
}

fn env_u32(env: &dyn Fn(&str) -> Option<String>, key: &str) -> Result<Option<u32>> {
    match env(key) {
        Some(value) => value.trim().parse::<u32>().map(Some).map_err(|err| {
            CurateError::Config(format!("invalid {key} value {value}: {err}"))
        }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn load_isolated(
        explicit: Option<&Path>,
        project_dir: &Path,
        vars: &[(&str, &str)],
    ) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::load_from(explicit, project_dir, None, &move |key| vars.get(key).cloned())
    }

    #[test]
    fn config_defaults() {
        let config = Config::default();
        assert_eq!(config.search.per_page, 20);
        assert_eq!(config.search.max_per_page, 100);
        assert!(config.search.entry_strip_apostrophes);
        assert!(!config.search.author_strip_apostrophes);
        assert_eq!(config.output.format, OutputFormat::Human);
        assert!(config.database.path.ends_with("curate/curate.db"));
    }

    #[test]
    fn config_serialization_roundtrip() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.search.per_page, config.search.per_page);
        assert_eq!(parsed.database.path, config.database.path);
    }

    #[test]
    fn page_size_is_clamped() {
        let search = SearchConfig::default();
        assert_eq!(search.page_size(None), 20);
        assert_eq!(search.page_size(Some(5)), 5);
        assert_eq!(search.page_size(Some(0)), 1);
        assert_eq!(search.page_size(Some(5000)), 100);
    }

    #[test]
    fn sanitize_rules_follow_config() {
        let mut search = SearchConfig::default();
        assert_eq!(search.entry_rules(), SanitizeRules::CONTENT);
        assert_eq!(search.author_rules(), SanitizeRules::PROFILES);
        search.author_strip_apostrophes = true;
        assert!(search.author_rules().strip_apostrophes);
    }

    #[test]
    fn load_patch_nonexistent_file() {
        let result = Config::load_patch(Path::new("/nonexistent/path/curate.toml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn load_patch_partial_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("curate.toml");
        std::fs::write(&path, "[search]\nper_page = 5\n").unwrap();

        let patch = Config::load_patch(&path).unwrap().unwrap();
        assert_eq!(patch.search.unwrap().per_page, Some(5));
        assert!(patch.database.is_none());
        assert!(patch.output.is_none());
    }

    #[test]
    fn load_patch_invalid_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("curate.toml");
        std::fs::write(&path, "this is not valid toml [[[").unwrap();

        let err = Config::load_patch(&path).unwrap_err();
        assert!(matches!(err, CurateError::Config(_)));
    }

    #[test]
    fn merge_patch_keeps_unset_values() {
        let mut config = Config::default();
        config.merge_patch(ConfigPatch {
            search: Some(SearchPatch {
                max_per_page: Some(40),
                ..SearchPatch::default()
            }),
            ..ConfigPatch::default()
        });
        assert_eq!(config.search.max_per_page, 40);
        assert_eq!(config.search.per_page, 20);
    }

    #[test]
    fn load_project_config() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(PROJECT_CONFIG_FILE),
            "[database]\npath = \"dir/site.db\"\n\n[output]\nformat = \"json\"\n",
        )
        .unwrap();

        let config = load_isolated(None, temp.path(), &[]).unwrap();
        assert_eq!(config.database.path, PathBuf::from("dir/site.db"));
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn explicit_path_replaces_project_config() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(PROJECT_CONFIG_FILE), "[search]\nper_page = 7\n").unwrap();
        let explicit = temp.path().join("other.toml");
        std::fs::write(&explicit, "[search]\nmax_per_page = 50\n").unwrap();

        let config = load_isolated(Some(&explicit), temp.path(), &[]).unwrap();
        assert_eq!(config.search.per_page, 20);
        assert_eq!(config.search.max_per_page, 50);
    }

    #[test]
    fn explicit_path_must_exist() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.toml");
        let err = load_isolated(Some(&missing), temp.path(), &[]).unwrap_err();
        assert!(matches!(err, CurateError::MissingConfig(_)));
    }

    #[test]
    fn config_env_var_selects_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("env.toml");
        std::fs::write(&file, "[search]\nper_page = 3\n").unwrap();

        let file = file.to_string_lossy().to_string();
        let config = load_isolated(None, temp.path(), &[("CURATE_CONFIG", file.as_str())]).unwrap();
        assert_eq!(config.search.per_page, 3);
    }

    #[test]
    fn env_overrides_win_over_files() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(PROJECT_CONFIG_FILE), "[search]\nper_page = 7\n").unwrap();

        let config = load_isolated(
            None,
            temp.path(),
            &[
                ("CURATE_SEARCH_PER_PAGE", "12"),
                ("CURATE_DB_PATH", "/tmp/override.db"),
                ("CURATE_OUTPUT_FORMAT", "JSON"),
            ],
        )
        .unwrap();
        assert_eq!(config.search.per_page, 12);
        assert_eq!(config.database.path, PathBuf::from("/tmp/override.db"));
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn invalid_env_values_are_config_errors() {
        let temp = TempDir::new().unwrap();
        let err =
            load_isolated(None, temp.path(), &[("CURATE_SEARCH_PER_PAGE", "many")]).unwrap_err();
        assert!(matches!(err, CurateError::Config(_)));

        let err =
            load_isolated(None, temp.path(), &[("CURATE_OUTPUT_FORMAT", "xml")]).unwrap_err();
        assert!(matches!(err, CurateError::Config(_)));

        let err = load_isolated(
            None,
            temp.path(),
            &[("CURATE_SEARCH_ENTRY_STRIP_APOSTROPHES", "maybe")],
        )
        .unwrap_err();
        assert!(matches!(err, CurateError::Config(_)));
    }

    #[test]
    fn boolean_env_overrides() {
        let temp = TempDir::new().unwrap();
        let config = load_isolated(
            None,
            temp.path(),
            &[
                ("CURATE_SEARCH_ENTRY_STRIP_APOSTROPHES", "off"),
                ("CURATE_SEARCH_AUTHOR_STRIP_APOSTROPHES", "Yes"),
            ],
        )
        .unwrap();
        assert!(!config.search.entry_strip_apostrophes);
        assert!(config.search.author_strip_apostrophes);
    }

    #[test]
    fn partial_search_table_keeps_defaults() {
        let config: Config = toml::from_str("[search]\nper_page = 5\n").unwrap();
        assert_eq!(config.search.per_page, 5);
        assert_eq!(config.search.max_per_page, 100);
        assert!(config.search.entry_strip_apostrophes);
        assert!(!config.search.author_strip_apostrophes);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let temp = TempDir::new().unwrap();
        let err =
            load_isolated(None, temp.path(), &[("CURATE_SEARCH_PER_PAGE", "0")]).unwrap_err();
        assert!(matches!(err, CurateError::Config(_)));
    }

    #[test]
    fn load_with_no_config_files_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_from(None, temp.path(), None, &no_env).unwrap();
        assert_eq!(config.search.per_page, 20);
        assert_eq!(config.output.format, OutputFormat::Human);
    }
}
