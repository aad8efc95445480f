//! Layered settings.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. `tabulon.yaml` (or the file named by `--config` / `TABULON_CONFIG`)
//! 2. `TABULON_*` environment variables
//! 3. Command-line flags (applied by each command)
//!
//! Relative paths inside a settings file are resolved against the file's
//! directory.

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tabulon_table::TableConfig;

use crate::env::EnvReader;
use crate::output::OutputMode;

/// Default settings file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "tabulon.yaml";

pub const ENV_CONFIG: &str = "TABULON_CONFIG";
pub const ENV_OUTPUT: &str = "TABULON_OUTPUT";
pub const ENV_PAGE_SIZE: &str = "TABULON_PAGE_SIZE";
pub const ENV_KEY: &str = "TABULON_KEY";
pub const ENV_COLUMNS: &str = "TABULON_COLUMNS";
pub const ENV_USERS: &str = "TABULON_USERS";
pub const ENV_POLICY: &str = "TABULON_POLICY";
pub const ENV_PASSWORD: &str = "TABULON_PASSWORD";

/// Errors while assembling settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid value '{value}' for {name}: {reason}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Resolved settings before command-line flags.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub output: Option<OutputMode>,
    /// Field whose text identifies a record for selection.
    pub key: Option<String>,
    /// Column descriptor file.
    pub columns: Option<PathBuf>,
    /// Credential directory for `tabulon access`.
    pub users: Option<PathBuf>,
    /// Module access policy file.
    pub policy: Option<PathBuf>,
    pub table: TableConfig,
    /// Where the settings came from, if a file was read.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Settings {
    /// Loads the settings file and applies environment overrides.
    ///
    /// An explicitly named file must exist; the default `tabulon.yaml` is
    /// optional.
    pub fn load(explicit: Option<&Path>, env: &dyn EnvReader) -> Result<Settings, ConfigError> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| env.var(ENV_CONFIG).map(PathBuf::from));

        let mut settings = match named {
            Some(path) => Self::from_file(&path)?,
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(&default)?
                } else {
                    log::debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
                    Settings::default()
                }
            }
        };
        settings.apply_env(env)?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Settings, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings = Self::from_yaml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(base) = path.parent() {
            settings.resolve_paths(base);
        }
        log::debug!("loaded settings from {}", path.display());
        settings.source = Some(path.to_path_buf());
        Ok(settings)
    }

    pub fn from_yaml_str(text: &str) -> Result<Settings, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Settings::default());
        }
        serde_yaml::from_str(text)
    }

    /// Applies `TABULON_*` overrides.
    pub fn apply_env(&mut self, env: &dyn EnvReader) -> Result<(), ConfigError> {
        if let Some(value) = env.var(ENV_OUTPUT) {
            let mode = value.parse().map_err(|reason| ConfigError::InvalidEnv {
                name: ENV_OUTPUT,
                value: value.clone(),
                reason,
            })?;
            self.output = Some(mode);
        }
        if let Some(value) = env.var(ENV_PAGE_SIZE) {
            self.table.page_size = match value.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                Ok(_) => {
                    return Err(ConfigError::InvalidEnv {
                        name: ENV_PAGE_SIZE,
                        value,
                        reason: "page size must be greater than zero".into(),
                    })
                }
                Err(e) => {
                    return Err(ConfigError::InvalidEnv {
                        name: ENV_PAGE_SIZE,
                        value,
                        reason: e.to_string(),
                    })
                }
            };
        }
        if let Some(value) = env.var(ENV_KEY) {
            self.key = Some(value);
        }
        if let Some(value) = env.var(ENV_COLUMNS) {
            self.columns = Some(PathBuf::from(value));
        }
        if let Some(value) = env.var(ENV_USERS) {
            self.users = Some(PathBuf::from(value));
        }
        if let Some(value) = env.var(ENV_POLICY) {
            self.policy = Some(PathBuf::from(value));
        }
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        for path in [&mut self.columns, &mut self.users, &mut self.policy]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MockEnv;

    #[test]
    fn defaults_without_file_or_env() {
        let settings = Settings::from_yaml_str("").unwrap();
        assert_eq!(settings.output, None);
        assert_eq!(settings.table.page_size, 10);
    }

    #[test]
    fn file_values() {
        let settings = Settings::from_yaml_str(
            "output: csv\nkey: email\ntable:\n  page_size: 25\n  selectable: false\n",
        )
        .unwrap();
        assert_eq!(settings.output, Some(OutputMode::Csv));
        assert_eq!(settings.key.as_deref(), Some("email"));
        assert_eq!(settings.table.page_size, 25);
        assert!(!settings.table.selectable);
        assert!(settings.table.searchable);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Settings::from_yaml_str("pagesize: 3\n").is_err());
    }

    #[test]
    fn env_overrides_file() {
        let mut settings = Settings::from_yaml_str("output: csv\n").unwrap();
        let env = MockEnv::new()
            .with_var(ENV_OUTPUT, "yaml")
            .with_var(ENV_PAGE_SIZE, "5")
            .with_var(ENV_KEY, "sku");
        settings.apply_env(&env).unwrap();
        assert_eq!(settings.output, Some(OutputMode::Yaml));
        assert_eq!(settings.table.page_size, 5);
        assert_eq!(settings.key.as_deref(), Some("sku"));
    }

    #[test]
    fn bad_env_values_are_reported() {
        let mut settings = Settings::default();
        let env = MockEnv::new().with_var(ENV_PAGE_SIZE, "0");
        let err = settings.apply_env(&env).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { name: ENV_PAGE_SIZE, .. }));

        let env = MockEnv::new().with_var(ENV_OUTPUT, "xml");
        assert!(settings.apply_env(&env).is_err());
    }

    #[test]
    fn relative_paths_follow_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tabulon.yaml");
        std::fs::write(&path, "columns: cols.yaml\nusers: /abs/users.yaml\n").unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.columns, Some(dir.path().join("cols.yaml")));
        assert_eq!(settings.users, Some(PathBuf::from("/abs/users.yaml")));
        assert_eq!(settings.source, Some(path));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let env = MockEnv::new();
        let err = Settings::load(Some(Path::new("/no/such/tabulon.yaml")), &env).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
