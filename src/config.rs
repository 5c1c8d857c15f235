use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Comma-delimited environment variable that overrides the configured
/// allowed-environment list.
pub const SUPPORTED_ENVS_VAR: &str = "SUPPORTED_ENVS";

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub reservations: ReservationConfig,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct ReservationConfig {
    #[serde(default)]
    pub supported_environments: Vec<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// The allowed environment list, with [`SUPPORTED_ENVS_VAR`] taking
    /// precedence over the config file.
    pub fn environments(&self) -> EnvironmentList {
        match env::var(SUPPORTED_ENVS_VAR) {
            Ok(raw) => EnvironmentList::from_delimited(&raw),
            Err(_) => EnvironmentList::new(self.reservations.supported_environments.clone()),
        }
    }
}

fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "reservebot", "reservebot")
        .context("Failed to determine config directory")?;

    Ok(proj_dirs.config_dir().join("config.toml"))
}

/// The set of environment names reservations may target. Ownership of the
/// list stays with the caller's configuration; the reservation model only
/// ever receives it as an argument.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentList {
    names: Vec<String>,
}

impl EnvironmentList {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Build from a comma-delimited string such as `staging-nz,demo-au`.
    pub fn from_delimited(raw: &str) -> Self {
        let names = raw
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect();
        Self { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|known| known == name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_from_parses_supported_environments() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[reservations]\nsupported_environments = [\"staging-nz\", \"demo-au\"]"
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(
            config.reservations.supported_environments,
            vec!["staging-nz".to_string(), "demo-au".to_string()]
        );
    }

    #[test]
    fn test_load_from_defaults_missing_table() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# empty config").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert!(config.reservations.supported_environments.is_empty());
    }

    #[test]
    fn test_environment_list_from_delimited() {
        let list = EnvironmentList::from_delimited("staging-nz,demo-au");
        assert!(list.contains("staging-nz"));
        assert!(list.contains("demo-au"));
        assert!(!list.contains("production"));

        let list = EnvironmentList::from_delimited("");
        assert!(list.is_empty());
    }

    #[test]
    fn test_environment_list_trims_entries() {
        let list = EnvironmentList::from_delimited("staging-nz, demo-au ,");
        assert_eq!(list.names(), ["staging-nz".to_string(), "demo-au".to_string()]);
    }
}
