//! Runtime configuration: JSON file, then environment, then CLI flags.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Read from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "fizlet.json";

pub const ENV_DB_URL: &str = "FIZLET_DB_URL";
pub const ENV_STORE: &str = "FIZLET_STORE";
pub const ENV_SEED: &str = "FIZLET_SEED";

/// Where user question sets live.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Forgotten when the program exits.
    Memory,
    /// One JSON file mapping set names to question arrays.
    Json,
    #[default]
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub backend: Backend,
    pub database_url: String,
    pub store_path: PathBuf,
    pub default_quiz: String,
    pub seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            database_url: "sqlite:fizlet.sqlite3".to_owned(),
            store_path: PathBuf::from("fizlet-questions.json"),
            default_quiz: "sql".to_owned(),
            seed: None,
        }
    }
}

/// Values given on the command line. `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub backend: Option<Backend>,
    pub database_url: Option<String>,
    pub store_path: Option<PathBuf>,
    pub seed: Option<u64>,
}

impl AppConfig {
    /// Load `explicit`, or `fizlet.json` if it exists, or the defaults.
    ///
    /// # Errors
    ///
    /// Fails if an explicitly named file is missing or any file is malformed.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// # Errors
    ///
    /// Fails if the file cannot be read or is not a valid config object.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Apply `FIZLET_*` variables looked up through `var`.
    ///
    /// # Errors
    ///
    /// Fails if `FIZLET_SEED` is set but is not an unsigned integer.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(url) = var(ENV_DB_URL).filter(|v| !v.trim().is_empty()) {
            self.database_url = url;
        }
        if let Some(path) = var(ENV_STORE).filter(|v| !v.trim().is_empty()) {
            self.store_path = PathBuf::from(path);
        }
        if let Some(raw) = var(ENV_SEED) {
            let seed = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_SEED} must be an unsigned integer, got `{raw}`"))?;
            self.seed = Some(seed);
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(backend) = overrides.backend {
            self.backend = backend;
        }
        if let Some(url) = overrides.database_url {
            self.database_url = url;
        }
        if let Some(path) = overrides.store_path {
            self.store_path = path;
        }
        if overrides.seed.is_some() {
            self.seed = overrides.seed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("fizlet.json");
        std::fs::write(&path, r#"{"backend": "json", "defaultQuiz": "prompt-samples"}"#).unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.backend, Backend::Json);
        assert_eq!(config.default_quiz, "prompt-samples");
        assert_eq!(config.database_url, AppConfig::default().database_url);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(AppConfig::load(Some(&dir.path().join("absent.json"))).is_err());
    }

    #[test]
    fn env_then_flags_override() {
        let mut config = AppConfig::default();
        config
            .apply_env(env(&[(ENV_DB_URL, "sqlite:env.db"), (ENV_SEED, "7")]))
            .unwrap();
        assert_eq!(config.database_url, "sqlite:env.db");
        assert_eq!(config.seed, Some(7));

        config.apply_overrides(Overrides {
            database_url: Some("sqlite:flag.db".into()),
            backend: Some(Backend::Memory),
            ..Overrides::default()
        });
        assert_eq!(config.database_url, "sqlite:flag.db");
        assert_eq!(config.backend, Backend::Memory);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn bad_env_seed_is_rejected() {
        let mut config = AppConfig::default();
        let err = config.apply_env(env(&[(ENV_SEED, "soon")])).unwrap_err();
        assert!(err.to_string().contains(ENV_SEED));
    }
}
