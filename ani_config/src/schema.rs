use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable holding the xAI credential.
pub const API_KEY_ENV: &str = "XAI_API_KEY";

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    #[serde(default = "DatabaseConfig::default_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
        }
    }
}

impl DatabaseConfig {
    fn default_path() -> PathBuf {
        PathBuf::from("./ani_memory.db")
    }
}

/// Which part of the stored history goes into each request.
///
/// Both limits unset means the whole log is sent every turn.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ContextConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_chars: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    /// One retry per entry, waiting that many milliseconds first
    #[serde(default)]
    pub retry_backoff_ms: Vec<u64>,
}

const CONFIG_TEMPLATE: &str = r#"{
  "database": {
    "path": "./ani_memory.db"
  },
  "context": {},
  "model": {
    "retry_backoff_ms": []
  }
}
"#;

impl Config {
    /// `~/ani/config.json`
    pub fn default_path() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("ani")
            .join("config.json"))
    }

    /// Load the config at `path`, or at the default location when `None`.
    ///
    /// A missing file at the default location yields the defaults; an
    /// explicitly requested file must exist.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let (config_path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::default_path()?, false),
        };

        if !config_path.exists() {
            if explicit {
                anyhow::bail!("Config file not found at: {}", config_path.display());
            }
            info!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        Self::from_file(&config_path)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {e}", path.display()))?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write the config template to `path`, creating parent directories.
    pub fn create_config(path: &Path) -> anyhow::Result<()> {
        if path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                path.display()
            );
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, CONFIG_TEMPLATE)?;

        println!("Created config file at: {}", path.display());
        println!();
        println!("Configuration options:");
        println!("   - database.path: SQLite file holding the conversation log");
        println!("   - context.history_limit: Send only the last N stored messages");
        println!("   - context.max_chars: Drop oldest history beyond this many characters");
        println!("   - model.request_timeout_secs: Abort a model request after this long");
        println!("   - model.retry_backoff_ms: Delays between retries of a failed request");
        println!();
        println!("Set {API_KEY_ENV} and run 'ani --sync' to start.");
        Ok(())
    }
}

/// Read the credential from the environment. Missing or empty is an error.
pub fn api_key_from_env() -> anyhow::Result<String> {
    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => anyhow::bail!("Please set {API_KEY_ENV} environment variable"),
    }
}
