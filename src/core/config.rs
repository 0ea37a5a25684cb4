//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.drugbot/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::locale::Locale;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DrugbotConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub locale: Option<Locale>,
    pub use_rag: Option<bool>,
    pub streaming: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BackendConfig {
    pub base_url: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";

pub const ENV_BACKEND_URL: &str = "DRUGBOT_BACKEND_URL";
pub const ENV_LOCALE: &str = "DRUGBOT_LOCALE";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub backend_url: String,
    pub locale: Locale,
    pub use_rag: bool,
    pub streaming: bool,
    /// Session to open at startup instead of the newest one.
    pub initial_session: Option<String>,
}

/// Values given on the command line. `false` flags mean "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub backend_url: Option<String>,
    pub locale: Option<Locale>,
    pub use_rag: bool,
    pub streaming: bool,
    pub session: Option<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.drugbot/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".drugbot").join("config.toml"))
}

/// Load config from `~/.drugbot/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `DrugbotConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<DrugbotConfig, ConfigError> {
    let Some(path) = config_path() else {
        warn!("Could not determine home directory, using default config");
        return Ok(DrugbotConfig::default());
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<DrugbotConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(DrugbotConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: DrugbotConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

const DEFAULT_CONFIG: &str = r#"# Drugbot Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# locale = "en"                      # "en" or "id", or set DRUGBOT_LOCALE
# use_rag = false                    # ask the backend to use retrieval
# streaming = false                  # read answers as newline-delimited JSON

# [backend]
# base_url = "http://localhost:5000" # Or set DRUGBOT_BACKEND_URL
"#;

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, DEFAULT_CONFIG) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &DrugbotConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// Same as [`resolve`] with an explicit environment lookup.
pub fn resolve_with_env(
    config: &DrugbotConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Backend URL: CLI → env → config → default
    let backend_url = cli
        .backend_url
        .clone()
        .or_else(|| env(ENV_BACKEND_URL))
        .or_else(|| config.backend.base_url.clone())
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

    // Locale: CLI → env → config → default
    let env_locale = env(ENV_LOCALE).and_then(|code| {
        let parsed = Locale::from_code(&code);
        if parsed.is_none() {
            warn!("Ignoring unknown {} value: {}", ENV_LOCALE, code);
        }
        parsed
    });
    let locale = cli
        .locale
        .or(env_locale)
        .or(config.general.locale)
        .unwrap_or_default();

    ResolvedConfig {
        backend_url,
        locale,
        use_rag: cli.use_rag || config.general.use_rag.unwrap_or(false),
        streaming: cli.streaming || config.general.streaming.unwrap_or(false),
        initial_session: cli.session.clone().filter(|s| !s.trim().is_empty()),
    }
}
