//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.packmate/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.
//!
//! The API key is read once here. Whether it is present decides, at
//! startup, whether the app can ever call out during this run.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::Provider;
use crate::inference::providers::gemini::DEFAULT_GEMINI_BASE_URL;
use crate::inference::providers::openrouter::DEFAULT_OPENROUTER_BASE_URL;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PackmateConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub gemini: ProviderConfig,
    #[serde(default)]
    pub openrouter: ProviderConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub default_provider: Option<String>,
    pub default_model: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_OPENROUTER_MODEL: &str = "google/gemini-2.0-flash-001";

// ============================================================================
// Resolved Config (concrete values, no Options except the credential)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub provider: Provider,
    pub model_name: String,
    /// Credential for `provider`. `None` means not configured.
    pub api_key: Option<String>,
    pub base_url: String,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    /// Provider name from the environment or config file that no backend matches.
    UnknownProvider(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
            ConfigError::UnknownProvider(name) => write!(
                f,
                "unknown provider '{name}' (expected 'gemini' or 'openrouter')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.packmate/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".packmate").join("config.toml"))
}

/// Load config from `~/.packmate/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `PackmateConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<PackmateConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(PackmateConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(PackmateConfig::default());
    }

    load_config_from(&path)
}

/// Parse a config file at an explicit path.
pub fn load_config_from(path: &Path) -> Result<PackmateConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: PackmateConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", redacted(&config));
    Ok(config)
}

/// Debug view of the config with credentials masked.
fn redacted(config: &PackmateConfig) -> String {
    let mask = |key: &Option<String>| if key.is_some() { "<set>" } else { "<unset>" };
    format!(
        "general={:?}, gemini.api_key={}, gemini.base_url={:?}, openrouter.api_key={}, openrouter.base_url={:?}",
        config.general,
        mask(&config.gemini.api_key),
        config.gemini.base_url,
        mask(&config.openrouter.api_key),
        config.openrouter.base_url
    )
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# packmate configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults -> this file -> env vars -> CLI flags.

# [general]
# default_provider = "gemini"        # "gemini" or "openrouter"
# default_model = "gemini-2.0-flash"

# [gemini]
# api_key = "AIza..."                # Or set GEMINI_API_KEY env var
# base_url = "https://generativelanguage.googleapis.com/v1beta"

# [openrouter]
# api_key = "sk-or-..."              # Or set OPENROUTER_API_KEY env var
# base_url = "https://openrouter.ai/api/v1"
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_provider` and `cli_model` are from CLI flags (None = not specified).
/// Fails when the env var or config file names a provider that doesn't exist.
pub fn resolve(
    config: &PackmateConfig,
    cli_provider: Option<Provider>,
    cli_model: Option<&str>,
) -> Result<ResolvedConfig, ConfigError> {
    resolve_with_env(config, cli_provider, cli_model, |key| std::env::var(key).ok())
}

/// Parses a provider name the same way the `--provider` flag does (case-insensitive).
fn parse_provider(raw: &str) -> Result<Provider, ConfigError> {
    Provider::from_str(raw.trim(), true).map_err(|_| ConfigError::UnknownProvider(raw.to_string()))
}

/// Same as [`resolve`], reading environment variables through `env`.
pub fn resolve_with_env(
    config: &PackmateConfig,
    cli_provider: Option<Provider>,
    cli_model: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedConfig, ConfigError> {
    // Provider: CLI → env → config → default
    let provider = match cli_provider {
        Some(provider) => provider,
        None => match env("PACKMATE_PROVIDER")
            .or_else(|| config.general.default_provider.clone())
            .filter(|raw| !raw.trim().is_empty())
        {
            Some(raw) => parse_provider(&raw)?,
            None => Provider::default(),
        },
    };

    let (section, key_var, url_var, default_url, default_model) = match provider {
        Provider::OpenRouter => (
            &config.openrouter,
            "OPENROUTER_API_KEY",
            "OPENROUTER_BASE_URL",
            DEFAULT_OPENROUTER_BASE_URL,
            DEFAULT_OPENROUTER_MODEL,
        ),
        Provider::Gemini => (
            &config.gemini,
            "GEMINI_API_KEY",
            "GEMINI_BASE_URL",
            DEFAULT_GEMINI_BASE_URL,
            DEFAULT_GEMINI_MODEL,
        ),
    };

    // Model: CLI → env → config → provider default
    let model_name = cli_model
        .map(|s| s.to_string())
        .or_else(|| env("PACKMATE_MODEL"))
        .or_else(|| config.general.default_model.clone())
        .unwrap_or_else(|| default_model.to_string());

    // API key: env → config. Blank values count as unset.
    let api_key = env(key_var)
        .or_else(|| section.api_key.clone())
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty());

    // Base URL: env → config → default
    let base_url = env(url_var)
        .or_else(|| section.base_url.clone())
        .unwrap_or_else(|| default_url.to_string());

    if api_key.is_none() {
        warn!(
            "No API key found for provider '{}' (checked {} and config file)",
            provider.as_str(),
            key_var
        );
    }

    Ok(ResolvedConfig {
        provider,
        model_name,
        api_key,
        base_url,
    })
}
