use crate::core::config::data::{path_display, Config};
use directories::ProjectDirs;
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const BASE_URL_ENV: &str = "GEMINI_BASE_URL";

/// Errors that stop the client before a session starts.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    Read {
        /// Path to the configuration file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the configuration file as valid TOML.
    Parse {
        /// Path to the configuration file with invalid TOML.
        path: PathBuf,
        /// The TOML deserialization error.
        source: toml::de::Error,
    },

    /// No API key in the environment or `.env`.
    MissingApiKey,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(
                    f,
                    "Failed to read config at {}: {}",
                    path_display(path),
                    source
                )
            }
            ConfigError::Parse { path, source } => {
                write!(
                    f,
                    "Failed to parse config at {}: {}",
                    path_display(path),
                    source
                )
            }
            ConfigError::MissingApiKey => write!(
                f,
                "{API_KEY_ENV} not found. Set it in your environment or in a .env file \
                 (format: {API_KEY_ENV}=your-key)"
            ),
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::MissingApiKey => None,
        }
    }
}

impl Config {
    pub fn load_from_path(config_path: &Path) -> Result<Config, ConfigError> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })
    }

    /// Load from an explicit path, or from the per-user config directory.
    pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        match explicit {
            Some(path) => Self::load_from_path(path),
            None => match Self::get_config_path() {
                Some(path) => Self::load_from_path(&path),
                None => Ok(Config::default()),
            },
        }
    }

    pub fn get_config_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "parley", "parley")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

/// Read the API key from the process environment.
///
/// Callers load `.env` first; an empty value counts as missing.
pub fn resolve_api_key() -> Result<String, ConfigError> {
    api_key_from(std::env::var(API_KEY_ENV).ok())
}

fn api_key_from(value: Option<String>) -> Result<String, ConfigError> {
    match value {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(ConfigError::MissingApiKey),
    }
}

/// Endpoint root, with the environment override winning over config.
pub fn resolve_base_url(config: &Config) -> String {
    std::env::var(BASE_URL_ENV)
        .ok()
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| config.base_url().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_api_key_is_missing() {
        assert!(matches!(api_key_from(None), Err(ConfigError::MissingApiKey)));
        assert!(matches!(
            api_key_from(Some("   ".to_string())),
            Err(ConfigError::MissingApiKey)
        ));
        assert_eq!(
            api_key_from(Some(" abc \n".to_string())).expect("key"),
            "abc"
        );
    }

    #[test]
    fn missing_api_key_message_names_the_variable() {
        let message = ConfigError::MissingApiKey.to_string();
        assert!(message.contains("GEMINI_API_KEY"));
    }
}
