use std::path::PathBuf;

use color_eyre::Result;
use color_eyre::eyre::{OptionExt, WrapErr};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    spotify: Option<SpotifyConfig>,
    #[serde(default)]
    lastfm: Option<LastfmConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastfmConfig {
    pub api_key: String,
    pub shared_secret: String,
}

const DEFAULT_CONFIG: &str = r#"[spotify]
client_id = ""
client_secret = ""

[lastfm]
api_key = ""
shared_secret = ""
"#;

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Get the config file path (similar to beets)
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("cratedigger").join("config.toml"))
    }

    /// Load the default config file, falling back to an empty config (env
    /// variables only) when no file exists.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Config::default()),
        }
    }

    /// Create a default config file, if it doesn't exist
    pub fn create_default() -> Result<PathBuf> {
        let path = Self::config_path().ok_or_eyre("No config directory found")?;
        if path.exists() {
            return Ok(path);
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, DEFAULT_CONFIG)
            .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Get Spotify credentials, with environment variables as fallback
    pub fn spotify_config(&self) -> SpotifyConfig {
        if let Some(ref spotify) = self.spotify {
            spotify.clone()
        } else {
            SpotifyConfig {
                client_id: std::env::var("SPOTIFY_CLIENT_ID").unwrap_or_else(|_| "".to_string()),
                client_secret: std::env::var("SPOTIFY_CLIENT_SECRET")
                    .unwrap_or_else(|_| "".to_string()),
            }
        }
    }

    /// Get Last.fm credentials, with environment variables as fallback
    pub fn lastfm_config(&self) -> LastfmConfig {
        if let Some(ref lastfm) = self.lastfm {
            lastfm.clone()
        } else {
            LastfmConfig {
                api_key: std::env::var("LASTFM_API_KEY").unwrap_or_else(|_| "".to_string()),
                shared_secret: std::env::var("LASTFM_SHARED_SECRET")
                    .unwrap_or_else(|_| "".to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_template_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.spotify_config().client_id, "");
        assert_eq!(config.lastfm_config().api_key, "");
    }

    #[test]
    fn test_file_credentials_take_precedence() {
        let config: Config = toml::from_str(
            r#"
            [spotify]
            client_id = "abc"
            client_secret = "def"
            "#,
        )
        .unwrap();
        assert_eq!(config.spotify_config().client_id, "abc");
    }
}
