//! Service configuration loaded from environment variables.
//!
//! | Variable                 | Default                                                    |
//! |--------------------------|------------------------------------------------------------|
//! | `PORT`                   | `8080`                                                     |
//! | `AI_ENDPOINT_BASE`       | `https://llama-3-3-70b-instruct.endpoints.kepler.ai.cloud.ovh.net` |
//! | `AI_ENDPOINT_PATH`       | `/api/openai_compat/v1/chat/completions`                   |
//! | `AI_API_KEY`             | unset                                                      |
//! | `AI_MODEL`               | unset (sent as `null`)                                     |
//! | `SPOTIFY_CLIENT_ID`      | unset                                                      |
//! | `SPOTIFY_CLIENT_SECRET`  | unset                                                      |
//! | `SPOTIFY_API_BASE`       | `https://api.spotify.com/v1`                               |
//! | `SPOTIFY_ACCOUNTS_BASE`  | `https://accounts.spotify.com`                             |
//! | `BGG_API_BASE`           | `https://boardgamegeek.com/xmlapi2`                        |
//! | `HTTP_TIMEOUT_SECS`      | `30`                                                       |

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_AI_ENDPOINT_BASE: &str =
    "https://llama-3-3-70b-instruct.endpoints.kepler.ai.cloud.ovh.net";
pub const DEFAULT_AI_ENDPOINT_PATH: &str = "/api/openai_compat/v1/chat/completions";
pub const DEFAULT_SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SPOTIFY_ACCOUNTS_BASE: &str = "https://accounts.spotify.com";
pub const DEFAULT_BGG_API_BASE: &str = "https://boardgamegeek.com/xmlapi2";

/// Language-model endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub endpoint_base: String,
    pub endpoint_path: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: Option<String>,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_max_retries() -> u32 {
    2
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint_base: DEFAULT_AI_ENDPOINT_BASE.to_string(),
            endpoint_path: DEFAULT_AI_ENDPOINT_PATH.to_string(),
            api_key: None,
            model: None,
            max_retries: default_max_retries(),
        }
    }
}

impl AiConfig {
    /// Full chat-completions URL.
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}{}",
            self.endpoint_base.trim_end_matches('/'),
            self.endpoint_path
        )
    }
}

/// Spotify application credentials and endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    #[serde(skip_serializing)]
    pub client_secret: Option<String>,
    pub api_base: String,
    pub accounts_base: String,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            api_base: DEFAULT_SPOTIFY_API_BASE.to_string(),
            accounts_base: DEFAULT_SPOTIFY_ACCOUNTS_BASE.to_string(),
        }
    }
}

/// Top-level configuration for the HTTP service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub port: u16,
    pub ai: AiConfig,
    pub spotify: SpotifyConfig,
    pub bgg_api_base: String,
    pub http_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            ai: AiConfig::default(),
            spotify: SpotifyConfig::default(),
            bgg_api_base: DEFAULT_BGG_API_BASE.to_string(),
            http_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Load configuration from an explicit variable map.
    ///
    /// Unset or empty variables fall back to defaults; numeric variables that
    /// fail to parse are rejected.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let defaults = Self::default();

        Ok(Self {
            port: parse_number("PORT", get("PORT"), defaults.port)?,
            ai: AiConfig {
                endpoint_base: get("AI_ENDPOINT_BASE").unwrap_or(defaults.ai.endpoint_base),
                endpoint_path: get("AI_ENDPOINT_PATH").unwrap_or(defaults.ai.endpoint_path),
                api_key: get("AI_API_KEY"),
                model: get("AI_MODEL"),
                max_retries: parse_number(
                    "AI_MAX_RETRIES",
                    get("AI_MAX_RETRIES"),
                    defaults.ai.max_retries,
                )?,
            },
            spotify: SpotifyConfig {
                client_id: get("SPOTIFY_CLIENT_ID"),
                client_secret: get("SPOTIFY_CLIENT_SECRET"),
                api_base: get("SPOTIFY_API_BASE").unwrap_or(defaults.spotify.api_base),
                accounts_base: get("SPOTIFY_ACCOUNTS_BASE")
                    .unwrap_or(defaults.spotify.accounts_base),
            },
            bgg_api_base: get("BGG_API_BASE").unwrap_or(defaults.bgg_api_base),
            http_timeout_secs: parse_number(
                "HTTP_TIMEOUT_SECS",
                get("HTTP_TIMEOUT_SECS"),
                defaults.http_timeout_secs,
            )?,
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_number<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_vars(&HashMap::new()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.bgg_api_base, DEFAULT_BGG_API_BASE);
        assert_eq!(config.ai.max_retries, 2);
        assert!(config.ai.api_key.is_none());
        assert_eq!(
            config.ai.endpoint_url(),
            "https://llama-3-3-70b-instruct.endpoints.kepler.ai.cloud.ovh.net/api/openai_compat/v1/chat/completions"
        );
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_vars(&vars(&[
            ("PORT", "9000"),
            ("AI_ENDPOINT_BASE", "http://localhost:1234/"),
            ("AI_ENDPOINT_PATH", "/v1/chat/completions"),
            ("AI_API_KEY", "secret"),
            ("SPOTIFY_CLIENT_ID", "cid"),
            ("HTTP_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.ai.endpoint_url(), "http://localhost:1234/v1/chat/completions");
        assert_eq!(config.ai.api_key.as_deref(), Some("secret"));
        assert_eq!(config.spotify.client_id.as_deref(), Some("cid"));
        assert_eq!(config.http_timeout(), Duration::from_secs(5));
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
    }

    #[test]
    fn test_empty_values_fall_back() {
        let config = AppConfig::from_vars(&vars(&[("PORT", "  "), ("AI_MODEL", "")])).unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.ai.model.is_none());
    }

    #[test]
    fn test_invalid_port_rejected() {
        let err = AppConfig::from_vars(&vars(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_secrets_not_serialized() {
        let config = AppConfig::from_vars(&vars(&[
            ("AI_API_KEY", "secret"),
            ("SPOTIFY_CLIENT_SECRET", "shh"),
        ]))
        .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains("shh"));
    }
}
