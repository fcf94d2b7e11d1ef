//! Configuration management
//!
//! This module handles loading and parsing configuration for the Vitrine service.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// GitHub provider configuration
    #[serde(default)]
    pub github: GitHubConfig,
    /// AI completion provider configuration
    #[serde(default)]
    pub ai: AiConfig,
    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin (for cookie-based auth)
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Database configuration (SQLite)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file path or connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/vitrine.db".to_string()
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Upper bound for cache entry TTLs in seconds
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_cache_ttl(),
        }
    }
}

fn default_cache_ttl() -> u64 {
    3600
}

/// GitHub provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Account whose repositories are showcased
    #[serde(default = "default_github_username")]
    pub username: String,
    /// API base URL (overridable for tests)
    #[serde(default = "default_github_api_base")]
    pub api_base: String,
    /// Optional personal access token (raises rate limits)
    #[serde(default)]
    pub token: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            username: default_github_username(),
            api_base: default_github_api_base(),
            token: None,
        }
    }
}

fn default_github_username() -> String {
    "octocat".to_string()
}

fn default_github_api_base() -> String {
    "https://api.github.com".to_string()
}

/// AI completion provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// API base URL (OpenRouter-compatible)
    #[serde(default = "default_ai_api_base")]
    pub api_base: String,
    /// API key for the provider
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model identifier
    #[serde(default = "default_ai_model")]
    pub model: String,
    /// Maximum tokens for summary completions
    #[serde(default = "default_ai_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature for summary completions
    #[serde(default = "default_ai_temperature")]
    pub temperature: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_base: default_ai_api_base(),
            api_key: None,
            model: default_ai_model(),
            max_tokens: default_ai_max_tokens(),
            temperature: default_ai_temperature(),
        }
    }
}

fn default_ai_api_base() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_ai_model() -> String {
    "mistralai/mistral-small-24b-instruct-2501:free".to_string()
}

fn default_ai_max_tokens() -> u32 {
    250
}

fn default_ai_temperature() -> f32 {
    0.8
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Session lifetime in days
    #[serde(default = "default_session_days")]
    pub session_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_days: default_session_days(),
        }
    }
}

fn default_session_days() -> i64 {
    7
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// If the file does not exist, returns the default configuration so a
    /// fresh checkout can run without any setup.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::warn!("Config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file {:?}: {}", path, e))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file {:?}: {}", path, e))?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("VITRINE_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("VITRINE_SERVER_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(cors_origin) = std::env::var("VITRINE_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }
        if let Ok(url) = std::env::var("VITRINE_DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(ttl) = std::env::var("VITRINE_CACHE_TTL_SECONDS") {
            if let Ok(ttl) = ttl.parse() {
                self.cache.ttl_seconds = ttl;
            }
        }
        if let Ok(username) = std::env::var("VITRINE_GITHUB_USERNAME") {
            self.github.username = username;
        }
        if let Ok(token) = std::env::var("VITRINE_GITHUB_TOKEN") {
            self.github.token = Some(token);
        }
        if let Ok(key) = std::env::var("VITRINE_AI_API_KEY") {
            self.ai.api_key = Some(key);
        }
        if let Ok(model) = std::env::var("VITRINE_AI_MODEL") {
            self.ai.model = model;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // Shared mutex for all config tests that modify environment variables.
    // Rust runs tests in parallel, and env vars are process-global.
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn clear_env() {
        for var in [
            "VITRINE_SERVER_HOST",
            "VITRINE_SERVER_PORT",
            "VITRINE_SERVER_CORS_ORIGIN",
            "VITRINE_DATABASE_URL",
            "VITRINE_CACHE_TTL_SECONDS",
            "VITRINE_GITHUB_USERNAME",
            "VITRINE_GITHUB_TOKEN",
            "VITRINE_AI_API_KEY",
            "VITRINE_AI_MODEL",
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.url, "data/vitrine.db");
        assert_eq!(config.ai.max_tokens, 250);
        assert_eq!(config.auth.session_days, 7);
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let config = Config::load(std::path::Path::new("does-not-exist.yml")).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_load_partial_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "server:\n  port: 9090\ngithub:\n  username: someone"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.github.username, "someone");
        assert_eq!(config.github.api_base, "https://api.github.com");
    }

    #[test]
    fn test_env_overrides() {
        let _guard = lock_env();
        clear_env();

        std::env::set_var("VITRINE_SERVER_PORT", "3001");
        std::env::set_var("VITRINE_GITHUB_TOKEN", "ghp_test");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.server.port, 3001);
        assert_eq!(config.github.token.as_deref(), Some("ghp_test"));

        clear_env();
    }

    #[test]
    fn test_env_override_invalid_port_ignored() {
        let _guard = lock_env();
        clear_env();

        std::env::set_var("VITRINE_SERVER_PORT", "not-a-port");

        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.server.port, 8080);

        clear_env();
    }
}
