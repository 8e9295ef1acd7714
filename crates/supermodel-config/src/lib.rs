//! Runtime configuration loaded from the environment.
//!
//! All settings have working defaults so the server starts with no
//! configuration at all; only live LLM calls need `PERPLEXITY_API_KEY`.
//! `.env` loading (dotenvy) happens in the binary before [`ServerConfig::from_env`]
//! is called.

use std::env;

use tracing::warn;

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address the HTTP server binds to.
    pub bind_addr: String,
    /// Path of the SQLite database file.
    pub database_path: String,
    /// Perplexity API key. `None` disables live LLM calls.
    pub api_key: Option<String>,
    /// Chat-completions model identifier.
    pub model: String,
    /// Exact origin allowed by CORS.
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".into(),
            database_path: "data/supermodel.db".into(),
            api_key: None,
            model: "sonar-pro".into(),
            cors_origin: "http://localhost:3000".into(),
        }
    }
}

impl ServerConfig {
    /// Reads configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let api_key = env::var("PERPLEXITY_API_KEY").ok().filter(|k| !k.is_empty());
        if api_key.is_none() {
            warn!("PERPLEXITY_API_KEY not set; ask requests will be answered as unsupported");
        }

        Self {
            bind_addr: env_or("SUPERMODEL_ADDR", &defaults.bind_addr),
            database_path: env_or("DATABASE_URL", &defaults.database_path),
            api_key,
            model: env_or("PERPLEXITY_MODEL", &defaults.model),
            cors_origin: env_or("CORS_ORIGIN", &defaults.cors_origin),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).ok().filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8000");
        assert_eq!(cfg.database_path, "data/supermodel.db");
        assert_eq!(cfg.model, "sonar-pro");
        assert_eq!(cfg.cors_origin, "http://localhost:3000");
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn env_or_ignores_empty_values() {
        assert_eq!(env_or("SUPERMODEL_TEST_UNSET_VAR", "fallback"), "fallback");
    }
}
