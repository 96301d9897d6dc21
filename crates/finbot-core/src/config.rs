//! Environment-sourced configuration, loaded once at process start.
//!
//! There is no config file and no hot reload: every setting comes from
//! the environment, matching how the service is deployed (systemd unit
//! or container with an env file).

use crate::error::BotError;
use std::env;

/// Top-level finbot configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address for the webhook server.
    pub bind_addr: String,
    /// Path to the SQLite audit database.
    pub database_path: String,
    pub waha: WahaConfig,
    pub providers: ProviderConfig,
    pub backend: BackendConfig,
    /// Default country code prepended to bare local numbers.
    pub country_code: String,
}

/// WAHA chat-gateway settings.
#[derive(Debug, Clone)]
pub struct WahaConfig {
    /// Base URL of the WAHA instance (e.g. `http://localhost:3000`).
    pub base_url: String,
    /// API key sent as `X-Api-Key`.
    pub api_key: String,
    /// Session name used for sends and LID lookups.
    pub session: String,
}

/// Chat-completion provider settings.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub groq_api_key: String,
    pub openai_api_key: String,
    /// Primary model (Groq).
    pub primary_model: String,
    /// Fallback model (OpenAI), used on rate-limit/timeout only.
    pub fallback_model: String,
}

/// Backend REST API settings.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the finance backend (e.g. `http://localhost:8000`).
    pub base_url: String,
    /// Static API key sent as `X-API-Key`.
    pub api_key: String,
}

fn required(name: &str) -> Result<String, BotError> {
    env::var(name).map_err(|_| BotError::Config(format!("missing environment variable {name}")))
}

fn optional(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Load the configuration from the environment.
    ///
    /// Missing required variables produce a `BotError::Config` naming the
    /// variable, so a misconfigured deployment fails fast at startup.
    pub fn from_env() -> Result<Self, BotError> {
        Ok(Self {
            bind_addr: optional("BIND_ADDR", "0.0.0.0:8080"),
            database_path: optional("DATABASE_URL", "finbot.db"),
            waha: WahaConfig {
                base_url: required("WAHA_BASE_URL")?,
                api_key: required("WAHA_API_KEY")?,
                session: optional("WAHA_SESSION_NAME", "default"),
            },
            providers: ProviderConfig {
                groq_api_key: required("GROQ_API_KEY")?,
                openai_api_key: required("OPENAI_API_KEY")?,
                primary_model: optional("PRIMARY_MODEL", "llama-3.3-70b-versatile"),
                fallback_model: optional("FALLBACK_MODEL", "gpt-5-mini"),
            },
            backend: BackendConfig {
                base_url: optional("API_BASE_URL", "http://localhost:8000"),
                api_key: required("BOT_API_KEY")?,
            },
            country_code: optional("COUNTRY_CODE", "55"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var tests mutate process state; keep them in one test to avoid
    // interference under parallel execution.
    #[test]
    fn test_from_env_missing_and_complete() {
        let keys = [
            "WAHA_BASE_URL",
            "WAHA_API_KEY",
            "GROQ_API_KEY",
            "OPENAI_API_KEY",
            "BOT_API_KEY",
        ];
        for k in keys {
            env::remove_var(k);
        }

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("WAHA_BASE_URL"));

        env::set_var("WAHA_BASE_URL", "http://localhost:3000");
        env::set_var("WAHA_API_KEY", "waha-key");
        env::set_var("GROQ_API_KEY", "groq-key");
        env::set_var("OPENAI_API_KEY", "openai-key");
        env::set_var("BOT_API_KEY", "bot-key");

        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.waha.session, "default");
        assert_eq!(cfg.backend.base_url, "http://localhost:8000");
        assert_eq!(cfg.country_code, "55");
        assert_eq!(cfg.providers.primary_model, "llama-3.3-70b-versatile");

        for k in keys {
            env::remove_var(k);
        }
    }
}
