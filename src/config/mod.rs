use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-5";

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub rate_limit_window_secs: u64,
    pub rate_limit_requests: u32,
    pub quota_sweep_interval_secs: u64,
    pub anthropic_api_key: Option<String>,
    pub anthropic_base_url: String,
    pub anthropic_model: String,
    pub anthropic_max_tokens: u32,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_host: "0.0.0.0".into(),
            server_port: 3002,
            api_base_uri: "/api".into(),
            rate_limit_window_secs: 3600,
            rate_limit_requests: 10,
            quota_sweep_interval_secs: 300,
            anthropic_api_key: None,
            anthropic_base_url: DEFAULT_ANTHROPIC_BASE_URL.into(),
            anthropic_model: DEFAULT_ANTHROPIC_MODEL.into(),
            anthropic_max_tokens: 1024,
            database_url: None,
            redis_url: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源构建配置，缺失或无法解析的数值回退到默认值
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let optional = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Config {
            server_host: optional("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_or(&lookup, "SERVER_PORT", defaults.server_port),
            api_base_uri: optional("API_BASE_URI").unwrap_or(defaults.api_base_uri),
            rate_limit_window_secs: parse_or(&lookup, "RATE_LIMIT_WINDOW", defaults.rate_limit_window_secs),
            rate_limit_requests: parse_or(&lookup, "RATE_LIMIT_REQUESTS", defaults.rate_limit_requests),
            quota_sweep_interval_secs: parse_or(
                &lookup,
                "QUOTA_SWEEP_INTERVAL",
                defaults.quota_sweep_interval_secs,
            ),
            anthropic_api_key: optional("ANTHROPIC_API_KEY"),
            anthropic_base_url: optional("ANTHROPIC_BASE_URL").unwrap_or(defaults.anthropic_base_url),
            anthropic_model: optional("ANTHROPIC_MODEL").unwrap_or(defaults.anthropic_model),
            anthropic_max_tokens: parse_or(&lookup, "ANTHROPIC_MAX_TOKENS", defaults.anthropic_max_tokens),
            database_url: optional("DATABASE_URL"),
            redis_url: optional("REDIS_URL"),
        }
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn quota_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.quota_sweep_interval_secs.max(1))
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default {default}");
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_reference_deployment() {
        let config = config_from(&[]);
        assert_eq!(config.rate_limit_requests, 10);
        assert_eq!(config.rate_limit_window(), Duration::from_secs(3600));
        assert_eq!(config.server_port, 3002);
        assert_eq!(config.api_base_uri, "/api");
        assert!(config.anthropic_api_key.is_none());
        assert!(config.database_url.is_none());
        assert!(config.redis_url.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("RATE_LIMIT_REQUESTS", "3"),
            ("RATE_LIMIT_WINDOW", "60"),
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("DATABASE_URL", "postgres://localhost/tweets"),
        ]);
        assert_eq!(config.rate_limit_requests, 3);
        assert_eq!(config.rate_limit_window_secs, 60);
        assert_eq!(config.anthropic_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/tweets"));
    }

    #[test]
    fn bad_numbers_and_blank_strings_fall_back() {
        let config = config_from(&[
            ("SERVER_PORT", "not-a-port"),
            ("RATE_LIMIT_REQUESTS", "-1"),
            ("ANTHROPIC_API_KEY", "   "),
        ]);
        assert_eq!(config.server_port, 3002);
        assert_eq!(config.rate_limit_requests, 10);
        assert!(config.anthropic_api_key.is_none());
    }
}
