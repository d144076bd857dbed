use serde::Deserialize;
use std::env;

use reservas_core::{BookingRules, Identity};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub identity: Identity,
    #[serde(default)]
    pub booking: BookingRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// API host every remote call is made against, e.g. `https://host/api`.
    pub base_url: String,
    /// Bearer token handed over by the external auth client, if any.
    pub auth_token: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 { 30 }

/// Development passthrough: `{prefix}/x` is forwarded to `{target}/x`.
#[derive(Debug, Deserialize, Clone)]
pub struct ProxyConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    pub target: Option<String>,
}

fn default_prefix() -> String { "/api".to_string() }

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            target: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides are optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Machine-local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `RESERVAS__BACKEND__BASE_URL=https://...`
            .add_source(config::Environment::with_prefix("RESERVAS").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Same layering without files, for tests and embedding.
    pub fn from_toml(raw: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_fills_defaults() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 8080

            [backend]
            base_url = "https://qareservas.example.edu/api"
            "#,
        )
        .expect("Failed to parse config");

        assert_eq!(config.backend.timeout_seconds, 30);
        assert_eq!(config.proxy.prefix, "/api");
        assert!(config.proxy.target.is_none());
        assert_eq!(config.identity.id, "U001");
        assert_eq!(config.booking.first_hour, 7);
        assert_eq!(config.booking.last_hour, 21);
        assert_eq!(config.booking.period_resource_types, vec!["Sala de reuniones"]);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 9000

            [backend]
            base_url = "http://localhost:4000"
            auth_token = "abc"

            [identity]
            id = "U777"
            name = "Ana"
            email = "ana@example.com"

            [booking]
            page_size = 12
            "#,
        )
        .expect("Failed to parse config");

        assert_eq!(config.backend.auth_token.as_deref(), Some("abc"));
        assert_eq!(config.identity.name, "Ana");
        assert_eq!(config.booking.page_size, 12);
        assert_eq!(config.booking.default_comment, "Reserva realizada desde el sistema");
    }
}
