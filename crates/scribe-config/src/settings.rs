//! Process settings and API credential lookup.

use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::debug;

use crate::ConfigError;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Settings read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub bind_addr: SocketAddr,
    /// Model shared by every model-backed agent.
    pub model: String,
    /// Alternative OpenAI-compatible endpoint.
    pub api_base: Option<String>,
    /// JSON chat definition replacing the built-in one.
    pub chat_config: Option<PathBuf>,
}

impl ServerSettings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidSetting {
                var: "BIND_ADDR".into(),
                message: format!("'{}': {}", bind, e),
            })?;

        let settings = Self {
            bind_addr,
            model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: get("LLM_API_BASE"),
            chat_config: get("CHAT_CONFIG").map(PathBuf::from),
        };
        debug!("Server settings: {:?}", settings);
        Ok(settings)
    }
}

/// Source of the model-provider API key.
///
/// Consulted on every request so a missing key is reported per request
/// rather than at startup.
pub trait CredentialProvider: Send + Sync {
    /// Name of the variable the key is expected in, for error messages.
    fn name(&self) -> &str;

    /// Returns the key, or `None` when it is unset or empty.
    fn api_key(&self) -> Option<String>;
}

/// Reads the key from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialProvider for EnvCredentials {
    fn name(&self) -> &str {
        &self.var
    }

    fn api_key(&self) -> Option<String> {
        std::env::var(&self.var).ok().filter(|v| !v.is_empty())
    }
}

/// A fixed key, or none at all.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    name: String,
    key: Option<String>,
}

impl StaticCredentials {
    pub fn new(name: impl Into<String>, key: Option<&str>) -> Self {
        Self {
            name: name.into(),
            key: key.map(String::from),
        }
    }
}

impl CredentialProvider for StaticCredentials {
    fn name(&self) -> &str {
        &self.name
    }

    fn api_key(&self) -> Option<String> {
        self.key.clone().filter(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let settings = ServerSettings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings.bind_addr, "0.0.0.0:5000".parse().unwrap());
        assert_eq!(settings.model, "gpt-4");
        assert!(settings.api_base.is_none());
        assert!(settings.chat_config.is_none());
    }

    #[test]
    fn reads_overrides() {
        let settings = ServerSettings::from_lookup(lookup(&[
            ("BIND_ADDR", "127.0.0.1:8000"),
            ("LLM_MODEL", "claude-sonnet-4-5-20250929"),
            ("LLM_API_BASE", "http://localhost:11434/v1"),
            ("CHAT_CONFIG", "chats/analyze.json"),
        ]))
        .unwrap();

        assert_eq!(settings.bind_addr.port(), 8000);
        assert_eq!(settings.model, "claude-sonnet-4-5-20250929");
        assert_eq!(settings.api_base.as_deref(), Some("http://localhost:11434/v1"));
        assert_eq!(settings.chat_config, Some(PathBuf::from("chats/analyze.json")));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let settings = ServerSettings::from_lookup(lookup(&[("LLM_MODEL", "  ")])).unwrap();
        assert_eq!(settings.model, DEFAULT_MODEL);
    }

    #[test]
    fn invalid_bind_addr_is_rejected() {
        let err = ServerSettings::from_lookup(lookup(&[("BIND_ADDR", "not-an-addr")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSetting { ref var, .. } if var == "BIND_ADDR"));
    }

    #[test]
    fn static_credentials_treat_empty_as_missing() {
        assert_eq!(StaticCredentials::new("OPENAI_API_KEY", Some("sk-1")).api_key().as_deref(), Some("sk-1"));
        assert!(StaticCredentials::new("OPENAI_API_KEY", Some("")).api_key().is_none());
        assert!(StaticCredentials::new("OPENAI_API_KEY", None).api_key().is_none());
    }
}
