use std::fmt;

use crate::error::RelayError;

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_PROVIDER_URL: &str = "https://api.openai.com/v1";

#[derive(Clone)]
pub struct RelayConfig {
    pub port: u16,
    pub api_key: String,
    pub model: String,
    pub provider_base_url: String,
}

impl RelayConfig {
    /// Read `PORT`, `OPENAI_API_KEY`, `OPENAI_MODEL` and `OPENAI_BASE_URL`.
    pub fn from_env() -> Result<Self, RelayError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| RelayError::ConfigError {
                message: format!("Invalid PORT: {}", raw),
            })?,
            None => DEFAULT_PORT,
        };

        let api_key = lookup("OPENAI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| RelayError::ConfigError {
                message: "OPENAI_API_KEY environment variable is required".to_string(),
            })?;

        let model = lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let provider_base_url = lookup("OPENAI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_PROVIDER_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            port,
            api_key,
            model,
            provider_base_url,
        })
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("port", &self.port)
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("provider_base_url", &self.provider_base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = RelayConfig::from_lookup(lookup_from(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.provider_base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn overrides_are_honoured() {
        let config = RelayConfig::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("PORT", "8081"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("OPENAI_BASE_URL", "http://localhost:9000/v1/"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8081);
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.provider_base_url, "http://localhost:9000/v1");
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let err = RelayConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, RelayError::ConfigError { .. }));
    }

    #[test]
    fn bad_port_is_a_config_error() {
        let err = RelayConfig::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("PORT", "forty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("Invalid PORT"));
    }

    #[test]
    fn debug_redacts_key() {
        let config = RelayConfig::from_lookup(lookup_from(&[("OPENAI_API_KEY", "sk-secret")])).unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("sk-secret"));
    }
}
