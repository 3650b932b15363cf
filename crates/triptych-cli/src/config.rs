use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

use triptych_core::providers::{ProviderId, ProviderSpec};

/// Top-level configuration.
///
/// Holds no credentials: HTTP callers supply keys per request, and the
/// one-shot `compare` command reads them from the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TriptychConfig {
    pub server: ServerConfig,
    pub compare: CompareConfig,
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8787".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Per-provider deadline in milliseconds
    pub timeout_ms: u64,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self { timeout_ms: 60_000 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub openai: EndpointConfig,
    pub deepseek: EndpointConfig,
    pub gemini: EndpointConfig,
}

/// Optional overrides on top of the built-in provider table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub base_url: Option<String>,
    pub model: Option<String>,
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("triptych")
}

impl TriptychConfig {
    /// Load the config file, or built-in defaults when none exists.
    ///
    /// An explicitly passed path must exist; the default location is
    /// optional because the config carries no secrets.
    pub fn load(custom_path: &Option<PathBuf>) -> Result<Self> {
        let path = match custom_path {
            Some(path) => path.clone(),
            None => {
                let path = config_dir().join("config.toml");
                if !path.exists() {
                    debug!("No config at {}, using defaults", path.display());
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    /// The provider table with config overrides applied
    pub fn provider_specs(&self) -> [ProviderSpec; 3] {
        let mut specs = ProviderSpec::defaults();
        for spec in &mut specs {
            let endpoint = match spec.id {
                ProviderId::Openai => &self.providers.openai,
                ProviderId::Deepseek => &self.providers.deepseek,
                ProviderId::Gemini => &self.providers.gemini,
            };
            if let Some(base_url) = &endpoint.base_url {
                spec.base_url = base_url.clone();
            }
            if let Some(model) = &endpoint.model {
                spec.default_model = model.clone();
            }
        }
        specs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = TriptychConfig::default();
        assert_eq!(cfg.server.bind, "127.0.0.1:8787");
        assert_eq!(cfg.compare.timeout_ms, 60_000);
        assert_eq!(cfg.providers.openai.base_url, None);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let cfg: TriptychConfig = toml::from_str(
            r#"
            [server]
            bind = "0.0.0.0:9000"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.bind, "0.0.0.0:9000");
        assert_eq!(cfg.compare.timeout_ms, 60_000);
    }

    #[test]
    fn test_shipped_default_config_parses_to_defaults() {
        let cfg: TriptychConfig =
            toml::from_str(include_str!("../../../config/default.toml")).unwrap();
        assert_eq!(cfg.server.bind, TriptychConfig::default().server.bind);
        assert_eq!(cfg.compare.timeout_ms, 60_000);
    }

    #[test]
    fn test_provider_specs_without_overrides() {
        let specs = TriptychConfig::default().provider_specs();
        assert_eq!(specs[0].base_url, "https://api.openai.com");
        assert_eq!(specs[1].default_model, "deepseek-chat");
        assert_eq!(specs[2].base_url, "https://generativelanguage.googleapis.com");
    }

    #[test]
    fn test_provider_specs_applies_overrides() {
        let cfg: TriptychConfig = toml::from_str(
            r#"
            [providers.openai]
            base_url = "http://localhost:11434"
            model = "llama3"

            [providers.gemini]
            model = "gemini-1.5-pro"
            "#,
        )
        .unwrap();

        let specs = cfg.provider_specs();
        assert_eq!(specs[0].base_url, "http://localhost:11434");
        assert_eq!(specs[0].default_model, "llama3");
        assert_eq!(specs[1].base_url, "https://api.deepseek.com");
        assert_eq!(specs[2].default_model, "gemini-1.5-pro");
    }

    #[test]
    fn test_config_round_trip() {
        let cfg = TriptychConfig::default();
        let serialized = toml::to_string_pretty(&cfg).unwrap();
        let parsed: TriptychConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.server.bind, cfg.server.bind);
        assert_eq!(parsed.compare.timeout_ms, cfg.compare.timeout_ms);
    }
}
