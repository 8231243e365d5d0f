use crate::core::error::VchatError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Qwen,
    Glm,
    Hunyuan,
    Doubao,
    Custom,
}

impl Provider {
    /// Declaration order doubles as the stable listing order.
    pub const ALL: [Provider; 5] = [
        Provider::Qwen,
        Provider::Glm,
        Provider::Hunyuan,
        Provider::Doubao,
        Provider::Custom,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "qwen" | "qwen-vl" => Some(Provider::Qwen),
            "glm" | "glm-4v" => Some(Provider::Glm),
            "hunyuan" | "hunyuan-vision" => Some(Provider::Hunyuan),
            "doubao" => Some(Provider::Doubao),
            "custom" => Some(Provider::Custom),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Qwen => "qwen",
            Provider::Glm => "glm",
            Provider::Hunyuan => "hunyuan",
            Provider::Doubao => "doubao",
            Provider::Custom => "custom",
        }
    }

    /// `Custom` has no default endpoint; it must come from the config file.
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Provider::Qwen => Some("https://dashscope.aliyuncs.com/compatible-mode/v1"),
            Provider::Glm => Some("https://open.bigmodel.cn/api/paas/v4"),
            Provider::Hunyuan => Some("https://api.hunyuan.cloud.tencent.com/v1"),
            Provider::Doubao => Some("https://ark.cn-beijing.volces.com/api/v3"),
            Provider::Custom => None,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Qwen => "qwen-vl-max-latest",
            Provider::Glm => "glm-4v-plus",
            Provider::Hunyuan => "hunyuan-vision",
            Provider::Doubao => "doubao-1-5-vision-pro-32k-250115",
            Provider::Custom => "gpt-4o",
        }
    }

    /// Environment variable consulted when the config file carries no key.
    pub fn env_key(&self) -> &'static str {
        match self {
            Provider::Qwen => "ALIYUN_BAILIAN_API_KEY",
            Provider::Glm => "ZHIPUAI_API_KEY",
            Provider::Hunyuan => "HUNYUAN_API_KEY",
            Provider::Doubao => "ARK_API_KEY",
            Provider::Custom => "VCHAT_CUSTOM_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn parse_provider(name: &str) -> Result<Provider, VchatError> {
    Provider::from_str(name).ok_or_else(|| {
        let available = Provider::ALL
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        VchatError::Config(format!(
            "unknown provider '{}'; available providers: {}",
            name, available
        ))
    })
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Config {
    pub active_provider: Option<Provider>,
    #[serde(default)]
    pub stream: bool,
    #[serde(default)]
    pub providers: HashMap<Provider, ProviderConfig>,
}

impl Config {
    fn config_dir() -> PathBuf {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join(".vchat").join("config.yaml")
    }

    /// Loads `~/.vchat/config.yaml`, creating a default file on first run,
    /// then fills missing API keys from the per-provider environment
    /// variables. The result is fixed for the process lifetime.
    pub fn load() -> Result<Config, VchatError> {
        let path = Self::config_path();

        let mut config = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            serde_yml::from_str::<Config>(&contents)
                .map_err(|e| VchatError::Config(format!("parse {}: {}", path.display(), e)))?
        } else {
            let config = Config::default();
            let _ = config.save();
            config
        };

        config.apply_env();
        Ok(config)
    }

    pub fn save(&self) -> Result<(), VchatError> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let yaml_content = serde_yml::to_string(self)?;
        fs::write(&path, yaml_content)?;
        Ok(())
    }

    /// Resolved per-provider section; absent providers fall back to defaults.
    pub fn provider_config(&self, provider: Provider) -> ProviderConfig {
        self.providers.get(&provider).cloned().unwrap_or_default()
    }

    fn apply_env(&mut self) {
        for provider in Provider::ALL {
            let entry = self.providers.entry(provider).or_default();
            let missing = entry
                .api_key
                .as_deref()
                .map(str::trim)
                .is_none_or(str::is_empty);
            if missing {
                if let Ok(key) = env::var(provider.env_key()) {
                    if !key.trim().is_empty() {
                        entry.api_key = Some(key);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_round_trip() {
        for provider in Provider::ALL {
            assert_eq!(Provider::from_str(provider.as_str()), Some(provider));
        }
    }

    #[test]
    fn provider_aliases_resolve() {
        assert_eq!(Provider::from_str("qwen-vl"), Some(Provider::Qwen));
        assert_eq!(Provider::from_str("GLM-4V"), Some(Provider::Glm));
        assert_eq!(Provider::from_str("hunyuan-vision"), Some(Provider::Hunyuan));
    }

    #[test]
    fn unknown_provider_error_lists_available() {
        let err = parse_provider("nope").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("nope"));
        assert!(message.contains("qwen"));
        assert!(message.contains("doubao"));
    }

    #[test]
    fn custom_has_no_default_endpoint() {
        assert!(Provider::Custom.default_base_url().is_none());
        for provider in [Provider::Qwen, Provider::Glm, Provider::Hunyuan, Provider::Doubao] {
            assert!(provider.default_base_url().is_some());
        }
    }

    #[test]
    fn provider_config_defaults_when_absent() {
        let config = Config::default();
        let section = config.provider_config(Provider::Qwen);
        assert!(section.api_key.is_none());
        assert!(section.base_url.is_none());
        assert!(section.model.is_none());
    }
}
