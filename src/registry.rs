use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::{Config, Provider};
use crate::core::error::VchatError;
use crate::providers::VisionProvider;
use crate::providers::doubao::DoubaoProvider;
use crate::providers::glm::GlmProvider;
use crate::providers::hunyuan::HunyuanProvider;
use crate::providers::openai_compatible::OpenAiCompatibleProvider;
use crate::providers::qwen::QwenProvider;

/// Process-wide cache of provider adapters. Each adapter is constructed on
/// first lookup and lives until exit; there is no invalidation, so changing
/// a credential requires a restart.
pub struct ModelRegistry {
    config: Config,
    instances: Mutex<HashMap<Provider, Arc<dyn VisionProvider>>>,
}

impl ModelRegistry {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// Providers usable in this session, in declaration order. `custom`
    /// only shows up once the config file gives it an endpoint.
    pub fn list(&self) -> Vec<Provider> {
        Provider::ALL
            .into_iter()
            .filter(|p| {
                p.default_base_url().is_some() || self.config.provider_config(*p).base_url.is_some()
            })
            .collect()
    }

    pub fn model_of(&self, provider: Provider) -> String {
        self.config
            .provider_config(provider)
            .model
            .unwrap_or_else(|| provider.default_model().to_string())
    }

    pub fn get(&self, provider: Provider) -> Result<Arc<dyn VisionProvider>, VchatError> {
        let mut instances = self.instances.lock().unwrap();
        if let Some(instance) = instances.get(&provider) {
            return Ok(Arc::clone(instance));
        }

        let section = self.config.provider_config(provider);
        let instance: Arc<dyn VisionProvider> = match provider {
            Provider::Qwen => Arc::new(QwenProvider::new(&section)?),
            Provider::Glm => Arc::new(GlmProvider::new(&section)?),
            Provider::Hunyuan => Arc::new(HunyuanProvider::new(&section)?),
            Provider::Doubao => Arc::new(DoubaoProvider::new(&section)?),
            Provider::Custom => Arc::new(OpenAiCompatibleProvider::new(&section)?),
        };
        tracing::debug!(provider = %provider, model = %self.model_of(provider), "instantiated adapter");

        instances.insert(provider, Arc::clone(&instance));
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;

    fn config_with_key(provider: Provider) -> Config {
        let mut config = Config::default();
        config.providers.insert(
            provider,
            ProviderConfig {
                api_key: Some("test-key".to_string()),
                ..Default::default()
            },
        );
        config
    }

    #[test]
    fn caches_one_instance_per_provider() {
        let registry = ModelRegistry::new(config_with_key(Provider::Qwen));
        let first = registry.get(Provider::Qwen).unwrap();
        let second = registry.get(Provider::Qwen).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn missing_credential_names_provider_and_env_var() {
        let registry = ModelRegistry::new(Config::default());
        let err = registry.get(Provider::Glm).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("glm"));
        assert!(message.contains("ZHIPUAI_API_KEY"));
    }

    #[test]
    fn custom_requires_configured_endpoint() {
        let registry = ModelRegistry::new(config_with_key(Provider::Custom));
        let err = registry.get(Provider::Custom).unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn listing_excludes_endpointless_custom() {
        let registry = ModelRegistry::new(Config::default());
        let listed = registry.list();
        assert_eq!(
            listed,
            vec![
                Provider::Qwen,
                Provider::Glm,
                Provider::Hunyuan,
                Provider::Doubao
            ]
        );
    }

    #[test]
    fn listing_includes_custom_once_configured() {
        let mut config = Config::default();
        config.providers.insert(
            Provider::Custom,
            ProviderConfig {
                api_key: Some("k".to_string()),
                base_url: Some("https://example.test/v1".to_string()),
                ..Default::default()
            },
        );
        let registry = ModelRegistry::new(config);
        assert!(registry.list().contains(&Provider::Custom));
    }

    #[test]
    fn model_of_prefers_configured_model() {
        let mut config = config_with_key(Provider::Doubao);
        config
            .providers
            .get_mut(&Provider::Doubao)
            .unwrap()
            .model = Some("doubao-custom".to_string());
        let registry = ModelRegistry::new(config);
        assert_eq!(registry.model_of(Provider::Doubao), "doubao-custom");
        assert_eq!(
            registry.model_of(Provider::Qwen),
            Provider::Qwen.default_model()
        );
    }
}
