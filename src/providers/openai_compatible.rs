use crate::config::{Provider, ProviderConfig};
use crate::core::error::VchatError;
use crate::providers::openai_style::OpenAiStyleClient;
use crate::providers::{Message, VisionProvider};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Escape hatch for any self-hosted or third-party OpenAI-compatible
/// endpoint. There is no default base URL; it must be configured.
#[derive(Clone, Debug)]
pub struct OpenAiCompatibleProvider {
    inner: OpenAiStyleClient,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, VchatError> {
        Ok(Self {
            inner: OpenAiStyleClient::from_config(Provider::Custom, config, false)?,
        })
    }
}

#[async_trait]
impl VisionProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &'static str {
        "custom"
    }

    async fn get_response(&self, messages: &[Message]) -> Result<String, VchatError> {
        self.inner.get_response(messages).await
    }

    async fn get_response_stream(
        &self,
        messages: &[Message],
    ) -> Result<BoxStream<'static, Result<String, VchatError>>, VchatError> {
        self.inner.get_response_stream(messages).await
    }
}
