use crate::config::{Provider, ProviderConfig};
use crate::core::error::VchatError;
use crate::providers::openai_style::OpenAiStyleClient;
use crate::providers::{Message, VisionProvider};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Volcengine Doubao (Ark). Ark rejects a one-element content array on
/// text-only turns, so single-text messages are collapsed to a bare string;
/// multimodal turns pass through as part arrays.
#[derive(Clone, Debug)]
pub struct DoubaoProvider {
    inner: OpenAiStyleClient,
}

impl DoubaoProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, VchatError> {
        Ok(Self {
            inner: OpenAiStyleClient::from_config(Provider::Doubao, config, true)?,
        })
    }
}

#[async_trait]
impl VisionProvider for DoubaoProvider {
    fn name(&self) -> &'static str {
        "doubao"
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
