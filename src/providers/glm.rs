use crate::config::{Provider, ProviderConfig};
use crate::core::error::VchatError;
use crate::providers::openai_style::OpenAiStyleClient;
use crate::providers::{Message, VisionProvider};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// ZhipuAI GLM-4V. The open platform accepts the OpenAI content-part array
/// as-is, images included.
#[derive(Clone, Debug)]
pub struct GlmProvider {
    inner: OpenAiStyleClient,
}

impl GlmProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, VchatError> {
        Ok(Self {
            inner: OpenAiStyleClient::from_config(Provider::Glm, config, false)?,
        })
    }
}

#[async_trait]
impl VisionProvider for GlmProvider {
    fn name(&self) -> &'static str {
        "glm"
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
