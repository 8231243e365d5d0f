use crate::config::{Provider, ProviderConfig};
use crate::core::error::VchatError;
use crate::providers::openai_style::OpenAiStyleClient;
use crate::providers::{Message, VisionProvider};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Alibaba Qwen-VL via the DashScope compatible-mode endpoint. Multi-part
/// content goes through unchanged.
#[derive(Clone, Debug)]
pub struct QwenProvider {
    inner: OpenAiStyleClient,
}

impl QwenProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, VchatError> {
        Ok(Self {
            inner: OpenAiStyleClient::from_config(Provider::Qwen, config, false)?,
        })
    }
}

#[async_trait]
impl VisionProvider for QwenProvider {
    fn name(&self) -> &'static str {
        "qwen"
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
