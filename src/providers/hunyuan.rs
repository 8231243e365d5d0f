use crate::config::{Provider, ProviderConfig};
use crate::core::error::VchatError;
use crate::providers::openai_style::OpenAiStyleClient;
use crate::providers::{Message, VisionProvider};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Tencent Hunyuan Vision through its OpenAI-compatible gateway.
#[derive(Clone, Debug)]
pub struct HunyuanProvider {
    inner: OpenAiStyleClient,
}

impl HunyuanProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, VchatError> {
        Ok(Self {
            inner: OpenAiStyleClient::from_config(Provider::Hunyuan, config, false)?,
        })
    }
}

#[async_trait]
impl VisionProvider for HunyuanProvider {
    fn name(&self) -> &'static str {
        "hunyuan"
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
