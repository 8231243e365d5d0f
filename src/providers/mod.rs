use crate::core::error::VchatError;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

pub mod base_client;
pub mod doubao;
pub mod glm;
pub mod hunyuan;
pub mod openai_compatible;
pub mod openai_style;
pub mod qwen;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One entry of a message body. Providers receive parts in order; an image
/// turn is always an image part followed by the accompanying question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    Image { mime_type: String, base64_data: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentPart>,
}

impl Message {
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: vec![ContentPart::Text { text: text.into() }],
        }
    }

    /// User turn carrying an image: image part first, question second.
    pub fn image_turn(
        mime_type: impl Into<String>,
        base64_data: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::User,
            content: vec![
                ContentPart::Image {
                    mime_type: mime_type.into(),
                    base64_data: base64_data.into(),
                },
                ContentPart::Text {
                    text: prompt.into(),
                },
            ],
        }
    }
}

/// Uniform contract over the vendor chat-completion APIs. Implementations
/// are stateless across calls; the caller owns the conversation history and
/// appends results itself.
#[async_trait]
pub trait VisionProvider: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &'static str;

    async fn get_response(&self, messages: &[Message]) -> Result<String, VchatError>;

    /// Finite, forward-only sequence of text fragments, terminated when the
    /// vendor signals end of turn. Not restartable.
    async fn get_response_stream(
        &self,
        messages: &[Message],
    ) -> Result<BoxStream<'static, Result<String, VchatError>>, VchatError>;
}
