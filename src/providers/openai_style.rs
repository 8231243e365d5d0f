//! Shared request/response mapping for the OpenAI-style chat-completion
//! dialect all supported vendors speak. Individual providers differ only in
//! endpoint, credential, and content-shape quirks.

use crate::config::{Provider, ProviderConfig};
use crate::core::error::VchatError;
use crate::providers::base_client::HttpClient;
use crate::providers::{ContentPart, Message};
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Serialize)]
pub(crate) struct WireMessage {
    role: &'static str,
    content: WireContent,
}

#[derive(Serialize)]
#[serde(untagged)]
pub(crate) enum WireContent {
    Text(String),
    Parts(Vec<WirePart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum WirePart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
pub(crate) struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct StreamResponse {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Deserialize, Default)]
struct StreamDelta {
    content: Option<String>,
}

/// Converts canonical messages into the vendor wire shape. With
/// `collapse_single_text`, a message whose content is one bare text part is
/// sent as a plain string instead of a one-element part array; multi-part
/// content always goes through as an array.
pub(crate) fn build_wire_messages(
    messages: &[Message],
    collapse_single_text: bool,
) -> Vec<WireMessage> {
    messages
        .iter()
        .map(|message| {
            let content = match message.content.as_slice() {
                [ContentPart::Text { text }] if collapse_single_text => {
                    WireContent::Text(text.clone())
                }
                parts => WireContent::Parts(parts.iter().map(wire_part).collect()),
            };
            WireMessage {
                role: message.role.as_str(),
                content,
            }
        })
        .collect()
}

fn wire_part(part: &ContentPart) -> WirePart {
    match part {
        ContentPart::Text { text } => WirePart::Text { text: text.clone() },
        ContentPart::Image {
            mime_type,
            base64_data,
        } => WirePart::ImageUrl {
            image_url: ImageUrl {
                url: format!("data:{};base64,{}", mime_type, base64_data),
            },
        },
    }
}

/// Extracts content deltas from SSE `data:` lines. Chunks without a delta
/// (role prologues, keep-alives, `[DONE]`) yield nothing; malformed JSON is
/// a hard error.
pub(crate) fn sse_delta_parser(data: String) -> Result<Option<String>, VchatError> {
    let mut content = String::new();

    for line in data.lines() {
        let Some(payload) = line.strip_prefix("data:") else {
            continue;
        };
        let payload = payload.trim();
        if payload.is_empty() || payload == "[DONE]" {
            continue;
        }

        let parsed: StreamResponse = serde_json::from_str(payload)
            .map_err(|e| VchatError::Serialization(format!("malformed stream chunk: {}", e)))?;
        if let Some(choice) = parsed.choices.first() {
            if let Some(text) = &choice.delta.content {
                content.push_str(text);
            }
        }
    }

    if content.is_empty() {
        Ok(None)
    } else {
        Ok(Some(content))
    }
}

#[derive(Clone, Debug)]
pub struct OpenAiStyleClient {
    client: HttpClient,
    model: String,
    collapse_single_text: bool,
}

impl OpenAiStyleClient {
    pub fn new(
        base_url: String,
        api_key: &str,
        model: String,
        collapse_single_text: bool,
    ) -> Result<Self, VchatError> {
        let auth_header = Some(("Authorization".to_string(), format!("Bearer {}", api_key)));
        Ok(Self {
            client: HttpClient::new(base_url, auth_header, None)?,
            model,
            collapse_single_text,
        })
    }

    /// Resolves endpoint, credential, and model for `provider`, refusing to
    /// construct without a usable API key.
    pub fn from_config(
        provider: Provider,
        config: &ProviderConfig,
        collapse_single_text: bool,
    ) -> Result<Self, VchatError> {
        let api_key = config.api_key.as_deref().map(str::trim).unwrap_or_default();
        if api_key.is_empty() {
            return Err(VchatError::Config(format!(
                "missing API key for provider '{}'; set {} or add providers.{}.api_key to the config file",
                provider,
                provider.env_key(),
                provider
            )));
        }

        let base_url = match config
            .base_url
            .clone()
            .or_else(|| provider.default_base_url().map(String::from))
        {
            Some(url) => url,
            None => {
                return Err(VchatError::Config(format!(
                    "provider '{}' requires providers.{}.base_url in the config file",
                    provider, provider
                )));
            }
        };

        let model = config
            .model
            .clone()
            .unwrap_or_else(|| provider.default_model().to_string());

        Self::new(base_url, api_key, model, collapse_single_text)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn get_response(&self, messages: &[Message]) -> Result<String, VchatError> {
        let payload = ChatCompletionRequest {
            model: self.model.clone(),
            messages: build_wire_messages(messages, self.collapse_single_text),
            stream: None,
        };

        let response = self.client.post("chat/completions", &payload).await?;
        let body = response.text().await?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&body)?;

        match parsed.choices.first() {
            Some(choice) => Ok(choice.message.content.trim().to_string()),
            None => Err(VchatError::Api("no choices in API response".to_string())),
        }
    }

    pub async fn get_response_stream(
        &self,
        messages: &[Message],
    ) -> Result<BoxStream<'static, Result<String, VchatError>>, VchatError> {
        let payload = ChatCompletionRequest {
            model: self.model.clone(),
            messages: build_wire_messages(messages, self.collapse_single_text),
            stream: Some(true),
        };

        let response = self.client.post("chat/completions", &payload).await?;
        self.client.stream_response(response, sse_delta_parser).await
    }
}
