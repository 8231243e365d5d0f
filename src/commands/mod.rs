pub mod dispatcher;
pub mod handler;
pub mod registry;

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use futures::StreamExt;

use crate::config::Provider;
use crate::core::error::VchatError;
use crate::image;
use crate::providers::{Message, Role, VisionProvider};
use crate::registry::ModelRegistry;

pub use dispatcher::create_command_registry;

const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that can understand images and answer questions about them.";

/// Outcome of popping the newest conversation turn.
#[derive(Debug, PartialEq, Eq)]
pub enum TurnDeletion {
    /// Nothing beyond the system prompt; history untouched.
    Empty,
    Removed {
        role: Role,
        /// True when the removed message was an assistant reply and the
        /// preceding user turn can be popped as well.
        paired_available: bool,
    },
}

/// What a completed turn produced, so the caller knows how to render it.
#[derive(Debug)]
pub enum TurnOutput {
    /// Fragments were already forwarded to the sink while streaming.
    Streamed,
    /// Full reply from a non-streaming call, not yet rendered.
    Full(String),
}

/// The conversation and session toggles. Index 0 of `messages` is always
/// the system prompt; every mutation goes through the methods below.
pub struct ChatState {
    pub messages: Vec<Message>,
    pub registry: Arc<ModelRegistry>,
    pub active: Provider,
    pub streaming: bool,
    pub should_continue: bool,
    pub needs_response: bool,
}

impl ChatState {
    pub fn new(registry: Arc<ModelRegistry>, active: Provider, streaming: bool) -> Self {
        Self {
            messages: vec![Message::text(Role::System, SYSTEM_PROMPT)],
            registry,
            active,
            streaming,
            should_continue: true,
            needs_response: false,
        }
    }

    pub fn reset(&mut self) {
        self.messages = vec![Message::text(Role::System, SYSTEM_PROMPT)];
    }

    pub fn push_user_text(&mut self, text: &str) {
        self.messages.push(Message::text(Role::User, text));
    }

    pub fn push_assistant_text(&mut self, text: String) {
        self.messages.push(Message::text(Role::Assistant, text));
    }

    /// Encodes the image first; the history is only touched when the file
    /// could actually be read.
    pub fn push_image_turn(&mut self, path: &Path, prompt: &str) -> Result<(), VchatError> {
        let encoded = image::load_image(path)?;
        self.messages.push(Message::image_turn(
            encoded.mime_type,
            encoded.base64_data,
            prompt,
        ));
        Ok(())
    }

    pub fn toggle_streaming(&mut self) -> bool {
        self.streaming = !self.streaming;
        self.streaming
    }

    /// Validates the target through the registry before committing; on any
    /// failure the active provider and the history stay as they were.
    pub fn switch_provider(&mut self, provider: Provider, reset: bool) -> Result<(), VchatError> {
        self.registry.get(provider)?;
        self.active = provider;
        if reset {
            self.reset();
        }
        Ok(())
    }

    /// Pops the newest turn. The system prompt is never removed. A paired
    /// delete is only ever offered after popping an assistant reply that
    /// still has its user turn in front of it; removing a lone user message
    /// offers nothing.
    pub fn delete_last_turn(&mut self) -> TurnDeletion {
        if self.messages.len() <= 1 {
            return TurnDeletion::Empty;
        }
        let Some(removed) = self.messages.pop() else {
            return TurnDeletion::Empty;
        };

        let paired_available = removed.role == Role::Assistant
            && self.messages.len() > 1
            && self.messages.last().map(|m| m.role) == Some(Role::User);

        TurnDeletion::Removed {
            role: removed.role,
            paired_available,
        }
    }

    /// Second half of a paired delete; pops the user turn left exposed by
    /// `delete_last_turn`.
    pub fn delete_paired(&mut self) -> bool {
        if self.messages.len() > 1 && self.messages.last().map(|m| m.role) == Some(Role::User) {
            self.messages.pop();
            true
        } else {
            false
        }
    }

    /// Drives one chat call against `provider` and appends the assistant
    /// reply on success. The adapter sees an independent copy of the
    /// history. When streaming, every fragment is written to `sink` as it
    /// arrives and the accumulated text is appended afterwards; any failure
    /// leaves the history exactly as it was before the call.
    pub async fn complete_turn<W: Write>(
        &mut self,
        provider: &dyn VisionProvider,
        sink: &mut W,
    ) -> Result<TurnOutput, VchatError> {
        match self.messages.last() {
            None => return Err(VchatError::Input("conversation is empty".to_string())),
            Some(m) if m.role == Role::Assistant => {
                return Err(VchatError::Input(
                    "the last message is already an assistant reply".to_string(),
                ));
            }
            _ => {}
        }

        let snapshot = self.messages.clone();
        tracing::debug!(
            provider = provider.name(),
            messages = snapshot.len(),
            streaming = self.streaming,
            "dispatching chat request"
        );

        if self.streaming {
            let mut stream = provider.get_response_stream(&snapshot).await?;
            let mut accumulated = String::new();
            while let Some(fragment) = stream.next().await {
                let fragment = fragment?;
                sink.write_all(fragment.as_bytes())?;
                sink.flush()?;
                accumulated.push_str(&fragment);
            }
            self.push_assistant_text(accumulated);
            Ok(TurnOutput::Streamed)
        } else {
            let reply = provider.get_response(&snapshot).await?;
            self.push_assistant_text(reply.clone());
            Ok(TurnOutput::Full(reply))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ProviderConfig};
    use crate::providers::ContentPart;
    use std::fs;

    fn state() -> ChatState {
        ChatState::new(
            Arc::new(ModelRegistry::new(Config::default())),
            Provider::Qwen,
            false,
        )
    }

    fn state_with_credential(provider: Provider) -> ChatState {
        let mut config = Config::default();
        config.providers.insert(
            provider,
            ProviderConfig {
                api_key: Some("test-key".to_string()),
                ..Default::default()
            },
        );
        ChatState::new(Arc::new(ModelRegistry::new(config)), Provider::Qwen, false)
    }

    #[test]
    fn starts_with_only_the_system_prompt() {
        let state = state();
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].role, Role::System);
    }

    #[test]
    fn push_user_text_appends_one_single_part_message() {
        let mut state = state();
        state.push_user_text("hello");

        assert_eq!(state.messages.len(), 2);
        let message = &state.messages[1];
        assert_eq!(message.role, Role::User);
        assert_eq!(
            message.content,
            vec![ContentPart::Text {
                text: "hello".to_string()
            }]
        );
    }

    #[test]
    fn image_turn_is_image_first_then_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pic.dat");
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(b"pixels");
        fs::write(&path, &bytes).unwrap();

        let mut state = state();
        state.push_image_turn(&path, "what is shown?").unwrap();

        let message = &state.messages[1];
        assert_eq!(message.role, Role::User);
        assert_eq!(message.content.len(), 2);
        assert!(matches!(
            &message.content[0],
            ContentPart::Image { mime_type, .. } if mime_type == "image/png"
        ));
        assert_eq!(
            message.content[1],
            ContentPart::Text {
                text: "what is shown?".to_string()
            }
        );
    }

    #[test]
    fn unreadable_image_leaves_history_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state();
        let err = state
            .push_image_turn(&dir.path().join("missing.png"), "?")
            .unwrap_err();

        assert!(matches!(err, VchatError::Io { .. }));
        assert_eq!(state.messages.len(), 1);
    }

    #[test]
    fn delete_on_system_only_history_is_a_noop() {
        let mut state = state();
        assert_eq!(state.delete_last_turn(), TurnDeletion::Empty);
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].role, Role::System);
    }

    #[test]
    fn deleting_assistant_reply_offers_paired_delete() {
        let mut state = state();
        state.push_user_text("question");
        state.push_assistant_text("answer".to_string());

        let deletion = state.delete_last_turn();
        assert_eq!(
            deletion,
            TurnDeletion::Removed {
                role: Role::Assistant,
                paired_available: true
            }
        );
        assert_eq!(state.messages.len(), 2);

        assert!(state.delete_paired());
        assert_eq!(state.messages.len(), 1);
    }

    #[test]
    fn declining_paired_delete_removes_exactly_one() {
        let mut state = state();
        state.push_user_text("question");
        state.push_assistant_text("answer".to_string());

        state.delete_last_turn();
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].role, Role::User);
    }

    #[test]
    fn deleting_lone_user_turn_offers_no_pair() {
        let mut state = state();
        state.push_user_text("question");

        let deletion = state.delete_last_turn();
        assert_eq!(
            deletion,
            TurnDeletion::Removed {
                role: Role::User,
                paired_available: false
            }
        );
        assert_eq!(state.messages.len(), 1);
    }

    #[test]
    fn assistant_reply_with_no_user_before_it_offers_no_pair() {
        let mut state = state();
        state.push_assistant_text("orphan".to_string());

        let deletion = state.delete_last_turn();
        assert_eq!(
            deletion,
            TurnDeletion::Removed {
                role: Role::Assistant,
                paired_available: false
            }
        );
    }

    #[test]
    fn toggle_streaming_flips_and_leaves_history_alone() {
        let mut state = state();
        state.push_user_text("hi");
        assert!(state.toggle_streaming());
        assert!(!state.toggle_streaming());
        assert_eq!(state.messages.len(), 2);
    }

    #[test]
    fn switch_to_uncredentialed_provider_changes_nothing() {
        let mut state = state_with_credential(Provider::Qwen);
        state.push_user_text("hi");
        let before = state.messages.clone();

        let err = state.switch_provider(Provider::Glm, true).unwrap_err();
        assert!(matches!(err, VchatError::Config(_)));
        assert_eq!(state.active, Provider::Qwen);
        assert_eq!(state.messages, before);
    }

    #[test]
    fn successful_switch_commits_and_optionally_resets() {
        let mut state = state_with_credential(Provider::Glm);
        state.push_user_text("hi");

        state.switch_provider(Provider::Glm, false).unwrap();
        assert_eq!(state.active, Provider::Glm);
        assert_eq!(state.messages.len(), 2);

        state.switch_provider(Provider::Glm, true).unwrap();
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].role, Role::System);
    }

    #[test]
    fn reset_restores_the_initial_system_message() {
        let mut state = state();
        state.push_user_text("a");
        state.push_assistant_text("b".to_string());
        state.reset();

        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].role, Role::System);
    }
}
