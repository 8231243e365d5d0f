//! End-to-end tests of the conversation flow against scripted providers.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};

use vchat::commands::{ChatState, TurnOutput};
use vchat::config::{Config, Provider};
use vchat::core::error::VchatError;
use vchat::providers::{ContentPart, Message, Role, VisionProvider};
use vchat::registry::ModelRegistry;

fn new_state(streaming: bool) -> ChatState {
    ChatState::new(
        Arc::new(ModelRegistry::new(Config::default())),
        Provider::Qwen,
        streaming,
    )
}

fn text_of(message: &Message) -> &str {
    match message.content.as_slice() {
        [ContentPart::Text { text }] => text,
        other => panic!("expected a single text part, got {:?}", other),
    }
}

/// Returns a fixed reply without streaming.
#[derive(Debug)]
struct ScriptedProvider {
    reply: &'static str,
}

#[async_trait]
impl VisionProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn get_response(&self, _messages: &[Message]) -> Result<String, VchatError> {
        Ok(self.reply.to_string())
    }

    async fn get_response_stream(
        &self,
        _messages: &[Message],
    ) -> Result<BoxStream<'static, Result<String, VchatError>>, VchatError> {
        let reply = self.reply.to_string();
        Ok(stream::iter(vec![Ok(reply)]).boxed())
    }
}

/// Streams a fixed sequence of fragments.
#[derive(Debug)]
struct StreamingProvider {
    fragments: Vec<&'static str>,
}

#[async_trait]
impl VisionProvider for StreamingProvider {
    fn name(&self) -> &'static str {
        "streaming"
    }

    async fn get_response(&self, _messages: &[Message]) -> Result<String, VchatError> {
        Ok(self.fragments.concat())
    }

    async fn get_response_stream(
        &self,
        _messages: &[Message],
    ) -> Result<BoxStream<'static, Result<String, VchatError>>, VchatError> {
        let fragments: Vec<Result<String, VchatError>> = self
            .fragments
            .iter()
            .map(|f| Ok(f.to_string()))
            .collect();
        Ok(stream::iter(fragments).boxed())
    }
}

/// Fails every call before producing anything.
#[derive(Debug)]
struct FailingProvider;

#[async_trait]
impl VisionProvider for FailingProvider {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn get_response(&self, _messages: &[Message]) -> Result<String, VchatError> {
        Err(VchatError::Network("connection reset".to_string()))
    }

    async fn get_response_stream(
        &self,
        _messages: &[Message],
    ) -> Result<BoxStream<'static, Result<String, VchatError>>, VchatError> {
        Err(VchatError::Network("connection reset".to_string()))
    }
}

/// Yields one fragment, then dies mid-stream.
#[derive(Debug)]
struct BrokenStreamProvider;

#[async_trait]
impl VisionProvider for BrokenStreamProvider {
    fn name(&self) -> &'static str {
        "broken-stream"
    }

    async fn get_response(&self, _messages: &[Message]) -> Result<String, VchatError> {
        Err(VchatError::Network("connection reset".to_string()))
    }

    async fn get_response_stream(
        &self,
        _messages: &[Message],
    ) -> Result<BoxStream<'static, Result<String, VchatError>>, VchatError> {
        let items: Vec<Result<String, VchatError>> = vec![
            Ok("He".to_string()),
            Err(VchatError::Network("reset mid-stream".to_string())),
        ];
        Ok(stream::iter(items).boxed())
    }
}

#[tokio::test]
async fn send_appends_assistant_reply() {
    let mut state = new_state(false);
    state.push_user_text("hello");

    let provider = ScriptedProvider { reply: "hi there" };
    let mut sink: Vec<u8> = Vec::new();
    let output = state.complete_turn(&provider, &mut sink).await.unwrap();

    assert!(matches!(output, TurnOutput::Full(ref text) if text == "hi there"));
    assert!(sink.is_empty());

    assert_eq!(state.messages.len(), 3);
    assert_eq!(state.messages[0].role, Role::System);
    assert_eq!(state.messages[1].role, Role::User);
    assert_eq!(text_of(&state.messages[1]), "hello");
    assert_eq!(state.messages[2].role, Role::Assistant);
    assert_eq!(text_of(&state.messages[2]), "hi there");
}

#[tokio::test]
async fn streaming_forwards_fragments_in_order_then_appends() {
    let mut state = new_state(true);
    state.push_user_text("hello");

    let provider = StreamingProvider {
        fragments: vec!["He", "llo"],
    };
    let mut sink: Vec<u8> = Vec::new();
    let output = state.complete_turn(&provider, &mut sink).await.unwrap();

    assert!(matches!(output, TurnOutput::Streamed));
    assert_eq!(String::from_utf8(sink).unwrap(), "Hello");
    assert_eq!(state.messages.len(), 3);
    assert_eq!(text_of(&state.messages[2]), "Hello");
}

#[tokio::test]
async fn failed_send_leaves_history_untouched() {
    let mut state = new_state(false);
    state.push_user_text("hello");
    let before = state.messages.clone();

    let mut sink: Vec<u8> = Vec::new();
    let err = state
        .complete_turn(&FailingProvider, &mut sink)
        .await
        .unwrap_err();

    assert!(matches!(err, VchatError::Network(_)));
    assert_eq!(state.messages, before);
    assert!(sink.is_empty());
}

#[tokio::test]
async fn mid_stream_failure_appends_nothing() {
    let mut state = new_state(true);
    state.push_user_text("hello");
    let before = state.messages.clone();

    let mut sink: Vec<u8> = Vec::new();
    let err = state
        .complete_turn(&BrokenStreamProvider, &mut sink)
        .await
        .unwrap_err();

    assert!(matches!(err, VchatError::Network(_)));
    assert_eq!(state.messages, before);
    // The fragment seen before the failure was already forwarded.
    assert_eq!(String::from_utf8(sink).unwrap(), "He");
}

#[tokio::test]
async fn send_rejects_assistant_terminated_history() {
    let mut state = new_state(false);
    state.push_user_text("hello");
    state.push_assistant_text("hi".to_string());

    let mut sink: Vec<u8> = Vec::new();
    let err = state
        .complete_turn(&ScriptedProvider { reply: "again" }, &mut sink)
        .await
        .unwrap_err();

    assert!(matches!(err, VchatError::Input(_)));
    assert_eq!(state.messages.len(), 3);
}

#[tokio::test]
async fn undo_then_resend_round_trip() {
    let mut state = new_state(false);
    state.push_user_text("first question");

    let provider = ScriptedProvider { reply: "first answer" };
    let mut sink: Vec<u8> = Vec::new();
    state.complete_turn(&provider, &mut sink).await.unwrap();
    assert_eq!(state.messages.len(), 3);

    // Drop the whole exchange and ask again.
    state.delete_last_turn();
    state.delete_paired();
    assert_eq!(state.messages.len(), 1);

    state.push_user_text("second question");
    let provider = ScriptedProvider { reply: "second answer" };
    state.complete_turn(&provider, &mut sink).await.unwrap();

    assert_eq!(state.messages.len(), 3);
    assert_eq!(text_of(&state.messages[1]), "second question");
    assert_eq!(text_of(&state.messages[2]), "second answer");
}
