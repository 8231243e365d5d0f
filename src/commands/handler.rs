use super::{ChatState, TurnDeletion};
use crate::config::parse_provider;
use crate::core::error::VchatError;
use crate::display;
use std::path::Path;

use console::style;

pub trait CommandHandler: Send + Sync {
    fn execute(&self, state: &mut ChatState, args: &[&str]) -> Result<Option<String>, VchatError>;
    fn help(&self) -> &'static str;
}

pub struct QuitCommand;
pub struct HelpCommand;
pub struct ClearCommand;
pub struct StreamCommand;
pub struct ProviderCommand;
pub struct ImageCommand;
pub struct UndoCommand;
pub struct HistoryCommand;

impl CommandHandler for QuitCommand {
    fn execute(&self, state: &mut ChatState, _args: &[&str]) -> Result<Option<String>, VchatError> {
        state.should_continue = false;
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "/quit - Exit the chat session"
    }
}

impl CommandHandler for HelpCommand {
    fn execute(
        &self,
        _state: &mut ChatState,
        _args: &[&str],
    ) -> Result<Option<String>, VchatError> {
        let title = style("Available Commands").bold().underlined();
        let help_text = vec![
            title.to_string(),
            HelpCommand.help().to_string(),
            QuitCommand.help().to_string(),
            ClearCommand.help().to_string(),
            StreamCommand.help().to_string(),
            ProviderCommand.help().to_string(),
            ImageCommand.help().to_string(),
            UndoCommand.help().to_string(),
            HistoryCommand.help().to_string(),
        ]
        .join("\n");

        Ok(Some(help_text))
    }

    fn help(&self) -> &'static str {
        "/help - Show available commands"
    }
}

impl CommandHandler for ClearCommand {
    fn execute(&self, state: &mut ChatState, _args: &[&str]) -> Result<Option<String>, VchatError> {
        state.reset();
        Ok(Some("Conversation cleared.".to_string()))
    }

    fn help(&self) -> &'static str {
        "/clear - Reset the conversation to the initial system prompt"
    }
}

impl CommandHandler for StreamCommand {
    fn execute(&self, state: &mut ChatState, _args: &[&str]) -> Result<Option<String>, VchatError> {
        let enabled = state.toggle_streaming();
        Ok(Some(format!(
            "Streaming output {}.",
            if enabled { "enabled" } else { "disabled" }
        )))
    }

    fn help(&self) -> &'static str {
        "/stream - Toggle token-by-token streaming output"
    }
}

impl CommandHandler for ProviderCommand {
    fn execute(&self, state: &mut ChatState, args: &[&str]) -> Result<Option<String>, VchatError> {
        if args.is_empty() {
            let lines: Vec<String> = state
                .registry
                .list()
                .into_iter()
                .map(|provider| {
                    let marker = if provider == state.active { "*" } else { " " };
                    format!(
                        "{} {} ({})",
                        marker,
                        provider,
                        state.registry.model_of(provider)
                    )
                })
                .collect();
            return Ok(Some(lines.join("\n")));
        }

        let provider = parse_provider(args[0])?;
        if provider == state.active {
            return Ok(Some(format!("Provider '{}' is already active.", provider)));
        }

        // Surface unknown-name and missing-key failures before prompting.
        state.registry.get(provider)?;
        let reset = display::confirm("Reset conversation history for the new provider?")?;
        state.switch_provider(provider, reset)?;

        Ok(Some(format!(
            "Switched to '{}' ({}).",
            provider,
            state.registry.model_of(provider)
        )))
    }

    fn help(&self) -> &'static str {
        "/provider [name] - List providers or switch the active one"
    }
}

impl CommandHandler for ImageCommand {
    fn execute(&self, state: &mut ChatState, args: &[&str]) -> Result<Option<String>, VchatError> {
        let Some(path) = args.first() else {
            return Ok(Some("Usage: /image <path> [question]".to_string()));
        };

        let prompt = if args.len() > 1 {
            args[1..].join(" ")
        } else {
            display::prompt_line("Question about the image")?
        };
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Ok(Some("Cancelled: no question provided.".to_string()));
        }

        state.push_image_turn(Path::new(path), prompt)?;
        state.needs_response = true;
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "/image <path> [question] - Send an image with a question about it"
    }
}

impl CommandHandler for UndoCommand {
    fn execute(&self, state: &mut ChatState, _args: &[&str]) -> Result<Option<String>, VchatError> {
        match state.delete_last_turn() {
            TurnDeletion::Empty => Ok(Some("Nothing to delete.".to_string())),
            TurnDeletion::Removed {
                role,
                paired_available,
            } => {
                if paired_available
                    && display::confirm("Also remove the user message that prompted it?")?
                {
                    state.delete_paired();
                    return Ok(Some(
                        "Removed the assistant reply and the user message before it.".to_string(),
                    ));
                }
                Ok(Some(format!("Removed the last {} message.", role.as_str())))
            }
        }
    }

    fn help(&self) -> &'static str {
        "/undo - Delete the last turn (offers to drop the whole exchange)"
    }
}

impl CommandHandler for HistoryCommand {
    fn execute(&self, state: &mut ChatState, _args: &[&str]) -> Result<Option<String>, VchatError> {
        Ok(Some(display::format_transcript(&state.messages)))
    }

    fn help(&self) -> &'static str {
        "/history - Print the full conversation transcript"
    }
}
