use std::io;
use std::sync::Arc;

use console::style;

use crate::cli::Args;
use crate::commands::dispatcher::CommandDispatcher;
use crate::commands::{ChatState, TurnOutput, create_command_registry};
use crate::config::{Config, Provider, parse_provider};
use crate::core::error::VchatError;
use crate::display;
use crate::input;
use crate::registry::ModelRegistry;

pub struct Application {
    state: ChatState,
    dispatcher: CommandDispatcher,
}

impl Application {
    /// Resolves the starting provider and fails fast when it cannot be
    /// used, so a bad name or missing key surfaces before the prompt loop.
    pub fn new(args: &Args, mut config: Config) -> Result<Self, VchatError> {
        let active = match &args.provider {
            Some(name) => parse_provider(name)?,
            None => config.active_provider.unwrap_or(Provider::Qwen),
        };

        if let Some(model) = &args.model {
            config.providers.entry(active).or_default().model = Some(model.clone());
        }
        let streaming = args.stream || config.stream;

        let registry = Arc::new(ModelRegistry::new(config));
        registry.get(active)?;

        Ok(Self {
            state: ChatState::new(registry, active, streaming),
            dispatcher: create_command_registry(),
        })
    }

    pub async fn run(&mut self) -> Result<(), VchatError> {
        self.print_banner();
        let mut editor = input::create_editor(self.dispatcher.clone())?;

        loop {
            let Some(line) = input::read_input(&mut editor)? else {
                break;
            };
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }

            if let Some(rest) = line.strip_prefix('/') {
                let parts: Vec<&str> = rest.split_whitespace().collect();
                let Some((command, args)) = parts.split_first() else {
                    continue;
                };

                match self.dispatcher.execute(command, args, &mut self.state) {
                    Ok(Some(output)) => println!("{}", output),
                    Ok(None) => {}
                    Err(e) => display::error(&e.to_string()),
                }

                if !self.state.should_continue {
                    break;
                }
                if self.state.needs_response {
                    self.respond().await;
                }
                continue;
            }

            self.state.push_user_text(&line);
            self.respond().await;
        }

        input::save_history(&mut editor)?;
        Ok(())
    }

    /// One round trip against the active provider. Failures are reported
    /// and the loop goes on; the conversation keeps whatever state it had
    /// before the call.
    async fn respond(&mut self) {
        self.state.needs_response = false;

        let provider = match self.state.registry.get(self.state.active) {
            Ok(provider) => provider,
            Err(e) => {
                display::error(&e.to_string());
                return;
            }
        };

        if self.state.streaming {
            display::assistant_label();
        }

        let mut stdout = io::stdout();
        match self.state.complete_turn(provider.as_ref(), &mut stdout).await {
            Ok(TurnOutput::Streamed) => println!(),
            Ok(TurnOutput::Full(text)) => display::show_assistant(&text),
            Err(e) => {
                if self.state.streaming {
                    println!();
                }
                display::error(&e.to_string());
            }
        }
    }

    fn print_banner(&self) {
        println!(
            "{}",
            style("vchat - chat with vision-capable LLM providers").bold()
        );
        println!(
            "Provider: {} ({})  Streaming: {}",
            style(self.state.active).cyan(),
            self.state.registry.model_of(self.state.active),
            if self.state.streaming { "on" } else { "off" }
        );
        println!(
            "{}",
            style("Type a message, /image <path> to ask about an image, /help for commands.").dim()
        );
    }
}
