use super::{
    handler::{
        ClearCommand, HelpCommand, HistoryCommand, ImageCommand, ProviderCommand, QuitCommand,
        StreamCommand, UndoCommand,
    },
    registry::CommandRegistry,
    ChatState,
};
use crate::core::error::VchatError;
use std::sync::Arc;

#[derive(Clone)]
pub struct CommandDispatcher {
    registry: Arc<CommandRegistry>,
}

impl CommandDispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    pub fn execute(
        &self,
        command: &str,
        args: &[&str],
        state: &mut ChatState,
    ) -> Result<Option<String>, VchatError> {
        self.registry.execute(command, args, state)
    }

    pub fn command_names(&self) -> Vec<String> {
        self.registry.command_names()
    }
}

pub fn create_command_registry() -> CommandDispatcher {
    let mut registry = CommandRegistry::new();

    registry.register("help", HelpCommand);
    registry.register("quit", QuitCommand);
    registry.register("clear", ClearCommand);
    registry.register("stream", StreamCommand);
    registry.register("provider", ProviderCommand);
    registry.register("image", ImageCommand);
    registry.register("undo", UndoCommand);
    registry.register("history", HistoryCommand);

    CommandDispatcher::new(Arc::new(registry))
}
