use crate::commands::dispatcher::CommandDispatcher;
use crate::core::error::VchatError;

use console::style;
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::history::FileHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config, Context, EditMode, Editor, Helper};
use std::path::PathBuf;

/// Completes slash commands at the start of a line and falls back to file
/// paths everywhere else, which makes `/image <Tab>` work.
pub struct ChatHelper {
    filename_completer: FilenameCompleter,
    hinter: HistoryHinter,
    commands: Vec<String>,
}

impl ChatHelper {
    pub fn new(dispatcher: CommandDispatcher) -> Self {
        Self {
            filename_completer: FilenameCompleter::new(),
            hinter: HistoryHinter {},
            commands: dispatcher.command_names(),
        }
    }
}

impl Completer for ChatHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        if line.starts_with('/') && pos >= 1 && !line[..pos].contains(' ') {
            let prefix = &line[1..pos];
            let matches: Vec<Pair> = self
                .commands
                .iter()
                .filter(|name| name.starts_with(prefix))
                .map(|name| Pair {
                    display: format!("/{}", name),
                    replacement: name.clone(),
                })
                .collect();

            if !matches.is_empty() {
                return Ok((1, matches));
            }
        }

        self.filename_completer.complete(line, pos, ctx)
    }
}

impl Hinter for ChatHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        self.hinter.hint(line, pos, ctx)
    }
}

impl Highlighter for ChatHelper {}

impl Validator for ChatHelper {}

impl Helper for ChatHelper {}

fn history_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".vchat")
        .join("input_history.txt")
}

pub fn create_editor(
    dispatcher: CommandDispatcher,
) -> Result<Editor<ChatHelper, FileHistory>, VchatError> {
    let config = Config::builder()
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .edit_mode(EditMode::Emacs)
        .build();

    let mut editor = Editor::with_config(config)
        .map_err(|e| VchatError::Input(format!("failed to create line editor: {}", e)))?;
    editor.set_helper(Some(ChatHelper::new(dispatcher)));

    let _ = editor.load_history(&history_path());
    Ok(editor)
}

pub fn read_input(
    editor: &mut Editor<ChatHelper, FileHistory>,
) -> Result<Option<String>, VchatError> {
    let prompt = style("> ").bold().cyan().to_string();
    match editor.readline(&prompt) {
        Ok(line) => {
            if !line.trim().is_empty() {
                let _ = editor.add_history_entry(&line);
            }
            Ok(Some(line))
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(err) => Err(VchatError::Input(format!("input error: {}", err))),
    }
}

pub fn save_history(editor: &mut Editor<ChatHelper, FileHistory>) -> Result<(), VchatError> {
    let path = history_path();
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    editor
        .save_history(&path)
        .map_err(|e| VchatError::Input(format!("failed to save input history: {}", e)))
}
