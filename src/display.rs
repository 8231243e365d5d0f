use console::style;
use std::io::{self, Write};
use termimad::MadSkin;

use crate::core::error::VchatError;
use crate::providers::{ContentPart, Message, Role};

pub fn error(message: &str) {
    eprintln!("{} {}", style("error:").bold().red(), message);
}

/// Label printed before streamed fragments start arriving.
pub fn assistant_label() {
    print!("{} ", style("assistant>").bold().blue());
    let _ = io::stdout().flush();
}

/// Renders a complete assistant reply, through termimad when it looks like
/// markdown.
pub fn show_assistant(text: &str) {
    println!("{}", style("assistant>").bold().blue());
    if text.contains("```") || text.contains('*') || text.contains('#') || text.contains('`') {
        MadSkin::default().print_text(text);
    } else {
        println!("{}", text);
    }
}

/// y/N confirmation on stdin.
pub fn confirm(question: &str) -> Result<bool, VchatError> {
    print!("{} {} ", style(question).bold().cyan(), style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Free-form one-line prompt on stdin.
pub fn prompt_line(question: &str) -> Result<String, VchatError> {
    print!("{}: ", style(question).bold().cyan());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Role-labelled transcript; image parts are shown as placeholders rather
/// than their base64 payload.
pub fn format_transcript(messages: &[Message]) -> String {
    let header = style(format!(
        "Transcript - {} messages - {}",
        messages.len(),
        chrono::Local::now().format("%Y-%m-%d %H:%M")
    ))
    .dim()
    .to_string();

    let mut lines = vec![header];
    for message in messages {
        let label = match message.role {
            Role::System => style("system").bold().yellow(),
            Role::User => style("user").bold().green(),
            Role::Assistant => style("assistant").bold().blue(),
        };

        let mut body = String::new();
        for part in &message.content {
            if !body.is_empty() {
                body.push(' ');
            }
            match part {
                ContentPart::Text { text } => body.push_str(text),
                ContentPart::Image { mime_type, .. } => {
                    body.push_str(&format!("[image attachment: {}]", mime_type));
                }
            }
        }

        lines.push(format!("{}: {}", label, body));
    }

    lines.join("\n")
}
