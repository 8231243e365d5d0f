use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Interactive chat with vision-capable LLM providers", long_about = None)]
pub struct Args {
    /// Provider to start the session with (qwen, glm, hunyuan, doubao, custom)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Model override for the initial provider
    #[arg(short, long)]
    pub model: Option<String>,

    /// Start with streaming output enabled
    #[arg(short, long)]
    pub stream: bool,
}
