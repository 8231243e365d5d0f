use clap::Parser;
use console::style;
use dotenvy::dotenv;

use vchat::app::Application;
use vchat::cli::Args;
use vchat::config::Config;
use vchat::core::error::VchatError;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{} {}", style("error:").bold().red(), err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), VchatError> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::load()?;
    tracing::debug!("configuration resolved");

    let mut app = Application::new(&args, config)?;
    app.run().await
}
