use clap::Parser;
use std::error::Error;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use opschat::api::ChatClient;
use opschat::core::config::{Config, DEFAULT_ENDPOINT};
use opschat::logging::TranscriptLog;
use opschat::ui::chat_loop::run_chat_loop;

#[derive(Parser)]
#[command(name = "opschat")]
#[command(about = "A terminal chat client for an ops assistant backend")]
#[command(long_about = "Opschat is a full-screen terminal chat client that talks to an ops \
assistant backend over a single POST /chat endpoint. Replies that parse as \
structured data are shown as an indented dump; everything else is shown \
verbatim.\n\n\
Configuration:\n\
  Settings may also be placed in config.toml under the platform config\n\
  directory (endpoint, log_file); command-line flags take precedence.\n\n\
Controls:\n\
  Type              Enter your message in the input field\n\
  Enter             Send the message\n\
  Up/Down/Mouse     Scroll through chat history\n\
  Ctrl+N            Start a new chat\n\
  Ctrl+C            Quit")]
struct Args {
    /// Chat endpoint URL
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Append rendered messages to this transcript file
    #[arg(short, long)]
    log_file: Option<String>,

    /// Write tracing diagnostics to this file (filtered via RUST_LOG)
    #[arg(long)]
    debug_log: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if let Some(path) = &args.debug_log {
        let file = File::create(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(Arc::new(file))
            .with_ansi(false)
            .init();
    }

    let config = Config::load()?;
    let endpoint = args
        .endpoint
        .or(config.endpoint)
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
    let transcript = TranscriptLog::new(args.log_file.or(config.log_file))?;

    run_chat_loop(ChatClient::new(endpoint), transcript).await
}
