use std::fs::{self, File};
use std::io;
use std::sync::Mutex;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use voice_agent_core::config::ENDPOINT_ENV;
use voice_agent_core::{AgentClient, Config, TranscriptController};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "voice-agent", version)]
#[command(about = "Terminal front-end for the local voice agent")]
struct Cli {
    /// Agent endpoint (overrides VOICE_AGENT_ENDPOINT and the config file)
    #[arg(short, long, global = true)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single turn without the TUI and print what was said
    Turn,
    /// Save the default endpoint to the config file
    Config {
        /// Endpoint URL, e.g. http://127.0.0.1:8000/run-agent
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        None => init_file_logging(),
        Some(_) => init_stderr_logging(),
    }

    let config = Config::load_or_default();
    let env_endpoint = std::env::var(ENDPOINT_ENV).ok();
    let endpoint = config.resolve_endpoint(cli.endpoint.as_deref(), env_endpoint.as_deref());

    match cli.command {
        None => run_tui(&endpoint).await,
        Some(Commands::Turn) => run_single_turn(&endpoint).await,
        Some(Commands::Config { url }) => {
            let path = Config::save_endpoint(&url)?;
            println!("Saved endpoint {} to {}", url, path.display());
            Ok(())
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Logs go to a file while the TUI owns the terminal
fn init_file_logging() {
    let log_file = dirs::data_local_dir()
        .map(|dir| dir.join("voice-agent"))
        .and_then(|dir| {
            fs::create_dir_all(&dir).ok()?;
            File::options()
                .create(true)
                .append(true)
                .open(dir.join("voice-agent.log"))
                .ok()
        });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false);

    match log_file {
        Some(file) => builder.with_writer(Mutex::new(file)).init(),
        None => builder.with_writer(io::sink).init(),
    }
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .init();
}

async fn run_tui(endpoint: &str) -> Result<()> {
    let client = AgentClient::new(endpoint);
    let host_label = client.host_label();
    info!(endpoint = client.endpoint(), "starting voice agent");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut app = App::new(client, host_label);
    let mut events = EventHandler::new();

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }
    Ok(())
}

async fn run_single_turn(endpoint: &str) -> Result<()> {
    let mut controller = TranscriptController::new(AgentClient::new(endpoint));
    let before = controller.entries().len();

    eprintln!("Listening via {} ...", controller.backend().endpoint());
    controller.request_turn().await;

    for entry in &controller.entries()[before..] {
        println!("{}: {}", entry.sender().display_name(), entry.text());
    }

    Ok(())
}
