//! chessroom - run the chess bot against the terminal
//!
//! Run with: `cargo run -- --prefix '!'`, then type `alice: !chess @bob`.

use anyhow::Context;
use chessroom::chat::console::Console;
use chessroom::chat::MemoryTransport;
use chessroom::commands::{CommandContext, CommandRegistry};
use chessroom::core::{load_settings, save_settings, settings_path, BotSettings};
use chessroom::game::SessionContext;
use chessroom::Bot;
use clap::Parser;
use shared::ChannelId;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Channel the console types into
const CONSOLE_CHANNEL: ChannelId = ChannelId(1);

#[derive(Parser)]
#[command(name = "chessroom")]
#[command(about = "Chat bot that referees chess matches between two chat users", long_about = None)]
struct Cli {
    /// Settings file (defaults to settings.json in the user config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Command prefix, e.g. `!`
    #[arg(long)]
    prefix: Option<String>,

    /// Seconds a setup prompt waits for its answer
    #[arg(long)]
    prompt_timeout: Option<u64>,

    /// Health server port
    #[arg(long)]
    port: Option<u16>,

    /// Announce non-mate endings as draws
    #[arg(long)]
    announce_draws: bool,

    /// Do not start the health server
    #[arg(long)]
    no_health: bool,

    /// Write the effective settings to the settings file and exit
    #[arg(long)]
    write_config: bool,
}

impl Cli {
    fn apply(&self, settings: &mut BotSettings) {
        if let Some(prefix) = &self.prefix {
            settings.command_prefix = prefix.clone();
        }
        if let Some(secs) = self.prompt_timeout {
            settings.prompt_timeout_secs = secs;
        }
        if let Some(port) = self.port {
            settings.health_port = port;
        }
        if self.announce_draws {
            settings.announce_draws = true;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();

    // Logs go to stderr so they do not interleave with the console transcript.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = cli.config.clone().unwrap_or_else(settings_path);
    let mut settings = load_settings(Some(&config_path));
    settings
        .apply_overrides(|key| std::env::var(key).ok())
        .context("invalid environment override")?;
    cli.apply(&mut settings);

    if cli.write_config {
        save_settings(&settings, &config_path)?;
        return Ok(());
    }

    if !cli.no_health {
        let port = settings.health_port;
        tokio::spawn(async move {
            if let Err(e) = backend::serve(port).await {
                tracing::error!("[HEALTH] Server stopped: {}", e);
            }
        });
    }

    let hub = MemoryTransport::new();
    let sessions = SessionContext::new(Arc::new(hub.clone()), &settings)?;
    let bot = Bot::new(
        CommandRegistry::standard(settings.command_prefix.clone()),
        CommandContext { sessions },
    );
    let bot_task = tokio::spawn(bot.run(hub.subscribe()));

    let console = Console::new(hub.clone(), CONSOLE_CHANNEL);
    let printer = console.spawn_printer();

    println!(
        "Type `name: text` to chat, `name +white` to react, `quit` to leave. Try `alice: {}chess @bob`.",
        settings.command_prefix
    );
    console.run(BufReader::new(tokio::io::stdin())).await?;

    hub.close();
    bot_task.abort();
    printer.abort();
    tracing::info!("chessroom shutdown");
    Ok(())
}
