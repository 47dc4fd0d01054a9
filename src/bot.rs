//! Bot runtime
//!
//! Reads user events from the chat service and runs each command invocation
//! as its own task, so a match waiting for moves never blocks other
//! commands or other matches.

use crate::commands::{CommandContext, CommandError, CommandRegistry};
use shared::{ChatEvent, ChatMessage};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub struct Bot {
    registry: Arc<CommandRegistry>,
    ctx: CommandContext,
}

impl Bot {
    pub fn new(registry: CommandRegistry, ctx: CommandContext) -> Self {
        Self {
            registry: Arc::new(registry),
            ctx,
        }
    }

    /// Start the command `event` invokes, if any.
    pub fn dispatch(&self, event: &ChatEvent) -> Option<JoinHandle<()>> {
        let ChatEvent::Message(message) = event else {
            return None;
        };
        let (command, args) = self.registry.resolve(message)?;

        info!(
            "[BOT] {} invoked {}{} in {}",
            message.author,
            self.registry.prefix(),
            command.names()[0],
            message.channel
        );

        let ctx = self.ctx.clone();
        let message: ChatMessage = message.clone();
        Some(tokio::spawn(async move {
            match command.run(&ctx, &message, &args).await {
                Ok(()) => debug!("[BOT] Command from {} finished", message.author),
                Err(CommandError::Setup(err)) => {
                    warn!("[BOT] Setup for {} failed: {}", message.author, err)
                }
                Err(err) => error!("[BOT] Command from {} failed: {}", message.author, err),
            }
        }))
    }

    /// Dispatch events until the stream closes.
    pub async fn run(self, mut events: broadcast::Receiver<ChatEvent>) {
        info!("[BOT] Listening for commands with prefix {:?}", self.registry.prefix());
        loop {
            match events.recv().await {
                Ok(event) => {
                    self.dispatch(&event);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("[BOT] Event stream lagged, {} events skipped", skipped)
                }
                Err(RecvError::Closed) => break,
            }
        }
        info!("[BOT] Event stream closed, stopping");
    }
}
