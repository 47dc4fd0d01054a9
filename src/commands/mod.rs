//! Chat commands
//!
//! A chat message starting with the configured prefix is a command:
//! `!chess @friend` runs [`ChessCommand`] with `@friend` as argument. Each
//! [`Command`] answers to one or more names; the first name is the one shown
//! in help.

pub mod chess;
pub mod help;
pub mod time;

pub use chess::ChessCommand;
pub use help::HelpCommand;
pub use time::TimeCommand;

use crate::chat::{ChatTransport, TransportError};
use crate::game::{SessionContext, SessionError, SetupError};
use async_trait::async_trait;
use shared::ChatMessage;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Setup aborted: {0}")]
    Setup(#[from] SetupError),

    #[error("Session ended: {0}")]
    Session(#[from] SessionError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type CommandResult<T> = Result<T, CommandError>;

/// Everything a running command may use
#[derive(Clone)]
pub struct CommandContext {
    pub sessions: SessionContext,
}

impl CommandContext {
    pub fn transport(&self) -> &Arc<dyn ChatTransport> {
        &self.sessions.transport
    }
}

#[async_trait]
pub trait Command: Send + Sync {
    /// Names the command answers to, primary name first
    fn names(&self) -> &[&'static str];

    /// One usage line
    fn help(&self, prefix: &str) -> String;

    async fn run(
        &self,
        ctx: &CommandContext,
        message: &ChatMessage,
        args: &[String],
    ) -> CommandResult<()>;
}

/// A message split into command name and arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub name: String,
    pub args: Vec<String>,
}

/// Parse `content` as `<prefix><name> [args...]`. Names are case-insensitive.
pub fn parse_invocation(prefix: &str, content: &str) -> Option<Invocation> {
    let body = content.trim_start().strip_prefix(prefix)?;
    let mut words = body.split_whitespace();
    let name = words.next()?.to_lowercase();

    Some(Invocation {
        name,
        args: words.map(str::to_string).collect(),
    })
}

/// Command lookup by name or alias
pub struct CommandRegistry {
    prefix: String,
    commands: Vec<Arc<dyn Command>>,
}

impl CommandRegistry {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            commands: Vec::new(),
        }
    }

    /// `chess`, `time` and `help`
    pub fn standard(prefix: impl Into<String>) -> Self {
        let mut registry = Self::new(prefix);
        registry.register(Arc::new(ChessCommand));
        registry.register(Arc::new(TimeCommand::default()));
        registry.register_help();
        registry
    }

    pub fn register(&mut self, command: Arc<dyn Command>) {
        self.commands.push(command);
    }

    /// Register `help` listing every command registered so far and itself.
    pub fn register_help(&mut self) {
        let mut lines = self.help_lines();
        lines.push(HelpCommand::usage(&self.prefix));
        self.register(Arc::new(HelpCommand::new(lines)));
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn help_lines(&self) -> Vec<String> {
        self.commands
            .iter()
            .map(|command| command.help(&self.prefix))
            .collect()
    }

    pub fn find(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands
            .iter()
            .find(|command| command.names().iter().any(|alias| *alias == name))
            .cloned()
    }

    /// Command and arguments for `message`, if it invokes a known command
    pub fn resolve(&self, message: &ChatMessage) -> Option<(Arc<dyn Command>, Vec<String>)> {
        let invocation = parse_invocation(&self.prefix, &message.content)?;
        let command = self.find(&invocation.name)?;
        Some((command, invocation.args))
    }
}
