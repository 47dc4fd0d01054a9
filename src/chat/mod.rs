//! Chat module - everything the bot needs from a chat service
//!
//! - [`ChatTransport`] - posting, reactions, collectors, deletion
//! - [`MemoryTransport`] - in-process hub used by the console and tests
//! - [`Prompter`] - one-answer prompts with a timeout
//! - [`console`] - terminal front-end over a [`MemoryTransport`]

pub mod console;
pub mod memory;
pub mod prompt;
pub mod transport;

pub use memory::{MemoryTransport, TranscriptEntry};
pub use prompt::{Prompt, PromptError, PromptKind, PromptResponse, PromptResult, Prompter};
pub use transport::{
    discard, ChatTransport, MessageFilter, ReactionFilter, TransportError, TransportResult,
};
