//! Chat transport capability
//!
//! Everything a session needs from a chat service: posting, direct messages,
//! reactions, collecting one matching reply, and deleting messages. A network
//! chat client implements [`ChatTransport`]; [`super::MemoryTransport`] is the
//! in-process implementation used by the console and the tests.

use async_trait::async_trait;
use shared::{ChannelId, ChatMessage, MessageRef, OutgoingMessage, Reaction, UserId};
use std::time::Duration;
use tracing::debug;

/// Lower-level chat failure. Always fatal for the session that hits it.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Message {id} not found")]
    MessageNotFound { id: u64 },

    #[error("Transport closed")]
    Closed,

    #[error("Transport failure: {message}")]
    Failed { message: String },
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Predicate selecting which channel message a collector accepts
pub type MessageFilter = Box<dyn Fn(&ChatMessage) -> bool + Send + Sync>;

/// Predicate selecting which reaction a collector accepts
pub type ReactionFilter = Box<dyn Fn(&Reaction) -> bool + Send + Sync>;

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_message(
        &self,
        channel: ChannelId,
        message: OutgoingMessage,
    ) -> TransportResult<MessageRef>;

    async fn send_direct_message(&self, user: UserId, content: String)
        -> TransportResult<MessageRef>;

    /// Attach a reaction from the bot so users can click it
    async fn react(&self, message: &MessageRef, emoji: &str) -> TransportResult<()>;

    /// Wait for the first reaction on `message` accepted by `filter`.
    ///
    /// Returns `Ok(None)` when `timeout` elapses first.
    async fn await_reaction(
        &self,
        message: &MessageRef,
        filter: ReactionFilter,
        timeout: Duration,
    ) -> TransportResult<Option<Reaction>>;

    /// Wait for the first message in `channel` accepted by `filter`.
    ///
    /// With `timeout = None` this waits indefinitely; `Ok(None)` means the
    /// timeout elapsed.
    async fn await_message(
        &self,
        channel: ChannelId,
        filter: MessageFilter,
        timeout: Option<Duration>,
    ) -> TransportResult<Option<ChatMessage>>;

    async fn delete_message(&self, message: &MessageRef) -> TransportResult<()>;
}

/// Delete a user's message once it has been consumed.
///
/// Another session collecting in the same channel may have consumed and
/// deleted the same message first; a missing message counts as deleted.
pub async fn discard(transport: &dyn ChatTransport, message: &MessageRef) -> TransportResult<()> {
    match transport.delete_message(message).await {
        Err(TransportError::MessageNotFound { id }) => {
            debug!("[CHAT] Message {} was already deleted", id);
            Ok(())
        }
        other => other,
    }
}
