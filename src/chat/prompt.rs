//! Single-answer prompts with a timeout
//!
//! A [`Prompt`] asks one user for exactly one answer, either by clicking one
//! of the reactions the bot attaches ([`PromptKind::ReactionChoice`]) or by
//! writing a message ([`PromptKind::MessageChoice`]). The prompt message, and
//! the answering message, are deleted once resolved. Expiry is final: the
//! caller decides what a timeout means, there is no retry.
//!
//! A [`Prompter`] serves one session and holds at most one pending prompt.

use crate::chat::transport::{discard, ChatTransport, TransportError};
use shared::{ChannelId, ChatMessage, UserId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("No response after {} seconds", .timeout.as_secs())]
    TimedOut { timeout: Duration },

    #[error("Another prompt is still pending in this session")]
    AlreadyPending,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type PromptResult<T> = Result<T, PromptError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    ReactionChoice,
    MessageChoice,
}

/// A request for exactly one answer from one user
#[derive(Debug, Clone)]
pub struct Prompt {
    pub kind: PromptKind,
    pub text: String,
    /// Emoji the responder may pick; empty for message prompts
    pub options: Vec<String>,
    pub responder: UserId,
    pub timeout: Duration,
}

impl Prompt {
    pub fn reaction_choice(
        text: impl Into<String>,
        options: &[&str],
        responder: UserId,
        timeout: Duration,
    ) -> Self {
        Self {
            kind: PromptKind::ReactionChoice,
            text: text.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
            responder,
            timeout,
        }
    }

    pub fn message_choice(text: impl Into<String>, responder: UserId, timeout: Duration) -> Self {
        Self {
            kind: PromptKind::MessageChoice,
            text: text.into(),
            options: Vec::new(),
            responder,
            timeout,
        }
    }
}

/// The answer that resolved a prompt
#[derive(Debug, Clone, PartialEq)]
pub enum PromptResponse {
    /// Emoji picked from the options
    Choice(String),
    /// Message written by the responder (already deleted from the channel)
    Message(ChatMessage),
}

impl PromptResponse {
    pub fn choice(&self) -> Option<&str> {
        match self {
            PromptResponse::Choice(emoji) => Some(emoji),
            PromptResponse::Message(_) => None,
        }
    }

    pub fn message(&self) -> Option<&ChatMessage> {
        match self {
            PromptResponse::Message(message) => Some(message),
            PromptResponse::Choice(_) => None,
        }
    }
}

/// Releases the pending slot when the prompt ends, however it ends.
struct PendingSlot<'a> {
    pending: &'a AtomicBool,
}

impl<'a> PendingSlot<'a> {
    fn acquire(pending: &'a AtomicBool) -> PromptResult<Self> {
        pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PromptError::AlreadyPending)?;
        Ok(Self { pending })
    }
}

impl Drop for PendingSlot<'_> {
    fn drop(&mut self) {
        self.pending.store(false, Ordering::Release);
    }
}

/// Issues prompts in one channel, one at a time
pub struct Prompter {
    transport: Arc<dyn ChatTransport>,
    channel: ChannelId,
    pending: AtomicBool,
}

impl Prompter {
    pub fn new(transport: Arc<dyn ChatTransport>, channel: ChannelId) -> Self {
        Self {
            transport,
            channel,
            pending: AtomicBool::new(false),
        }
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Post `prompt` and wait for its answer.
    ///
    /// # Errors
    ///
    /// - [`PromptError::AlreadyPending`] if another prompt of this prompter
    ///   has not resolved yet
    /// - [`PromptError::TimedOut`] if no qualifying answer arrives in time
    /// - [`PromptError::Transport`] on any chat failure
    pub async fn issue(&self, prompt: Prompt) -> PromptResult<PromptResponse> {
        let _slot = PendingSlot::acquire(&self.pending)?;
        debug!("[PROMPT] Issuing {:?} prompt for {}", prompt.kind, prompt.responder);

        match prompt.kind {
            PromptKind::ReactionChoice => self.issue_reaction_choice(prompt).await,
            PromptKind::MessageChoice => self.issue_message_choice(prompt).await,
        }
    }

    async fn issue_reaction_choice(&self, prompt: Prompt) -> PromptResult<PromptResponse> {
        let posted = self
            .transport
            .send_message(self.channel, prompt.text.clone().into())
            .await?;

        for option in &prompt.options {
            self.transport.react(&posted, option).await?;
        }

        let responder = prompt.responder;
        let options = prompt.options.clone();
        let reaction = self
            .transport
            .await_reaction(
                &posted,
                Box::new(move |r| r.user == responder && options.contains(&r.emoji)),
                prompt.timeout,
            )
            .await?;

        self.transport.delete_message(&posted).await?;

        match reaction {
            Some(reaction) => {
                info!("[PROMPT] {} picked {}", responder, reaction.emoji);
                Ok(PromptResponse::Choice(reaction.emoji))
            }
            None => Err(PromptError::TimedOut {
                timeout: prompt.timeout,
            }),
        }
    }

    async fn issue_message_choice(&self, prompt: Prompt) -> PromptResult<PromptResponse> {
        let posted = self
            .transport
            .send_message(self.channel, prompt.text.clone().into())
            .await?;

        let responder = prompt.responder;
        let answer = self
            .transport
            .await_message(
                self.channel,
                Box::new(move |m| m.author == responder),
                Some(prompt.timeout),
            )
            .await?;

        self.transport.delete_message(&posted).await?;

        match answer {
            Some(message) => {
                discard(self.transport.as_ref(), &message.reference()).await?;
                info!("[PROMPT] {} answered {:?}", responder, message.content);
                Ok(PromptResponse::Message(message))
            }
            None => Err(PromptError::TimedOut {
                timeout: prompt.timeout,
            }),
        }
    }
}
