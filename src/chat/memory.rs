//! In-process chat hub
//!
//! [`MemoryTransport`] implements [`ChatTransport`] without a network: users
//! are simulated with [`MemoryTransport::say`] and [`MemoryTransport::react_as`],
//! and everything the bot does is appended to a transcript.
//!
//! Collectors behave like a real chat service's: a waiting
//! `await_message`/`await_reaction` only sees events delivered after it
//! started waiting, and every waiting collector whose filter accepts an event
//! receives it.

use crate::chat::transport::{
    ChatTransport, MessageFilter, ReactionFilter, TransportError, TransportResult,
};
use async_trait::async_trait;
use shared::{
    Channel, ChannelId, ChatEvent, ChatMessage, MessageId, MessageRef, OutgoingMessage, Reaction,
    UserId,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, oneshot, Notify};

const BROADCAST_CAPACITY: usize = 256;

/// One line of the hub's history
#[derive(Clone, Debug, PartialEq)]
pub enum TranscriptEntry {
    /// Bot posted in a text channel
    Posted {
        message: MessageRef,
        content: OutgoingMessage,
    },
    /// Bot sent a direct message
    Direct {
        message: MessageRef,
        to: UserId,
        content: String,
    },
    /// Bot attached a reaction option
    Reacted { message: MessageRef, emoji: String },
    Deleted { message: MessageRef },
    /// A user sent a message or reacted
    Received(ChatEvent),
}

struct LiveMessage {
    reference: MessageRef,
    reactions: Vec<String>,
}

enum Collector {
    Message {
        channel: ChannelId,
        filter: MessageFilter,
    },
    Reaction {
        message: MessageId,
        filter: ReactionFilter,
    },
}

impl Collector {
    fn accepts(&self, event: &ChatEvent) -> bool {
        match (self, event) {
            (Collector::Message { channel, filter }, ChatEvent::Message(msg)) => {
                msg.channel == *channel && filter(msg)
            }
            (Collector::Reaction { message, filter }, ChatEvent::Reaction(reaction)) => {
                reaction.message == *message && filter(reaction)
            }
            _ => false,
        }
    }
}

struct Waiter {
    id: u64,
    collector: Collector,
    reply: oneshot::Sender<ChatEvent>,
}

#[derive(Default)]
struct HubState {
    live: HashMap<MessageId, LiveMessage>,
    transcript: Vec<TranscriptEntry>,
    waiters: Vec<Waiter>,
    closed: bool,
}

struct Inner {
    next_id: AtomicU64,
    next_waiter: AtomicU64,
    state: Mutex<HubState>,
    listening: Notify,
    inbound: broadcast::Sender<ChatEvent>,
    outbound: broadcast::Sender<TranscriptEntry>,
}

/// Unregisters a collector whose future is dropped before it is answered.
struct Registration<'a> {
    hub: &'a MemoryTransport,
    id: u64,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        self.hub.unregister(self.id);
    }
}

/// Cloneable handle to one shared in-process chat hub
#[derive(Clone)]
pub struct MemoryTransport {
    inner: Arc<Inner>,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransport {
    pub fn new() -> Self {
        let (inbound, _) = broadcast::channel(BROADCAST_CAPACITY);
        let (outbound, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                next_id: AtomicU64::new(1),
                next_waiter: AtomicU64::new(1),
                state: Mutex::new(HubState::default()),
                listening: Notify::new(),
                inbound,
                outbound,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, HubState> {
        self.inner.state.lock()
    }

    fn next_message_id(&self) -> MessageId {
        MessageId(self.inner.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn record(&self, state: &mut HubState, entry: TranscriptEntry) {
        state.transcript.push(entry.clone());
        let _ = self.inner.outbound.send(entry);
    }

    /// A user posts `content` in `channel`. Mentions are parsed from `<@id>`.
    pub fn say(&self, channel: ChannelId, author: UserId, content: impl Into<String>) -> ChatMessage {
        let message = ChatMessage::new(self.next_message_id(), channel, author, content);
        self.deliver(ChatEvent::Message(message.clone()));
        message
    }

    /// A user reacts to `message` with `emoji`.
    pub fn react_as(&self, message: MessageId, user: UserId, emoji: &str) -> Reaction {
        let reaction = Reaction {
            message,
            user,
            emoji: emoji.to_string(),
        };
        self.deliver(ChatEvent::Reaction(reaction.clone()));
        reaction
    }

    fn deliver(&self, event: ChatEvent) {
        let mut state = self.state();

        if let ChatEvent::Message(msg) = &event {
            state.live.insert(
                msg.id,
                LiveMessage {
                    reference: msg.reference(),
                    reactions: Vec::new(),
                },
            );
        }
        self.record(&mut state, TranscriptEntry::Received(event.clone()));

        let mut index = 0;
        while index < state.waiters.len() {
            if state.waiters[index].collector.accepts(&event) {
                let waiter = state.waiters.remove(index);
                let _ = waiter.reply.send(event.clone());
            } else {
                index += 1;
            }
        }
        drop(state);

        let _ = self.inner.inbound.send(event);
    }

    fn register(&self, collector: Collector) -> TransportResult<(u64, oneshot::Receiver<ChatEvent>)> {
        let (reply, receiver) = oneshot::channel();
        let id = self.inner.next_waiter.fetch_add(1, Ordering::Relaxed);

        {
            let mut state = self.state();
            if state.closed {
                return Err(TransportError::Closed);
            }
            state.waiters.push(Waiter {
                id,
                collector,
                reply,
            });
        }

        self.inner.listening.notify_waiters();
        Ok((id, receiver))
    }

    /// Remove a waiter; `false` if it was already answered.
    fn unregister(&self, id: u64) -> bool {
        let mut state = self.state();
        let before = state.waiters.len();
        state.waiters.retain(|waiter| waiter.id != id);
        state.waiters.len() != before
    }

    async fn collect(
        &self,
        collector: Collector,
        timeout: Option<Duration>,
    ) -> TransportResult<Option<ChatEvent>> {
        let (id, mut receiver) = self.register(collector)?;
        let _registration = Registration { hub: self, id };

        let received = match timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut receiver).await {
                Ok(result) => result.ok(),
                Err(_) => {
                    if self.unregister(id) {
                        return Ok(None);
                    }
                    // Answered while the timer fired.
                    receiver.try_recv().ok()
                }
            },
            None => receiver.await.ok(),
        };

        received.map(Some).ok_or(TransportError::Closed)
    }

    /// Resolve once at least one collector is waiting.
    pub async fn until_listening(&self) {
        loop {
            let notified = self.inner.listening.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.listener_count() > 0 {
                return;
            }
            notified.await;
        }
    }

    pub fn listener_count(&self) -> usize {
        self.state().waiters.len()
    }

    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.state().transcript.clone()
    }

    pub fn is_live(&self, id: MessageId) -> bool {
        self.state().live.contains_key(&id)
    }

    /// Most recent live message in `channel` carrying reaction options.
    pub fn latest_reactable(&self, channel: ChannelId) -> Option<MessageRef> {
        let state = self.state();
        state
            .live
            .values()
            .filter(|live| {
                live.reference.channel == Channel::Text(channel) && !live.reactions.is_empty()
            })
            .map(|live| live.reference)
            .max_by_key(|reference| reference.id)
    }

    /// Reaction options the bot attached to `message`
    pub fn reactions_on(&self, message: MessageId) -> Vec<String> {
        self.state()
            .live
            .get(&message)
            .map(|live| live.reactions.clone())
            .unwrap_or_default()
    }

    /// Stream of user events, for command dispatch
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.inner.inbound.subscribe()
    }

    /// Stream of transcript entries, for printing
    pub fn watch(&self) -> broadcast::Receiver<TranscriptEntry> {
        self.inner.outbound.subscribe()
    }

    /// Fail every pending and future collector with [`TransportError::Closed`].
    pub fn close(&self) {
        let mut state = self.state();
        state.closed = true;
        state.waiters.clear();
    }
}

#[async_trait]
impl ChatTransport for MemoryTransport {
    async fn send_message(
        &self,
        channel: ChannelId,
        message: OutgoingMessage,
    ) -> TransportResult<MessageRef> {
        let mut state = self.state();
        if state.closed {
            return Err(TransportError::Closed);
        }

        let reference = MessageRef {
            channel: Channel::Text(channel),
            id: self.next_message_id(),
        };
        state.live.insert(
            reference.id,
            LiveMessage {
                reference,
                reactions: Vec::new(),
            },
        );
        self.record(
            &mut state,
            TranscriptEntry::Posted {
                message: reference,
                content: message,
            },
        );
        Ok(reference)
    }

    async fn send_direct_message(
        &self,
        user: UserId,
        content: String,
    ) -> TransportResult<MessageRef> {
        let mut state = self.state();
        if state.closed {
            return Err(TransportError::Closed);
        }

        let reference = MessageRef {
            channel: Channel::Direct(user),
            id: self.next_message_id(),
        };
        state.live.insert(
            reference.id,
            LiveMessage {
                reference,
                reactions: Vec::new(),
            },
        );
        self.record(
            &mut state,
            TranscriptEntry::Direct {
                message: reference,
                to: user,
                content,
            },
        );
        Ok(reference)
    }

    async fn react(&self, message: &MessageRef, emoji: &str) -> TransportResult<()> {
        let mut state = self.state();
        let live = state
            .live
            .get_mut(&message.id)
            .ok_or(TransportError::MessageNotFound { id: message.id.0 })?;
        live.reactions.push(emoji.to_string());

        self.record(
            &mut state,
            TranscriptEntry::Reacted {
                message: *message,
                emoji: emoji.to_string(),
            },
        );
        Ok(())
    }

    async fn await_reaction(
        &self,
        message: &MessageRef,
        filter: ReactionFilter,
        timeout: Duration,
    ) -> TransportResult<Option<Reaction>> {
        let collector = Collector::Reaction {
            message: message.id,
            filter,
        };
        match self.collect(collector, Some(timeout)).await? {
            Some(ChatEvent::Reaction(reaction)) => Ok(Some(reaction)),
            Some(ChatEvent::Message(_)) => Err(TransportError::Failed {
                message: "reaction collector received a message".to_string(),
            }),
            None => Ok(None),
        }
    }

    async fn await_message(
        &self,
        channel: ChannelId,
        filter: MessageFilter,
        timeout: Option<Duration>,
    ) -> TransportResult<Option<ChatMessage>> {
        let collector = Collector::Message { channel, filter };
        match self.collect(collector, timeout).await? {
            Some(ChatEvent::Message(message)) => Ok(Some(message)),
            Some(ChatEvent::Reaction(_)) => Err(TransportError::Failed {
                message: "message collector received a reaction".to_string(),
            }),
            None => Ok(None),
        }
    }

    async fn delete_message(&self, message: &MessageRef) -> TransportResult<()> {
        let mut state = self.state();
        state
            .live
            .remove(&message.id)
            .ok_or(TransportError::MessageNotFound { id: message.id.0 })?;

        self.record(&mut state, TranscriptEntry::Deleted { message: *message });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHANNEL: ChannelId = ChannelId(1);
    const ALICE: UserId = UserId(10);
    const BOB: UserId = UserId(11);

    #[tokio::test]
    async fn test_collector_ignores_messages_sent_before_waiting() {
        let hub = MemoryTransport::new();
        hub.say(CHANNEL, ALICE, "too early");

        let result = hub
            .await_message(CHANNEL, Box::new(|_| true), Some(Duration::from_millis(20)))
            .await
            .unwrap();

        assert!(result.is_none());
        assert_eq!(hub.listener_count(), 0, "expired collector is removed");
    }

    #[tokio::test]
    async fn test_collector_receives_first_matching_message() {
        let hub = MemoryTransport::new();
        let waiting = {
            let hub = hub.clone();
            tokio::spawn(async move {
                hub.await_message(CHANNEL, Box::new(|m| m.author == BOB), None)
                    .await
            })
        };

        hub.until_listening().await;
        hub.say(CHANNEL, ALICE, "not me");
        hub.say(CHANNEL, BOB, "e4");

        let received = waiting.await.unwrap().unwrap().expect("message expected");
        assert_eq!(received.content, "e4");
        assert_eq!(received.author, BOB);
    }

    #[tokio::test]
    async fn test_reaction_collector_matches_message_and_filter() {
        let hub = MemoryTransport::new();
        let prompt = hub.send_message(CHANNEL, "pick".into()).await.unwrap();
        hub.react(&prompt, "🌝").await.unwrap();

        let waiting = {
            let hub = hub.clone();
            tokio::spawn(async move {
                hub.await_reaction(
                    &prompt,
                    Box::new(|r| r.user == ALICE),
                    Duration::from_secs(5),
                )
                .await
            })
        };

        hub.until_listening().await;
        hub.react_as(MessageId(999), ALICE, "🌝");
        hub.react_as(prompt.id, BOB, "🌝");
        hub.react_as(prompt.id, ALICE, "🌚");

        let reaction = waiting.await.unwrap().unwrap().expect("reaction expected");
        assert_eq!(reaction.emoji, "🌚");
        assert_eq!(hub.latest_reactable(CHANNEL), Some(prompt));
        assert_eq!(hub.reactions_on(prompt.id), vec!["🌝".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_missing_message_fails() {
        let hub = MemoryTransport::new();
        let sent = hub.send_message(CHANNEL, "board".into()).await.unwrap();

        hub.delete_message(&sent).await.unwrap();
        assert!(!hub.is_live(sent.id));
        assert!(matches!(
            hub.delete_message(&sent).await,
            Err(TransportError::MessageNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_discard_treats_missing_message_as_deleted() {
        let hub = MemoryTransport::new();
        let answer = hub.say(CHANNEL, ALICE, "e4");

        crate::chat::discard(&hub, &answer.reference()).await.unwrap();
        crate::chat::discard(&hub, &answer.reference()).await.unwrap();
        assert!(!hub.is_live(answer.id));
    }

    #[tokio::test]
    async fn test_close_fails_waiting_collectors() {
        let hub = MemoryTransport::new();
        let waiting = {
            let hub = hub.clone();
            tokio::spawn(async move { hub.await_message(CHANNEL, Box::new(|_| true), None).await })
        };

        hub.until_listening().await;
        hub.close();

        assert!(matches!(
            waiting.await.unwrap(),
            Err(TransportError::Closed)
        ));
        assert!(matches!(
            hub.send_message(CHANNEL, "late".into()).await,
            Err(TransportError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_dropped_collector_stops_listening() {
        let hub = MemoryTransport::new();
        let waiting = {
            let hub = hub.clone();
            tokio::spawn(async move { hub.await_message(CHANNEL, Box::new(|_| true), None).await })
        };

        hub.until_listening().await;
        assert_eq!(hub.listener_count(), 1);

        waiting.abort();
        assert!(waiting.await.unwrap_err().is_cancelled());
        assert_eq!(hub.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_direct_messages_are_transcribed() {
        let hub = MemoryTransport::new();
        hub.send_direct_message(ALICE, "Available Moves: e4".to_string())
            .await
            .unwrap();

        let transcript = hub.transcript();
        assert!(matches!(
            &transcript[0],
            TranscriptEntry::Direct { to, content, .. } if *to == ALICE && content == "Available Moves: e4"
        ));
    }
}
