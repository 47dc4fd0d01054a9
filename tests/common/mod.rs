//! Shared helpers for match integration tests
//!
//! A [`Table`] is one channel of a [`MemoryTransport`] with scripted users.
//! Every helper that answers the bot first waits until the bot is listening,
//! so answers are never sent before the collector they target exists.

#![allow(dead_code)]

use async_trait::async_trait;
use chessroom::chat::{MemoryTransport, TranscriptEntry};
use chessroom::core::BotSettings;
use chessroom::game::{
    AutomatedOpponent, MatchOutcome, RulesAuthority, RulesResult, Session, SessionContext,
    SessionResult, ShakmatyRules, Side,
};
use shared::{ChannelId, ChatMessage, Embed, OutgoingMessage, UserId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub const ALICE: UserId = UserId(1);
pub const BOB: UserId = UserId(2);
pub const ENGINE: UserId = UserId(900);
pub const CHANNEL: ChannelId = ChannelId(10);

pub struct Table {
    pub hub: MemoryTransport,
    pub ctx: SessionContext,
    pub channel: ChannelId,
}

impl Table {
    pub fn new() -> Self {
        Self::with_settings(&BotSettings::default())
    }

    pub fn with_settings(settings: &BotSettings) -> Self {
        let hub = MemoryTransport::new();
        let ctx = SessionContext::new(Arc::new(hub.clone()), settings)
            .expect("default board URL is valid");
        Self {
            hub,
            ctx,
            channel: CHANNEL,
        }
    }

    /// Setup prompts expire after `timeout`.
    pub fn with_prompt_timeout(mut self, timeout: Duration) -> Self {
        self.ctx.config.prompt_timeout = timeout;
        self
    }

    pub fn with_opponent(mut self, opponent: Arc<dyn AutomatedOpponent>) -> Self {
        self.ctx = self.ctx.with_automated_opponent(opponent);
        self
    }

    /// `author` posts `content`; returns the message as delivered.
    pub fn say(&self, author: UserId, content: &str) -> ChatMessage {
        self.hub.say(self.channel, author, content)
    }

    /// Run setup and the whole match for `invocation` in a task.
    pub fn start(&self, invocation: ChatMessage) -> JoinHandle<SessionResult<MatchOutcome>> {
        self.start_with_rules(invocation, Box::new(ShakmatyRules::new()))
    }

    pub fn start_with_rules(
        &self,
        invocation: ChatMessage,
        rules: Box<dyn RulesAuthority>,
    ) -> JoinHandle<SessionResult<MatchOutcome>> {
        let ctx = self.ctx.clone();
        tokio::spawn(async move {
            let mut session = Session::establish_with_rules(&ctx, &invocation, rules).await?;
            session.play().await
        })
    }

    /// Wait for a reaction prompt, then click `emoji` on it as `user`.
    pub async fn react(&self, user: UserId, emoji: &str) {
        self.hub.until_listening().await;
        let prompt = self
            .hub
            .latest_reactable(self.channel)
            .expect("a prompt with reaction options");
        self.hub.react_as(prompt.id, user, emoji);
    }

    /// Wait until the bot listens, then post `content` as `user`.
    pub async fn reply(&self, user: UserId, content: &str) -> ChatMessage {
        self.hub.until_listening().await;
        self.say(user, content)
    }

    /// Play `moves` alternately, starting with `first`.
    pub async fn play_moves(&self, first: UserId, second: UserId, moves: &[&str]) {
        for (ply, san) in moves.iter().enumerate() {
            let mover = if ply % 2 == 0 { first } else { second };
            self.reply(mover, san).await;
        }
    }

    pub fn posted(&self) -> Vec<OutgoingMessage> {
        self.hub
            .transcript()
            .into_iter()
            .filter_map(|entry| match entry {
                TranscriptEntry::Posted { content, .. } => Some(content),
                _ => None,
            })
            .collect()
    }

    /// Plain-text messages the bot posted in the channel
    pub fn texts(&self) -> Vec<String> {
        self.posted()
            .into_iter()
            .filter_map(|content| content.as_text().map(str::to_string))
            .collect()
    }

    /// Board cards the bot posted, in order
    pub fn boards(&self) -> Vec<Embed> {
        self.posted()
            .into_iter()
            .filter_map(|content| content.as_embed().cloned())
            .collect()
    }

    /// Direct messages sent to `user`, in order
    pub fn dms_to(&self, user: UserId) -> Vec<String> {
        self.hub
            .transcript()
            .into_iter()
            .filter_map(|entry| match entry {
                TranscriptEntry::Direct { to, content, .. } if to == user => Some(content),
                _ => None,
            })
            .collect()
    }

    /// Messages currently visible in the channel that the bot posted
    pub fn live_posts(&self) -> usize {
        self.hub
            .transcript()
            .into_iter()
            .filter_map(|entry| match entry {
                TranscriptEntry::Posted { message, .. } => Some(message.id),
                _ => None,
            })
            .filter(|id| self.hub.is_live(*id))
            .count()
    }
}

/// Rules authority that counts game-over queries
pub struct SpyRules {
    inner: ShakmatyRules,
    pub game_over_queries: Arc<AtomicUsize>,
}

impl SpyRules {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let counter = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner: ShakmatyRules::new(),
                game_over_queries: counter.clone(),
            },
            counter,
        )
    }
}

impl RulesAuthority for SpyRules {
    fn reset(&mut self) {
        self.inner.reset()
    }

    fn turn(&self) -> Side {
        self.inner.turn()
    }

    fn legal_moves(&self) -> Vec<String> {
        self.inner.legal_moves()
    }

    fn apply_move(&mut self, san: &str) -> RulesResult<()> {
        self.inner.apply_move(san)
    }

    fn is_game_over(&self) -> bool {
        self.game_over_queries.fetch_add(1, Ordering::SeqCst);
        self.inner.is_game_over()
    }

    fn is_checkmate(&self) -> bool {
        self.inner.is_checkmate()
    }

    fn position(&self) -> String {
        self.inner.position()
    }

    fn history(&self) -> Vec<String> {
        self.inner.history()
    }
}

/// Always plays the first legal move it is offered
pub struct FirstMoveOpponent;

#[async_trait]
impl AutomatedOpponent for FirstMoveOpponent {
    fn identity(&self) -> UserId {
        ENGINE
    }

    async fn choose_move(
        &self,
        _position: &str,
        _side: Side,
        legal_moves: &[String],
    ) -> Option<String> {
        legal_moves.first().cloned()
    }
}
