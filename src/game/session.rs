//! Match session aggregate
//!
//! A [`Session`] owns everything one match mutates: the rules authority,
//! the prompter, the board presenter and the match state. Sessions share
//! nothing but the transport handle, so a session needs no locks.

use crate::chat::{ChatTransport, Prompter};
use crate::core::{BotSettings, CoreResult};
use crate::game::ai::AutomatedOpponent;
use crate::game::error::SetupResult;
use crate::game::rules::{RulesAuthority, ShakmatyRules, Side};
use crate::game::setup::SetupProtocol;
use crate::game::turn::MatchState;
use crate::rendering::{BoardPresenter, BoardRenderer, ChessboardImageRenderer};
use shared::{ChannelId, ChatMessage, UserId};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantKind {
    Human,
    /// Moves come from the session's [`AutomatedOpponent`]
    Automated,
}

/// One seat of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Participant {
    pub identity: UserId,
    pub kind: ParticipantKind,
    pub side: Side,
}

impl Participant {
    pub fn is_human(&self) -> bool {
        self.kind == ParticipantKind::Human
    }
}

/// The two seats of a match, always on complementary sides.
///
/// Seat 0 is the user who started the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lineup {
    seats: [Participant; 2],
}

impl Lineup {
    pub fn new(
        invoker: UserId,
        opponent: UserId,
        opponent_kind: ParticipantKind,
        invoker_side: Side,
    ) -> Self {
        Self {
            seats: [
                Participant {
                    identity: invoker,
                    kind: ParticipantKind::Human,
                    side: invoker_side,
                },
                Participant {
                    identity: opponent,
                    kind: opponent_kind,
                    side: invoker_side.other(),
                },
            ],
        }
    }

    pub fn invoker(&self) -> Participant {
        self.seats[0]
    }

    pub fn opponent(&self) -> Participant {
        self.seats[1]
    }

    /// Participant playing `side`
    pub fn by_side(&self, side: Side) -> Participant {
        if self.seats[0].side == side {
            self.seats[0]
        } else {
            self.seats[1]
        }
    }

    pub fn participants(&self) -> &[Participant; 2] {
        &self.seats
    }
}

/// Per-match knobs taken from [`BotSettings`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub prompt_timeout: Duration,
    pub announce_draws: bool,
    pub embed_color: u32,
}

impl From<&BotSettings> for SessionConfig {
    fn from(settings: &BotSettings) -> Self {
        Self {
            prompt_timeout: settings.prompt_timeout(),
            announce_draws: settings.announce_draws,
            embed_color: settings.embed_color,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(&BotSettings::default())
    }
}

/// Collaborators every session of the bot shares
#[derive(Clone)]
pub struct SessionContext {
    pub transport: Arc<dyn ChatTransport>,
    pub renderer: Arc<dyn BoardRenderer>,
    pub automated: Option<Arc<dyn AutomatedOpponent>>,
    pub config: SessionConfig,
}

impl SessionContext {
    /// Context with the settings' board service and no automated opponent.
    pub fn new(transport: Arc<dyn ChatTransport>, settings: &BotSettings) -> CoreResult<Self> {
        let renderer = ChessboardImageRenderer::from_settings(settings)?;
        Ok(Self {
            transport,
            renderer: Arc::new(renderer),
            automated: None,
            config: SessionConfig::from(settings),
        })
    }

    pub fn with_automated_opponent(mut self, opponent: Arc<dyn AutomatedOpponent>) -> Self {
        self.automated = Some(opponent);
        self
    }
}

/// One match between two participants in one channel
pub struct Session {
    pub(crate) id: Uuid,
    pub(crate) channel: ChannelId,
    pub(crate) transport: Arc<dyn ChatTransport>,
    pub(crate) prompter: Prompter,
    pub(crate) rules: Box<dyn RulesAuthority>,
    pub(crate) lineup: Lineup,
    pub(crate) automated: Option<Arc<dyn AutomatedOpponent>>,
    pub(crate) board: BoardPresenter,
    pub(crate) config: SessionConfig,
    pub(crate) state: MatchState,
}

impl Session {
    /// Run setup for `invocation` and build a session on a fresh board.
    ///
    /// # Errors
    ///
    /// Any [`crate::game::SetupError`]; nothing has been posted to the
    /// channel except the setup prompts themselves.
    pub async fn establish(ctx: &SessionContext, invocation: &ChatMessage) -> SetupResult<Self> {
        Self::establish_with_rules(ctx, invocation, Box::new(ShakmatyRules::new())).await
    }

    /// Like [`Session::establish`] with a caller-supplied authority.
    pub async fn establish_with_rules(
        ctx: &SessionContext,
        invocation: &ChatMessage,
        rules: Box<dyn RulesAuthority>,
    ) -> SetupResult<Self> {
        let prompter = Prompter::new(ctx.transport.clone(), invocation.channel);

        let lineup = SetupProtocol::new(
            &prompter,
            invocation,
            ctx.automated.as_ref(),
            ctx.config.prompt_timeout,
        )
        .run()
        .await?;

        Ok(Self::assemble(ctx, invocation.channel, lineup, rules, prompter))
    }

    /// Build a session for an already decided lineup.
    pub fn from_lineup(
        ctx: &SessionContext,
        channel: ChannelId,
        lineup: Lineup,
        rules: Box<dyn RulesAuthority>,
    ) -> Self {
        let prompter = Prompter::new(ctx.transport.clone(), channel);
        Self::assemble(ctx, channel, lineup, rules, prompter)
    }

    fn assemble(
        ctx: &SessionContext,
        channel: ChannelId,
        lineup: Lineup,
        rules: Box<dyn RulesAuthority>,
        prompter: Prompter,
    ) -> Self {
        let board = BoardPresenter::new(
            ctx.transport.clone(),
            ctx.renderer.clone(),
            channel,
            ctx.config.embed_color,
            lineup.by_side(Side::White).identity,
            lineup.by_side(Side::Black).identity,
        );

        let id = Uuid::new_v4();
        info!(
            "[SETUP] Session {} in {}: {} (White) vs {} (Black)",
            id,
            channel,
            lineup.by_side(Side::White).identity,
            lineup.by_side(Side::Black).identity
        );

        Self {
            id,
            channel,
            transport: ctx.transport.clone(),
            prompter,
            rules,
            lineup,
            automated: ctx.automated.clone(),
            board,
            config: ctx.config,
            state: MatchState::Ready,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn lineup(&self) -> &Lineup {
        &self.lineup
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn rules(&self) -> &dyn RulesAuthority {
        self.rules.as_ref()
    }

    /// Prompter reserved for this session; at most one prompt at a time
    pub fn prompter(&self) -> &Prompter {
        &self.prompter
    }
}
