//! Setup protocol
//!
//! Decides who plays and with which color before the first board is posted:
//!
//! 1. The invoker takes seat 0.
//! 2. A mention in the command picks the opponent directly. Otherwise the
//!    invoker picks ♟️ (then names a player) or 🎲 (automated opponent).
//! 3. The invoker picks 🌝 or 🌚; the opponent gets the other color.
//!
//! Every prompt answers to the invoker only. Any failure aborts setup.

use crate::chat::{Prompt, Prompter};
use crate::game::ai::AutomatedOpponent;
use crate::game::error::{SetupError, SetupResult};
use crate::game::rules::Side;
use crate::game::session::{Lineup, ParticipantKind};
use shared::{ChatMessage, UserId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const WHITE_EMOJI: &str = "🌝";
pub const BLACK_EMOJI: &str = "🌚";
pub const PLAYER_EMOJI: &str = "♟️";
pub const AI_EMOJI: &str = "🎲";

pub const OPPONENT_MODE_PROMPT: &str = "Who will you play against? ♟️ Player or 🎲 IA?";
pub const OPPONENT_NAME_PROMPT: &str = "Which Player?";
pub const COLOR_PROMPT: &str = "Choose a color to start";

impl Side {
    /// Reaction that selects this color during setup
    pub fn emoji(self) -> &'static str {
        match self {
            Side::White => WHITE_EMOJI,
            Side::Black => BLACK_EMOJI,
        }
    }
}

pub struct SetupProtocol<'a> {
    prompter: &'a Prompter,
    invocation: &'a ChatMessage,
    automated: Option<&'a Arc<dyn AutomatedOpponent>>,
    timeout: Duration,
}

impl<'a> SetupProtocol<'a> {
    pub fn new(
        prompter: &'a Prompter,
        invocation: &'a ChatMessage,
        automated: Option<&'a Arc<dyn AutomatedOpponent>>,
        timeout: Duration,
    ) -> Self {
        Self {
            prompter,
            invocation,
            automated,
            timeout,
        }
    }

    fn invoker(&self) -> UserId {
        self.invocation.author
    }

    pub async fn run(&self) -> SetupResult<Lineup> {
        let (opponent, kind) = self.pick_opponent().await?;
        let side = self.pick_side().await?;

        info!(
            "[SETUP] {} plays {} against {} ({:?})",
            self.invoker(),
            side,
            opponent,
            kind
        );
        Ok(Lineup::new(self.invoker(), opponent, kind, side))
    }

    async fn pick_opponent(&self) -> SetupResult<(UserId, ParticipantKind)> {
        if let Some(challenged) = self.invocation.first_mention() {
            return Ok((challenged, ParticipantKind::Human));
        }

        let mode = self
            .prompter
            .issue(Prompt::reaction_choice(
                OPPONENT_MODE_PROMPT,
                &[PLAYER_EMOJI, AI_EMOJI],
                self.invoker(),
                self.timeout,
            ))
            .await?;

        if mode.choice() == Some(AI_EMOJI) {
            return match self.automated {
                Some(opponent) => Ok((opponent.identity(), ParticipantKind::Automated)),
                None => {
                    warn!("[SETUP] AI mode picked but no automated opponent is installed");
                    Err(SetupError::UnimplementedMode)
                }
            };
        }

        let answer = self
            .prompter
            .issue(Prompt::message_choice(
                OPPONENT_NAME_PROMPT,
                self.invoker(),
                self.timeout,
            ))
            .await?;

        answer
            .message()
            .and_then(ChatMessage::first_mention)
            .map(|challenged| (challenged, ParticipantKind::Human))
            .ok_or(SetupError::OpponentNotFound)
    }

    async fn pick_side(&self) -> SetupResult<Side> {
        let color = self
            .prompter
            .issue(Prompt::reaction_choice(
                COLOR_PROMPT,
                &[WHITE_EMOJI, BLACK_EMOJI],
                self.invoker(),
                self.timeout,
            ))
            .await?;

        Ok(if color.choice() == Some(WHITE_EMOJI) {
            Side::White
        } else {
            Side::Black
        })
    }
}
