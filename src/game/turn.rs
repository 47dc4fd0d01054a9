//! Turn loop
//!
//! The match is an explicit state machine driven by one move per step:
//!
//! ```text
//! Ready ──open──▶ AwaitingMove(mover) ──accepted, not over──▶ AwaitingMove(next)
//!                      │  ▲
//!                      │  └── rejected (notice posted, same mover)
//!                      └──accepted, game over──▶ Terminal(outcome)
//! ```
//!
//! `Terminal` is absorbing: further plies fail with
//! [`SessionError::MatchOver`]. The next mover is always the participant
//! whose color matches the side to move after the ply.

use crate::chat::{discard, TransportError};
use crate::game::error::{SessionError, SessionResult};
use crate::game::rules::Side;
use crate::game::session::{Participant, ParticipantKind, Session};
use shared::UserId;
use tracing::{debug, info};

pub const MOVE_REJECTED_NOTICE: &str =
    "Move not available, see your DM to check what moves you can do";
pub const DRAW_NOTICE: &str = "The game ends in a draw 🤝";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// `winner` played `side`
    Won { winner: UserId, side: Side },
    Drawn,
}

impl MatchOutcome {
    pub fn announcement(&self) -> String {
        match self {
            MatchOutcome::Won { winner, .. } => format!("Congratulations {winner}, you win 🎉"),
            MatchOutcome::Drawn => DRAW_NOTICE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    /// Setup finished, opening board not posted yet
    Ready,
    AwaitingMove { mover: Participant },
    Terminal(MatchOutcome),
}

impl MatchState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MatchState::Terminal(_))
    }

    pub fn mover(&self) -> Option<Participant> {
        match self {
            MatchState::AwaitingMove { mover } => Some(*mover),
            _ => None,
        }
    }
}

/// Result of one ply attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlyOutcome {
    /// Not in the legal-move list; the same participant moves again
    Rejected,
    Continued { next: Participant },
    Finished(MatchOutcome),
}

impl Session {
    /// Post the opening board and tell White their moves.
    pub async fn open(&mut self) -> SessionResult<()> {
        match self.state {
            MatchState::Ready => {}
            MatchState::AwaitingMove { .. } => return Ok(()),
            MatchState::Terminal(_) => return Err(SessionError::MatchOver),
        }

        self.publish_board().await?;

        let mover = self.lineup.by_side(self.rules.turn());
        self.offer_moves(mover).await?;
        self.state = MatchState::AwaitingMove { mover };

        info!("[TURN] Session {} opened, {} to move", self.id, mover.identity);
        Ok(())
    }

    /// Play the match to its end.
    ///
    /// Waits for human moves without a timeout.
    ///
    /// # Errors
    ///
    /// Transport failures end the match; so does an automated opponent
    /// that stops producing moves.
    pub async fn play(&mut self) -> SessionResult<MatchOutcome> {
        loop {
            match self.state {
                MatchState::Ready => self.open().await?,
                MatchState::AwaitingMove { mover } => {
                    let input = self.next_input(mover).await?;
                    self.handle_ply(&input).await?;
                }
                MatchState::Terminal(outcome) => return Ok(outcome),
            }
        }
    }

    /// Submit `input` for the participant currently to move.
    ///
    /// # Returns
    ///
    /// [`PlyOutcome::Rejected`] if `input` is not exactly one of the legal
    /// moves. Game over is only checked after an accepted move.
    pub async fn handle_ply(&mut self, input: &str) -> SessionResult<PlyOutcome> {
        let mover = match self.state {
            MatchState::AwaitingMove { mover } => mover,
            MatchState::Ready => return Err(SessionError::NotStarted),
            MatchState::Terminal(_) => return Err(SessionError::MatchOver),
        };

        let turn_before = self.rules.turn();

        if !self.rules.legal_moves().iter().any(|m| m == input) {
            debug!("[TURN] Session {}: rejected {:?} from {}", self.id, input, mover.identity);
            self.transport
                .send_message(self.channel, MOVE_REJECTED_NOTICE.into())
                .await?;
            return Ok(PlyOutcome::Rejected);
        }

        self.rules.apply_move(input)?;
        self.publish_board().await?;
        info!("[TURN] Session {}: {} played {}", self.id, mover.identity, input);

        let next = self.lineup.by_side(self.rules.turn());

        if !self.rules.is_game_over() {
            self.offer_moves(next).await?;
            self.state = MatchState::AwaitingMove { mover: next };
            return Ok(PlyOutcome::Continued { next });
        }

        self.publish_board().await?;

        let outcome = self.decide(turn_before);
        self.transport
            .send_message(self.channel, outcome.announcement().into())
            .await?;
        self.state = MatchState::Terminal(outcome);

        info!("[TURN] Session {} finished: {:?}", self.id, outcome);
        Ok(PlyOutcome::Finished(outcome))
    }

    /// The player whose color was to move before the final ply wins, unless
    /// draws are announced and the final position is not mate.
    fn decide(&self, turn_before: Side) -> MatchOutcome {
        if self.config.announce_draws && !self.rules.is_checkmate() {
            return MatchOutcome::Drawn;
        }

        MatchOutcome::Won {
            winner: self.lineup.by_side(turn_before).identity,
            side: turn_before,
        }
    }

    async fn publish_board(&mut self) -> SessionResult<()> {
        let position = self.rules.position();
        let turn = self.rules.turn();
        let history = self.rules.history();

        self.board.publish(&position, turn, &history).await?;
        Ok(())
    }

    /// DM a human participant the moves available to them.
    async fn offer_moves(&self, participant: Participant) -> SessionResult<()> {
        if !participant.is_human() {
            return Ok(());
        }

        let moves = self.rules.legal_moves().join(", ");
        self.transport
            .send_direct_message(participant.identity, format!("Available Moves: {moves}"))
            .await?;
        Ok(())
    }

    /// Collect the next move text from `mover`.
    ///
    /// A human's message is deleted from the channel whether or not the
    /// move turns out to be legal.
    async fn next_input(&self, mover: Participant) -> SessionResult<String> {
        match mover.kind {
            ParticipantKind::Human => {
                let author = mover.identity;
                let message = self
                    .transport
                    .await_message(self.channel, Box::new(move |m| m.author == author), None)
                    .await?
                    .ok_or(TransportError::Closed)?;

                discard(self.transport.as_ref(), &message.reference()).await?;
                Ok(message.content)
            }
            ParticipantKind::Automated => {
                let stalled = || SessionError::AutomatedOpponentStalled {
                    identity: mover.identity.to_string(),
                };
                let opponent = self.automated.as_ref().ok_or_else(stalled)?;

                let legal = self.rules.legal_moves();
                let position = self.rules.position();
                let choice = opponent.choose_move(&position, mover.side, &legal).await;

                choice
                    .filter(|m| legal.contains(m))
                    .ok_or_else(stalled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{MemoryTransport, TranscriptEntry};
    use crate::core::BotSettings;
    use crate::game::ai::scripted::ScriptedOpponent;
    use crate::game::rules::ShakmatyRules;
    use crate::game::session::{Lineup, SessionContext};
    use shared::{ChannelId, OutgoingMessage};
    use std::sync::Arc;

    const CHANNEL: ChannelId = ChannelId(9);
    const HUMAN: UserId = UserId(1);
    const ENGINE: UserId = UserId(99);

    fn context(hub: &MemoryTransport, settings: &BotSettings) -> SessionContext {
        SessionContext::new(Arc::new(hub.clone()), settings).unwrap()
    }

    fn texts(hub: &MemoryTransport) -> Vec<String> {
        hub.transcript()
            .into_iter()
            .filter_map(|entry| match entry {
                TranscriptEntry::Posted {
                    content: OutgoingMessage::Text(text),
                    ..
                } => Some(text),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_ply_before_open_is_rejected() {
        let hub = MemoryTransport::new();
        let ctx = context(&hub, &BotSettings::default());
        let lineup = Lineup::new(HUMAN, UserId(2), ParticipantKind::Human, Side::White);
        let mut session =
            Session::from_lineup(&ctx, CHANNEL, lineup, Box::new(ShakmatyRules::new()));

        assert!(matches!(
            session.handle_ply("e4").await,
            Err(SessionError::NotStarted)
        ));
    }

    #[tokio::test]
    async fn test_automated_opponent_moves_without_prompting() {
        let hub = MemoryTransport::new();
        let engine = Arc::new(ScriptedOpponent::new(ENGINE, &["e5", "Qh4#"]));
        let ctx = context(&hub, &BotSettings::default()).with_automated_opponent(engine);
        let lineup = Lineup::new(HUMAN, ENGINE, ParticipantKind::Automated, Side::White);
        let mut session =
            Session::from_lineup(&ctx, CHANNEL, lineup, Box::new(ShakmatyRules::new()));

        session.open().await.unwrap();
        assert_eq!(
            session.handle_ply("f3").await.unwrap(),
            PlyOutcome::Continued {
                next: lineup.opponent()
            }
        );

        let reply = session.next_input(lineup.opponent()).await.unwrap();
        assert_eq!(reply, "e5");
        session.handle_ply(&reply).await.unwrap();
        session.handle_ply("g4").await.unwrap();

        let reply = session.next_input(lineup.opponent()).await.unwrap();
        let outcome = session.handle_ply(&reply).await.unwrap();
        assert_eq!(
            outcome,
            PlyOutcome::Finished(MatchOutcome::Won {
                winner: ENGINE,
                side: Side::Black
            })
        );
        assert_eq!(
            texts(&hub).last().map(String::as_str),
            Some("Congratulations <@99>, you win 🎉")
        );

        let dms = hub
            .transcript()
            .into_iter()
            .filter(|e| matches!(e, TranscriptEntry::Direct { .. }))
            .count();
        assert_eq!(dms, 2, "only the human is told their moves");
    }

    #[tokio::test]
    async fn test_stalled_automated_opponent_ends_session() {
        let hub = MemoryTransport::new();
        let engine = Arc::new(ScriptedOpponent::new(ENGINE, &[]));
        let ctx = context(&hub, &BotSettings::default()).with_automated_opponent(engine);
        let lineup = Lineup::new(HUMAN, ENGINE, ParticipantKind::Automated, Side::Black);
        let mut session =
            Session::from_lineup(&ctx, CHANNEL, lineup, Box::new(ShakmatyRules::new()));

        let err = session.play().await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::AutomatedOpponentStalled { .. }
        ));
    }

    #[tokio::test]
    async fn test_stalemate_announced_as_draw_when_enabled() {
        let hub = MemoryTransport::new();
        let settings = BotSettings {
            announce_draws: true,
            ..Default::default()
        };
        let ctx = context(&hub, &settings);
        let lineup = Lineup::new(HUMAN, UserId(2), ParticipantKind::Human, Side::White);
        let rules = ShakmatyRules::from_fen("7k/8/6K1/8/8/8/8/5Q2 w - - 0 1").unwrap();
        let mut session = Session::from_lineup(&ctx, CHANNEL, lineup, Box::new(rules));

        session.open().await.unwrap();
        let outcome = session.handle_ply("Qf7").await.unwrap();

        assert_eq!(outcome, PlyOutcome::Finished(MatchOutcome::Drawn));
        assert_eq!(texts(&hub).last().map(String::as_str), Some(DRAW_NOTICE));
    }

    #[tokio::test]
    async fn test_stalemate_credits_mover_by_default() {
        let hub = MemoryTransport::new();
        let ctx = context(&hub, &BotSettings::default());
        let lineup = Lineup::new(HUMAN, UserId(2), ParticipantKind::Human, Side::White);
        let rules = ShakmatyRules::from_fen("7k/8/6K1/8/8/8/8/5Q2 w - - 0 1").unwrap();
        let mut session = Session::from_lineup(&ctx, CHANNEL, lineup, Box::new(rules));

        session.open().await.unwrap();
        let outcome = session.handle_ply("Qf7").await.unwrap();

        assert_eq!(
            outcome,
            PlyOutcome::Finished(MatchOutcome::Won {
                winner: HUMAN,
                side: Side::White
            })
        );
    }
}
