//! Automated opponent seam
//!
//! Picking 🎲 during setup seats an [`AutomatedOpponent`] as the second
//! participant. No strategy ships with the bot; without one, AI mode fails
//! with [`crate::game::SetupError::UnimplementedMode`].

use crate::game::rules::Side;
use async_trait::async_trait;
use shared::UserId;

/// Strategy that plays one side of a match
#[async_trait]
pub trait AutomatedOpponent: Send + Sync {
    /// Chat identity the opponent plays under
    fn identity(&self) -> UserId;

    /// Pick one of `legal_moves` (SAN) for `side` in `position` (FEN).
    ///
    /// Returning `None` in a non-terminal position ends the session with
    /// [`crate::game::SessionError::AutomatedOpponentStalled`].
    async fn choose_move(&self, position: &str, side: Side, legal_moves: &[String])
        -> Option<String>;
}
