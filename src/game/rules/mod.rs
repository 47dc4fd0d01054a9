//! Chess rules module - the rules authority seam
//!
//! The session never evaluates chess itself. It asks a [`RulesAuthority`]
//! for the side to move, the legal moves in SAN (`Qxf7#`), whether the game
//! is over, and the position as FEN for the board image.
//!
//! # Module Structure
//!
//! - [`authority`] - [`ShakmatyRules`], the `shakmaty`-backed authority
//!
//! # Game Over
//!
//! A position is terminal on checkmate, stalemate, insufficient material,
//! threefold repetition, or once 100 half-moves pass without a capture or
//! pawn move. Only checkmate has a loser; see [`RulesAuthority::is_checkmate`].

pub mod authority;


pub use authority::ShakmatyRules;

use crate::game::error::RulesResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Color a participant plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Single-letter turn token, as in FEN (`w` / `b`)
    pub fn token(self) -> char {
        match self {
            Side::White => 'w',
            Side::Black => 'b',
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => write!(f, "White"),
            Side::Black => write!(f, "Black"),
        }
    }
}

impl From<shakmaty::Color> for Side {
    fn from(color: shakmaty::Color) -> Self {
        match color {
            shakmaty::Color::White => Side::White,
            shakmaty::Color::Black => Side::Black,
        }
    }
}

/// Chess legality, move application and game-over detection for one match.
///
/// One instance per session, never shared.
pub trait RulesAuthority: Send + Sync {
    /// Return to the standard starting position with an empty history
    fn reset(&mut self);

    /// Side to move
    fn turn(&self) -> Side;

    /// Every legal move in SAN with check/mate suffix
    fn legal_moves(&self) -> Vec<String>;

    /// Apply `san`, which must be an exact member of [`Self::legal_moves`].
    ///
    /// # Errors
    ///
    /// [`crate::game::RulesError::IllegalMove`] if `san` is not listed. The
    /// position is unchanged in that case.
    fn apply_move(&mut self, san: &str) -> RulesResult<()>;

    fn is_game_over(&self) -> bool;

    /// Side to move is in check with no legal moves
    fn is_checkmate(&self) -> bool;

    /// Current position as FEN
    fn position(&self) -> String;

    /// Moves applied so far, in SAN
    fn history(&self) -> Vec<String>;
}
