//! `shakmaty`-backed rules authority

use super::{RulesAuthority, Side};
use crate::game::error::{RulesError, RulesResult};
use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Move, Position};
use std::collections::HashMap;
use tracing::debug;

/// Half-moves without capture or pawn move that end the game
const FIFTY_MOVE_HALFMOVES: u32 = 100;

const REPETITION_LIMIT: u32 = 3;

/// Standard chess through `shakmaty`, plus the SAN history and repetition
/// counts `shakmaty` does not keep.
#[derive(Debug, Clone)]
pub struct ShakmatyRules {
    position: Chess,
    history: Vec<String>,
    /// Occurrences of each position, keyed by placement, turn, castling and
    /// en passant fields of its FEN
    repetitions: HashMap<String, u32>,
}

impl ShakmatyRules {
    pub fn new() -> Self {
        let mut rules = Self {
            position: Chess::default(),
            history: Vec::new(),
            repetitions: HashMap::new(),
        };
        rules.record_position();
        rules
    }

    /// Start from an arbitrary position.
    ///
    /// # Errors
    ///
    /// [`RulesError::InvalidPosition`] if `fen` does not parse or describes
    /// an illegal setup.
    pub fn from_fen(fen: &str) -> RulesResult<Self> {
        let parsed: Fen = fen.parse().map_err(|e| RulesError::InvalidPosition {
            fen: fen.to_string(),
            message: format!("{e}"),
        })?;
        let position: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| RulesError::InvalidPosition {
                fen: fen.to_string(),
                message: format!("{e}"),
            })?;

        let mut rules = Self {
            position,
            history: Vec::new(),
            repetitions: HashMap::new(),
        };
        rules.record_position();
        Ok(rules)
    }

    fn fen(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }

    fn repetition_key(&self) -> String {
        self.fen()
            .split_whitespace()
            .take(4)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn record_position(&mut self) {
        let key = self.repetition_key();
        *self.repetitions.entry(key).or_insert(0) += 1;
    }

    fn is_threefold_repetition(&self) -> bool {
        self.repetitions
            .get(&self.repetition_key())
            .is_some_and(|count| *count >= REPETITION_LIMIT)
    }

    fn san_of(&self, m: &Move) -> String {
        let mut after = self.position.clone();
        SanPlus::from_move_and_play_unchecked(&mut after, m).to_string()
    }
}

impl Default for ShakmatyRules {
    fn default() -> Self {
        Self::new()
    }
}

impl RulesAuthority for ShakmatyRules {
    fn reset(&mut self) {
        *self = Self::new();
    }

    fn turn(&self) -> Side {
        self.position.turn().into()
    }

    fn legal_moves(&self) -> Vec<String> {
        self.position
            .legal_moves()
            .iter()
            .map(|m| self.san_of(m))
            .collect()
    }

    fn apply_move(&mut self, san: &str) -> RulesResult<()> {
        let chosen = self
            .position
            .legal_moves()
            .iter()
            .find(|m| self.san_of(m) == san)
            .cloned()
            .ok_or_else(|| RulesError::IllegalMove {
                san: san.to_string(),
            })?;

        let played = SanPlus::from_move_and_play_unchecked(&mut self.position, &chosen);
        debug!("[RULES] Played {}", played);

        self.history.push(played.to_string());
        self.record_position();
        Ok(())
    }

    fn is_game_over(&self) -> bool {
        self.position.is_game_over()
            || self.position.halfmoves() >= FIFTY_MOVE_HALFMOVES
            || self.is_threefold_repetition()
    }

    fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    fn position(&self) -> String {
        self.fen()
    }

    fn history(&self) -> Vec<String> {
        self.history.clone()
    }
}
