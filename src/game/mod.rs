//! Chess match module - one match per chat command
//!
//! Runs a match between two chat participants: setup prompts, then a turn
//! loop that validates each posted move against the rules authority until
//! the game is over.
//!
//! # Module Organization
//!
//! - `rules` - [`RulesAuthority`] seam and the `shakmaty` implementation
//! - `setup` - opponent and color selection
//! - `session` - the [`Session`] aggregate and its [`Lineup`]
//! - `turn` - the [`MatchState`] machine and ply handling
//! - `ai` - [`AutomatedOpponent`] seam for the 🎲 seat
//! - `error` - setup, session and rules errors
//!
//! # Flow
//!
//! 1. [`Session::establish`] runs setup; failures abort before any board
//! 2. [`Session::open`] posts the opening board and DMs White their moves
//! 3. [`Session::play`] loops one ply at a time until `Terminal`

pub mod ai;
pub mod error;
pub mod rules;
pub mod session;
pub mod setup;
pub mod turn;

pub use ai::AutomatedOpponent;
pub use error::{
    RulesError, RulesResult, SessionError, SessionResult, SetupError, SetupResult,
};
pub use rules::{RulesAuthority, ShakmatyRules, Side};
pub use session::{
    Lineup, Participant, ParticipantKind, Session, SessionConfig, SessionContext,
};
pub use setup::SetupProtocol;
pub use turn::{MatchOutcome, MatchState, PlyOutcome};
