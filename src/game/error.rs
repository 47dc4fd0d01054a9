//! Error types for game module
//!
//! Setup failures abort a match before any board is posted. Session failures
//! end a running match. An unlisted move is not an error at all: the turn
//! loop reports it as [`crate::game::PlyOutcome::Rejected`].

use crate::chat::{PromptError, TransportError};
use std::time::Duration;

/// Errors raised by the rules authority
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    /// Move text is not in the current legal-move list
    #[error("Illegal move: {san}")]
    IllegalMove { san: String },

    #[error("Invalid position {fen}: {message}")]
    InvalidPosition { fen: String, message: String },
}

/// Result type alias for rules operations
pub type RulesResult<T> = Result<T, RulesError>;

/// Errors that abort match setup
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// A setup prompt expired without a qualifying answer
    #[error("No reaction after {} seconds, operation canceled", .timeout.as_secs())]
    TimedOut { timeout: Duration },

    /// The "Which Player?" answer mentioned nobody
    #[error("Player Not Found")]
    OpponentNotFound,

    /// AI mode was picked but no automated opponent is installed
    #[error("AI opponents are not available yet")]
    UnimplementedMode,

    /// The session already had a prompt outstanding
    #[error("Setup prompt overlapped a pending prompt")]
    Prompt(#[source] PromptError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<PromptError> for SetupError {
    fn from(err: PromptError) -> Self {
        match err {
            PromptError::TimedOut { timeout } => SetupError::TimedOut { timeout },
            PromptError::Transport(err) => SetupError::Transport(err),
            other => SetupError::Prompt(other),
        }
    }
}

impl SetupError {
    /// Text posted to the channel when setup is aborted.
    ///
    /// Transport failures get no notice since the channel is unreachable.
    pub fn notice(&self) -> Option<String> {
        match self {
            SetupError::Transport(_) => None,
            other => Some(other.to_string()),
        }
    }
}

/// Result type alias for setup operations
pub type SetupResult<T> = Result<T, SetupError>;

/// Errors that end a running match
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Setup failed: {0}")]
    Setup(#[from] SetupError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The authority refused a move it listed as legal
    #[error("Rules authority error: {0}")]
    Rules(#[from] RulesError),

    /// A ply was submitted after the match reached a terminal position
    #[error("The match is already over")]
    MatchOver,

    /// A ply was submitted before the opening board was posted
    #[error("The match has not started")]
    NotStarted,

    /// The automated opponent produced no move in a non-terminal position
    #[error("Automated opponent {identity} returned no move")]
    AutomatedOpponentStalled { identity: String },
}

/// Result type alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;
