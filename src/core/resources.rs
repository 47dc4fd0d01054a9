//! Bot-wide settings
//!
//! Settings are layered: defaults, then the settings file, then environment
//! variables, then command-line flags. Each layer only overrides what it sets.

use crate::core::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable names read by [`BotSettings::apply_overrides`]
pub const ENV_PREFIX: &str = "CHESS_PREFIX";
pub const ENV_PROMPT_TIMEOUT: &str = "CHESS_PROMPT_TIMEOUT_SECS";
pub const ENV_BOARD_URL: &str = "CHESS_BOARD_URL";
pub const ENV_ANNOUNCE_DRAWS: &str = "CHESS_ANNOUNCE_DRAWS";
pub const ENV_PORT: &str = "PORT";

/// Settings shared by every command and session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotSettings {
    /// Prefix that marks a chat message as a command (`!chess`)
    pub command_prefix: String,

    /// How long a setup prompt waits for its answer
    pub prompt_timeout_secs: u64,

    /// Base URL of the board image service; the position is appended to it
    pub board_image_url: String,

    /// Accent color of the board card
    pub embed_color: u32,

    /// Announce stalemates and other non-mate endings as draws instead of
    /// crediting the player who made the last move
    pub announce_draws: bool,

    /// Port of the health-check server
    pub health_port: u16,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            command_prefix: "!".to_string(),
            prompt_timeout_secs: 30,
            board_image_url: "https://chessboardimage.com/".to_string(),
            embed_color: 0x0099ff,
            announce_draws: false,
            health_port: backend::DEFAULT_PORT,
        }
    }
}

impl BotSettings {
    pub fn prompt_timeout(&self) -> Duration {
        Duration::from_secs(self.prompt_timeout_secs)
    }

    /// Apply overrides from a variable lookup (normally `std::env::var`).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> CoreResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(prefix) = lookup(ENV_PREFIX) {
            self.command_prefix = prefix;
        }
        if let Some(raw) = lookup(ENV_PROMPT_TIMEOUT) {
            self.prompt_timeout_secs = parse_override(ENV_PROMPT_TIMEOUT, &raw)?;
        }
        if let Some(url) = lookup(ENV_BOARD_URL) {
            self.board_image_url = url;
        }
        if let Some(raw) = lookup(ENV_ANNOUNCE_DRAWS) {
            self.announce_draws = parse_override(ENV_ANNOUNCE_DRAWS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_PORT) {
            self.health_port = parse_override(ENV_PORT, &raw)?;
        }
        Ok(())
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, raw: &str) -> CoreResult<T> {
    raw.trim().parse().map_err(|_| CoreError::InvalidOverride {
        key: key.to_string(),
        value: raw.to_string(),
    })
}
