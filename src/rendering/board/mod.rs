//! Board presentation
//!
//! Builds the board card posted after every accepted move and keeps exactly
//! one live board per match in the channel.
//!
//! # Card layout
//!
//! - color from [`crate::core::BotSettings::embed_color`]
//! - inline `White:` / `Black:` fields naming the players
//! - the board image, drawn from Black's side when Black is to move
//! - footer `History: e4,e5` once a move has been played

pub mod renderer;

pub use renderer::{BoardRenderer, ChessboardImageRenderer};

use crate::chat::{ChatTransport, TransportResult};
use crate::game::rules::Side;
use shared::{ChannelId, Embed, MessageRef, UserId};
use std::sync::Arc;
use tracing::debug;

/// Posts board cards for one match and replaces the previous one
pub struct BoardPresenter {
    transport: Arc<dyn ChatTransport>,
    renderer: Arc<dyn BoardRenderer>,
    channel: ChannelId,
    color: u32,
    white: UserId,
    black: UserId,
    last_board: Option<MessageRef>,
}

impl BoardPresenter {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        renderer: Arc<dyn BoardRenderer>,
        channel: ChannelId,
        color: u32,
        white: UserId,
        black: UserId,
    ) -> Self {
        Self {
            transport,
            renderer,
            channel,
            color,
            white,
            black,
            last_board: None,
        }
    }

    /// Build the card for `position` (FEN) with `turn` to move.
    pub fn render(&self, position: &str, turn: Side, history: &[String]) -> Embed {
        let image = self.renderer.image_url(position, turn == Side::Black);

        let embed = Embed::new(self.color)
            .field("White:", self.white.to_string(), true)
            .field("Black:", self.black.to_string(), true)
            .image(image);

        if history.is_empty() {
            embed
        } else {
            embed.footer(format!("History: {}", history.join(",")))
        }
    }

    /// Post a new card, then delete the previous one.
    pub async fn publish(
        &mut self,
        position: &str,
        turn: Side,
        history: &[String],
    ) -> TransportResult<MessageRef> {
        let card = self.render(position, turn, history);
        let posted = self.transport.send_message(self.channel, card.into()).await?;

        if let Some(previous) = self.last_board.replace(posted) {
            self.transport.delete_message(&previous).await?;
        }
        debug!("[BOARD] Posted board {:?} in {}", posted.id, self.channel);

        Ok(posted)
    }

    /// Board message currently live in the channel
    pub fn last_board(&self) -> Option<MessageRef> {
        self.last_board
    }
}
