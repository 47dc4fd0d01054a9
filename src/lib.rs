//! chessroom - chess matches refereed by a chat bot
//!
//! - [`chat`] - transport capability, in-memory hub, prompts, console
//! - [`game`] - setup, turn loop and the rules authority
//! - [`rendering`] - board cards and image URLs
//! - [`commands`] - `chess`, `time` and `help`
//! - [`bot`] - event dispatch, one task per command
//! - [`core`] - settings and their persistence

pub mod bot;
pub mod chat;
pub mod commands;
pub mod core;
pub mod game;
pub mod rendering;

pub use bot::Bot;
