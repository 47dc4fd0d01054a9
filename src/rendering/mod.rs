//! Rendering module - chess boards as chat cards
//!
//! - `board` - board image URLs and the per-match board card

pub mod board;

pub use board::{BoardPresenter, BoardRenderer, ChessboardImageRenderer};
