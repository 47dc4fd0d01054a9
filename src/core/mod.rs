//! Core module - configuration and error infrastructure
//!
//! - [`BotSettings`] - prefix, prompt timeout, board image service, draw policy
//! - [`settings_persistence`] - JSON settings file in the user config dir
//! - [`CoreError`] - configuration failures

pub mod error;
pub mod resources;
pub mod settings_persistence;

// Re-export commonly used items
pub use error::{CoreError, CoreResult};
pub use resources::*;
pub use settings_persistence::{load_settings, save_settings, settings_path};
