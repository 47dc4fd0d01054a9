//! Configuration errors
//!
//! Anything that can go wrong before the bot reads its first chat event:
//! loading or saving the settings file, parsing overrides, and validating
//! the board image service address.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Could not access settings file: {0}")]
    SettingsIo(#[from] std::io::Error),

    /// Settings file exists but is not valid settings JSON
    #[error("Malformed settings file: {0}")]
    SettingsSerialization(#[from] serde_json::Error),

    /// Environment or command-line override could not be parsed
    #[error("Invalid value for {key}: {value:?}")]
    InvalidOverride { key: String, value: String },

    #[error("Invalid board image URL {url:?}: {source}")]
    InvalidBoardUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

pub type CoreResult<T> = Result<T, CoreError>;
