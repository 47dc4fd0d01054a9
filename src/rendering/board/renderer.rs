//! Position → board image URL

use crate::core::{BotSettings, CoreError, CoreResult};
use tracing::warn;
use url::Url;

/// Turns a FEN position into an image URL
pub trait BoardRenderer: Send + Sync {
    /// `flipped` draws the board from Black's side
    fn image_url(&self, position: &str, flipped: bool) -> String;
}

/// Renders through a chessboardimage.com style service:
/// `<base>/<percent-encoded FEN>[-flip].png`
#[derive(Debug, Clone)]
pub struct ChessboardImageRenderer {
    base: Url,
}

impl ChessboardImageRenderer {
    /// # Errors
    ///
    /// [`CoreError::InvalidBoardUrl`] if `base` is not an absolute URL that
    /// can hold a path.
    pub fn new(base: &str) -> CoreResult<Self> {
        let invalid = |source| CoreError::InvalidBoardUrl {
            url: base.to_string(),
            source,
        };

        let mut url = Url::parse(base).map_err(invalid)?;
        if url.cannot_be_a_base() {
            return Err(invalid(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        // Join replaces the last segment unless the path ends with a slash.
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self { base: url })
    }

    pub fn from_settings(settings: &BotSettings) -> CoreResult<Self> {
        Self::new(&settings.board_image_url)
    }
}

impl BoardRenderer for ChessboardImageRenderer {
    fn image_url(&self, position: &str, flipped: bool) -> String {
        let suffix = if flipped { "-flip" } else { "" };
        let image = format!("{position}{suffix}.png");

        match self.base.join(&image) {
            Ok(url) => url.into(),
            Err(e) => {
                warn!("[BOARD] Could not encode image path {:?}: {}", image, e);
                format!("{}{}", self.base, image)
            }
        }
    }
}
