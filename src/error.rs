//! Error type shared by the loader, the surface and the event loop.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can abort the setup sequence.
///
/// None of these are retried. The window stays on its background color and
/// the failure is logged where setup stops.
#[derive(Debug, Error)]
pub enum Error {
    /// No window, surface, adapter or device could be created.
    #[error("drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// An image could not be read or decoded.
    #[error("failed to load asset '{}': {source}", .path.display())]
    AssetLoadFailure {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A frame sequence was configured with zero frames.
    #[error("frame sequence in '{}' has no frames", .0.display())]
    NoFrames(PathBuf),

    /// The label font could not be read or parsed.
    #[error("failed to load font '{}': {reason}", .path.display())]
    FontLoadFailure { path: PathBuf, reason: String },

    /// A worker thread could not be started.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The windowing event loop could not be created or exited abnormally.
    #[error("event loop error: {0}")]
    EventLoop(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_failure_names_the_path() {
        let source = image::ImageError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = Error::AssetLoadFailure {
            path: PathBuf::from("assets/full.png"),
            source,
        };

        let message = err.to_string();
        assert!(message.contains("assets/full.png"));
        assert!(message.contains("missing"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn surface_unavailable_message() {
        let err = Error::SurfaceUnavailable("no adapter".into());
        assert_eq!(err.to_string(), "drawing surface unavailable: no adapter");
    }
}
