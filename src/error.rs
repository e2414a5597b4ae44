//! Error types for the renderer and the configuration layer.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The image file is missing, unreadable or not a decodable image.
    #[error("failed to load image {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The graphics backend refused the decoded pixels.
    #[error("failed to upload texture {path}: {reason}")]
    TextureUpload { path: PathBuf, reason: String },

    /// The graphics backend failed while drawing a frame.
    #[error("failed to draw frame: {reason}")]
    Draw { reason: String },

    #[error("renderer is not initialized")]
    NotReady,

    #[error("renderer is already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
