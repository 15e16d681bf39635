use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShapeError {
    #[error("Failed to load image {}: {source}", path.display())]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("No image selected")]
    NoImageSelected,

    #[error("Failed to load label font {}: {reason}", path.display())]
    FontLoad { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShapeError {
    /// True when the error came from decoding (or finding) the input image.
    pub fn is_load_error(&self) -> bool {
        matches!(self, Self::ImageLoad { .. })
    }
}

pub type Result<T> = std::result::Result<T, ShapeError>;
