//! Error types for the watermark-stamp crate.

/// Errors that can occur while loading a watermark or stamping a target.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The extension is not one of `.jpg`, `.jpeg` or `.png`.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// The extension argument was empty or did not start with a dot.
    #[error("invalid extension {0:?}: must be non-empty and start with '.'")]
    InvalidExtension(String),

    /// An I/O error occurred while opening or flushing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The image bytes could not be decoded as the expected format.
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),

    /// The composited image could not be encoded or written.
    #[error("failed to encode image: {0}")]
    Encode(image::ImageError),

    /// The stream could not be rewound to its start before writing.
    #[error("failed to seek to start of stream: {0}")]
    Seek(std::io::Error),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
