//! Stamp a fixed watermark image onto JPEG and PNG files in place.
//!
//! A [`Watermarker`] decodes the watermark once and then composites it onto
//! any number of targets. Each target is decoded, blended on a 16-bit canvas
//! with standard "over" alpha compositing, and re-encoded in its own format
//! over the original bytes.
//!
//! # Quick Start
//!
//! ```no_run
//! use watermark_stamp::{Point, Watermarker};
//!
//! let marker = Watermarker::new("logo.png").expect("failed to load watermark");
//! marker.mark_file("photo.jpg", Point::new(16, 16)).unwrap();
//! ```
//!
//! # Filtering by extension
//!
//! Only `.jpg`, `.jpeg` and `.png` (any case) are handled, and the format is
//! always chosen from the extension. Check before stamping:
//!
//! ```
//! use watermark_stamp::is_allowed_extension;
//!
//! assert!(is_allowed_extension(".JPG").unwrap());
//! assert!(!is_allowed_extension(".gif").unwrap());
//! assert!(is_allowed_extension("png").is_err());
//! ```

#![deny(missing_docs)]

pub mod blending;
pub mod error;
mod format;
mod watermarker;

pub use blending::Canvas;
pub use error::{Error, Result};
pub use format::{is_allowed_extension, is_allowed_path, ALLOWED_EXTENSIONS};
pub use watermarker::{MarkOptions, Point, Watermarker};

/// Re-exported so callers can set [`MarkOptions::png_compression`].
pub use image::codecs::png::CompressionType;
