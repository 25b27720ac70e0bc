//! The watermarker: one decoded overlay, stamped onto any number of targets.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, Write};
use std::path::Path;
use std::sync::Arc;

use image::codecs::png::CompressionType;
use image::{DynamicImage, ImageFormat};
use tracing::{debug, trace};

use crate::blending::{self, Canvas};
use crate::error::{Error, Result};
use crate::format;

/// Where the watermark's top-left corner lands on the target, in pixels.
///
/// Offsets are not checked against the target: negative values or values
/// past the edges simply clip the stamped region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    /// Horizontal offset from the target's left edge.
    pub x: i64,
    /// Vertical offset from the target's top edge.
    pub y: i64,
}

impl Point {
    /// Create a point at `(x, y)`.
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl From<(i64, i64)> for Point {
    fn from((x, y): (i64, i64)) -> Self {
        Self { x, y }
    }
}

/// Encoder settings used when writing a stamped image back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkOptions {
    /// JPEG quality (1-100).
    pub jpeg_quality: u8,
    /// PNG deflate effort.
    pub png_compression: CompressionType,
}

impl Default for MarkOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: 75,
            png_compression: CompressionType::Default,
        }
    }
}

/// Stamps a fixed watermark image onto JPEG and PNG targets.
///
/// The watermark is decoded once, widened to 16 bits per channel and never
/// touched again. Clones share the same bitmap, so one `Watermarker` can
/// serve many threads as long as each call works on its own target.
#[derive(Debug, Clone)]
pub struct Watermarker {
    overlay: Arc<Canvas>,
    options: MarkOptions,
}

impl Watermarker {
    /// Load the watermark from `path`.
    ///
    /// The format comes from the extension alone (`.jpg`, `.jpeg`, `.png`,
    /// any case). The file is closed before this returns, on success or not.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedFormat`] for any other extension, before the
    ///   file is opened.
    /// - [`Error::Io`] if the file cannot be opened or read.
    /// - [`Error::Decode`] if the contents are not a valid image of that format.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = format::format_for_path(path)?;

        let image = {
            let file = File::open(path)?;
            format::decode(file, format)?
        };

        debug!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "loaded watermark"
        );
        Ok(Self::from_image(image))
    }

    /// Build a watermarker from an already decoded image.
    #[must_use]
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            overlay: Arc::new(image.into_rgba16()),
            options: MarkOptions::default(),
        }
    }

    /// Replace the encoder settings.
    #[must_use]
    pub fn with_options(mut self, options: MarkOptions) -> Self {
        self.options = options;
        self
    }

    /// Current encoder settings.
    #[must_use]
    pub fn options(&self) -> &MarkOptions {
        &self.options
    }

    /// Width and height of the watermark bitmap.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.overlay.dimensions()
    }

    /// Composite the watermark over `target` without any I/O.
    ///
    /// The result has the target's bounds. Pixels outside the watermark's
    /// footprint keep the target's values exactly.
    #[must_use]
    pub fn composite(&self, target: &DynamicImage, point: Point) -> Canvas {
        let mut canvas = blending::source_canvas(target);
        if !blending::blend_over(&mut canvas, &self.overlay, point.x, point.y) {
            trace!(x = point.x, y = point.y, "watermark lies outside target");
        }
        canvas
    }

    /// Stamp the image file at `path` in place.
    ///
    /// The file is opened read-write without truncation or creation. If the
    /// new encoding is shorter than the old one, the old trailing bytes stay
    /// in the file.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedFormat`] if the extension is not allowed; the
    ///   file is not opened.
    /// - [`Error::Io`] if the file cannot be opened.
    /// - Anything [`Watermarker::mark`] returns.
    pub fn mark_file(&self, path: impl AsRef<Path>, point: Point) -> Result<()> {
        let path = path.as_ref();
        let format = format::format_for_path(path)?;
        let mut file = OpenOptions::new().read(true).write(true).open(path)?;
        self.mark_as(&mut file, format, point)
    }

    /// Stamp the image in `stream`, writing the result back over it.
    ///
    /// `ext` is a dot-prefixed extension in any case and decides both the
    /// decoder and the encoder. The stream is read from its current position
    /// and then rewound; the output starts at byte 0.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedFormat`] if `ext` is not allowed; nothing is read.
    /// - [`Error::Decode`] if the stream does not hold a valid image, or
    ///   [`Error::Io`] if reading it fails; nothing is written in either case.
    /// - [`Error::Seek`] if the stream cannot be rewound. Its position is then
    ///   unspecified.
    /// - [`Error::Encode`] or [`Error::Io`] if writing fails; the stream may
    ///   hold a partial, invalid image.
    pub fn mark<S: Read + Write + Seek>(
        &self,
        stream: &mut S,
        ext: &str,
        point: Point,
    ) -> Result<()> {
        let format = format::format_for_extension(ext)?;
        self.mark_as(stream, format, point)
    }

    fn mark_as<S: Read + Write + Seek>(
        &self,
        stream: &mut S,
        format: ImageFormat,
        point: Point,
    ) -> Result<()> {
        let target = format::decode(&mut *stream, format)?;
        let source_color = target.color();
        debug!(
            ?format,
            width = target.width(),
            height = target.height(),
            x = point.x,
            y = point.y,
            "stamping watermark"
        );

        let canvas = self.composite(&target, point);
        let output = format::output_image(canvas, format, source_color);

        stream.rewind().map_err(Error::Seek)?;
        format::encode(&mut *stream, &output, format, &self.options)
    }
}
