//! Extension-based format dispatch and stream codecs.
//!
//! Only JPEG and PNG are handled, and the format is always taken from the
//! extension. Content is never sniffed, so a PNG named `photo.jpg` fails to
//! decode.

use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{FilterType, PngEncoder};
use image::{ColorType, DynamicImage, ImageError, ImageFormat};

use crate::blending::Canvas;
use crate::error::{Error, Result};
use crate::watermarker::MarkOptions;

/// Extensions (lowercase, dot-prefixed) that can be watermarked.
pub const ALLOWED_EXTENSIONS: [&str; 3] = [".jpg", ".jpeg", ".png"];

/// Check whether `ext` names a format that can be watermarked.
///
/// The comparison is case-insensitive, so `.PNG` and `.Jpeg` are allowed.
///
/// # Errors
///
/// Returns [`Error::InvalidExtension`] if `ext` is empty or does not start
/// with `.`. Such a value is a caller bug, never silently coerced.
pub fn is_allowed_extension(ext: &str) -> Result<bool> {
    if !ext.starts_with('.') {
        return Err(Error::InvalidExtension(ext.to_string()));
    }

    let ext = ext.to_ascii_lowercase();
    Ok(ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Check if a file path carries an extension that can be watermarked.
///
/// Paths without an extension are not allowed.
#[must_use]
pub fn is_allowed_path(path: &Path) -> bool {
    format_for_path(path).is_ok()
}

/// Resolve a dot-prefixed extension (any case) to its image format.
pub(crate) fn format_for_extension(ext: &str) -> Result<ImageFormat> {
    match ext.to_ascii_lowercase().as_str() {
        ".jpg" | ".jpeg" => Ok(ImageFormat::Jpeg),
        ".png" => Ok(ImageFormat::Png),
        _ => Err(Error::UnsupportedFormat(ext.to_string())),
    }
}

/// Resolve a path's extension to its image format.
pub(crate) fn format_for_path(path: &Path) -> Result<ImageFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format_for_extension(&format!(".{ext}")),
        None => Err(Error::UnsupportedFormat(path.display().to_string())),
    }
}

/// Decode a whole image of `format` from the reader's current position.
pub(crate) fn decode<R: Read + Seek>(reader: R, format: ImageFormat) -> Result<DynamicImage> {
    image::load(BufReader::new(reader), format).map_err(|err| match err {
        ImageError::IoError(e) => Error::Io(e),
        other => Error::Decode(other),
    })
}

/// Narrow a composited canvas to the layout written for `format`.
///
/// JPEG is always 8-bit RGB. PNG keeps the target's alpha presence and bit
/// depth; grayscale targets come back as RGB(A) so the watermark's color
/// survives.
pub(crate) fn output_image(
    canvas: Canvas,
    format: ImageFormat,
    source: ColorType,
) -> DynamicImage {
    let canvas = DynamicImage::ImageRgba16(canvas);
    if format == ImageFormat::Jpeg {
        return DynamicImage::ImageRgb8(canvas.to_rgb8());
    }

    let wide = source.bytes_per_pixel() > source.channel_count();
    match (source.has_alpha(), wide) {
        (true, true) => canvas,
        (true, false) => DynamicImage::ImageRgba8(canvas.to_rgba8()),
        (false, true) => DynamicImage::ImageRgb16(canvas.to_rgb16()),
        (false, false) => DynamicImage::ImageRgb8(canvas.to_rgb8()),
    }
}

fn encode_error(err: ImageError) -> Error {
    match err {
        ImageError::IoError(e) => Error::Io(e),
        other => Error::Encode(other),
    }
}

/// Encode `img` as `format` at the writer's current position.
pub(crate) fn encode<W: Write>(
    writer: W,
    img: &DynamicImage,
    format: ImageFormat,
    opts: &MarkOptions,
) -> Result<()> {
    let mut writer = BufWriter::new(writer);

    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut writer, opts.jpeg_quality);
            img.write_with_encoder(encoder).map_err(encode_error)?;
        }
        ImageFormat::Png => {
            let encoder = PngEncoder::new_with_quality(
                &mut writer,
                opts.png_compression,
                FilterType::Adaptive,
            );
            img.write_with_encoder(encoder).map_err(encode_error)?;
        }
        other => return Err(Error::UnsupportedFormat(format!("{other:?}"))),
    }

    writer.flush()?;
    Ok(())
}
