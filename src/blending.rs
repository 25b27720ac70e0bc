//! Alpha compositing for watermark stamping.
//!
//! Stamping happens on a 16-bit RGBA canvas in two passes:
//! 1. the target is copied onto the canvas (source-replace),
//! 2. the watermark is blended over it with the "over" operator:
//!    `out_a = a_w + a_d * (1 - a_w)`,
//!    `out_c = (c_w * a_w + c_d * a_d * (1 - a_w)) / out_a`.
//!
//! The wide channels keep the blend free of visible banding before the
//! result is narrowed back to the target's own layout.

use image::{DynamicImage, ImageBuffer, Rgba};

/// A 16-bit-per-channel RGBA bitmap used for compositing.
pub type Canvas = ImageBuffer<Rgba<u16>, Vec<u16>>;

const MAX_CHANNEL: f32 = u16::MAX as f32;

/// Composite pass 1: copy `target` onto a fresh canvas of the same bounds.
///
/// Every pixel is replaced, so the canvas matches the target exactly
/// (widened to 16 bits per channel, opaque when the target has no alpha).
#[must_use]
pub fn source_canvas(target: &DynamicImage) -> Canvas {
    target.to_rgba16()
}

/// Composite pass 2: blend `overlay` onto `canvas` with its top-left corner
/// at `(pos_x, pos_y)`.
///
/// Offsets may be negative or exceed the canvas; whatever part of the
/// overlay lands outside the canvas is clipped. Canvas pixels outside the
/// overlay's footprint are not touched.
///
/// Returns `false` when the overlay is clipped away entirely.
pub fn blend_over(canvas: &mut Canvas, overlay: &Canvas, pos_x: i64, pos_y: i64) -> bool {
    let canvas_w = i64::from(canvas.width());
    let canvas_h = i64::from(canvas.height());

    // Clip to canvas bounds
    let x1 = pos_x.max(0);
    let y1 = pos_y.max(0);
    let x2 = pos_x.saturating_add(i64::from(overlay.width())).min(canvas_w);
    let y2 = pos_y.saturating_add(i64::from(overlay.height())).min(canvas_h);

    if x1 >= x2 || y1 >= y2 {
        return false;
    }

    for y in y1..y2 {
        for x in x1..x2 {
            // In range after clipping.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let (cx, cy, ox, oy) = (x as u32, y as u32, (x - pos_x) as u32, (y - pos_y) as u32);
            let top = overlay.get_pixel(ox, oy);
            blend_pixel(canvas.get_pixel_mut(cx, cy), top);
        }
    }
    true
}

/// Blend one overlay pixel over one canvas pixel in place.
///
/// A fully transparent overlay pixel leaves `dst` as is; a fully opaque one
/// replaces it.
fn blend_pixel(dst: &mut Rgba<u16>, top: &Rgba<u16>) {
    match top[3] {
        0 => return,
        u16::MAX => {
            *dst = *top;
            return;
        }
        _ => {}
    }

    let top_a = f32::from(top[3]) / MAX_CHANNEL;
    let dst_a = f32::from(dst[3]) / MAX_CHANNEL;
    let dst_weight = dst_a * (1.0 - top_a);
    let out_a = top_a + dst_weight;

    for ch in 0..3 {
        let c = (f32::from(top[ch]) * top_a + f32::from(dst[ch]) * dst_weight) / out_a;
        dst[ch] = to_channel(c);
    }
    dst[3] = to_channel(out_a * MAX_CHANNEL);
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_channel(value: f32) -> u16 {
    value.round().clamp(0.0, MAX_CHANNEL) as u16
}
