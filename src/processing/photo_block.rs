//! The rotated photo block that shows through the chassis cutout.
//!
//! The photo is enlarged by a symmetric buffer, masked to a rounded
//! rectangle, given its fringe and shadow rings, rotated as one layer and
//! cropped back to the original size. Because every layer is rotated
//! together the rings stay aligned with the photo edge, and because the
//! buffer is symmetric the crop trims the same amount from every side.

use image::{GrayImage, RgbImage, RgbaImage, imageops};
use tracing::debug;

use super::blur::blur_mask;
use super::layout::scaled_length;
use super::mask::{
    CornerRadii, multiply, ring_mask, rotate_rgba, rounded_rect_mask, scale, solid_layer,
    with_alpha,
};
use super::resample::{center_crop, resize_rgb};
use crate::config::PhotoParams;
use crate::error::{Error, Result};

const STAGE: &str = "photo-block";

/// Resolved pixel geometry of one photo block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockGeometry {
    /// Final (cropped) photo size.
    pub size: (u32, u32),
    /// Extra pixels added to each dimension before rotation.
    pub buffer: u32,
    pub corner_radius: u32,
    /// Ring depths measured in the oversized block.
    pub shadow_depth: u32,
    pub fringe_depth: u32,
}

impl BlockGeometry {
    pub fn oversized(&self) -> (u32, u32) {
        (
            self.size.0.saturating_add(self.buffer),
            self.size.1.saturating_add(self.buffer),
        )
    }
}

/// `max(w, h) * factor`, rounded to the nearest even number so the crop can
/// take exactly half from each side.
pub fn oversize_buffer(width: u32, height: u32, factor: f32) -> u32 {
    let raw = f64::from(width.max(height)) * f64::from(factor.max(0.0));
    ((raw / 2.0).round() as u32) * 2
}

/// Compute and check the block geometry for a photo of `size` rotated by
/// `angle` degrees.
///
/// Fails with [`Error::Configuration`] when the angle is not finite, the
/// rotated oversized block would not cover the crop window or a ring would
/// swallow the whole block.
pub fn plan_block(
    size: (u32, u32),
    angle: f32,
    photo_corner_ratio: f32,
    params: &PhotoParams,
) -> Result<BlockGeometry> {
    if !angle.is_finite() {
        return Err(Error::configuration(
            STAGE,
            format!("rotation angle {angle} is not a finite number of degrees"),
        ));
    }
    let (w, h) = size;
    if w == 0 || h == 0 {
        return Err(Error::configuration(
            STAGE,
            format!("photo size {w}x{h} leaves nothing to crop"),
        ));
    }
    let buffer = oversize_buffer(w, h, params.oversize_factor);
    let half = buffer / 2;
    let geometry = BlockGeometry {
        size,
        buffer,
        corner_radius: scaled_length(w, photo_corner_ratio),
        shadow_depth: half.saturating_add(scaled_length(w, params.shadow.depth)),
        fringe_depth: half.saturating_add(scaled_length(w, params.fringe.depth)),
    };

    let (ow, oh) = geometry.oversized();
    let theta = f64::from(angle).to_radians();
    let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
    let need_w = f64::from(w) / 2.0 * cos + f64::from(h) / 2.0 * sin;
    let need_h = f64::from(w) / 2.0 * sin + f64::from(h) / 2.0 * cos;
    if need_w > f64::from(ow) / 2.0 || need_h > f64::from(oh) / 2.0 {
        return Err(Error::configuration(
            STAGE,
            format!(
                "oversize buffer {buffer}px cannot hide the corners of a {w}x{h} photo \
                 rotated by {angle:.2} degrees"
            ),
        ));
    }

    let limit = ow.min(oh) / 2;
    for (name, depth, opacity) in [
        ("shadow", geometry.shadow_depth, params.shadow.opacity),
        ("fringe", geometry.fringe_depth, params.fringe.opacity),
    ] {
        if opacity > 0.0 && depth >= limit {
            return Err(Error::configuration(
                STAGE,
                format!("{name} ring depth {depth}px exceeds half the block ({limit}px)"),
            ));
        }
    }
    Ok(geometry)
}

/// Build the rotated, shadowed and fringed photo block at `photo`'s size.
pub fn assemble_photo_block(
    photo: &RgbImage,
    angle: f32,
    photo_corner_ratio: f32,
    params: &PhotoParams,
) -> Result<RgbaImage> {
    let geometry = plan_block(photo.dimensions(), angle, photo_corner_ratio, params)?;
    let (ow, oh) = geometry.oversized();
    debug!(
        buffer = geometry.buffer,
        oversized_w = ow,
        oversized_h = oh,
        angle,
        "assembling photo block"
    );

    let enlarged = resize_rgb(photo, ow, oh, STAGE)?;
    let outer = rounded_rect_mask(ow, oh, CornerRadii::uniform(geometry.corner_radius));
    let mut block = with_alpha(&enlarged, &outer);

    let radius = geometry.corner_radius;
    let fringe = &params.fringe;
    if fringe.opacity > 0.0 {
        let alpha = ring_alpha(&outer, geometry.fringe_depth, radius, fringe.blur, fringe.opacity);
        imageops::overlay(&mut block, &solid_layer(fringe.color, &alpha), 0, 0);
    }
    let shadow = &params.shadow;
    if shadow.opacity > 0.0 {
        let alpha = ring_alpha(&outer, geometry.shadow_depth, radius, shadow.blur, shadow.opacity);
        imageops::overlay(&mut block, &solid_layer([0, 0, 0], &alpha), 0, 0);
    }

    let rotated = rotate_rgba(&block, angle);
    Ok(center_crop(&rotated, geometry.size.0, geometry.size.1))
}

// Blurred ring kept inside the photo silhouette and scaled to `opacity`.
fn ring_alpha(outer: &GrayImage, depth: u32, radius: u32, blur: f32, opacity: f32) -> GrayImage {
    let ring = blur_mask(&ring_mask(outer, depth, radius), blur);
    scale(&multiply(&ring, outer), opacity)
}
