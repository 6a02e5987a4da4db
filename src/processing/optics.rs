use image::{GrayImage, Luma, RgbImage};
use tracing::debug;

use super::blur::blur_rgb;
use super::mask::{mul_div255, radial_mask};
use super::resample::{center_crop, resize_gray};
use crate::config::{OpticsParams, SoftFocusMode};
use crate::error::Result;

/// Plastic-lens imperfections, in order: soft focus, lateral chromatic
/// aberration on the red channel, vignette.
pub fn apply_optics(image: &RgbImage, params: &OpticsParams) -> Result<RgbImage> {
    let softened = soft_focus(image, params)?;
    let fringed = chromatic_aberration(&softened, params.aberration_offset)?;
    vignette(&fringed, params)
}

/// Blur the frame either everywhere or only toward the corners.
pub fn soft_focus(image: &RgbImage, params: &OpticsParams) -> Result<RgbImage> {
    if params.blur_radius <= 0.0 || params.soft_focus == SoftFocusMode::Off {
        return Ok(image.clone());
    }
    let blurred = blur_rgb(image, params.blur_radius);
    match params.soft_focus {
        SoftFocusMode::Off | SoftFocusMode::Global => Ok(blurred),
        SoftFocusMode::Radial => {
            let mask = sharpness_mask(image.width(), image.height(), params)?;
            let mut out = image.clone();
            for ((pixel, soft), m) in out.pixels_mut().zip(blurred.pixels()).zip(mask.pixels()) {
                let t = f32::from(m.0[0]) / 255.0;
                for (channel, &b) in pixel.0.iter_mut().zip(soft.0.iter()) {
                    let o = f32::from(*channel);
                    *channel = (o + (f32::from(b) - o) * t).round().clamp(0.0, 255.0) as u8;
                }
            }
            Ok(out)
        }
    }
}

/// 0 inside the sharp area, ramping linearly to 255 at the corners.
pub fn sharpness_mask(width: u32, height: u32, params: &OpticsParams) -> Result<GrayImage> {
    let sharp = params.sharp_area.clamp(0.0, 1.0);
    let span = 1.0 - sharp;
    low_res_radial(width, height, params.mask_downscale, "soft-focus", |dist| {
        if dist < sharp || span <= f32::EPSILON {
            0
        } else {
            (255.0 * ((dist - sharp) / span)).clamp(0.0, 255.0) as u8
        }
    })
}

/// 255 inside the vignette radius, falling to `255 * (1 - strength)` at the
/// corners.
pub fn vignette_mask(width: u32, height: u32, params: &OpticsParams) -> Result<GrayImage> {
    let radius = params.vignette_radius.clamp(0.0, 1.0);
    let span = 1.0 - radius;
    let strength = params.vignette_strength;
    low_res_radial(width, height, params.mask_downscale, "vignette", |dist| {
        if dist < radius || span <= f32::EPSILON {
            255
        } else {
            let factor = (dist - radius) / span;
            (255.0 * (1.0 - factor * strength)).clamp(0.0, 255.0) as u8
        }
    })
}

// Radial ramps are computed at reduced resolution and upsampled bicubically;
// this keeps them cheap and free of banding.
fn low_res_radial(
    width: u32,
    height: u32,
    downscale: u32,
    stage: &'static str,
    profile: impl Fn(f32) -> u8,
) -> Result<GrayImage> {
    let downscale = downscale.max(1);
    let mask_w = (width / downscale).max(1);
    let mask_h = (height / downscale).max(1);
    let small = radial_mask(mask_w, mask_h, profile);
    resize_gray(&small, width, height, stage)
}

/// Magnify the red channel about the center and crop it back, leaving green
/// and blue anchored. Produces a faint red fringe toward the edges.
pub fn chromatic_aberration(image: &RgbImage, offset: f32) -> Result<RgbImage> {
    let (w, h) = image.dimensions();
    let scale = 1.0 + offset.max(0.0);
    let new_w = (w as f32 * scale).round() as u32;
    let new_h = (h as f32 * scale).round() as u32;
    if new_w == w && new_h == h {
        return Ok(image.clone());
    }
    debug!(w, h, new_w, new_h, "magnifying red channel");

    let red = GrayImage::from_fn(w, h, |x, y| Luma([image.get_pixel(x, y).0[0]]));
    let magnified = resize_gray(&red, new_w, new_h, "aberration")?;
    let red = center_crop(&magnified, w, h);

    let mut out = image.clone();
    for (pixel, r) in out.pixels_mut().zip(red.pixels()) {
        pixel.0[0] = r.0[0];
    }
    Ok(out)
}

/// Darken toward black in proportion to the inverted vignette mask.
pub fn vignette(image: &RgbImage, params: &OpticsParams) -> Result<RgbImage> {
    if params.vignette_strength <= 0.0 {
        return Ok(image.clone());
    }
    let mask = vignette_mask(image.width(), image.height(), params)?;
    let mut out = image.clone();
    for (pixel, m) in out.pixels_mut().zip(mask.pixels()) {
        for channel in &mut pixel.0 {
            *channel = mul_div255(*channel, m.0[0]);
        }
    }
    Ok(out)
}
