use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage, imageops};
use tracing::debug;

use super::blur::blur_mask;
use super::grain::apply_grain;
use super::layout::{Layout, Rect, scaled_length};
use super::mask::{
    CornerRadii, fill_rounded_rect, rotate_mask, rounded_rect_mask, solid_layer, subtract,
};
use crate::config::{ChassisParams, GrainParams};
use crate::error::Result;

/// Seeds for the two independent paper textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChassisSeeds {
    pub paper: Option<u64>,
    pub grip: Option<u64>,
}

/// Build the RGBA frame layer.
///
/// `photo_size` is the (capped) source size; all frame lengths are relative
/// to its width. The cutout over the photo window is fully transparent, and
/// is rotated by `rotation` degrees about its own center when given. A zero
/// angle is treated exactly like `None`.
pub fn build_chassis(
    layout: &Layout,
    photo_size: (u32, u32),
    params: &ChassisParams,
    grain: &GrainParams,
    rotation: Option<f32>,
    seeds: ChassisSeeds,
) -> Result<RgbaImage> {
    let (total_w, total_h) = layout.total_size;
    let (photo_w, photo_h) = photo_size;

    let paper = RgbImage::from_pixel(total_w, total_h, Rgb(params.paper_color));
    let mut base = apply_grain(&paper, params.paper_noise, seeds.paper, grain)?;

    let grip_h = scaled_length(layout.bottom_margin(photo_h), params.grip_ratio).min(total_h);
    let grip_y = total_h - grip_h;
    if grip_h > 0 {
        let grip = grip_band(total_w, grip_h, params.grip_color, params.grip_shade);
        let grip = apply_grain(&grip, params.grip_noise, seeds.grip, grain)?;
        imageops::replace(&mut base, &grip, 0, i64::from(grip_y));
    }
    debug!(total_w, total_h, grip_h, "chassis base textured");

    let mut frame = RgbaImage::from_fn(total_w, total_h, |x, y| {
        let [r, g, b] = base.get_pixel(x, y).0;
        Rgba([r, g, b, 255])
    });

    if grip_h > 0 && params.seam_opacity > 0.0 {
        let seam = seam_mask(total_w, total_h, grip_y, photo_w, params);
        imageops::overlay(&mut frame, &solid_layer(params.seam_color, &seam), 0, 0);
    }

    let outer = rounded_rect_mask(
        total_w,
        total_h,
        CornerRadii::top_bottom(
            scaled_length(photo_w, params.corner_radius_top),
            scaled_length(photo_w, params.corner_radius_bottom),
        ),
    );
    let radius = scaled_length(photo_w, params.photo_corner_radius);
    let cutout = photo_cutout(photo_w, photo_h, radius, rotation);
    let mut hole = GrayImage::new(total_w, total_h);
    imageops::replace(
        &mut hole,
        &cutout,
        i64::from(layout.photo_pos.0),
        i64::from(layout.photo_pos.1),
    );

    let alpha = subtract(&outer, &hole);
    for (pixel, a) in frame.pixels_mut().zip(alpha.pixels()) {
        pixel.0[3] = a.0[0];
    }
    Ok(frame)
}

/// Rounded-rect window mask at photo size, optionally rotated in place.
pub fn photo_cutout(width: u32, height: u32, radius: u32, rotation: Option<f32>) -> GrayImage {
    let mask = rounded_rect_mask(width, height, CornerRadii::uniform(radius));
    match rotation {
        Some(angle) if angle != 0.0 => rotate_mask(&mask, angle),
        _ => mask,
    }
}

/// Vertical gradient from `color` at the top to `color * (1 - shade)` at the
/// bottom.
fn grip_band(width: u32, height: u32, color: [u8; 3], shade: f32) -> RgbImage {
    let span = height.saturating_sub(1).max(1) as f32;
    let shade = shade.clamp(0.0, 1.0);
    RgbImage::from_fn(width, height, |_, y| {
        let factor = 1.0 - shade * (y as f32 / span);
        Rgb(color.map(|c| (f32::from(c) * factor).round() as u8))
    })
}

// Soft dark line sitting just above the paper/grip boundary.
fn seam_mask(
    total_w: u32,
    total_h: u32,
    grip_y: u32,
    width_ref: u32,
    params: &ChassisParams,
) -> GrayImage {
    let seam_h = scaled_length(width_ref, params.seam_height).max(1);
    let top = grip_y.saturating_sub(seam_h);
    let level = (255.0 * params.seam_opacity.clamp(0.0, 1.0)).round() as u8;
    let mut mask = GrayImage::new(total_w, total_h);
    let band = Rect::new(0, top, total_w, grip_y - top);
    fill_rounded_rect(&mut mask, band, CornerRadii::default());
    for p in mask.pixels_mut() {
        if p.0[0] > 0 {
            *p = Luma([level]);
        }
    }
    blur_mask(&mask, params.seam_blur)
}
