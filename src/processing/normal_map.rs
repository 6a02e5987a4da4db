use std::f32::consts::PI;

use image::{GrayImage, Luma, Rgb, RgbImage, imageops};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::blur::blur_mask;
use super::layout::Rect;
use crate::config::NormalMapParams;

const SOBEL_X: [[f32; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_Y: [[f32; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Maps a Sobel response (up to +/-1020 on 8-bit input) into a +/-127 offset.
const GRADIENT_GAIN: f32 = 0.125;

/// Seeds for the cardboard and photo height fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalSeeds {
    pub coarse: Option<u64>,
    pub fine: Option<u64>,
}

/// Gaussian noise around mid-gray (128 is zero height), softened so it reads
/// as fibres rather than speckle.
pub fn height_field(
    width: u32,
    height: u32,
    roughness: f32,
    smoothing: f32,
    seed: Option<u64>,
) -> GrayImage {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let field = GrayImage::from_fn(width, height, |_, _| {
        let value = 128.0 + gaussian(&mut rng) * roughness;
        Luma([value.round().clamp(0.0, 255.0) as u8])
    });
    blur_mask(&field, smoothing)
}

// Box-Muller transform.
fn gaussian(rng: &mut StdRng) -> f32 {
    let u1: f32 = rng.random::<f32>().max(1e-10);
    let u2: f32 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Sobel gradients of `height` encoded as a tangent-space normal map.
///
/// Red carries the horizontal slope and green the inverted vertical slope,
/// both centered on 128; blue is pinned at 255. Edges are clamped.
pub fn height_to_normal(height: &GrayImage, intensity: f32) -> RgbImage {
    let (w, h) = height.dimensions();
    let gain = intensity * GRADIENT_GAIN;
    let sample = |x: i64, y: i64| -> f32 {
        let cx = x.clamp(0, i64::from(w) - 1) as u32;
        let cy = y.clamp(0, i64::from(h) - 1) as u32;
        f32::from(height.get_pixel(cx, cy).0[0])
    };

    RgbImage::from_fn(w, h, |x, y| {
        let mut gx = 0.0;
        let mut gy = 0.0;
        for (ky, (row_x, row_y)) in SOBEL_X.iter().zip(SOBEL_Y.iter()).enumerate() {
            for kx in 0..3 {
                let v = sample(i64::from(x) + kx as i64 - 1, i64::from(y) + ky as i64 - 1);
                gx += v * row_x[kx];
                gy += v * row_y[kx];
            }
        }
        let r = (128.0 + gx * gain).round().clamp(0.0, 255.0) as u8;
        let g = (128.0 - gy * gain).round().clamp(0.0, 255.0) as u8;
        Rgb([r, g, 255])
    })
}

/// Normal map of the whole print at `params.scale`: coarse cardboard relief
/// with fine photo grain inset at the (scaled) photo rectangle.
pub fn combined_normal_map(
    total_size: (u32, u32),
    photo_rect: Rect,
    params: &NormalMapParams,
    seeds: NormalSeeds,
) -> RgbImage {
    let s = params.scale;
    let scaled = |v: u32| (v as f32 * s) as u32;
    let map_w = scaled(total_size.0).max(1);
    let map_h = scaled(total_size.1).max(1);

    let mut field = height_field(
        map_w,
        map_h,
        params.frame_roughness,
        params.smoothing,
        seeds.coarse,
    );
    let (pw, ph) = (scaled(photo_rect.width), scaled(photo_rect.height));
    if pw > 0 && ph > 0 {
        let fine = height_field(pw, ph, params.photo_roughness, params.smoothing, seeds.fine);
        imageops::replace(
            &mut field,
            &fine,
            i64::from(scaled(photo_rect.x)),
            i64::from(scaled(photo_rect.y)),
        );
    }
    debug!(map_w, map_h, photo_w = pw, photo_h = ph, "normal map height field ready");
    height_to_normal(&field, params.intensity)
}
