use image::{GrayImage, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use super::resample::resize_gray;
use crate::config::GrainParams;
use crate::error::Result;

/// Blend soft film grain into `image`.
///
/// Uniform noise in `[0, cutoff]` is drawn at `size / scale` and upsampled
/// bicubically, which yields cloudy grain rather than per-pixel speckle.
/// `intensity <= 0` returns the input untouched. With a `seed` the noise is
/// reproducible; without one each call draws fresh entropy. Every call owns
/// its generator, so two invocations never share a noise stream.
pub fn apply_grain(
    image: &RgbImage,
    intensity: f32,
    seed: Option<u64>,
    params: &GrainParams,
) -> Result<RgbImage> {
    if !(intensity > 0.0) {
        return Ok(image.clone());
    }
    let intensity = intensity.min(1.0);
    let (w, h) = image.dimensions();
    let scale = params.scale.max(1.0);
    let noise_w = ((w as f32 / scale).round() as u32).max(1);
    let noise_h = ((h as f32 / scale).round() as u32).max(1);

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let noise = noise_field(&mut rng, noise_w, noise_h, params.cutoff);
    let noise = resize_gray(&noise, w, h, "grain")?;
    trace!(noise_w, noise_h, intensity, "grain field generated");

    let keep = 1.0 - intensity;
    let mut out = image.clone();
    for (pixel, n) in out.pixels_mut().zip(noise.pixels()) {
        let n = f32::from(n.0[0]) * intensity;
        for channel in &mut pixel.0 {
            *channel = (f32::from(*channel) * keep + n).round().clamp(0.0, 255.0) as u8;
        }
    }
    Ok(out)
}

fn noise_field(rng: &mut StdRng, width: u32, height: u32, cutoff: u8) -> GrayImage {
    let raw = (0..width as usize * height as usize)
        .map(|_| rng.random_range(0..=cutoff))
        .collect();
    GrayImage::from_raw(width, height, raw).unwrap_or_else(|| GrayImage::new(width, height))
}
