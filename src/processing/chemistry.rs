use image::RgbImage;

use crate::config::ChemistryParams;

/// Three 256-entry lookup tables, one per color channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToneCurves {
    pub red: [u8; 256],
    pub green: [u8; 256],
    pub blue: [u8; 256],
}

impl ToneCurves {
    /// Red shadows are compressed below the threshold (shifting them toward
    /// cyan), green only gets a raised black point, blue is boosted across
    /// the range and clipped at 255.
    pub fn new(params: &ChemistryParams) -> Self {
        let mut red = [0u8; 256];
        let mut green = [0u8; 256];
        let mut blue = [0u8; 256];
        for x in 0..256usize {
            let v = x as f32;
            let r = if x < usize::from(params.shadow_threshold) {
                v * params.red_shadow_scale
            } else {
                v
            };
            red[x] = lift(r, params.red_floor);
            green[x] = lift(v, params.green_floor);
            blue[x] = lift(v * params.blue_gain, params.blue_floor);
        }
        Self { red, green, blue }
    }

    pub fn map(&self, rgb: [u8; 3]) -> [u8; 3] {
        [
            self.red[usize::from(rgb[0])],
            self.green[usize::from(rgb[1])],
            self.blue[usize::from(rgb[2])],
        ]
    }
}

// Truncates like an integer LUT would; the epsilon absorbs f32 error in the
// scale factors (0.9 * 100 must land on 90, not 89).
fn lift(value: f32, floor: u8) -> u8 {
    (value + 1e-3).max(f32::from(floor)).min(255.0) as u8
}

/// Develop the photo: faded blacks and cool shadows via per-channel curves.
/// Deterministic; identical input pixels always map to identical output.
pub fn develop(image: &RgbImage, params: &ChemistryParams) -> RgbImage {
    let curves = ToneCurves::new(params);
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        pixel.0 = curves.map(pixel.0);
    }
    out
}
