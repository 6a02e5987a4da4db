use image::{GrayImage, RgbImage, RgbaImage};
use serde::Serialize;

use crate::pipeline::Overrides;
use crate::processing::layout::Rect;

/// Metadata describing how a print was styled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleInfo {
    pub profile: String,
    /// Seed of the per-invocation generator; replaying it reproduces the print.
    pub seed: u64,
    pub rotation_angle: f32,
    pub overrides: Overrides,
}

/// Everything one pipeline run produces.
#[derive(Debug, Clone)]
pub struct ResultBundle {
    pub image: RgbaImage,
    /// 255 exactly where photo pixels are visible in `image`.
    pub photo_mask: GrayImage,
    pub photo_rect: Rect,
    pub border_rect: Rect,
    pub style_info: StyleInfo,
    pub normal_map: Option<RgbImage>,
}

impl ResultBundle {
    pub fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}
