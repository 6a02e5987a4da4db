use image::{GrayImage, RgbaImage, imageops};

use super::layout::Layout;
use super::mask::alpha_of;

/// Final print and the mask of photo pixels left visible in it.
#[derive(Debug, Clone)]
pub struct Composite {
    pub image: RgbaImage,
    pub photo_mask: GrayImage,
}

/// Lay the photo block on a transparent canvas at the photo position, then
/// the chassis over it. The exported mask is the alpha of the block that was
/// actually placed, so rotation-clipped corners stay out of it.
pub fn composite(layout: &Layout, block: &RgbaImage, chassis: &RgbaImage) -> Composite {
    let (total_w, total_h) = layout.total_size;
    let x = i64::from(layout.photo_pos.0);
    let y = i64::from(layout.photo_pos.1);

    let mut image = RgbaImage::new(total_w, total_h);
    imageops::replace(&mut image, block, x, y);
    imageops::overlay(&mut image, chassis, 0, 0);

    let mut photo_mask = GrayImage::new(total_w, total_h);
    imageops::replace(&mut photo_mask, &alpha_of(block), x, y);

    Composite { image, photo_mask }
}
