use fast_image_resize as fir;
use image::{GrayImage, ImageBuffer, Pixel, RgbImage, imageops};
use tracing::debug;

use crate::error::{Error, Result};

/// Bicubic (Catmull-Rom) resize of a single-channel buffer.
pub fn resize_gray(
    source: &GrayImage,
    target_w: u32,
    target_h: u32,
    stage: &'static str,
) -> Result<GrayImage> {
    resize_buffer(source, target_w, target_h, fir::PixelType::U8, stage)
}

pub fn resize_rgb(
    source: &RgbImage,
    target_w: u32,
    target_h: u32,
    stage: &'static str,
) -> Result<RgbImage> {
    resize_buffer(source, target_w, target_h, fir::PixelType::U8x3, stage)
}

fn resize_buffer<P>(
    source: &ImageBuffer<P, Vec<u8>>,
    target_w: u32,
    target_h: u32,
    pixel_type: fir::PixelType,
    stage: &'static str,
) -> Result<ImageBuffer<P, Vec<u8>>>
where
    P: Pixel<Subpixel = u8>,
{
    if target_w == 0 || target_h == 0 {
        return Err(Error::resample(stage, "resize dimensions must be positive"));
    }
    if source.width() == target_w && source.height() == target_h {
        return Ok(source.clone());
    }

    let src_view =
        fir::images::ImageRef::new(source.width(), source.height(), source.as_raw(), pixel_type)
            .map_err(|err| Error::resample(stage, err))?;
    let mut dst_image = fir::images::Image::new(target_w, target_h, pixel_type);
    let options = fir::ResizeOptions::new()
        .resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::CatmullRom));
    let mut resizer = fir::Resizer::new();
    resizer
        .resize(&src_view, &mut dst_image, Some(&options))
        .map_err(|err| Error::resample(stage, err))?;
    ImageBuffer::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| Error::resample(stage, "resized buffer has unexpected length"))
}

/// Downsample so the longest side is at most `max_side`, keeping the aspect.
pub fn cap_longest_side(source: RgbImage, max_side: u32) -> Result<RgbImage> {
    let (w, h) = source.dimensions();
    let longest = w.max(h);
    if max_side == 0 || longest <= max_side {
        return Ok(source);
    }
    let scale = max_side as f64 / longest as f64;
    let target_w = ((w as f64 * scale).round() as u32).max(1);
    let target_h = ((h as f64 * scale).round() as u32).max(1);
    debug!(from_w = w, from_h = h, target_w, target_h, "downsampling oversized input");
    resize_rgb(&source, target_w, target_h, "size-cap")
}

/// Cut a `width`x`height` window out of the middle of `source`.
pub fn center_crop<P>(
    source: &ImageBuffer<P, Vec<P::Subpixel>>,
    width: u32,
    height: u32,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel + 'static,
{
    let (ox, oy) = super::layout::center_offset(width, height, source.width(), source.height());
    let width = width.min(source.width());
    let height = height.min(source.height());
    imageops::crop_imm(source, ox, oy, width, height).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    #[test]
    fn same_size_resize_is_identity() {
        let img = RgbImage::from_fn(7, 5, |x, y| Rgb([x as u8, y as u8, 9]));
        let out = resize_rgb(&img, 7, 5, "test").unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn flat_gray_stays_flat_when_upsampled() {
        let img = GrayImage::from_pixel(4, 4, Luma([90]));
        let out = resize_gray(&img, 16, 12, "test").unwrap();
        assert_eq!(out.dimensions(), (16, 12));
        assert!(out.pixels().all(|p| p.0[0].abs_diff(90) <= 1));
    }

    #[test]
    fn zero_target_is_rejected() {
        let img = GrayImage::new(4, 4);
        let err = resize_gray(&img, 0, 4, "unit").unwrap_err();
        assert!(matches!(err, Error::Resample { stage: "unit", .. }));
    }

    #[test]
    fn cap_keeps_aspect_ratio() {
        let img = RgbImage::new(400, 100);
        let out = cap_longest_side(img, 200).unwrap();
        assert_eq!(out.dimensions(), (200, 50));
    }

    #[test]
    fn center_crop_takes_middle() {
        let img = GrayImage::from_fn(6, 6, |x, y| Luma([(y * 6 + x) as u8]));
        let out = center_crop(&img, 2, 2);
        assert_eq!(out.get_pixel(0, 0).0[0], 14);
        assert_eq!(out.get_pixel(1, 1).0[0], 21);
    }
}
