use image::{GrayImage, ImageBuffer, Luma, RgbImage, imageops};
use imageproc::filter::gaussian_blur_f32;

/// Gaussian blur of a color image; `sigma <= 0` returns a copy.
pub fn blur_rgb(image: &RgbImage, sigma: f32) -> RgbImage {
    if sigma <= 0.0 {
        return image.clone();
    }
    imageops::blur(image, sigma)
}

/// Gaussian blur for single-channel masks; `sigma <= 0` returns a copy.
///
/// Samples past the border clamp to the edge pixel, so a mask that touches
/// the image edge keeps its full strength there. The blur runs on `f32`
/// samples and rounds once at the end.
pub fn blur_mask(mask: &GrayImage, sigma: f32) -> GrayImage {
    if !(sigma > 0.0) {
        return mask.clone();
    }
    let samples: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_fn(mask.width(), mask.height(), |x, y| {
            Luma([f32::from(mask.get_pixel(x, y).0[0])])
        });
    let blurred = gaussian_blur_f32(&samples, sigma);
    GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        Luma([blurred.get_pixel(x, y).0[0].round().clamp(0.0, 255.0) as u8])
    })
}
