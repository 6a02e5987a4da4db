//! Single-channel mask helpers: rounded rectangles, set arithmetic, radial
//! ramps and rotation.
//!
//! Masks are `GrayImage`s where 255 means "inside" and 0 means "outside".
//! Shapes are rasterized by testing each pixel center, without antialiasing,
//! so set operations on them are exact.

use image::{GrayImage, ImageBuffer, Luma, Rgba, RgbImage, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp};

use super::layout::Rect;

/// Corner radii in pixels, clockwise from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CornerRadii {
    pub top_left: u32,
    pub top_right: u32,
    pub bottom_right: u32,
    pub bottom_left: u32,
}

impl CornerRadii {
    pub const fn uniform(radius: u32) -> Self {
        Self {
            top_left: radius,
            top_right: radius,
            bottom_right: radius,
            bottom_left: radius,
        }
    }

    pub const fn top_bottom(top: u32, bottom: u32) -> Self {
        Self {
            top_left: top,
            top_right: top,
            bottom_right: bottom,
            bottom_left: bottom,
        }
    }
}

/// A mask of `width`x`height` entirely covered by one rounded rectangle.
pub fn rounded_rect_mask(width: u32, height: u32, radii: CornerRadii) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    fill_rounded_rect(&mut mask, Rect::new(0, 0, width, height), radii);
    mask
}

/// Set every pixel whose center lies inside the rounded `rect` to 255.
pub fn fill_rounded_rect(mask: &mut GrayImage, rect: Rect, radii: CornerRadii) {
    if rect.width == 0 || rect.height == 0 {
        return;
    }
    let limit = rect.width.min(rect.height) as f32 * 0.5;
    let clamp = |r: u32| (r as f32).min(limit);
    let tl = clamp(radii.top_left);
    let tr = clamp(radii.top_right);
    let br = clamp(radii.bottom_right);
    let bl = clamp(radii.bottom_left);
    let w = rect.width as f32;
    let h = rect.height as f32;

    let x_end = (rect.x + rect.width).min(mask.width());
    let y_end = (rect.y + rect.height).min(mask.height());
    for py in rect.y..y_end {
        let fy = (py - rect.y) as f32 + 0.5;
        for px in rect.x..x_end {
            let fx = (px - rect.x) as f32 + 0.5;
            let inside = if fx < tl && fy < tl {
                within_circle(fx, fy, tl, tl, tl)
            } else if fx > w - tr && fy < tr {
                within_circle(fx, fy, w - tr, tr, tr)
            } else if fx > w - br && fy > h - br {
                within_circle(fx, fy, w - br, h - br, br)
            } else if fx < bl && fy > h - bl {
                within_circle(fx, fy, bl, h - bl, bl)
            } else {
                true
            };
            if inside {
                mask.put_pixel(px, py, Luma([255]));
            }
        }
    }
}

fn within_circle(x: f32, y: f32, cx: f32, cy: f32, r: f32) -> bool {
    let dx = x - cx;
    let dy = y - cy;
    dx * dx + dy * dy <= r * r
}

/// Border band of `outer` that is `depth` pixels wide.
///
/// The inner shape is a rounded rectangle inset by `depth` on every side with
/// its corner radius shrunk by the same amount, so the band follows the
/// rounded silhouette. An inset that consumes the whole mask leaves the
/// entire outer shape as the ring.
pub fn ring_mask(outer: &GrayImage, depth: u32, corner_radius: u32) -> GrayImage {
    let (w, h) = outer.dimensions();
    let mut inner = GrayImage::new(w, h);
    if depth * 2 < w && depth * 2 < h {
        let inset = Rect::new(depth, depth, w - depth * 2, h - depth * 2);
        let radius = corner_radius.saturating_sub(depth);
        fill_rounded_rect(&mut inner, inset, CornerRadii::uniform(radius));
    }
    subtract(outer, &inner)
}

/// Pixelwise `a - b`, saturating at zero.
pub fn subtract(a: &GrayImage, b: &GrayImage) -> GrayImage {
    zip_with(a, b, |x, y| x.saturating_sub(y))
}

/// Pixelwise `a * b / 255`.
pub fn multiply(a: &GrayImage, b: &GrayImage) -> GrayImage {
    zip_with(a, b, |x, y| mul_div255(x, y))
}

fn zip_with(a: &GrayImage, b: &GrayImage, f: impl Fn(u8, u8) -> u8) -> GrayImage {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    GrayImage::from_fn(a.width(), a.height(), |x, y| {
        let other = if x < b.width() && y < b.height() {
            b.get_pixel(x, y).0[0]
        } else {
            0
        };
        Luma([f(a.get_pixel(x, y).0[0], other)])
    })
}

/// Scale every mask value by `factor` (clamped to [0, 1]).
pub fn scale(mask: &GrayImage, factor: f32) -> GrayImage {
    let factor = factor.clamp(0.0, 1.0);
    let mut out = mask.clone();
    for p in out.pixels_mut() {
        p.0[0] = (f32::from(p.0[0]) * factor).round() as u8;
    }
    out
}

pub(crate) fn mul_div255(x: u8, y: u8) -> u8 {
    ((u32::from(x) * u32::from(y) + 127) / 255) as u8
}

/// Build a mask whose value depends only on the distance to the center,
/// normalized so the corners sit at 1.0.
pub fn radial_mask(width: u32, height: u32, profile: impl Fn(f32) -> u8) -> GrayImage {
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let max_dist = (cx * cx + cy * cy).sqrt().max(f32::EPSILON);
    GrayImage::from_fn(width, height, |x, y| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        Luma([profile((dx * dx + dy * dy).sqrt() / max_dist)])
    })
}

/// Attach `alpha` to a color image.
pub fn with_alpha(rgb: &RgbImage, alpha: &GrayImage) -> RgbaImage {
    RgbaImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let c = rgb.get_pixel(x, y).0;
        Rgba([c[0], c[1], c[2], alpha.get_pixel(x, y).0[0]])
    })
}

/// A flat `color` layer whose coverage is `alpha`.
pub fn solid_layer(color: [u8; 3], alpha: &GrayImage) -> RgbaImage {
    RgbaImage::from_fn(alpha.width(), alpha.height(), |x, y| {
        Rgba([color[0], color[1], color[2], alpha.get_pixel(x, y).0[0]])
    })
}

/// Extract the alpha channel.
pub fn alpha_of(image: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([image.get_pixel(x, y).0[3]])
    })
}

/// Tight bounds of all non-zero pixels.
pub fn bounding_box(mask: &GrayImage) -> Option<Rect> {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    let mut any = false;
    for (x, y, p) in mask.enumerate_pixels() {
        if p.0[0] > 0 {
            any = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }
    any.then(|| Rect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Rotation of `degrees` counter-clockwise about the pixel-grid center.
fn center_rotation(width: u32, height: u32, degrees: f32) -> Projection {
    let cx = (width as f32 - 1.0) / 2.0;
    let cy = (height as f32 - 1.0) / 2.0;
    // `Projection::rotate` turns clockwise in image coordinates.
    Projection::translate(cx, cy)
        * Projection::rotate(-degrees.to_radians())
        * Projection::translate(-cx, -cy)
}

/// Rotate a mask in place (same canvas size) with nearest-neighbour sampling.
/// Areas rotated in from outside the canvas are empty. Zero degrees returns an
/// exact copy.
pub fn rotate_mask(mask: &GrayImage, degrees: f32) -> GrayImage {
    if degrees == 0.0 {
        return mask.clone();
    }
    let (w, h) = mask.dimensions();
    warp(
        mask,
        &center_rotation(w, h, degrees),
        Interpolation::Nearest,
        Luma([0]),
    )
}

/// Rotate an RGBA image in place with bilinear sampling on premultiplied
/// color. Areas rotated in from outside are transparent. Zero degrees returns
/// an exact copy.
pub fn rotate_rgba(image: &RgbaImage, degrees: f32) -> RgbaImage {
    if degrees == 0.0 {
        return image.clone();
    }
    let (w, h) = image.dimensions();
    let premultiplied: ImageBuffer<Rgba<f32>, Vec<f32>> = ImageBuffer::from_fn(w, h, |x, y| {
        let p = image.get_pixel(x, y).0;
        let a = f32::from(p[3]) / 255.0;
        Rgba([
            f32::from(p[0]) * a,
            f32::from(p[1]) * a,
            f32::from(p[2]) * a,
            f32::from(p[3]),
        ])
    });
    let rotated = warp(
        &premultiplied,
        &center_rotation(w, h, degrees),
        Interpolation::Bilinear,
        Rgba([0.0; 4]),
    );

    RgbaImage::from_fn(w, h, |x, y| {
        let [r, g, b, alpha] = rotated.get_pixel(x, y).0;
        if alpha <= 0.0 {
            return Rgba([0, 0, 0, 0]);
        }
        let unpremul = 255.0 / alpha;
        Rgba([
            (r * unpremul).round().clamp(0.0, 255.0) as u8,
            (g * unpremul).round().clamp(0.0, 255.0) as u8,
            (b * unpremul).round().clamp(0.0, 255.0) as u8,
            alpha.round().clamp(0.0, 255.0) as u8,
        ])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_set(mask: &GrayImage) -> usize {
        mask.pixels().filter(|p| p.0[0] > 0).count()
    }

    #[test]
    fn zero_radius_fills_everything() {
        let mask = rounded_rect_mask(10, 6, CornerRadii::uniform(0));
        assert_eq!(count_set(&mask), 60);
    }

    #[test]
    fn rounded_corners_are_cut() {
        let mask = rounded_rect_mask(40, 40, CornerRadii::uniform(10));
        assert_eq!(mask.get_pixel(0, 0).0[0], 0);
        assert_eq!(mask.get_pixel(39, 39).0[0], 0);
        assert_eq!(mask.get_pixel(20, 0).0[0], 255);
        assert_eq!(mask.get_pixel(0, 20).0[0], 255);
    }

    #[test]
    fn bottom_corners_can_differ_from_top() {
        let mask = rounded_rect_mask(60, 60, CornerRadii::top_bottom(2, 20));
        assert_eq!(mask.get_pixel(3, 3).0[0], 255);
        assert_eq!(mask.get_pixel(3, 56).0[0], 0);
    }

    #[test]
    fn ring_is_inside_outer_and_outside_inner() {
        let outer = rounded_rect_mask(80, 50, CornerRadii::uniform(8));
        for depth in [1, 5, 12, 24] {
            let ring = ring_mask(&outer, depth, 8);
            assert!(count_set(&ring) > 0, "depth {depth} produced an empty ring");
            let mut inner = GrayImage::new(80, 50);
            fill_rounded_rect(
                &mut inner,
                Rect::new(depth, depth, 80 - 2 * depth, 50 - 2 * depth),
                CornerRadii::uniform(8u32.saturating_sub(depth)),
            );
            for (x, y, p) in ring.enumerate_pixels() {
                if p.0[0] > 0 {
                    assert_eq!(outer.get_pixel(x, y).0[0], 255);
                    assert_eq!(inner.get_pixel(x, y).0[0], 0);
                }
            }
        }
    }

    #[test]
    fn ring_has_requested_width_along_edges() {
        let outer = rounded_rect_mask(40, 40, CornerRadii::uniform(0));
        let ring = ring_mask(&outer, 3, 0);
        assert_eq!(ring.get_pixel(2, 20).0[0], 255);
        assert_eq!(ring.get_pixel(3, 20).0[0], 0);
        assert_eq!(ring.get_pixel(37, 20).0[0], 255);
        assert_eq!(ring.get_pixel(36, 20).0[0], 0);
    }

    #[test]
    fn multiply_and_scale() {
        let a = GrayImage::from_pixel(2, 2, Luma([255]));
        let b = GrayImage::from_pixel(2, 2, Luma([128]));
        assert_eq!(multiply(&a, &b).get_pixel(0, 0).0[0], 128);
        assert_eq!(scale(&a, 0.5).get_pixel(1, 1).0[0], 128);
    }

    #[test]
    fn zero_rotation_is_exact() {
        let img = RgbaImage::from_fn(9, 7, |x, y| Rgba([x as u8 * 20, y as u8 * 30, 5, 200]));
        assert_eq!(rotate_rgba(&img, 0.0), img);
        let mask = rounded_rect_mask(9, 7, CornerRadii::uniform(2));
        assert_eq!(rotate_mask(&mask, 0.0), mask);
    }

    #[test]
    fn quarter_turn_moves_right_edge_to_top() {
        let mut mask = GrayImage::new(9, 9);
        mask.put_pixel(8, 4, Luma([255]));
        let rotated = rotate_mask(&mask, 90.0);
        assert_eq!(rotated.get_pixel(4, 0).0[0], 255);
        assert_eq!(count_set(&rotated), 1);
    }

    #[test]
    fn rotation_exposes_transparent_corners() {
        let img = RgbaImage::from_pixel(50, 50, Rgba([10, 20, 30, 255]));
        let rotated = rotate_rgba(&img, 10.0);
        assert_eq!(rotated.get_pixel(0, 0).0[3], 0);
        assert_eq!(rotated.get_pixel(25, 25).0, [10, 20, 30, 255]);
    }

    #[test]
    fn rotated_edges_do_not_pick_up_dark_halos() {
        let img = RgbaImage::from_fn(40, 40, |x, _| {
            if x < 20 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        });
        let rotated = rotate_rgba(&img, 5.0);
        let partial: Vec<_> = rotated
            .pixels()
            .filter(|p| p.0[3] > 0 && p.0[3] < 255)
            .collect();
        assert!(!partial.is_empty());
        for p in partial {
            assert!(p.0[0] >= 254 && p.0[1] == 0, "halo pixel {:?}", p.0);
        }
    }

    #[test]
    fn radial_profile_sees_center_and_corner() {
        let mask = radial_mask(21, 21, |d| (d * 255.0).round() as u8);
        assert!(mask.get_pixel(10, 10).0[0] < 20);
        assert!(mask.get_pixel(0, 0).0[0] > 240);
    }

    #[test]
    fn bounding_box_of_block() {
        let mut mask = GrayImage::new(10, 10);
        fill_rounded_rect(&mut mask, Rect::new(2, 3, 4, 5), CornerRadii::uniform(0));
        assert_eq!(bounding_box(&mask), Some(Rect::new(2, 3, 4, 5)));
        assert_eq!(bounding_box(&GrayImage::new(3, 3)), None);
    }
}
