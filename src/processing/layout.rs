use serde::Serialize;

use crate::config::LayoutParams;

/// Frame geometry derived from the source size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Layout {
    pub total_size: (u32, u32),
    pub photo_pos: (u32, u32),
}

/// Axis-aligned rectangle as `(x, y, width, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether `other` lies entirely within `self`.
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.width <= self.x + self.width
            && other.y + other.height <= self.y + self.height
    }
}

/// Margins are proportional to the source width, so portrait and landscape
/// photos get the same border weight.
pub fn compute_layout(src_w: u32, src_h: u32, params: &LayoutParams) -> Layout {
    let side = scaled_length(src_w, params.side_ratio);
    let top = scaled_length(src_w, params.top_ratio);
    let bottom = scaled_length(src_w, params.bottom_ratio);
    Layout {
        total_size: (
            src_w.saturating_add(side.saturating_mul(2)),
            src_h.saturating_add(top).saturating_add(bottom),
        ),
        photo_pos: (side, top),
    }
}

/// `round(reference * ratio)`; every width-relative length goes through here.
pub fn scaled_length(reference: u32, ratio: f32) -> u32 {
    (reference as f64 * f64::from(ratio.max(0.0))).round() as u32
}

impl Layout {
    pub fn border_rect(&self) -> Rect {
        Rect::new(0, 0, self.total_size.0, self.total_size.1)
    }

    pub fn photo_rect(&self, photo_w: u32, photo_h: u32) -> Rect {
        Rect::new(self.photo_pos.0, self.photo_pos.1, photo_w, photo_h)
    }

    /// Height of the margin below the photo window.
    pub fn bottom_margin(&self, photo_h: u32) -> u32 {
        self.total_size
            .1
            .saturating_sub(self.photo_pos.1)
            .saturating_sub(photo_h)
    }
}

/// Offset that centers an `inner` box in an `outer` box.
pub fn center_offset(inner_w: u32, inner_h: u32, outer_w: u32, outer_h: u32) -> (u32, u32) {
    let ox = outer_w.saturating_sub(inner_w) / 2;
    let oy = outer_h.saturating_sub(inner_h) / 2;
    (ox, oy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_thousand_uses_round_margins() {
        let layout = compute_layout(1000, 1000, &LayoutParams::default());
        assert_eq!(layout.total_size, (1120, 1240));
        assert_eq!(layout.photo_pos, (60, 60));
        assert_eq!(layout.bottom_margin(1000), 180);
    }

    #[test]
    fn margins_round_to_nearest() {
        // 0.06 * 130 = 7.8 rounds up, 0.18 * 130 = 23.4 rounds down.
        let layout = compute_layout(130, 90, &LayoutParams::default());
        assert_eq!(layout.photo_pos, (8, 8));
        assert_eq!(layout.total_size, (130 + 16, 90 + 8 + 23));
    }

    #[test]
    fn total_never_smaller_than_source() {
        for (w, h) in [(50, 150), (3000, 1000), (777, 333)] {
            let layout = compute_layout(w, h, &LayoutParams::default());
            assert!(layout.total_size.0 >= w && layout.total_size.1 >= h);
        }
    }

    #[test]
    fn absurd_ratios_saturate_instead_of_wrapping() {
        let params = LayoutParams {
            side_ratio: 1e9,
            top_ratio: 1e9,
            bottom_ratio: 1e9,
        };
        let layout = compute_layout(4000, 3000, &params);
        assert_eq!(layout.total_size, (u32::MAX, u32::MAX));
    }

    #[test]
    fn center_offset_splits_evenly() {
        assert_eq!(center_offset(100, 50, 120, 60), (10, 5));
        assert_eq!(center_offset(200, 50, 120, 60), (0, 5));
    }
}
