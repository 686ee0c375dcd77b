use egui::{Pos2, Vec2};
use serde::{Deserialize, Serialize};

/// Half-open pixel rectangle `[x1, x2) × [y1, y2)` in source-image space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl PixelRect {
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Builds a rectangle from signed corners, ordering them and clamping into
    /// `[0, width] × [0, height]`.
    pub fn from_corners_clamped(ax: i64, ay: i64, bx: i64, by: i64, width: u32, height: u32) -> Self {
        let cx = |v: i64| v.clamp(0, width as i64) as u32;
        let cy = |v: i64| v.clamp(0, height as i64) as u32;
        Self {
            x1: cx(ax.min(bx)),
            y1: cy(ay.min(by)),
            x2: cx(ax.max(bx)),
            y2: cy(ay.max(by)),
        }
    }

    pub fn clamped_to(&self, width: u32, height: u32) -> Self {
        Self::from_corners_clamped(
            self.x1 as i64,
            self.y1 as i64,
            self.x2 as i64,
            self.y2 as i64,
            width,
            height,
        )
    }

    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn offset(&self, dx: u32, dy: u32) -> Self {
        Self {
            x1: self.x1 + dx,
            y1: self.y1 + dy,
            x2: self.x2 + dx,
            y2: self.y2 + dy,
        }
    }
}

/// Maps positions on a scaled on-screen image back onto the full-resolution buffer.
///
/// Display positions are relative to the top-left corner of the drawn image,
/// not the surrounding widget. Anything in the letterbox margin ends up clamped
/// onto the nearest image edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageMapping {
    displayed: Vec2,
    source_width: u32,
    source_height: u32,
}

impl ImageMapping {
    pub fn new(displayed: Vec2, source_width: u32, source_height: u32) -> Option<Self> {
        if !(displayed.x > 0.0 && displayed.y > 0.0) || source_width == 0 || source_height == 0 {
            return None;
        }
        Some(Self {
            displayed,
            source_width,
            source_height,
        })
    }

    pub fn scale(&self) -> (f32, f32) {
        (
            self.source_width as f32 / self.displayed.x,
            self.source_height as f32 / self.displayed.y,
        )
    }

    fn scaled(&self, p: Pos2) -> (i64, i64) {
        let (sx, sy) = self.scale();
        ((p.x * sx).floor() as i64, (p.y * sy).floor() as i64)
    }

    /// The source pixel under `p`, always inside `[0, width) × [0, height)`.
    pub fn map_point(&self, p: Pos2) -> (u32, u32) {
        let (x, y) = self.scaled(p);
        (
            x.clamp(0, self.source_width as i64 - 1) as u32,
            y.clamp(0, self.source_height as i64 - 1) as u32,
        )
    }

    /// Maps two unordered drag corners onto a half-open pixel rectangle, so `x2` may
    /// equal the width. `None` means the region collapsed to zero area.
    pub fn map_rect(&self, a: Pos2, b: Pos2) -> Option<PixelRect> {
        let min = a.min(b);
        let max = a.max(b);
        let (x1, y1) = self.scaled(min);
        let (x2, y2) = self.scaled(max);
        let rect = PixelRect::from_corners_clamped(
            x1,
            y1,
            x2,
            y2,
            self.source_width,
            self.source_height,
        );
        if rect.is_empty() {
            None
        } else {
            Some(rect)
        }
    }
}
