//! Axis-aligned rectangle type for host bounding boxes

use serde::{Deserialize, Serialize};
use super::{Size, Vec2};

/// Axis-aligned rectangle in viewport pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Zero rectangle at origin
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// Create a new rectangle
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Get the center point
    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Get size
    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Size rounded up to whole pixels, as a layout box is measured
    #[inline]
    pub fn ceil_pixels(&self) -> (u32, u32) {
        (
            self.width.max(0.0).ceil() as u32,
            self.height.max(0.0).ceil() as u32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_center() {
        let r = Rect::new(10.0, 20.0, 100.0, 50.0);
        let c = r.center();
        assert!((c.x - 60.0).abs() < 0.001);
        assert!((c.y - 45.0).abs() < 0.001);
    }

    #[test]
    fn test_rect_ceil_pixels() {
        assert_eq!(Rect::new(0.0, 0.0, 79.2, 59.9).ceil_pixels(), (80, 60));
        assert_eq!(Rect::new(0.0, 0.0, 80.0, 60.0).ceil_pixels(), (80, 60));
        assert_eq!(Rect::new(0.0, 0.0, -3.0, 0.0).ceil_pixels(), (0, 0));
    }
}
