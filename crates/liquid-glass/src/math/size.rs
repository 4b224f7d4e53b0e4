//! 2D size type for panel and texture dimensions

use serde::{Deserialize, Serialize};
use super::Vec2;

/// 2D size for width and height
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// Zero size
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    /// Create a new size
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Create from integer pixel dimensions
    #[inline]
    pub fn from_pixels(width: u32, height: u32) -> Self {
        Self::new(width as f32, height as f32)
    }

    /// Convert to Vec2
    #[inline]
    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// The shorter of the two dimensions
    #[inline]
    pub fn min_dim(self) -> f32 {
        self.width.min(self.height)
    }

    /// The longer of the two dimensions
    #[inline]
    pub fn max_dim(self) -> f32 {
        self.width.max(self.height)
    }

    /// Check if size is zero or negative
    #[inline]
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_as_vec2() {
        let s = Size::new(100.0, 200.0);
        let v = s.as_vec2();
        assert!((v.x - 100.0).abs() < 0.001);
        assert!((v.y - 200.0).abs() < 0.001);
    }

    #[test]
    fn test_size_dims() {
        let s = Size::from_pixels(200, 40);
        assert!((s.min_dim() - 40.0).abs() < 0.001);
        assert!((s.max_dim() - 200.0).abs() < 0.001);
        assert!(!s.is_empty());
        assert!(Size::ZERO.is_empty());
    }
}
