//! Panel geometry derived from host measurement

use crate::host::ShapeStyle;
use crate::math::{Rect, Size};
use crate::shape::ShapeKind;

/// Pixel size and corner radius of a panel's surface
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
    pub border_radius: f32,
}

impl Geometry {
    pub fn size(&self) -> Size {
        Size::from_pixels(self.width, self.height)
    }

    /// True when the pixel size differs from `other`
    pub fn size_changed(&self, other: &Geometry) -> bool {
        self.width != other.width || self.height != other.height
    }
}

/// Fit a measured bounding box to `kind`
///
/// Circles are forced square on the larger side with half of it as radius.
/// Pills take half the height as radius. Rounded rectangles keep
/// `border_radius`. The style to write back to the host is returned for
/// circles and pills.
pub fn fit_shape(kind: ShapeKind, measured: Rect, border_radius: f32) -> (Geometry, Option<ShapeStyle>) {
    let (width, height) = measured.ceil_pixels();
    match kind {
        ShapeKind::Rounded => (
            Geometry {
                width,
                height,
                border_radius,
            },
            None,
        ),
        ShapeKind::Circle => {
            let side = width.max(height);
            let radius = side as f32 / 2.0;
            (
                Geometry {
                    width: side,
                    height: side,
                    border_radius: radius,
                },
                Some(ShapeStyle {
                    width: Some(side),
                    height: Some(side),
                    border_radius: radius,
                }),
            )
        }
        ShapeKind::Pill => {
            let radius = height as f32 / 2.0;
            (
                Geometry {
                    width,
                    height,
                    border_radius: radius,
                },
                Some(ShapeStyle {
                    width: None,
                    height: None,
                    border_radius: radius,
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{is_circle, is_pill};

    #[test]
    fn test_circle_forced_square() {
        let (geom, style) = fit_shape(ShapeKind::Circle, Rect::new(0.0, 0.0, 80.0, 60.0), 48.0);
        assert_eq!((geom.width, geom.height), (80, 80));
        assert_eq!(geom.border_radius, 40.0);
        let style = style.unwrap();
        assert_eq!(style.width, Some(80));
        assert_eq!(style.border_radius, 40.0);
        assert!(is_circle(geom.size(), geom.border_radius));
    }

    #[test]
    fn test_pill_radius_follows_height() {
        let (geom, style) = fit_shape(ShapeKind::Pill, Rect::new(10.0, 10.0, 200.0, 40.0), 48.0);
        assert_eq!((geom.width, geom.height), (200, 40));
        assert_eq!(geom.border_radius, 20.0);
        assert_eq!(style.unwrap().width, None);
        assert!(is_pill(geom.size(), geom.border_radius));
        assert!(!is_circle(geom.size(), geom.border_radius));
    }

    #[test]
    fn test_rounded_keeps_radius_and_ceils() {
        let (geom, style) = fit_shape(ShapeKind::Rounded, Rect::new(0.0, 0.0, 299.2, 199.9), 48.0);
        assert_eq!((geom.width, geom.height), (300, 200));
        assert_eq!(geom.border_radius, 48.0);
        assert!(style.is_none());
    }

    #[test]
    fn test_size_changed_ignores_radius() {
        let a = Geometry {
            width: 10,
            height: 10,
            border_radius: 2.0,
        };
        let b = Geometry {
            border_radius: 5.0,
            ..a
        };
        assert!(!a.size_changed(&b));
        assert!(a.size_changed(&Geometry { width: 11, ..a }));
    }
}
