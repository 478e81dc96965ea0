//! Coordinate transforms between data and screen space.

use crate::geom::{Point, ScreenPoint, ScreenRect};
use crate::view::{Range, Viewport};

const MIN_SPAN: f64 = 1e-12;

/// Linear mapping between one data axis and a pixel span.
///
/// Horizontal axes grow left to right; vertical axes are flipped so that
/// larger values sit higher on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisTransform {
    range: Range,
    pixel_start: f32,
    pixel_end: f32,
}

impl AxisTransform {
    /// Horizontal axis over `[left, right]` pixels.
    pub fn horizontal(range: Range, left: f32, right: f32) -> Option<Self> {
        Self::new(range, left, right)
    }

    /// Vertical axis over `[top, bottom]` pixels, with `range.max` at the top.
    pub fn vertical(range: Range, top: f32, bottom: f32) -> Option<Self> {
        Self::new(range, bottom, top)
    }

    fn new(range: Range, pixel_start: f32, pixel_end: f32) -> Option<Self> {
        if !range.is_finite() || pixel_start == pixel_end {
            return None;
        }
        Some(Self {
            range: range.with_min_span(MIN_SPAN),
            pixel_start,
            pixel_end,
        })
    }

    /// Data range covered by the axis.
    pub fn range(&self) -> Range {
        self.range
    }

    /// Map a data coordinate to a pixel position.
    pub fn coord_to_pixel(&self, value: f64) -> f32 {
        let norm = (value - self.range.min) / self.range.span();
        let span = (self.pixel_end - self.pixel_start) as f64;
        (self.pixel_start as f64 + norm * span) as f32
    }

    /// Map a pixel position to a data coordinate.
    pub fn pixel_to_coord(&self, pixel: f32) -> f64 {
        let span = (self.pixel_end - self.pixel_start) as f64;
        let norm = (pixel as f64 - self.pixel_start as f64) / span;
        self.range.min + norm * self.range.span()
    }
}

/// Transform from data coordinates into screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    screen: ScreenRect,
    x: AxisTransform,
    y: AxisTransform,
}

impl Transform {
    /// Create a transform for the given viewport and screen rectangle.
    pub fn new(viewport: Viewport, screen: ScreenRect) -> Option<Self> {
        if !screen.is_valid() {
            return None;
        }
        let x = AxisTransform::horizontal(viewport.x, screen.min.x, screen.max.x)?;
        let y = AxisTransform::vertical(viewport.y, screen.min.y, screen.max.y)?;
        Some(Self { screen, x, y })
    }

    /// Access the screen rectangle.
    pub fn screen(&self) -> ScreenRect {
        self.screen
    }

    /// Access the horizontal axis mapping.
    pub fn x_axis(&self) -> AxisTransform {
        self.x
    }

    /// Access the vertical axis mapping.
    pub fn y_axis(&self) -> AxisTransform {
        self.y
    }

    /// Map a data point into screen space.
    pub fn data_to_screen(&self, point: Point) -> Option<ScreenPoint> {
        if !point.x.is_finite() || !point.y.is_finite() {
            return None;
        }
        Some(ScreenPoint::new(
            self.x.coord_to_pixel(point.x),
            self.y.coord_to_pixel(point.y),
        ))
    }

    /// Map a screen point into data space.
    pub fn screen_to_data(&self, point: ScreenPoint) -> Point {
        Point::new(self.x.pixel_to_coord(point.x), self.y.pixel_to_coord(point.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_roundtrip() {
        let viewport = Viewport::new(Range::new(0.0, 10.0), Range::new(0.0, 10.0));
        let screen = ScreenRect::new(ScreenPoint::new(0.0, 0.0), ScreenPoint::new(100.0, 100.0));
        let transform = Transform::new(viewport, screen).expect("valid transform");
        let point = Point::new(5.0, 7.5);
        let screen_point = transform.data_to_screen(point).unwrap();
        let roundtrip = transform.screen_to_data(screen_point);
        assert!((roundtrip.x - point.x).abs() < 1e-6);
        assert!((roundtrip.y - point.y).abs() < 1e-6);
    }

    #[test]
    fn vertical_axis_is_flipped() {
        let axis = AxisTransform::vertical(Range::new(0.0, 100.0), 0.0, 200.0).unwrap();
        assert_eq!(axis.coord_to_pixel(100.0), 0.0);
        assert_eq!(axis.coord_to_pixel(0.0), 200.0);
        assert!((axis.pixel_to_coord(50.0) - 75.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_empty_screen() {
        let viewport = Viewport::new(Range::new(0.0, 1.0), Range::new(0.0, 1.0));
        let screen = ScreenRect::new(ScreenPoint::new(5.0, 5.0), ScreenPoint::new(5.0, 50.0));
        assert!(Transform::new(viewport, screen).is_none());
    }
}
