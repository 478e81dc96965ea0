//! Intervals and two-axis view ranges.

/// Numeric interval with inclusive bounds.
///
/// Used for the canonical time window, for horizontal and vertical axis
/// ranges, and for the projected extents of the 3D view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl Range {
    /// Create a new range, swapping bounds if needed.
    pub fn new(mut min: f64, mut max: f64) -> Self {
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }
        Self { min, max }
    }

    /// Single-value range.
    pub fn point(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Span of the range.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Midpoint of the range.
    pub fn center(&self) -> f64 {
        (self.min + self.max) * 0.5
    }

    /// Check whether both bounds are finite.
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Check whether the range has positive span and finite bounds.
    pub fn is_valid(&self) -> bool {
        self.is_finite() && self.span() > 0.0
    }

    /// Check whether a value lies inside the range (bounds included).
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Expand the range to include a value.
    pub fn expand_to_include(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    /// Fold a value into an optional range, starting a new one if empty.
    pub fn include(range: Option<Self>, value: f64) -> Option<Self> {
        if !value.is_finite() {
            return range;
        }
        Some(match range {
            None => Self::point(value),
            Some(mut existing) => {
                existing.expand_to_include(value);
                existing
            }
        })
    }

    /// Translate both bounds by `delta`.
    pub fn shifted(&self, delta: f64) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// Scale the range about `anchor`, keeping `anchor` fixed.
    pub fn scaled_about(&self, anchor: f64, factor: f64) -> Self {
        Self::new(
            anchor + (self.min - anchor) * factor,
            anchor + (self.max - anchor) * factor,
        )
    }

    /// Range of the same center with the span multiplied by `factor`.
    pub fn expanded(&self, factor: f64) -> Self {
        let half = self.span() * factor * 0.5;
        let center = self.center();
        Self::new(center - half, center + half)
    }

    /// Ensure the range has at least the given span.
    pub fn with_min_span(&self, min_span: f64) -> Self {
        let span = self.span();
        if span >= min_span {
            return *self;
        }
        let center = self.center();
        let half = min_span * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }
}

/// Visible data ranges on both screen axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Horizontal range.
    pub x: Range,
    /// Vertical range.
    pub y: Range,
}

impl Viewport {
    /// Create a viewport from X and Y ranges.
    pub fn new(x: Range, y: Range) -> Self {
        Self { x, y }
    }

    /// Check whether both axes are valid.
    pub fn is_valid(&self) -> bool {
        self.x.is_valid() && self.y.is_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_with_min_span_expands() {
        let range = Range::new(2.0, 2.0);
        let expanded = range.with_min_span(1.0);
        assert!(expanded.span() >= 1.0);
        assert!((expanded.center() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn scaled_about_keeps_anchor_fixed() {
        let range = Range::new(0.0, 10.0);
        let zoomed = range.scaled_about(4.0, 0.5);
        assert!((zoomed.min - 2.0).abs() < 1e-12);
        assert!((zoomed.max - 7.0).abs() < 1e-12);
        let anchor_frac = (4.0 - range.min) / range.span();
        let zoomed_frac = (4.0 - zoomed.min) / zoomed.span();
        assert!((anchor_frac - zoomed_frac).abs() < 1e-12);
    }

    #[test]
    fn include_skips_non_finite_values() {
        let range = Range::include(None, f64::NAN);
        assert!(range.is_none());
        let range = Range::include(Range::include(range, 3.0), -1.0).unwrap();
        assert_eq!(range, Range::new(-1.0, 3.0));
    }
}
