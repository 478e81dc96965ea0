//! Pointer tools and the drag state machine shared by the chart views.
//!
//! The active [`Tool`] is owned by the session. A view only tracks whether a
//! drag is in progress and with which tool it started, so a tool change in the
//! middle of a drag cannot mix two behaviors.

use serde::{Deserialize, Serialize};

use crate::geom::ScreenPoint;
use crate::transform::AxisTransform;
use crate::view::Range;

/// Mutually exclusive pointer tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tool {
    /// Drag to shift the horizontal range.
    #[default]
    Pan,
    /// Drag to select a new horizontal range.
    Zoom,
    /// Drag to measure between two positions.
    Measure,
    /// Click to rebase the zero-altitude reference.
    Zero,
    /// Click to rebase the ground-level reference.
    Ground,
}

impl Tool {
    /// Whether the tool is a one-shot hand-off that reverts afterwards.
    pub fn is_one_shot(self) -> bool {
        matches!(self, Self::Zero | Self::Ground)
    }

    /// Whether a drag with this tool draws the guide band.
    pub fn shows_band(self) -> bool {
        matches!(self, Self::Zoom | Self::Measure)
    }
}

/// Drag finite-state machine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    /// No button held.
    #[default]
    Idle,
    /// A drag started with `tool` at `begin`; `last` is the latest position.
    Dragging {
        /// Tool active when the drag began.
        tool: Tool,
        /// Press position.
        begin: ScreenPoint,
        /// Most recent pointer position.
        last: ScreenPoint,
    },
}

/// A completed press/release pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gesture {
    /// Tool the drag started with.
    pub tool: Tool,
    /// Press position.
    pub begin: ScreenPoint,
    /// Release position.
    pub end: ScreenPoint,
}

/// Result of a pointer move while dragging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragStep {
    /// Tool the drag started with.
    pub tool: Tool,
    /// Press position.
    pub begin: ScreenPoint,
    /// Position before this move.
    pub previous: ScreenPoint,
    /// Position after this move.
    pub current: ScreenPoint,
}

impl DragState {
    /// Begin a drag. A press while already dragging restarts the drag.
    pub fn press(&mut self, tool: Tool, position: ScreenPoint) {
        *self = Self::Dragging {
            tool,
            begin: position,
            last: position,
        };
    }

    /// Advance the drag; `None` when idle.
    pub fn drag_to(&mut self, position: ScreenPoint) -> Option<DragStep> {
        match self {
            Self::Idle => None,
            Self::Dragging { tool, begin, last } => {
                let step = DragStep {
                    tool: *tool,
                    begin: *begin,
                    previous: *last,
                    current: position,
                };
                *last = position;
                Some(step)
            }
        }
    }

    /// Finish the drag; `None` when no drag was in progress.
    pub fn release(&mut self, position: ScreenPoint) -> Option<Gesture> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::Dragging { tool, begin, .. } => Some(Gesture {
                tool,
                begin,
                end: position,
            }),
        }
    }

    /// Abandon any drag in progress.
    pub fn cancel(&mut self) {
        *self = Self::Idle;
    }

    /// Check whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    /// Tool of the drag in progress.
    pub fn tool(&self) -> Option<Tool> {
        match self {
            Self::Idle => None,
            Self::Dragging { tool, .. } => Some(*tool),
        }
    }
}

/// Shift `range` so that the coordinate under `from_px` moves to `to_px`.
pub fn pan_range(range: Range, axis: &AxisTransform, from_px: f32, to_px: f32) -> Range {
    range.shifted(axis.pixel_to_coord(from_px) - axis.pixel_to_coord(to_px))
}

/// Range spanned by two pixel positions on `axis`.
pub fn range_between_pixels(axis: &AxisTransform, a_px: f32, b_px: f32) -> Range {
    Range::new(axis.pixel_to_coord(a_px), axis.pixel_to_coord(b_px))
}

/// Wheel zoom multiplier `exp(-delta / divisor)`.
///
/// Positive deltas (wheel away from the user) zoom in.
pub fn wheel_factor(delta: f64, divisor: f64) -> f64 {
    if divisor <= 0.0 || !delta.is_finite() {
        return 1.0;
    }
    (-delta / divisor).exp()
}

/// Zoom `range` about the coordinate under `cursor_px`.
pub fn zoom_range_at(range: Range, axis: &AxisTransform, cursor_px: f32, factor: f64) -> Range {
    range.scaled_about(axis.pixel_to_coord(cursor_px), factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis() -> AxisTransform {
        AxisTransform::horizontal(Range::new(0.0, 100.0), 0.0, 200.0).expect("axis")
    }

    #[test]
    fn drag_lifecycle() {
        let mut drag = DragState::default();
        assert!(drag.drag_to(ScreenPoint::new(1.0, 1.0)).is_none());
        drag.press(Tool::Measure, ScreenPoint::new(10.0, 5.0));
        let step = drag.drag_to(ScreenPoint::new(20.0, 5.0)).unwrap();
        assert_eq!(step.previous, ScreenPoint::new(10.0, 5.0));
        let step = drag.drag_to(ScreenPoint::new(30.0, 5.0)).unwrap();
        assert_eq!(step.previous, ScreenPoint::new(20.0, 5.0));
        assert_eq!(step.begin, ScreenPoint::new(10.0, 5.0));
        let gesture = drag.release(ScreenPoint::new(35.0, 5.0)).unwrap();
        assert_eq!(gesture.tool, Tool::Measure);
        assert_eq!(gesture.end.x, 35.0);
        assert!(!drag.is_dragging());
        assert!(drag.release(ScreenPoint::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn pan_keeps_width() {
        let range = Range::new(0.0, 100.0);
        let panned = pan_range(range, &axis(), 100.0, 120.0);
        assert!((panned.min + 10.0).abs() < 1e-9);
        assert!((panned.span() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn zoom_selection_is_ordered() {
        let range = range_between_pixels(&axis(), 150.0, 50.0);
        assert!((range.min - 25.0).abs() < 1e-9);
        assert!((range.max - 75.0).abs() < 1e-9);
    }

    #[test]
    fn wheel_zoom_keeps_cursor_fixed() {
        let factor = wheel_factor(120.0, 500.0);
        assert!(factor < 1.0);
        assert!((factor - (-0.24_f64).exp()).abs() < 1e-12);
        let zoomed = zoom_range_at(Range::new(0.0, 100.0), &axis(), 50.0, factor);
        let anchor = 25.0;
        assert!(((anchor - zoomed.min) / zoomed.span() - 0.25).abs() < 1e-9);
        assert_eq!(wheel_factor(120.0, 0.0), 1.0);
    }
}
