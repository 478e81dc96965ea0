//! 2D multi-series chart.
//!
//! One horizontal quantity is plotted against every visible vertical quantity,
//! each on its own auto-ranged axis. The horizontal range is always the
//! session's time window reprojected through the horizontal quantity, and
//! every range the chart produces is converted back to times before it is
//! written to the session.

use crate::axis::{AxisSet, ticks};
use crate::geom::{Point, ScreenPoint, ScreenRect};
use crate::index::IndexEngine;
use crate::interaction::{
    DragState, Tool, pan_range, range_between_pixels, wheel_factor, zoom_range_at,
};
use crate::quantity::{Quantity, UnitSystem};
use crate::render::{
    Color, LineDash, LineSegment, LineStyle, MarkerStyle, RectStyle, RenderCommand, RenderList,
    TextAnchor, TextStyle, build_line_segments, build_scatter_points,
};
use crate::sample::Sample;
use crate::session::{ReferenceBand, TrackSession};
use crate::summary::{MarkSummary, summarize_point, summarize_range};
use crate::transform::{AxisTransform, Transform};
use crate::view::{Range, Viewport};

const BAND_FILL: Color = Color::rgba8(0, 0, 0, 8);
const BAND_STROKE: Color = Color::rgba8(0, 0, 0, 16);
const LABEL_SIZE: f32 = 11.0;

/// Chart state between refreshes.
#[derive(Debug, Default)]
pub struct TrackChart {
    drag: DragState,
    cursor: Option<ScreenPoint>,
    plot_rect: Option<ScreenRect>,
    x_axis: Option<AxisTransform>,
    axes: AxisSet,
    summary: Option<MarkSummary>,
}

impl TrackChart {
    /// Create an idle chart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Vertical axes of the last refresh.
    pub fn axes(&self) -> &AxisSet {
        &self.axes
    }

    /// Horizontal axis mapping of the last refresh.
    pub fn x_axis(&self) -> Option<&AxisTransform> {
        self.x_axis.as_ref()
    }

    /// Summary of the current mark, for a tooltip.
    pub fn summary(&self) -> Option<&MarkSummary> {
        self.summary.as_ref()
    }

    /// Last pointer position inside the widget.
    pub fn cursor(&self) -> Option<ScreenPoint> {
        self.cursor
    }

    /// Rebuild axes and series for `rect`.
    pub fn update_plot(&mut self, session: &TrackSession, rect: ScreenRect) -> RenderList {
        let mut render = RenderList::new();
        let units = session.units();
        let x_quantity = session.x_axis_kind().quantity();
        let store = session.store();
        let quantities = session.quantities();

        self.plot_rect = Some(rect);
        self.axes = AxisSet::rebuild(quantities, units);
        self.x_axis = None;

        let window = session.window();
        let (Some(lower), Some(upper)) = (
            store.interpolate_at_t(window.min),
            store.interpolate_at_t(window.max),
        ) else {
            return render;
        };
        let x_range = Range::new(
            x_quantity.value(&lower, units),
            x_quantity.value(&upper, units),
        );
        let Some(x_axis) = AxisTransform::horizontal(x_range, rect.min.x, rect.max.x) else {
            return render;
        };
        self.x_axis = Some(x_axis);
        self.axes
            .update_y_ranges(store, quantities, session.x_axis_kind(), units, x_range);

        let project = |samples: &[Sample], q: &dyn Quantity| -> Vec<Point> {
            samples
                .iter()
                .map(|s| Point::new(x_quantity.value(s, units), q.value(s, units)))
                .collect()
        };
        let mark_sample = session
            .mark()
            .and_then(|mark| store.interpolate_at_t(mark.end()));

        render.push(RenderCommand::ClipRect(rect));
        let mut segments = Vec::new();
        for quantity in quantities.visible() {
            let Some(y_range) = self.axes.get(quantity.key()).and_then(|axis| axis.range())
            else {
                continue;
            };
            let Some(transform) = Transform::new(Viewport::new(x_range, y_range), rect) else {
                continue;
            };
            let color = quantity.color();

            build_line_segments(
                &project(store.samples(), quantity),
                &transform,
                rect,
                &mut segments,
            );
            render.push_segments(std::mem::take(&mut segments), LineStyle::solid(color, 1.0));

            if quantity.has_optimal() && !store.optimal().is_empty() {
                build_line_segments(
                    &project(store.optimal(), quantity),
                    &transform,
                    rect,
                    &mut segments,
                );
                render.push_segments(
                    std::mem::take(&mut segments),
                    LineStyle::solid(color, 1.0).with_dash(LineDash::Dotted),
                );
            }

            if quantity.is_elevation()
                && let Some(band) = session.reference_band()
            {
                push_reference_band(&mut render, band, quantity, x_quantity, units, &transform);
            }

            if let Some(sample) = mark_sample {
                let mut points = Vec::new();
                build_scatter_points(&project(&[sample], quantity), &transform, rect, &mut points);
                render.push_points(points, MarkerStyle::default());
            }
        }
        self.push_cursor_overlay(&mut render, session, rect);
        render.push(RenderCommand::ClipEnd);

        push_labels(&mut render, session, &self.axes, &x_axis, rect);
        render
    }

    fn push_cursor_overlay(&self, render: &mut RenderList, session: &TrackSession, rect: ScreenRect) {
        let Some(cursor) = self.cursor else {
            return;
        };
        let vertical = |x: f32| {
            LineSegment::new(ScreenPoint::new(x, rect.min.y), ScreenPoint::new(x, rect.max.y))
        };
        let black = LineStyle::solid(Color::BLACK, 1.0);

        if let DragState::Dragging { tool, begin, .. } = self.drag
            && tool.shows_band()
        {
            let mut guides = vec![vertical(begin.x)];
            if rect.min.x <= cursor.x && cursor.x <= rect.max.x {
                guides.push(vertical(cursor.x));
            }
            render.push_segments(guides, black);
            let band = ScreenRect::new(
                ScreenPoint::new(begin.x.min(cursor.x), rect.min.y),
                ScreenPoint::new(begin.x.max(cursor.x), rect.max.y),
            );
            if let Some(band) = band.intersect(rect) {
                render.push(RenderCommand::Rect {
                    rect: band,
                    style: RectStyle::filled(session.chart_config().band_color),
                });
            }
        } else if rect.contains(cursor) {
            render.push_segments(
                vec![
                    vertical(cursor.x),
                    LineSegment::new(
                        ScreenPoint::new(rect.min.x, cursor.y),
                        ScreenPoint::new(rect.max.x, cursor.y),
                    ),
                ],
                black,
            );
        }
    }

    /// Pointer pressed inside the widget.
    pub fn on_press(&mut self, session: &mut TrackSession, position: ScreenPoint) {
        if self.plot_rect.is_some_and(|rect| rect.contains(position)) {
            session.commit_window();
            self.drag.press(session.tool(), position);
        }
    }

    /// Pointer moved inside the widget.
    pub fn on_move(&mut self, session: &mut TrackSession, position: ScreenPoint) {
        self.cursor = Some(position);
        let (Some(rect), Some(x_axis)) = (self.plot_rect, self.x_axis) else {
            return;
        };

        let step = self.drag.drag_to(position);
        if let Some(step) = step
            && step.tool == Tool::Pan
        {
            let range = pan_range(x_axis.range(), &x_axis, step.previous.x, position.x);
            self.preview_range(session, range);
        }

        if !rect.contains(position) {
            session.clear_mark();
            self.summary = None;
            return;
        }
        let Some(x_axis) = self.x_axis else {
            return;
        };
        let x = x_axis.pixel_to_coord(position.x);
        match step {
            Some(step) if step.tool == Tool::Measure => {
                let begin = x_axis.pixel_to_coord(step.begin.x);
                self.set_range_mark(session, begin, x);
            }
            _ => self.set_point_mark(session, x),
        }
    }

    /// Pointer released.
    pub fn on_release(&mut self, session: &mut TrackSession, position: ScreenPoint) {
        let Some(gesture) = self.drag.release(position) else {
            return;
        };
        let Some(x_axis) = self.x_axis else {
            return;
        };
        match gesture.tool {
            Tool::Pan => session.commit_window(),
            Tool::Zoom => {
                if (gesture.end.x - gesture.begin.x).abs()
                    >= session.chart_config().min_zoom_drag_px
                {
                    let range = range_between_pixels(&x_axis, gesture.begin.x, gesture.end.x);
                    self.set_range(session, range);
                }
            }
            Tool::Measure => {}
            Tool::Zero => {
                if let Some(time) = self.time_at(session, x_axis.pixel_to_coord(gesture.end.x)) {
                    session.request_zero(time);
                }
            }
            Tool::Ground => {
                if let Some(time) = self.time_at(session, x_axis.pixel_to_coord(gesture.end.x)) {
                    session.request_ground(time);
                }
            }
        }
    }

    /// Wheel scrolled by `delta` (positive away from the user).
    pub fn on_wheel(&mut self, session: &mut TrackSession, position: ScreenPoint, delta: f64) {
        let (Some(rect), Some(x_axis)) = (self.plot_rect, self.x_axis) else {
            return;
        };
        if !rect.contains(position) {
            return;
        }
        let factor = wheel_factor(delta, session.chart_config().wheel_divisor);
        let range = zoom_range_at(x_axis.range(), &x_axis, position.x, factor);
        self.preview_range(session, range);
    }

    /// Pointer left the widget.
    pub fn on_leave(&mut self, session: &mut TrackSession) {
        self.cursor = None;
        self.summary = None;
        session.commit_window();
        session.clear_mark();
    }

    fn time_at(&self, session: &TrackSession, x: f64) -> Option<f64> {
        let engine = IndexEngine::new(
            session.store().samples(),
            session.x_axis_kind().quantity(),
            session.units(),
        );
        engine.interpolate_at_x(x).map(|sample| sample.t)
    }

    fn times_of(&self, session: &TrackSession, range: Range) -> Option<(f64, f64)> {
        Some((
            self.time_at(session, range.min)?,
            self.time_at(session, range.max)?,
        ))
    }

    fn set_range(&mut self, session: &mut TrackSession, range: Range) {
        if let Some((lower, upper)) = self.times_of(session, range) {
            session.set_window(lower, upper);
        }
    }

    fn preview_range(&mut self, session: &mut TrackSession, range: Range) {
        if let Some((lower, upper)) = self.times_of(session, range) {
            session.preview_window(lower, upper);
        }
        if let Some(rect) = self.plot_rect
            && let Some(updated) = AxisTransform::horizontal(range, rect.min.x, rect.max.x)
        {
            self.x_axis = Some(updated);
        }
    }

    fn set_point_mark(&mut self, session: &mut TrackSession, x: f64) {
        let Some(time) = self.time_at(session, x) else {
            self.summary = None;
            return;
        };
        session.set_mark_point(time);
        self.summary = summarize_point(
            session.store(),
            session.quantities(),
            session.x_axis_kind(),
            session.units(),
            x,
        );
    }

    fn set_range_mark(&mut self, session: &mut TrackSession, start: f64, end: f64) {
        let Some((t_start, t_end)) = self
            .time_at(session, start)
            .zip(self.time_at(session, end))
        else {
            self.summary = None;
            return;
        };
        session.set_mark_range(t_start, t_end);
        self.summary = summarize_range(
            session.store(),
            session.quantities(),
            session.x_axis_kind(),
            session.units(),
            start,
            end,
        );
    }
}

fn push_reference_band(
    render: &mut RenderList,
    band: &ReferenceBand,
    elevation: &dyn Quantity,
    x_quantity: &dyn Quantity,
    units: UnitSystem,
    transform: &Transform,
) {
    let rect = transform.screen();
    let x_range = transform.x_axis().range();
    let dashed = LineStyle::solid(elevation.color(), 1.0).with_dash(LineDash::Dashed);

    let mut lines = Vec::new();
    for sample in [&band.top, &band.bottom] {
        let y = elevation.value(sample, units);
        let mut segment = Vec::new();
        build_line_segments(
            &[Point::new(x_range.min, y), Point::new(x_range.max, y)],
            transform,
            rect,
            &mut segment,
        );
        lines.extend(segment);
    }
    render.push_segments(lines, dashed);

    let style = RectStyle {
        fill: BAND_FILL,
        stroke: BAND_STROKE,
        stroke_width: 1.0,
    };
    let margin_x = rect.width() * 0.1;
    let margin_y = rect.height() * 0.1;
    let top_px = transform.x_axis().coord_to_pixel(x_quantity.value(&band.top, units));
    let bottom_px = transform.x_axis().coord_to_pixel(x_quantity.value(&band.bottom, units));
    for (left, right) in [
        (rect.min.x - margin_x, top_px),
        (bottom_px, rect.max.x + margin_x),
    ] {
        if left < right {
            render.push(RenderCommand::Rect {
                rect: ScreenRect::new(
                    ScreenPoint::new(left, rect.min.y - margin_y),
                    ScreenPoint::new(right, rect.max.y + margin_y),
                ),
                style,
            });
        }
    }
}

fn push_labels(
    render: &mut RenderList,
    session: &TrackSession,
    axes: &AxisSet,
    x_axis: &AxisTransform,
    rect: ScreenRect,
) {
    let label = TextStyle {
        size: LABEL_SIZE,
        ..TextStyle::default()
    };
    let mut tick_marks = Vec::new();
    for tick in ticks(x_axis.range(), session.chart_config().max_ticks) {
        let x = x_axis.coord_to_pixel(tick.value);
        tick_marks.push(LineSegment::new(
            ScreenPoint::new(x, rect.max.y),
            ScreenPoint::new(x, rect.max.y + 4.0),
        ));
        render.push(RenderCommand::Text {
            position: ScreenPoint::new(x, rect.max.y + 5.0),
            text: tick.label,
            style: label.clone(),
        });
    }
    render.push_segments(tick_marks, LineStyle::solid(Color::BLACK, 1.0));

    render.push(RenderCommand::Text {
        position: ScreenPoint::new(rect.max.x, rect.max.y + 5.0 + 2.0 * LABEL_SIZE),
        text: session.x_axis_kind().quantity().title(session.units()),
        style: TextStyle {
            anchor: TextAnchor::BottomRight,
            ..label.clone()
        },
    });

    let mut y = rect.min.y + 2.0;
    for axis in axes.iter() {
        let text = match axis.range() {
            Some(range) => format!("{} [{:.1}, {:.1}]", axis.title(), range.min, range.max),
            None => axis.title().to_string(),
        };
        render.push(RenderCommand::Text {
            position: ScreenPoint::new(rect.min.x + 4.0, y),
            text,
            style: TextStyle {
                color: axis.color(),
                ..label.clone()
            },
        });
        y += LABEL_SIZE + 2.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::{Elevation, UnitSystem, XAxisKind};
    use crate::session::{Mark, SessionEvent};
    use crate::track::TrackStore;

    fn session() -> TrackSession {
        let samples = (0..=100)
            .map(|i| {
                let t = f64::from(i);
                let mut sample = Sample::at(t, t * 2.0, 0.0, 1000.0 - t * 5.0);
                sample.dist_2d = t * 2.0;
                sample
            })
            .collect();
        TrackSession::new(TrackStore::from_samples(samples).unwrap())
    }

    fn rect() -> ScreenRect {
        ScreenRect::from_origin_size(0.0, 0.0, 400.0, 200.0)
    }

    fn series_count(render: &RenderList, segments_per_series: usize) -> usize {
        render
            .commands()
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    RenderCommand::LineSegments { segments, style }
                        if style.dash == LineDash::Solid && segments.len() == segments_per_series
                )
            })
            .count()
    }

    #[test]
    fn draws_one_series_per_visible_quantity() {
        let session = session();
        let mut chart = TrackChart::new();
        let render = chart.update_plot(&session, rect());
        let visible = session.quantities().visible().count();
        assert_eq!(chart.axes().len(), visible);
        assert_eq!(series_count(&render, 100), visible);
    }

    #[test]
    fn horizontal_range_follows_time_window() {
        let mut session = session();
        session.set_window(10.0, 20.0);
        session.set_x_axis_kind(XAxisKind::Distance2D);
        let mut chart = TrackChart::new();
        chart.update_plot(&session, rect());
        assert_eq!(chart.x_axis().unwrap().range(), Range::new(20.0, 40.0));
        let elevation = chart.axes().get("elevation").unwrap().range().unwrap();
        assert_eq!(elevation, Range::new(900.0, 950.0));
    }

    #[test]
    fn pan_drag_keeps_width() {
        let mut session = session();
        session.set_window(20.0, 60.0);
        let mut chart = TrackChart::new();
        chart.update_plot(&session, rect());
        chart.on_press(&mut session, ScreenPoint::new(200.0, 100.0));
        chart.on_move(&mut session, ScreenPoint::new(150.0, 100.0));
        chart.on_move(&mut session, ScreenPoint::new(100.0, 100.0));
        chart.on_release(&mut session, ScreenPoint::new(100.0, 100.0));
        let window = session.window();
        assert!((window.min - 30.0).abs() < 1e-6);
        assert!((window.max - 70.0).abs() < 1e-6);
        assert!(session.undo_zoom());
        assert_eq!(session.window(), Range::new(20.0, 60.0));
    }

    #[test]
    fn zoom_drag_selects_range() {
        let mut session = session();
        session.set_tool(Tool::Zoom);
        let mut chart = TrackChart::new();
        chart.update_plot(&session, rect());
        chart.on_press(&mut session, ScreenPoint::new(300.0, 50.0));
        chart.on_move(&mut session, ScreenPoint::new(100.0, 50.0));
        let render = chart.update_plot(&session, rect());
        assert!(render.commands().iter().any(|c| matches!(
            c,
            RenderCommand::Rect { style, .. } if style.fill == Color::rgba8(181, 217, 42, 64)
        )));
        chart.on_release(&mut session, ScreenPoint::new(100.0, 50.0));
        let window = session.window();
        assert!((window.min - 25.0).abs() < 1e-6);
        assert!((window.max - 75.0).abs() < 1e-6);
    }

    #[test]
    fn wheel_zoom_keeps_cursor_coordinate() {
        let mut session = session();
        let mut chart = TrackChart::new();
        chart.update_plot(&session, rect());
        chart.on_wheel(&mut session, ScreenPoint::new(100.0, 50.0), 500.0);
        let window = session.window();
        let factor = (-1.0_f64).exp();
        assert!((window.span() - 100.0 * factor).abs() < 1e-6);
        assert!(((25.0 - window.min) / window.span() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn measure_drag_sets_range_mark_and_summary() {
        let mut session = session();
        session.set_tool(Tool::Measure);
        let mut chart = TrackChart::new();
        chart.update_plot(&session, rect());
        chart.on_press(&mut session, ScreenPoint::new(40.0, 50.0));
        chart.on_move(&mut session, ScreenPoint::new(80.0, 50.0));
        let Some(Mark::Range { start, end }) = session.mark() else {
            panic!("expected a range mark");
        };
        assert!((start - 10.0).abs() < 1e-9);
        assert!((end - 20.0).abs() < 1e-9);
        let summary = chart.summary().unwrap();
        let row = summary.row(&Elevation.title(UnitSystem::Metric)).unwrap();
        assert!((row.delta.unwrap() + 50.0).abs() < 1e-6);
        assert!((row.average.unwrap() - 925.0).abs() < 1e-6);
    }

    #[test]
    fn hover_marks_point_and_draws_crosshair() {
        let mut session = session();
        let mut chart = TrackChart::new();
        chart.update_plot(&session, rect());
        chart.on_move(&mut session, ScreenPoint::new(200.0, 100.0));
        assert_eq!(session.mark(), Some(Mark::Point(50.0)));
        let render = chart.update_plot(&session, rect());
        let markers = render
            .commands()
            .iter()
            .filter(|c| matches!(c, RenderCommand::Points { .. }))
            .count();
        assert_eq!(markers, session.quantities().visible().count());
        assert!(render.commands().iter().any(|c| matches!(
            c,
            RenderCommand::LineSegments { segments, style }
                if style.color == Color::BLACK && segments.len() == 2
        )));

        chart.on_leave(&mut session);
        assert_eq!(session.mark(), None);
        assert!(chart.summary().is_none());
    }

    #[test]
    fn zero_release_hands_off_time() {
        let mut session = session();
        session.set_tool(Tool::Zoom);
        session.set_tool(Tool::Zero);
        let mut chart = TrackChart::new();
        chart.update_plot(&session, rect());
        session.take_events();
        chart.on_press(&mut session, ScreenPoint::new(100.0, 50.0));
        chart.on_release(&mut session, ScreenPoint::new(100.0, 50.0));
        let events: Vec<SessionEvent> =
            session.take_events().into_iter().map(|u| u.event).collect();
        assert!(events.contains(&SessionEvent::ZeroRequested { time: 25.0 }));
        assert_eq!(session.tool(), Tool::Zoom);
    }

    #[test]
    fn ground_release_hands_off_time() {
        let mut session = session();
        session.set_tool(Tool::Measure);
        session.set_tool(Tool::Ground);
        let mut chart = TrackChart::new();
        chart.update_plot(&session, rect());
        session.take_events();
        chart.on_press(&mut session, ScreenPoint::new(300.0, 50.0));
        chart.on_release(&mut session, ScreenPoint::new(300.0, 50.0));
        let events: Vec<SessionEvent> =
            session.take_events().into_iter().map(|u| u.event).collect();
        assert!(events.contains(&SessionEvent::GroundRequested { time: 75.0 }));
        assert!(events.contains(&SessionEvent::ToolChanged(Tool::Measure)));
        assert_eq!(session.tool(), Tool::Measure);
    }

    #[test]
    fn optimal_track_draws_dotted_series() {
        let mut session = session();
        let mut chart = TrackChart::new();
        let dotted_elevation = |render: &RenderList| {
            render.commands().iter().find_map(|c| match c {
                RenderCommand::LineSegments { segments, style }
                    if style.dash == LineDash::Dotted && style.color == Elevation.color() =>
                {
                    Some(segments.len())
                }
                _ => None,
            })
        };
        assert_eq!(dotted_elevation(&chart.update_plot(&session, rect())), None);

        let optimal = (0..=10)
            .map(|i| {
                let t = f64::from(i) * 10.0;
                Sample::at(t, t * 2.0, 0.0, 1000.0 - t * 4.0)
            })
            .collect();
        session.set_optimal(optimal).unwrap();
        let render = chart.update_plot(&session, rect());
        assert_eq!(dotted_elevation(&render), Some(10));
        assert_eq!(series_count(&render, 100), session.quantities().visible().count());
    }

    #[test]
    fn reference_band_draws_dashed_lines_and_shading() {
        let mut session = session();
        let top = *session.store().sample(20).unwrap();
        let bottom = *session.store().sample(80).unwrap();
        session.set_reference_band(Some(ReferenceBand { top, bottom }));
        let mut chart = TrackChart::new();
        let render = chart.update_plot(&session, rect());
        let dashed = render.commands().iter().find_map(|c| match c {
            RenderCommand::LineSegments { segments, style } if style.dash == LineDash::Dashed => {
                Some(segments.len())
            }
            _ => None,
        });
        assert_eq!(dashed, Some(2));
        let shaded = render
            .commands()
            .iter()
            .filter(|c| matches!(c, RenderCommand::Rect { style, .. } if style.fill == BAND_FILL))
            .count();
        assert_eq!(shaded, 2);
    }

    #[test]
    fn empty_track_is_inert() {
        let mut session = TrackSession::default();
        let mut chart = TrackChart::new();
        let render = chart.update_plot(&session, rect());
        assert!(render.is_empty());
        chart.on_press(&mut session, ScreenPoint::new(10.0, 10.0));
        chart.on_move(&mut session, ScreenPoint::new(20.0, 10.0));
        chart.on_wheel(&mut session, ScreenPoint::new(20.0, 10.0), 120.0);
        assert!(chart.summary().is_none());
        assert_eq!(session.mark(), None);
    }
}
