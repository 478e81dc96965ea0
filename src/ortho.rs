//! Orthographic 3D view of the track.
//!
//! The in-window part of the track is projected onto the camera plane and
//! fitted to the plot rectangle at equal physical scale on both axes.
//! Dragging rotates the camera; hovering picks the nearest point on the
//! drawn curve and marks its time.
//!
//! Picking scans every drawn segment on each pointer move. That is linear in
//! the number of in-window samples and can become noticeable on very long
//! tracks.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use serde::{Deserialize, Serialize};

use crate::config::OrthoConfig;
use crate::geodesy::{Geodesy, SphericalGeodesy};
use crate::geom::{Point, ScreenPoint, ScreenRect, Vec3};
use crate::interaction::{DragState, Tool};
use crate::render::{
    Color, LineStyle, MarkerShape, MarkerStyle, RenderCommand, RenderList, build_line_segments,
    build_scatter_points,
};
use crate::session::TrackSession;
use crate::track::TrackStore;
use crate::transform::Transform;
use crate::view::{Range, Viewport};

/// Camera angles in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    /// Rotation about the vertical axis.
    pub azimuth: f64,
    /// Angle above the horizon, within `[-pi/2, pi/2]`.
    pub elevation: f64,
}

impl Default for Camera {
    /// Looking straight down with north up.
    fn default() -> Self {
        Self {
            azimuth: -FRAC_PI_2,
            elevation: FRAC_PI_2,
        }
    }
}

/// Orthonormal camera frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBasis {
    /// Screen up.
    pub up: Vec3,
    /// Towards the viewer.
    pub back: Vec3,
    /// Screen right, `up x back`.
    pub right: Vec3,
}

impl CameraBasis {
    /// Screen-plane coordinates of `p`.
    pub fn project(&self, p: Vec3) -> Point {
        Point::new(p.dot(self.right), p.dot(self.up))
    }

    /// Distance of `p` towards the viewer.
    pub fn depth(&self, p: Vec3) -> f64 {
        p.dot(self.back)
    }
}

impl Camera {
    /// Camera with the elevation clamped into range.
    pub fn new(azimuth: f64, elevation: f64) -> Self {
        Self {
            azimuth,
            elevation,
        }
        .clamped()
    }

    /// Same camera with the elevation clamped to `[-pi/2, pi/2]`.
    pub fn clamped(self) -> Self {
        Self {
            azimuth: self.azimuth,
            elevation: self.elevation.clamp(-FRAC_PI_2, FRAC_PI_2),
        }
    }

    /// Camera frame for the current angles.
    pub fn basis(&self) -> CameraBasis {
        let (sin_e, cos_e) = self.elevation.sin_cos();
        let (sin_a, cos_a) = self.azimuth.sin_cos();
        let up = Vec3::new(-sin_e * cos_a, -sin_e * sin_a, cos_e);
        let back = Vec3::new(cos_e * cos_a, cos_e * sin_a, sin_e);
        CameraBasis {
            up,
            back,
            right: up.cross(back),
        }
    }

    /// Rotate by a drag expressed as fractions of the plot width and height.
    pub fn rotated(self, dx_frac: f64, dy_frac: f64) -> Self {
        Self::new(
            self.azimuth - wrap_angle(dx_frac),
            self.elevation + dy_frac,
        )
    }
}

fn wrap_angle(mut angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    while angle < -PI {
        angle += TAU;
    }
    while angle > PI {
        angle -= TAU;
    }
    angle
}

/// Fit projected extents into `rect` at equal physical scale.
///
/// The extents are grown by `config.fit_expansion`, converted to data units
/// per millimetre on each axis, and the larger of the two is used for both so
/// that a metre covers the same physical length horizontally and vertically.
/// The result is centered on the midpoint of the extents.
pub fn set_view_range(x: Range, y: Range, rect: ScreenRect, config: &OrthoConfig) -> Viewport {
    let width_mm = f64::from(rect.width()) * config.mm_per_px_x;
    let height_mm = f64::from(rect.height()) * config.mm_per_px_y;

    let x_scale = x.span() * config.fit_expansion / width_mm;
    let y_scale = y.span() * config.fit_expansion / height_mm;
    let mut scale = x_scale.max(y_scale);
    if !(scale.is_finite() && scale > 0.0) {
        scale = 1.0;
    }

    let half_x = width_mm * scale * 0.5;
    let half_y = height_mm * scale * 0.5;
    Viewport::new(
        Range::new(x.center() - half_x, x.center() + half_x),
        Range::new(y.center() - half_y, y.center() + half_y),
    )
}

/// Squared distance from `p` to the segment `a`-`b`, and the fraction `mu`
/// of the closest point along the segment.
pub fn dist_sqr_to_segment(a: ScreenPoint, b: ScreenPoint, p: ScreenPoint) -> (f64, f64) {
    let (ax, ay) = (f64::from(a.x), f64::from(a.y));
    let (dx, dy) = (f64::from(b.x) - ax, f64::from(b.y) - ay);
    let (px, py) = (f64::from(p.x) - ax, f64::from(p.y) - ay);
    let len_sqr = dx * dx + dy * dy;
    let mu = if len_sqr > 0.0 {
        ((px * dx + py * dy) / len_sqr).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (ex, ey) = (px - mu * dx, py - mu * dy);
    (ex * ex + ey * ey, mu)
}

/// Waypoint positions in the track frame, placed by distance and bearing
/// from the last sample of the track.
pub fn waypoint_positions(store: &TrackStore, geodesy: &dyn Geodesy) -> Vec<Vec3> {
    let Some(anchor) = store.samples().last() else {
        return Vec::new();
    };
    store
        .waypoints()
        .iter()
        .map(|waypoint| {
            let distance = geodesy.distance(anchor, waypoint);
            let bearing = geodesy.bearing(anchor, waypoint);
            Vec3::new(
                anchor.x + distance * bearing.sin(),
                anchor.y + distance * bearing.cos(),
                waypoint.z,
            )
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct CurvePoint {
    point: Point,
    t: f64,
}

/// Orthographic track view.
#[derive(Debug)]
pub struct OrthoView {
    drag: DragState,
    geodesy: Box<dyn Geodesy + Send + Sync>,
    curve: Vec<CurvePoint>,
    transform: Option<Transform>,
    display: Option<(f64, f64)>,
}

impl Default for OrthoView {
    fn default() -> Self {
        Self::new()
    }
}

impl OrthoView {
    /// Create a view using great-circle geodesy for waypoints.
    pub fn new() -> Self {
        Self::with_geodesy(Box::new(SphericalGeodesy))
    }

    /// Create a view with a custom distance/bearing provider.
    pub fn with_geodesy(geodesy: Box<dyn Geodesy + Send + Sync>) -> Self {
        Self {
            drag: DragState::Idle,
            geodesy,
            curve: Vec::new(),
            transform: None,
            display: None,
        }
    }

    /// Fit using the pixel size of the display the view is shown on.
    ///
    /// See [`OrthoConfig::with_display`]. Without a display the session's
    /// configured pixel size is used.
    pub fn set_display(&mut self, device_dpi: f64, scale_factor: f64) {
        self.display = Some((device_dpi, scale_factor));
    }

    fn fit_config(&self, config: &OrthoConfig) -> OrthoConfig {
        match self.display {
            Some((dpi, scale)) => config.with_display(dpi, scale),
            None => *config,
        }
    }

    /// Data-to-screen mapping of the last refresh.
    pub fn transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    /// Reproject the in-window track and build the frame for `rect`.
    pub fn update_view(&mut self, session: &TrackSession, rect: ScreenRect) -> RenderList {
        let mut render = RenderList::new();
        self.curve.clear();
        self.transform = None;
        if !rect.is_valid() {
            return render;
        }

        let basis = session.camera().basis();
        let scale = session.units().length(1.0);
        let window = session.window();
        let store = session.store();
        let project = |p: Vec3| basis.project(p.scale(scale));

        let mut x_extent = None;
        let mut y_extent = None;
        for sample in store.samples().iter().filter(|s| window.contains(s.t)) {
            let point = project(sample.position());
            x_extent = Range::include(x_extent, point.x);
            y_extent = Range::include(y_extent, point.y);
            self.curve.push(CurvePoint { point, t: sample.t });
        }
        let (Some(x_extent), Some(y_extent)) = (x_extent, y_extent) else {
            return render;
        };
        let config = self.fit_config(session.ortho_config());
        let viewport = set_view_range(x_extent, y_extent, rect, &config);
        let Some(transform) = Transform::new(viewport, rect) else {
            return render;
        };
        self.transform = Some(transform);

        render.push(RenderCommand::ClipRect(rect));

        let points: Vec<Point> = self.curve.iter().map(|c| c.point).collect();
        let mut segments = Vec::new();
        build_line_segments(&points, &transform, rect, &mut segments);
        render.push_segments(segments, LineStyle::solid(Color::BLACK, 1.0));

        if let Some(mark) = session.mark()
            && let Some(sample) = store.interpolate_at_t(mark.end())
        {
            let mut marker = Vec::new();
            build_scatter_points(&[project(sample.position())], &transform, rect, &mut marker);
            render.push_points(marker, MarkerStyle::default());
        }

        let waypoints: Vec<Point> = waypoint_positions(store, self.geodesy.as_ref())
            .into_iter()
            .map(project)
            .collect();
        let mut markers = Vec::new();
        build_scatter_points(&waypoints, &transform, rect, &mut markers);
        render.push_points(
            markers,
            MarkerStyle {
                shape: MarkerShape::Plus,
                size: 8.0,
                ..MarkerStyle::default()
            },
        );

        render.push(RenderCommand::ClipEnd);
        render
    }

    /// Time on the drawn curve nearest to `position`, if within `tolerance_px`.
    pub fn pick(&self, position: ScreenPoint, tolerance_px: f32) -> Option<f64> {
        let transform = self.transform.as_ref()?;
        let mut best: Option<(f64, f64)> = None;
        for pair in self.curve.windows(2) {
            let (Some(a), Some(b)) = (
                transform.data_to_screen(pair[0].point),
                transform.data_to_screen(pair[1].point),
            ) else {
                continue;
            };
            let (dist_sqr, mu) = dist_sqr_to_segment(a, b, position);
            if best.is_none_or(|(best_sqr, _)| dist_sqr < best_sqr) {
                best = Some((dist_sqr, pair[0].t + mu * (pair[1].t - pair[0].t)));
            }
        }
        let (dist_sqr, time) = best?;
        (dist_sqr.sqrt() < f64::from(tolerance_px)).then_some(time)
    }

    /// Start a rotate drag if `position` is inside the last drawn rectangle.
    pub fn on_press(&mut self, position: ScreenPoint) {
        if self
            .transform
            .is_some_and(|transform| transform.screen().contains(position))
        {
            self.drag.press(Tool::Pan, position);
        }
    }

    /// Rotate while dragging, then pick the nearest point and update the mark.
    pub fn on_move(&mut self, session: &mut TrackSession, position: ScreenPoint) {
        let Some(transform) = self.transform else {
            return;
        };
        if let Some(step) = self.drag.drag_to(position) {
            let rect = transform.screen();
            let dx = f64::from(step.current.x - step.previous.x) / f64::from(rect.width());
            let dy = f64::from(step.current.y - step.previous.y) / f64::from(rect.height());
            session.set_camera(session.camera().rotated(dx, dy));
        }
        match self.pick(position, session.ortho_config().selection_tolerance_px) {
            Some(time) => {
                tracing::trace!(time, "picked track point");
                session.set_mark_point(time);
            }
            None => session.clear_mark(),
        }
    }

    /// End a rotate drag.
    pub fn on_release(&mut self, position: ScreenPoint) {
        self.drag.release(position);
    }

    /// Pointer left the view.
    pub fn on_leave(&mut self, session: &mut TrackSession) {
        self.drag.cancel();
        session.clear_mark();
    }
}
