use std::sync::{Arc, RwLock};

use gpui::prelude::*;
use gpui::{
    Bounds, MouseButton, MouseDownEvent, MouseMoveEvent, MouseUpEvent, Pixels, Point,
    ScrollWheelEvent, Window, canvas, div, px,
};

use crate::chart::TrackChart;
use crate::config::REFERENCE_DPI;
use crate::geom::{ScreenPoint, ScreenRect};
use crate::ortho::OrthoView;
use crate::render::{Color, RenderCommand, RenderList, TextStyle};
use crate::session::TrackSession;

use super::paint::{paint_render_list, to_hsla};

const SUMMARY_TEXT_SIZE: f32 = 11.0;
const PLOT_MARGIN: f32 = 8.0;
const LABEL_MARGIN: f32 = 40.0;

/// Shared handle to a [`TrackSession`].
///
/// Every view built from clones of one handle reads and writes the same
/// session. The handle clones cheaply and can be moved into async tasks.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    session: Arc<RwLock<TrackSession>>,
}

impl SessionHandle {
    /// Wrap a session.
    pub fn new(session: TrackSession) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
        }
    }

    /// Read the session.
    ///
    /// The session is locked for the duration of the callback.
    pub fn read<R>(&self, f: impl FnOnce(&TrackSession) -> R) -> R {
        let session = self.session.read().expect("session lock");
        f(&session)
    }

    /// Mutate the session.
    ///
    /// The session is locked for the duration of the callback.
    pub fn write<R>(&self, f: impl FnOnce(&mut TrackSession) -> R) -> R {
        let mut session = self.session.write().expect("session lock");
        f(&mut session)
    }
}

/// A GPUI view rendering the multi-series chart of a session.
///
/// Sibling views sharing the session are not notified automatically; the
/// embedding application drains `TrackSession::take_events` and calls
/// `notify` on the views it wants refreshed.
#[derive(Clone)]
pub struct GpuiTrackChart {
    session: SessionHandle,
    chart: Arc<RwLock<TrackChart>>,
}

impl GpuiTrackChart {
    /// Create a chart view over a shared session.
    pub fn new(session: SessionHandle) -> Self {
        Self {
            session,
            chart: Arc::new(RwLock::new(TrackChart::new())),
        }
    }

    /// Handle of the session this view draws.
    pub fn session(&self) -> SessionHandle {
        self.session.clone()
    }

    fn with_chart(&self, f: impl FnOnce(&mut TrackChart, &mut TrackSession)) {
        let mut chart = self.chart.write().expect("chart lock");
        self.session.write(|session| f(&mut chart, session));
    }

    fn on_mouse_down(&mut self, ev: &MouseDownEvent, cx: &mut Context<Self>) {
        let pos = screen_point(ev.position);
        self.with_chart(|chart, session| chart.on_press(session, pos));
        cx.notify();
    }

    fn on_mouse_move(&mut self, ev: &MouseMoveEvent, cx: &mut Context<Self>) {
        let pos = screen_point(ev.position);
        self.with_chart(|chart, session| chart.on_move(session, pos));
        cx.notify();
    }

    fn on_mouse_up(&mut self, ev: &MouseUpEvent, cx: &mut Context<Self>) {
        let pos = screen_point(ev.position);
        self.with_chart(|chart, session| chart.on_release(session, pos));
        cx.notify();
    }

    fn on_scroll(&mut self, ev: &ScrollWheelEvent, cx: &mut Context<Self>) {
        let pos = screen_point(ev.position);
        let delta = f64::from(f32::from(ev.delta.pixel_delta(px(16.0)).y));
        if delta.abs() < 0.01 {
            return;
        }
        self.with_chart(|chart, session| chart.on_wheel(session, pos, delta));
        cx.notify();
    }

    fn on_hover(&mut self, hovered: bool, cx: &mut Context<Self>) {
        if !hovered {
            self.with_chart(|chart, session| chart.on_leave(session));
            cx.notify();
        }
    }
}

impl Render for GpuiTrackChart {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let session = self.session.clone();
        let chart = Arc::clone(&self.chart);

        div()
            .id("track-chart")
            .size_full()
            .bg(to_hsla(Color::WHITE))
            .child(
                canvas(
                    move |bounds, _, _| {
                        let mut chart = chart.write().expect("chart lock");
                        let outer = screen_rect(bounds);
                        let rect = ScreenRect::new(
                            ScreenPoint::new(
                                outer.min.x + PLOT_MARGIN,
                                outer.min.y + PLOT_MARGIN,
                            ),
                            ScreenPoint::new(
                                outer.max.x - PLOT_MARGIN,
                                outer.max.y - LABEL_MARGIN,
                            ),
                        );
                        session.read(|session| {
                            let mut render = chart.update_plot(session, rect);
                            push_summary(&mut render, &chart, rect);
                            render
                        })
                    },
                    move |_, render, window, cx| {
                        paint_render_list(&render, window, cx);
                    },
                )
                .size_full(),
            )
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|this, ev, _, cx| {
                    this.on_mouse_down(ev, cx);
                }),
            )
            .on_mouse_move(cx.listener(|this, ev, _, cx| {
                this.on_mouse_move(ev, cx);
            }))
            .on_mouse_up(
                MouseButton::Left,
                cx.listener(|this, ev, _, cx| {
                    this.on_mouse_up(ev, cx);
                }),
            )
            .on_scroll_wheel(cx.listener(|this, ev, _, cx| {
                this.on_scroll(ev, cx);
            }))
            .on_hover(cx.listener(|this, hovered: &bool, _, cx| {
                this.on_hover(*hovered, cx);
            }))
    }
}

/// A GPUI view rendering the 3D orthographic track of a session.
///
/// The track is fitted using the window's scale factor. Displays whose
/// physical density differs from the nominal one can set it with
/// [`with_display_dpi`](Self::with_display_dpi).
#[derive(Clone)]
pub struct GpuiOrthoView {
    session: SessionHandle,
    view: Arc<RwLock<OrthoView>>,
    display_dpi: Option<f64>,
}

impl GpuiOrthoView {
    /// Create a 3D view over a shared session.
    pub fn new(session: SessionHandle) -> Self {
        Self::with_view(session, OrthoView::new())
    }

    /// Create a 3D view with a preconfigured [`OrthoView`].
    pub fn with_view(session: SessionHandle, view: OrthoView) -> Self {
        Self {
            session,
            view: Arc::new(RwLock::new(view)),
            display_dpi: None,
        }
    }

    /// Physical pixels per inch of the display the view is shown on.
    pub fn with_display_dpi(mut self, dpi: f64) -> Self {
        self.display_dpi = Some(dpi);
        self
    }

    /// Handle of the session this view draws.
    pub fn session(&self) -> SessionHandle {
        self.session.clone()
    }

    fn with_view_state(&self, f: impl FnOnce(&mut OrthoView, &mut TrackSession)) {
        let mut view = self.view.write().expect("ortho view lock");
        self.session.write(|session| f(&mut view, session));
    }

    fn on_mouse_down(&mut self, ev: &MouseDownEvent, cx: &mut Context<Self>) {
        let pos = screen_point(ev.position);
        self.view.write().expect("ortho view lock").on_press(pos);
        cx.notify();
    }

    fn on_mouse_move(&mut self, ev: &MouseMoveEvent, cx: &mut Context<Self>) {
        let pos = screen_point(ev.position);
        self.with_view_state(|view, session| view.on_move(session, pos));
        cx.notify();
    }

    fn on_mouse_up(&mut self, ev: &MouseUpEvent, cx: &mut Context<Self>) {
        let pos = screen_point(ev.position);
        self.view.write().expect("ortho view lock").on_release(pos);
        cx.notify();
    }

    fn on_hover(&mut self, hovered: bool, cx: &mut Context<Self>) {
        if !hovered {
            self.with_view_state(|view, session| view.on_leave(session));
            cx.notify();
        }
    }
}

impl Render for GpuiOrthoView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let session = self.session.clone();
        let view = Arc::clone(&self.view);
        let display_dpi = self.display_dpi;

        div()
            .id("track-ortho")
            .size_full()
            .bg(to_hsla(Color::WHITE))
            .child(
                canvas(
                    move |bounds, window, _| {
                        let mut view = view.write().expect("ortho view lock");
                        let scale = f64::from(window.scale_factor());
                        view.set_display(display_dpi.unwrap_or(REFERENCE_DPI * scale), scale);
                        session.read(|session| view.update_view(session, screen_rect(bounds)))
                    },
                    move |_, render, window, cx| {
                        paint_render_list(&render, window, cx);
                    },
                )
                .size_full(),
            )
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|this, ev, _, cx| {
                    this.on_mouse_down(ev, cx);
                }),
            )
            .on_mouse_move(cx.listener(|this, ev, _, cx| {
                this.on_mouse_move(ev, cx);
            }))
            .on_mouse_up(
                MouseButton::Left,
                cx.listener(|this, ev, _, cx| {
                    this.on_mouse_up(ev, cx);
                }),
            )
            .on_hover(cx.listener(|this, hovered: &bool, _, cx| {
                this.on_hover(*hovered, cx);
            }))
    }
}

fn push_summary(render: &mut RenderList, chart: &TrackChart, rect: ScreenRect) {
    let Some(summary) = chart.summary() else {
        return;
    };
    let mut y = rect.min.y + 4.0;
    for line in summary.to_string().lines() {
        let color = summary
            .rows
            .iter()
            .find(|row| line.starts_with(row.title.as_str()))
            .map_or(Color::BLACK, |row| row.color);
        render.push(RenderCommand::Text {
            position: ScreenPoint::new(rect.min.x + rect.width() * 0.6, y),
            text: line.replace('\t', "  "),
            style: TextStyle {
                color,
                size: SUMMARY_TEXT_SIZE,
                ..TextStyle::default()
            },
        });
        y += SUMMARY_TEXT_SIZE + 3.0;
    }
}

fn screen_point(point: Point<Pixels>) -> ScreenPoint {
    ScreenPoint::new(f32::from(point.x), f32::from(point.y))
}

fn screen_rect(bounds: Bounds<Pixels>) -> ScreenRect {
    ScreenRect::from_origin_size(
        f32::from(bounds.origin.x),
        f32::from(bounds.origin.y),
        f32::from(bounds.size.width),
        f32::from(bounds.size.height),
    )
}
