use std::time::Duration;

use gpui::prelude::*;
use gpui::{
    AppContext, Application, AsyncWindowContext, Bounds, Timer, WindowBounds, WindowOptions, div,
    px, size,
};

use gpui_trackview::{
    GpuiOrthoView, GpuiTrackChart, Sample, SessionEvent, SessionHandle, TrackSession, TrackStore,
};

struct TrackDemo {
    chart: gpui::Entity<GpuiTrackChart>,
    ortho: gpui::Entity<GpuiOrthoView>,
}

impl gpui::Render for TrackDemo {
    fn render(
        &mut self,
        _window: &mut gpui::Window,
        _cx: &mut gpui::Context<Self>,
    ) -> impl gpui::IntoElement {
        div()
            .size_full()
            .flex()
            .flex_row()
            .child(div().flex_1().child(self.chart.clone()))
            .child(div().flex_1().child(self.ortho.clone()))
    }
}

fn jump_track() -> TrackStore {
    let samples = (0..=900)
        .scan((0.0_f64, 0.0_f64, 0.0_f64), |(dist_2d, dist_3d, last_z), i| {
            let t = f64::from(i) * 0.2;
            let speed = 45.0 * (1.0 - (-t / 12.0).exp());
            let heading = t * 0.01;
            let mut sample = Sample::at(
                t,
                800.0 * heading.sin() + t * 8.0,
                800.0 * (1.0 - heading.cos()),
                4000.0 - t * speed.min(20.0),
            );
            sample.vel_e = 8.0;
            sample.vel_n = 8.0 * heading.sin();
            sample.vel_d = speed.min(20.0);
            sample.vx = sample.vel_e;
            sample.vy = sample.vel_n;
            if i > 0 {
                *dist_2d += 0.2 * sample.vel_e.hypot(sample.vel_n);
                *dist_3d += (0.2 * sample.vel_e.hypot(sample.vel_n)).hypot(*last_z - sample.z);
            }
            sample.dist_2d = *dist_2d;
            sample.dist_3d = *dist_3d;
            *last_z = sample.z;
            Some(sample)
        })
        .collect();
    TrackStore::from_samples(samples).unwrap_or_default()
}

fn build_views(
    cx: &mut gpui::App,
) -> (
    SessionHandle,
    gpui::Entity<GpuiTrackChart>,
    gpui::Entity<GpuiOrthoView>,
) {
    let session = SessionHandle::new(TrackSession::new(jump_track()));
    let chart = cx.new(|_| GpuiTrackChart::new(session.clone()));
    let ortho = cx.new(|_| GpuiOrthoView::new(session.clone()));
    (session, chart, ortho)
}

// Both views share one session. Each view only repaints itself, so the app
// drains the session's updates and notifies both.
fn spawn_event_pump(
    window: &mut gpui::Window,
    cx: &mut gpui::App,
    session: SessionHandle,
    chart: gpui::Entity<GpuiTrackChart>,
    ortho: gpui::Entity<GpuiOrthoView>,
) {
    window
        .spawn(cx, move |cx: &mut AsyncWindowContext| {
            let mut cx = cx.clone();
            async move {
                loop {
                    Timer::after(Duration::from_millis(16)).await;
                    let updates = session.write(|session| session.take_events());
                    if updates.is_empty() {
                        continue;
                    }
                    for update in &updates {
                        match update.event {
                            SessionEvent::ZeroRequested { time } => {
                                println!("zero reference requested at t={time:.1}s");
                            }
                            SessionEvent::GroundRequested { time } => {
                                println!("ground reference requested at t={time:.1}s");
                            }
                            _ => {}
                        }
                    }
                    let _ = cx.update(|_, cx| {
                        chart.update(cx, |_view, view_cx| view_cx.notify());
                        ortho.update(cx, |_view, view_cx| view_cx.notify());
                    });
                }
            }
        })
        .detach();
}

fn main() {
    Application::new().run(|cx| {
        let options = WindowOptions {
            window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                None,
                size(px(1280.0), px(640.0)),
                cx,
            ))),
            ..Default::default()
        };

        cx.open_window(options, |window, cx| {
            let (session, chart, ortho) = build_views(cx);
            spawn_event_pump(window, cx, session, chart.clone(), ortho.clone());
            cx.new(|_| TrackDemo { chart, ortho })
        })
        .unwrap();
    });
}
