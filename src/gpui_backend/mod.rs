//! GPUI integration for gpui_trackview.
//!
//! [`GpuiTrackChart`] and [`GpuiOrthoView`] draw the render lists produced by
//! [`TrackChart`](crate::chart::TrackChart) and
//! [`OrthoView`](crate::ortho::OrthoView) and forward pointer events to them.
//! Both views share one [`SessionHandle`].

mod paint;
mod view;

pub use view::{GpuiOrthoView, GpuiTrackChart, SessionHandle};
