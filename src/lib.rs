//! gpui_trackview visualizes recorded GPS flight tracks.
//!
//! The crate keeps one track and a shared [`TrackSession`] (time window, mark,
//! active tool, display settings) and derives two synchronized views from it:
//! a multi-series [`TrackChart`] and an orthographic 3D [`OrthoView`]. Both
//! describe a frame as a [`RenderList`]; the optional `gpui` feature paints
//! those lists and routes pointer events into the views.

#![forbid(unsafe_code)]

pub mod axis;
pub mod chart;
pub mod config;
pub mod error;
pub mod geodesy;
pub mod geom;
pub mod index;
pub mod interaction;
pub mod ortho;
pub mod quantity;
pub mod render;
pub mod sample;
pub mod session;
pub mod summary;
pub mod track;
pub mod transform;
pub mod view;

#[cfg(feature = "gpui")]
pub mod gpui_backend;

pub use axis::{AxisSet, AxisTick, ValueAxis};
pub use chart::TrackChart;
pub use config::{ChartConfig, OrthoConfig, ViewConfig};
pub use error::TrackError;
pub use geodesy::{Geodesy, PlanarGeodesy, SphericalGeodesy};
pub use geom::{Point, ScreenPoint, ScreenRect, Vec3};
pub use index::IndexEngine;
pub use interaction::{DragState, Tool};
pub use ortho::{Camera, OrthoView};
pub use quantity::{Quantity, QuantitySet, UnitSystem, XAxisKind};
pub use render::{
    Color, LineDash, LineSegment, LineStyle, MarkerShape, MarkerStyle, RectStyle, RenderCommand,
    RenderList, TextStyle,
};
pub use sample::Sample;
pub use session::{Mark, ReferenceBand, SessionEvent, SessionUpdate, TrackSession};
pub use summary::{MarkSummary, SummaryRow};
pub use track::TrackStore;
pub use transform::Transform;
pub use view::{Range, Viewport};

#[cfg(feature = "gpui")]
pub use gpui_backend::{GpuiOrthoView, GpuiTrackChart, SessionHandle};
