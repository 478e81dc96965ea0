//! Shared view state owned by the embedding application.
//!
//! A [`TrackSession`] holds the track, the canonical time window, the mark,
//! the active tool and the display settings. The chart and the 3D view read
//! it during a refresh and write to it from their pointer handlers. Every
//! change is queued as a sequenced [`SessionUpdate`] that the application
//! drains with [`TrackSession::take_events`]. Only the latest update of each
//! kind stays queued, so an undrained session holds at most one per kind.

use crate::config::{ChartConfig, OrthoConfig, ViewConfig};
use crate::error::TrackError;
use crate::interaction::Tool;
use crate::ortho::Camera;
use crate::quantity::{QuantitySet, UnitSystem, XAxisKind};
use crate::sample::Sample;
use crate::track::TrackStore;
use crate::view::Range;

/// A user-selected point or range in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mark {
    /// Single time.
    Point(f64),
    /// Time range in drag order.
    Range {
        /// Time where the range started.
        start: f64,
        /// Time where the range ended.
        end: f64,
    },
}

impl Mark {
    /// Start time (equal to the end for a point mark).
    pub fn start(&self) -> f64 {
        match *self {
            Self::Point(t) => t,
            Self::Range { start, .. } => start,
        }
    }

    /// End time, where the overlay markers are drawn.
    pub fn end(&self) -> f64 {
        match *self {
            Self::Point(t) => t,
            Self::Range { end, .. } => end,
        }
    }
}

/// Top and bottom of the scoring window, drawn as a band on the elevation axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceBand {
    /// Sample where the window starts (upper elevation).
    pub top: Sample,
    /// Sample where the window ends (lower elevation).
    pub bottom: Sample,
}

/// Notification kinds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    /// The time window changed.
    RangeChanged,
    /// The mark was set, moved or cleared.
    MarkChanged,
    /// Track, units, visibility or axis kind changed.
    DataChanged,
    /// The 3D camera moved.
    RotationChanged,
    /// The zero reference should be moved to `time`.
    ZeroRequested {
        /// Time of the new zero.
        time: f64,
    },
    /// The ground reference should be moved to the elevation at `time`.
    GroundRequested {
        /// Time of the new ground level.
        time: f64,
    },
    /// The active tool changed.
    ToolChanged(Tool),
}

/// A notification with its sequence number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionUpdate {
    /// Monotonic sequence number, starting at 1.
    pub seq: u64,
    /// What happened.
    pub event: SessionEvent,
}

/// Coordinating state shared by the chart and the 3D view.
#[derive(Debug)]
pub struct TrackSession {
    store: TrackStore,
    quantities: QuantitySet,
    x_kind: XAxisKind,
    units: UnitSystem,
    window: Range,
    mark: Option<Mark>,
    tool: Tool,
    prev_tool: Tool,
    band: Option<ReferenceBand>,
    camera: Camera,
    chart: ChartConfig,
    ortho: OrthoConfig,
    undo: Vec<Range>,
    redo: Vec<Range>,
    pending_edit: Option<Range>,
    events: Vec<SessionUpdate>,
    seq: u64,
}

impl Default for TrackSession {
    fn default() -> Self {
        Self::new(TrackStore::new())
    }
}

impl TrackSession {
    /// Create a session showing the full extent of `store`.
    pub fn new(store: TrackStore) -> Self {
        let window = store.time_range().unwrap_or(Range::point(0.0));
        Self {
            store,
            quantities: QuantitySet::standard(),
            x_kind: XAxisKind::default(),
            units: UnitSystem::default(),
            window,
            mark: None,
            tool: Tool::default(),
            prev_tool: Tool::default(),
            band: None,
            camera: Camera::default(),
            chart: ChartConfig::default(),
            ortho: OrthoConfig::default(),
            undo: Vec::new(),
            redo: Vec::new(),
            pending_edit: None,
            events: Vec::new(),
            seq: 0,
        }
    }

    /// Drain queued notifications in sequence order.
    pub fn take_events(&mut self) -> Vec<SessionUpdate> {
        std::mem::take(&mut self.events)
    }

    /// Sequence number of the latest notification.
    pub fn revision(&self) -> u64 {
        self.seq
    }

    fn notify(&mut self, event: SessionEvent) {
        self.seq = self.seq.wrapping_add(1);
        let kind = std::mem::discriminant(&event);
        self.events.retain(|update| std::mem::discriminant(&update.event) != kind);
        self.events.push(SessionUpdate {
            seq: self.seq,
            event,
        });
    }

    // Track

    /// The track.
    pub fn store(&self) -> &TrackStore {
        &self.store
    }

    /// Replace the track and show its full extent.
    ///
    /// Zoom history and the mark are discarded.
    pub fn replace_track(&mut self, store: TrackStore) {
        tracing::debug!(samples = store.len(), "replacing track");
        self.window = store.time_range().unwrap_or(Range::point(0.0));
        self.store = store;
        self.mark = None;
        self.undo.clear();
        self.redo.clear();
        self.pending_edit = None;
        self.notify(SessionEvent::DataChanged);
    }

    /// Replace the track after its times were rebased by `time_shift` seconds
    /// (new time = old time - `time_shift`), keeping the window, the mark and
    /// the zoom history aligned with the new times.
    pub fn rebase_track(&mut self, store: TrackStore, time_shift: f64) {
        tracing::debug!(samples = store.len(), time_shift, "rebasing track");
        self.store = store;
        self.window = self.window.shifted(-time_shift);
        for range in self.undo.iter_mut().chain(self.redo.iter_mut()) {
            *range = range.shifted(-time_shift);
        }
        if let Some(pending) = self.pending_edit.as_mut() {
            *pending = pending.shifted(-time_shift);
        }
        self.mark = self.mark.map(|mark| match mark {
            Mark::Point(t) => Mark::Point(t - time_shift),
            Mark::Range { start, end } => Mark::Range {
                start: start - time_shift,
                end: end - time_shift,
            },
        });
        self.notify(SessionEvent::DataChanged);
    }

    /// Replace the optimal track.
    pub fn set_optimal(&mut self, optimal: Vec<Sample>) -> Result<(), TrackError> {
        self.store.set_optimal(optimal)?;
        self.notify(SessionEvent::DataChanged);
        Ok(())
    }

    /// Replace the waypoint list.
    pub fn set_waypoints(&mut self, waypoints: Vec<Sample>) {
        self.store.set_waypoints(waypoints);
        self.notify(SessionEvent::DataChanged);
    }

    /// Scoring window band, if one is valid.
    pub fn reference_band(&self) -> Option<&ReferenceBand> {
        self.band.as_ref()
    }

    /// Set or clear the scoring window band.
    pub fn set_reference_band(&mut self, band: Option<ReferenceBand>) {
        self.band = band;
        self.notify(SessionEvent::DataChanged);
    }

    // Display settings

    /// Vertical quantities and their visibility.
    pub fn quantities(&self) -> &QuantitySet {
        &self.quantities
    }

    /// Show or hide a quantity.
    pub fn set_quantity_visible(&mut self, key: &str, visible: bool) -> Result<(), TrackError> {
        self.quantities.set_visible(key, visible)?;
        self.notify(SessionEvent::DataChanged);
        Ok(())
    }

    /// Flip the visibility of a quantity, returning the new state.
    pub fn toggle_quantity(&mut self, key: &str) -> Result<bool, TrackError> {
        let visible = self.quantities.toggle(key)?;
        self.notify(SessionEvent::DataChanged);
        Ok(visible)
    }

    /// Quantity on the chart's horizontal axis.
    pub fn x_axis_kind(&self) -> XAxisKind {
        self.x_kind
    }

    /// Change the horizontal axis quantity. The time window is kept.
    pub fn set_x_axis_kind(&mut self, kind: XAxisKind) {
        if self.x_kind != kind {
            tracing::debug!(?kind, "horizontal axis changed");
            self.x_kind = kind;
            self.notify(SessionEvent::DataChanged);
        }
    }

    /// Active unit system.
    pub fn units(&self) -> UnitSystem {
        self.units
    }

    /// Set the unit system.
    pub fn set_units(&mut self, units: UnitSystem) {
        if self.units != units {
            tracing::debug!(?units, "unit system changed");
            self.units = units;
            self.notify(SessionEvent::DataChanged);
        }
    }

    /// Switch between metric and imperial units.
    pub fn toggle_units(&mut self) {
        self.set_units(self.units.toggled());
    }

    /// Chart interaction settings.
    pub fn chart_config(&self) -> &ChartConfig {
        &self.chart
    }

    /// 3D view interaction settings.
    pub fn ortho_config(&self) -> &OrthoConfig {
        &self.ortho
    }

    /// 3D camera.
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Move the 3D camera.
    pub fn set_camera(&mut self, camera: Camera) {
        if self.camera != camera {
            self.camera = camera;
            self.notify(SessionEvent::RotationChanged);
        }
    }

    // Window

    /// Canonical time window.
    pub fn window(&self) -> Range {
        self.window
    }

    /// Set the time window and record the previous one for undo.
    pub fn set_window(&mut self, lower: f64, upper: f64) {
        let previous = self.pending_edit.take().unwrap_or(self.window);
        if !self.assign_window(lower, upper) && previous == self.window {
            return;
        }
        self.push_history(previous);
    }

    /// Set the time window without recording history.
    ///
    /// The window before the first preview is recorded by
    /// [`commit_window`](Self::commit_window).
    pub fn preview_window(&mut self, lower: f64, upper: f64) {
        let before = self.window;
        if self.assign_window(lower, upper) && self.pending_edit.is_none() {
            self.pending_edit = Some(before);
        }
    }

    /// Finish a sequence of previews.
    pub fn commit_window(&mut self) {
        if let Some(previous) = self.pending_edit.take()
            && previous != self.window
        {
            self.push_history(previous);
        }
    }

    /// Show the whole track.
    pub fn zoom_to_extent(&mut self) {
        if let Some(extent) = self.store.time_range() {
            self.set_window(extent.min, extent.max);
        }
    }

    /// Restore the previous window. Returns false if there is none.
    pub fn undo_zoom(&mut self) -> bool {
        self.commit_window();
        let Some(previous) = self.undo.pop() else {
            return false;
        };
        self.redo.push(self.window);
        self.window = previous;
        self.notify(SessionEvent::RangeChanged);
        true
    }

    /// Re-apply an undone window. Returns false if there is none.
    pub fn redo_zoom(&mut self) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        self.undo.push(self.window);
        self.window = next;
        self.notify(SessionEvent::RangeChanged);
        true
    }

    /// Check whether [`undo_zoom`](Self::undo_zoom) would do something.
    pub fn can_undo_zoom(&self) -> bool {
        !self.undo.is_empty() || self.pending_edit.is_some()
    }

    /// Check whether [`redo_zoom`](Self::redo_zoom) would do something.
    pub fn can_redo_zoom(&self) -> bool {
        !self.redo.is_empty()
    }

    fn assign_window(&mut self, lower: f64, upper: f64) -> bool {
        if !lower.is_finite() || !upper.is_finite() {
            tracing::warn!(lower, upper, "ignoring non-finite window");
            return false;
        }
        let window = Range::new(lower, upper);
        if window == self.window {
            return false;
        }
        tracing::debug!(lower = window.min, upper = window.max, "window changed");
        self.window = window;
        self.notify(SessionEvent::RangeChanged);
        true
    }

    fn push_history(&mut self, previous: Range) {
        self.undo.push(previous);
        self.redo.clear();
    }

    // Mark

    /// Active mark.
    pub fn mark(&self) -> Option<Mark> {
        self.mark
    }

    /// Mark a single time. Times outside the track clear the mark.
    pub fn set_mark_point(&mut self, time: f64) {
        self.update_mark(Mark::Point(time));
    }

    /// Mark a time range. Times outside the track clear the mark.
    pub fn set_mark_range(&mut self, start: f64, end: f64) {
        self.update_mark(Mark::Range { start, end });
    }

    /// Clear the mark.
    pub fn clear_mark(&mut self) {
        if self.mark.take().is_some() {
            tracing::trace!("mark cleared");
            self.notify(SessionEvent::MarkChanged);
        }
    }

    fn update_mark(&mut self, mark: Mark) {
        let Some(extent) = self.store.time_range() else {
            return;
        };
        let valid = extent.contains(mark.start()) && extent.contains(mark.end());
        let next = valid.then_some(mark);
        if next == self.mark {
            return;
        }
        tracing::trace!(?mark, valid, "mark updated");
        self.mark = next;
        self.notify(SessionEvent::MarkChanged);
    }

    // Tools

    /// Active pointer tool.
    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Select a pointer tool.
    pub fn set_tool(&mut self, tool: Tool) {
        if !tool.is_one_shot() {
            self.prev_tool = tool;
        }
        if self.tool != tool {
            tracing::debug!(?tool, "tool changed");
            self.tool = tool;
            self.notify(SessionEvent::ToolChanged(tool));
        }
    }

    /// Ask the application to move the zero reference to `time`, then
    /// return to the previous tool. No-op on an empty track.
    pub fn request_zero(&mut self, time: f64) {
        if self.store.is_empty() {
            return;
        }
        tracing::debug!(time, "zero reference requested");
        self.notify(SessionEvent::ZeroRequested { time });
        self.set_tool(self.prev_tool);
    }

    /// Ask the application to move the ground reference to the elevation at
    /// `time`, then return to the previous tool. No-op on an empty track.
    pub fn request_ground(&mut self, time: f64) {
        if self.store.is_empty() {
            return;
        }
        tracing::debug!(time, "ground reference requested");
        self.notify(SessionEvent::GroundRequested { time });
        self.set_tool(self.prev_tool);
    }

    // Configuration

    /// Apply a stored configuration.
    pub fn apply_config(&mut self, config: &ViewConfig) {
        self.units = config.units;
        self.x_kind = config.x_axis;
        self.quantities.apply_visibility(&config.visibility);
        self.set_tool(config.tool);
        self.camera = config.camera.clamped();
        self.chart = config.chart;
        self.ortho = config.ortho;
        tracing::debug!("applied view configuration");
        self.notify(SessionEvent::DataChanged);
    }

    /// Capture the current configuration.
    pub fn snapshot_config(&self) -> ViewConfig {
        ViewConfig {
            units: self.units,
            x_axis: self.x_kind,
            visibility: self.quantities.visibility_map(),
            tool: if self.tool.is_one_shot() {
                self.prev_tool
            } else {
                self.tool
            },
            camera: self.camera,
            chart: self.chart,
            ortho: self.ortho,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> TrackSession {
        let samples = (0..=10)
            .map(|i| Sample::at(f64::from(i), 0.0, 0.0, 100.0 - f64::from(i)))
            .collect();
        TrackSession::new(TrackStore::from_samples(samples).unwrap())
    }

    fn kinds(session: &mut TrackSession) -> Vec<SessionEvent> {
        session.take_events().into_iter().map(|u| u.event).collect()
    }

    #[test]
    fn starts_at_full_extent() {
        let session = session();
        assert_eq!(session.window(), Range::new(0.0, 10.0));
        assert_eq!(TrackSession::default().window(), Range::point(0.0));
    }

    #[test]
    fn window_is_normalized_and_undoable() {
        let mut session = session();
        session.set_window(8.0, 2.0);
        assert_eq!(session.window(), Range::new(2.0, 8.0));
        session.set_window(3.0, 4.0);
        assert!(session.can_undo_zoom());
        assert!(session.undo_zoom());
        assert_eq!(session.window(), Range::new(2.0, 8.0));
        assert!(session.undo_zoom());
        assert_eq!(session.window(), Range::new(0.0, 10.0));
        assert!(!session.can_undo_zoom());
        assert!(!session.undo_zoom());
        assert!(session.redo_zoom());
        assert_eq!(session.window(), Range::new(2.0, 8.0));
        session.set_window(5.0, 6.0);
        assert!(!session.can_redo_zoom());
    }

    #[test]
    fn previews_collapse_into_one_history_entry() {
        let mut session = session();
        session.preview_window(1.0, 11.0);
        session.preview_window(2.0, 12.0);
        assert!(session.can_undo_zoom());
        session.commit_window();
        assert!(session.undo_zoom());
        assert_eq!(session.window(), Range::new(0.0, 10.0));
        assert!(!session.undo_zoom());
    }

    #[test]
    fn mark_outside_track_is_cleared() {
        let mut session = session();
        session.set_mark_point(5.0);
        assert_eq!(session.mark(), Some(Mark::Point(5.0)));
        session.set_mark_range(2.0, 12.0);
        assert_eq!(session.mark(), None);
        session.set_mark_range(7.0, 3.0);
        assert_eq!(session.mark().map(|m| m.end()), Some(3.0));
        session.clear_mark();
        assert_eq!(session.mark(), None);
    }

    #[test]
    fn mark_on_empty_track_is_noop() {
        let mut session = TrackSession::default();
        session.set_mark_point(0.0);
        assert!(session.take_events().is_empty());
        session.request_zero(0.0);
        assert!(session.take_events().is_empty());
    }

    #[test]
    fn zero_hands_off_and_reverts_tool() {
        let mut session = session();
        session.set_tool(Tool::Measure);
        session.set_tool(Tool::Zero);
        session.take_events();
        session.request_zero(4.5);
        assert_eq!(
            kinds(&mut session),
            vec![
                SessionEvent::ZeroRequested { time: 4.5 },
                SessionEvent::ToolChanged(Tool::Measure),
            ]
        );
        assert_eq!(session.tool(), Tool::Measure);
        assert_eq!(session.store().sample(0).unwrap().t, 0.0);
    }

    #[test]
    fn rebase_shifts_view_state() {
        let mut session = session();
        session.set_window(2.0, 6.0);
        session.set_mark_point(4.0);
        let shifted = session
            .store()
            .samples()
            .iter()
            .map(|s| Sample { t: s.t - 2.0, ..*s })
            .collect();
        session.rebase_track(TrackStore::from_samples(shifted).unwrap(), 2.0);
        assert_eq!(session.window(), Range::new(0.0, 4.0));
        assert_eq!(session.mark(), Some(Mark::Point(2.0)));
        assert!(session.undo_zoom());
        assert_eq!(session.window(), Range::new(-2.0, 8.0));
    }

    #[test]
    fn events_are_sequenced() {
        let mut session = session();
        session.toggle_units();
        session.set_window(1.0, 2.0);
        let updates = session.take_events();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].event, SessionEvent::DataChanged);
        assert_eq!(updates[1].event, SessionEvent::RangeChanged);
        assert!(updates[0].seq < updates[1].seq);
        assert_eq!(session.revision(), updates[1].seq);
        assert_eq!(session.units(), UnitSystem::Imperial);
    }

    #[test]
    fn config_round_trips_through_session() {
        let mut session = session();
        session.set_x_axis_kind(XAxisKind::Distance3D);
        session.set_quantity_visible("elevation", false).unwrap();
        session.set_tool(Tool::Zoom);
        session.set_tool(Tool::Ground);
        let config = session.snapshot_config();
        assert_eq!(config.tool, Tool::Zoom);
        assert_eq!(config.visibility.get("elevation"), Some(&false));

        let mut other = TrackSession::default();
        other.apply_config(&config);
        assert_eq!(other.x_axis_kind(), XAxisKind::Distance3D);
        assert_eq!(other.tool(), Tool::Zoom);
        assert!(!other.quantities().find("elevation").unwrap().is_visible());
        assert!(session.set_quantity_visible("nope", true).is_err());
    }

    #[test]
    fn pending_events_keep_latest_per_kind() {
        let mut session = session();
        for i in 1..=1000 {
            session.preview_window(f64::from(i) / 1000.0, 10.0);
            session.set_mark_point(f64::from(i % 10));
        }
        let updates = session.take_events();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[1].seq, session.revision());
        assert!(updates[0].seq < updates[1].seq);
        assert_eq!(session.window(), Range::new(1.0, 10.0));
    }

    #[test]
    fn unchanged_mark_is_silent() {
        let mut session = session();
        session.clear_mark();
        assert!(session.take_events().is_empty());

        session.set_mark_point(3.0);
        assert_eq!(kinds(&mut session), vec![SessionEvent::MarkChanged]);
        session.set_mark_point(3.0);
        assert!(session.take_events().is_empty());

        session.set_mark_point(30.0);
        assert_eq!(kinds(&mut session), vec![SessionEvent::MarkChanged]);
        session.set_mark_range(-1.0, 2.0);
        session.clear_mark();
        assert!(session.take_events().is_empty());
    }

    #[test]
    fn zoom_to_extent_shows_whole_track() {
        let mut session = session();
        session.set_window(2.0, 3.0);
        session.take_events();
        session.zoom_to_extent();
        assert_eq!(session.window(), Range::new(0.0, 10.0));
        assert_eq!(kinds(&mut session), vec![SessionEvent::RangeChanged]);
        assert!(session.undo_zoom());
        assert_eq!(session.window(), Range::new(2.0, 3.0));

        session.zoom_to_extent();
        session.zoom_to_extent();
        assert!(session.undo_zoom());
        assert_eq!(session.window(), Range::new(2.0, 3.0));
    }

    #[test]
    fn replace_track_resets_view_state() {
        let mut session = session();
        session.set_window(2.0, 6.0);
        session.set_mark_point(4.0);
        session.take_events();

        let samples = (0..=4)
            .map(|i| Sample::at(100.0 + f64::from(i), 0.0, 0.0, 50.0))
            .collect();
        session.replace_track(TrackStore::from_samples(samples).unwrap());
        assert_eq!(session.window(), Range::new(100.0, 104.0));
        assert_eq!(session.mark(), None);
        assert!(!session.can_undo_zoom());
        assert!(!session.can_redo_zoom());
        assert_eq!(kinds(&mut session), vec![SessionEvent::DataChanged]);

        session.replace_track(TrackStore::new());
        assert_eq!(session.window(), Range::point(0.0));
    }
}
