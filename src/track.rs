//! Track storage.
//!
//! A [`TrackStore`] holds the time-ascending sample sequence, the optional
//! optimal track and the waypoint list. It is replaced wholesale by the
//! import side and only read by the chart and the 3D view.

use crate::error::TrackError;
use crate::index::IndexEngine;
use crate::quantity::{self, UnitSystem};
use crate::sample::Sample;
use crate::view::Range;

/// Time-ordered sample buffer plus its companion sequences.
#[derive(Debug, Clone, Default)]
pub struct TrackStore {
    samples: Vec<Sample>,
    optimal: Vec<Sample>,
    waypoints: Vec<Sample>,
}

impl TrackStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from samples, checking that times never decrease.
    ///
    /// Equal timestamps are accepted.
    pub fn from_samples(samples: Vec<Sample>) -> Result<Self, TrackError> {
        check_ascending(&samples)?;
        Ok(Self::from_sorted_unchecked(samples))
    }

    /// Create a store from samples already known to be time-ascending.
    pub fn from_sorted_unchecked(samples: Vec<Sample>) -> Self {
        Self {
            samples,
            optimal: Vec::new(),
            waypoints: Vec::new(),
        }
    }

    /// Replace the optimal track.
    pub fn set_optimal(&mut self, optimal: Vec<Sample>) -> Result<(), TrackError> {
        check_ascending(&optimal)?;
        self.optimal = optimal;
        Ok(())
    }

    /// Replace the waypoint list.
    pub fn set_waypoints(&mut self, waypoints: Vec<Sample>) {
        self.waypoints = waypoints;
    }

    /// All samples.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Optimal-track samples (empty if none).
    pub fn optimal(&self) -> &[Sample] {
        &self.optimal
    }

    /// External reference points.
    pub fn waypoints(&self) -> &[Sample] {
        &self.waypoints
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Access a single sample.
    pub fn sample(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }

    /// Time span covered by the track.
    pub fn time_range(&self) -> Option<Range> {
        let first = self.samples.first()?;
        let last = self.samples.last()?;
        Some(Range::new(first.t, last.t))
    }

    /// Largest index with `t < time`.
    pub fn find_index_below_t(&self, time: f64) -> Option<usize> {
        self.time_engine().find_index_below_x(time)
    }

    /// Smallest index with `t >= time`, or `len` if none.
    pub fn find_index_above_t(&self, time: f64) -> usize {
        self.time_engine().find_index_above_x(time)
    }

    /// Sample interpolated at `time`, clamped to the ends of the track.
    pub fn interpolate_at_t(&self, time: f64) -> Option<Sample> {
        self.time_engine().interpolate_at_x(time)
    }

    fn time_engine(&self) -> IndexEngine<'_> {
        IndexEngine::new(&self.samples, quantity::time(), UnitSystem::Metric)
    }
}

fn check_ascending(samples: &[Sample]) -> Result<(), TrackError> {
    if let Some(index) = samples
        .windows(2)
        .position(|pair| pair[1].t < pair[0].t)
    {
        tracing::warn!(index = index + 1, "rejecting track with decreasing time");
        return Err(TrackError::UnsortedTrack { index: index + 1 });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(times: &[f64]) -> TrackStore {
        TrackStore::from_samples(times.iter().map(|&t| Sample::at(t, t, 0.0, 0.0)).collect())
            .expect("sorted")
    }

    #[test]
    fn rejects_decreasing_time() {
        let samples = vec![
            Sample::at(0.0, 0.0, 0.0, 0.0),
            Sample::at(2.0, 0.0, 0.0, 0.0),
            Sample::at(1.0, 0.0, 0.0, 0.0),
        ];
        let err = TrackStore::from_samples(samples).unwrap_err();
        assert!(matches!(err, TrackError::UnsortedTrack { index: 2 }));
    }

    #[test]
    fn accepts_duplicate_timestamps() {
        let store = store(&[0.0, 1.0, 1.0, 2.0]);
        assert_eq!(store.len(), 4);
        assert_eq!(store.time_range(), Some(Range::new(0.0, 2.0)));
    }

    #[test]
    fn time_queries_on_empty_store_short_circuit() {
        let store = TrackStore::new();
        assert!(store.interpolate_at_t(0.0).is_none());
        assert!(store.time_range().is_none());
        assert_eq!(store.find_index_below_t(0.0), None);
        assert_eq!(store.find_index_above_t(0.0), 0);
    }

    #[test]
    fn interpolates_in_time() {
        let store = store(&[0.0, 2.0, 4.0]);
        let sample = store.interpolate_at_t(3.0).unwrap();
        assert!((sample.x - 3.0).abs() < 1e-12);
        assert_eq!(store.find_index_below_t(3.0), Some(1));
        assert_eq!(store.find_index_above_t(3.0), 2);
    }
}
