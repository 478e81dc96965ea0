//! Binary search and interpolation over a track, keyed by a horizontal quantity.
//!
//! The projected sequence `quantity(sample[i])` is assumed to be
//! non-decreasing. When it is not (for example a distance axis on a track that
//! doubles back), the search results are unspecified; nothing here detects or
//! repairs that case.

use crate::quantity::{Quantity, UnitSystem};
use crate::sample::Sample;

/// Search and interpolation engine over a borrowed sample slice.
#[derive(Debug, Clone, Copy)]
pub struct IndexEngine<'a> {
    samples: &'a [Sample],
    quantity: &'a dyn Quantity,
    units: UnitSystem,
}

impl<'a> IndexEngine<'a> {
    /// Create an engine projecting `samples` through `quantity`.
    pub fn new(samples: &'a [Sample], quantity: &'a dyn Quantity, units: UnitSystem) -> Self {
        Self {
            samples,
            quantity,
            units,
        }
    }

    /// Projected value of the sample at `index`.
    pub fn project(&self, index: usize) -> f64 {
        self.quantity.value(&self.samples[index], self.units)
    }

    /// Largest index whose projected value is `< x`, or `None` if there is none.
    pub fn find_index_below_x(&self, x: f64) -> Option<usize> {
        self.lower_bound(x).checked_sub(1)
    }

    /// Smallest index whose projected value is `>= x`, or `len` if there is none.
    pub fn find_index_above_x(&self, x: f64) -> usize {
        self.lower_bound(x)
    }

    /// Synthesize the sample at horizontal position `x`.
    ///
    /// Before the first sample this is the first sample, after the last it is
    /// the last. In between, every field of the two bracketing samples is
    /// interpolated with the fraction computed on the projected values.
    /// Returns `None` for an empty track.
    pub fn interpolate_at_x(&self, x: f64) -> Option<Sample> {
        let first = self.samples.first()?;
        let Some(below) = self.find_index_below_x(x) else {
            return Some(*first);
        };
        let above = self.find_index_above_x(x);
        if above >= self.samples.len() {
            return self.samples.last().copied();
        }
        Some(interpolate_between(
            &self.samples[below],
            &self.samples[above],
            self.project(below),
            self.project(above),
            x,
        ))
    }

    fn lower_bound(&self, x: f64) -> usize {
        let mut left = 0;
        let mut right = self.samples.len();
        while left < right {
            let mid = (left + right) / 2;
            if self.project(mid) < x {
                left = mid + 1;
            } else {
                right = mid;
            }
        }
        left
    }
}

/// Interpolate between two samples at `x`, given their projected values.
///
/// An exact hit on `x2` returns `upper` unchanged. A zero-length or inverted
/// interval returns `lower`, so no division by zero reaches the caller.
pub(crate) fn interpolate_between(
    lower: &Sample,
    upper: &Sample,
    x1: f64,
    x2: f64,
    x: f64,
) -> Sample {
    if x == x2 {
        return *upper;
    }
    let span = x2 - x1;
    if !span.is_finite() || span <= 0.0 {
        return *lower;
    }
    Sample::interpolate(lower, upper, (x - x1) / span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::{Distance2D, Elevation, Time};

    fn track(times: &[f64]) -> Vec<Sample> {
        times
            .iter()
            .enumerate()
            .map(|(i, &t)| Sample::at(t, i as f64 * 10.0, 0.0, 100.0 - i as f64))
            .collect()
    }

    #[test]
    fn search_brackets_every_position() {
        let samples = track(&[0.0, 1.0, 2.5, 4.0, 7.0]);
        let engine = IndexEngine::new(&samples, &Time, UnitSystem::Metric);
        let n = samples.len();
        let mut positions = vec![-3.0, 0.0, 0.5, 1.0, 2.0, 2.5, 3.9, 4.0, 6.0, 7.0, 9.0];
        positions.extend((-1..9).map(f64::from));
        for x in positions {
            let below = engine.find_index_below_x(x);
            let above = engine.find_index_above_x(x);
            if let Some(below) = below {
                assert!(samples[below].t < x, "below({x}) = {below}");
                if below + 1 < n {
                    assert!(samples[below + 1].t >= x);
                }
            } else {
                assert!(samples[0].t >= x);
            }
            if above < n {
                assert!(samples[above].t >= x, "above({x}) = {above}");
            }
            if above > 0 {
                assert!(samples[above - 1].t < x);
            }
            assert_eq!(below.map_or(0, |b| b + 1), above);
        }
        assert_eq!(engine.find_index_below_x(-1.0), None);
        assert_eq!(engine.find_index_above_x(100.0), n);
    }

    #[test]
    fn interpolation_is_identity_at_samples() {
        let samples = track(&[0.0, 1.0, 1.5, 3.0]);
        let engine = IndexEngine::new(&samples, &Time, UnitSystem::Metric);
        for sample in &samples {
            let hit = engine.interpolate_at_x(sample.t).unwrap();
            assert!((hit.t - sample.t).abs() < 1e-12);
            assert!((hit.x - sample.x).abs() < 1e-12);
            assert!((hit.z - sample.z).abs() < 1e-12);
        }
    }

    #[test]
    fn interpolation_clamps_outside_data() {
        let samples = track(&[0.0, 1.0, 2.0]);
        let engine = IndexEngine::new(&samples, &Time, UnitSystem::Metric);
        assert_eq!(engine.interpolate_at_x(-5.0), Some(samples[0]));
        assert_eq!(engine.interpolate_at_x(50.0), Some(samples[2]));
    }

    #[test]
    fn interpolation_uses_projected_fraction_for_every_field() {
        let mut samples = track(&[0.0, 10.0]);
        samples[0].dist_2d = 0.0;
        samples[1].dist_2d = 200.0;
        let engine = IndexEngine::new(&samples, &Distance2D, UnitSystem::Metric);
        let mid = engine.interpolate_at_x(50.0).unwrap();
        assert!((mid.t - 2.5).abs() < 1e-12);
        assert!((mid.x - 2.5).abs() < 1e-12);
    }

    #[test]
    fn empty_track_yields_nothing() {
        let engine = IndexEngine::new(&[], &Elevation, UnitSystem::Metric);
        assert_eq!(engine.find_index_below_x(1.0), None);
        assert_eq!(engine.find_index_above_x(1.0), 0);
        assert!(engine.interpolate_at_x(1.0).is_none());
    }

    #[test]
    fn degenerate_interval_returns_lower_sample() {
        let lower = Sample::at(5.0, 1.0, 0.0, 10.0);
        let upper = Sample::at(5.0, 2.0, 0.0, 20.0);
        let picked = interpolate_between(&lower, &upper, 5.0, 5.0, 4.0);
        assert_eq!(picked, lower);
        let picked = interpolate_between(&lower, &upper, 5.0, 5.0, 5.0);
        assert_eq!(picked, upper);
        let inverted = interpolate_between(&lower, &upper, 6.0, 5.0, 5.5);
        assert_eq!(inverted, lower);
    }

    #[test]
    fn duplicate_timestamps_do_not_produce_nan() {
        let samples = track(&[0.0, 1.0, 1.0, 2.0]);
        let engine = IndexEngine::new(&samples, &Time, UnitSystem::Metric);
        for x in [0.5, 1.0, 1.5] {
            let sample = engine.interpolate_at_x(x).unwrap();
            assert!(sample.x.is_finite() && sample.z.is_finite());
        }
        assert_eq!(engine.interpolate_at_x(1.0).unwrap(), samples[1]);
    }
}
