//! Point and range summaries for the current mark.
//!
//! Positions passed in here are horizontal-axis coordinates, the same values
//! the chart produces when converting a cursor pixel.

use std::fmt;

use crate::index::IndexEngine;
use crate::quantity::{self, Quantity, QuantitySet, UnitSystem, XAxisKind};
use crate::render::Color;
use crate::sample::Sample;
use crate::track::TrackStore;

/// One line of a mark summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    /// Quantity title including its unit.
    pub title: String,
    /// Value at the mark (end of a range mark).
    pub value: f64,
    /// Signed change `end - start` for a range mark.
    pub delta: Option<f64>,
    /// Trapezoidal window average for a range mark.
    pub average: Option<f64>,
    /// Display color.
    pub color: Color,
}

/// Table of values describing the active mark.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MarkSummary {
    /// Rows in display order: time, horizontal axis (if not time), then the
    /// visible quantities.
    pub rows: Vec<SummaryRow>,
}

impl MarkSummary {
    /// Find a row by its title.
    pub fn row(&self, title: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|row| row.title == title)
    }
}

impl fmt::Display for MarkSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            write!(f, "{}\t{:.3}", row.title, row.value)?;
            if let Some(delta) = row.delta {
                write!(f, "\t({delta:+.3})")?;
            }
            if let Some(average) = row.average {
                write!(f, "\t[{average:.3}]")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Summary of a single mark at horizontal position `x`.
///
/// Returns `None` for an empty track.
pub fn summarize_point(
    store: &TrackStore,
    quantities: &QuantitySet,
    x_kind: XAxisKind,
    units: UnitSystem,
    x: f64,
) -> Option<MarkSummary> {
    let engine = IndexEngine::new(store.samples(), x_kind.quantity(), units);
    let sample = engine.interpolate_at_x(x)?;
    let rows = axis_quantities(x_kind)
        .map(|q| point_row(q, &sample, units, Color::BLACK))
        .chain(
            quantities
                .visible()
                .map(|q| point_row(q, &sample, units, q.color())),
        )
        .collect();
    Some(MarkSummary { rows })
}

/// Summary of a range mark from `start` to `end` (horizontal coordinates).
///
/// Deltas follow the argument order; averages are the same either way.
/// Returns `None` for an empty track.
pub fn summarize_range(
    store: &TrackStore,
    quantities: &QuantitySet,
    x_kind: XAxisKind,
    units: UnitSystem,
    start: f64,
    end: f64,
) -> Option<MarkSummary> {
    let x_quantity = x_kind.quantity();
    let engine = IndexEngine::new(store.samples(), x_quantity, units);
    let first = engine.interpolate_at_x(start)?;
    let last = engine.interpolate_at_x(end)?;

    let mut rows: Vec<SummaryRow> = axis_quantities(x_kind)
        .map(|q| SummaryRow {
            delta: Some(q.value(&last, units) - q.value(&first, units)),
            ..point_row(q, &last, units, Color::BLACK)
        })
        .collect();
    for q in quantities.visible() {
        rows.push(SummaryRow {
            delta: Some(q.value(&last, units) - q.value(&first, units)),
            average: trapezoid_average(store.samples(), x_quantity, q, units, start, end),
            ..point_row(q, &last, units, q.color())
        });
    }
    Some(MarkSummary { rows })
}

/// Trapezoidal average of `y` over the `x` domain between `start` and `end`.
///
/// The interpolated endpoints contribute partial trapezoids up to the first
/// and last enclosed sample. When no sample lies strictly inside the range a
/// single trapezoid joins the two endpoints. A zero-width range yields the
/// value at that position. Returns `None` for an empty track.
pub fn trapezoid_average(
    samples: &[Sample],
    x: &dyn Quantity,
    y: &dyn Quantity,
    units: UnitSystem,
    start: f64,
    end: f64,
) -> Option<f64> {
    let (start, end) = if start <= end { (start, end) } else { (end, start) };
    let engine = IndexEngine::new(samples, x, units);
    let first = engine.interpolate_at_x(start)?;
    let last = engine.interpolate_at_x(end)?;

    let span = x.value(&last, units) - x.value(&first, units);
    if span == 0.0 || !span.is_finite() {
        return Some(y.value(&first, units));
    }

    let trapezoid = |a: &Sample, b: &Sample| {
        0.5 * (y.value(a, units) + y.value(b, units)) * (x.value(b, units) - x.value(a, units))
    };

    let j_start = engine.find_index_above_x(start);
    let sum = match engine.find_index_below_x(end) {
        Some(j_end) if j_start <= j_end => {
            let inner: f64 = samples[j_start..=j_end]
                .windows(2)
                .map(|pair| trapezoid(&pair[0], &pair[1]))
                .sum();
            trapezoid(&first, &samples[j_start]) + inner + trapezoid(&samples[j_end], &last)
        }
        _ => trapezoid(&first, &last),
    };
    Some(sum / span)
}

fn axis_quantities(x_kind: XAxisKind) -> impl Iterator<Item = &'static dyn Quantity> {
    let time = quantity::time();
    std::iter::once(time).chain((x_kind != XAxisKind::Time).then(|| x_kind.quantity()))
}

fn point_row(q: &dyn Quantity, sample: &Sample, units: UnitSystem, color: Color) -> SummaryRow {
    SummaryRow {
        title: q.title(units),
        value: q.value(sample, units),
        delta: None,
        average: None,
        color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::{Elevation, Time};

    fn descent() -> TrackStore {
        TrackStore::from_samples(vec![
            Sample::at(0.0, 0.0, 0.0, 100.0),
            Sample::at(1.0, 0.0, 0.0, 90.0),
            Sample::at(2.0, 0.0, 0.0, 70.0),
        ])
        .expect("sorted")
    }

    fn elevation_only() -> QuantitySet {
        QuantitySet::new(vec![Box::new(Elevation)])
    }

    #[test]
    fn range_over_three_samples() {
        let store = descent();
        let summary = summarize_range(
            &store,
            &elevation_only(),
            XAxisKind::Time,
            UnitSystem::Metric,
            0.0,
            2.0,
        )
        .unwrap();
        let row = summary.row(&Elevation.title(UnitSystem::Metric)).unwrap();
        assert!((row.delta.unwrap() + 30.0).abs() < 1e-9);
        // (100 + 90) / 2 * 1 + (90 + 70) / 2 * 1 over a span of 2.
        assert!((row.average.unwrap() - 87.5).abs() < 1e-9);
        assert!((row.value - 70.0).abs() < 1e-9);
        let time = summary.row(&Time.title(UnitSystem::Metric)).unwrap();
        assert!((time.delta.unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn constant_series_averages_to_constant() {
        let samples = vec![Sample::at(0.0, 0.0, 0.0, 42.0), Sample::at(10.0, 0.0, 0.0, 42.0)];
        for (start, end) in [(0.0, 10.0), (1.0, 3.0), (2.5, 9.75), (7.0, 7.5)] {
            let avg = trapezoid_average(&samples, &Time, &Elevation, UnitSystem::Metric, start, end)
                .unwrap();
            assert!((avg - 42.0).abs() < 1e-9, "{start}..{end}: {avg}");
        }
    }

    #[test]
    fn partial_trapezoids_at_both_ends() {
        let store = descent();
        let avg = trapezoid_average(
            store.samples(),
            &Time,
            &Elevation,
            UnitSystem::Metric,
            0.5,
            1.5,
        )
        .unwrap();
        // 0.5 * (95 + 90) / 2 + 0.5 * (90 + 80) / 2 over a span of 1.
        assert!((avg - 88.75).abs() < 1e-9);
    }

    #[test]
    fn reversed_range_keeps_average_and_flips_delta() {
        let store = descent();
        let summary = summarize_range(
            &store,
            &elevation_only(),
            XAxisKind::Time,
            UnitSystem::Metric,
            2.0,
            0.0,
        )
        .unwrap();
        let row = summary.row(&Elevation.title(UnitSystem::Metric)).unwrap();
        assert!((row.delta.unwrap() - 30.0).abs() < 1e-9);
        assert!((row.average.unwrap() - 87.5).abs() < 1e-9);
    }

    #[test]
    fn zero_width_range_is_finite() {
        let store = descent();
        let avg =
            trapezoid_average(store.samples(), &Time, &Elevation, UnitSystem::Metric, 1.0, 1.0)
                .unwrap();
        assert!((avg - 90.0).abs() < 1e-9);
    }

    #[test]
    fn empty_track_is_skipped() {
        let store = TrackStore::new();
        let quantities = elevation_only();
        assert!(
            summarize_point(&store, &quantities, XAxisKind::Time, UnitSystem::Metric, 1.0)
                .is_none()
        );
        assert!(
            summarize_range(&store, &quantities, XAxisKind::Time, UnitSystem::Metric, 0.0, 1.0)
                .is_none()
        );
    }

    #[test]
    fn point_summary_lists_horizontal_axis_row() {
        let mut samples: Vec<Sample> = (0..3)
            .map(|i| Sample::at(f64::from(i), 0.0, 0.0, 100.0))
            .collect();
        for (i, sample) in samples.iter_mut().enumerate() {
            sample.dist_2d = i as f64 * 50.0;
        }
        let store = TrackStore::from_samples(samples).unwrap();
        let summary = summarize_point(
            &store,
            &elevation_only(),
            XAxisKind::Distance2D,
            UnitSystem::Metric,
            75.0,
        )
        .unwrap();
        assert_eq!(summary.rows.len(), 3);
        assert!((summary.rows[0].value - 1.5).abs() < 1e-9);
        assert_eq!(summary.to_string().lines().count(), 3);
    }
}
