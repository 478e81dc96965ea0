//! Vertical value axes, auto-ranging and tick generation.
//!
//! Each visible quantity gets its own independent vertical axis. The axis set
//! is rebuilt from scratch on every refresh; there is no incremental update.

use crate::quantity::{Quantity, QuantitySet, UnitSystem, XAxisKind};
use crate::render::Color;
use crate::sample::Sample;
use crate::track::TrackStore;
use crate::view::Range;

/// A labelled tick position.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisTick {
    /// Tick value in axis coordinates.
    pub value: f64,
    /// Formatted label.
    pub label: String,
}

/// Evenly spaced ticks on a 1/2/5 step covering `range`.
///
/// Returns at most `max_ticks + 1` ticks; an invalid range yields none.
pub fn ticks(range: Range, max_ticks: usize) -> Vec<AxisTick> {
    if !range.is_valid() || max_ticks == 0 {
        return Vec::new();
    }
    let raw = range.span() / max_ticks as f64;
    let magnitude = 10_f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .map(|m| m * magnitude)
        .find(|step| *step >= raw)
        .unwrap_or(10.0 * magnitude);
    let decimals = (-step.log10().floor()).max(0.0) as usize;

    let first = (range.min / step).ceil() as i64;
    let last = (range.max / step).floor() as i64;
    (first..=last)
        .map(|i| {
            let value = i as f64 * step;
            AxisTick {
                value,
                label: format!("{value:.decimals$}"),
            }
        })
        .collect()
}

/// Vertical axis bound to one quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueAxis {
    key: &'static str,
    title: String,
    color: Color,
    range: Option<Range>,
}

impl ValueAxis {
    fn new(quantity: &dyn Quantity, units: UnitSystem) -> Self {
        Self {
            key: quantity.key(),
            title: quantity.title(units),
            color: quantity.color(),
            range: None,
        }
    }

    /// Key of the quantity this axis belongs to.
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Axis title including units.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Axis color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Assigned range, if any in-window samples were found.
    pub fn range(&self) -> Option<Range> {
        self.range
    }
}

/// The set of vertical axes for one refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisSet {
    axes: Vec<ValueAxis>,
}

impl AxisSet {
    /// One unranged axis per visible quantity, in display order.
    pub fn rebuild(quantities: &QuantitySet, units: UnitSystem) -> Self {
        Self {
            axes: quantities
                .visible()
                .map(|quantity| ValueAxis::new(quantity, units))
                .collect(),
        }
    }

    /// Iterate over the axes.
    pub fn iter(&self) -> impl Iterator<Item = &ValueAxis> {
        self.axes.iter()
    }

    /// Look up the axis of a quantity.
    pub fn get(&self, key: &str) -> Option<&ValueAxis> {
        self.axes.iter().find(|axis| axis.key == key)
    }

    /// Number of axes.
    pub fn len(&self) -> usize {
        self.axes.len()
    }

    /// Check whether there are no axes.
    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Assign each axis the min/max of its quantity over samples whose
    /// horizontal projection lies in `x_range`.
    ///
    /// The optimal track is scanned too when the quantity has one. An axis
    /// with no in-range samples is left without a range.
    pub fn update_y_ranges(
        &mut self,
        store: &TrackStore,
        quantities: &QuantitySet,
        x_kind: XAxisKind,
        units: UnitSystem,
        x_range: Range,
    ) {
        let x_quantity = x_kind.quantity();
        for axis in &mut self.axes {
            let Some(entry) = quantities.find(axis.key) else {
                axis.range = None;
                continue;
            };
            let quantity = entry.quantity();
            let mut range =
                y_range_in_window(store.samples(), x_quantity, quantity, units, x_range);
            if quantity.has_optimal() {
                if let Some(optimal) =
                    y_range_in_window(store.optimal(), x_quantity, quantity, units, x_range)
                {
                    range = Range::include(Range::include(range, optimal.min), optimal.max);
                }
            }
            tracing::trace!(key = axis.key, ?range, "auto-ranged axis");
            axis.range = range;
        }
    }
}

/// Min/max of `y` over samples whose `x` projection lies in `x_range`.
pub fn y_range_in_window(
    samples: &[Sample],
    x: &dyn Quantity,
    y: &dyn Quantity,
    units: UnitSystem,
    x_range: Range,
) -> Option<Range> {
    samples
        .iter()
        .filter(|sample| x_range.contains(x.value(sample, units)))
        .fold(None, |range, sample| Range::include(range, y.value(sample, units)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::{Elevation, HorizontalSpeed};

    fn quantities() -> QuantitySet {
        QuantitySet::new(vec![Box::new(Elevation), Box::new(HorizontalSpeed)])
    }

    #[test]
    fn outlier_outside_window_is_excluded() {
        let mut samples: Vec<Sample> = (0..10)
            .map(|i| Sample::at(f64::from(i), 0.0, 0.0, 1000.0 - f64::from(i)))
            .collect();
        samples[9].z = 1.0e6;
        let store = TrackStore::from_samples(samples).unwrap();
        let quantities = quantities();
        let mut axes = AxisSet::rebuild(&quantities, UnitSystem::Metric);
        axes.update_y_ranges(
            &store,
            &quantities,
            XAxisKind::Time,
            UnitSystem::Metric,
            Range::new(2.0, 5.0),
        );
        let range = axes.get("elevation").unwrap().range().unwrap();
        assert_eq!(range, Range::new(995.0, 998.0));
    }

    #[test]
    fn empty_window_leaves_axis_unassigned() {
        let store = TrackStore::from_samples(vec![
            Sample::at(0.0, 0.0, 0.0, 10.0),
            Sample::at(1.0, 0.0, 0.0, 20.0),
        ])
        .unwrap();
        let quantities = quantities();
        let mut axes = AxisSet::rebuild(&quantities, UnitSystem::Metric);
        axes.update_y_ranges(
            &store,
            &quantities,
            XAxisKind::Time,
            UnitSystem::Metric,
            Range::new(5.0, 6.0),
        );
        assert_eq!(axes.len(), 2);
        assert!(axes.iter().all(|axis| axis.range().is_none()));
    }

    #[test]
    fn optimal_track_widens_range() {
        let mut store = TrackStore::from_samples(vec![
            Sample::at(0.0, 0.0, 0.0, 10.0),
            Sample::at(1.0, 0.0, 0.0, 20.0),
        ])
        .unwrap();
        store
            .set_optimal(vec![Sample::at(0.5, 0.0, 0.0, 50.0)])
            .unwrap();
        let quantities = quantities();
        let mut axes = AxisSet::rebuild(&quantities, UnitSystem::Metric);
        axes.update_y_ranges(
            &store,
            &quantities,
            XAxisKind::Time,
            UnitSystem::Metric,
            Range::new(0.0, 1.0),
        );
        assert_eq!(
            axes.get("elevation").unwrap().range(),
            Some(Range::new(10.0, 50.0))
        );
    }

    #[test]
    fn ticks_use_round_steps() {
        let ticks = ticks(Range::new(0.0, 10.0), 5);
        let values: Vec<f64> = ticks.iter().map(|tick| tick.value).collect();
        assert_eq!(values, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(ticks[1].label, "2");
        let fine = super::ticks(Range::new(0.0, 1.0), 4);
        assert_eq!(fine[1].label, "0.5");
    }
}
