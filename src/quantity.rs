//! Plottable quantities: named, unit-aware scalar projections of a [`Sample`].
//!
//! Every variant is a unit struct implementing [`Quantity`]. Per-quantity
//! state (visibility) lives in [`QuantitySet`], not in the quantity itself,
//! and the unit system is passed in on every call.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TrackError;
use crate::render::Color;
use crate::sample::{GRAVITY, Sample};

/// Metres to feet.
pub const METERS_TO_FEET: f64 = 3.280_84;
/// Metres per second to kilometres per hour.
pub const MPS_TO_KMH: f64 = 3.6;
/// Metres per second to miles per hour.
pub const MPS_TO_MPH: f64 = 2.236_94;

/// Unit system used for values and titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnitSystem {
    /// Metres, km/h.
    #[default]
    Metric,
    /// Feet, mph.
    Imperial,
}

impl UnitSystem {
    /// The other unit system.
    pub fn toggled(self) -> Self {
        match self {
            Self::Metric => Self::Imperial,
            Self::Imperial => Self::Metric,
        }
    }

    /// Convert a length in metres.
    pub fn length(self, meters: f64) -> f64 {
        match self {
            Self::Metric => meters,
            Self::Imperial => meters * METERS_TO_FEET,
        }
    }

    /// Convert a speed in m/s.
    pub fn speed(self, mps: f64) -> f64 {
        match self {
            Self::Metric => mps * MPS_TO_KMH,
            Self::Imperial => mps * MPS_TO_MPH,
        }
    }

    fn length_unit(self) -> &'static str {
        match self {
            Self::Metric => "m",
            Self::Imperial => "ft",
        }
    }

    fn speed_unit(self) -> &'static str {
        match self {
            Self::Metric => "km/h",
            Self::Imperial => "mph",
        }
    }
}

/// A named scalar projection of a sample.
///
/// Quantities used on the horizontal axis must be monotonic over the track
/// for the binary searches in [`IndexEngine`](crate::index::IndexEngine) to
/// be meaningful. This is assumed, not checked.
pub trait Quantity: fmt::Debug + Send + Sync {
    /// Stable identifier used in configuration records.
    fn key(&self) -> &'static str;

    /// Display title including the unit.
    fn title(&self, units: UnitSystem) -> String;

    /// Value of the quantity for a sample.
    fn value(&self, sample: &Sample, units: UnitSystem) -> f64;

    /// Series color.
    fn color(&self) -> Color;

    /// Whether the optimal track is drawn alongside this quantity.
    fn has_optimal(&self) -> bool {
        false
    }

    /// Whether the quantity starts out visible.
    fn visible_by_default(&self) -> bool {
        false
    }

    /// Whether this is the principal elevation series that carries the
    /// reference-window band.
    fn is_elevation(&self) -> bool {
        false
    }
}

fn titled(name: &str, unit: &str) -> String {
    format!("{name} ({unit})")
}

/// Elapsed time.
#[derive(Debug, Clone, Copy, Default)]
pub struct Time;

impl Quantity for Time {
    fn key(&self) -> &'static str {
        "time"
    }
    fn title(&self, _units: UnitSystem) -> String {
        titled("Time", "s")
    }
    fn value(&self, sample: &Sample, _units: UnitSystem) -> f64 {
        sample.t
    }
    fn color(&self) -> Color {
        Color::BLACK
    }
}

/// Cumulative horizontal distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct Distance2D;

impl Quantity for Distance2D {
    fn key(&self) -> &'static str {
        "distance_2d"
    }
    fn title(&self, units: UnitSystem) -> String {
        titled("Horizontal Distance", units.length_unit())
    }
    fn value(&self, sample: &Sample, units: UnitSystem) -> f64 {
        units.length(sample.dist_2d)
    }
    fn color(&self) -> Color {
        Color::BLACK
    }
}

/// Cumulative 3D distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct Distance3D;

impl Quantity for Distance3D {
    fn key(&self) -> &'static str {
        "distance_3d"
    }
    fn title(&self, units: UnitSystem) -> String {
        titled("Total Distance", units.length_unit())
    }
    fn value(&self, sample: &Sample, units: UnitSystem) -> f64 {
        units.length(sample.dist_3d)
    }
    fn color(&self) -> Color {
        Color::BLACK
    }
}

/// Height above the ground reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct Elevation;

impl Quantity for Elevation {
    fn key(&self) -> &'static str {
        "elevation"
    }
    fn title(&self, units: UnitSystem) -> String {
        titled("Elevation", units.length_unit())
    }
    fn value(&self, sample: &Sample, units: UnitSystem) -> f64 {
        units.length(sample.z)
    }
    fn color(&self) -> Color {
        Color::rgb8(0, 0, 0)
    }
    fn has_optimal(&self) -> bool {
        true
    }
    fn visible_by_default(&self) -> bool {
        true
    }
    fn is_elevation(&self) -> bool {
        true
    }
}

/// Vertical speed, positive downwards.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerticalSpeed;

impl Quantity for VerticalSpeed {
    fn key(&self) -> &'static str {
        "vertical_speed"
    }
    fn title(&self, units: UnitSystem) -> String {
        titled("Vertical Speed", units.speed_unit())
    }
    fn value(&self, sample: &Sample, units: UnitSystem) -> f64 {
        units.speed(sample.vel_d)
    }
    fn color(&self) -> Color {
        Color::rgb8(0, 128, 0)
    }
    fn has_optimal(&self) -> bool {
        true
    }
    fn visible_by_default(&self) -> bool {
        true
    }
}

/// Horizontal speed.
#[derive(Debug, Clone, Copy, Default)]
pub struct HorizontalSpeed;

impl Quantity for HorizontalSpeed {
    fn key(&self) -> &'static str {
        "horizontal_speed"
    }
    fn title(&self, units: UnitSystem) -> String {
        titled("Horizontal Speed", units.speed_unit())
    }
    fn value(&self, sample: &Sample, units: UnitSystem) -> f64 {
        units.speed(sample.horizontal_speed())
    }
    fn color(&self) -> Color {
        Color::rgb8(255, 0, 0)
    }
    fn has_optimal(&self) -> bool {
        true
    }
    fn visible_by_default(&self) -> bool {
        true
    }
}

/// Total speed.
#[derive(Debug, Clone, Copy, Default)]
pub struct TotalSpeed;

impl Quantity for TotalSpeed {
    fn key(&self) -> &'static str {
        "total_speed"
    }
    fn title(&self, units: UnitSystem) -> String {
        titled("Total Speed", units.speed_unit())
    }
    fn value(&self, sample: &Sample, units: UnitSystem) -> f64 {
        units.speed(sample.total_speed())
    }
    fn color(&self) -> Color {
        Color::rgb8(0, 0, 255)
    }
    fn has_optimal(&self) -> bool {
        true
    }
}

/// Angle below the horizon.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiveAngle;

impl Quantity for DiveAngle {
    fn key(&self) -> &'static str {
        "dive_angle"
    }
    fn title(&self, _units: UnitSystem) -> String {
        titled("Dive Angle", "deg")
    }
    fn value(&self, sample: &Sample, _units: UnitSystem) -> f64 {
        sample.vel_d.atan2(sample.horizontal_speed()).to_degrees()
    }
    fn color(&self) -> Color {
        Color::rgb8(255, 0, 255)
    }
    fn has_optimal(&self) -> bool {
        true
    }
}

/// Rate of change of the dive angle.
#[derive(Debug, Clone, Copy, Default)]
pub struct Curvature;

impl Quantity for Curvature {
    fn key(&self) -> &'static str {
        "curvature"
    }
    fn title(&self, _units: UnitSystem) -> String {
        titled("Dive Rate", "deg/s")
    }
    fn value(&self, sample: &Sample, _units: UnitSystem) -> f64 {
        sample.curv
    }
    fn color(&self) -> Color {
        Color::rgb8(128, 0, 128)
    }
}

/// Horizontal over vertical speed; zero while not descending or climbing.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlideRatio;

impl Quantity for GlideRatio {
    fn key(&self) -> &'static str {
        "glide_ratio"
    }
    fn title(&self, _units: UnitSystem) -> String {
        "Glide Ratio".to_string()
    }
    fn value(&self, sample: &Sample, _units: UnitSystem) -> f64 {
        if sample.vel_d != 0.0 {
            sample.horizontal_speed() / sample.vel_d
        } else {
            0.0
        }
    }
    fn color(&self) -> Color {
        Color::rgb8(128, 128, 0)
    }
    fn has_optimal(&self) -> bool {
        true
    }
}

/// Horizontal position accuracy.
#[derive(Debug, Clone, Copy, Default)]
pub struct HorizontalAccuracy;

impl Quantity for HorizontalAccuracy {
    fn key(&self) -> &'static str {
        "horizontal_accuracy"
    }
    fn title(&self, units: UnitSystem) -> String {
        titled("Horizontal Accuracy", units.length_unit())
    }
    fn value(&self, sample: &Sample, units: UnitSystem) -> f64 {
        units.length(sample.h_acc)
    }
    fn color(&self) -> Color {
        Color::rgb8(0, 128, 128)
    }
}

/// Vertical position accuracy.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerticalAccuracy;

impl Quantity for VerticalAccuracy {
    fn key(&self) -> &'static str {
        "vertical_accuracy"
    }
    fn title(&self, units: UnitSystem) -> String {
        titled("Vertical Accuracy", units.length_unit())
    }
    fn value(&self, sample: &Sample, units: UnitSystem) -> f64 {
        units.length(sample.v_acc)
    }
    fn color(&self) -> Color {
        Color::rgb8(0, 96, 160)
    }
}

/// Speed accuracy.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpeedAccuracy;

impl Quantity for SpeedAccuracy {
    fn key(&self) -> &'static str {
        "speed_accuracy"
    }
    fn title(&self, units: UnitSystem) -> String {
        titled("Speed Accuracy", units.speed_unit())
    }
    fn value(&self, sample: &Sample, units: UnitSystem) -> f64 {
        units.speed(sample.s_acc)
    }
    fn color(&self) -> Color {
        Color::rgb8(96, 96, 96)
    }
}

/// Satellites used in the fix.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberOfSatellites;

impl Quantity for NumberOfSatellites {
    fn key(&self) -> &'static str {
        "number_of_satellites"
    }
    fn title(&self, _units: UnitSystem) -> String {
        "Number of Satellites".to_string()
    }
    fn value(&self, sample: &Sample, _units: UnitSystem) -> f64 {
        sample.num_sv
    }
    fn color(&self) -> Color {
        Color::rgb8(160, 82, 45)
    }
}

/// Estimated wind speed.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindSpeed;

impl Quantity for WindSpeed {
    fn key(&self) -> &'static str {
        "wind_speed"
    }
    fn title(&self, units: UnitSystem) -> String {
        titled("Wind Speed", units.speed_unit())
    }
    fn value(&self, sample: &Sample, units: UnitSystem) -> f64 {
        units.speed(sample.wind_e.hypot(sample.wind_n))
    }
    fn color(&self) -> Color {
        Color::rgb8(70, 130, 180)
    }
}

/// Direction the wind blows from, degrees in `[0, 360)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindDirection;

impl Quantity for WindDirection {
    fn key(&self) -> &'static str {
        "wind_direction"
    }
    fn title(&self, _units: UnitSystem) -> String {
        titled("Wind Direction", "deg")
    }
    fn value(&self, sample: &Sample, _units: UnitSystem) -> f64 {
        (-sample.wind_e).atan2(-sample.wind_n).to_degrees().rem_euclid(360.0)
    }
    fn color(&self) -> Color {
        Color::rgb8(100, 149, 237)
    }
}

/// Speed relative to the air mass.
#[derive(Debug, Clone, Copy, Default)]
pub struct AircraftSpeed;

impl Quantity for AircraftSpeed {
    fn key(&self) -> &'static str {
        "aircraft_speed"
    }
    fn title(&self, units: UnitSystem) -> String {
        titled("Airspeed", units.speed_unit())
    }
    fn value(&self, sample: &Sample, units: UnitSystem) -> f64 {
        let ve = sample.vel_e - sample.wind_e;
        let vn = sample.vel_n - sample.wind_n;
        units.speed((ve * ve + vn * vn + sample.vel_d * sample.vel_d).sqrt())
    }
    fn color(&self) -> Color {
        Color::rgb8(0, 0, 139)
    }
}

/// Residual of the wind estimate.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindError;

impl Quantity for WindError {
    fn key(&self) -> &'static str {
        "wind_error"
    }
    fn title(&self, units: UnitSystem) -> String {
        titled("Wind Error", units.speed_unit())
    }
    fn value(&self, sample: &Sample, units: UnitSystem) -> f64 {
        units.speed(sample.wind_err)
    }
    fn color(&self) -> Color {
        Color::rgb8(178, 34, 34)
    }
}

/// Rate of change of total speed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Acceleration;

impl Quantity for Acceleration {
    fn key(&self) -> &'static str {
        "acceleration"
    }
    fn title(&self, units: UnitSystem) -> String {
        titled("Acceleration", &format!("{}/s²", units.length_unit()))
    }
    fn value(&self, sample: &Sample, units: UnitSystem) -> f64 {
        units.length(sample.accel)
    }
    fn color(&self) -> Color {
        Color::rgb8(255, 140, 0)
    }
}

/// Specific mechanical energy (kinetic plus potential).
#[derive(Debug, Clone, Copy, Default)]
pub struct TotalEnergy;

impl Quantity for TotalEnergy {
    fn key(&self) -> &'static str {
        "total_energy"
    }
    fn title(&self, _units: UnitSystem) -> String {
        titled("Total Energy", "J/kg")
    }
    fn value(&self, sample: &Sample, _units: UnitSystem) -> f64 {
        let v = sample.total_speed();
        0.5 * v * v + GRAVITY * sample.z
    }
    fn color(&self) -> Color {
        Color::rgb8(85, 107, 47)
    }
}

/// Time derivative of the specific mechanical energy.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnergyRate;

impl Quantity for EnergyRate {
    fn key(&self) -> &'static str {
        "energy_rate"
    }
    fn title(&self, _units: UnitSystem) -> String {
        titled("Energy Rate", "W/kg")
    }
    fn value(&self, sample: &Sample, _units: UnitSystem) -> f64 {
        sample.total_speed() * sample.accel - GRAVITY * sample.vel_d
    }
    fn color(&self) -> Color {
        Color::rgb8(107, 142, 35)
    }
}

/// Lift coefficient.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lift;

impl Quantity for Lift {
    fn key(&self) -> &'static str {
        "lift"
    }
    fn title(&self, _units: UnitSystem) -> String {
        "Lift Coefficient".to_string()
    }
    fn value(&self, sample: &Sample, _units: UnitSystem) -> f64 {
        sample.lift
    }
    fn color(&self) -> Color {
        Color::rgb8(219, 112, 147)
    }
}

/// Drag coefficient.
#[derive(Debug, Clone, Copy, Default)]
pub struct Drag;

impl Quantity for Drag {
    fn key(&self) -> &'static str {
        "drag"
    }
    fn title(&self, _units: UnitSystem) -> String {
        "Drag Coefficient".to_string()
    }
    fn value(&self, sample: &Sample, _units: UnitSystem) -> f64 {
        sample.drag
    }
    fn color(&self) -> Color {
        Color::rgb8(199, 21, 133)
    }
}

/// Course relative to the reference heading.
#[derive(Debug, Clone, Copy, Default)]
pub struct Course;

impl Quantity for Course {
    fn key(&self) -> &'static str {
        "course"
    }
    fn title(&self, _units: UnitSystem) -> String {
        titled("Course", "deg")
    }
    fn value(&self, sample: &Sample, _units: UnitSystem) -> f64 {
        sample.theta
    }
    fn color(&self) -> Color {
        Color::rgb8(47, 79, 79)
    }
}

static TIME: Time = Time;
static DISTANCE_2D: Distance2D = Distance2D;
static DISTANCE_3D: Distance3D = Distance3D;

/// Quantity shown on the horizontal axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum XAxisKind {
    /// Elapsed time.
    #[default]
    Time,
    /// Horizontal distance travelled.
    Distance2D,
    /// 3D distance travelled.
    Distance3D,
}

impl XAxisKind {
    /// The quantity backing this axis.
    pub fn quantity(self) -> &'static dyn Quantity {
        match self {
            Self::Time => &TIME,
            Self::Distance2D => &DISTANCE_2D,
            Self::Distance3D => &DISTANCE_3D,
        }
    }
}

/// The elapsed-time quantity, always listed first in summaries.
pub fn time() -> &'static dyn Quantity {
    &TIME
}

/// A quantity plus its visibility flag.
#[derive(Debug)]
pub struct QuantityEntry {
    quantity: Box<dyn Quantity>,
    visible: bool,
}

impl QuantityEntry {
    /// Create an entry using the quantity's default visibility.
    pub fn new(quantity: Box<dyn Quantity>) -> Self {
        let visible = quantity.visible_by_default();
        Self { quantity, visible }
    }

    /// Access the quantity.
    pub fn quantity(&self) -> &dyn Quantity {
        self.quantity.as_ref()
    }

    /// Check if the quantity is visible.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Set the visibility.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

/// Ordered list of vertical quantities.
#[derive(Debug)]
pub struct QuantitySet {
    entries: Vec<QuantityEntry>,
}

impl QuantitySet {
    /// Create a set from explicit quantities, in display order.
    pub fn new(quantities: Vec<Box<dyn Quantity>>) -> Self {
        Self {
            entries: quantities.into_iter().map(QuantityEntry::new).collect(),
        }
    }

    /// The full catalogue of vertical quantities.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(Elevation),
            Box::new(VerticalSpeed),
            Box::new(HorizontalSpeed),
            Box::new(TotalSpeed),
            Box::new(DiveAngle),
            Box::new(Curvature),
            Box::new(GlideRatio),
            Box::new(HorizontalAccuracy),
            Box::new(VerticalAccuracy),
            Box::new(SpeedAccuracy),
            Box::new(NumberOfSatellites),
            Box::new(WindSpeed),
            Box::new(WindDirection),
            Box::new(AircraftSpeed),
            Box::new(WindError),
            Box::new(Acceleration),
            Box::new(TotalEnergy),
            Box::new(EnergyRate),
            Box::new(Lift),
            Box::new(Drag),
            Box::new(Course),
        ])
    }

    /// Access all entries.
    pub fn entries(&self) -> &[QuantityEntry] {
        &self.entries
    }

    /// Visible quantities in display order.
    pub fn visible(&self) -> impl Iterator<Item = &dyn Quantity> {
        self.entries
            .iter()
            .filter(|entry| entry.visible)
            .map(QuantityEntry::quantity)
    }

    /// Look up a quantity by key.
    pub fn find(&self, key: &str) -> Option<&QuantityEntry> {
        self.entries
            .iter()
            .find(|entry| entry.quantity.key() == key)
    }

    fn find_mut(&mut self, key: &str) -> Result<&mut QuantityEntry, TrackError> {
        self.entries
            .iter_mut()
            .find(|entry| entry.quantity.key() == key)
            .ok_or_else(|| TrackError::UnknownQuantity(key.to_string()))
    }

    /// Set the visibility of a quantity.
    pub fn set_visible(&mut self, key: &str, visible: bool) -> Result<(), TrackError> {
        self.find_mut(key)?.set_visible(visible);
        Ok(())
    }

    /// Flip the visibility of a quantity, returning the new state.
    pub fn toggle(&mut self, key: &str) -> Result<bool, TrackError> {
        let entry = self.find_mut(key)?;
        entry.visible = !entry.visible;
        Ok(entry.visible)
    }

    /// Visibility of every quantity, keyed by quantity key.
    pub fn visibility_map(&self) -> BTreeMap<String, bool> {
        self.entries
            .iter()
            .map(|entry| (entry.quantity.key().to_string(), entry.visible))
            .collect()
    }

    /// Apply a stored visibility map. Unknown keys are skipped.
    pub fn apply_visibility(&mut self, visibility: &BTreeMap<String, bool>) {
        for (key, visible) in visibility {
            if self.set_visible(key, *visible).is_err() {
                tracing::warn!(key = %key, "ignoring visibility for unknown quantity");
            }
        }
    }
}

impl Default for QuantitySet {
    fn default() -> Self {
        Self::standard()
    }
}
