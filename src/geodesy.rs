//! Distance and bearing between two samples.
//!
//! Used to place waypoints in the 3D view relative to the current sample.

use crate::sample::Sample;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Distance/bearing provider.
pub trait Geodesy: std::fmt::Debug {
    /// Distance in metres from `from` to `to`.
    fn distance(&self, from: &Sample, to: &Sample) -> f64;

    /// Initial bearing in radians from `from` to `to`, clockwise from north.
    fn bearing(&self, from: &Sample, to: &Sample) -> f64;
}

/// Distance and bearing in the local tangent plane.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanarGeodesy;

impl Geodesy for PlanarGeodesy {
    fn distance(&self, from: &Sample, to: &Sample) -> f64 {
        (to.x - from.x).hypot(to.y - from.y)
    }

    fn bearing(&self, from: &Sample, to: &Sample) -> f64 {
        (to.x - from.x).atan2(to.y - from.y)
    }
}

/// Great-circle distance and bearing on a spherical earth.
///
/// Falls back to [`PlanarGeodesy`] when either sample lacks geodetic data.
#[derive(Debug, Clone, Copy, Default)]
pub struct SphericalGeodesy;

impl Geodesy for SphericalGeodesy {
    fn distance(&self, from: &Sample, to: &Sample) -> f64 {
        if !(from.has_geodetic && to.has_geodetic) {
            return PlanarGeodesy.distance(from, to);
        }
        let lat1 = from.lat.to_radians();
        let lat2 = to.lat.to_radians();
        let dlat = lat2 - lat1;
        let dlon = (to.lon - from.lon).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    fn bearing(&self, from: &Sample, to: &Sample) -> f64 {
        if !(from.has_geodetic && to.has_geodetic) {
            return PlanarGeodesy.bearing(from, to);
        }
        let lat1 = from.lat.to_radians();
        let lat2 = to.lat.to_radians();
        let dlon = (to.lon - from.lon).to_radians();
        let y = dlon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
        y.atan2(x)
    }
}
