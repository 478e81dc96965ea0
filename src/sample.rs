//! Track sample record.

/// Standard gravity in m/s².
pub const GRAVITY: f64 = 9.80665;

/// One timestamped GPS reading with its derived fields.
///
/// Samples are immutable once stored in a [`TrackStore`](crate::track::TrackStore).
/// Positions are in a local tangent-plane frame (metres, x east, y north,
/// z up relative to the ground reference). Velocities are m/s with
/// `vel_d` positive downwards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sample {
    /// Seconds relative to the zero reference.
    pub t: f64,
    /// East position.
    pub x: f64,
    /// North position.
    pub y: f64,
    /// Height above the ground reference.
    pub z: f64,
    /// Geodetic latitude in degrees.
    pub lat: f64,
    /// Geodetic longitude in degrees.
    pub lon: f64,
    /// Height above mean sea level.
    pub h_msl: f64,
    /// Whether `lat`/`lon` carry real geodetic data.
    pub has_geodetic: bool,
    /// Raw north velocity.
    pub vel_n: f64,
    /// Raw east velocity.
    pub vel_e: f64,
    /// Down velocity.
    pub vel_d: f64,
    /// Wind-adjusted east velocity.
    pub vx: f64,
    /// Wind-adjusted north velocity.
    pub vy: f64,
    /// Horizontal position accuracy.
    pub h_acc: f64,
    /// Vertical position accuracy.
    pub v_acc: f64,
    /// Speed accuracy.
    pub s_acc: f64,
    /// Number of satellites used in the fix.
    pub num_sv: f64,
    /// Cumulative horizontal distance.
    pub dist_2d: f64,
    /// Cumulative 3D distance.
    pub dist_3d: f64,
    /// Course relative to the reference heading, degrees, unwrapped.
    pub theta: f64,
    /// Rate of change of dive angle, degrees per second.
    pub curv: f64,
    /// Rate of change of total speed.
    pub accel: f64,
    /// Estimated wind, east component.
    pub wind_e: f64,
    /// Estimated wind, north component.
    pub wind_n: f64,
    /// Residual of the wind estimate.
    pub wind_err: f64,
    /// Lift coefficient.
    pub lift: f64,
    /// Drag coefficient.
    pub drag: f64,
}

impl Sample {
    /// Sample with time and position set and every other field zeroed.
    pub fn at(t: f64, x: f64, y: f64, z: f64) -> Self {
        Self {
            t,
            x,
            y,
            z,
            ..Self::default()
        }
    }

    /// Set the velocity components (wind-adjusted components follow the raw ones).
    pub fn with_velocity(mut self, vel_n: f64, vel_e: f64, vel_d: f64) -> Self {
        self.vel_n = vel_n;
        self.vel_e = vel_e;
        self.vel_d = vel_d;
        self.vx = vel_e;
        self.vy = vel_n;
        self
    }

    /// Set the geodetic position.
    pub fn with_geodetic(mut self, lat: f64, lon: f64) -> Self {
        self.lat = lat;
        self.lon = lon;
        self.has_geodetic = true;
        self
    }

    /// Position vector in the local frame.
    pub fn position(&self) -> crate::geom::Vec3 {
        crate::geom::Vec3::new(self.x, self.y, self.z)
    }

    /// Horizontal speed from the wind-adjusted components.
    pub fn horizontal_speed(&self) -> f64 {
        self.vx.hypot(self.vy)
    }

    /// Total speed.
    pub fn total_speed(&self) -> f64 {
        (self.vx * self.vx + self.vy * self.vy + self.vel_d * self.vel_d).sqrt()
    }

    /// Linear interpolation of every field between `a` and `b`.
    ///
    /// `alpha` is 0 at `a` and 1 at `b`; it is not clamped. The geodetic flag
    /// holds only when both ends carry geodetic data.
    pub fn interpolate(a: &Sample, b: &Sample, alpha: f64) -> Sample {
        let lerp = |p: f64, q: f64| p + alpha * (q - p);
        Sample {
            t: lerp(a.t, b.t),
            x: lerp(a.x, b.x),
            y: lerp(a.y, b.y),
            z: lerp(a.z, b.z),
            lat: lerp(a.lat, b.lat),
            lon: lerp(a.lon, b.lon),
            h_msl: lerp(a.h_msl, b.h_msl),
            has_geodetic: a.has_geodetic && b.has_geodetic,
            vel_n: lerp(a.vel_n, b.vel_n),
            vel_e: lerp(a.vel_e, b.vel_e),
            vel_d: lerp(a.vel_d, b.vel_d),
            vx: lerp(a.vx, b.vx),
            vy: lerp(a.vy, b.vy),
            h_acc: lerp(a.h_acc, b.h_acc),
            v_acc: lerp(a.v_acc, b.v_acc),
            s_acc: lerp(a.s_acc, b.s_acc),
            num_sv: lerp(a.num_sv, b.num_sv),
            dist_2d: lerp(a.dist_2d, b.dist_2d),
            dist_3d: lerp(a.dist_3d, b.dist_3d),
            theta: lerp(a.theta, b.theta),
            curv: lerp(a.curv, b.curv),
            accel: lerp(a.accel, b.accel),
            wind_e: lerp(a.wind_e, b.wind_e),
            wind_n: lerp(a.wind_n, b.wind_n),
            wind_err: lerp(a.wind_err, b.wind_err),
            lift: lerp(a.lift, b.lift),
            drag: lerp(a.drag, b.drag),
        }
    }
}
