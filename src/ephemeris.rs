//! # Ephemeris Provider Interface
//!
//! Every piece of positional astronomy the engine needs goes through the
//! [`Ephemeris`] trait. Engine functions take the provider as an argument rather
//! than reaching for a global, which keeps them pure and lets tests swap in a
//! provider that returns exactly the positions a scenario needs.
//!
//! Units follow the usual equatorial conventions: right ascension in hours,
//! declination, altitude and azimuth in degrees, azimuth clockwise from north.

use crate::VisibilityError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// WGS-84 polar/equatorial axis ratio (b/a).
const AXIS_RATIO: f64 = 0.996_647_19;

/// Earth's equatorial radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_378_140.0;

/// Bodies the provider can place on the sky.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Body {
    Sun,
    Moon,
}

/// Which horizon crossing to search for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiseSetDirection {
    Rise,
    Set,
}

/// Equatorial coordinates (RA in hours, Dec in degrees).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EquatorialCoords {
    pub ra_hours: f64,
    pub dec_deg: f64,
}

/// Horizontal coordinates in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HorizontalCoords {
    pub altitude: f64,
    pub azimuth: f64,
}

/// Lunar illumination at an instant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoonIllumination {
    /// Sun–Moon–Earth angle: 0° at full moon, 180° at new moon
    pub phase_angle_deg: f64,
    /// Illuminated fraction of the disk, 0 to 1
    pub phase_fraction: f64,
}

/// An observer prepared for repeated position calculations.
///
/// Holds the geodetic position plus the geocentric parallax factors
/// ρ·sin φ′ and ρ·cos φ′ (in Earth radii) that topocentric corrections need.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObserverFrame {
    latitude_deg: f64,
    longitude_deg: f64,
    elevation_m: f64,
    rho_sin_phi: f64,
    rho_cos_phi: f64,
}

impl ObserverFrame {
    /// Build a frame from geodetic latitude/longitude (degrees) and height (meters).
    pub fn geodetic(latitude_deg: f64, longitude_deg: f64, elevation_m: f64) -> Self {
        let phi = latitude_deg.to_radians();
        let u = (AXIS_RATIO * phi.tan()).atan();
        let h = elevation_m / EARTH_RADIUS_M;

        ObserverFrame {
            latitude_deg,
            longitude_deg,
            elevation_m,
            rho_sin_phi: AXIS_RATIO * u.sin() + h * phi.sin(),
            rho_cos_phi: u.cos() + h * phi.cos(),
        }
    }

    pub fn latitude_deg(&self) -> f64 {
        self.latitude_deg
    }

    pub fn longitude_deg(&self) -> f64 {
        self.longitude_deg
    }

    pub fn elevation_m(&self) -> f64 {
        self.elevation_m
    }

    /// ρ·sin φ′ in Earth radii
    pub fn rho_sin_phi(&self) -> f64 {
        self.rho_sin_phi
    }

    /// ρ·cos φ′ in Earth radii
    pub fn rho_cos_phi(&self) -> f64 {
        self.rho_cos_phi
    }
}

/// Source of positional astronomy for the engine.
///
/// Implementations must be deterministic: the same arguments give the same
/// answer. Failures are reported as [`VisibilityError::Ephemeris`]; a rise/set
/// search that simply finds no crossing returns `Ok(None)`.
pub trait Ephemeris {
    /// Prepare an observer for the other calls.
    fn observer_frame(&self, latitude: f64, longitude: f64, elevation: f64) -> ObserverFrame {
        ObserverFrame::geodetic(latitude, longitude, elevation)
    }

    /// Mean J2000 place → apparent place of date (precession, nutation, aberration).
    fn equatorial_to_apparent(
        &self,
        ra_hours: f64,
        dec_deg: f64,
        time: DateTime<Utc>,
        frame: &ObserverFrame,
    ) -> Result<EquatorialCoords, VisibilityError>;

    /// Apparent equatorial place → altitude/azimuth for the observer.
    fn horizontal(
        &self,
        time: DateTime<Utc>,
        frame: &ObserverFrame,
        position: EquatorialCoords,
    ) -> Result<HorizontalCoords, VisibilityError>;

    /// Apparent topocentric place of the Sun or Moon.
    fn body_position(
        &self,
        body: Body,
        time: DateTime<Utc>,
        frame: &ObserverFrame,
    ) -> Result<EquatorialCoords, VisibilityError>;

    /// First rise or set of `body` at `horizon_offset_deg` after `search_start`.
    fn rise_set(
        &self,
        body: Body,
        frame: &ObserverFrame,
        direction: RiseSetDirection,
        search_start: DateTime<Utc>,
        horizon_offset_deg: f64,
    ) -> Result<Option<DateTime<Utc>>, VisibilityError>;

    /// Phase angle and illuminated fraction of the Moon.
    fn moon_illumination(&self, time: DateTime<Utc>) -> Result<MoonIllumination, VisibilityError>;
}
