//! # Sky Visibility Core Library
//!
//! This library answers the questions an astrophotographer asks before a night out:
//! where will a target be, when is it dark, how much is the Moon in the way, and
//! which stretch of the night is worth imaging.
//!
//! ## Design Philosophy
//!
//! ### Pure Computation
//! - **No hidden state**: every engine function is `(inputs) -> outputs`, so the same
//!   call always returns bit-identical results and can run on any thread
//! - **Injected ephemeris**: all positional astronomy goes through an [`ephemeris::Ephemeris`]
//!   value passed into each call; [`almanac::Almanac`] is the built-in implementation
//! - **Empty is not an error**: a night without sunset (or sunrise) yields an empty
//!   series, and a night without a good stretch yields no windows
//!
//! ### Layers
//! 1. [`transform`]: RA/Dec + observer + instant → altitude, azimuth, airmass
//! 2. [`night`]: sunset → sunrise altitude series at a fixed cadence
//! 3. [`lunar`]: Moon position, phase, illumination and separation from a target
//! 4. [`observability`]: visibility checks, quality buckets and best windows
//!
//! Outside the engine, [`planner`] ranks many targets for one night in parallel,
//! [`renderer`] draws a text chart and [`config`] loads the CLI settings.
//!
//! ## Core Types
//!
//! - [`ObserverLocation`] / [`TargetCoordinates`]: the inputs
//! - [`AltitudeData`], [`MoonData`]: per-instant positions
//! - [`ObservabilityCheck`], [`BestObservationWindow`]: the verdicts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// Module declarations
pub mod almanac;
pub mod config;
pub mod ephemeris;
pub mod error;
pub mod lunar;
pub mod night;
pub mod observability;
pub mod planner;
pub mod renderer;
pub mod transform;

pub use error::VisibilityError;

/// A fixed point on Earth's surface.
///
/// Fields are public so callers that already validated their input (a form,
/// a database row) can build the value directly. Use [`ObserverLocation::new`]
/// when the numbers come from somewhere less trusted.
///
/// # Example
/// ```
/// use sky_visibility_lib::ObserverLocation;
///
/// let site = ObserverLocation::new(40.0, -105.25, 1650.0).unwrap();
/// assert_eq!(site.elevation, 1650.0);
///
/// assert!(ObserverLocation::new(91.0, 0.0, 0.0).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObserverLocation {
    /// Geodetic latitude in degrees, -90 to 90
    pub latitude: f64,
    /// Longitude in degrees, -180 to 180, east positive
    pub longitude: f64,
    /// Height above sea level in meters (may be negative)
    #[serde(default)]
    pub elevation: f64,
}

impl ObserverLocation {
    /// Build a validated observer location.
    pub fn new(latitude: f64, longitude: f64, elevation: f64) -> Result<Self, VisibilityError> {
        let location = ObserverLocation {
            latitude,
            longitude,
            elevation,
        };
        location.validate()?;
        Ok(location)
    }

    /// Check geographic ranges and finiteness.
    pub fn validate(&self) -> Result<(), VisibilityError> {
        error::ensure_finite("latitude", self.latitude)?;
        error::ensure_finite("longitude", self.longitude)?;
        error::ensure_finite("elevation", self.elevation)?;
        error::ensure_range("latitude", self.latitude, -90.0, 90.0)?;
        error::ensure_range("longitude", self.longitude, -180.0, 180.0)
    }
}

/// A fixed position on the sky in equatorial coordinates (J2000, no proper motion).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetCoordinates {
    /// Right ascension in degrees, [0, 360)
    pub ra_deg: f64,
    /// Declination in degrees, [-90, 90]
    pub dec_deg: f64,
}

impl TargetCoordinates {
    /// Build validated target coordinates.
    pub fn new(ra_deg: f64, dec_deg: f64) -> Result<Self, VisibilityError> {
        let target = TargetCoordinates { ra_deg, dec_deg };
        target.validate()?;
        Ok(target)
    }

    pub fn validate(&self) -> Result<(), VisibilityError> {
        error::ensure_finite("ra_deg", self.ra_deg)?;
        error::ensure_finite("dec_deg", self.dec_deg)?;
        if !(0.0..360.0).contains(&self.ra_deg) {
            return Err(VisibilityError::InvalidInput(format!(
                "ra_deg {} outside [0, 360)",
                self.ra_deg
            )));
        }
        error::ensure_range("dec_deg", self.dec_deg, -90.0, 90.0)
    }

    /// Right ascension in hours, the unit ephemeris providers expect.
    pub fn ra_hours(&self) -> f64 {
        self.ra_deg / 15.0
    }
}

/// Horizontal position of a target at one instant.
///
/// `airmass` is [`transform::AIRMASS_SENTINEL`] whenever the altitude is at or
/// below 10°, where the plane-parallel secant stops meaning anything.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AltitudeData {
    pub time: DateTime<Utc>,
    /// Degrees above the horizon, negative below
    pub altitude: f64,
    /// Degrees clockwise from north, [0, 360)
    pub azimuth: f64,
    pub airmass: f64,
}

/// Where the Moon is and how bright it is.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoonData {
    pub altitude: f64,
    pub azimuth: f64,
    /// 0 at new moon, 0.5 at full moon
    pub phase: f64,
    /// Percent of the disk lit, 0 to 100
    pub illumination: f64,
    /// Degree-space distance from the target, 0 when no target was given
    pub distance: f64,
}

/// Discrete observing quality bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservationQuality {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl ObservationQuality {
    /// Numeric score used when averaging over a window.
    pub fn score(self) -> f64 {
        match self {
            ObservationQuality::Excellent => 4.0,
            ObservationQuality::Good => 3.0,
            ObservationQuality::Fair => 2.0,
            ObservationQuality::Poor => 1.0,
        }
    }

    /// Re-bucket an averaged score.
    pub fn from_average_score(avg: f64) -> Self {
        if avg >= 3.5 {
            ObservationQuality::Excellent
        } else if avg >= 2.5 {
            ObservationQuality::Good
        } else if avg >= 1.5 {
            ObservationQuality::Fair
        } else {
            ObservationQuality::Poor
        }
    }
}

impl fmt::Display for ObservationQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObservationQuality::Excellent => "excellent",
            ObservationQuality::Good => "good",
            ObservationQuality::Fair => "fair",
            ObservationQuality::Poor => "poor",
        };
        f.pad(name)
    }
}

/// Verdict for one target at one instant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservabilityCheck {
    /// Altitude strictly above 0°
    pub is_visible: bool,
    /// Moon more than 30° away or below the horizon
    pub is_moon_safe: bool,
    pub altitude: f64,
    pub moon_distance: f64,
    pub moon_illumination: f64,
    pub quality: ObservationQuality,
}

/// A contiguous stretch of the night with the target above 30°.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestObservationWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub peak_time: DateTime<Utc>,
    pub peak_altitude: f64,
    pub average_quality: ObservationQuality,
}
