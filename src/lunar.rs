//! Moon position, phase & illumination as seen by an observer.
//!
//! Two brightness numbers come out of here and they are not the same thing:
//! - `phase` follows the phase angle: 0 at new moon, 0.5 at full moon
//! - `illumination` is the lit fraction of the disk, in percent
//!
//! The Moon-to-target `distance` is a flat degree-space norm of the altitude and
//! azimuth differences. It is only good for "is the Moon nearby" checks and reads
//! too large across the 0°/360° azimuth seam.

use crate::ephemeris::{Body, Ephemeris, HorizontalCoords};
use crate::transform::{horizontal_position, observer_frame};
use crate::{MoonData, ObserverLocation, VisibilityError};
use chrono::{DateTime, Utc};

/// Phase from the Sun–Moon–Earth angle (0° full, 180° new): `(1 + cos φ) / 4`.
///
/// ```
/// use sky_visibility_lib::lunar::moon_phase_from_angle;
///
/// assert_eq!(moon_phase_from_angle(0.0), 0.5);
/// assert!(moon_phase_from_angle(180.0).abs() < 1e-12);
/// ```
pub fn moon_phase_from_angle(phase_angle_deg: f64) -> f64 {
    (1.0 + phase_angle_deg.to_radians().cos()) / 4.0
}

/// Degree-space distance between two horizontal positions (no azimuth wrap).
pub fn flat_separation(a: &HorizontalCoords, b: &HorizontalCoords) -> f64 {
    (a.altitude - b.altitude).hypot(a.azimuth - b.azimuth)
}

/// The Moon at `time` for `observer`, optionally measured against a target position.
pub fn moon_at<E: Ephemeris + ?Sized>(
    provider: &E,
    observer: &ObserverLocation,
    time: DateTime<Utc>,
    target: Option<HorizontalCoords>,
) -> Result<MoonData, VisibilityError> {
    let frame = observer_frame(provider, observer);
    let position = provider.body_position(Body::Moon, time, &frame)?;
    let moon = horizontal_position(provider, &frame, time, position)?;
    let lit = provider.moon_illumination(time)?;

    let distance = target.map_or(0.0, |t| flat_separation(&moon, &t));

    Ok(MoonData {
        altitude: moon.altitude,
        azimuth: moon.azimuth,
        phase: moon_phase_from_angle(lit.phase_angle_deg),
        illumination: lit.phase_fraction * 100.0,
        distance,
    })
}
