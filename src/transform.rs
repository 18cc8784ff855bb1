//! Equatorial → horizontal conversion for fixed targets, with airmass.

use crate::ephemeris::{Ephemeris, EquatorialCoords, HorizontalCoords, ObserverFrame};
use crate::{AltitudeData, ObserverLocation, TargetCoordinates, VisibilityError};
use chrono::{DateTime, Utc};

/// Airmass reported at or below [`AIRMASS_MIN_ALTITUDE_DEG`].
pub const AIRMASS_SENTINEL: f64 = 999.0;

/// Lowest altitude (exclusive) at which the secant airmass is computed.
pub const AIRMASS_MIN_ALTITUDE_DEG: f64 = 10.0;

/// Plane-parallel airmass, `sec(z)`, or the sentinel near the horizon.
///
/// ```
/// use sky_visibility_lib::transform::{airmass, AIRMASS_SENTINEL};
///
/// assert_eq!(airmass(90.0), 1.0);
/// assert_eq!(airmass(10.0), AIRMASS_SENTINEL);
/// ```
pub fn airmass(altitude_deg: f64) -> f64 {
    if altitude_deg > AIRMASS_MIN_ALTITUDE_DEG {
        let zenith_angle = (90.0 - altitude_deg).to_radians();
        1.0 / zenith_angle.cos()
    } else {
        AIRMASS_SENTINEL
    }
}

/// Observer frame for a location, built through the provider.
pub fn observer_frame<E: Ephemeris + ?Sized>(
    provider: &E,
    observer: &ObserverLocation,
) -> ObserverFrame {
    provider.observer_frame(observer.latitude, observer.longitude, observer.elevation)
}

/// Apparent RA/Dec → altitude/azimuth. Shared by targets and the Moon.
pub fn horizontal_position<E: Ephemeris + ?Sized>(
    provider: &E,
    frame: &ObserverFrame,
    time: DateTime<Utc>,
    position: EquatorialCoords,
) -> Result<HorizontalCoords, VisibilityError> {
    provider.horizontal(time, frame, position)
}

/// Where a fixed target sits in the observer's sky at `time`.
///
/// The target is treated as a star at infinite distance: its J2000 place is
/// carried to the apparent place of date by the provider, then converted to
/// horizontal coordinates. Inputs are not validated here.
pub fn alt_az<E: Ephemeris + ?Sized>(
    provider: &E,
    target: &TargetCoordinates,
    observer: &ObserverLocation,
    time: DateTime<Utc>,
) -> Result<AltitudeData, VisibilityError> {
    let frame = observer_frame(provider, observer);
    alt_az_in_frame(provider, target, &frame, time)
}

/// [`alt_az`] for callers that already hold a frame (the night sampler).
pub fn alt_az_in_frame<E: Ephemeris + ?Sized>(
    provider: &E,
    target: &TargetCoordinates,
    frame: &ObserverFrame,
    time: DateTime<Utc>,
) -> Result<AltitudeData, VisibilityError> {
    let apparent = provider.equatorial_to_apparent(target.ra_hours(), target.dec_deg, time, frame)?;
    let horizontal = horizontal_position(provider, frame, time, apparent)?;

    Ok(AltitudeData {
        time,
        altitude: horizontal.altitude,
        azimuth: horizontal.azimuth,
        airmass: airmass(horizontal.altitude),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::almanac::Almanac;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_airmass_boundary() {
        assert_eq!(airmass(10.0), AIRMASS_SENTINEL);
        assert_eq!(airmass(-5.0), AIRMASS_SENTINEL);

        let just_above = airmass(10.0001);
        assert!(just_above.is_finite());
        assert!(just_above < AIRMASS_SENTINEL);
        // sec(79.9999°) ≈ 5.7587
        assert!((just_above - 5.7587).abs() < 1e-3);
    }

    #[test]
    fn test_airmass_values() {
        assert!((airmass(90.0) - 1.0).abs() < 1e-12);
        assert!((airmass(30.0) - 2.0).abs() < 1e-9);
        assert!(airmass(45.0) > airmass(60.0));
    }

    #[test]
    fn test_polaris_altitude_tracks_latitude() {
        let observer = ObserverLocation {
            latitude: 40.0,
            longitude: -105.0,
            elevation: 1600.0,
        };
        let polaris = TargetCoordinates {
            ra_deg: 37.954_56,
            dec_deg: 89.264_11,
        };
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        for hour in 0..24 {
            let time = start + Duration::hours(hour);
            let data = alt_az(&Almanac, &polaris, &observer, time).unwrap();
            assert!(
                (data.altitude - 40.0).abs() < 1.0,
                "Polaris altitude {} at {}",
                data.altitude,
                time
            );
            assert!(data.azimuth < 2.0 || data.azimuth > 358.0);
            assert!((0.0..360.0).contains(&data.azimuth));
            assert_eq!(data.time, time);
        }
    }

    #[test]
    fn test_target_transits_south_of_zenith() {
        // Sirius from 40°N peaks around 90 - 40 - 16.7 = 33.3° due south
        let observer = ObserverLocation {
            latitude: 40.0,
            longitude: 0.0,
            elevation: 0.0,
        };
        let sirius = TargetCoordinates {
            ra_deg: 101.287_15,
            dec_deg: -16.716_12,
        };
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();

        let peak = (0..24 * 12)
            .map(|step| start + Duration::minutes(step * 5))
            .map(|time| alt_az(&Almanac, &sirius, &observer, time).unwrap())
            .fold(None::<AltitudeData>, |best, sample| match best {
                Some(b) if b.altitude >= sample.altitude => Some(b),
                _ => Some(sample),
            })
            .unwrap();

        assert!((peak.altitude - 33.3).abs() < 0.5, "peak {}", peak.altitude);
        assert!((peak.azimuth - 180.0).abs() < 2.0, "azimuth {}", peak.azimuth);
        assert_eq!(peak.airmass, 1.0 / (90.0 - peak.altitude).to_radians().cos());
    }

    #[test]
    fn test_alt_az_is_idempotent() {
        let observer = ObserverLocation {
            latitude: -33.86,
            longitude: 151.21,
            elevation: 58.0,
        };
        let target = TargetCoordinates {
            ra_deg: 83.822,
            dec_deg: -5.391,
        };
        let time = Utc.with_ymd_and_hms(2024, 12, 1, 12, 30, 0).unwrap();

        let first = alt_az(&Almanac, &target, &observer, time).unwrap();
        let second = alt_az(&Almanac, &target, &observer, time).unwrap();
        assert_eq!(first.altitude.to_bits(), second.altitude.to_bits());
        assert_eq!(first.azimuth.to_bits(), second.azimuth.to_bits());
        assert_eq!(first.airmass.to_bits(), second.airmass.to_bits());
    }
}
