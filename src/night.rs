//! # Night Sampler
//!
//! Builds the altitude/azimuth series of a target across one night, from sunset
//! to sunrise. "Sunset" and "sunrise" here are the instants the Sun's centre
//! crosses -1°, a little after geometric sunset, which is closer to the start of
//! usable darkness than the true horizon.
//!
//! When the Sun does not set (or does not rise again) within a day of the search
//! start, as in polar summer or winter, the series is empty. Callers read that as
//! "no data for this night", not as a failure.

use crate::ephemeris::{Body, Ephemeris, ObserverFrame, RiseSetDirection};
use crate::transform::{alt_az_in_frame, observer_frame};
use crate::{AltitudeData, ObserverLocation, TargetCoordinates, VisibilityError};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Default sampling cadence for night series.
pub const DEFAULT_INTERVAL_MINUTES: u32 = 30;

/// Solar altitude that marks sunset and sunrise.
pub const SUN_HORIZON_OFFSET_DEG: f64 = -1.0;

/// Sunset and the following sunrise.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NightBounds {
    pub sunset: DateTime<Utc>,
    pub sunrise: DateTime<Utc>,
}

impl NightBounds {
    pub fn duration(&self) -> Duration {
        self.sunrise - self.sunset
    }
}

/// Approximate local noon of `date`: 12:00 UTC shifted by the observer's longitude.
pub fn local_noon(date: NaiveDate, longitude: f64) -> DateTime<Utc> {
    let utc_noon = date.and_hms_opt(12, 0, 0).unwrap_or_default().and_utc();
    utc_noon - Duration::seconds((longitude / 15.0 * 3600.0).round() as i64)
}

/// The date whose night is under way (or next to come) at `now`.
///
/// Local solar time is shifted back by 12 hours, so the date changes at local
/// noon rather than at midnight UTC. An evening and the small hours after it
/// both map to the date the night began on.
pub fn night_of(now: DateTime<Utc>, longitude: f64) -> NaiveDate {
    let local_solar = now + Duration::seconds((longitude / 15.0 * 3600.0).round() as i64);
    (local_solar - Duration::hours(12)).date_naive()
}

/// Sunset on `date` and the sunrise that ends that night.
///
/// Returns `Ok(None)` when either event does not happen within a day of the search.
pub fn night_bounds<E: Ephemeris + ?Sized>(
    provider: &E,
    observer: &ObserverLocation,
    date: NaiveDate,
) -> Result<Option<NightBounds>, VisibilityError> {
    let frame = observer_frame(provider, observer);
    bounds_in_frame(provider, &frame, date, observer.longitude)
}

fn bounds_in_frame<E: Ephemeris + ?Sized>(
    provider: &E,
    frame: &ObserverFrame,
    date: NaiveDate,
    longitude: f64,
) -> Result<Option<NightBounds>, VisibilityError> {
    let search_start = local_noon(date, longitude);

    let Some(sunset) = provider.rise_set(
        Body::Sun,
        frame,
        RiseSetDirection::Set,
        search_start,
        SUN_HORIZON_OFFSET_DEG,
    )?
    else {
        return Ok(None);
    };

    let Some(sunrise) = provider.rise_set(
        Body::Sun,
        frame,
        RiseSetDirection::Rise,
        sunset,
        SUN_HORIZON_OFFSET_DEG,
    )?
    else {
        return Ok(None);
    };

    Ok(Some(NightBounds { sunset, sunrise }))
}

/// Sample instants from sunset to sunrise.
///
/// Starts exactly at sunset and steps by `interval_minutes`; the step count is
/// rounded up over whole minutes of night, so the last instant can land up to
/// `interval_minutes - 1` minutes after sunrise.
pub fn sample_times(bounds: &NightBounds, interval_minutes: u32) -> Vec<DateTime<Utc>> {
    let interval = i64::from(interval_minutes.max(1));
    let total = bounds.duration().num_minutes().max(0);
    let steps = (total + interval - 1) / interval;

    (0..=steps)
        .map(|i| bounds.sunset + Duration::minutes(i * interval))
        .collect()
}

/// Altitude series of `target` over the night that starts on `date`.
///
/// An empty `Vec` means the Sun did not set or rise; a zero interval is rejected.
pub fn night_series<E: Ephemeris + ?Sized>(
    provider: &E,
    target: &TargetCoordinates,
    observer: &ObserverLocation,
    date: NaiveDate,
    interval_minutes: u32,
) -> Result<Vec<AltitudeData>, VisibilityError> {
    if interval_minutes == 0 {
        return Err(VisibilityError::InvalidInput(
            "interval_minutes must be at least 1".to_string(),
        ));
    }

    let frame = observer_frame(provider, observer);
    let Some(bounds) = bounds_in_frame(provider, &frame, date, observer.longitude)? else {
        return Ok(Vec::new());
    };

    sample_times(&bounds, interval_minutes)
        .into_iter()
        .map(|time| alt_az_in_frame(provider, target, &frame, time))
        .collect()
}
