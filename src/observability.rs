//! # Observability Ranker
//!
//! Turns positions into verdicts. A single instant gets an [`ObservabilityCheck`];
//! a whole night gets its list of [`BestObservationWindow`]s.
//!
//! ## Quality Buckets
//! Only a sample that is above the horizon and clear of the Moon can score above
//! `poor`. From there, with strict comparisons throughout:
//!
//! | altitude | extra condition       | quality     |
//! |----------|-----------------------|-------------|
//! | > 60°    | illumination < 50 %   | `excellent` |
//! | > 45°    |                       | `good`      |
//! | > 30°    |                       | `fair`      |
//! | else     |                       | `poor`      |
//!
//! ## Windows
//! Windows are built from a 15-minute night series. A window opens on a sample
//! that is visible and above 30°, and closes on the first sample that is not.
//! A window still open at the last sample of the night is dropped unless the
//! caller asks for [`TrailingWindow::Close`].

use crate::ephemeris::{Ephemeris, HorizontalCoords};
use crate::lunar::moon_at;
use crate::night::night_series;
use crate::transform::alt_az;
use crate::{
    AltitudeData, BestObservationWindow, ObservabilityCheck, ObservationQuality,
    ObserverLocation, TargetCoordinates, VisibilityError,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Sampling cadence used when searching for windows.
pub const WINDOW_INTERVAL_MINUTES: u32 = 15;

/// Minimum Moon separation, degrees.
pub const MOON_SAFE_DISTANCE_DEG: f64 = 30.0;

/// Altitude a sample must exceed to belong to a window.
pub const WINDOW_MIN_ALTITUDE_DEG: f64 = 30.0;

const EXCELLENT_ALTITUDE_DEG: f64 = 60.0;
const EXCELLENT_MAX_ILLUMINATION: f64 = 50.0;
const GOOD_ALTITUDE_DEG: f64 = 45.0;
const FAIR_ALTITUDE_DEG: f64 = 30.0;

/// What to do with a window that is still open when the samples run out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingWindow {
    /// Discard it; the night ends without emitting the window.
    #[default]
    Drop,
    /// Emit it, ending at the last sample.
    Close,
}

/// Quality bucket for one sample.
pub fn classify_quality(
    altitude: f64,
    moon_illumination: f64,
    is_visible: bool,
    is_moon_safe: bool,
) -> ObservationQuality {
    if !(is_visible && is_moon_safe) {
        return ObservationQuality::Poor;
    }

    if altitude > EXCELLENT_ALTITUDE_DEG && moon_illumination < EXCELLENT_MAX_ILLUMINATION {
        ObservationQuality::Excellent
    } else if altitude > GOOD_ALTITUDE_DEG {
        ObservationQuality::Good
    } else if altitude > FAIR_ALTITUDE_DEG {
        ObservationQuality::Fair
    } else {
        ObservationQuality::Poor
    }
}

/// Moon is far enough away, or below the horizon.
pub fn is_moon_safe(moon_distance: f64, moon_altitude: f64) -> bool {
    moon_distance > MOON_SAFE_DISTANCE_DEG || moon_altitude < 0.0
}

/// Check a sample that was already computed by the coordinate transform.
pub fn check_sample<E: Ephemeris + ?Sized>(
    provider: &E,
    observer: &ObserverLocation,
    sample: &AltitudeData,
) -> Result<ObservabilityCheck, VisibilityError> {
    let target = HorizontalCoords {
        altitude: sample.altitude,
        azimuth: sample.azimuth,
    };
    let moon = moon_at(provider, observer, sample.time, Some(target))?;

    let is_visible = sample.altitude > 0.0;
    let moon_safe = is_moon_safe(moon.distance, moon.altitude);

    Ok(ObservabilityCheck {
        is_visible,
        is_moon_safe: moon_safe,
        altitude: sample.altitude,
        moon_distance: moon.distance,
        moon_illumination: moon.illumination,
        quality: classify_quality(sample.altitude, moon.illumination, is_visible, moon_safe),
    })
}

/// Is `target` observable from `observer` at `time`, and how well?
pub fn check_observability<E: Ephemeris + ?Sized>(
    provider: &E,
    target: &TargetCoordinates,
    observer: &ObserverLocation,
    time: DateTime<Utc>,
) -> Result<ObservabilityCheck, VisibilityError> {
    let sample = alt_az(provider, target, observer, time)?;
    check_sample(provider, observer, &sample)
}

/// Contiguous windows above 30° for the night starting on `date`.
///
/// A window that has not closed by the end of the night is dropped.
pub fn find_best_observation_windows<E: Ephemeris + ?Sized>(
    provider: &E,
    target: &TargetCoordinates,
    observer: &ObserverLocation,
    date: NaiveDate,
) -> Result<Vec<BestObservationWindow>, VisibilityError> {
    find_best_observation_windows_with(provider, target, observer, date, TrailingWindow::Drop)
}

/// [`find_best_observation_windows`] with an explicit trailing-window policy.
pub fn find_best_observation_windows_with<E: Ephemeris + ?Sized>(
    provider: &E,
    target: &TargetCoordinates,
    observer: &ObserverLocation,
    date: NaiveDate,
    trailing: TrailingWindow,
) -> Result<Vec<BestObservationWindow>, VisibilityError> {
    let series = night_series(provider, target, observer, date, WINDOW_INTERVAL_MINUTES)?;

    let checked = series
        .iter()
        .map(|sample| -> Result<_, VisibilityError> {
            Ok((sample.time, check_sample(provider, observer, sample)?))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(aggregate_windows(&checked, trailing))
}

fn opens_window(check: &ObservabilityCheck) -> bool {
    check.is_visible && check.altitude > WINDOW_MIN_ALTITUDE_DEG
}

/// Group time-ordered checks into windows.
pub fn aggregate_windows(
    samples: &[(DateTime<Utc>, ObservabilityCheck)],
    trailing: TrailingWindow,
) -> Vec<BestObservationWindow> {
    let mut windows = Vec::new();
    let mut open: Option<usize> = None;

    for (index, (time, check)) in samples.iter().enumerate() {
        match (open, opens_window(check)) {
            (None, true) => open = Some(index),
            (Some(start), false) => {
                windows.push(summarize(&samples[start..index], *time));
                open = None;
            }
            _ => {}
        }
    }

    if let (Some(start), TrailingWindow::Close) = (open, trailing) {
        if let Some((last_time, _)) = samples.last() {
            windows.push(summarize(&samples[start..], *last_time));
        }
    }

    windows
}

fn summarize(
    run: &[(DateTime<Utc>, ObservabilityCheck)],
    end: DateTime<Utc>,
) -> BestObservationWindow {
    let (start, _) = run[0];

    let (peak_time, peak_altitude) = run.iter().fold(
        (run[0].0, run[0].1.altitude),
        |(best_time, best_alt), (time, check)| {
            if check.altitude > best_alt {
                (*time, check.altitude)
            } else {
                (best_time, best_alt)
            }
        },
    );

    let total: f64 = run.iter().map(|(_, check)| check.quality.score()).sum();
    let average = total / run.len() as f64;

    BestObservationWindow {
        start,
        end,
        peak_time,
        peak_altitude,
        average_quality: ObservationQuality::from_average_score(average),
    }
}
