//! # Tonight's Best
//!
//! Batch ranking of many targets for one night. Each target's windows are
//! computed on tokio's blocking pool; the engine calls are pure, so they need no
//! coordination beyond sharing the provider behind an `Arc`.
//!
//! Targets are ordered best-first: highest average window quality, then highest
//! peak altitude. Targets without any window keep their input order at the end.

use crate::ephemeris::Ephemeris;
use crate::observability::{find_best_observation_windows_with, TrailingWindow};
use crate::{BestObservationWindow, ObserverLocation, TargetCoordinates, VisibilityError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use thiserror::Error;

/// Errors from batch planning.
#[derive(Error, Debug)]
pub enum PlannerError {
    /// A visibility computation for one of the targets failed
    #[error("visibility computation failed for {target}: {source}")]
    Visibility {
        target: String,
        #[source]
        source: VisibilityError,
    },

    /// A worker task panicked or was cancelled
    #[error("planner task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// A target with a display name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedTarget {
    pub name: String,
    pub coordinates: TargetCoordinates,
}

/// Windows for one target, plus the one worth leading with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetReport {
    pub name: String,
    pub coordinates: TargetCoordinates,
    pub windows: Vec<BestObservationWindow>,
    pub best_window: Option<BestObservationWindow>,
}

/// The window with the best average quality, ties going to the higher peak.
pub fn best_window(windows: &[BestObservationWindow]) -> Option<BestObservationWindow> {
    windows.iter().copied().fold(None, |best, window| match best {
        Some(b) if compare_windows(&b, &window) != Ordering::Less => Some(b),
        _ => Some(window),
    })
}

fn compare_windows(a: &BestObservationWindow, b: &BestObservationWindow) -> Ordering {
    a.average_quality
        .cmp(&b.average_quality)
        .then_with(|| a.peak_altitude.total_cmp(&b.peak_altitude))
}

/// Sort reports best-first. Stable, so reports without windows keep input order.
pub fn sort_reports(reports: &mut [TargetReport]) {
    reports.sort_by(|a, b| match (&a.best_window, &b.best_window) {
        (Some(wa), Some(wb)) => compare_windows(wb, wa),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Compute and rank windows for every target on the night starting on `date`.
pub async fn rank_tonight<E>(
    provider: Arc<E>,
    observer: ObserverLocation,
    targets: Vec<NamedTarget>,
    date: NaiveDate,
    trailing: TrailingWindow,
) -> Result<Vec<TargetReport>, PlannerError>
where
    E: Ephemeris + Send + Sync + 'static,
{
    log::debug!(
        "ranking {} targets for the night of {} at ({:.3}, {:.3})",
        targets.len(),
        date,
        observer.latitude,
        observer.longitude
    );

    let handles: Vec<_> = targets
        .into_iter()
        .map(|target| {
            let provider = Arc::clone(&provider);
            tokio::task::spawn_blocking(move || {
                let windows = find_best_observation_windows_with(
                    provider.as_ref(),
                    &target.coordinates,
                    &observer,
                    date,
                    trailing,
                );
                (target, windows)
            })
        })
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        let (target, windows) = handle.await?;
        let windows = windows.map_err(|source| PlannerError::Visibility {
            target: target.name.clone(),
            source,
        })?;
        log::debug!("{}: {} window(s)", target.name, windows.len());

        reports.push(TargetReport {
            best_window: best_window(&windows),
            name: target.name,
            coordinates: target.coordinates,
            windows,
        });
    }

    sort_reports(&mut reports);
    Ok(reports)
}
