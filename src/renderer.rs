//! # Night Altitude Rendering
//!
//! Draws a target's altitude across the night as a terminal chart. The vertical
//! axis is fixed from the horizon to the zenith so charts of different targets
//! line up; samples below the horizon sit on the bottom row.
//!
//! Legend: `•` altitude sample, `*` sample inside an observation window,
//! `X` peak of a window, `.` target below the horizon.

use crate::{AltitudeData, BestObservationWindow};
use std::fmt::Write;

const ROWS: usize = 19;
const DEGREES_PER_ROW: f64 = 5.0;
const Y_AXIS_WIDTH: usize = 5; // Space for Y-axis labels
const LABEL_EVERY_DEG: f64 = 15.0;
const TIME_MARK_EVERY: usize = 6;

fn altitude_to_row(altitude: f64) -> usize {
    let clamped = altitude.clamp(0.0, 90.0);
    (((90.0 - clamped) / DEGREES_PER_ROW).round() as usize).min(ROWS - 1)
}

fn in_window(sample: &AltitudeData, windows: &[BestObservationWindow]) -> bool {
    windows
        .iter()
        .any(|w| sample.time >= w.start && sample.time < w.end)
}

fn is_peak(sample: &AltitudeData, windows: &[BestObservationWindow]) -> bool {
    windows.iter().any(|w| w.peak_time == sample.time)
}

fn marker(sample: &AltitudeData, windows: &[BestObservationWindow]) -> char {
    if sample.altitude < 0.0 {
        '.'
    } else if is_peak(sample, windows) {
        'X'
    } else if in_window(sample, windows) {
        '*'
    } else {
        '•'
    }
}

/// Render the altitude chart of one night as text.
pub fn render_ascii(series: &[AltitudeData], windows: &[BestObservationWindow]) -> String {
    let mut out = String::new();
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        out.push_str("No dark hours at this site on this date\n");
        return out;
    };

    let sample_count = series.len();
    let mut grid = vec![vec![' '; sample_count + Y_AXIS_WIDTH]; ROWS];

    let mut label_alt = 0.0;
    while label_alt <= 90.0 {
        let row = altitude_to_row(label_alt);
        let label = format!("{:>3}°", label_alt as i32);
        for (i, ch) in label.chars().take(Y_AXIS_WIDTH - 1).enumerate() {
            grid[row][i] = ch;
        }
        label_alt += LABEL_EVERY_DEG;
    }
    for row in grid.iter_mut() {
        row[Y_AXIS_WIDTH - 1] = '│'; // Vertical axis line
    }

    for (column, sample) in series.iter().enumerate() {
        let row = altitude_to_row(sample.altitude);
        grid[row][column + Y_AXIS_WIDTH] = marker(sample, windows);
    }

    for row in grid {
        out.extend(row);
        out.push('\n');
    }

    // Time markers below the chart
    let padding = " ".repeat(Y_AXIS_WIDTH);
    let time_markers: String = (0..sample_count)
        .map(|i| if i % TIME_MARK_EVERY == 0 { '|' } else { ' ' })
        .collect();
    let _ = writeln!(out, "{}{}", padding, time_markers);

    let start = first.time.format("%H:%M").to_string();
    let end = last.time.format("%H:%M").to_string();
    let gap = sample_count.saturating_sub(start.len() + end.len()).max(1);
    let _ = writeln!(out, "{}{}{}{} UTC", padding, start, " ".repeat(gap), end);

    out
}

/// Print the altitude chart of one night to stdout.
pub fn draw_ascii(series: &[AltitudeData], windows: &[BestObservationWindow]) {
    print!("{}", render_ascii(series, windows));
}
