//! # Sky Visibility Application Entry Point
//!
//! This binary ranks the configured targets for one night at the configured
//! site and prints the result as a table or as JSON, optionally followed by an
//! altitude chart per target.

// Test modules
#[cfg(test)]
mod tests;

use anyhow::{anyhow, Context};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::env;
use std::sync::Arc;

use sky_visibility_lib::almanac::Almanac;
use sky_visibility_lib::config::{Config, CONFIG_FILE};
use sky_visibility_lib::night::{night_bounds, night_of, night_series, NightBounds};
use sky_visibility_lib::observability::TrailingWindow;
use sky_visibility_lib::planner::{rank_tonight, TargetReport};
use sky_visibility_lib::renderer::draw_ascii;
use sky_visibility_lib::ObserverLocation;

const USAGE: &str = "usage: sky-visibility [--config PATH] [--date YYYY-MM-DD] [--chart] \
                     [--json] [--close-trailing] [--init-config]";

/// Command line options
#[derive(Debug, Default, PartialEq)]
struct Options {
    config_path: Option<String>,
    date: Option<NaiveDate>,
    chart: bool,
    json: bool,
    close_trailing: bool,
    init_config: bool,
    help: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Options> {
    let mut options = Options::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                options.config_path = Some(args.next().context("--config needs a path")?);
            }
            "--date" => {
                let value = args.next().context("--date needs YYYY-MM-DD")?;
                let date = NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                    .with_context(|| format!("invalid date: {}", value))?;
                options.date = Some(date);
            }
            "--chart" => options.chart = true,
            "--json" => options.json = true,
            "--close-trailing" => options.close_trailing = true,
            "--init-config" => options.init_config = true,
            "-h" | "--help" => options.help = true,
            other => return Err(anyhow!("unknown argument: {}\n{}", other, USAGE)),
        }
    }

    Ok(options)
}

/// Configuration from `--config`, or from sky-config.toml in the working directory.
fn load_config(options: &Options) -> Config {
    match &options.config_path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    }
}

/// Everything printed by `--json`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NightReport<'a> {
    site: &'a str,
    date: NaiveDate,
    observer: ObserverLocation,
    night: Option<NightBounds>,
    targets: &'a [TargetReport],
}

fn print_table(site: &str, date: NaiveDate, night: Option<NightBounds>, reports: &[TargetReport]) {
    println!("Night of {} at {}", date, site);
    match night {
        Some(bounds) => println!(
            "Sunset {} UTC, sunrise {} UTC",
            bounds.sunset.format("%Y-%m-%d %H:%M"),
            bounds.sunrise.format("%Y-%m-%d %H:%M")
        ),
        None => println!("The Sun does not set and rise again on this date"),
    }
    println!();
    println!(
        "{:<20} {:<13} {:>8} {:>7} {:<10}",
        "Target", "Window (UTC)", "Windows", "Peak", "Quality"
    );

    for report in reports {
        match &report.best_window {
            Some(best) => println!(
                "{:<20} {:<13} {:>8} {:>6.1}° {:<10}",
                report.name,
                format!("{}-{}", best.start.format("%H:%M"), best.end.format("%H:%M")),
                report.windows.len(),
                best.peak_altitude,
                best.average_quality
            ),
            None => println!("{:<20} {:<13} {:>8}", report.name, "none", 0),
        }
    }
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    let _logger = flexi_logger::Logger::try_with_env_or_str("info")?
        .log_to_stderr()
        .start()?;

    let options = parse_args(env::args().skip(1))?;
    if options.help {
        println!("{}", USAGE);
        return Ok(());
    }

    if options.init_config {
        let config_path = options.config_path.as_deref().unwrap_or(CONFIG_FILE);
        Config::default()
            .save_to_path(config_path)
            .map_err(|e| anyhow!("failed to write {}: {}", config_path, e))?;
        return Ok(());
    }

    let config = load_config(&options);
    let observer = config
        .observer
        .to_location()
        .context("invalid observer in configuration")?;
    let targets = config
        .named_targets()
        .context("invalid target in configuration")?;
    let trailing = if options.close_trailing {
        TrailingWindow::Close
    } else {
        config.sampling.trailing_window
    };
    let date = options
        .date
        .unwrap_or_else(|| night_of(Utc::now(), observer.longitude));

    let provider = Arc::new(Almanac);
    let night = night_bounds(provider.as_ref(), &observer, date)?;
    if night.is_none() {
        log::warn!("No sunset/sunrise pair for {} on {}", config.observer.name, date);
    }

    // Create Tokio runtime for the per-target workers
    let rt = tokio::runtime::Runtime::new()?;
    let reports = rt
        .block_on(rank_tonight(
            Arc::clone(&provider),
            observer,
            targets,
            date,
            trailing,
        ))
        .context("ranking targets")?;

    if options.json {
        let report = NightReport {
            site: &config.observer.name,
            date,
            observer,
            night,
            targets: &reports,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_table(&config.observer.name, date, night, &reports);
    }

    if options.chart && !options.json {
        for report in &reports {
            let series = night_series(
                provider.as_ref(),
                &report.coordinates,
                &observer,
                date,
                config.sampling.interval_minutes,
            )
            .with_context(|| format!("sampling {}", report.name))?;
            println!();
            println!("{}", report.name);
            draw_ascii(&series, &report.windows);
        }
    }

    Ok(())
}
