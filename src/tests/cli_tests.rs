//! Command line parsing tests.

use crate::{load_config, parse_args, Options};
use chrono::NaiveDate;
use sky_visibility_lib::config::Config;
use tempfile::NamedTempFile;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// No arguments means defaults everywhere.
#[test]
fn empty_arguments_give_defaults() {
    let options = parse_args(args(&[])).unwrap();
    assert_eq!(options, Options::default());
}

/// Every flag is recognised and values are taken from the following argument.
#[test]
fn all_flags_are_parsed() {
    let options = parse_args(args(&[
        "--config",
        "site.toml",
        "--date",
        "2024-10-01",
        "--chart",
        "--json",
        "--close-trailing",
    ]))
    .unwrap();

    assert_eq!(options.config_path.as_deref(), Some("site.toml"));
    assert_eq!(options.date, NaiveDate::from_ymd_opt(2024, 10, 1));
    assert!(options.chart && options.json && options.close_trailing);
    assert!(!options.init_config);
}

/// Bad dates, missing values and unknown flags are errors, not silent defaults.
#[test]
fn malformed_arguments_are_rejected() {
    assert!(parse_args(args(&["--date", "2024-13-01"])).is_err());
    assert!(parse_args(args(&["--date"])).is_err());
    assert!(parse_args(args(&["--config"])).is_err());

    let err = parse_args(args(&["--stdout"])).unwrap_err();
    assert!(
        err.to_string().contains("--stdout"),
        "error should name the flag: {}",
        err
    );
}

/// `--config` points the loader at the given file instead of the default one.
#[test]
fn config_flag_selects_the_file() {
    let mut site = Config::default();
    site.observer.name = "Dark Sky Park".to_string();
    site.targets.truncate(1);

    let file = NamedTempFile::new().unwrap();
    site.save_to_path(file.path()).unwrap();

    let path = file.path().to_string_lossy().into_owned();
    let options = parse_args(args(&["--config", &path])).unwrap();
    assert_eq!(load_config(&options), site);
}
