use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::constants::*;
use crate::output::PoiStyle;
use crate::staleness::Thresholds;
use crate::validate;

/// APRS to Navit bridge configuration
///
/// Reads the Dire Wolf CSV log, keeps the latest position per station, writes
/// a Navit POI file, and prints a mock NMEA fix to stdout for Navit to pipe in.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Map center latitude in decimal degrees (negative is south).
    #[arg(long, default_value_t = DEFAULT_LATITUDE, value_parser = parse_latitude, allow_negative_numbers = true)]
    pub latitude: f64,

    /// Map center longitude in decimal degrees (negative is west).
    #[arg(long, default_value_t = DEFAULT_LONGITUDE, value_parser = parse_longitude, allow_negative_numbers = true)]
    pub longitude: f64,

    /// Dire Wolf CSV log to read.
    #[arg(long, value_name = "FILE", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Navit POI file to write.
    #[arg(long, value_name = "FILE", default_value = DEFAULT_POI_FILE)]
    pub poi_file: PathBuf,

    /// Icon for stations heard recently.
    #[arg(long, value_name = "FILE", default_value = DEFAULT_ACTIVE_ICON)]
    pub active_icon: String,

    /// Icon for stations that went quiet.
    #[arg(long, value_name = "FILE", default_value = DEFAULT_INACTIVE_ICON)]
    pub inactive_icon: String,

    /// Seconds between log reads and POI file rewrites.
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_REFRESH_SECS, value_parser = parse_period)]
    pub refresh_secs: f64,

    /// Seconds between mock GPS sentences.
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_GPS_REFRESH_SECS, value_parser = parse_period)]
    pub gps_refresh_secs: f64,

    /// Minutes without a report before a station is drawn inactive, -1 to disable
    #[arg(long, value_name = "MINUTES", default_value_t = DEFAULT_MINUTES_UNTIL_INACTIVE, value_parser = parse_minutes, allow_negative_numbers = true)]
    pub minutes_until_inactive: i64,

    /// Minutes without a report before a station is removed, -1 to disable (stations then accumulate forever)
    #[arg(long, value_name = "MINUTES", default_value_t = DEFAULT_MINUTES_UNTIL_REMOVED, value_parser = parse_minutes, allow_negative_numbers = true)]
    pub minutes_until_removed: i64,

    /// Append the APRS comment to each station label.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub show_comment: bool,

    /// Truncate the log after each read. Disable only if something else rotates it (logrotate, cron).
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub clear_log_after_reading: bool,

    /// Run a single maintenance cycle and exit, without the GPS stream.
    #[arg(long, default_value_t = false)]
    pub once: bool,

    /// Verbose logging (DEBUG level)
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds::from_minutes(self.minutes_until_inactive, self.minutes_until_removed)
    }

    pub fn poi_style(&self) -> PoiStyle {
        PoiStyle {
            active_icon: self.active_icon.clone(),
            inactive_icon: self.inactive_icon.clone(),
            show_comment: self.show_comment,
        }
    }

    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs_f64(self.refresh_secs)
    }

    pub fn gps_period(&self) -> Duration {
        Duration::from_secs_f64(self.gps_refresh_secs)
    }
}

fn parse_latitude(s: &str) -> Result<f64, String> {
    validate::parse_latitude(Some(s)).ok_or_else(|| "must be a number strictly between -90 and 90".to_string())
}

fn parse_longitude(s: &str) -> Result<f64, String> {
    validate::parse_longitude(Some(s)).ok_or_else(|| "must be a number strictly between -180 and 180".to_string())
}

fn parse_minutes(s: &str) -> Result<i64, String> {
    let value: i64 = s.parse().map_err(|e| format!("{}", e))?;
    if (-1..=MAX_THRESHOLD_MINUTES).contains(&value) {
        Ok(value)
    } else {
        Err(format!("must be -1 (disabled) or between 0 and {}", MAX_THRESHOLD_MINUTES))
    }
}

fn parse_period(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{}", e))?;
    // Also bounds Duration::from_secs_f64, which panics on negative or huge input.
    if value > 0.0 && value < 1e9 {
        Ok(value)
    } else {
        Err("must be a positive number of seconds".to_string())
    }
}
