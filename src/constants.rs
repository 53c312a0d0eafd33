// Shared constants for the bridge (log schema, POI format, mock fix block)

/// Dire Wolf CSV log field names, in column order.
/// Only update these if Dire Wolf changes its log layout.
pub const LOG_FIELD_NAMES: [&str; 22] = [
    "chan", "utime", "isotime", "source", "heard", "level", "error", "dti", "name", "symbol",
    "latitude", "longitude", "speed", "course", "altitude", "frequency", "offset", "tone",
    "system", "status", "telemetry", "comment",
];

/// Column index of `isotime` in the log.
pub const FIELD_ISOTIME: usize = 2;
/// Column index of `source` in the log.
pub const FIELD_SOURCE: usize = 3;
/// Column index of `latitude` in the log.
pub const FIELD_LATITUDE: usize = 10;
/// Column index of `longitude` in the log.
pub const FIELD_LONGITUDE: usize = 11;
/// Column index of `comment` in the log.
pub const FIELD_COMMENT: usize = 21;

/// Header token of the source column. A row carrying it is a header row, not data.
pub const SOURCE_HEADER_TOKEN: &str = LOG_FIELD_NAMES[FIELD_SOURCE];

/// Navit POI category written into every line's `type` attribute.
pub const POI_TYPE: &str = "poi_custom0";

/// Separator between source and comment in a POI label (an m-dash).
pub const LABEL_COMMENT_SEPARATOR: &str = " \u{2014} ";

/// NMEA talker + sentence id of the mock fix.
pub const NMEA_FIX_TAG: &str = "GPGGA";

/// Fix quality, satellites in use, HDOP, altitude and geoid separation of the mock fix.
/// Trailing empty fields are DGPS age and station id.
pub const NMEA_FIX_TAIL: &str = "1,12,1.0,0.0,M,0.0,M,,";

// --- Defaults (roughly Phoenix Sky Harbor, Raspberry Pi install paths) ---

pub const DEFAULT_LATITUDE: f64 = 33.435;
pub const DEFAULT_LONGITUDE: f64 = -112.00833334;

pub const DEFAULT_LOG_FILE: &str = "/home/pi/aprs.log";
pub const DEFAULT_POI_FILE: &str = "/home/pi/.navit/aprs_poi.txt";
pub const DEFAULT_ACTIVE_ICON: &str = "/home/pi/dire_wolf_to_navit/icons/gprs_active.png";
pub const DEFAULT_INACTIVE_ICON: &str = "/home/pi/dire_wolf_to_navit/icons/gprs_inactive.png";

/// Maintenance (ingest/evict/write) cadence in seconds.
pub const DEFAULT_REFRESH_SECS: f64 = 30.0;

/// Mock GPS cadence in seconds. Navit's own refresh setting also limits the redraw rate.
pub const DEFAULT_GPS_REFRESH_SECS: f64 = 0.05;

pub const DEFAULT_MINUTES_UNTIL_INACTIVE: i64 = 5;
pub const DEFAULT_MINUTES_UNTIL_REMOVED: i64 = 60;

/// Largest accepted threshold, about a century.
pub const MAX_THRESHOLD_MINUTES: i64 = 52_596_000;
