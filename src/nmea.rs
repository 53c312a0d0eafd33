// NMEA 0183 encoding for the mock GPS fix
//
// Coordinates go out as ddmm.mmmmmm (latitude) / dddmm.mmmmmm (longitude)
// followed by a hemisphere letter. Six fractional minute digits is well
// below a metre, more than any consumer needs.

use chrono::{DateTime, Utc};

use crate::constants::{NMEA_FIX_TAG, NMEA_FIX_TAIL};

/// Which coordinate is being encoded; decides degree width and hemisphere letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    fn degree_digits(self) -> usize {
        match self {
            Axis::Latitude => 2,
            Axis::Longitude => 3,
        }
    }

    fn hemisphere(self, negative: bool) -> char {
        match (self, negative) {
            (Axis::Latitude, false) => 'N',
            (Axis::Latitude, true) => 'S',
            (Axis::Longitude, false) => 'E',
            (Axis::Longitude, true) => 'W',
        }
    }
}

/// Encode signed decimal degrees as `{degrees}{minutes:09.6},{hemisphere}`.
///
/// Degrees are zero-padded to the fixed NMEA widths, `dd` for latitude and
/// `ddd` for longitude, so `5.5` N encodes as `0530.000000,N` rather than the
/// unpadded `530.000000,N`. Centers with two-digit latitude and three-digit
/// longitude degrees encode the same either way.
pub fn encode_coordinate(decimal_degrees: f64, axis: Axis) -> String {
    let unsigned = decimal_degrees.abs();
    let mut degrees = unsigned.floor();
    let mut minutes = format!("{:09.6}", (unsigned - degrees) * 60.0);

    // 59.9999997' rounds up to 60.000000'; carry it into the degrees.
    if minutes.starts_with("60") {
        degrees += 1.0;
        minutes = format!("{:09.6}", 0.0);
    }

    format!(
        "{:0width$}{},{}",
        degrees as u32,
        minutes,
        axis.hemisphere(decimal_degrees < 0.0),
        width = axis.degree_digits()
    )
}

/// XOR of every byte of the sentence body (the text between `$` and `*`).
pub fn checksum(body: &str) -> u8 {
    body.bytes().fold(0u8, |acc, b| acc ^ b)
}

/// Checksum rendered as two uppercase hex digits.
pub fn checksum_hex(body: &str) -> String {
    format!("{:02X}", checksum(body))
}

/// Build a complete `$GPGGA` fix sentence for a fixed position at `time`.
///
/// Quality, satellite count, HDOP and altitude are fixed values; the consumer
/// only needs a well-formed, steadily repeating fix.
pub fn encode_fix(latitude: f64, longitude: f64, time: DateTime<Utc>) -> String {
    let body = format!(
        "{},{},{},{},{}",
        NMEA_FIX_TAG,
        time.format("%H%M%S"),
        encode_coordinate(latitude, Axis::Latitude),
        encode_coordinate(longitude, Axis::Longitude),
        NMEA_FIX_TAIL
    );
    format!("${}*{}", body, checksum_hex(&body))
}
