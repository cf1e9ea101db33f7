//! Archive timestamp codec
//!
//! Archives are named `<name>.<stamp>.log.gz` where `<stamp>` is the UTC
//! rotation time as `YYYYMMDDhhmmssffffff`: 20 zero-padded digits with
//! microsecond resolution. The fixed width makes lexical order match
//! chronological order for years 0000 through 9999. Anything finer than a
//! microsecond is truncated on encode, and a time inside a leap second is
//! encoded as the last microsecond of the preceding second.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc};
use logrotate_core::constants;
use once_cell::sync::Lazy;
use regex::Regex;

/// Number of digits in an encoded timestamp
pub const STAMP_WIDTH: usize = 20;

/// `<stem>.<20 digits>.log.gz`
static ARCHIVE_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<stem>.+)\.(?P<stamp>[0-9]{20})\.log\.gz$").expect("Invalid archive name regex")
});

/// `<stem>.<20 digits>.log`
static PRESERVED_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<stem>.+)\.(?P<stamp>[0-9]{20})\.log$").expect("Invalid preserved name regex")
});

/// Encode `time` as a fixed-width sortable stamp
pub fn encode(time: DateTime<Utc>) -> String {
    let time = truncate_to_resolution(time);
    let micros = time.nanosecond() / 1_000;
    format!(
        "{:04}{:02}{:02}{:02}{:02}{:02}{:06}",
        time.year(),
        time.month(),
        time.day(),
        time.hour(),
        time.minute(),
        time.second(),
        micros
    )
}

/// Archive file name for `logical_name` rotated at `time`
pub fn archive_file_name(logical_name: &str, time: DateTime<Utc>) -> String {
    format!("{}.{}{}", logical_name, encode(time), constants::archive_suffix())
}

/// Name given to an uncompressed log kept aside after a failed compression
pub fn preserved_file_name(logical_name: &str, time: DateTime<Utc>) -> String {
    format!("{}.{}.{}", logical_name, encode(time), constants::LOG_EXTENSION)
}

/// Extract the rotation time from an archive file name.
///
/// Returns `None` unless `file_name` is exactly
/// `<logical_name>.<stamp>.log.gz` with a valid calendar stamp.
pub fn decode(file_name: &str, logical_name: &str) -> Option<DateTime<Utc>> {
    let captures = ARCHIVE_NAME_REGEX.captures(file_name)?;
    if &captures["stem"] != logical_name {
        return None;
    }
    parse_stamp(&captures["stamp"])
}

/// Extract the rotation time from a log kept aside by a failed compression
pub fn decode_preserved(file_name: &str, logical_name: &str) -> Option<DateTime<Utc>> {
    let captures = PRESERVED_NAME_REGEX.captures(file_name)?;
    if &captures["stem"] != logical_name {
        return None;
    }
    parse_stamp(&captures["stamp"])
}

fn parse_stamp(stamp: &str) -> Option<DateTime<Utc>> {
    if stamp.len() != STAMP_WIDTH || !stamp.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let field = |range: std::ops::Range<usize>| stamp[range].parse::<u32>().ok();

    let year = field(0..4)? as i32;
    let naive = NaiveDate::from_ymd_opt(year, field(4..6)?, field(6..8)?)?.and_hms_micro_opt(
        field(8..10)?,
        field(10..12)?,
        field(12..14)?,
        field(14..20)?,
    )?;
    Some(Utc.from_utc_datetime(&naive))
}

/// Drop sub-microsecond precision, matching what survives a round trip.
///
/// Leap-second nanoseconds (1_000_000_000 and above) clamp to 999_999 µs so
/// the stamp keeps its width.
pub fn truncate_to_resolution(time: DateTime<Utc>) -> DateTime<Utc> {
    let micros = (time.nanosecond() / 1_000).min(999_999);
    time.with_nanosecond(micros * 1_000).unwrap_or(time)
}
