//! Transports, directions and usage readings

use chrono::{DateTime, Duration, Local, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Network path category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Cellular data
    Mobile,
    /// Wi-Fi
    Wifi,
}

impl Transport {
    /// All transports usage is aggregated over
    pub const ALL: [Self; 2] = [Self::Mobile, Self::Wifi];
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mobile => f.write_str("mobile"),
            Self::Wifi => f.write_str("wifi"),
        }
    }
}

/// Traffic direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Transmitted bytes
    Upload,
    /// Received bytes
    Download,
}

impl Direction {
    /// Both directions
    pub const ALL: [Self; 2] = [Self::Upload, Self::Download];
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upload => f.write_str("upload"),
            Self::Download => f.write_str("download"),
        }
    }
}

/// Usage reading for one query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageInfo {
    /// Bytes used in the queried window
    pub usage_level_bytes: u64,
}

impl UsageInfo {
    /// Create reading
    pub const fn new(usage_level_bytes: u64) -> Self {
        Self { usage_level_bytes }
    }

    /// Bytes of an optional reading, absent counts as zero
    #[inline]
    pub fn bytes_or_zero(info: Option<Self>) -> u64 {
        info.map(|i| i.usage_level_bytes).unwrap_or(0)
    }

    /// Sum of two optional readings; absent only when both are
    pub fn combine(a: Option<Self>, b: Option<Self>) -> Option<Self> {
        match (a, b) {
            (None, None) => None,
            _ => Some(Self::new(
                Self::bytes_or_zero(a).saturating_add(Self::bytes_or_zero(b)),
            )),
        }
    }
}

/// Time window a usage query covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageWindow {
    /// Inclusive start
    pub start: DateTime<Utc>,
    /// Exclusive end
    pub end: DateTime<Utc>,
}

impl UsageWindow {
    /// Arbitrary window
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// From local midnight until now
    pub fn today() -> Self {
        Self::today_at(Local::now())
    }

    /// From midnight of `now`'s day (in its own zone) until `now`
    pub fn today_at<Tz: TimeZone>(now: DateTime<Tz>) -> Self {
        let end = now.with_timezone(&Utc);
        let start = end - Duration::milliseconds(elapsed_millis_of_day(&now));
        Self { start, end }
    }

    /// Window length
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Milliseconds passed since local midnight, at second resolution
pub fn today_elapsed_millis() -> i64 {
    elapsed_millis_of_day(&Local::now())
}

fn elapsed_millis_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> i64 {
    now.num_seconds_from_midnight() as i64 * 1000
}
