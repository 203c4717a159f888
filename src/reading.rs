//! Glucose readings and the trend vocabulary shared by both data sources.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone};

/// Trend direction reported alongside a sensor value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    DoubleUp,
    SingleUp,
    FortyFiveUp,
    Flat,
    FortyFiveDown,
    SingleDown,
    DoubleDown,
    NotComputable,
    RateOutOfRange,
}

impl Direction {
    pub const ALL: [Direction; 9] = [
        Direction::DoubleUp,
        Direction::SingleUp,
        Direction::FortyFiveUp,
        Direction::Flat,
        Direction::FortyFiveDown,
        Direction::SingleDown,
        Direction::DoubleDown,
        Direction::NotComputable,
        Direction::RateOutOfRange,
    ];

    /// Parses the Nightscout / Share vocabulary. Older Nightscout uploaders
    /// spell the last two values out in capitals, both forms are accepted.
    /// Anything else (including `"None"`) has no direction.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "DoubleUp" => Some(Direction::DoubleUp),
            "SingleUp" => Some(Direction::SingleUp),
            "FortyFiveUp" => Some(Direction::FortyFiveUp),
            "Flat" => Some(Direction::Flat),
            "FortyFiveDown" => Some(Direction::FortyFiveDown),
            "SingleDown" => Some(Direction::SingleDown),
            "DoubleDown" => Some(Direction::DoubleDown),
            "NotComputable" | "NOT COMPUTABLE" => Some(Direction::NotComputable),
            "RateOutOfRange" | "RATE OUT OF RANGE" => Some(Direction::RateOutOfRange),
            _ => None,
        }
    }

    /// Numeric trend codes used by the Share service (0 means "none").
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1..=9 => Some(Self::ALL[(code - 1) as usize]),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::DoubleUp => "DoubleUp",
            Direction::SingleUp => "SingleUp",
            Direction::FortyFiveUp => "FortyFiveUp",
            Direction::Flat => "Flat",
            Direction::FortyFiveDown => "FortyFiveDown",
            Direction::SingleDown => "SingleDown",
            Direction::DoubleDown => "DoubleDown",
            Direction::NotComputable => "NotComputable",
            Direction::RateOutOfRange => "RateOutOfRange",
        }
    }
}

/// One sensor glucose value. Built once by a backend and never changed.
#[derive(Clone, Debug, PartialEq)]
pub struct Reading {
    /// mg/dL
    pub value: i32,
    pub direction: Option<Direction>,
    /// Timestamp exactly as the source reported it.
    pub date_string: String,
    /// Parsed `date_string`, `None` when the source string is not ISO-8601.
    pub timestamp: Option<DateTime<FixedOffset>>,
    /// Change from the previous reading in mg/dL.
    pub delta: f64,
    pub mmol_l: Option<f64>,
}

impl Reading {
    pub fn new(value: i32, direction: Option<Direction>, date_string: impl Into<String>, delta: f64) -> Self {
        let date_string = date_string.into();
        let timestamp = parse_timestamp(&date_string);
        Self {
            value,
            direction,
            date_string,
            timestamp,
            delta,
            mmol_l: None,
        }
    }

    pub fn with_mmol_l(mut self, mmol_l: f64) -> Self {
        self.mmol_l = Some(mmol_l);
        self
    }
}

/// Parses an ISO-8601 timestamp. Zoned strings keep their offset, naive ones
/// are read as local wall-clock time.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.fixed_offset());
        }
    }
    None
}

/// Orders readings newest first. Readings without a parseable timestamp sink
/// to the end; the sort is stable so source order breaks ties.
pub fn sort_newest_first(readings: &mut [Reading]) {
    readings.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// Fills the newest reading's delta from its predecessor. With fewer than two
/// readings the delta stays at zero; no extra history is requested for it.
pub fn with_local_delta(mut readings: Vec<Reading>) -> Vec<Reading> {
    if readings.len() >= 2 {
        readings[0].delta = f64::from(readings[0].value - readings[1].value);
    }
    readings
}
