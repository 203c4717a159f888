//! Maps a reading to what the window and the tray show for it.

use chrono::{Local, TimeZone};

use crate::reading::{Direction, Reading};

/// Above this value a reading is high.
pub const HIGH_THRESHOLD: i32 = 180;
/// Below this value a reading is low.
pub const LOW_THRESHOLD: i32 = 70;

/// Nightscout-style range colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorZone {
    Low,
    InRange,
    High,
}

impl ColorZone {
    /// 70 and 180 are both in range.
    pub fn of(value: i32) -> Self {
        if value > HIGH_THRESHOLD {
            ColorZone::High
        } else if value < LOW_THRESHOLD {
            ColorZone::Low
        } else {
            ColorZone::InRange
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            ColorZone::High => (0xFF, 0x44, 0x44),    // rosso
            ColorZone::Low => (0xFF, 0xAA, 0x44),     // arancione
            ColorZone::InRange => (0x44, 0xFF, 0x44), // verde
        }
    }
}

/// Arrow shown next to the value. Unknown directions show nothing.
pub fn glyph(direction: Option<Direction>) -> &'static str {
    match direction {
        Some(Direction::DoubleUp) => "⇈",
        Some(Direction::SingleUp) => "↑",
        Some(Direction::FortyFiveUp) => "↗",
        Some(Direction::Flat) => "→",
        Some(Direction::FortyFiveDown) => "↘",
        Some(Direction::SingleDown) => "↓",
        Some(Direction::DoubleDown) => "⇊",
        Some(Direction::NotComputable) => "-",
        Some(Direction::RateOutOfRange) => "⚡",
        None => "",
    }
}

/// Signed, one decimal: `+5.0`, `-2.3`, `+0.0`.
pub fn format_delta(delta: f64) -> String {
    format!("{:+.1}", delta)
}

/// `HH:MM` in the viewer's timezone, or the raw source string when it could
/// not be parsed.
pub fn local_time(reading: &Reading) -> String {
    local_time_in(reading, &Local)
}

pub fn local_time_in<Tz: TimeZone>(reading: &Reading, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match reading.timestamp {
        Some(ts) => ts.with_timezone(tz).format("%H:%M").to_string(),
        None => reading.date_string.clone(),
    }
}

/// Everything the UI needs to draw one reading.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    pub value: i32,
    pub glyph: &'static str,
    pub zone: ColorZone,
    pub delta: String,
    pub local_time: String,
}

impl Presentation {
    pub fn info_text(&self) -> String {
        format!(
            "{} mg/dL\n{} mg/dL\nUltimo aggiornamento: {}",
            self.glyph, self.delta, self.local_time
        )
    }
}

pub fn present(reading: &Reading) -> Presentation {
    Presentation {
        value: reading.value,
        glyph: glyph(reading.direction),
        zone: ColorZone::of(reading.value),
        delta: format_delta(reading.delta),
        local_time: local_time(reading),
    }
}
