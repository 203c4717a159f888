//! Fetch-and-render cycle: which phase we are in and what the window shows.

use crate::icon;
use crate::present::{ColorZone, Presentation, present};
use crate::reading::Reading;
use crate::source::FetchError;

/// Value label text while a fetch has failed.
pub const ERROR_TOKEN: &str = "Errore";
pub const LOADING_TEXT: &str = "Caricamento...";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Fetching,
}

/// What started a fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    Startup,
    Timer,
    Manual,
    SettingsSaved,
}

/// Text and color currently on screen.
#[derive(Clone, Debug, PartialEq)]
pub struct Display {
    pub value_text: String,
    pub info_text: String,
    /// Color of the last successful reading, kept across errors.
    pub zone: Option<ColorZone>,
    /// Tray tooltip of the last successful reading, kept across errors.
    pub tooltip: Option<String>,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            value_text: LOADING_TEXT.to_string(),
            info_text: String::new(),
            zone: None,
            tooltip: None,
        }
    }
}

/// Result of completing a fetch.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Success(Presentation),
    Error(FetchError),
}

/// At most one fetch is in flight. A trigger while fetching is dropped, not
/// queued.
#[derive(Debug)]
pub struct FetchCycle {
    phase: Phase,
    display: Display,
    last_trigger: Option<Trigger>,
}

impl Default for FetchCycle {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            display: Display::default(),
            last_trigger: None,
        }
    }
}

impl FetchCycle {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_fetching(&self) -> bool {
        self.phase() == Phase::Fetching
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn last_trigger(&self) -> Option<Trigger> {
        self.last_trigger
    }

    /// Moves to `Fetching`. Returns false, changing nothing, when a fetch
    /// is already running; the caller must not issue a request then.
    pub fn trigger(&mut self, trigger: Trigger) -> bool {
        if self.phase == Phase::Fetching {
            return false;
        }
        self.phase = Phase::Fetching;
        self.last_trigger = Some(trigger);
        true
    }

    /// Applies a finished fetch and returns to `Idle`.
    pub fn complete(&mut self, result: Result<Vec<Reading>, FetchError>) -> Outcome {
        self.phase = Phase::Idle;
        let newest = result.and_then(|readings| readings.into_iter().next().ok_or(FetchError::Empty));
        match newest {
            Ok(reading) => {
                let presentation = present(&reading);
                self.display = Display {
                    value_text: reading.value.to_string(),
                    info_text: presentation.info_text(),
                    zone: Some(presentation.zone),
                    tooltip: Some(icon::tooltip(&presentation)),
                };
                Outcome::Success(presentation)
            }
            Err(err) => {
                self.display.value_text = ERROR_TOKEN.to_string();
                self.display.info_text = err.to_string();
                Outcome::Error(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::Direction;

    fn reading(value: i32) -> Reading {
        Reading::new(value, Some(Direction::Flat), "2025-03-01T10:15:00Z", 2.0)
    }

    #[test]
    fn starts_loading_and_idle() {
        let cycle = FetchCycle::default();
        assert_eq!(cycle.phase(), Phase::Idle);
        assert_eq!(cycle.display().value_text, LOADING_TEXT);
    }

    #[test]
    fn second_trigger_while_fetching_is_ignored() {
        let mut cycle = FetchCycle::default();
        assert!(cycle.trigger(Trigger::Timer));
        let before = cycle.display().clone();
        assert!(!cycle.trigger(Trigger::Manual));
        assert_eq!(cycle.last_trigger(), Some(Trigger::Timer));
        assert_eq!(cycle.display(), &before);
        assert!(cycle.is_fetching());

        cycle.complete(Ok(vec![reading(100)]));
        assert!(!cycle.is_fetching());
        assert!(cycle.trigger(Trigger::Manual));
    }

    #[test]
    fn success_updates_everything() {
        let mut cycle = FetchCycle::default();
        cycle.trigger(Trigger::Startup);
        let outcome = cycle.complete(Ok(vec![reading(190), reading(180)]));
        assert!(matches!(outcome, Outcome::Success(ref p) if p.value == 190));
        let display = cycle.display();
        assert_eq!(display.value_text, "190");
        assert_eq!(display.zone, Some(ColorZone::High));
        assert!(display.info_text.contains("+2.0 mg/dL"));
        assert!(display.tooltip.as_deref().unwrap().starts_with("Glicemia: 190 mg/dL →"));
    }

    #[test]
    fn error_keeps_last_color_and_tooltip() {
        let mut cycle = FetchCycle::default();
        cycle.trigger(Trigger::Startup);
        cycle.complete(Ok(vec![reading(60)]));
        let tooltip = cycle.display().tooltip.clone();

        cycle.trigger(Trigger::Timer);
        let outcome = cycle.complete(Err(FetchError::Network("timed out".into())));
        assert_eq!(outcome, Outcome::Error(FetchError::Network("timed out".into())));
        let display = cycle.display();
        assert_eq!(display.value_text, ERROR_TOKEN);
        assert_eq!(display.info_text, "Errore di rete: timed out");
        assert_eq!(display.zone, Some(ColorZone::Low));
        assert_eq!(display.tooltip, tooltip);
        assert_eq!(cycle.phase(), Phase::Idle);
    }

    #[test]
    fn empty_success_is_an_error() {
        let mut cycle = FetchCycle::default();
        cycle.trigger(Trigger::Manual);
        assert_eq!(cycle.complete(Ok(Vec::new())), Outcome::Error(FetchError::Empty));
        assert_eq!(cycle.display().value_text, ERROR_TOKEN);
    }
}
