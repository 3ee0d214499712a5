//! Match clock: elapsed seconds and half, advanced by a once-per-second tick.

use serde::{Deserialize, Serialize};

pub const FIRST_HALF: u8 = 1;
pub const SECOND_HALF: u8 = 2;

/// Values read from the clock when a record is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchClockSnapshot {
    pub elapsed_seconds: u32,
    pub half: u8,
    pub running: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalfEnd {
    /// First half closed; the clock now stands in the second half.
    SecondHalfStarted,
    /// Second half closed; the match should be ended by the caller.
    MatchOver,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchClock {
    #[serde(default)]
    elapsed_seconds: u32,
    #[serde(default = "first_half")]
    half: u8,
    #[serde(default)]
    running: bool,
}

fn first_half() -> u8 {
    FIRST_HALF
}

impl Default for MatchClock {
    fn default() -> Self {
        Self {
            elapsed_seconds: 0,
            half: FIRST_HALF,
            running: false,
        }
    }
}

impl MatchClock {
    /// A persisted clock always comes back paused; the operator resumes explicitly.
    pub fn restored(mut self) -> Self {
        self.running = false;
        if !(FIRST_HALF..=SECOND_HALF).contains(&self.half) {
            self.half = FIRST_HALF;
        }
        self
    }

    pub fn snapshot(&self) -> MatchClockSnapshot {
        MatchClockSnapshot {
            elapsed_seconds: self.elapsed_seconds,
            half: self.half,
            running: self.running,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn half(&self) -> u8 {
        self.half
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Returns the new running state.
    pub fn toggle(&mut self) -> bool {
        self.running = !self.running;
        self.running
    }

    /// Adds one second while running. Returns whether the clock moved.
    pub fn tick(&mut self) -> bool {
        if self.running {
            self.elapsed_seconds = self.elapsed_seconds.saturating_add(1);
        }
        self.running
    }

    pub fn end_half(&mut self) -> HalfEnd {
        self.running = false;
        if self.half == FIRST_HALF {
            self.half = SECOND_HALF;
            HalfEnd::SecondHalfStarted
        } else {
            HalfEnd::MatchOver
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// `mm:ss`, minutes are not wrapped at 60.
pub fn format_match_time(total_seconds: u32) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_only_advances_while_running() {
        let mut clock = MatchClock::default();
        assert!(!clock.tick());
        assert_eq!(clock.elapsed_seconds(), 0);
        clock.start();
        clock.tick();
        clock.tick();
        assert_eq!(clock.elapsed_seconds(), 2);
        clock.toggle();
        clock.tick();
        assert_eq!(clock.elapsed_seconds(), 2);
    }

    #[test]
    fn half_advances_once_then_reports_match_over() {
        let mut clock = MatchClock::default();
        clock.start();
        assert_eq!(clock.end_half(), HalfEnd::SecondHalfStarted);
        assert!(!clock.is_running());
        assert_eq!(clock.half(), SECOND_HALF);
        assert_eq!(clock.end_half(), HalfEnd::MatchOver);
        assert_eq!(clock.half(), SECOND_HALF);
    }

    #[test]
    fn restored_clock_is_paused() {
        let raw = r#"{"elapsedSeconds":95,"half":2,"running":true}"#;
        let clock: MatchClock = serde_json::from_str(raw).unwrap();
        let clock = clock.restored();
        assert!(!clock.is_running());
        assert_eq!(clock.elapsed_seconds(), 95);
        assert_eq!(clock.half(), 2);
    }

    #[test]
    fn match_time_is_zero_padded() {
        assert_eq!(format_match_time(0), "00:00");
        assert_eq!(format_match_time(65), "01:05");
        assert_eq!(format_match_time(3725), "62:05");
    }
}
