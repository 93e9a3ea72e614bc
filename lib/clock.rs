use crate::chess::Color;
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use std::{str::FromStr, time::Duration, time::Instant};

#[cfg(test)]
use proptest::prelude::*;

/// Trait for the per-side countdown clocks of a chess game.
#[cfg_attr(test, mockall::automock)]
pub trait Clock {
    /// Starts counting down the time of the side to move.
    fn start(&mut self, turn: Color);

    /// Charges `mover` for the time spent on the move just played, credits its
    /// increment, and starts counting down the opponent's time.
    ///
    /// Returns the time spent by `mover`.
    fn switch_turn(&mut self, mover: Color) -> Duration;

    /// Whether `side` has run out of time.
    fn is_expired(&self, side: Color) -> bool;

    /// The time `side` has left, never below zero.
    fn remaining(&self, side: Color) -> Duration;
}

/// Configuration for [`Chessclock`].
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[display(fmt = "{}", "ron::ser::to_string(self).unwrap()")]
#[serde(deny_unknown_fields, rename = "clock", default)]
pub struct TimeControl {
    /// The time each side starts with.
    #[cfg_attr(test, strategy((0u64..1 << 32).prop_map(Duration::from_millis)))]
    #[serde(with = "humantime_serde")]
    pub initial: Duration,

    /// The time credited to a side after each of its moves.
    #[cfg_attr(test, strategy((0u64..1 << 20).prop_map(Duration::from_millis)))]
    #[serde(with = "humantime_serde")]
    pub increment: Duration,
}

/// Ten minutes per side plus five seconds per move.
impl Default for TimeControl {
    fn default() -> Self {
        TimeControl {
            initial: Duration::from_secs(600),
            increment: Duration::from_secs(5),
        }
    }
}

/// The reason why parsing [`TimeControl`] failed.
#[derive(Debug, Display, Eq, PartialEq, Error, From)]
#[display(fmt = "failed to parse time control")]
pub struct ParseTimeControlError(ron::de::SpannedError);

impl FromStr for TimeControl {
    type Err = ParseTimeControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ron::de::from_str(s)?)
    }
}

/// A wall-clock [`Clock`] governed by a [`TimeControl`].
///
/// The side whose turn it is has its time counted down live, so expiry is
/// detected as soon as it is queried, not only after the next move.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Chessclock {
    control: TimeControl,
    remaining: [Duration; 2],
    running: Option<(Color, Instant)>,
}

impl Chessclock {
    /// Constructs a stopped [`Chessclock`] with the initial time on both sides.
    pub fn new(control: TimeControl) -> Self {
        Chessclock {
            control,
            remaining: [control.initial; 2],
            running: None,
        }
    }

    /// This clock's configuration.
    pub fn control(&self) -> TimeControl {
        self.control
    }

    /// The side whose time is currently counting down, if the clock is running.
    pub fn running(&self) -> Option<Color> {
        self.running.map(|(c, _)| c)
    }

    fn elapsed(&self, side: Color) -> Duration {
        match self.running {
            Some((c, since)) if c == side => since.elapsed(),
            _ => Duration::ZERO,
        }
    }
}

impl Default for Chessclock {
    fn default() -> Self {
        Chessclock::new(TimeControl::default())
    }
}

impl Clock for Chessclock {
    fn start(&mut self, turn: Color) {
        self.running = Some((turn, Instant::now()));
    }

    fn switch_turn(&mut self, mover: Color) -> Duration {
        let elapsed = self.elapsed(mover);
        let remaining = &mut self.remaining[mover as usize];
        *remaining = remaining.saturating_sub(elapsed) + self.control.increment;
        self.running = Some((!mover, Instant::now()));
        elapsed
    }

    fn is_expired(&self, side: Color) -> bool {
        self.remaining(side).is_zero()
    }

    fn remaining(&self, side: Color) -> Duration {
        self.remaining[side as usize].saturating_sub(self.elapsed(side))
    }
}
