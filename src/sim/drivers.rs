/// Reference times for the two periodic drivers: the main tick (paced by
/// the session's tick interval) and the 1-second countdown beat.
///
/// The loop passes `now` in, so the timing rules can be checked without
/// sleeping.

use std::time::{Duration, Instant};

use crate::sim::world::Phase;

pub const COUNTDOWN_BEAT: Duration = Duration::from_secs(1);

pub struct Drivers {
    last_tick: Instant,
    last_beat: Instant,
}

impl Drivers {
    pub fn new(now: Instant) -> Self {
        Drivers { last_tick: now, last_beat: now }
    }

    /// Reset the matching clock when the phase changed: entering Running
    /// restarts tick timing, a new or replaced countdown restarts the beat.
    pub fn observe(&mut self, before: Phase, after: Phase, now: Instant) {
        if before == after {
            return;
        }
        match after {
            Phase::Running => self.last_tick = now,
            Phase::Countdown(_) => self.last_beat = now,
            _ => {}
        }
    }

    /// Claim the tick if `interval_ms` has passed since the last one.
    pub fn take_tick(&mut self, now: Instant, interval_ms: u64) -> bool {
        if now.saturating_duration_since(self.last_tick) >= Duration::from_millis(interval_ms) {
            self.last_tick = now;
            true
        } else {
            false
        }
    }

    /// Claim the countdown beat if a second has passed since the last one.
    pub fn take_beat(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_beat) >= COUNTDOWN_BEAT {
            self.last_beat = now;
            true
        } else {
            false
        }
    }
}
