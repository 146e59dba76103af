//! Sampled execution for digital controllers.
//!
//! The physical engine may tick faster than the controllers sample.
//! A [`SampleClock`] decides when a controller executes; between samples
//! a [`ZeroOrderHold`] keeps the last actuation constant.

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

/// Tracks when a controller should next execute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleClock {
    /// Sample period, s.
    pub period_s: f64,
    /// Time of the next scheduled sample, s.
    pub next_sample_s: f64,
}

impl SampleClock {
    pub fn new(period_s: f64, initial_time_s: f64) -> ControlResult<Self> {
        if !(period_s > 0.0) {
            return Err(ControlError::InvalidArg {
                what: "sample period must be positive",
            });
        }
        Ok(Self {
            period_s,
            next_sample_s: initial_time_s + period_s,
        })
    }

    /// True when a sample is due at `now_s`.
    pub fn due(&self, now_s: f64) -> bool {
        now_s >= self.next_sample_s
    }

    /// Advance to the next sample time; call after executing a sample.
    pub fn advance(&mut self) {
        self.next_sample_s += self.period_s;
    }
}

/// Holds the last controller output between samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZeroOrderHold {
    pub value: f64,
    pub clock: SampleClock,
}

impl ZeroOrderHold {
    pub fn new(period_s: f64, initial_time_s: f64, initial_value: f64) -> ControlResult<Self> {
        Ok(Self {
            value: initial_value,
            clock: SampleClock::new(period_s, initial_time_s)?,
        })
    }

    /// Current held value.
    pub fn get(&self) -> f64 {
        self.value
    }

    /// If a sample is due, run `sample()` and hold its result.
    ///
    /// Returns true when the value was refreshed.
    pub fn refresh(&mut self, now_s: f64, sample: impl FnOnce() -> f64) -> bool {
        if self.clock.due(now_s) {
            self.value = sample();
            self.clock.advance();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_fires_on_schedule() {
        let mut clock = SampleClock::new(60.0, 0.0).unwrap();
        assert!(!clock.due(0.0));
        assert!(!clock.due(59.9));
        assert!(clock.due(60.0));
        clock.advance();
        assert!(!clock.due(60.0));
        assert!(clock.due(120.0));
    }

    #[test]
    fn hold_keeps_value_between_samples() {
        let mut zoh = ZeroOrderHold::new(60.0, 0.0, 0.5).unwrap();
        assert!(!zoh.refresh(30.0, || 1.0));
        assert_eq!(zoh.get(), 0.5);
        assert!(zoh.refresh(60.0, || 1.0));
        assert_eq!(zoh.get(), 1.0);
    }

    #[test]
    fn rejects_non_positive_period() {
        assert!(SampleClock::new(0.0, 0.0).is_err());
    }
}
