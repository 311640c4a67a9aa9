//! Step clock for DualEco runs.
//!
//! The clock is the single source of truth for simulated time. Step 0 is
//! the calibrated steady state; each call to [`StepClock::advance`] opens
//! the next step. All arithmetic is checked.

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// Step counter would overflow.
    #[error("step counter overflow: cannot advance beyond u64::MAX")]
    StepOverflow,
}

/// Step counter with a fixed horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepClock {
    /// Current step (0 before the first step runs).
    step: u64,
    /// Last step of the run (0 = unbounded).
    horizon: u64,
}

impl StepClock {
    /// Create a clock at step 0 that finishes after `horizon` steps.
    pub const fn new(horizon: u64) -> Self {
        Self { step: 0, horizon }
    }

    /// Advance by one step and return the new step number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::StepOverflow`] if the counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.step = self.step.checked_add(1).ok_or(ClockError::StepOverflow)?;
        Ok(self.step)
    }

    /// Current step number.
    pub const fn step(&self) -> u64 {
        self.step
    }

    /// Configured horizon.
    pub const fn horizon(&self) -> u64 {
        self.horizon
    }

    /// Whether the horizon has been reached.
    pub const fn is_finished(&self) -> bool {
        self.horizon > 0 && self.step >= self.horizon
    }

    /// Steps left before the horizon (`None` when unbounded).
    pub const fn remaining(&self) -> Option<u64> {
        if self.horizon == 0 {
            None
        } else {
            Some(self.horizon.saturating_sub(self.step))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn advances_until_the_horizon() {
        let mut clock = StepClock::new(2);
        assert_eq!(clock.step(), 0);
        assert!(!clock.is_finished());
        assert_eq!(clock.advance().unwrap(), 1);
        assert_eq!(clock.remaining(), Some(1));
        assert_eq!(clock.advance().unwrap(), 2);
        assert!(clock.is_finished());
        assert_eq!(clock.remaining(), Some(0));
    }

    #[test]
    fn zero_horizon_is_unbounded() {
        let mut clock = StepClock::new(0);
        clock.advance().unwrap();
        assert!(!clock.is_finished());
        assert_eq!(clock.remaining(), None);
    }

    #[test]
    fn overflow_is_an_error() {
        let mut clock = StepClock {
            step: u64::MAX,
            horizon: 0,
        };
        assert_eq!(clock.advance(), Err(ClockError::StepOverflow));
    }
}
