//! Category countdown
//!
//! An owned millisecond countdown. It never drops below zero and stops
//! itself the moment it reaches zero.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    duration_ms: u64,
    remaining_ms: u64,
    running: bool,
}

impl Countdown {
    /// Create a stopped countdown showing its full duration
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            remaining_ms: duration_ms,
            running: false,
        }
    }

    /// Restart from `duration_ms` and run
    pub fn start(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
        self.remaining_ms = duration_ms;
        self.running = duration_ms > 0;
    }

    /// Continue from the current remaining time
    pub fn resume(&mut self) {
        self.running = self.remaining_ms > 0;
    }

    /// Subtract elapsed time while running and return what is left
    pub fn tick(&mut self, elapsed_ms: u64) -> u64 {
        if self.running {
            self.subtract(elapsed_ms);
        }
        self.remaining_ms
    }

    /// Subtract a penalty while running and return what is left
    pub fn penalize(&mut self, penalty_ms: u64) -> u64 {
        if self.running {
            self.subtract(penalty_ms);
        }
        self.remaining_ms
    }

    pub fn cancel(&mut self) {
        self.running = false;
    }

    /// Stop and refill to the full duration
    pub fn reset(&mut self) {
        self.running = false;
        self.remaining_ms = self.duration_ms;
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_ms == 0
    }

    /// Fraction of the budget still available, in [0, 1]
    pub fn remaining_ratio(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        self.remaining_ms as f64 / self.duration_ms as f64
    }

    fn subtract(&mut self, ms: u64) {
        self.remaining_ms = self.remaining_ms.saturating_sub(ms);
        if self.remaining_ms == 0 {
            self.running = false;
        }
    }
}
