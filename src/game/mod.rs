//! Game core
//!
//! The session state machine, its countdown, the per-set shuffle, and the
//! cancellable timers that drive it. The presentation layer only reads
//! snapshots and calls the operations exposed here.

use std::time::Duration;

pub mod controller;
pub mod countdown;
pub mod session;
pub mod shuffle;
pub mod timers;

pub use controller::GameController;
pub use countdown::Countdown;
pub use session::{CategoryReport, CategoryResult, Outcome, Phase, Session, SessionSnapshot};
pub use shuffle::{shuffle_for_set, PresentedSet};
pub use timers::{TimerEvent, TimerKind, TimerService};

/// Countdown budget shared by every set of one category attempt
pub const CATEGORY_TIME_LIMIT_MS: u64 = 60_000;
/// Time removed from the countdown by a wrong answer
pub const WRONG_ANSWER_PENALTY_MS: u64 = 3_000;
/// Pause between a resolved answer and the next set
pub const NEXT_SET_DELAY_MS: u64 = 1_500;
/// How long the "-3s" indicator stays visible
pub const PENALTY_INDICATOR_MS: u64 = 1_000;
/// Countdown driver granularity
pub const TICK_INTERVAL_MS: u64 = 10;
pub const MIN_CORRECT_TO_PASS: u32 = 7;
/// Usual set count per category. Catalogs may differ and are played as given.
pub const SETS_PER_CATEGORY: usize = 10;

/// Timing and scoring parameters of a category attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRules {
    pub time_limit: Duration,
    pub wrong_answer_penalty: Duration,
    pub next_set_delay: Duration,
    pub penalty_indicator: Duration,
    pub tick_interval: Duration,
    pub min_correct_to_pass: u32,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_millis(CATEGORY_TIME_LIMIT_MS),
            wrong_answer_penalty: Duration::from_millis(WRONG_ANSWER_PENALTY_MS),
            next_set_delay: Duration::from_millis(NEXT_SET_DELAY_MS),
            penalty_indicator: Duration::from_millis(PENALTY_INDICATOR_MS),
            tick_interval: Duration::from_millis(TICK_INTERVAL_MS),
            min_correct_to_pass: MIN_CORRECT_TO_PASS,
        }
    }
}

impl GameRules {
    pub fn time_limit_ms(&self) -> u64 {
        self.time_limit.as_millis() as u64
    }

    pub fn penalty_ms(&self) -> u64 {
        self.wrong_answer_penalty.as_millis() as u64
    }
}
