//! Game controller
//!
//! Couples a [`Session`] with its [`TimerService`]. Player actions and timer
//! events both pass through here, one at a time, so an answer and a countdown
//! tick can never interleave. Whenever the session leaves an attempt (reset,
//! retry, resolution) the epoch moves on and every outstanding timer is
//! cancelled; events from an older epoch are dropped on arrival.

use std::time::Duration;

use rand::rngs::SmallRng;
use rand::Rng;
use tokio::sync::mpsc;

use super::session::{Outcome, Session, SessionSnapshot};
use super::timers::{TimerEvent, TimerKind, TimerService};
use crate::{Result, TtalError};

#[derive(Debug)]
pub struct GameController<R = SmallRng> {
    session: Session<R>,
    timers: TimerService,
    events: mpsc::Receiver<TimerEvent>,
    epoch: u64,
    penalty_visible: bool,
    /// Sub-millisecond part of measured ticks not yet taken off the clock
    tick_carry: Duration,
}

impl<R: Rng> GameController<R> {
    pub fn new(session: Session<R>) -> Self {
        let (timers, events) = TimerService::new();
        Self {
            session,
            timers,
            events,
            epoch: 0,
            penalty_visible: false,
            tick_carry: Duration::ZERO,
        }
    }

    pub fn session(&self) -> &Session<R> {
        &self.session
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// Whether the "-3s" indicator should currently be shown
    pub fn penalty_visible(&self) -> bool {
        self.penalty_visible
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn timer_active(&self, kind: TimerKind) -> bool {
        self.timers.is_active(kind)
    }

    pub fn enter_category(&mut self, name: &str) -> Result<bool> {
        let entered = self.session.enter_category(name)?;
        if entered {
            self.start_attempt();
        }
        Ok(entered)
    }

    pub fn retry_category(&mut self, name: &str) -> Result<bool> {
        let entered = self.session.retry_category(name)?;
        if entered {
            self.start_attempt();
        }
        Ok(entered)
    }

    pub fn back_to_categories(&mut self) {
        self.session.back_to_categories();
        self.stop_attempt();
    }

    /// Forward the player's choice and schedule what follows it
    pub fn select_answer(&mut self, index: usize) -> Option<Outcome> {
        let outcome = self.session.select_answer(index)?;
        let rules = self.session.rules().clone();

        match outcome {
            Outcome::Correct => {
                self.timers.schedule_advance(self.epoch, rules.next_set_delay);
            }
            Outcome::Incorrect => {
                self.timers.schedule_advance(self.epoch, rules.next_set_delay);
                self.penalty_visible = true;
                self.timers
                    .schedule_penalty_indicator(self.epoch, rules.penalty_indicator);
            }
            Outcome::TimedOut => self.stop_attempt(),
            Outcome::Pending => {}
        }
        Some(outcome)
    }

    /// Apply one timer event. Returns false for stale or ignored events.
    pub fn handle_event(&mut self, event: TimerEvent) -> bool {
        if event.epoch() != self.epoch {
            tracing::trace!(?event, current = self.epoch, "Dropping stale timer event");
            return false;
        }

        match event {
            TimerEvent::Tick { elapsed, .. } => {
                let total = self.tick_carry + elapsed;
                let whole_ms = total.as_millis() as u64;
                self.tick_carry = total - Duration::from_millis(whole_ms);
                if self.session.tick(whole_ms) {
                    self.stop_attempt();
                }
                true
            }
            TimerEvent::Advance { .. } => {
                if !self.session.advance() {
                    return false;
                }
                if self.session.active_category().is_none() {
                    self.stop_attempt();
                }
                true
            }
            TimerEvent::PenaltyCleared { .. } => {
                self.penalty_visible = false;
                true
            }
        }
    }

    /// Drain and apply every queued timer event without waiting
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            if self.handle_event(event) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next timer event and apply it
    pub async fn next_event(&mut self) -> Result<bool> {
        let event = self
            .events
            .recv()
            .await
            .ok_or_else(|| TtalError::TimerError("timer channel closed".to_string()))?;
        Ok(self.handle_event(event))
    }

    fn start_attempt(&mut self) {
        self.stop_attempt();
        let interval = self.session.rules().tick_interval;
        self.timers.start_countdown(self.epoch, interval);
    }

    fn stop_attempt(&mut self) {
        self.timers.cancel_all();
        self.penalty_visible = false;
        self.tick_carry = Duration::ZERO;
        self.epoch += 1;
    }
}
