//! Cancellable game timers
//!
//! Runs the countdown driver, the post-answer advance delay, and the penalty
//! indicator as tokio tasks that report back over a channel. At most one task
//! of each kind is outstanding; scheduling a new one cancels the previous.
//! Every event carries the epoch it was scheduled under so the receiver can
//! discard anything that was already in flight when its session was reset.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Capacity of the timer event channel
pub const TIMER_CHANNEL_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Countdown,
    Advance,
    PenaltyIndicator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// Countdown driver fired; `elapsed` is wall time since its previous tick
    Tick { epoch: u64, elapsed: Duration },
    /// The display delay after an answer is over
    Advance { epoch: u64 },
    /// The penalty indicator should disappear
    PenaltyCleared { epoch: u64 },
}

impl TimerEvent {
    pub fn epoch(&self) -> u64 {
        match self {
            TimerEvent::Tick { epoch, .. }
            | TimerEvent::Advance { epoch }
            | TimerEvent::PenaltyCleared { epoch } => *epoch,
        }
    }

    pub fn kind(&self) -> TimerKind {
        match self {
            TimerEvent::Tick { .. } => TimerKind::Countdown,
            TimerEvent::Advance { .. } => TimerKind::Advance,
            TimerEvent::PenaltyCleared { .. } => TimerKind::PenaltyIndicator,
        }
    }
}

#[derive(Debug)]
struct TimerTask {
    cancel_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TimerTask {
    fn cancel(mut self) {
        if let Some(cancel_tx) = self.cancel_tx.take() {
            let _ = cancel_tx.send(()); // Receiver is gone once the task finished
        }
        self.handle.abort();
    }

    fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

/// Owner of the outstanding timer tasks.
///
/// Scheduling spawns onto the current tokio runtime and must be called from
/// within one.
#[derive(Debug)]
pub struct TimerService {
    tx: mpsc::Sender<TimerEvent>,
    countdown: Option<TimerTask>,
    advance: Option<TimerTask>,
    penalty: Option<TimerTask>,
}

impl TimerService {
    /// Create the service and the receiving end of its events
    pub fn new() -> (Self, mpsc::Receiver<TimerEvent>) {
        let (tx, rx) = mpsc::channel(TIMER_CHANNEL_CAPACITY);
        let service = Self {
            tx,
            countdown: None,
            advance: None,
            penalty: None,
        };
        (service, rx)
    }

    /// Start the countdown driver, replacing any running one
    pub fn start_countdown(&mut self, epoch: u64, interval: Duration) {
        self.cancel(TimerKind::Countdown);

        let tx = self.tx.clone();
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await; // First tick completes immediately
            let mut last = Instant::now();

            loop {
                tokio::select! {
                    _ = &mut cancel_rx => break,
                    _ = ticker.tick() => {
                        let now = Instant::now();
                        let elapsed = now.duration_since(last);
                        last = now;
                        if tx.send(TimerEvent::Tick { epoch, elapsed }).await.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        self.countdown = Some(TimerTask {
            cancel_tx: Some(cancel_tx),
            handle,
        });
    }

    /// Fire one `Advance` event after `delay`, replacing any pending one
    pub fn schedule_advance(&mut self, epoch: u64, delay: Duration) {
        self.cancel(TimerKind::Advance);
        let task = self.spawn_oneshot(delay, TimerEvent::Advance { epoch });
        self.advance = Some(task);
    }

    /// Fire one `PenaltyCleared` event after `delay`, replacing any pending one
    pub fn schedule_penalty_indicator(&mut self, epoch: u64, delay: Duration) {
        self.cancel(TimerKind::PenaltyIndicator);
        let task = self.spawn_oneshot(delay, TimerEvent::PenaltyCleared { epoch });
        self.penalty = Some(task);
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        if let Some(task) = self.slot(kind).take() {
            task.cancel();
        }
    }

    pub fn cancel_all(&mut self) {
        self.cancel(TimerKind::Countdown);
        self.cancel(TimerKind::Advance);
        self.cancel(TimerKind::PenaltyIndicator);
    }

    /// Whether a task of this kind is scheduled and has not finished
    pub fn is_active(&self, kind: TimerKind) -> bool {
        let slot = match kind {
            TimerKind::Countdown => &self.countdown,
            TimerKind::Advance => &self.advance,
            TimerKind::PenaltyIndicator => &self.penalty,
        };
        slot.as_ref().map_or(false, TimerTask::is_active)
    }

    fn slot(&mut self, kind: TimerKind) -> &mut Option<TimerTask> {
        match kind {
            TimerKind::Countdown => &mut self.countdown,
            TimerKind::Advance => &mut self.advance,
            TimerKind::PenaltyIndicator => &mut self.penalty,
        }
    }

    fn spawn_oneshot(&self, delay: Duration, event: TimerEvent) -> TimerTask {
        let tx = self.tx.clone();
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = cancel_rx => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = tx.send(event).await;
                }
            }
        });
        TimerTask {
            cancel_tx: Some(cancel_tx),
            handle,
        }
    }
}

impl Drop for TimerService {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
