//! Session state machine
//!
//! Owns every piece of mutable game state: the active category, the set
//! sequence, the presented set, the player's answer, the score counters, and
//! the shared category countdown. States flow
//! `CategorySelect -> InSet -> SetResolved -> (InSet | CategoryResult)`, with
//! a timeout short-circuiting straight to `CategoryResult`.
//!
//! Operations called out of turn (a second answer, an answer after expiry,
//! an advance after a timeout) are ignored and report that nothing changed.

use std::sync::Arc;

use chrono::{DateTime, Local};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::countdown::Countdown;
use super::shuffle::{shuffle_for_set, PresentedSet};
use super::GameRules;
use crate::catalog::QuizCatalog;
use crate::{Result, TtalError};

/// Resolution of the current set's single answer attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    Pending,
    Correct,
    Incorrect,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryResult {
    #[default]
    InProgress,
    Passed,
    Failed,
}

/// Observable position in the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    CategorySelect,
    InSet,
    SetResolved,
    TimedOut,
    CategoryResult,
}

/// Summary of one finished category attempt
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryReport {
    pub category: String,
    pub result: CategoryResult,
    pub correct: u32,
    pub incorrect: u32,
    pub total_sets: usize,
    pub timed_out: bool,
    pub finished_at: DateTime<Local>,
}

impl CategoryReport {
    pub fn passed(&self) -> bool {
        self.result == CategoryResult::Passed
    }

    /// One-line summary for lists
    pub fn summary(&self) -> String {
        let verdict = match (self.result, self.timed_out) {
            (CategoryResult::Passed, _) => "passed",
            (_, true) => "time's up",
            _ => "failed",
        };
        format!(
            "{} {} - {} ({}/{} correct)",
            self.finished_at.format("%H:%M:%S"),
            self.category,
            verdict,
            self.correct,
            self.total_sets
        )
    }
}

/// Read-only copy of the session state for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub active_category: Option<String>,
    pub completed_categories: Vec<String>,
    pub set_sequence: Vec<String>,
    pub current_set_index: usize,
    pub presented_set: Option<PresentedSet>,
    pub selected_answer_index: Option<usize>,
    pub outcome: Outcome,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub remaining_ms: u64,
    pub timer_running: bool,
    pub category_result: CategoryResult,
    pub phase: Phase,
}

/// One play session over a catalog
#[derive(Debug)]
pub struct Session<R = SmallRng> {
    catalog: Arc<QuizCatalog>,
    rules: GameRules,
    countdown: Countdown,
    rng: R,
    completed_categories: Vec<String>,
    active_category: Option<String>,
    set_sequence: Vec<String>,
    current_set_index: usize,
    presented_set: Option<PresentedSet>,
    selected_answer_index: Option<usize>,
    outcome: Outcome,
    correct_count: u32,
    incorrect_count: u32,
    category_result: CategoryResult,
    history: Vec<CategoryReport>,
}

impl Session<SmallRng> {
    /// Create a session with an entropy-seeded shuffle
    pub fn new(catalog: Arc<QuizCatalog>, rules: GameRules) -> Result<Self> {
        Self::with_rng(catalog, rules, SmallRng::from_entropy())
    }

    /// Create a session with reproducible shuffles
    pub fn with_seed(catalog: Arc<QuizCatalog>, rules: GameRules, seed: u64) -> Result<Self> {
        Self::with_rng(catalog, rules, SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Session<R> {
    pub fn with_rng(catalog: Arc<QuizCatalog>, rules: GameRules, rng: R) -> Result<Self> {
        let countdown = Countdown::new(rules.time_limit_ms());
        Self::with_parts(catalog, rules, countdown, rng)
    }

    /// Create a session around an existing countdown
    pub fn with_parts(
        catalog: Arc<QuizCatalog>,
        rules: GameRules,
        countdown: Countdown,
        rng: R,
    ) -> Result<Self> {
        catalog.validate()?;
        Ok(Self {
            catalog,
            rules,
            countdown,
            rng,
            completed_categories: Vec::new(),
            active_category: None,
            set_sequence: Vec::new(),
            current_set_index: 0,
            presented_set: None,
            selected_answer_index: None,
            outcome: Outcome::Pending,
            correct_count: 0,
            incorrect_count: 0,
            category_result: CategoryResult::InProgress,
            history: Vec::new(),
        })
    }

    /// Start a category from the category list.
    ///
    /// Ignored while another category is active or when the category has
    /// already been passed in this run; see [`Session::retry_category`].
    pub fn enter_category(&mut self, name: &str) -> Result<bool> {
        self.require_category(name)?;
        if self.active_category.is_some() {
            tracing::debug!(category = name, "Ignoring entry while a category is active");
            return Ok(false);
        }
        if self.is_completed(name) {
            tracing::debug!(category = name, "Ignoring entry into a passed category");
            return Ok(false);
        }
        self.begin(name)?;
        tracing::info!(category = name, sets = self.set_sequence.len(), "Category entered");
        Ok(true)
    }

    /// Start a category again, abandoning any attempt in progress.
    ///
    /// Unlike [`Session::enter_category`] this never consults the
    /// passed-categories gate.
    pub fn retry_category(&mut self, name: &str) -> Result<bool> {
        self.require_category(name)?;
        if self.active_category.is_some() {
            self.clear_active();
        }
        self.begin(name)?;
        tracing::info!(category = name, "Category retried");
        Ok(true)
    }

    /// Answer the current set. Returns the resolution, or `None` if ignored.
    pub fn select_answer(&mut self, index: usize) -> Option<Outcome> {
        if self.outcome != Outcome::Pending || !self.countdown.is_running() {
            return None;
        }
        let lie_index = match &self.presented_set {
            Some(presented) if index < presented.len() => presented.lie_display_index(),
            _ => return None,
        };

        self.selected_answer_index = Some(index);

        if index == lie_index {
            self.outcome = Outcome::Correct;
            self.correct_count += 1;
            tracing::debug!(set = self.current_set_index, "Correct answer");
            return Some(Outcome::Correct);
        }

        self.outcome = Outcome::Incorrect;
        self.incorrect_count += 1;
        let remaining = self.countdown.penalize(self.rules.penalty_ms());
        tracing::debug!(set = self.current_set_index, remaining, "Incorrect answer, penalty applied");

        if self.countdown.is_expired() {
            self.expire();
            return Some(Outcome::TimedOut);
        }
        Some(Outcome::Incorrect)
    }

    /// Advance the shared countdown. Returns true if it expired on this tick.
    pub fn tick(&mut self, elapsed_ms: u64) -> bool {
        if !self.countdown.is_running() {
            return false;
        }
        self.countdown.tick(elapsed_ms);
        if !self.countdown.is_expired() {
            return false;
        }
        self.expire();
        true
    }

    /// Move past a resolved set, or resolve the category after the last one
    pub fn advance(&mut self) -> bool {
        if !matches!(self.outcome, Outcome::Correct | Outcome::Incorrect) {
            return false;
        }

        if self.current_set_index + 1 >= self.set_sequence.len() {
            self.resolve_category();
            return true;
        }

        self.current_set_index += 1;
        match self.present_current_set() {
            Ok(presented) => self.presented_set = Some(presented),
            Err(err) => {
                tracing::warn!("Cannot present set {}: {}", self.current_set_index, err);
                self.resolve_category();
                return true;
            }
        }
        self.selected_answer_index = None;
        self.outcome = Outcome::Pending;
        self.countdown.resume();
        true
    }

    /// Score the active attempt and return to the category list
    pub fn resolve_category(&mut self) -> Option<CategoryResult> {
        let category = self.active_category.clone()?;
        let passed = self.correct_count >= self.rules.min_correct_to_pass;

        self.category_result = if passed {
            if !self.is_completed(&category) {
                self.completed_categories.push(category.clone());
            }
            CategoryResult::Passed
        } else {
            CategoryResult::Failed
        };

        let report = CategoryReport {
            category: category.clone(),
            result: self.category_result,
            correct: self.correct_count,
            incorrect: self.incorrect_count,
            total_sets: self.set_sequence.len(),
            timed_out: self.outcome == Outcome::TimedOut,
            finished_at: Local::now(),
        };
        tracing::info!(
            category = %category,
            correct = report.correct,
            incorrect = report.incorrect,
            timed_out = report.timed_out,
            "Category {}",
            if passed { "passed" } else { "failed" }
        );
        self.history.push(report);

        self.clear_active();
        Some(self.category_result)
    }

    /// Abandon any attempt; passed categories and history survive
    pub fn back_to_categories(&mut self) {
        if let Some(category) = &self.active_category {
            tracing::info!(category = %category, "Category abandoned");
        }
        self.clear_active();
        self.correct_count = 0;
        self.incorrect_count = 0;
        self.category_result = CategoryResult::InProgress;
    }

    pub fn phase(&self) -> Phase {
        match (&self.active_category, self.outcome) {
            (None, _) if self.category_result != CategoryResult::InProgress => {
                Phase::CategoryResult
            }
            (None, _) => Phase::CategorySelect,
            (Some(_), Outcome::Pending) => Phase::InSet,
            (Some(_), Outcome::Correct | Outcome::Incorrect) => Phase::SetResolved,
            (Some(_), Outcome::TimedOut) => Phase::TimedOut,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            active_category: self.active_category.clone(),
            completed_categories: self.completed_categories.clone(),
            set_sequence: self.set_sequence.clone(),
            current_set_index: self.current_set_index,
            presented_set: self.presented_set.clone(),
            selected_answer_index: self.selected_answer_index,
            outcome: self.outcome,
            correct_count: self.correct_count,
            incorrect_count: self.incorrect_count,
            remaining_ms: self.countdown.remaining_ms(),
            timer_running: self.countdown.is_running(),
            category_result: self.category_result,
            phase: self.phase(),
        }
    }

    pub fn active_category(&self) -> Option<&str> {
        self.active_category.as_deref()
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    pub fn incorrect_count(&self) -> u32 {
        self.incorrect_count
    }

    pub fn category_result(&self) -> CategoryResult {
        self.category_result
    }

    pub fn presented_set(&self) -> Option<&PresentedSet> {
        self.presented_set.as_ref()
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn catalog(&self) -> &Arc<QuizCatalog> {
        &self.catalog
    }

    pub fn completed_categories(&self) -> &[String] {
        &self.completed_categories
    }

    pub fn is_completed(&self, name: &str) -> bool {
        self.completed_categories.iter().any(|c| c == name)
    }

    pub fn all_completed(&self) -> bool {
        self.catalog
            .category_names()
            .iter()
            .all(|name| self.is_completed(name))
    }

    /// Finished attempts of this run, oldest first
    pub fn history(&self) -> &[CategoryReport] {
        &self.history
    }

    pub fn last_report(&self) -> Option<&CategoryReport> {
        self.history.last()
    }

    fn require_category(&self, name: &str) -> Result<()> {
        match self.catalog.category(name) {
            Some(_) => Ok(()),
            None => Err(TtalError::UnknownCategory(name.to_string())),
        }
    }

    fn begin(&mut self, name: &str) -> Result<()> {
        let set_sequence = self
            .catalog
            .category(name)
            .map(|c| c.set_ids())
            .ok_or_else(|| TtalError::UnknownCategory(name.to_string()))?;

        self.active_category = Some(name.to_string());
        self.set_sequence = set_sequence;
        self.current_set_index = 0;
        self.correct_count = 0;
        self.incorrect_count = 0;
        self.category_result = CategoryResult::InProgress;
        self.selected_answer_index = None;
        self.outcome = Outcome::Pending;

        match self.present_current_set() {
            Ok(presented) => self.presented_set = Some(presented),
            Err(err) => {
                self.clear_active();
                return Err(err);
            }
        }

        self.countdown.start(self.rules.time_limit_ms());
        Ok(())
    }

    fn present_current_set(&mut self) -> Result<PresentedSet> {
        let category = self.active_category.as_deref().unwrap_or_default();
        let set = self
            .set_sequence
            .get(self.current_set_index)
            .and_then(|id| self.catalog.category(category)?.set(id))
            .ok_or_else(|| {
                TtalError::InvalidCatalog(format!(
                    "set {} of \"{}\" is missing",
                    self.current_set_index, category
                ))
            })?;
        shuffle_for_set(set, &mut self.rng)
    }

    fn expire(&mut self) {
        self.outcome = Outcome::TimedOut;
        self.countdown.cancel();
        tracing::info!(
            category = self.active_category.as_deref().unwrap_or_default(),
            correct = self.correct_count,
            "Time ran out"
        );
        self.resolve_category();
    }

    fn clear_active(&mut self) {
        self.active_category = None;
        self.set_sequence.clear();
        self.current_set_index = 0;
        self.presented_set = None;
        self.selected_answer_index = None;
        self.outcome = Outcome::Pending;
        self.countdown.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, StatementSet};

    fn catalog(sets: usize) -> Arc<QuizCatalog> {
        let mut category = Category::new("Science");
        for i in 0..sets {
            category = category.with_set(
                format!("set{}", i),
                StatementSet::new(
                    [format!("true {} a", i), format!("lie {}", i), format!("true {} b", i)],
                    1,
                ),
            );
        }
        let other = Category::new("Art").with_set("only", StatementSet::new(["x", "y", "z"], 2));
        Arc::new(QuizCatalog::new(vec![category, other]))
    }

    fn session(sets: usize) -> Session {
        Session::with_seed(catalog(sets), GameRules::default(), 3).unwrap()
    }

    fn lie(session: &Session) -> usize {
        session.presented_set().unwrap().lie_display_index()
    }

    fn wrong(session: &Session) -> usize {
        (lie(session) + 1) % 3
    }

    #[test]
    fn test_initial_state() {
        let session = session(10);
        assert_eq!(session.phase(), Phase::CategorySelect);
        assert!(!session.countdown().is_running());
        assert_eq!(session.countdown().remaining_ms(), 60_000);
    }

    #[test]
    fn test_enter_category() {
        let mut session = session(10);
        assert!(session.enter_category("Science").unwrap());

        let snap = session.snapshot();
        assert_eq!(snap.active_category.as_deref(), Some("Science"));
        assert_eq!(snap.set_sequence.len(), 10);
        assert_eq!(snap.set_sequence[0], "set0");
        assert_eq!(snap.current_set_index, 0);
        assert!(snap.timer_running);
        assert_eq!(snap.remaining_ms, 60_000);
        assert_eq!(snap.outcome, Outcome::Pending);
        assert_eq!(snap.phase, Phase::InSet);
    }

    #[test]
    fn test_enter_unknown_category_is_error() {
        let mut session = session(10);
        assert!(matches!(
            session.enter_category("Nope"),
            Err(TtalError::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_only_one_active_category() {
        let mut session = session(10);
        session.enter_category("Science").unwrap();
        assert!(!session.enter_category("Art").unwrap());
        assert_eq!(session.active_category(), Some("Science"));
    }

    #[test]
    fn test_correct_answer_keeps_clock() {
        let mut session = session(10);
        session.enter_category("Science").unwrap();
        session.tick(500);
        assert_eq!(session.select_answer(lie(&session)), Some(Outcome::Correct));
        assert_eq!(session.correct_count(), 1);
        assert_eq!(session.countdown().remaining_ms(), 59_500);
        assert_eq!(session.phase(), Phase::SetResolved);
    }

    #[test]
    fn test_wrong_answer_applies_penalty() {
        let mut session = session(10);
        session.enter_category("Science").unwrap();
        let choice = wrong(&session);
        assert_eq!(session.select_answer(choice), Some(Outcome::Incorrect));
        assert_eq!(session.incorrect_count(), 1);
        assert_eq!(session.countdown().remaining_ms(), 57_000);
        assert_eq!(session.snapshot().selected_answer_index, Some(choice));
    }

    #[test]
    fn test_second_answer_ignored() {
        let mut session = session(10);
        session.enter_category("Science").unwrap();
        let correct = lie(&session);
        session.select_answer(correct);
        assert_eq!(session.select_answer(wrong(&session)), None);
        assert_eq!(session.correct_count(), 1);
        assert_eq!(session.incorrect_count(), 0);
        assert_eq!(session.snapshot().selected_answer_index, Some(correct));
    }

    #[test]
    fn test_answer_without_active_set_ignored() {
        let mut session = session(10);
        assert_eq!(session.select_answer(0), None);
        session.enter_category("Science").unwrap();
        assert_eq!(session.select_answer(3), None);
    }

    #[test]
    fn test_advance_keeps_remaining_time() {
        let mut session = session(10);
        session.enter_category("Science").unwrap();
        session.tick(1_000);
        session.select_answer(lie(&session));
        session.tick(1_500);
        assert!(session.advance());

        let snap = session.snapshot();
        assert_eq!(snap.current_set_index, 1);
        assert_eq!(snap.outcome, Outcome::Pending);
        assert_eq!(snap.selected_answer_index, None);
        assert_eq!(snap.remaining_ms, 57_500);
        assert!(snap.timer_running);
    }

    #[test]
    fn test_advance_requires_resolved_answer() {
        let mut session = session(10);
        assert!(!session.advance());
        session.enter_category("Science").unwrap();
        assert!(!session.advance());
        assert_eq!(session.snapshot().current_set_index, 0);
    }

    #[test]
    fn test_tick_expiry_resolves_category() {
        let mut session = session(10);
        session.enter_category("Science").unwrap();
        assert!(!session.tick(59_990));
        assert!(session.tick(20));

        let snap = session.snapshot();
        assert_eq!(snap.phase, Phase::CategoryResult);
        assert_eq!(snap.category_result, CategoryResult::Failed);
        assert!(!snap.timer_running);
        assert_eq!(snap.remaining_ms, 60_000);
        assert_eq!(snap.correct_count + snap.incorrect_count, 0);
        assert!(session.last_report().unwrap().timed_out);
    }

    #[test]
    fn test_stale_advance_after_timeout_is_ignored() {
        let mut session = session(10);
        session.enter_category("Science").unwrap();
        session.select_answer(lie(&session));
        session.tick(60_000);
        assert!(!session.advance());
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_completed_category_gate_and_retry() {
        let mut session = session(1);
        session.enter_category("Art").unwrap();
        session.select_answer(lie(&session));
        session.advance();
        // One correct out of one does not reach seven
        assert_eq!(session.category_result(), CategoryResult::Failed);

        let rules = GameRules {
            min_correct_to_pass: 1,
            ..GameRules::default()
        };
        let mut session = Session::with_seed(catalog(1), rules, 9).unwrap();
        session.enter_category("Art").unwrap();
        session.select_answer(lie(&session));
        session.advance();
        assert!(session.is_completed("Art"));

        assert!(!session.enter_category("Art").unwrap());
        assert!(session.retry_category("Art").unwrap());
        session.select_answer(lie(&session));
        session.advance();
        assert_eq!(session.completed_categories(), &["Art".to_string()]);
    }

    #[test]
    fn test_back_to_categories_preserves_completed() {
        let rules = GameRules {
            min_correct_to_pass: 1,
            ..GameRules::default()
        };
        let mut session = Session::with_seed(catalog(3), rules, 11).unwrap();
        session.enter_category("Art").unwrap();
        session.select_answer(lie(&session));
        session.advance();

        session.enter_category("Science").unwrap();
        session.select_answer(lie(&session));
        session.back_to_categories();

        let snap = session.snapshot();
        assert_eq!(snap.phase, Phase::CategorySelect);
        assert_eq!(snap.active_category, None);
        assert_eq!(snap.correct_count, 0);
        assert!(!snap.timer_running);
        assert_eq!(snap.remaining_ms, 60_000);
        assert_eq!(snap.completed_categories, vec!["Art".to_string()]);
    }

    #[test]
    fn test_invalid_catalog_rejected() {
        let bad = Arc::new(QuizCatalog::new(vec![
            Category::new("Bad").with_set("s", StatementSet::new(["a", "a", "b"], 0)),
        ]));
        assert!(Session::new(bad, GameRules::default()).is_err());
    }
}
