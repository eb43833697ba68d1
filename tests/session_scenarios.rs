//! End-to-end runs of the session state machine over whole categories

use std::sync::Arc;

use ttal::catalog::{Category, QuizCatalog, StatementSet};
use ttal::game::{CategoryResult, Countdown, GameRules, Outcome, Phase, Session};

fn catalog() -> Arc<QuizCatalog> {
    let categories = ["Animals", "Space"]
        .iter()
        .map(|name| {
            (0..10).fold(Category::new(*name), |category, i| {
                category.with_set(
                    format!("set{}", i + 1),
                    StatementSet::new(
                        [
                            format!("{} truth {}", name, i),
                            format!("{} lie {}", name, i),
                            format!("{} other truth {}", name, i),
                        ],
                        1,
                    ),
                )
            })
        })
        .collect();
    Arc::new(QuizCatalog::new(categories))
}

fn session() -> Session {
    Session::with_seed(catalog(), GameRules::default(), 2024).unwrap()
}

fn lie(session: &Session) -> usize {
    session.presented_set().unwrap().lie_display_index()
}

fn wrong(session: &Session) -> usize {
    (lie(session) + 1) % 3
}

/// Answer the current set and move on
fn answer(session: &mut Session, correct: bool) -> Outcome {
    let index = if correct { lie(session) } else { wrong(session) };
    let outcome = session.select_answer(index).unwrap();
    if matches!(outcome, Outcome::Correct | Outcome::Incorrect) {
        assert!(session.advance());
    }
    outcome
}

#[test]
fn test_all_correct_passes_category() {
    let mut session = session();
    assert!(session.enter_category("Animals").unwrap());

    for _ in 0..10 {
        assert_eq!(answer(&mut session, true), Outcome::Correct);
    }

    assert_eq!(session.correct_count(), 10);
    assert_eq!(session.category_result(), CategoryResult::Passed);
    assert_eq!(session.completed_categories(), ["Animals".to_string()]);
    assert_eq!(session.phase(), Phase::CategoryResult);
    assert!(session.active_category().is_none());
}

#[test]
fn test_six_correct_then_four_wrong_fails() {
    let mut session = session();
    session.enter_category("Animals").unwrap();

    for _ in 0..6 {
        answer(&mut session, true);
    }
    for _ in 0..4 {
        assert_eq!(answer(&mut session, false), Outcome::Incorrect);
    }

    assert_eq!(session.correct_count(), 6);
    assert_eq!(session.incorrect_count(), 4);
    assert_eq!(session.category_result(), CategoryResult::Failed);
    assert!(session.completed_categories().is_empty());

    let report = session.last_report().unwrap();
    assert!(!report.timed_out);
    assert_eq!(report.total_sets, 10);
}

#[test]
fn test_penalty_that_empties_clock_is_a_timeout() {
    let mut session = session();
    session.enter_category("Animals").unwrap();
    answer(&mut session, true);

    assert!(!session.tick(58_000));
    assert_eq!(session.countdown().remaining_ms(), 2_000);

    let index = wrong(&session);
    assert_eq!(session.select_answer(index), Some(Outcome::TimedOut));

    // Resolved immediately, no advance needed
    assert_eq!(session.incorrect_count(), 1);
    assert_eq!(session.correct_count(), 1);
    assert_eq!(session.category_result(), CategoryResult::Failed);
    assert_eq!(session.countdown().remaining_ms(), 60_000);
    assert!(!session.countdown().is_running());
    assert!(session.last_report().unwrap().timed_out);
    assert!(!session.advance());
}

#[test]
fn test_clock_running_out_resolves_with_current_score() {
    let mut session = session();
    session.enter_category("Space").unwrap();
    for _ in 0..7 {
        answer(&mut session, true);
    }

    let mut expired = false;
    for _ in 0..6_000 {
        if session.tick(10) {
            expired = true;
            break;
        }
    }
    assert!(expired);

    // Seven correct before the clock ran out is still a pass
    let report = session.last_report().unwrap();
    assert!(report.timed_out);
    assert_eq!(report.correct, 7);
    assert_eq!(report.incorrect, 0);
    assert_eq!(session.category_result(), CategoryResult::Passed);
    assert!(session.is_completed("Space"));
}

#[test]
fn test_counters_track_answers_only() {
    let mut session = session();
    session.enter_category("Animals").unwrap();

    let pattern = [true, false, true, true, false];
    for (answered, correct) in pattern.iter().enumerate() {
        answer(&mut session, *correct);
        assert_eq!(
            (session.correct_count() + session.incorrect_count()) as usize,
            answered + 1
        );
    }

    // Ticking the clock away adds to neither counter
    while !session.tick(1_000) {}
    assert_eq!(session.correct_count() + session.incorrect_count(), 5);
}

#[test]
fn test_second_answer_is_ignored() {
    let mut session = session();
    session.enter_category("Animals").unwrap();

    let index = lie(&session);
    assert_eq!(session.select_answer(index), Some(Outcome::Correct));
    assert_eq!(session.select_answer(wrong(&session)), None);
    assert_eq!(session.correct_count(), 1);
    assert_eq!(session.incorrect_count(), 0);
    assert_eq!(session.countdown().remaining_ms(), 60_000);
}

#[test]
fn test_penalties_floor_at_zero() {
    let mut countdown = Countdown::new(60_000);
    countdown.start(2_500);
    assert_eq!(countdown.penalize(3_000), 0);
    assert_eq!(countdown.penalize(3_000), 0);
    assert_eq!(countdown.remaining_ms(), 0);
    assert!(!countdown.is_running());
}

#[test]
fn test_pass_threshold_is_seven() {
    for correct in 0..=10u32 {
        let mut session = session();
        session.enter_category("Animals").unwrap();
        for i in 0..10 {
            answer(&mut session, i < correct);
        }
        let expected = if correct >= 7 {
            CategoryResult::Passed
        } else {
            CategoryResult::Failed
        };
        assert_eq!(session.category_result(), expected, "{} correct", correct);
    }
}

#[test]
fn test_passed_category_is_gated_but_retry_is_not() {
    let mut session = session();
    session.enter_category("Animals").unwrap();
    for _ in 0..10 {
        answer(&mut session, true);
    }
    session.back_to_categories();

    assert!(!session.enter_category("Animals").unwrap());
    assert_eq!(session.phase(), Phase::CategorySelect);

    assert!(session.retry_category("Animals").unwrap());
    assert_eq!(session.phase(), Phase::InSet);
    assert_eq!(session.correct_count(), 0);

    // A failed retry never removes the category from the passed list
    for _ in 0..10 {
        answer(&mut session, false);
    }
    assert_eq!(session.category_result(), CategoryResult::Failed);
    assert!(session.is_completed("Animals"));
    assert_eq!(session.completed_categories().len(), 1);
}

#[test]
fn test_sets_follow_catalog_order() {
    let mut session = session();
    session.enter_category("Space").unwrap();
    let snapshot = session.snapshot();
    let expected: Vec<String> = (1..=10).map(|i| format!("set{}", i)).collect();
    assert_eq!(snapshot.set_sequence, expected);

    for i in 0..3 {
        let presented = session.presented_set().unwrap();
        assert_eq!(presented.lie(), format!("Space lie {}", i));
        answer(&mut session, true);
    }
}

#[test]
fn test_completing_every_category() {
    let mut session = session();
    for name in ["Animals", "Space"] {
        session.enter_category(name).unwrap();
        for _ in 0..10 {
            answer(&mut session, true);
        }
        session.back_to_categories();
    }
    assert!(session.all_completed());
    assert_eq!(session.history().len(), 2);
}
