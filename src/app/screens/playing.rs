//! Playing screen implementation
//!
//! Shows the current statement set with the shared category countdown,
//! the running score, and feedback once the set has been answered.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph},
    Frame,
};

use crate::game::{GameRules, Outcome, SessionSnapshot};
use crate::util::clock::{format_penalty, format_timer};

/// Below this the countdown is drawn in the warning style
pub const WARNING_THRESHOLD_MS: u64 = 10_000;

/// How one statement row should be highlighted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementMark {
    /// Unanswered, not under the cursor
    Plain,
    /// Unanswered, under the cursor
    Cursor,
    /// The lie, revealed after answering
    Lie,
    /// The player's pick when it was not the lie
    WrongPick,
    /// A true statement after answering
    Dimmed,
}

/// Playing screen component
#[derive(Debug, Default)]
pub struct PlayingScreen {
    cursor: usize,
    /// Set index the cursor belongs to
    shown_set: Option<usize>,
}

impl PlayingScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Put the cursor back on the first statement
    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
        self.shown_set = None;
    }

    /// Reset the cursor whenever a different set comes up
    pub fn follow_set(&mut self, set_index: usize) {
        if self.shown_set != Some(set_index) {
            self.cursor = 0;
            self.shown_set = Some(set_index);
        }
    }

    pub fn select_previous(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.cursor = if self.cursor == 0 { len - 1 } else { self.cursor - 1 };
    }

    pub fn select_next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.cursor = (self.cursor + 1) % len;
    }

    /// Render the playing screen
    pub fn render(
        &mut self,
        f: &mut Frame,
        snapshot: &SessionSnapshot,
        rules: &GameRules,
        penalty_visible: bool,
    ) {
        self.follow_set(snapshot.current_set_index);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Category and set header
                Constraint::Length(3), // Countdown gauge
                Constraint::Length(3), // Score
                Constraint::Min(7),    // Statements
                Constraint::Length(3), // Feedback
                Constraint::Length(3), // Help text
            ])
            .split(f.size());

        render_header(f, chunks[0], snapshot);
        render_timer(f, chunks[1], snapshot, rules, penalty_visible);
        render_score(f, chunks[2], snapshot, rules);
        self.render_statements(f, chunks[3], snapshot);
        render_feedback(f, chunks[4], snapshot);
        render_help(f, chunks[5], snapshot);
    }

    fn render_statements(&self, f: &mut Frame, area: Rect, snapshot: &SessionSnapshot) {
        let statements = snapshot
            .presented_set
            .as_ref()
            .map(|set| set.statements())
            .unwrap_or_default();
        let marks = statement_marks(snapshot, self.cursor);

        let items: Vec<ListItem> = statements
            .iter()
            .zip(marks)
            .enumerate()
            .map(|(i, (statement, mark))| {
                let (prefix, style) = match mark {
                    StatementMark::Plain => ("  ", Style::default()),
                    StatementMark::Cursor => (
                        ">>",
                        Style::default().bg(Color::Cyan).fg(Color::Black),
                    ),
                    StatementMark::Lie => (
                        "✓ ",
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    ),
                    StatementMark::WrongPick => (
                        "✗ ",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                    StatementMark::Dimmed => ("  ", Style::default().fg(Color::DarkGray)),
                };
                ListItem::new(format!("{} {}. {}", prefix, i + 1, statement)).style(style)
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .title("Which one is the lie?")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );

        f.render_widget(list, area);
    }
}

/// Highlight for each displayed statement
pub fn statement_marks(snapshot: &SessionSnapshot, cursor: usize) -> Vec<StatementMark> {
    let Some(presented) = &snapshot.presented_set else {
        return Vec::new();
    };

    (0..presented.len())
        .map(|i| match snapshot.outcome {
            Outcome::Pending if i == cursor => StatementMark::Cursor,
            Outcome::Pending => StatementMark::Plain,
            _ if i == presented.lie_display_index() => StatementMark::Lie,
            _ if Some(i) == snapshot.selected_answer_index => StatementMark::WrongPick,
            _ => StatementMark::Dimmed,
        })
        .collect()
}

/// Feedback shown under the statements once the set is answered
pub fn feedback_line(snapshot: &SessionSnapshot) -> Option<String> {
    match snapshot.outcome {
        Outcome::Correct => Some("Correct! You found the lie.".to_string()),
        Outcome::Incorrect => {
            let lie = snapshot.presented_set.as_ref()?.lie();
            Some(format!("Incorrect. The lie was: {}", lie))
        }
        Outcome::TimedOut => Some("Time's up!".to_string()),
        Outcome::Pending => None,
    }
}

/// "Set i / N" header text
pub fn set_position(snapshot: &SessionSnapshot) -> String {
    format!(
        "Set {} / {}",
        snapshot.current_set_index + 1,
        snapshot.set_sequence.len()
    )
}

pub fn is_warning(remaining_ms: u64) -> bool {
    remaining_ms < WARNING_THRESHOLD_MS
}

fn render_header(f: &mut Frame, area: Rect, snapshot: &SessionSnapshot) {
    let category = snapshot.active_category.as_deref().unwrap_or_default();
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            category.to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::raw(set_position(snapshot)),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn render_timer(
    f: &mut Frame,
    area: Rect,
    snapshot: &SessionSnapshot,
    rules: &GameRules,
    penalty_visible: bool,
) {
    let total = rules.time_limit_ms().max(1);
    let ratio = (snapshot.remaining_ms as f64 / total as f64).clamp(0.0, 1.0);
    let color = if is_warning(snapshot.remaining_ms) {
        Color::Red
    } else {
        Color::Green
    };

    let mut label = format_timer(snapshot.remaining_ms);
    if penalty_visible {
        label = format!("{}  {}", label, format_penalty(rules.penalty_ms()));
    }

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title("Time")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        )
        .gauge_style(Style::default().fg(color))
        .ratio(ratio)
        .label(Span::styled(
            label,
            Style::default().add_modifier(Modifier::BOLD),
        ));

    f.render_widget(gauge, area);
}

fn render_score(f: &mut Frame, area: Rect, snapshot: &SessionSnapshot, rules: &GameRules) {
    let score = Paragraph::new(Line::from(vec![
        Span::styled(
            format!("Correct: {}", snapshot.correct_count),
            Style::default().fg(Color::Green),
        ),
        Span::raw("   "),
        Span::styled(
            format!("Incorrect: {}", snapshot.incorrect_count),
            Style::default().fg(Color::Red),
        ),
        Span::raw("   "),
        Span::styled(
            format!("(Need {} correct to pass)", rules.min_correct_to_pass),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));

    f.render_widget(score, area);
}

fn render_feedback(f: &mut Frame, area: Rect, snapshot: &SessionSnapshot) {
    let style = match snapshot.outcome {
        Outcome::Correct => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        Outcome::Incorrect | Outcome::TimedOut => {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        }
        Outcome::Pending => Style::default(),
    };
    let text = feedback_line(snapshot).unwrap_or_default();

    let feedback = Paragraph::new(Span::styled(text, style))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(feedback, area);
}

fn render_help(f: &mut Frame, area: Rect, snapshot: &SessionSnapshot) {
    let key = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let help_text = if snapshot.outcome == Outcome::Pending {
        Line::from(vec![
            Span::styled("↑↓", key),
            Span::raw(" Move  "),
            Span::styled("Enter", key),
            Span::raw(" Answer  "),
            Span::styled("1-3", key),
            Span::raw(" Pick  "),
            Span::styled("Esc", key),
            Span::raw(" Categories"),
        ])
    } else {
        Line::from(vec![
            Span::raw("Next set coming up...  "),
            Span::styled("Esc", key),
            Span::raw(" Categories"),
        ])
    };

    let help = Paragraph::new(help_text)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        );

    f.render_widget(help, area);
}
