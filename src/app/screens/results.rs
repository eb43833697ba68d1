//! Results screen implementation
//!
//! Shows how the category attempt ended, the score against the pass
//! threshold, and the attempts made so far in this run.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table},
    Frame,
};

use crate::game::CategoryReport;

/// Results screen component
#[derive(Debug)]
pub struct ResultsScreen {
    /// The attempt that just finished
    report: Option<CategoryReport>,
    /// Every finished attempt of the run, oldest first
    history: Vec<CategoryReport>,
    /// Correct answers needed to pass
    pass_mark: u32,
    /// Selected action
    selected_action: ResultAction,
}

/// Available actions on the results screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultAction {
    TryAgain,
    Back,
}

impl ResultAction {
    /// Actions offered for a finished attempt. A passed category cannot be
    /// replayed, so it only offers the way back.
    pub fn available(report: Option<&CategoryReport>) -> Vec<Self> {
        match report {
            Some(report) if !report.passed() => vec![Self::TryAgain, Self::Back],
            _ => vec![Self::Back],
        }
    }

    /// Get display text for the action
    pub fn display_text(&self) -> &'static str {
        match self {
            Self::TryAgain => "Try Again",
            Self::Back => "Back to Categories",
        }
    }
}

impl ResultsScreen {
    /// Create a new results screen
    pub fn new() -> Self {
        Self {
            report: None,
            history: Vec::new(),
            pass_mark: 0,
            selected_action: ResultAction::Back,
        }
    }

    /// Show a finished attempt
    pub fn set_report(
        &mut self,
        report: CategoryReport,
        history: Vec<CategoryReport>,
        pass_mark: u32,
    ) {
        self.selected_action = ResultAction::available(Some(&report))
            .into_iter()
            .next()
            .unwrap_or(ResultAction::Back);
        self.report = Some(report);
        self.history = history;
        self.pass_mark = pass_mark;
    }

    /// Get the current report
    pub fn report(&self) -> Option<&CategoryReport> {
        self.report.as_ref()
    }

    /// Get selected action
    pub fn selected_action(&self) -> &ResultAction {
        &self.selected_action
    }

    /// Select next action
    pub fn select_next_action(&mut self) {
        let actions = ResultAction::available(self.report.as_ref());
        let current_index = actions
            .iter()
            .position(|a| a == &self.selected_action)
            .unwrap_or(0);
        let next_index = (current_index + 1) % actions.len();
        self.selected_action = actions[next_index].clone();
    }

    /// Select previous action
    pub fn select_previous_action(&mut self) {
        let actions = ResultAction::available(self.report.as_ref());
        let current_index = actions
            .iter()
            .position(|a| a == &self.selected_action)
            .unwrap_or(0);
        let prev_index = if current_index == 0 {
            actions.len() - 1
        } else {
            current_index - 1
        };
        self.selected_action = actions[prev_index].clone();
    }

    /// Render the results screen
    pub fn render(&mut self, f: &mut Frame) {
        let size = f.size();

        let Some(report) = &self.report else {
            self.render_no_results(f, size);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(5), // Score
                Constraint::Min(6),    // Attempt history
                Constraint::Length(3), // Actions
                Constraint::Length(3), // Help text
            ])
            .split(size);

        render_title(f, chunks[0], report);
        render_score(f, chunks[1], report, self.pass_mark);
        self.render_history(f, chunks[2]);
        self.render_actions(f, chunks[3]);
        render_help(f, chunks[4]);
    }

    /// Render when no attempt has finished yet
    fn render_no_results(&self, f: &mut Frame, area: Rect) {
        let text = vec![
            Line::from(""),
            Line::from("No finished category yet"),
            Line::from(""),
            Line::from(Span::styled(
                "Press Esc to go back",
                Style::default().fg(Color::Yellow),
            )),
        ];

        let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .title("Results")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );

        f.render_widget(paragraph, area);
    }

    fn render_history(&self, f: &mut Frame, area: Rect) {
        let header = Row::new(vec!["Time", "Category", "Result", "Correct", "Incorrect"]).style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

        // Newest first
        let rows: Vec<Row> = self
            .history
            .iter()
            .rev()
            .map(|report| {
                Row::new(vec![
                    report.finished_at.format("%H:%M:%S").to_string(),
                    report.category.clone(),
                    verdict(report).to_string(),
                    format!("{}/{}", report.correct, report.total_sets),
                    report.incorrect.to_string(),
                ])
                .style(Style::default().fg(verdict_color(report)))
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(10),
                Constraint::Min(16),
                Constraint::Length(10),
                Constraint::Length(8),
                Constraint::Length(10),
            ],
        )
        .header(header)
        .block(
            Block::default()
                .title("This Session")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .column_spacing(1);

        f.render_widget(table, area);
    }

    fn render_actions(&self, f: &mut Frame, area: Rect) {
        let mut spans = Vec::new();
        for action in ResultAction::available(self.report.as_ref()) {
            let style = if action == self.selected_action {
                Style::default().bg(Color::Cyan).fg(Color::Black)
            } else {
                Style::default().fg(Color::White)
            };
            spans.push(Span::styled(format!(" {} ", action.display_text()), style));
            spans.push(Span::raw("   "));
        }

        let actions = Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));

        f.render_widget(actions, area);
    }
}

impl Default for ResultsScreen {
    fn default() -> Self {
        Self::new()
    }
}

/// Heading for a finished attempt
pub fn title_text(report: &CategoryReport) -> &'static str {
    if report.passed() {
        "Category Passed!"
    } else if report.timed_out {
        "Time's up!"
    } else {
        "Category Failed"
    }
}

/// "You got X out of N correct"
pub fn score_text(report: &CategoryReport) -> String {
    format!(
        "You got {} out of {} correct",
        report.correct, report.total_sets
    )
}

fn verdict(report: &CategoryReport) -> &'static str {
    if report.passed() {
        "Passed"
    } else if report.timed_out {
        "Time's up"
    } else {
        "Failed"
    }
}

fn verdict_color(report: &CategoryReport) -> Color {
    if report.passed() {
        Color::Green
    } else if report.timed_out {
        Color::Yellow
    } else {
        Color::Red
    }
}

fn render_title(f: &mut Frame, area: Rect, report: &CategoryReport) {
    let color = verdict_color(report);
    let title = Paragraph::new(title_text(report))
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );

    f.render_widget(title, area);
}

fn render_score(f: &mut Frame, area: Rect, report: &CategoryReport, pass_mark: u32) {
    let text = vec![
        Line::from(Span::styled(
            report.category.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(score_text(report)),
        Line::from(Span::styled(
            format!(
                "Incorrect answers: {}  (Need {} correct to pass)",
                report.incorrect, pass_mark
            ),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let score = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(score, area);
}

fn render_help(f: &mut Frame, area: Rect) {
    let key = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let help_text = vec![Line::from(vec![
        Span::styled("←→", key),
        Span::raw(" Choose  "),
        Span::styled("Enter", key),
        Span::raw(" Confirm  "),
        Span::styled("Esc", key),
        Span::raw(" Categories  "),
        Span::styled("Q", key),
        Span::raw(" Quit"),
    ])];

    let help = Paragraph::new(help_text)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        );

    f.render_widget(help, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::CategoryResult;
    use chrono::Local;

    fn report(result: CategoryResult, correct: u32, timed_out: bool) -> CategoryReport {
        CategoryReport {
            category: "Space".to_string(),
            result,
            correct,
            incorrect: 10 - correct,
            total_sets: 10,
            timed_out,
            finished_at: Local::now(),
        }
    }

    #[test]
    fn test_passed_offers_only_back() {
        let mut screen = ResultsScreen::new();
        let passed = report(CategoryResult::Passed, 8, false);
        screen.set_report(passed.clone(), vec![passed], 7);
        assert_eq!(screen.selected_action(), &ResultAction::Back);

        screen.select_next_action();
        assert_eq!(screen.selected_action(), &ResultAction::Back);
    }

    #[test]
    fn test_failed_offers_try_again_first() {
        let mut screen = ResultsScreen::new();
        let failed = report(CategoryResult::Failed, 4, false);
        screen.set_report(failed.clone(), vec![failed], 7);
        assert_eq!(screen.selected_action(), &ResultAction::TryAgain);

        screen.select_next_action();
        assert_eq!(screen.selected_action(), &ResultAction::Back);
        screen.select_next_action();
        assert_eq!(screen.selected_action(), &ResultAction::TryAgain);
        screen.select_previous_action();
        assert_eq!(screen.selected_action(), &ResultAction::Back);
    }

    #[test]
    fn test_titles() {
        assert_eq!(title_text(&report(CategoryResult::Passed, 7, false)), "Category Passed!");
        assert_eq!(title_text(&report(CategoryResult::Failed, 6, false)), "Category Failed");
        assert_eq!(title_text(&report(CategoryResult::Failed, 3, true)), "Time's up!");
        assert_eq!(score_text(&report(CategoryResult::Passed, 9, false)), "You got 9 out of 10 correct");
    }

    #[test]
    fn test_action_labels() {
        assert_eq!(ResultAction::TryAgain.display_text(), "Try Again");
        assert_eq!(ResultAction::Back.display_text(), "Back to Categories");
    }
}
