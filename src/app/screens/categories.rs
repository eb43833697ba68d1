//! Category list screen
//!
//! Lists the catalog's categories in file order. Passed categories are marked
//! and cannot be entered again from here. Also renders the loading and
//! unavailable placeholders shown before a catalog is ready.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::game::Session;

/// Category selection component
#[derive(Debug)]
pub struct CategoriesScreen {
    selected_index: usize,
    list_state: ListState,
}

impl CategoriesScreen {
    /// Create a new category screen
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            selected_index: 0,
            list_state,
        }
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    /// Move the highlight to a specific row, if it exists
    pub fn select(&mut self, index: usize, len: usize) -> bool {
        if index >= len {
            return false;
        }
        self.selected_index = index;
        self.list_state.select(Some(index));
        true
    }

    /// Move selection up
    pub fn select_previous(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        if self.selected_index > 0 {
            self.selected_index -= 1;
        } else {
            self.selected_index = len - 1;
        }
        self.list_state.select(Some(self.selected_index));
    }

    /// Move selection down
    pub fn select_next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        if self.selected_index + 1 < len {
            self.selected_index += 1;
        } else {
            self.selected_index = 0;
        }
        self.list_state.select(Some(self.selected_index));
    }

    /// Name of the highlighted category, if it can be entered
    pub fn selected_category<'a>(&self, session: &'a Session) -> Option<&'a str> {
        let name = *session
            .catalog()
            .category_names()
            .get(self.selected_index)?;
        if session.is_completed(name) {
            None
        } else {
            Some(name)
        }
    }

    /// Render the category list
    pub fn render(&mut self, f: &mut Frame, session: &Session) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // Title and subtitle
                Constraint::Min(6),    // Category list
                Constraint::Length(2), // Progress line
                Constraint::Length(3), // Help text
            ])
            .split(f.size());

        render_title(f, chunks[0]);
        self.render_list(f, chunks[1], session);
        render_progress(f, chunks[2], session);
        render_help(f, chunks[3]);
    }

    /// Render the placeholder shown while the catalog is fetched
    pub fn render_loading(&self, f: &mut Frame) {
        self.render_placeholder(
            f,
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Loading questions...",
                    Style::default().fg(Color::Cyan),
                )),
            ],
        );
    }

    /// Render the placeholder shown when no catalog could be loaded
    pub fn render_unavailable(&self, f: &mut Frame, reason: &str) {
        self.render_placeholder(
            f,
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Error loading questions.",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    reason.to_string(),
                    Style::default().fg(Color::DarkGray),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Press Q to quit",
                    Style::default().fg(Color::Yellow),
                )),
            ],
        );
    }

    fn render_placeholder(&self, f: &mut Frame, text: Vec<Line>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(6)])
            .split(f.size());

        render_title(f, chunks[0]);

        let body = Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        f.render_widget(body, chunks[1]);
    }

    fn render_list(&mut self, f: &mut Frame, area: Rect, session: &Session) {
        let items: Vec<ListItem> = session
            .catalog()
            .category_names()
            .into_iter()
            .map(|name| {
                let completed = session.is_completed(name);
                let style = if completed {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default()
                };
                ListItem::new(category_label(name, completed)).style(style)
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Choose a Category"),
            )
            .highlight_style(Style::default().bg(Color::Cyan).fg(Color::Black))
            .highlight_symbol(">> ");

        f.render_stateful_widget(list, area, &mut self.list_state);
    }
}

impl Default for CategoriesScreen {
    fn default() -> Self {
        Self::new()
    }
}

/// List label for a category
pub fn category_label(name: &str, completed: bool) -> String {
    if completed {
        format!("✓ {} (completed)", name)
    } else {
        format!("  {}", name)
    }
}

/// Line under the list summarising progress through the catalog
pub fn progress_line(session: &Session) -> String {
    if session.all_completed() {
        return "Congratulations! You've completed all categories!".to_string();
    }
    format!(
        "Completed {} of {} categories",
        session.completed_categories().len(),
        session.catalog().len()
    )
}

fn render_title(f: &mut Frame, area: Rect) {
    let title_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Main title
            Constraint::Length(2), // Subtitle
        ])
        .split(area);

    let title = Paragraph::new("TWO TRUTHS AND A LIE")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
    f.render_widget(title, title_chunks[0]);

    let subtitle = Paragraph::new("Spot the false statement before the clock runs out")
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center);
    f.render_widget(subtitle, title_chunks[1]);
}

fn render_progress(f: &mut Frame, area: Rect, session: &Session) {
    let style = if session.all_completed() {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let progress = Paragraph::new(progress_line(session))
        .style(style)
        .alignment(Alignment::Center);
    f.render_widget(progress, area);
}

fn render_help(f: &mut Frame, area: Rect) {
    let key = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let help_text = vec![Line::from(vec![
        Span::styled("↑↓", key),
        Span::raw(" Navigate  "),
        Span::styled("Enter", key),
        Span::raw(" Play  "),
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
