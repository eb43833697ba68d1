//! Application state management
//!
//! Handles screen transitions, navigation logic, and keyboard event processing
//! for the TUI application.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Application screens/states
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppState {
    /// Waiting for the question catalog
    #[default]
    Loading,
    /// Catalog could not be loaded
    Unavailable,
    /// Category list
    Categories,
    /// Answering the sets of a category
    Playing,
    /// Category passed, failed, or timed out
    Results,
}

/// Navigation actions that can be triggered by keyboard input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationAction {
    /// Move selection up (arrow up, k)
    Up,
    /// Move selection down (arrow down, j)
    Down,
    /// Move selection left (arrow left, h)
    Left,
    /// Move selection right (arrow right, l)
    Right,
    /// Confirm selection (Enter, Space)
    Select,
    /// Pick an entry directly by its 0-based position (1-9)
    Choose(usize),
    /// Go back/cancel (Esc, Backspace)
    Back,
    /// Quit application (q, Q, Ctrl+C)
    Quit,
    /// No action
    None,
}

/// Application state manager
#[derive(Debug)]
pub struct StateManager {
    current_state: AppState,
    should_quit: bool,
}

impl StateManager {
    /// Create a new state manager waiting for the catalog
    pub fn new() -> Self {
        Self {
            current_state: AppState::Loading,
            should_quit: false,
        }
    }

    /// Get the current application state
    pub fn current_state(&self) -> &AppState {
        &self.current_state
    }

    /// Check if the application should quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Set the quit flag
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Transition to a new state
    pub fn transition_to(&mut self, new_state: AppState) {
        if new_state != self.current_state {
            tracing::debug!(from = ?self.current_state, to = ?new_state, "Screen transition");
            self.current_state = new_state;
        }
    }

    /// Handle the screen-independent part of a navigation action.
    /// Returns true if the action was consumed.
    pub fn handle_navigation(&mut self, action: &NavigationAction) -> bool {
        match (action, &self.current_state) {
            (NavigationAction::Quit, _) => {
                self.should_quit = true;
                true
            }
            // Nothing to go back to from these screens
            (
                NavigationAction::Back,
                AppState::Loading | AppState::Unavailable | AppState::Categories,
            ) => {
                self.should_quit = true;
                true
            }
            _ => false,
        }
    }

    /// Convert keyboard event to navigation action
    pub fn key_to_navigation(key: KeyEvent) -> NavigationAction {
        match key.code {
            // Quit keys
            KeyCode::Char('q') | KeyCode::Char('Q') => NavigationAction::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                NavigationAction::Quit
            }

            // Navigation keys
            KeyCode::Up | KeyCode::Char('k') => NavigationAction::Up,
            KeyCode::Down | KeyCode::Char('j') => NavigationAction::Down,
            KeyCode::Left | KeyCode::Char('h') => NavigationAction::Left,
            KeyCode::Right | KeyCode::Char('l') => NavigationAction::Right,

            // Selection and confirmation
            KeyCode::Enter | KeyCode::Char(' ') => NavigationAction::Select,
            KeyCode::Char(c @ '1'..='9') => NavigationAction::Choose(c as usize - '1' as usize),

            // Back/cancel
            KeyCode::Esc | KeyCode::Backspace => NavigationAction::Back,

            _ => NavigationAction::None,
        }
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}
