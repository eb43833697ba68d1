//! Main application controller
//!
//! Manages the TUI, application state, and screen rendering loop.

use std::io;
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::{
    app::{
        screens::{CategoriesScreen, PlayingScreen, ResultAction, ResultsScreen},
        state::{AppState, NavigationAction, StateManager},
        tui::Tui,
    },
    catalog::{load_catalog_async, CatalogStatus, QuizCatalog},
    config::GameConfig,
    game::{GameController, Session},
    Result, TtalError,
};

/// TUI application controller
pub struct App {
    /// Terminal UI handler
    tui: Tui,
    /// Application state manager
    state_manager: StateManager,
    /// Application config
    config: GameConfig,
    /// Fixed shuffle seed, if any
    seed: Option<u64>,
    /// Where the question catalog stands
    catalog_status: CatalogStatus,
    /// Pending background catalog load
    catalog_rx: Option<oneshot::Receiver<Result<QuizCatalog>>>,
    /// Game state and its timers, once the catalog is ready
    game: Option<GameController>,
    /// Screen components
    categories_screen: CategoriesScreen,
    playing_screen: PlayingScreen,
    results_screen: ResultsScreen,
}

impl App {
    /// Create a new application instance
    pub fn new(config: GameConfig, seed: Option<u64>) -> Result<Self> {
        Ok(Self {
            tui: Tui::new()?,
            state_manager: StateManager::new(),
            config,
            seed,
            catalog_status: CatalogStatus::Loading,
            catalog_rx: None,
            game: None,
            categories_screen: CategoriesScreen::new(),
            playing_screen: PlayingScreen::new(),
            results_screen: ResultsScreen::new(),
        })
    }

    /// Initialize the TUI and start fetching the catalog
    pub fn init(&mut self) -> Result<()> {
        self.tui.init()?;

        let path = self.config.catalog_path.clone();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let _ = tx.send(load_catalog_async(&path).await);
        });
        self.catalog_rx = Some(rx);
        Ok(())
    }

    /// Run the main application loop
    pub async fn run(&mut self) -> Result<()> {
        while !self.state_manager.should_quit() {
            self.poll_catalog();
            if let Some(game) = &mut self.game {
                game.poll();
            }
            self.sync_screen();
            self.draw()
                .map_err(|e| TtalError::TuiError(format!("Failed to draw screen: {}", e)))?;
            self.handle_events()?;
            tokio::task::yield_now().await;
        }
        Ok(())
    }

    /// Restore the terminal
    pub fn shutdown(&mut self) -> Result<()> {
        self.tui.restore()?;
        Ok(())
    }

    fn poll_catalog(&mut self) {
        let Some(rx) = &mut self.catalog_rx else {
            return;
        };

        let loaded = match rx.try_recv() {
            Ok(result) => result,
            Err(oneshot::error::TryRecvError::Empty) => return,
            Err(oneshot::error::TryRecvError::Closed) => Err(TtalError::DataUnavailable(
                "catalog loader stopped".to_string(),
            )),
        };
        self.catalog_rx = None;

        let session = loaded.and_then(|catalog| {
            let catalog = Arc::new(catalog);
            let rules = self.config.rules();
            match self.seed {
                Some(seed) => Session::with_seed(catalog, rules, seed),
                None => Session::new(catalog, rules),
            }
        });

        match session {
            Ok(session) => {
                self.catalog_status = CatalogStatus::Ready(Arc::clone(session.catalog()));
                self.game = Some(GameController::new(session));
                self.state_manager.transition_to(AppState::Categories);
            }
            Err(err) => {
                tracing::error!("Catalog unavailable: {}", err);
                self.catalog_status = CatalogStatus::Unavailable(err.to_string());
                self.state_manager.transition_to(AppState::Unavailable);
            }
        }
    }

    /// Follow the session to the results screen when an attempt ends on its own
    fn sync_screen(&mut self) {
        if *self.state_manager.current_state() != AppState::Playing {
            return;
        }
        let Some(game) = &self.game else {
            return;
        };
        if game.session().active_category().is_some() {
            return;
        }

        if let Some(report) = game.session().last_report() {
            self.results_screen.set_report(
                report.clone(),
                game.session().history().to_vec(),
                game.session().rules().min_correct_to_pass,
            );
            self.state_manager.transition_to(AppState::Results);
        } else {
            self.state_manager.transition_to(AppState::Categories);
        }
    }

    /// Draw the current screen
    fn draw(&mut self) -> io::Result<()> {
        let state = self.state_manager.current_state().clone();
        let catalog_status = &self.catalog_status;
        let game = self.game.as_ref();
        let categories_screen = &mut self.categories_screen;
        let playing_screen = &mut self.playing_screen;
        let results_screen = &mut self.results_screen;

        self.tui.draw(|f| match (state, game) {
            (AppState::Loading, _) => categories_screen.render_loading(f),
            (AppState::Unavailable, _) => {
                let reason = match catalog_status {
                    CatalogStatus::Unavailable(reason) => reason.as_str(),
                    _ => "",
                };
                categories_screen.render_unavailable(f, reason)
            }
            (AppState::Categories, Some(game)) => categories_screen.render(f, game.session()),
            (AppState::Playing, Some(game)) => playing_screen.render(
                f,
                &game.snapshot(),
                game.session().rules(),
                game.penalty_visible(),
            ),
            (AppState::Results, _) => results_screen.render(f),
            (_, None) => categories_screen.render_loading(f),
        })
    }

    /// Handle keyboard events and update state
    fn handle_events(&mut self) -> Result<()> {
        let Some(key) = self.tui.next_key()? else {
            return Ok(());
        };
        let action = StateManager::key_to_navigation(key);

        if self.state_manager.handle_navigation(&action) {
            return Ok(());
        }

        match self.state_manager.current_state().clone() {
            AppState::Categories => self.handle_categories_events(action),
            AppState::Playing => self.handle_playing_events(action),
            AppState::Results => self.handle_results_events(action),
            AppState::Loading | AppState::Unavailable => {}
        }
        Ok(())
    }

    fn handle_categories_events(&mut self, action: NavigationAction) {
        let Some(game) = &self.game else {
            return;
        };
        let len = game.session().catalog().len();

        match action {
            NavigationAction::Up => self.categories_screen.select_previous(len),
            NavigationAction::Down => self.categories_screen.select_next(len),
            NavigationAction::Choose(index) => {
                if self.categories_screen.select(index, len) {
                    self.enter_selected_category();
                }
            }
            NavigationAction::Select => self.enter_selected_category(),
            _ => {}
        }
    }

    fn enter_selected_category(&mut self) {
        let Some(game) = &mut self.game else {
            return;
        };
        let Some(name) = self
            .categories_screen
            .selected_category(game.session())
            .map(str::to_string)
        else {
            return;
        };

        match game.enter_category(&name) {
            Ok(true) => {
                self.playing_screen.reset_cursor();
                self.state_manager.transition_to(AppState::Playing);
            }
            Ok(false) => {}
            Err(err) => tracing::warn!("Cannot enter category {}: {}", name, err),
        }
    }

    fn handle_playing_events(&mut self, action: NavigationAction) {
        let Some(game) = &mut self.game else {
            return;
        };
        let len = game
            .session()
            .presented_set()
            .map(|set| set.len())
            .unwrap_or_default();

        match action {
            NavigationAction::Up | NavigationAction::Left => self.playing_screen.select_previous(len),
            NavigationAction::Down | NavigationAction::Right => self.playing_screen.select_next(len),
            NavigationAction::Select => {
                game.select_answer(self.playing_screen.cursor());
            }
            NavigationAction::Choose(index) => {
                game.select_answer(index);
            }
            NavigationAction::Back => {
                game.back_to_categories();
                self.state_manager.transition_to(AppState::Categories);
            }
            _ => {}
        }
    }

    fn handle_results_events(&mut self, action: NavigationAction) {
        match action {
            NavigationAction::Left | NavigationAction::Up => {
                self.results_screen.select_previous_action()
            }
            NavigationAction::Right | NavigationAction::Down => {
                self.results_screen.select_next_action()
            }
            NavigationAction::Select => match self.results_screen.selected_action() {
                ResultAction::TryAgain => self.retry_category(),
                ResultAction::Back => self.back_to_categories(),
            },
            NavigationAction::Back => self.back_to_categories(),
            _ => {}
        }
    }

    fn retry_category(&mut self) {
        let (Some(game), Some(report)) = (&mut self.game, self.results_screen.report()) else {
            return;
        };
        let name = report.category.clone();

        match game.retry_category(&name) {
            Ok(true) => {
                self.playing_screen.reset_cursor();
                self.state_manager.transition_to(AppState::Playing);
            }
            Ok(false) => {}
            Err(err) => tracing::warn!("Cannot retry category {}: {}", name, err),
        }
    }

    fn back_to_categories(&mut self) {
        if let Some(game) = &mut self.game {
            game.back_to_categories();
        }
        self.state_manager.transition_to(AppState::Categories);
    }
}
