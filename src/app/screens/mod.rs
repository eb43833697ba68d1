//! TUI screen components
//!
//! Contains individual screen implementations for different application states.

pub mod categories;
pub mod playing;
pub mod results;

pub use categories::CategoriesScreen;
pub use playing::{PlayingScreen, StatementMark};
pub use results::{ResultAction, ResultsScreen};
