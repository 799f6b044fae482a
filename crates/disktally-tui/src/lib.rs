/// DiskTally TUI: ratatui/crossterm frontend.
///
/// This crate contains all terminal code. Business logic lives in
/// `disktally-core`. [`app::App`] owns the run loop and the single active
/// [`state::Screen`]; everything it touches lives in one
/// [`state::Context`].
pub mod app;
pub mod console;
pub mod screens;
pub mod state;
pub mod text;
pub mod theme;

pub use app::{App, RunOutcome};
pub use console::{Console, CrosstermConsole};
