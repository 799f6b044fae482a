/// Quit confirmation.
use super::popup;
use crate::state::{Action, Screen};
use crate::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

pub fn draw(frame: &mut Frame<'_>, theme: &Theme) {
    let inner = popup(frame, "Confirm quit", 30, 3, theme);
    frame.render_widget(Paragraph::new(" Really quit? (y/N)").style(theme.frame), inner);
}

pub fn handle_key(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => Action::Quit,
        _ => Action::Goto(Screen::Browsing),
    }
}
