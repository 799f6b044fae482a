/// Key reference overlay.
use super::popup;
use crate::state::{Action, Screen};
use crate::theme::Theme;
use crossterm::event::KeyEvent;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

const KEYS: &[(&str, &str)] = &[
    ("up, k", "Move cursor up"),
    ("down, j", "Move cursor down"),
    ("right, enter, l", "Open selected directory"),
    ("left, h", "Open parent directory"),
    ("n", "Toggle sort by name"),
    ("s", "Sort by size"),
    ("d", "Delete selected file or directory"),
    ("b", "Spawn shell in current directory"),
    ("?", "This help"),
    ("q", "Quit"),
];

pub fn draw(frame: &mut Frame<'_>, theme: &Theme) {
    let inner = popup(frame, "Help", 56, KEYS.len() as u16 + 4, theme);
    let mut lines: Vec<Line> = KEYS
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!(" {key:>16} "), theme.dir),
                Span::raw(*what),
            ])
        })
        .collect();
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(" Press any key to continue", theme.muted)));
    frame.render_widget(Paragraph::new(lines).style(theme.frame), inner);
}

pub fn handle_key(_key: KeyEvent) -> Action {
    Action::Goto(Screen::Browsing)
}
