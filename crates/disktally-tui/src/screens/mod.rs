/// Per-screen drawing and key handling.
///
/// [`draw`] and [`handle_key`] are the single dispatch points over
/// [`Screen`]. Drawing is pure: it reads the context and never changes it.
pub mod browse;
pub mod delete;
pub mod help;
pub mod progress;
pub mod quit;
pub mod shell;

use crate::state::{Action, Context, Screen, Viewport, MIN_HEIGHT, MIN_WIDTH};
use crate::theme::Theme;
use crossterm::event::KeyEvent;
use ratatui::layout::{Alignment, Rect};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

pub fn draw(frame: &mut Frame<'_>, ctx: &Context, screen: &Screen) {
    let theme = Theme::for_config(ctx.config.theme);
    if let Viewport::TooSmall { .. } = ctx.viewport {
        draw_too_small(frame, &theme);
        return;
    }
    match screen {
        Screen::Scanning => progress::draw(frame, ctx, &theme),
        Screen::Browsing => browse::draw(frame, ctx, &theme),
        Screen::Help => {
            browse::draw(frame, ctx, &theme);
            help::draw(frame, &theme);
        }
        Screen::ShellOut(outcome) => {
            browse::draw(frame, ctx, &theme);
            shell::draw(frame, outcome, &theme);
        }
        Screen::ConfirmDelete(phase) => {
            browse::draw(frame, ctx, &theme);
            delete::draw(frame, ctx, phase, &theme);
        }
        Screen::ConfirmQuit => {
            browse::draw(frame, ctx, &theme);
            quit::draw(frame, &theme);
        }
    }
}

pub fn handle_key(ctx: &mut Context, screen: &mut Screen, key: KeyEvent) -> Action {
    match screen {
        Screen::Scanning => progress::handle_key(ctx, key),
        Screen::Browsing => browse::handle_key(ctx, key),
        Screen::Help => help::handle_key(key),
        Screen::ShellOut(_) => shell::handle_key(key),
        Screen::ConfirmDelete(phase) => delete::handle_key(ctx, phase, key),
        Screen::ConfirmQuit => quit::handle_key(key),
    }
}

fn draw_too_small(frame: &mut Frame<'_>, theme: &Theme) {
    let text = format!("Screen too small, please resize to at least {MIN_WIDTH}x{MIN_HEIGHT}.");
    frame.render_widget(
        Paragraph::new(text).style(theme.default).wrap(ratatui::widgets::Wrap { trim: true }),
        frame.area(),
    );
}

/// Centre a `width` x `height` box in `area`.
pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Clear a centred box, draw its frame and return the inner area.
pub(crate) fn popup(frame: &mut Frame<'_>, title: &str, width: u16, height: u16, theme: &Theme) -> Rect {
    let area = centered_rect(width, height, frame.area());
    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(format!(" {title} "))
        .title_alignment(Alignment::Left)
        .borders(Borders::ALL)
        .style(theme.frame);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_clamps_to_area() {
        let area = Rect::new(0, 0, 80, 24);
        assert_eq!(centered_rect(60, 10, area), Rect::new(10, 7, 60, 10));
        assert_eq!(centered_rect(100, 30, area), Rect::new(0, 0, 80, 24));
    }
}
