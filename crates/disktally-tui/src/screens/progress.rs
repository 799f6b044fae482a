/// Scanning screen: the progress box, the fatal error box, and the
/// single-line stderr feedback used when the full interface is off.
use super::popup;
use crate::state::{Action, Context};
use crate::text::{crop_str, fit_str};
use crate::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent};
use disktally_core::model::{format_count, format_size};
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

const BOX_WIDTH: u16 = 60;
const ANIMATION_TEXT: &str = "Scanning...";
/// Frames in one cycle: reveal [`ANIMATION_TEXT`] left to right, then
/// erase it left to right.
const ANIMATION_FRAMES: u64 = 22;

/// Title text for redraw number `frame`. Static when the refresh interval
/// is above one second, since a slow animation only looks stuck.
pub fn scan_animation(frame: u64, interval_ms: u64) -> String {
    if interval_ms > 1_000 {
        return ANIMATION_TEXT.to_string();
    }
    let len = ANIMATION_TEXT.len() as u64;
    let n = frame % ANIMATION_FRAMES;
    if n < len {
        format!("{:<width$}", &ANIMATION_TEXT[..=n as usize], width = len as usize)
    } else {
        // The text is erased from the left in the second half of the cycle.
        let hidden = (n - len + 1) as usize;
        format!("{}{}", " ".repeat(hidden), &ANIMATION_TEXT[hidden..])
    }
}

pub fn draw(frame: &mut Frame<'_>, ctx: &Context, theme: &Theme) {
    if ctx.scan.has_fatal_error() {
        draw_error(frame, ctx, theme);
    } else {
        draw_progress(frame, ctx, theme);
    }
}

fn draw_progress(frame: &mut Frame<'_>, ctx: &Context, theme: &Theme) {
    let soft = ctx.scan.errors.soft_lossy();
    let height = if soft.is_some() { 10 } else { 7 };
    let title = scan_animation(ctx.scheduler.redraws(), ctx.scheduler.interval_ms());
    let inner = popup(frame, &title, BOX_WIDTH, height, theme);
    let text_width = inner.width.saturating_sub(16) as usize;

    let mut lines = vec![
        Line::from(format!(
            " Total items: {:<12} size: {}",
            format_count(ctx.scan.items),
            format_size(ctx.scan.size, ctx.config.units)
        )),
        Line::from(format!(
            " Current item: {}",
            crop_str(&ctx.scan.cursor.to_string_lossy(), text_width)
        )),
        Line::default(),
    ];
    if let Some(path) = soft {
        lines.push(Line::from(Span::styled(" Warning:", theme.warning)));
        lines.push(Line::from(format!(
            "  error scanning {}",
            crop_str(&path, text_width)
        )));
        lines.push(Line::from("  some directory sizes may not be correct"));
    }
    frame.render_widget(Paragraph::new(lines).style(theme.frame), inner);

    let footer = " Press q to abort ";
    let footer_area = Rect::new(
        inner.right().saturating_sub(footer.len() as u16),
        inner.bottom().saturating_sub(1),
        footer.len() as u16,
        1,
    );
    frame.render_widget(Paragraph::new(footer).style(theme.frame), footer_area);
}

fn draw_error(frame: &mut Frame<'_>, ctx: &Context, theme: &Theme) {
    let inner = popup(frame, "Error!", BOX_WIDTH, 7, theme);
    let width = inner.width.saturating_sub(2) as usize;
    let message = ctx
        .scan
        .errors
        .fatal()
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let path = crop_str(&ctx.scan.cursor.to_string_lossy(), width.saturating_sub(15));
    let lines = vec![
        Line::from(Span::styled(format!(" could not open {path}"), theme.error)),
        Line::from(format!(" {}", crop_str(&message, width))),
        Line::default(),
        Line::from(" Press any key to continue"),
    ];
    frame.render_widget(Paragraph::new(lines).style(theme.frame), inner);
}

/// The self-overwriting feedback line for `-1`, fitted to `width` columns.
pub fn status_line(ctx: &Context, width: usize) -> String {
    let info = format!(
        " {:>10} files / {}",
        format_count(ctx.scan.items),
        format_size(ctx.scan.size, ctx.config.units)
    );
    let path_width = width.saturating_sub(info.width() + 1).max(10);
    format!("{}{info}", fit_str(&ctx.scan.cursor.to_string_lossy(), path_width))
}

/// The fatal error as one stderr line, for when no interface is drawn.
pub fn error_line(ctx: &Context) -> String {
    let message = ctx.scan.errors.fatal().map(|m| m.as_str()).unwrap_or("");
    format!(
        "Error: could not open {}: {message}",
        ctx.scan.cursor.to_string_lossy()
    )
}

/// `q` aborts; while a fatal error is shown any key acknowledges it.
pub fn handle_key(ctx: &mut Context, key: KeyEvent) -> Action {
    if ctx.scan.has_fatal_error() {
        return Action::Quit;
    }
    match key.code {
        KeyCode::Char('q') => {
            tracing::info!("Scan aborted after {} items", ctx.scan.items);
            Action::Quit
        }
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn animation_reveals_then_hides() {
        assert_eq!(scan_animation(0, 100), "S          ");
        assert_eq!(scan_animation(10, 100), "Scanning...");
        assert_eq!(scan_animation(11, 100), " canning...");
        assert_eq!(scan_animation(20, 100), "          .");
        assert_eq!(scan_animation(21, 100), "           ");
        assert_eq!(scan_animation(22, 100), scan_animation(0, 100));
    }

    #[test]
    fn animation_erases_from_the_left() {
        for frame in 11..22 {
            let title = scan_animation(frame, 100);
            assert_eq!(title.len(), ANIMATION_TEXT.len());
            let hidden = (frame - 10) as usize;
            assert!(title[..hidden].chars().all(|c| c == ' '), "frame {frame}: {title:?}");
            assert_eq!(&title[hidden..], &ANIMATION_TEXT[hidden..]);
        }
    }

    #[test]
    fn animation_is_static_for_slow_updates() {
        for frame in 0..30 {
            assert_eq!(scan_animation(frame, 2_000), "Scanning...");
        }
        assert_ne!(scan_animation(3, 1_000), "Scanning...");
    }
}
