/// Delete confirmation, progress and failure.
use super::popup;
use crate::state::{Action, Context, DeletePhase, Screen};
use crate::text::crop_str;
use crate::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent};
use disktally_core::delete::Deleter;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

const BOX_WIDTH: u16 = 60;

pub fn draw(frame: &mut Frame<'_>, ctx: &Context, phase: &DeletePhase, theme: &Theme) {
    let text_width = BOX_WIDTH.saturating_sub(4) as usize;
    match phase {
        DeletePhase::Confirm { target } => {
            let Some(tree) = ctx.tree.as_ref() else {
                return;
            };
            let node = tree.node(*target);
            let inner = popup(frame, "Confirm delete", BOX_WIDTH, 6, theme);
            let question = format!("Are you sure you want to delete \"{}\"", node.name);
            let mut lines = vec![Line::from(format!(" {}", crop_str(&question, text_width)))];
            if node.is_dir() {
                lines.push(Line::from(" and all of its contents?"));
            } else {
                lines.push(Line::default());
            }
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(" (y/N)", theme.warning)));
            frame.render_widget(Paragraph::new(lines).style(theme.frame), inner);
        }
        DeletePhase::Deleting { deleter, .. } => {
            let inner = popup(frame, "Deleting...", BOX_WIDTH, 5, theme);
            let current = deleter
                .current()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default();
            let lines = vec![
                Line::from(format!(" {}", crop_str(&current, text_width))),
                Line::from(format!(" {} removed", deleter.removed())),
            ];
            frame.render_widget(Paragraph::new(lines).style(theme.frame), inner);
        }
        DeletePhase::Failed { message } => {
            let inner = popup(frame, "Error!", BOX_WIDTH, 6, theme);
            let lines = vec![
                Line::from(Span::styled(" Error while deleting:", theme.error)),
                Line::from(format!(" {}", crop_str(message, text_width))),
                Line::default(),
                Line::from(" Press any key to continue"),
            ];
            frame.render_widget(Paragraph::new(lines).style(theme.frame), inner);
        }
    }
}

/// `y` starts the deletion in place; keys are ignored while it runs.
pub fn handle_key(ctx: &mut Context, phase: &mut DeletePhase, key: KeyEvent) -> Action {
    match phase {
        DeletePhase::Confirm { target } => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                let Some(tree) = ctx.tree.as_ref() else {
                    return Action::Goto(Screen::Browsing);
                };
                let target = *target;
                let path = tree.full_path(target);
                tracing::info!("Deleting {}", path.display());
                *phase = DeletePhase::Deleting {
                    target,
                    deleter: Deleter::new(path),
                };
                Action::None
            }
            _ => Action::Goto(Screen::Browsing),
        },
        DeletePhase::Deleting { .. } => Action::None,
        DeletePhase::Failed { .. } => Action::Goto(Screen::Browsing),
    }
}
