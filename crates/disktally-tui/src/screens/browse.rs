/// The directory browser.
use crate::state::{Action, BrowseState, Context, DeletePhase, Screen};
use crate::text::{crop_str, fit_str};
use crate::theme::Theme;
use chrono::{Local, TimeZone};
use crossterm::event::{KeyCode, KeyEvent};
use disktally_core::model::file_tree::SortKey;
use disktally_core::model::{format_count, format_size, FileNode, FileTree};
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

/// Width of the relative-size bar, brackets excluded.
const BAR_WIDTH: usize = 10;
const SIZE_WIDTH: usize = 10;
const MTIME_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn draw(frame: &mut Frame<'_>, ctx: &Context, theme: &Theme) {
    let area = frame.area();
    if area.height < 3 {
        return;
    }
    let width = area.width as usize;

    let header = format!(
        " disktally {} ~ Use the arrow keys to navigate, press ? for help",
        env!("CARGO_PKG_VERSION")
    );
    frame.render_widget(
        Paragraph::new(fit_str(&header, width)).style(theme.header),
        Rect::new(area.x, area.y, area.width, 1),
    );

    let (Some(tree), Some(browse)) = (ctx.tree.as_ref(), ctx.browse.as_ref()) else {
        return;
    };

    let path = tree.full_path(browse.dir).to_string_lossy().into_owned();
    let path_line = format!("--- {} ", crop_str(&path, width.saturating_sub(5)));
    let dashes = "-".repeat(width.saturating_sub(path_line.chars().count()));
    frame.render_widget(
        Paragraph::new(format!("{path_line}{dashes}")).style(theme.default),
        Rect::new(area.x, area.y + 1, area.width, 1),
    );

    let list_area = Rect::new(area.x, area.y + 2, area.width, area.height - 3);
    draw_listing(frame, ctx, tree, browse, list_area, theme);

    let dir = tree.node(browse.dir);
    let footer = format!(
        " Total disk usage: {}  Apparent size: {}  Items: {}",
        format_size(dir.disk_usage, ctx.config.units),
        format_size(dir.size, ctx.config.units),
        format_count(dir.descendant_count)
    );
    frame.render_widget(
        Paragraph::new(fit_str(&footer, width)).style(theme.header),
        Rect::new(area.x, area.bottom() - 1, area.width, 1),
    );
}

fn draw_listing(
    frame: &mut Frame<'_>,
    ctx: &Context,
    tree: &FileTree,
    browse: &BrowseState,
    area: Rect,
    theme: &Theme,
) {
    if browse.listing.is_empty() {
        frame.render_widget(
            Paragraph::new(" Empty directory").style(theme.muted),
            area,
        );
        return;
    }

    let rows = area.height as usize;
    let offset = browse.selected.saturating_sub(rows.saturating_sub(1));
    let largest = browse
        .listing
        .iter()
        .map(|&n| tree.node(n).size)
        .max()
        .unwrap_or(0);

    let lines: Vec<Line> = browse
        .listing
        .iter()
        .enumerate()
        .skip(offset)
        .take(rows)
        .map(|(i, &idx)| {
            let node = tree.node(idx);
            let row = row_text(node, largest, ctx, area.width as usize);
            let style = if i == browse.selected {
                theme.selected
            } else if node.is_dir() {
                theme.dir
            } else {
                theme.file
            };
            Line::from(Span::styled(row, style))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).style(theme.default), area);
}

/// One list row: size, bar, flag, optional mtime, name.
fn row_text(node: &FileNode, largest: u64, ctx: &Context, width: usize) -> String {
    let size = format_size(node.size, ctx.config.units);
    let filled = if largest == 0 {
        0
    } else {
        ((node.size as u128 * BAR_WIDTH as u128) / largest as u128) as usize
    };
    let bar = format!("{}{}", "#".repeat(filled), " ".repeat(BAR_WIDTH - filled));
    let flag = match (node.is_error, node.excluded) {
        (true, _) => '!',
        (false, Some(reason)) => reason.marker(),
        (false, None) if node.is_dir() && node.first_child.is_none() => 'e',
        _ => ' ',
    };
    let mut row = format!("{size:>SIZE_WIDTH$} [{bar}] {flag}");
    if ctx.config.extended {
        let stamp = node
            .mtime
            .and_then(|t| Local.timestamp_opt(t, 0).single())
            .map(|t| t.format(MTIME_FORMAT).to_string())
            .unwrap_or_else(|| " ".repeat(16));
        row.push(' ');
        row.push_str(&stamp);
    }
    let suffix = if node.is_dir() { "/" } else { "" };
    let name = format!("{}{suffix}", node.name);
    let used = row.chars().count() + 1;
    row.push(' ');
    row.push_str(&crop_str(&name, width.saturating_sub(used)));
    fit_str(&row, width)
}

pub fn handle_key(ctx: &mut Context, key: KeyEvent) -> Action {
    let (Some(tree), Some(browse)) = (ctx.tree.as_ref(), ctx.browse.as_mut()) else {
        return match key.code {
            KeyCode::Char('q') => Action::Quit,
            _ => Action::None,
        };
    };

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            browse.selected = browse.selected.saturating_sub(1);
            Action::None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if browse.selected + 1 < browse.listing.len() {
                browse.selected += 1;
            }
            Action::None
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
            if let Some(node) = browse.selected_node() {
                let entry = tree.node(node);
                if entry.is_dir() && entry.excluded.is_none() {
                    browse.dir = node;
                    browse.selected = 0;
                    browse.refresh(tree);
                }
            }
            Action::None
        }
        KeyCode::Left | KeyCode::Char('h') => {
            if let Some(parent) = tree.node(browse.dir).parent {
                let previous = browse.dir;
                browse.dir = parent;
                browse.refresh(tree);
                browse.select(previous);
            }
            Action::None
        }
        KeyCode::Char('n') => {
            browse.sort = match browse.sort {
                SortKey::Name => SortKey::Size,
                SortKey::Size => SortKey::Name,
            };
            resort(browse, tree);
            Action::None
        }
        KeyCode::Char('s') => {
            browse.sort = SortKey::Size;
            resort(browse, tree);
            Action::None
        }
        KeyCode::Char('?') => Action::Goto(Screen::Help),
        KeyCode::Char('d') if ctx.config.can_delete() => match browse.selected_node() {
            Some(target) => Action::Goto(Screen::ConfirmDelete(DeletePhase::Confirm { target })),
            None => Action::None,
        },
        KeyCode::Char('b') if ctx.config.can_spawn_shell() => {
            Action::SpawnShell(tree.full_path(browse.dir))
        }
        KeyCode::Char('q') => {
            if ctx.config.confirm_quit {
                Action::Goto(Screen::ConfirmQuit)
            } else {
                Action::Quit
            }
        }
        _ => Action::None,
    }
}

/// Re-sort the listing and keep the same entry selected.
fn resort(browse: &mut BrowseState, tree: &FileTree) {
    let current = browse.selected_node();
    browse.refresh(tree);
    if let Some(node) = current {
        browse.select(node);
    }
}
