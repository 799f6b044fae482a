/// Spawning a shell in a directory, and the screen shown when it goes wrong.
use super::popup;
use crate::state::{Action, Screen, ShellOutcome};
use crate::theme::Theme;
use crossterm::event::KeyEvent;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

/// Nesting depth exported to the child shell.
pub const LEVEL_VAR: &str = "DISKTALLY_LEVEL";
const FALLBACK_SHELL: &str = "/bin/sh";

/// `$DISKTALLY_SHELL`, then `$SHELL`, then `/bin/sh`. Empty values are skipped.
pub fn resolve_shell(var: impl Fn(&str) -> Option<OsString>) -> OsString {
    ["DISKTALLY_SHELL", "SHELL"]
        .into_iter()
        .filter_map(|name| var(name))
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| OsString::from(FALLBACK_SHELL))
}

/// The level for a child, given the current value of [`LEVEL_VAR`].
pub fn next_level(current: Option<&str>) -> u32 {
    current
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(0)
        .saturating_add(1)
}

/// Run a shell in `dir` and wait for it. `Ok` only on a zero exit status.
/// The terminal must already be handed over.
pub fn run_shell(dir: &Path) -> Result<(), ShellOutcome> {
    let shell = resolve_shell(|name| std::env::var_os(name));
    let level = next_level(std::env::var(LEVEL_VAR).ok().as_deref());
    tracing::info!(
        "Spawning {} in {} (level {level})",
        shell.to_string_lossy(),
        dir.display()
    );

    let status = Command::new(&shell)
        .current_dir(dir)
        .env(LEVEL_VAR, level.to_string())
        .status()
        .map_err(|e| ShellOutcome::Failed {
            shell: shell.to_string_lossy().into_owned(),
            reason: e.to_string(),
        })?;
    if status.success() {
        Ok(())
    } else {
        tracing::warn!("Shell exited with {status}");
        Err(ShellOutcome::Exited(status.code()))
    }
}

pub fn draw(frame: &mut Frame<'_>, outcome: &ShellOutcome, theme: &Theme) {
    let inner = popup(frame, "Shell", 60, 6, theme);
    let (headline, detail) = match outcome {
        ShellOutcome::Exited(Some(code)) => (
            "The shell exited with an error.".to_string(),
            format!("Exit status: {code}"),
        ),
        ShellOutcome::Exited(None) => (
            "The shell was terminated by a signal.".to_string(),
            String::new(),
        ),
        ShellOutcome::Failed { shell, reason } => {
            (format!("Error spawning {shell}:"), reason.clone())
        }
    };
    let lines = vec![
        Line::from(Span::styled(format!(" {headline}"), theme.error)),
        Line::from(format!(" {detail}")),
        Line::default(),
        Line::from(" Press any key to continue"),
    ];
    frame.render_widget(Paragraph::new(lines).style(theme.frame), inner);
}

pub fn handle_key(_key: KeyEvent) -> Action {
    Action::Goto(Screen::Browsing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
        let map: HashMap<String, OsString> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), OsString::from(v)))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn shell_resolution_order() {
        assert_eq!(
            resolve_shell(env(&[("DISKTALLY_SHELL", "/bin/zsh"), ("SHELL", "/bin/bash")])),
            "/bin/zsh"
        );
        assert_eq!(resolve_shell(env(&[("SHELL", "/bin/bash")])), "/bin/bash");
        assert_eq!(
            resolve_shell(env(&[("DISKTALLY_SHELL", ""), ("SHELL", "/bin/bash")])),
            "/bin/bash"
        );
        assert_eq!(resolve_shell(env(&[])), "/bin/sh");
    }

    #[test]
    fn level_increments() {
        assert_eq!(next_level(None), 1);
        assert_eq!(next_level(Some("1")), 2);
        assert_eq!(next_level(Some("junk")), 1);
    }
}
