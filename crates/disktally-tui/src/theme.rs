/// Colour scheme for the terminal interface.
///
/// All colour constants are defined here so the rest of the UI code
/// references semantically-named styles rather than raw colours.
use disktally_core::config::ColorTheme;
use ratatui::style::{Color, Modifier, Style};

/// Semantic style palette.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    /// Plain text on the screen background.
    pub default: Style,
    /// Title and status bars.
    pub header: Style,
    /// Borders and text of pop-up boxes.
    pub frame: Style,
    pub dir: Style,
    pub file: Style,
    /// The highlighted row of the browse list.
    pub selected: Style,
    pub bar_fill: Style,
    pub error: Style,
    pub warning: Style,
    /// Flags and secondary columns.
    pub muted: Style,
}

impl Theme {
    /// No colours at all; emphasis by attributes only.
    pub fn off() -> Self {
        let plain = Style::default();
        Self {
            default: plain,
            header: plain.add_modifier(Modifier::REVERSED),
            frame: plain,
            dir: plain.add_modifier(Modifier::BOLD),
            file: plain,
            selected: plain.add_modifier(Modifier::REVERSED),
            bar_fill: plain,
            error: plain.add_modifier(Modifier::BOLD),
            warning: plain.add_modifier(Modifier::BOLD),
            muted: plain,
        }
    }

    /// Coloured foregrounds on the terminal's own background.
    pub fn dark() -> Self {
        let plain = Style::default();
        Self {
            default: plain,
            header: Style::default().fg(Color::Black).bg(Color::Cyan),
            frame: plain,
            dir: Style::default().fg(Color::LightBlue).add_modifier(Modifier::BOLD),
            file: plain,
            selected: Style::default().fg(Color::White).bg(Color::Blue),
            bar_fill: Style::default().fg(Color::Green),
            error: Style::default().fg(Color::LightRed),
            warning: Style::default().fg(Color::Yellow),
            muted: Style::default().fg(Color::DarkGray),
        }
    }

    /// The dark palette, also painting a black background.
    pub fn dark_bg() -> Self {
        let bg = Color::Black;
        let dark = Self::dark();
        Self {
            default: dark.default.fg(Color::Gray).bg(bg),
            frame: dark.frame.fg(Color::Gray).bg(bg),
            dir: dark.dir.bg(bg),
            file: dark.file.fg(Color::Gray).bg(bg),
            bar_fill: dark.bar_fill.bg(bg),
            error: dark.error.bg(bg),
            warning: dark.warning.bg(bg),
            muted: dark.muted.bg(bg),
            ..dark
        }
    }

    pub fn for_config(theme: ColorTheme) -> Self {
        match theme {
            ColorTheme::Off => Self::off(),
            ColorTheme::Dark => Self::dark(),
            ColorTheme::DarkBg => Self::dark_bg(),
        }
    }
}
