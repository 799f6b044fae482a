/// The resolved run configuration.
///
/// One flat record built by [`crate::cli::parse_args`] and then passed by
/// reference to every component. Nothing in the workspace reads global
/// state for these settings.
use crate::exclude::ExcludeSet;
use std::path::{Path, PathBuf};

/// Default refresh interval in milliseconds.
pub const DEFAULT_UPDATE_DELAY_MS: u64 = 100;

/// Refresh interval used by quiet mode (`-q`).
pub const SLOW_UPDATE_DELAY_MS: u64 = 2_000;

/// How much feedback the scanning phase gives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiLevel {
    /// No output at all while scanning.
    None,
    /// A single self-overwriting status line on stderr.
    Line,
    /// The full-screen interactive interface.
    Full,
}

/// Base used when humanising byte counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitBase {
    /// Powers of 1024 (KiB, MiB, …).
    #[default]
    Binary,
    /// Powers of 1000 (kB, MB, …).
    Si,
}

/// Colour scheme for the interactive interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTheme {
    Off,
    Dark,
    /// Dark palette that also paints its own background.
    DarkBg,
}

impl ColorTheme {
    /// Parse a `--color` argument.
    pub fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "off" => Some(Self::Off),
            "dark" => Some(Self::Dark),
            "dark-bg" => Some(Self::DarkBg),
            _ => None,
        }
    }
}

/// A file argument where `-` stands for the standard stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileArg {
    Stdio,
    Path(PathBuf),
}

impl FileArg {
    pub fn from_arg(arg: impl Into<PathBuf>) -> Self {
        let path = arg.into();
        if path.as_os_str() == "-" {
            Self::Stdio
        } else {
            Self::Path(path)
        }
    }

    /// Path shown in messages; `-` for the standard stream.
    pub fn display_path(&self) -> &Path {
        match self {
            Self::Stdio => Path::new("-"),
            Self::Path(p) => p,
        }
    }

    pub fn is_stdio(&self) -> bool {
        matches!(self, Self::Stdio)
    }
}

/// Where the tree data comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Walk the filesystem starting at this directory.
    Scan(PathBuf),
    /// Replay a previously exported file.
    Import(FileArg),
}

/// Where the tree data goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSink {
    /// Keep the tree in memory for browsing.
    Memory,
    /// Stream it to an export file and exit.
    Export(FileArg),
}

/// All run settings.
#[derive(Debug, Clone)]
pub struct Config {
    /// Redraw cadence in milliseconds.
    pub update_delay_ms: u64,
    /// Number of `-r` flags seen. 1 disables deletion, 2 also the shell.
    pub read_only: u8,
    pub same_fs: bool,
    pub extended: bool,
    pub follow_symlinks: bool,
    pub follow_firmlinks: bool,
    pub exclude_caches: bool,
    pub exclude_kernfs: bool,
    pub confirm_quit: bool,
    pub ui: UiLevel,
    pub units: UnitBase,
    pub theme: ColorTheme,
    pub exclude: ExcludeSet,
    pub source: DataSource,
    pub sink: DataSink,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            update_delay_ms: DEFAULT_UPDATE_DELAY_MS,
            read_only: 0,
            same_fs: false,
            extended: false,
            follow_symlinks: false,
            follow_firmlinks: true,
            exclude_caches: false,
            exclude_kernfs: false,
            confirm_quit: false,
            ui: UiLevel::Full,
            units: UnitBase::Binary,
            theme: ColorTheme::DarkBg,
            exclude: ExcludeSet::default(),
            source: DataSource::Scan(PathBuf::from(".")),
            sink: DataSink::Memory,
        }
    }
}

impl Config {
    /// Deleting files is allowed.
    pub fn can_delete(&self) -> bool {
        self.read_only == 0
    }

    /// Spawning a shell is allowed.
    pub fn can_spawn_shell(&self) -> bool {
        self.read_only < 2
    }

    /// The interface must talk to `/dev/tty` because a standard stream
    /// carries tree data.
    pub fn needs_tty(&self) -> bool {
        matches!(&self.sink, DataSink::Export(f) if f.is_stdio())
            || matches!(&self.source, DataSource::Import(f) if f.is_stdio())
    }
}
