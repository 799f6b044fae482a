/// Configuration resolver: consumes the token stream and fills a [`Config`].
///
/// Source and sink are decided independently: `-f` picks the import
/// source, `-o` the export sink, and any combination is legal. The UI
/// level defaults from the sink once parsing is finished.
use crate::cli::parser::{ArgParser, Token};
use crate::config::{
    ColorTheme, Config, DataSink, DataSource, FileArg, UiLevel, UnitBase,
    DEFAULT_UPDATE_DELAY_MS, SLOW_UPDATE_DELAY_MS,
};
use crate::error::UsageError;
use crate::platform;
use std::ffi::OsString;
use std::path::PathBuf;

/// What the process should do after parsing.
#[derive(Debug)]
pub enum Invocation {
    Run(Config),
    /// `-h`/`--help` was seen; print [`help_text`] and exit.
    Help,
    /// `-v`/`--version` was seen; print [`version_text`] and exit.
    Version,
}

/// Parse argv (program name already stripped).
///
/// `no_color` reflects the `NO_COLOR` environment variable and only
/// changes the default theme.
pub fn parse_args<I, S>(args: I, no_color: bool) -> Result<Invocation, UsageError>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut config = Config {
        theme: if no_color {
            ColorTheme::Off
        } else {
            ColorTheme::DarkBg
        },
        ..Config::default()
    };
    let mut ui: Option<UiLevel> = None;
    let mut export: Option<FileArg> = None;
    let mut import: Option<FileArg> = None;
    let mut dir: Option<PathBuf> = None;

    let mut parser = ArgParser::new(args);
    while let Some(token) = parser.next()? {
        let name = match token {
            Token::Positional(arg) => {
                if dir.is_some() {
                    return Err(UsageError::ExtraDirectory(arg.into()));
                }
                dir = Some(arg.into());
                continue;
            }
            Token::Option(name) => name,
        };

        match name.as_str() {
            "-v" | "-V" | "--version" => return Ok(Invocation::Version),
            "-h" | "-?" | "--help" => return Ok(Invocation::Help),
            "-o" => export = Some(FileArg::from_arg(parser.value()?)),
            "-f" => import = Some(FileArg::from_arg(parser.value()?)),
            "-0" => ui = Some(UiLevel::None),
            "-1" => ui = Some(UiLevel::Line),
            "-2" => ui = Some(UiLevel::Full),
            _ => {
                if !apply_option(&mut config, &name, &mut parser)? {
                    return Err(UsageError::UnknownOption(name));
                }
            }
        }
    }

    if config.exclude_kernfs && !platform::KERNFS_SUPPORTED {
        return Err(UsageError::KernfsUnsupported);
    }

    config.ui = ui.unwrap_or(match &export {
        Some(FileArg::Stdio) => UiLevel::None,
        Some(FileArg::Path(_)) => UiLevel::Line,
        None => UiLevel::Full,
    });
    config.sink = match export {
        Some(file) => DataSink::Export(file),
        None => DataSink::Memory,
    };
    config.source = match import {
        Some(file) => DataSource::Import(file),
        None => DataSource::Scan(dir.unwrap_or_else(|| PathBuf::from("."))),
    };

    tracing::debug!("Resolved configuration: {config:?}");
    Ok(Invocation::Run(config))
}

/// Apply one settings option. Returns `false` for names it does not know.
fn apply_option(
    config: &mut Config,
    name: &str,
    parser: &mut ArgParser,
) -> Result<bool, UsageError> {
    match name {
        "-q" | "--slow-ui-updates" => config.update_delay_ms = SLOW_UPDATE_DELAY_MS,
        "--fast-ui-updates" => config.update_delay_ms = DEFAULT_UPDATE_DELAY_MS,
        "-x" | "--one-file-system" => config.same_fs = true,
        "--cross-file-system" => config.same_fs = false,
        "-e" | "--extended" => config.extended = true,
        "--no-extended" => config.extended = false,
        "-r" => config.read_only = config.read_only.saturating_add(1).min(2),
        "--si" => config.units = UnitBase::Si,
        "--no-si" => config.units = UnitBase::Binary,
        "-L" | "--follow-symlinks" => config.follow_symlinks = true,
        "--no-follow-symlinks" => config.follow_symlinks = false,
        "--exclude" => {
            let pattern = parser.value()?;
            config.exclude.add(pattern.to_string_lossy());
        }
        "-X" | "--exclude-from" => {
            let file = PathBuf::from(parser.value()?);
            config
                .exclude
                .add_from_file(&file)
                .map_err(|e| UsageError::cant_open(file, e))?;
        }
        "--exclude-caches" => config.exclude_caches = true,
        "--include-caches" => config.exclude_caches = false,
        "--exclude-kernfs" => config.exclude_kernfs = true,
        "--include-kernfs" => config.exclude_kernfs = false,
        "--follow-firmlinks" => config.follow_firmlinks = true,
        "--exclude-firmlinks" => config.follow_firmlinks = false,
        "--confirm-quit" => config.confirm_quit = true,
        "--no-confirm-quit" => config.confirm_quit = false,
        "--color" => {
            let arg = parser.value()?.to_string_lossy().into_owned();
            config.theme = ColorTheme::from_arg(&arg).ok_or(UsageError::UnknownColor(arg))?;
        }
        _ => return Ok(false),
    }
    Ok(true)
}

/// One-line version banner.
pub fn version_text() -> String {
    format!("disktally {}", env!("CARGO_PKG_VERSION"))
}

/// Usage summary printed for `--help`.
pub fn help_text() -> String {
    let mut text = String::from(
        "disktally <options> <directory>\n\n\
         \x20 -h,--help                  This help message\n\
         \x20 -q                         Quiet mode, refresh interval 2 seconds\n\
         \x20 -v,-V,--version            Print version\n\
         \x20 -x                         Same filesystem\n\
         \x20 -e                         Enable extended information\n\
         \x20 -r                         Read only\n\
         \x20 -o FILE                    Export scanned directory to FILE\n\
         \x20 -f FILE                    Import scanned directory from FILE\n\
         \x20 -0,-1,-2                   UI to use when scanning (0=none,2=full interface)\n\
         \x20 --si                       Use base 10 (SI) prefixes instead of base 2\n\
         \x20 --exclude PATTERN          Exclude files that match PATTERN\n\
         \x20 -X, --exclude-from FILE    Exclude files that match any pattern in FILE\n\
         \x20 -L, --follow-symlinks      Follow symbolic links (excluding directories)\n\
         \x20 --exclude-caches           Exclude directories containing CACHEDIR.TAG\n",
    );
    if platform::KERNFS_SUPPORTED {
        text.push_str(
            "  --exclude-kernfs           Exclude Linux pseudo filesystems (procfs,sysfs,cgroup,...)\n",
        );
    }
    if platform::FIRMLINKS_SUPPORTED {
        text.push_str("  --exclude-firmlinks        Exclude firmlinks on macOS\n");
    }
    text.push_str(
        "  --confirm-quit             Confirm quitting disktally\n\
         \x20 --color SCHEME             Set color scheme (off/dark/dark-bg)\n",
    );
    text
}
