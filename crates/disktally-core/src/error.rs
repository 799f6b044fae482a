/// Startup errors: everything that stops the process before the first
/// screen is shown.
use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum UsageError {
    #[error("Invalid option '-'.")]
    LoneDash,

    #[error("Option '{0}' is not valid UTF-8.")]
    NonUnicodeOption(String),

    #[error("Option '{0}' requires an argument.")]
    MissingValue(String),

    #[error("Option '{0}' does not expect an argument.")]
    UnexpectedValue(String),

    #[error("Unknown option '{0}'.")]
    UnknownOption(String),

    #[error("Unexpected argument '{}', only one directory may be given.", .0.display())]
    ExtraDirectory(PathBuf),

    #[error("Unknown --color option: {0}")]
    UnknownColor(String),

    #[error("The --exclude-kernfs flag is currently only supported on Linux.")]
    KernfsUnsupported,

    #[error("Can't open {}: {source}", .path.display())]
    CantOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl UsageError {
    /// Wrap an I/O failure on `path` the way every file-opening option reports it.
    pub fn cant_open(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::CantOpen {
            path: path.into(),
            source,
        }
    }
}
