/// Platform-specific functionality: filesystem classification and
/// terminal-stream error detection.
pub mod filesystem;
pub mod stream;

pub use filesystem::{has_cachedir_tag, is_kernfs, EntryMeta};
pub use stream::is_terminal_stream_failure;

/// Kernel pseudo-filesystem detection is available (Linux `statfs` magic).
pub const KERNFS_SUPPORTED: bool = cfg!(target_os = "linux");

/// Firmlink detection is available.
///
/// `--follow-firmlinks` / `--exclude-firmlinks` are still accepted
/// everywhere; without detection support they have no effect.
pub const FIRMLINKS_SUPPORTED: bool = false;
