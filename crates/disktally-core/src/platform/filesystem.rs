/// Filesystem metadata helpers shared by the traversal and the deleter.
use std::fs::{self, Metadata};
use std::io::Read;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// First bytes of a valid `CACHEDIR.TAG` (see bford.info/cachedir).
const CACHEDIR_SIGNATURE: &[u8] = b"Signature: 8a477f597d28d172789f06886806bc55";

/// The metadata fields the scanner cares about, in a platform-neutral shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryMeta {
    pub is_dir: bool,
    pub is_file: bool,
    /// Apparent size in bytes.
    pub size: u64,
    /// Bytes actually allocated on disk.
    pub disk_usage: u64,
    /// Device id, compared against the root's for `-x`.
    pub dev: u64,
    /// Modification time in seconds since the epoch.
    pub mtime: Option<i64>,
}

impl EntryMeta {
    pub fn from_metadata(meta: &Metadata) -> Self {
        let mtime = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64);

        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            Self {
                is_dir: meta.is_dir(),
                is_file: meta.is_file(),
                size: meta.len(),
                disk_usage: meta.blocks().saturating_mul(512),
                dev: meta.dev(),
                mtime,
            }
        }
        #[cfg(not(unix))]
        {
            Self {
                is_dir: meta.is_dir(),
                is_file: meta.is_file(),
                size: meta.len(),
                disk_usage: meta.len(),
                dev: 0,
                mtime,
            }
        }
    }
}

/// Whether `dir` holds a `CACHEDIR.TAG` file with the standard signature.
pub fn has_cachedir_tag(dir: &Path) -> bool {
    let Ok(mut file) = fs::File::open(dir.join("CACHEDIR.TAG")) else {
        return false;
    };
    let mut head = [0u8; CACHEDIR_SIGNATURE.len()];
    file.read_exact(&mut head).is_ok() && head[..] == *CACHEDIR_SIGNATURE
}

/// Whether `path` lives on a kernel pseudo-filesystem (procfs, sysfs, …).
///
/// Always `false` where detection is unsupported.
pub fn is_kernfs(path: &Path) -> bool {
    #[cfg(target_os = "linux")]
    {
        // Magic numbers from linux/magic.h.
        const KERNFS_MAGIC: &[u32] = &[
            0xcafe_4a11, // BPF_FS_MAGIC
            0x0027_e0eb, // CGROUP_SUPER_MAGIC
            0x6367_7270, // CGROUP2_SUPER_MAGIC
            0x6462_6720, // DEBUGFS_MAGIC
            0x0000_1cd1, // DEVPTS_SUPER_MAGIC
            0x0000_9fa0, // PROC_SUPER_MAGIC
            0x6165_676c, // PSTOREFS_MAGIC
            0x7363_6673, // SECURITYFS_MAGIC
            0xf97c_ff8c, // SELINUX_MAGIC
            0x6265_6572, // SYSFS_MAGIC
            0x7472_6163, // TRACEFS_MAGIC
        ];
        match nix::sys::statfs::statfs(path) {
            Ok(stat) => KERNFS_MAGIC.contains(&(stat.filesystem_type().0 as u32)),
            Err(e) => {
                tracing::debug!("statfs({}) failed: {e}", path.display());
                false
            }
        }
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = path;
        false
    }
}
