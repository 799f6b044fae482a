/// A single node in the arena-allocated file tree.
///
/// Nodes are stored in a flat `Vec<FileNode>`. Parent-child relationships
/// use indices rather than pointers, so removing a subtree is a matter of
/// relinking siblings.
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::ffi::OsStr;

/// Lightweight index into the arena `Vec<FileNode>`.
///
/// Uses `u32` to keep nodes small. Supports up to ~4 billion nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    /// Create a new `NodeIndex` from a `usize`, panicking in debug builds if
    /// it exceeds `u32::MAX`.
    #[inline]
    pub fn new(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize, "NodeIndex overflow");
        Self(index as u32)
    }

    /// Return the index as a `usize` for Vec indexing.
    #[inline]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

/// What kind of filesystem object an entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    #[default]
    File,
    Dir,
    /// Symlinks that were not followed, sockets, devices, fifos.
    Other,
}

/// Why an entry was left out of the totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExcludeReason {
    /// Matched an `--exclude` pattern.
    Pattern,
    /// On another filesystem while `-x` is active.
    OtherFs,
    /// A kernel pseudo-filesystem while `--exclude-kernfs` is active.
    KernFs,
    /// A directory tagged with `CACHEDIR.TAG` while `--exclude-caches` is active.
    CacheDir,
}

impl ExcludeReason {
    /// One-character marker shown in the browse list.
    pub fn marker(self) -> char {
        match self {
            Self::Pattern => '<',
            Self::OtherFs => '>',
            Self::KernFs => '^',
            Self::CacheDir => '<',
        }
    }
}

/// A single file or directory in the tree.
#[derive(Debug, Clone)]
pub struct FileNode {
    /// File or directory name only. The root holds the full scan path.
    /// Lossy for names that are not UTF-8; see `raw_name`.
    pub name: CompactString,

    /// The on-disk name bytes, kept only when they are not valid UTF-8.
    pub raw_name: Option<Box<[u8]>>,

    /// Apparent size in bytes. For directories, the sum over all
    /// descendants once [`FileTree::aggregate_sizes`](super::FileTree::aggregate_sizes) ran.
    pub size: u64,

    /// Bytes allocated on disk. Aggregated like `size`.
    pub disk_usage: u64,

    pub kind: EntryKind,

    /// Index of the parent node. `None` for the scan root.
    pub parent: Option<NodeIndex>,

    /// First child (directories only). Children form a singly-linked list
    /// via `next_sibling`.
    pub first_child: Option<NodeIndex>,

    /// Next sibling under the same parent.
    pub next_sibling: Option<NodeIndex>,

    /// Total number of descendant entries, files and directories alike.
    pub descendant_count: u64,

    /// Last-modified time in seconds since the epoch.
    pub mtime: Option<i64>,

    /// `true` if this node (or, for directories, its listing) could not be read.
    /// The node stays in the tree so users can see where errors occurred.
    pub is_error: bool,

    /// Set when the entry was seen but deliberately not scanned.
    pub excluded: Option<ExcludeReason>,
}

impl FileNode {
    /// Create a node of the given kind with zero sizes.
    pub fn new(name: CompactString, kind: EntryKind, parent: Option<NodeIndex>) -> Self {
        Self {
            name,
            raw_name: None,
            size: 0,
            disk_usage: 0,
            kind,
            parent,
            first_child: None,
            next_sibling: None,
            descendant_count: 0,
            mtime: None,
            is_error: false,
            excluded: None,
        }
    }

    /// Create a new file node with the given name and size.
    pub fn new_file(name: CompactString, size: u64, parent: Option<NodeIndex>) -> Self {
        Self {
            size,
            disk_usage: size,
            ..Self::new(name, EntryKind::File, parent)
        }
    }

    /// Create a new directory node.
    pub fn new_dir(name: CompactString, parent: Option<NodeIndex>) -> Self {
        Self::new(name, EntryKind::Dir, parent)
    }

    /// Create a node from raw name bytes. The display name is the lossy
    /// UTF-8 form; the bytes are kept when that conversion lost anything.
    pub fn from_name_bytes(name: &[u8], kind: EntryKind, parent: Option<NodeIndex>) -> Self {
        match std::str::from_utf8(name) {
            Ok(s) => Self::new(CompactString::new(s), kind, parent),
            Err(_) => Self {
                raw_name: Some(name.into()),
                ..Self::new(CompactString::from(String::from_utf8_lossy(name)), kind, parent)
            },
        }
    }

    /// The name as the filesystem knows it.
    pub fn os_name(&self) -> Cow<'_, OsStr> {
        match &self.raw_name {
            #[cfg(unix)]
            Some(raw) => {
                use std::os::unix::ffi::OsStrExt;
                Cow::Borrowed(OsStr::from_bytes(raw))
            }
            _ => Cow::Borrowed(OsStr::new(self.name.as_str())),
        }
    }

    /// The name bytes as they were read, for formats that must round-trip them.
    pub fn name_bytes(&self) -> &[u8] {
        self.raw_name.as_deref().unwrap_or(self.name.as_bytes())
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}
