/// The reusable record describing the entry about to be linked into the tree.
///
/// Drivers fill one [`ScratchEntry`] per visited entry and hand it to the
/// sink. The entry is borrowed mutably from its [`ScratchSlot`], so the
/// previous one can't be held across the next [`ScratchSlot::acquire`].
use crate::model::{EntryKind, ExcludeReason};
use crate::platform::EntryMeta;
use std::borrow::Cow;

/// Smallest name buffer ever allocated.
pub const MIN_NAME_CAPACITY: usize = 256;

#[derive(Debug, Default, Clone)]
pub struct ScratchEntry {
    name: Vec<u8>,
    pub kind: EntryKind,
    pub size: u64,
    pub disk_usage: u64,
    pub mtime: Option<i64>,
    /// The entry, or the listing of a directory, could not be read.
    pub is_error: bool,
    pub excluded: Option<ExcludeReason>,
}

impl ScratchEntry {
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    /// Copy size, type and mtime from filesystem metadata.
    pub fn fill_from(&mut self, meta: &EntryMeta) {
        self.kind = if meta.is_dir {
            EntryKind::Dir
        } else if meta.is_file {
            EntryKind::File
        } else {
            EntryKind::Other
        };
        self.size = meta.size;
        self.disk_usage = meta.disk_usage;
        self.mtime = meta.mtime;
    }

    /// Mark as excluded. Excluded entries contribute no size.
    pub fn exclude(&mut self, reason: ExcludeReason) {
        self.excluded = Some(reason);
        self.size = 0;
        self.disk_usage = 0;
    }
}

/// Owner of the single [`ScratchEntry`].
#[derive(Debug, Default)]
pub struct ScratchSlot {
    entry: ScratchEntry,
    reallocations: usize,
}

impl ScratchSlot {
    /// Reset the entry to defaults with the given name and lend it out.
    pub fn acquire(&mut self, name: &[u8]) -> &mut ScratchEntry {
        let capacity = self.entry.name.capacity();
        if name.len() > capacity {
            let target = name.len().max(capacity * 2).max(MIN_NAME_CAPACITY);
            self.entry.name.clear();
            self.entry.name.reserve_exact(target);
            self.reallocations += 1;
        }
        let mut name_buf = std::mem::take(&mut self.entry.name);
        name_buf.clear();
        name_buf.extend_from_slice(name);
        self.entry = ScratchEntry {
            name: name_buf,
            ..ScratchEntry::default()
        };
        &mut self.entry
    }

    /// How many times the name buffer was (re)allocated.
    pub fn reallocations(&self) -> usize {
        self.reallocations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_resets_previous_fields() {
        let mut slot = ScratchSlot::default();
        let e = slot.acquire(b"first");
        e.size = 10;
        e.is_error = true;
        e.exclude(ExcludeReason::Pattern);

        let e = slot.acquire(b"second");
        assert_eq!(e.name(), b"second");
        assert_eq!(e.size, 0);
        assert!(!e.is_error);
        assert!(e.excluded.is_none());
        assert_eq!(e.kind, EntryKind::File);
    }

    #[test]
    fn name_buffer_grows_geometrically_and_is_reused() {
        let mut slot = ScratchSlot::default();
        slot.acquire(b"short");
        assert_eq!(slot.reallocations(), 1);
        slot.acquire(&[b'a'; 200]);
        assert_eq!(slot.reallocations(), 1);
        slot.acquire(&[b'b'; 300]);
        assert_eq!(slot.reallocations(), 2);
        assert_eq!(slot.acquire(&[b'c'; 300]).name().len(), 300);
        assert_eq!(slot.reallocations(), 2);
    }

    #[test]
    fn fill_from_classifies_kind() {
        let mut slot = ScratchSlot::default();
        let e = slot.acquire(b"d");
        e.fill_from(&EntryMeta {
            is_dir: true,
            size: 4096,
            ..EntryMeta::default()
        });
        assert!(e.is_dir());
        assert_eq!(e.size, 4096);

        let e = slot.acquire(b"sock");
        e.fill_from(&EntryMeta::default());
        assert_eq!(e.kind, EntryKind::Other);
    }
}
