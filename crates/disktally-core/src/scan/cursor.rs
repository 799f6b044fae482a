/// The live scan cursor: the absolute path of the entry being visited.
///
/// Backed by one byte buffer that always ends in a NUL byte and never
/// shrinks. Growth is geometric (at least doubling, floor of
/// [`MIN_CAPACITY`]), so descending through a deep tree costs O(log L)
/// allocations for a total path length L.
use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

/// Smallest buffer ever allocated.
pub const MIN_CAPACITY: usize = 128;

#[derive(Debug)]
pub struct ScanCursor {
    /// Path bytes followed by exactly one NUL.
    buf: Vec<u8>,
    reallocations: usize,
}

impl Default for ScanCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanCursor {
    /// A cursor at `/`.
    pub fn new() -> Self {
        let mut cursor = Self {
            buf: Vec::new(),
            reallocations: 0,
        };
        cursor.set_root(b"/");
        cursor
    }

    /// Reset to an absolute path. Trailing separators are dropped; an empty
    /// path becomes `/`.
    pub fn set_root(&mut self, path: &[u8]) {
        let mut path = path;
        while path.len() > 1 && path.ends_with(b"/") {
            path = &path[..path.len() - 1];
        }
        if path.is_empty() {
            path = b"/";
        }
        self.buf.clear();
        self.reserve_total(path.len() + 1);
        self.buf.extend_from_slice(path);
        self.buf.push(0);
    }

    /// [`set_root`](Self::set_root) for an OS path.
    pub fn set_root_os(&mut self, path: impl AsRef<OsStr>) {
        let bytes = os_bytes(path.as_ref());
        self.set_root(&bytes);
    }

    /// Append `/name`. Directly under `/` no extra separator is added.
    pub fn enter(&mut self, name: &[u8]) {
        let at_root = self.as_bytes() == b"/";
        let needed = self.buf.len() + name.len() + usize::from(!at_root);
        self.reserve_total(needed);
        self.buf.pop();
        if !at_root {
            self.buf.push(b'/');
        }
        self.buf.extend_from_slice(name);
        self.buf.push(0);
    }

    /// [`enter`](Self::enter) for an OS file name.
    pub fn enter_os(&mut self, name: impl AsRef<OsStr>) {
        let bytes = os_bytes(name.as_ref());
        self.enter(&bytes);
    }

    /// Drop the last component. At `/` this is a no-op.
    pub fn leave(&mut self) {
        match self.as_bytes().iter().rposition(|&b| b == b'/') {
            Some(pos) if pos > 0 => self.buf.truncate(pos),
            _ => {
                self.buf.clear();
                self.buf.push(b'/');
            }
        }
        self.buf.push(0);
    }

    /// Path bytes without the terminator.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.buf.len() - 1]
    }

    /// Path bytes including the trailing NUL.
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.buf
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    pub fn to_path_buf(&self) -> PathBuf {
        PathBuf::from(os_string(self.as_bytes()))
    }

    /// How many times the backing buffer was (re)allocated.
    pub fn reallocations(&self) -> usize {
        self.reallocations
    }

    fn reserve_total(&mut self, needed: usize) {
        let capacity = self.buf.capacity();
        if needed <= capacity {
            return;
        }
        let target = needed.max(capacity * 2).max(MIN_CAPACITY);
        self.buf.reserve_exact(target - self.buf.len());
        self.reallocations += 1;
    }
}

/// Raw bytes of an OS string. Lossy outside Unix.
pub(crate) fn os_bytes(s: &OsStr) -> Cow<'_, [u8]> {
    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        Cow::Borrowed(s.as_bytes())
    }
    #[cfg(not(unix))]
    {
        match s.to_string_lossy() {
            Cow::Borrowed(b) => Cow::Borrowed(b.as_bytes()),
            Cow::Owned(o) => Cow::Owned(o.into_bytes()),
        }
    }
}

/// Inverse of [`os_bytes`]. Lossy outside Unix.
pub(crate) fn os_string(bytes: &[u8]) -> OsString {
    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        OsStr::from_bytes(bytes).to_os_string()
    }
    #[cfg(not(unix))]
    {
        OsString::from(String::from_utf8_lossy(bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(c: &ScanCursor) -> &str {
        std::str::from_utf8(c.as_bytes()).unwrap()
    }

    #[test]
    fn enter_under_root_has_single_separator() {
        let mut c = ScanCursor::new();
        c.enter(b"usr");
        c.enter(b"lib");
        assert_eq!(path(&c), "/usr/lib");
        assert_eq!(c.as_bytes_with_nul(), b"/usr/lib\0");
    }

    #[test]
    fn leave_returns_to_parent_and_stops_at_root() {
        let mut c = ScanCursor::new();
        c.set_root(b"/home/user");
        c.enter(b"docs");
        c.leave();
        assert_eq!(path(&c), "/home/user");
        c.leave();
        c.leave();
        assert_eq!(path(&c), "/");
        c.leave();
        c.leave();
        assert_eq!(path(&c), "/");
        assert_eq!(c.as_bytes_with_nul(), b"/\0");
    }

    #[test]
    fn set_root_normalises_trailing_separators() {
        let mut c = ScanCursor::new();
        c.set_root(b"/tmp/");
        assert_eq!(path(&c), "/tmp");
        c.set_root(b"");
        assert_eq!(path(&c), "/");
        c.set_root(b"///");
        assert_eq!(path(&c), "/");
    }

    #[test]
    fn matches_stack_of_entered_names() {
        let mut c = ScanCursor::new();
        let mut stack: Vec<String> = Vec::new();
        let script = "a+b+c--d+e---f+g+-h+";
        for (i, op) in script.chars().enumerate() {
            if op == '+' {
                let name = format!("n{i}");
                c.enter(name.as_bytes());
                stack.push(name);
            } else if !stack.is_empty() {
                c.leave();
                stack.pop();
            }
            let expected = format!("/{}", stack.join("/"));
            assert_eq!(path(&c), expected);
            assert_eq!(c.as_bytes_with_nul().last(), Some(&0));
        }
    }

    #[test]
    fn reallocations_grow_logarithmically() {
        let mut c = ScanCursor::new();
        let name = b"abcdefghij";
        for _ in 0..2_000 {
            c.enter(name);
        }
        // ~22 000 bytes from a 128-byte floor: at most 1 + log2(172) doublings.
        assert!(c.reallocations() <= 10, "{} reallocations", c.reallocations());
        assert_eq!(c.as_bytes().len(), 2_000 * 11);

        let before = c.reallocations();
        for _ in 0..2_000 {
            c.leave();
        }
        for _ in 0..2_000 {
            c.enter(name);
        }
        assert_eq!(c.reallocations(), before, "buffer must be reused");
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_names_round_trip() {
        use std::os::unix::ffi::OsStrExt;
        let mut c = ScanCursor::new();
        c.enter_os(OsStr::from_bytes(b"caf\xe9"));
        assert_eq!(c.as_bytes(), b"/caf\xe9");
        assert_eq!(c.to_path_buf().as_os_str().as_bytes(), b"/caf\xe9");
    }
}
