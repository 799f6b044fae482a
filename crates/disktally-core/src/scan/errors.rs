/// The two scan error slots shown by the progress and error views.
///
/// `soft` holds the most recent path where a non-fatal error happened.
/// `fatal` holds a bounded message that halts scanning. Both slots are
/// replaced wholesale on every set; nothing is ever merged.
use std::borrow::Cow;
use std::fmt;

/// Size of the fatal message buffer, terminator included.
pub const FATAL_CAPACITY: usize = 1024;

/// A fatal error message, truncated to fit [`FATAL_CAPACITY`] and always
/// NUL-terminated. Truncation never splits a UTF-8 sequence.
#[derive(Clone)]
pub struct FatalMessage {
    buf: [u8; FATAL_CAPACITY],
    len: usize,
    truncated: bool,
}

impl FatalMessage {
    fn empty() -> Self {
        Self {
            buf: [0; FATAL_CAPACITY],
            len: 0,
            truncated: false,
        }
    }

    pub fn format(args: fmt::Arguments<'_>) -> Self {
        let mut msg = Self::empty();
        // Writing never fails; overflow is dropped.
        let _ = fmt::write(&mut msg, args);
        msg
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.buf[..=self.len]
    }

    /// Part of the formatted text did not fit.
    pub fn was_truncated(&self) -> bool {
        self.truncated
    }
}

impl fmt::Write for FatalMessage {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = FATAL_CAPACITY - 1 - self.len;
        let mut take = s.len().min(room);
        while !s.is_char_boundary(take) {
            take -= 1;
        }
        if take < s.len() {
            self.truncated = true;
        }
        self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        self.buf[self.len] = 0;
        Ok(())
    }
}

impl fmt::Debug for FatalMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FatalMessage").field(&self.as_str()).finish()
    }
}

#[derive(Debug, Default)]
pub struct ErrorChannel {
    soft: Option<Vec<u8>>,
    fatal: Option<FatalMessage>,
}

impl ErrorChannel {
    /// Record `path` as the latest soft error location.
    pub fn record_soft(&mut self, path: &[u8]) {
        let slot = self.soft.get_or_insert_with(Vec::new);
        slot.clear();
        slot.extend_from_slice(path);
    }

    pub fn clear_soft(&mut self) {
        self.soft = None;
    }

    pub fn soft(&self) -> Option<&[u8]> {
        self.soft.as_deref()
    }

    pub fn soft_lossy(&self) -> Option<Cow<'_, str>> {
        self.soft.as_deref().map(String::from_utf8_lossy)
    }

    /// Replace the fatal message; `None` clears it.
    pub fn set_fatal_error(&mut self, message: Option<fmt::Arguments<'_>>) {
        self.fatal = message.map(FatalMessage::format);
    }

    pub fn clear_fatal_error(&mut self) {
        self.fatal = None;
    }

    pub fn fatal(&self) -> Option<&FatalMessage> {
        self.fatal.as_ref()
    }
}
