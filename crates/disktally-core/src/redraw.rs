/// Redraw scheduling: decouples screen refreshes from input and scan speed.
///
/// In [`WaitMode::Cadenced`] the wall clock is quantised into buckets of
/// `interval` milliseconds and the screen is redrawn only when the bucket
/// changes. A fast scan that polls thousands of times per second therefore
/// costs at most one redraw per interval.
use std::cell::Cell;
use std::time::{SystemTime, UNIX_EPOCH};

/// The clock is folded modulo this many milliseconds before bucketing,
/// keeping bucket numbers small.
const BUCKET_WRAP_MS: u64 = 1_000_000;

/// How an input cycle waits and redraws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitMode {
    /// Never block; always redraw before polling.
    Immediate,
    /// Redraw, then wait indefinitely for one input event.
    Blocking,
    /// Never block; redraw only when the cadence bucket changed.
    Cadenced,
}

impl WaitMode {
    pub fn blocks(self) -> bool {
        matches!(self, Self::Blocking)
    }
}

/// Source of wall-clock time in milliseconds.
pub trait Clock {
    fn now_millis(&self) -> u64;
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// A clock that only moves when told to. Useful for deterministic tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn starting_at(millis: u64) -> Self {
        Self {
            now: Cell::new(millis),
        }
    }

    pub fn advance(&self, millis: u64) {
        self.now.set(self.now.get() + millis);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }
}

/// Decides whether an input cycle should redraw.
#[derive(Debug, Clone)]
pub struct RedrawScheduler {
    interval_ms: u64,
    last_bucket: Option<u64>,
    redraws: u64,
}

impl RedrawScheduler {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_bucket: None,
            redraws: 0,
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Number of redraws granted so far. Drives frame-based animations.
    pub fn redraws(&self) -> u64 {
        self.redraws
    }

    /// Decide whether to redraw now. Granting a cadenced redraw records
    /// the current bucket.
    pub fn should_redraw(&mut self, mode: WaitMode, now_ms: u64) -> bool {
        let due = match mode {
            WaitMode::Immediate | WaitMode::Blocking => true,
            WaitMode::Cadenced if self.interval_ms == 0 => true,
            WaitMode::Cadenced => {
                let bucket = (now_ms % BUCKET_WRAP_MS) / self.interval_ms;
                if self.last_bucket == Some(bucket) {
                    false
                } else {
                    self.last_bucket = Some(bucket);
                    true
                }
            }
        };
        if due {
            self.redraws += 1;
        }
        due
    }
}
