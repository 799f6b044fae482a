/// Fresh filesystem scan, driven one quantum at a time.
///
/// A depth-first walk over an explicit stack of open directory listings.
/// Between steps the walk holds no borrowed state, so the run loop can
/// redraw, poll the keyboard, or drop the scan entirely.
use super::cursor::os_bytes;
use super::scratch::ScratchSlot;
use super::{ScanState, SourceDriver, SourceStep, QUANTUM};
use crate::config::Config;
use crate::exclude::ExcludeSet;
use crate::model::ExcludeReason;
use crate::platform::{self, EntryMeta};
use crate::sink::Sink;
use std::env;
use std::fs::{self, ReadDir};
use std::io;
use std::path::{Path, PathBuf};

/// The options of [`Config`] that affect traversal.
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    pub same_fs: bool,
    pub follow_symlinks: bool,
    pub exclude_caches: bool,
    pub exclude_kernfs: bool,
    pub exclude: ExcludeSet,
}

impl WalkOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            same_fs: config.same_fs,
            follow_symlinks: config.follow_symlinks,
            exclude_caches: config.exclude_caches,
            exclude_kernfs: config.exclude_kernfs,
            exclude: config.exclude.clone(),
        }
    }
}

/// One open directory on the walk stack.
struct Frame {
    path: PathBuf,
    entries: ReadDir,
}

pub struct FreshScan {
    root: PathBuf,
    options: WalkOptions,
    stack: Vec<Frame>,
    root_dev: u64,
    started: bool,
    slot: ScratchSlot,
}

impl FreshScan {
    pub fn new(root: impl Into<PathBuf>, options: WalkOptions) -> Self {
        Self {
            root: root.into(),
            options,
            stack: Vec::new(),
            root_dev: 0,
            started: false,
            slot: ScratchSlot::default(),
        }
    }

    /// Open the root. Any failure here is fatal.
    fn start(&mut self, state: &mut ScanState, sink: &mut dyn Sink) -> io::Result<SourceStep> {
        self.started = true;

        let root = match fs::canonicalize(&self.root) {
            Ok(p) => p,
            Err(e) => {
                let shown = match env::current_dir() {
                    Ok(cwd) => cwd.join(&self.root),
                    Err(_) => self.root.clone(),
                };
                state.cursor.set_root_os(&shown);
                state.set_fatal_error(Some(format_args!("{e}")));
                return Ok(SourceStep::Finished);
            }
        };
        state.cursor.set_root_os(&root);
        tracing::info!("Scanning {}", root.display());

        let meta = match fs::metadata(&root) {
            Ok(m) if m.is_dir() => EntryMeta::from_metadata(&m),
            Ok(_) => {
                state.set_fatal_error(Some(format_args!("Not a directory")));
                return Ok(SourceStep::Finished);
            }
            Err(e) => {
                state.set_fatal_error(Some(format_args!("{e}")));
                return Ok(SourceStep::Finished);
            }
        };
        let entries = match fs::read_dir(&root) {
            Ok(rd) => rd,
            Err(e) => {
                state.set_fatal_error(Some(format_args!("{e}")));
                return Ok(SourceStep::Finished);
            }
        };

        self.root_dev = meta.dev;
        let entry = self.slot.acquire(state.cursor.as_bytes());
        entry.fill_from(&meta);
        state.record(entry);
        sink.item(entry, true)?;
        self.stack.push(Frame {
            path: root,
            entries,
        });
        Ok(SourceStep::Working)
    }

    fn advance(&mut self, state: &mut ScanState, sink: &mut dyn Sink) -> io::Result<SourceStep> {
        if !self.started {
            return self.start(state, sink);
        }

        for _ in 0..QUANTUM {
            let Some(frame) = self.stack.last_mut() else {
                return Ok(SourceStep::Finished);
            };
            match frame.entries.next() {
                None => {
                    self.stack.pop();
                    sink.leave()?;
                    if self.stack.is_empty() {
                        return Ok(SourceStep::Finished);
                    }
                    state.cursor.leave();
                }
                Some(Err(e)) => {
                    tracing::debug!("readdir({}) failed: {e}", frame.path.display());
                    let path = frame.path.clone();
                    state.set_soft_error(Some(&path));
                }
                Some(Ok(dent)) => {
                    let path = dent.path();
                    state.cursor.enter_os(dent.file_name());
                    let descended = self.visit(&path, state, sink)?;
                    if !descended {
                        state.cursor.leave();
                    }
                }
            }
        }
        Ok(SourceStep::Working)
    }

    /// Report one entry. Returns `true` if it was pushed as a new frame,
    /// in which case the cursor stays inside it.
    fn visit(&mut self, path: &Path, state: &mut ScanState, sink: &mut dyn Sink) -> io::Result<bool> {
        let name = path.file_name().map(os_bytes).unwrap_or_default();
        let entry = self.slot.acquire(&name);

        if self.options.exclude.matches(&state.cursor.to_string_lossy()) {
            if let Ok(meta) = fs::symlink_metadata(path) {
                entry.fill_from(&EntryMeta::from_metadata(&meta));
            }
            entry.exclude(ExcludeReason::Pattern);
            state.record(entry);
            sink.item(entry, false)?;
            return Ok(false);
        }

        let meta = match fs::symlink_metadata(path) {
            Ok(m) => m,
            Err(e) => {
                tracing::debug!("lstat({}) failed: {e}", path.display());
                entry.is_error = true;
                state.set_soft_error(Some(path));
                state.record(entry);
                sink.item(entry, false)?;
                return Ok(false);
            }
        };
        let mut info = EntryMeta::from_metadata(&meta);
        if self.options.follow_symlinks && meta.file_type().is_symlink() {
            // Directories behind symlinks are never entered.
            if let Ok(target) = fs::metadata(path) {
                if !target.is_dir() {
                    info = EntryMeta::from_metadata(&target);
                }
            }
        }
        entry.fill_from(&info);

        if !entry.is_dir() {
            state.record(entry);
            sink.item(entry, false)?;
            return Ok(false);
        }

        let excluded = if self.options.same_fs && info.dev != self.root_dev {
            Some(ExcludeReason::OtherFs)
        } else if self.options.exclude_kernfs && platform::is_kernfs(path) {
            Some(ExcludeReason::KernFs)
        } else if self.options.exclude_caches && platform::has_cachedir_tag(path) {
            Some(ExcludeReason::CacheDir)
        } else {
            None
        };
        if let Some(reason) = excluded {
            tracing::debug!("Excluding {} ({reason:?})", path.display());
            entry.exclude(reason);
            state.record(entry);
            sink.item(entry, false)?;
            return Ok(false);
        }

        match fs::read_dir(path) {
            Ok(entries) => {
                state.record(entry);
                sink.item(entry, true)?;
                self.stack.push(Frame {
                    path: path.to_path_buf(),
                    entries,
                });
                Ok(true)
            }
            Err(e) => {
                tracing::debug!("opendir({}) failed: {e}", path.display());
                entry.is_error = true;
                state.set_soft_error(Some(path));
                state.record(entry);
                sink.item(entry, false)?;
                Ok(false)
            }
        }
    }
}

impl SourceDriver for FreshScan {
    fn step(&mut self, state: &mut ScanState, sink: &mut dyn Sink) -> SourceStep {
        match self.advance(state, sink) {
            Ok(step) => step,
            Err(e) => {
                self.stack.clear();
                state.set_fatal_error(Some(format_args!("Error writing to file: {e}")));
                SourceStep::Finished
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    fn run(scan: &mut FreshScan, state: &mut ScanState, sink: &mut MemorySink) -> usize {
        let mut steps = 0;
        while scan.step(state, sink) == SourceStep::Working {
            steps += 1;
            assert!(steps < 10_000, "scan did not terminate");
        }
        steps
    }

    #[test]
    fn missing_root_is_fatal_and_cursor_shows_it() {
        let tmp = tempfile::TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        let mut scan = FreshScan::new(&missing, WalkOptions::default());
        let mut state = ScanState::new();
        let mut sink = MemorySink::new();

        assert_eq!(scan.step(&mut state, &mut sink), SourceStep::Finished);
        assert!(state.has_fatal_error());
        assert!(state.cursor.to_string_lossy().ends_with("/nope"));
    }

    #[test]
    fn file_root_is_fatal() {
        let tmp = tempfile::TempDir::new().unwrap();
        let file = tmp.path().join("plain");
        fs::write(&file, b"x").unwrap();
        let mut scan = FreshScan::new(&file, WalkOptions::default());
        let mut state = ScanState::new();
        let mut sink = MemorySink::new();

        scan.step(&mut state, &mut sink);
        assert_eq!(state.errors.fatal().unwrap().as_str(), "Not a directory");
    }

    #[test]
    fn many_entries_take_several_steps() {
        let tmp = tempfile::TempDir::new().unwrap();
        for i in 0..(QUANTUM * 3) {
            fs::write(tmp.path().join(format!("f{i}")), b"ab").unwrap();
        }
        let mut scan = FreshScan::new(tmp.path(), WalkOptions::default());
        let mut state = ScanState::new();
        let mut sink = MemorySink::new();

        let steps = run(&mut scan, &mut state, &mut sink);
        assert!(steps >= 3);
        assert_eq!(state.items, 1 + (QUANTUM as u64) * 3);
        // The cursor is back at the root once the walk completes.
        let root = fs::canonicalize(tmp.path()).unwrap();
        assert_eq!(state.cursor.to_path_buf(), root);
    }

    #[test]
    fn pattern_exclusion_keeps_entry_without_size() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::write(tmp.path().join("keep.dat"), vec![0u8; 100]).unwrap();
        fs::write(tmp.path().join("skip.tmp"), vec![0u8; 900]).unwrap();
        let mut options = WalkOptions::default();
        options.exclude.add("*.tmp");

        let mut scan = FreshScan::new(tmp.path(), options);
        let mut state = ScanState::new();
        let mut sink = MemorySink::new();
        run(&mut scan, &mut state, &mut sink);

        let tree = sink.finish().unwrap().unwrap();
        let root = tree.root.unwrap();
        let skipped = tree
            .children(root)
            .into_iter()
            .find(|&c| tree.node(c).name == "skip.tmp")
            .unwrap();
        assert_eq!(tree.node(skipped).excluded, Some(ExcludeReason::Pattern));
        assert_eq!(tree.node(skipped).size, 0);
    }
}
