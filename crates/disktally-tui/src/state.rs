/// Application state: the active screen and the context every screen reads.
///
/// Exactly one [`Screen`] is active. Each variant carries the state that
/// only matters while it is shown; everything that outlives a screen
/// (configuration, scan progress, the tree, the browse position) lives in
/// [`Context`].
use disktally_core::config::Config;
use disktally_core::delete::Deleter;
use disktally_core::model::file_tree::SortKey;
use disktally_core::model::{FileTree, NodeIndex};
use disktally_core::pipeline::Pipeline;
use disktally_core::redraw::RedrawScheduler;
use disktally_core::scan::ScanState;
use std::path::PathBuf;

/// Smallest terminal the interface draws into.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 17;

/// The screens of the run loop.
#[derive(Debug)]
pub enum Screen {
    /// Progress of the initial scan or import; the error view when fatal.
    Scanning,
    Browsing,
    Help,
    /// The shell came back with a problem worth showing.
    ShellOut(ShellOutcome),
    ConfirmDelete(DeletePhase),
    ConfirmQuit,
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scanning => "scanning",
            Self::Browsing => "browsing",
            Self::Help => "help",
            Self::ShellOut(_) => "shell",
            Self::ConfirmDelete(_) => "delete",
            Self::ConfirmQuit => "quit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellOutcome {
    /// The shell exited with a non-zero status (`None` when killed by a signal).
    Exited(Option<i32>),
    /// The shell could not be started.
    Failed { shell: String, reason: String },
}

#[derive(Debug)]
pub enum DeletePhase {
    /// Waiting for y/n.
    Confirm { target: NodeIndex },
    /// Removing one entry per step.
    Deleting { target: NodeIndex, deleter: Deleter },
    /// Stopped at an error; any key returns to the browser.
    Failed { message: String },
}

/// What a key handler asks the run loop to do.
#[derive(Debug)]
pub enum Action {
    None,
    Goto(Screen),
    /// Suspend the interface and run a shell in this directory.
    SpawnShell(PathBuf),
    Quit,
}

/// Whether the run loop keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Terminal size class, recomputed on every resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewport {
    Fits { width: u16, height: u16 },
    /// Below [`MIN_WIDTH`] x [`MIN_HEIGHT`]; only a notice is drawn.
    TooSmall { width: u16, height: u16 },
}

impl Viewport {
    pub fn classify(width: u16, height: u16) -> Self {
        if width < MIN_WIDTH || height < MIN_HEIGHT {
            Self::TooSmall { width, height }
        } else {
            Self::Fits { width, height }
        }
    }

    pub fn width(self) -> u16 {
        match self {
            Self::Fits { width, .. } | Self::TooSmall { width, .. } => width,
        }
    }
}

/// Position inside the tree.
#[derive(Debug, Clone)]
pub struct BrowseState {
    /// Directory being listed.
    pub dir: NodeIndex,
    /// Children of `dir` in display order.
    pub listing: Vec<NodeIndex>,
    /// Index into `listing`.
    pub selected: usize,
    pub sort: SortKey,
}

impl BrowseState {
    pub fn new(tree: &FileTree) -> Option<Self> {
        let root = tree.root?;
        let mut state = Self {
            dir: root,
            listing: Vec::new(),
            selected: 0,
            sort: SortKey::Size,
        };
        state.refresh(tree);
        Some(state)
    }

    /// Rebuild the listing, keeping the selection in range.
    pub fn refresh(&mut self, tree: &FileTree) {
        self.listing = tree.children_sorted(self.dir, self.sort);
        if self.selected >= self.listing.len() {
            self.selected = self.listing.len().saturating_sub(1);
        }
    }

    pub fn selected_node(&self) -> Option<NodeIndex> {
        self.listing.get(self.selected).copied()
    }

    /// Move the selection onto `node` if it is listed.
    pub fn select(&mut self, node: NodeIndex) {
        if let Some(pos) = self.listing.iter().position(|&n| n == node) {
            self.selected = pos;
        }
    }
}

/// Everything shared across screens.
pub struct Context {
    pub config: Config,
    pub scan: ScanState,
    /// Source and sink; dropped once the scan finishes.
    pub pipeline: Option<Pipeline>,
    pub tree: Option<FileTree>,
    pub browse: Option<BrowseState>,
    pub viewport: Viewport,
    pub scheduler: RedrawScheduler,
    /// A feedback line was written to stderr and not yet terminated.
    pub line_open: bool,
}

impl Context {
    pub fn new(config: Config, pipeline: Pipeline) -> Self {
        let scheduler = RedrawScheduler::new(config.update_delay_ms);
        Self {
            config,
            scan: ScanState::new(),
            pipeline: Some(pipeline),
            tree: None,
            browse: None,
            viewport: Viewport::Fits {
                width: 80,
                height: 24,
            },
            scheduler,
            line_open: false,
        }
    }

    /// Install a finished tree and point the browser at its root.
    pub fn set_tree(&mut self, tree: FileTree) {
        self.browse = BrowseState::new(&tree);
        self.tree = Some(tree);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compact_str::CompactString;
    use disktally_core::model::FileNode;

    #[test]
    fn viewport_classification() {
        assert_eq!(
            Viewport::classify(60, 17),
            Viewport::Fits {
                width: 60,
                height: 17
            }
        );
        assert!(matches!(Viewport::classify(59, 40), Viewport::TooSmall { .. }));
        assert!(matches!(Viewport::classify(120, 16), Viewport::TooSmall { .. }));
        assert_eq!(Viewport::classify(30, 5).width(), 30);
    }

    #[test]
    fn browse_state_keeps_selection_in_range() {
        let mut tree = FileTree::with_capacity(4);
        let root = tree.add_root(CompactString::new("/r"));
        for (name, size) in [("a", 1), ("b", 2)] {
            let n = tree.add_node(FileNode::new_file(CompactString::new(name), size, Some(root)));
            tree.add_child(root, n);
        }
        tree.aggregate_sizes();

        let mut browse = BrowseState::new(&tree).unwrap();
        assert_eq!(tree.node(browse.selected_node().unwrap()).name, "b");
        browse.selected = 1;
        let a = browse.selected_node().unwrap();
        tree.remove_child(root, a);
        browse.refresh(&tree);
        assert_eq!(browse.selected, 0);
    }
}
