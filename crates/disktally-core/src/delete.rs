/// Incremental deletion of a file or directory tree.
///
/// Each [`Deleter::step`] removes exactly one filesystem entry, children
/// before their directory, so the interface stays responsive while a large
/// tree is being removed.
use crate::model::{FileTree, NodeIndex};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Result of one deletion step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStep {
    Working,
    Done,
}

#[derive(Debug, thiserror::Error)]
#[error("{}: {source}", .path.display())]
pub struct DeleteError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

#[derive(Debug)]
struct Pending {
    path: PathBuf,
    /// Children have already been pushed above this entry.
    expanded: bool,
}

#[derive(Debug)]
pub struct Deleter {
    stack: Vec<Pending>,
    removed: u64,
}

impl Deleter {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            stack: vec![Pending {
                path: target.into(),
                expanded: false,
            }],
            removed: 0,
        }
    }

    /// The entry the next step will work on.
    pub fn current(&self) -> Option<&Path> {
        self.stack.last().map(|p| p.path.as_path())
    }

    /// Entries removed so far.
    pub fn removed(&self) -> u64 {
        self.removed
    }

    /// Remove one entry. Directories are listed first and removed once
    /// empty. Stops at the first error; the remaining entries stay on disk.
    pub fn step(&mut self) -> Result<DeleteStep, DeleteError> {
        loop {
            let Some(top) = self.stack.last_mut() else {
                return Ok(DeleteStep::Done);
            };
            let fail = |source| DeleteError {
                path: top.path.clone(),
                source,
            };

            let meta = fs::symlink_metadata(&top.path).map_err(fail)?;
            if meta.is_dir() && !top.expanded {
                top.expanded = true;
                let mut children = Vec::new();
                for entry in fs::read_dir(&top.path).map_err(fail)? {
                    children.push(Pending {
                        path: entry.map_err(fail)?.path(),
                        expanded: false,
                    });
                }
                self.stack.extend(children);
                continue;
            }

            if meta.is_dir() {
                fs::remove_dir(&top.path).map_err(fail)?;
            } else {
                fs::remove_file(&top.path).map_err(fail)?;
            }
            tracing::debug!("Removed {}", top.path.display());
            self.stack.pop();
            self.removed += 1;
            return Ok(if self.stack.is_empty() {
                DeleteStep::Done
            } else {
                DeleteStep::Working
            });
        }
    }
}

/// Bring the tree back in line with the disk after a deletion of `target`
/// stopped partway. Nodes whose entry no longer exists are unlinked,
/// children before their directory; a surviving `target` is flagged as
/// errored. Returns the number of nodes unlinked.
pub fn prune_deleted(tree: &mut FileTree, target: NodeIndex) -> u64 {
    let mut order = Vec::new();
    let mut stack = vec![target];
    while let Some(idx) = stack.pop() {
        order.push(idx);
        stack.extend(tree.children(idx));
    }

    let mut unlinked = 0;
    for &idx in order.iter().rev() {
        let Some(parent) = tree.node(idx).parent else {
            continue;
        };
        let gone = matches!(
            fs::symlink_metadata(tree.full_path(idx)),
            Err(e) if e.kind() == io::ErrorKind::NotFound
        );
        if gone && tree.remove_child(parent, idx) {
            unlinked += 1;
        }
    }
    if tree.node(target).parent.is_some() {
        tree.node_mut(target).is_error = true;
    }
    tracing::info!("Unlinked {unlinked} deleted entries after a failed deletion");
    unlinked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_tree_one_entry_per_step() {
        let tmp = tempfile::TempDir::new().unwrap();
        let target = tmp.path().join("victim");
        fs::create_dir_all(target.join("sub")).unwrap();
        fs::write(target.join("a"), b"1").unwrap();
        fs::write(target.join("sub/b"), b"2").unwrap();

        let mut deleter = Deleter::new(&target);
        let mut steps = 0;
        while deleter.step().unwrap() == DeleteStep::Working {
            steps += 1;
        }
        // a, sub/b, sub, then victim itself on the final step.
        assert_eq!(steps, 3);
        assert_eq!(deleter.removed(), 4);
        assert!(!target.exists());
        assert!(deleter.current().is_none());
    }

    #[test]
    fn removes_single_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let file = tmp.path().join("f");
        fs::write(&file, b"x").unwrap();
        let mut deleter = Deleter::new(&file);
        assert_eq!(deleter.step().unwrap(), DeleteStep::Done);
        assert!(!file.exists());
    }

    /// tmp -> victim -> (a: 10, b: 20), with the same layout on disk.
    fn victim_tree(tmp: &Path) -> (FileTree, NodeIndex, NodeIndex) {
        use crate::model::FileNode;
        use compact_str::CompactString;

        fs::create_dir(tmp.join("victim")).unwrap();
        fs::write(tmp.join("victim/a"), b"a").unwrap();
        fs::write(tmp.join("victim/b"), b"b").unwrap();

        let mut tree = FileTree::with_capacity(4);
        let root = tree.add_root(CompactString::from(tmp.to_string_lossy()));
        let victim = tree.add_node(FileNode::new_dir(CompactString::new("victim"), Some(root)));
        tree.add_child(root, victim);
        for (name, size) in [("a", 10), ("b", 20)] {
            let f = tree.add_node(FileNode::new_file(CompactString::new(name), size, Some(victim)));
            tree.add_child(victim, f);
        }
        tree.aggregate_sizes();
        (tree, root, victim)
    }

    #[test]
    fn prune_unlinks_entries_already_removed() {
        let tmp = tempfile::TempDir::new().unwrap();
        let (mut tree, root, victim) = victim_tree(tmp.path());
        fs::remove_file(tmp.path().join("victim/a")).unwrap();

        assert_eq!(prune_deleted(&mut tree, victim), 1);
        let left: Vec<_> = tree
            .children(victim)
            .into_iter()
            .map(|i| tree.node(i).name.to_string())
            .collect();
        assert_eq!(left, ["b"]);
        assert_eq!(tree.node(victim).size, 20);
        assert_eq!(tree.node(root).size, 20);
        assert!(tree.node(victim).is_error);
    }

    #[test]
    fn prune_unlinks_target_that_is_fully_gone() {
        let tmp = tempfile::TempDir::new().unwrap();
        let (mut tree, root, victim) = victim_tree(tmp.path());
        fs::remove_dir_all(tmp.path().join("victim")).unwrap();

        assert_eq!(prune_deleted(&mut tree, victim), 3);
        assert!(tree.children(root).is_empty());
        assert_eq!(tree.node(root).size, 0);
        assert!(!tree.node(victim).is_error);
    }

    #[test]
    fn missing_target_reports_path() {
        let tmp = tempfile::TempDir::new().unwrap();
        let missing = tmp.path().join("gone");
        let err = Deleter::new(&missing).step().unwrap_err();
        assert_eq!(err.path, missing);
        assert!(err.to_string().contains("gone"));
    }
}
