/// Arena-backed file tree with O(n) bottom-up size aggregation.
///
/// All nodes live in a single `Vec<FileNode>`. Relationships between nodes
/// use `NodeIndex` (a thin `u32` wrapper) rather than heap pointers.
use super::file_node::{FileNode, NodeIndex};
use compact_str::CompactString;
use std::path::PathBuf;

/// Ordering of a directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Largest first; ties broken by name.
    #[default]
    Size,
    /// Alphabetical.
    Name,
}

/// The complete file tree produced by a scan or an import.
#[derive(Debug, Clone, Default)]
pub struct FileTree {
    /// Arena: every node in a flat vector. Nodes unlinked by
    /// [`remove_child`](Self::remove_child) stay here but are unreachable.
    pub nodes: Vec<FileNode>,

    /// The scan root. Its name is the full path that was scanned.
    pub root: Option<NodeIndex>,
}

impl FileTree {
    /// Create an empty tree with pre-allocated capacity.
    pub fn with_capacity(estimated_nodes: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(estimated_nodes),
            root: None,
        }
    }

    /// Allocate a new node in the arena and return its index.
    pub fn add_node(&mut self, node: FileNode) -> NodeIndex {
        let idx = NodeIndex::new(self.nodes.len());
        self.nodes.push(node);
        idx
    }

    /// Set the root directory of the tree.
    pub fn add_root(&mut self, name: CompactString) -> NodeIndex {
        let idx = self.add_node(FileNode::new_dir(name, None));
        self.root = Some(idx);
        idx
    }

    /// Attach `child` as a child of `parent`, prepending to the sibling list.
    ///
    /// This is O(1): new children are inserted at the head of the linked list.
    pub fn add_child(&mut self, parent: NodeIndex, child: NodeIndex) {
        let old_first = self.nodes[parent.idx()].first_child;
        self.nodes[child.idx()].next_sibling = old_first;
        self.nodes[child.idx()].parent = Some(parent);
        self.nodes[parent.idx()].first_child = Some(child);
    }

    /// Roll sizes and descendant counts up into every directory.
    ///
    /// Children are always inserted after their parent in the arena (scan
    /// order is parent-first), so iterating in *reverse* processes every
    /// child before its parent. O(n), no recursion.
    ///
    /// Directory sizes start from the directory entry's own size, so this
    /// must run exactly once on a finished tree.
    pub fn aggregate_sizes(&mut self) {
        for i in (0..self.nodes.len()).rev() {
            let node = &self.nodes[i];
            let Some(parent) = node.parent else {
                continue;
            };
            let (size, disk, count) = (node.size, node.disk_usage, node.descendant_count + 1);
            let p = &mut self.nodes[parent.idx()];
            p.size += size;
            p.disk_usage += disk;
            p.descendant_count += count;
        }
    }

    /// Unlink `child` from `parent` and subtract its totals from every ancestor.
    ///
    /// Returns `false` if `child` was not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeIndex, child: NodeIndex) -> bool {
        let next = self.nodes[child.idx()].next_sibling;
        if self.nodes[parent.idx()].first_child == Some(child) {
            self.nodes[parent.idx()].first_child = next;
        } else {
            let mut cur = self.nodes[parent.idx()].first_child;
            loop {
                let Some(idx) = cur else {
                    return false;
                };
                if self.nodes[idx.idx()].next_sibling == Some(child) {
                    self.nodes[idx.idx()].next_sibling = next;
                    break;
                }
                cur = self.nodes[idx.idx()].next_sibling;
            }
        }

        let removed = &mut self.nodes[child.idx()];
        removed.parent = None;
        removed.next_sibling = None;
        let (size, disk, count) = (removed.size, removed.disk_usage, removed.descendant_count + 1);

        let mut ancestor = Some(parent);
        while let Some(idx) = ancestor {
            let node = &mut self.nodes[idx.idx()];
            node.size = node.size.saturating_sub(size);
            node.disk_usage = node.disk_usage.saturating_sub(disk);
            node.descendant_count = node.descendant_count.saturating_sub(count);
            ancestor = node.parent;
        }
        true
    }

    /// Reconstruct the full path for a node by walking up to the root.
    pub fn full_path(&self, index: NodeIndex) -> PathBuf {
        let mut segments = Vec::new();
        let mut current = Some(index);
        while let Some(idx) = current {
            segments.push(self.nodes[idx.idx()].os_name());
            current = self.nodes[idx.idx()].parent;
        }
        segments.iter().rev().collect()
    }

    /// Direct children of a node in the requested order.
    pub fn children_sorted(&self, parent: NodeIndex, key: SortKey) -> Vec<NodeIndex> {
        let mut children = self.children(parent);
        match key {
            SortKey::Size => children.sort_unstable_by(|a, b| {
                let a_node = &self.nodes[a.idx()];
                let b_node = &self.nodes[b.idx()];
                b_node
                    .size
                    .cmp(&a_node.size)
                    .then_with(|| a_node.name.cmp(&b_node.name))
            }),
            SortKey::Name => {
                children.sort_unstable_by(|a, b| self.nodes[a.idx()].name.cmp(&self.nodes[b.idx()].name))
            }
        }
        children
    }

    /// Direct children of a node (unsorted).
    pub fn children(&self, parent: NodeIndex) -> Vec<NodeIndex> {
        let mut children = Vec::new();
        let mut child = self.nodes[parent.idx()].first_child;
        while let Some(idx) = child {
            children.push(idx);
            child = self.nodes[idx.idx()].next_sibling;
        }
        children
    }

    /// Get the node at the given index.
    #[inline]
    pub fn node(&self, index: NodeIndex) -> &FileNode {
        &self.nodes[index.idx()]
    }

    #[inline]
    pub fn node_mut(&mut self, index: NodeIndex) -> &mut FileNode {
        &mut self.nodes[index.idx()]
    }

    /// Total number of nodes in the arena.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree contains no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// root -> dir -> (a.txt: 100, b.txt: 200), root -> c.txt: 50
    fn sample() -> (FileTree, NodeIndex, NodeIndex, NodeIndex) {
        let mut tree = FileTree::with_capacity(8);
        let root = tree.add_root(CompactString::new("/data"));
        let dir = tree.add_node(FileNode::new_dir(CompactString::new("users"), Some(root)));
        tree.add_child(root, dir);
        let a = tree.add_node(FileNode::new_file(CompactString::new("a.txt"), 100, Some(dir)));
        tree.add_child(dir, a);
        let b = tree.add_node(FileNode::new_file(CompactString::new("b.txt"), 200, Some(dir)));
        tree.add_child(dir, b);
        let c = tree.add_node(FileNode::new_file(CompactString::new("c.txt"), 50, Some(root)));
        tree.add_child(root, c);
        (tree, root, dir, a)
    }

    #[test]
    fn test_tree_aggregation() {
        let (mut tree, root, dir, _) = sample();
        tree.aggregate_sizes();

        assert_eq!(tree.node(dir).size, 300);
        assert_eq!(tree.node(root).size, 350);
        assert_eq!(tree.node(dir).descendant_count, 2);
        assert_eq!(tree.node(root).descendant_count, 4);
    }

    #[test]
    fn test_full_path() {
        let (tree, _, _, a) = sample();
        assert_eq!(tree.full_path(a), PathBuf::from("/data/users/a.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_full_path_uses_raw_name_bytes() {
        use crate::model::EntryKind;
        use std::os::unix::ffi::OsStrExt;

        let mut tree = FileTree::with_capacity(4);
        let root = tree.add_root(CompactString::new("/data"));
        let raw = tree.add_node(FileNode::from_name_bytes(b"big\xff.bin", EntryKind::File, Some(root)));
        tree.add_child(root, raw);
        let lookalike = tree.add_node(FileNode::from_name_bytes("big\u{FFFD}.bin".as_bytes(), EntryKind::File, Some(root)));
        tree.add_child(root, lookalike);

        assert_eq!(tree.node(raw).name, tree.node(lookalike).name);
        assert_eq!(tree.full_path(raw).as_os_str().as_bytes(), b"/data/big\xff.bin");
        assert_eq!(tree.full_path(lookalike), PathBuf::from("/data/big\u{FFFD}.bin"));
    }

    #[test]
    fn test_children_sorted() {
        let (mut tree, root, dir, _) = sample();
        tree.aggregate_sizes();

        let by_size = tree.children_sorted(root, SortKey::Size);
        assert_eq!(by_size[0], dir);

        let by_name: Vec<_> = tree
            .children_sorted(dir, SortKey::Name)
            .into_iter()
            .map(|i| tree.node(i).name.to_string())
            .collect();
        assert_eq!(by_name, ["a.txt", "b.txt"]);
    }

    #[test]
    fn test_remove_child_adjusts_ancestors() {
        let (mut tree, root, dir, a) = sample();
        tree.aggregate_sizes();

        assert!(tree.remove_child(dir, a));
        assert_eq!(tree.node(dir).size, 200);
        assert_eq!(tree.node(root).size, 250);
        assert_eq!(tree.node(root).descendant_count, 3);
        assert_eq!(tree.children(dir).len(), 1);

        // Already unlinked.
        assert!(!tree.remove_child(dir, a));
    }

    #[test]
    fn test_remove_directory_subtree() {
        let (mut tree, root, dir, _) = sample();
        tree.aggregate_sizes();

        assert!(tree.remove_child(root, dir));
        assert_eq!(tree.node(root).size, 50);
        assert_eq!(tree.node(root).descendant_count, 1);
    }
}
