/// Builds the arena [`FileTree`] that the browser navigates.
use super::Sink;
use crate::model::{FileNode, FileTree, NodeIndex};
use crate::scan::ScratchEntry;
use std::io;

#[derive(Debug, Default)]
pub struct MemorySink {
    tree: FileTree,
    /// Open directories, innermost last.
    stack: Vec<NodeIndex>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            tree: FileTree::with_capacity(4_096),
            stack: Vec::new(),
        }
    }
}

impl Sink for MemorySink {
    fn item(&mut self, entry: &ScratchEntry, descend: bool) -> io::Result<()> {
        let parent = self.stack.last().copied();
        let mut node = FileNode::from_name_bytes(entry.name(), entry.kind, parent);
        node.size = entry.size;
        node.disk_usage = entry.disk_usage;
        node.mtime = entry.mtime;
        node.is_error = entry.is_error;
        node.excluded = entry.excluded;

        let idx = self.tree.add_node(node);
        match parent {
            Some(p) => self.tree.add_child(p, idx),
            None => self.tree.root = Some(idx),
        }
        if descend {
            self.stack.push(idx);
        }
        Ok(())
    }

    fn leave(&mut self) -> io::Result<()> {
        self.stack.pop();
        Ok(())
    }

    fn finish(&mut self) -> io::Result<Option<FileTree>> {
        let mut tree = std::mem::take(&mut self.tree);
        self.stack.clear();
        tree.aggregate_sizes();
        tracing::info!("In-memory tree complete: {} nodes", tree.len());
        Ok(Some(tree))
    }
}
