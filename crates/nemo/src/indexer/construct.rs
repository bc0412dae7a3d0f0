//! Arena construction from a walked node tree.
//!
//! The walk already sorted children, so a pre-order pass over the
//! `WalkNode` tree inserts entries in their final order.

use super::walk::WalkNode;
use crate::error::Result;
use crate::storage::{EntryIndex, EntryTree};

/// Converts a walked tree into an [`EntryTree`].
pub fn construct_tree(root: &WalkNode) -> Result<EntryTree> {
    let mut tree = EntryTree::with_root(root.name.clone(), root.metadata);
    let root_index = tree.root();

    // Explicit stack; deep trees must not overflow the call stack.
    let mut stack: Vec<(EntryIndex, &WalkNode)> = root
        .children
        .iter()
        .rev()
        .map(|child| (root_index, child))
        .collect();

    while let Some((parent, node)) = stack.pop() {
        let index = tree.push_child(parent, node.name.clone(), node.metadata)?;
        stack.extend(node.children.iter().rev().map(|child| (index, child)));
    }

    Ok(tree)
}
