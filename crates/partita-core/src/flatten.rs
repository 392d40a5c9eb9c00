#![forbid(unsafe_code)]

//! Flat pre-order projection of a hierarchy.
//!
//! The output lists `(key, depth, value)` for every node in the same
//! left-to-right, parent-before-children order a partition chart draws
//! them. `Null`-keyed nodes are skipped but their descendants are not.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::key::Key;
use crate::tree::{HierarchyTree, NodeId};

/// One row of the flat projection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlatEntry {
    /// Node key.
    pub key: Key,
    /// Node depth.
    pub depth: usize,
    /// Node aggregate.
    pub value: f64,
}

/// Flatten `tree` depth-first, pre-order.
#[must_use]
pub fn flatten(tree: &HierarchyTree) -> Vec<FlatEntry> {
    let mut out = Vec::with_capacity(tree.len());
    for &root in tree.roots() {
        visit(tree, root, &mut out);
    }
    out
}

fn visit(tree: &HierarchyTree, id: NodeId, out: &mut Vec<FlatEntry>) {
    let node = tree.node(id);
    if !node.key.is_null() {
        out.push(FlatEntry {
            key: node.key.clone(),
            depth: node.depth,
            value: node.aggregate,
        });
    }
    for &child in &node.children {
        visit(tree, child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_hierarchy;
    use crate::rollup::KeyAccessor;

    type Fact = (&'static str, &'static str, f64);

    fn tree() -> HierarchyTree {
        let facts: Vec<Fact> = vec![
            ("fruit", "apple", 3.0),
            ("veg", "leek", 5.0),
            ("fruit", "pear", 4.0),
        ];
        let outer = |f: &Fact, _: usize| Key::from(f.0);
        let inner = |f: &Fact, _: usize| Key::from(f.1);
        let levels: [KeyAccessor<'_, Fact>; 2] = [&outer, &inner];
        build_hierarchy(&facts, |f: &Fact| f.2, &levels)
    }

    #[test]
    fn root_is_skipped_but_descended() {
        let flat = flatten(&tree());
        assert_eq!(flat.len(), 5);
        assert!(flat.iter().all(|e| !e.key.is_null()));
        assert_eq!(flat[0], FlatEntry { key: Key::from("fruit"), depth: 1, value: 7.0 });
    }

    #[test]
    fn order_is_preorder() {
        let labels: Vec<String> = flatten(&tree()).iter().map(|e| e.key.to_string()).collect();
        assert_eq!(labels, vec!["fruit", "pear", "apple", "veg", "leek"]);
    }

    #[test]
    fn empty_tree_flattens_to_nothing() {
        assert!(flatten(&HierarchyTree::empty()).is_empty());
    }
}
