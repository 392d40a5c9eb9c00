#![forbid(unsafe_code)]

//! Materialized, sorted hierarchy.
//!
//! [`materialize`] turns a [`Rollup`] into a [`HierarchyTree`]: an arena of
//! [`ArrayNode`]s where every sibling list is sorted by the configured
//! comparator and each node records its 0-based post-sort position as
//! `sort_index`. Parent links are arena indices, so the tree stays a plain
//! acyclic value that can be cloned, compared and serialized.
//!
//! Top-level entries have no parent node. Their parent aggregate reads as
//! `NaN` through [`HierarchyTree::parent_aggregate`], the same value an
//! anchor node above the top level would carry.
//!
//! # Invariants
//!
//! 1. `children[i]` has `sort_index == i`.
//! 2. A child's depth is its parent's depth plus one.
//! 3. Sibling order is a stable sort: ties keep first-insertion order.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::key::Key;
use crate::rollup::{ChildTable, Rollup};

/// Index of an [`ArrayNode`] inside a [`HierarchyTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeId(usize);

impl NodeId {
    /// Arena slot.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// One step of a node's path: its sibling rank and key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PathStep {
    /// `sort_index` of the node at this step.
    pub index: usize,
    /// Key of the node at this step.
    pub value: Key,
}

/// A materialized tree node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArrayNode {
    /// Grouping key.
    pub key: Key,
    /// Aggregate value.
    pub aggregate: f64,
    /// Level; the synthetic root level is 0.
    pub depth: usize,
    /// Position among siblings after sorting.
    pub sort_index: usize,
    /// Sorted children.
    pub children: Vec<NodeId>,
    /// Parent node; `None` on the top level.
    pub parent: Option<NodeId>,
}

/// Sibling ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChildOrder {
    /// Largest aggregate first.
    #[default]
    Descending,
    /// Smallest aggregate first.
    Ascending,
}

impl ChildOrder {
    /// Compare two siblings.
    #[must_use]
    pub fn compare(self, a: &ArrayNode, b: &ArrayNode) -> Ordering {
        match self {
            Self::Descending => b.aggregate.total_cmp(&a.aggregate),
            Self::Ascending => a.aggregate.total_cmp(&b.aggregate),
        }
    }

    /// Parse `descending` / `ascending` (case-insensitive).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "descending" | "desc" => Some(Self::Descending),
            "ascending" | "asc" => Some(Self::Ascending),
            _ => None,
        }
    }
}

/// Sorted hierarchy in arena form.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HierarchyTree {
    nodes: Vec<ArrayNode>,
    roots: Vec<NodeId>,
}

impl HierarchyTree {
    /// An empty tree.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether there is nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Sorted top-level entries.
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Node by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &ArrayNode {
        &self.nodes[id.0]
    }

    /// Node by id, `None` if `id` does not belong to this tree.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&ArrayNode> {
        self.nodes.get(id.0)
    }

    /// Sorted children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Parent node; `None` on the top level.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<&ArrayNode> {
        self.nodes[id.0].parent.map(|p| &self.nodes[p.0])
    }

    /// Aggregate of the parent node, `NaN` on the top level.
    #[must_use]
    pub fn parent_aggregate(&self, id: NodeId) -> f64 {
        self.parent(id).map_or(f64::NAN, |p| p.aggregate)
    }

    /// Steps from the top-level entry down to `id`, inclusive.
    #[must_use]
    pub fn path(&self, id: NodeId) -> Vec<PathStep> {
        let mut steps = Vec::with_capacity(self.nodes[id.0].depth + 1);
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = &self.nodes[current.0];
            steps.push(PathStep {
                index: node.sort_index,
                value: node.key.clone(),
            });
            cursor = node.parent;
        }
        steps.reverse();
        steps
    }

    /// Ancestors of `id` from the top level down, excluding `id`.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.nodes[id.0].parent;
        while let Some(current) = cursor {
            out.push(current);
            cursor = self.nodes[current.0].parent;
        }
        out.reverse();
        out
    }

    /// Deepest level present; 0 for an empty tree.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Sum of the top-level aggregates.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.roots.iter().map(|&r| self.nodes[r.0].aggregate).sum()
    }

    /// Node ids in depth-first pre-order, following sorted sibling order.
    #[must_use]
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        out
    }

    /// Structural hash over keys, depths, aggregates and order.
    ///
    /// Equal trees hash equal; suitable as a memoization key.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        for id in self.preorder() {
            let node = &self.nodes[id.0];
            node.key.hash(&mut hasher);
            node.depth.hash(&mut hasher);
            node.sort_index.hash(&mut hasher);
            node.aggregate.to_bits().hash(&mut hasher);
            node.children.len().hash(&mut hasher);
        }
        hasher.finish()
    }
}

/// Materialize a rollup with one of the built-in orders.
#[must_use]
pub fn materialize(rollup: &Rollup, order: ChildOrder) -> HierarchyTree {
    materialize_with(rollup, |a, b| order.compare(a, b))
}

/// Materialize a rollup with a caller-supplied sibling comparator.
///
/// The sort is stable: siblings the comparator deems equal keep the order
/// in which their keys were first seen.
pub fn materialize_with<C>(rollup: &Rollup, comparator: C) -> HierarchyTree
where
    C: Fn(&ArrayNode, &ArrayNode) -> Ordering,
{
    let mut tree = HierarchyTree {
        nodes: Vec::with_capacity(rollup.len()),
        roots: Vec::new(),
    };
    tree.roots = materialize_level(rollup, rollup.roots(), None, &mut tree, &comparator);
    tree
}

fn materialize_level<C>(
    rollup: &Rollup,
    table: &ChildTable,
    parent: Option<NodeId>,
    tree: &mut HierarchyTree,
    comparator: &C,
) -> Vec<NodeId>
where
    C: Fn(&ArrayNode, &ArrayNode) -> Ordering,
{
    let mut siblings = Vec::with_capacity(table.len());
    for source_id in table.iter() {
        let source = rollup.node(source_id);
        let id = NodeId(tree.nodes.len());
        tree.nodes.push(ArrayNode {
            key: source.key.clone(),
            aggregate: source.aggregate,
            depth: source.depth,
            sort_index: 0,
            children: Vec::new(),
            parent,
        });
        if let Some(children) = &source.children {
            let sorted = materialize_level(rollup, children, Some(id), tree, comparator);
            tree.nodes[id.0].children = sorted;
        }
        siblings.push(id);
    }

    // slice::sort_by is stable.
    siblings.sort_by(|a, b| comparator(&tree.nodes[a.0], &tree.nodes[b.0]));
    for (i, id) in siblings.iter().enumerate() {
        tree.nodes[id.0].sort_index = i;
    }
    siblings
}
