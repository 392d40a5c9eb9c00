#![forbid(unsafe_code)]

//! Matching user interactions to shapes.
//!
//! Geometry stays outside this crate: pointer hit-testing goes through a
//! [`HitTest`] implementation supplied by the layout layer. Everything here
//! matches on the identity fields shapes share with the tree (key, depth,
//! value, path), so a match found in one branch is found in every branch.

use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use partita_core::{HierarchyTree, Key, PathStep};

use crate::shape::{NodeIdentity, ShapeNode};

/// Shapes whose key equals `key`, in any branch and at any depth.
#[must_use]
pub fn match_by_key<'a>(nodes: &'a [ShapeNode], key: &Key) -> Vec<&'a ShapeNode> {
    nodes.iter().filter(|n| &n.data_name == key).collect()
}

/// Shapes with exactly this `(key, depth, value)` identity.
#[must_use]
pub fn match_identity<'a>(nodes: &'a [ShapeNode], identity: &NodeIdentity) -> Vec<&'a ShapeNode> {
    nodes.iter().filter(|n| &n.identity() == identity).collect()
}

/// Pointer position in chart coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Geometric containment test provided by the layout layer.
pub trait HitTest {
    /// Whether `point` falls inside the drawn area of `shape`.
    fn contains(&self, shape: &ShapeNode, point: Point) -> bool;
}

impl<F> HitTest for F
where
    F: Fn(&ShapeNode, Point) -> bool,
{
    fn contains(&self, shape: &ShapeNode, point: Point) -> bool {
        self(shape, point)
    }
}

/// Shapes under `point`, in shape order.
#[must_use]
pub fn match_by_pointer<'a, H>(nodes: &'a [ShapeNode], point: Point, hit: &H) -> Vec<&'a ShapeNode>
where
    H: HitTest + ?Sized,
{
    nodes.iter().filter(|n| hit.contains(n, point)).collect()
}

/// Which shapes light up when a legend row is hovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LegendStrategy {
    /// Same key anywhere in the chart.
    Key,
    /// Same key on the same level.
    KeyInLayer,
    /// Only the hovered node.
    Node,
    /// The hovered node and everything below it.
    NodeWithDescendants,
    /// The hovered node and its ancestors.
    Path,
    /// Ancestors, the node and its descendants.
    #[default]
    PathWithDescendants,
}

fn same_ranks(a: &[PathStep], b: &[PathStep]) -> bool {
    a.len() == b.len() && is_prefix(a, b)
}

fn is_prefix(prefix: &[PathStep], path: &[PathStep]) -> bool {
    prefix.len() <= path.len() && prefix.iter().zip(path).all(|(p, q)| p.index == q.index)
}

impl LegendStrategy {
    /// Whether `shape` is highlighted when the row for `hovered` is hovered.
    #[must_use]
    pub fn matches(self, hovered: &ShapeNode, shape: &ShapeNode) -> bool {
        match self {
            Self::Key => shape.data_name == hovered.data_name,
            Self::KeyInLayer => {
                shape.data_name == hovered.data_name && shape.depth == hovered.depth
            }
            Self::Node => same_ranks(&hovered.path, &shape.path),
            Self::NodeWithDescendants => is_prefix(&hovered.path, &shape.path),
            Self::Path => is_prefix(&shape.path, &hovered.path),
            Self::PathWithDescendants => {
                is_prefix(&shape.path, &hovered.path) || is_prefix(&hovered.path, &shape.path)
            }
        }
    }

    /// Highlighted subset of `nodes`.
    #[must_use]
    pub fn highlighted_shapes<'a>(
        self,
        nodes: &'a [ShapeNode],
        hovered: &ShapeNode,
    ) -> Vec<&'a ShapeNode> {
        nodes.iter().filter(|n| self.matches(hovered, n)).collect()
    }
}

/// One level of a picked branch.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayerValue {
    /// Key at this level.
    pub group_by_rollup: Key,
    /// Aggregate at this level.
    pub value: f64,
    pub depth: usize,
    pub sort_index: usize,
    /// Path down to this level.
    pub path: Vec<PathStep>,
}

/// Branches under a pointer pick.
///
/// Only the deepest picked shapes are reported. Each yields its chain from
/// depth 1 down to itself, so consumers see which branch was hit and not
/// just which leaf. Shapes foreign to `tree` are skipped.
#[must_use]
pub fn picked_layer_values(tree: &HierarchyTree, picked: &[&ShapeNode]) -> Vec<Vec<LayerValue>> {
    let Some(deepest) = picked.iter().map(|s| s.depth).max() else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for shape in picked.iter().filter(|s| s.depth == deepest) {
        if tree.get(shape.node).is_none() {
            continue;
        }
        let chain = tree
            .ancestors(shape.node)
            .into_iter()
            .chain(std::iter::once(shape.node))
            .filter_map(|id| {
                let node = tree.node(id);
                (node.depth > 0).then(|| LayerValue {
                    group_by_rollup: node.key.clone(),
                    value: node.aggregate,
                    depth: node.depth,
                    sort_index: node.sort_index,
                    path: tree.path(id),
                })
            })
            .collect();
        out.push(chain);
    }
    out
}

/// Order shapes the way they are drawn: parents before children,
/// siblings by rank.
pub fn sort_by_path(nodes: &mut [&ShapeNode]) {
    nodes.sort_by(|a, b| crate::legend::compare_tree_paths(&a.path, &b.path));
}

/// Whether two shapes sit on the same branch (one is an ancestor of the other).
#[must_use]
pub fn same_branch(a: &ShapeNode, b: &ShapeNode) -> bool {
    match a.path.len().cmp(&b.path.len()) {
        Ordering::Greater => is_prefix(&b.path, &a.path),
        _ => is_prefix(&a.path, &b.path),
    }
}
