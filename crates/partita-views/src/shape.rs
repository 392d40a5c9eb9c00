#![forbid(unsafe_code)]

//! Geometry-free shape nodes.
//!
//! A [`ShapeNode`] carries the identity fields a layout layer attaches to
//! each drawn sector or rectangle: key, depth, value, rank, path and fill.
//! Legend, screen-reader and interaction projections read only these
//! fields, so layouts that compute pixels elsewhere can hand their nodes
//! straight to them.

use std::hash::{Hash, Hasher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use partita_core::{HierarchyTree, Key, NodeId, PathStep};

use crate::layer::{DEFAULT_FILL, Layer, layer_for_depth};

/// A drawable node of the hierarchy.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShapeNode {
    /// Tree node this shape renders.
    pub node: NodeId,
    /// Grouping key.
    pub data_name: Key,
    /// Tree depth (1 for the first caller level).
    pub depth: usize,
    /// Aggregate value.
    pub value: f64,
    /// Rank among siblings.
    pub sort_index: usize,
    /// Path from the top level to this node, inclusive.
    pub path: Vec<PathStep>,
    /// Resolved fill colour.
    pub fill_color: String,
}

impl ShapeNode {
    /// Shape for tree node `id` with an explicit fill.
    #[must_use]
    pub fn from_tree(tree: &HierarchyTree, id: NodeId, fill_color: impl Into<String>) -> Self {
        let node = tree.node(id);
        Self {
            node: id,
            data_name: node.key.clone(),
            depth: node.depth,
            value: node.aggregate,
            sort_index: node.sort_index,
            path: tree.path(id),
            fill_color: fill_color.into(),
        }
    }

    /// Composite identity used to match shapes across views.
    #[must_use]
    pub fn identity(&self) -> NodeIdentity {
        NodeIdentity::new(self.data_name.clone(), self.depth, self.value)
    }

    /// Sort indices along the path.
    pub fn path_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.path.iter().map(|step| step.index)
    }
}

/// `(key, depth, value)` identity with structural equality.
///
/// Values compare by bit pattern, so a shape matches only the node with the
/// exact same aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    /// Grouping key.
    pub data_name: Key,
    /// Tree depth.
    pub depth: usize,
    value_bits: u64,
}

impl NodeIdentity {
    /// Build an identity.
    #[must_use]
    pub fn new(data_name: Key, depth: usize, value: f64) -> Self {
        Self {
            data_name,
            depth,
            value_bits: value.to_bits(),
        }
    }

    /// Aggregate value.
    #[must_use]
    pub fn value(&self) -> f64 {
        f64::from_bits(self.value_bits)
    }
}

impl Hash for NodeIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data_name.hash(state);
        self.depth.hash(state);
        self.value_bits.hash(state);
    }
}

/// Shapes for every visible node, pre-order, synthetic root excluded.
///
/// A node is hidden when its layer's show predicate rejects its key; its
/// descendants are judged on their own layers.
#[must_use]
pub fn shape_nodes(tree: &HierarchyTree, layers: &[Layer]) -> Vec<ShapeNode> {
    tree.preorder()
        .into_iter()
        .filter_map(|id| {
            let node = tree.node(id);
            if node.depth == 0 {
                return None;
            }
            let layer = layer_for_depth(layers, node.depth);
            if !layer.is_none_or(|l| l.is_shown(&node.key)) {
                return None;
            }
            let fill = layer.map_or_else(|| DEFAULT_FILL.to_owned(), |l| l.fill_for(node));
            Some(ShapeNode::from_tree(tree, id, fill))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use partita_core::{KeyAccessor, build_hierarchy};

    type Fact = (&'static str, &'static str, f64);

    fn tree() -> HierarchyTree {
        let facts: Vec<Fact> = vec![("A", "x", 3.0), ("A", "y", 1.0), ("B", "x", 2.0)];
        let outer = |f: &Fact, _: usize| Key::from(f.0);
        let inner = |f: &Fact, _: usize| Key::from(f.1);
        let levels: [KeyAccessor<'_, Fact>; 2] = [&outer, &inner];
        build_hierarchy(&facts, |f: &Fact| f.2, &levels)
    }

    #[test]
    fn root_is_not_a_shape() {
        let shapes = shape_nodes(&tree(), &[]);
        assert_eq!(shapes.len(), 5);
        assert!(shapes.iter().all(|s| s.depth >= 1));
        assert!(shapes.iter().all(|s| s.fill_color == DEFAULT_FILL));
    }

    #[test]
    fn shapes_carry_paths_with_root_step() {
        let shapes = shape_nodes(&tree(), &[]);
        let y = shapes
            .iter()
            .find(|s| s.data_name == Key::from("y"))
            .expect("y shape");
        let indices: Vec<usize> = y.path_indices().collect();
        assert_eq!(indices, vec![0, 0, 1]);
        assert_eq!(y.path[1].value, Key::from("A"));
    }

    #[test]
    fn hidden_keys_are_dropped_per_layer() {
        let layers = vec![
            Layer::new().with_show(|k| k.as_str() != Some("B")).with_fill("red"),
            Layer::new().with_fill("blue"),
        ];
        let shapes = shape_nodes(&tree(), &layers);
        let names: Vec<String> = shapes.iter().map(|s| s.data_name.to_string()).collect();
        assert_eq!(names, vec!["A", "x", "y", "x"]);
        assert_eq!(shapes[0].fill_color, "red");
        assert_eq!(shapes[1].fill_color, "blue");
    }

    #[test]
    fn identity_is_structural() {
        let shapes = shape_nodes(&tree(), &[]);
        let again = shape_nodes(&tree(), &[]);
        assert_eq!(shapes[0].identity(), again[0].identity());
        assert_ne!(shapes[0].identity(), shapes[1].identity());
        assert_eq!(shapes[0].identity().value(), 4.0);
    }
}
