#![forbid(unsafe_code)]

//! Screen-reader description of a partition chart.
//!
//! One row per visible shape, in shape order. Percentages are relative to
//! the parent node's aggregate; top-level shapes are measured against the
//! synthetic root, which holds the grand total.

use tracing::debug_span;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use partita_core::HierarchyTree;

use crate::format::{ValueFormatter, percentage_text, value_text};
use crate::layer::{Layer, format_label};
use crate::shape::ShapeNode;

/// Parent name reported for top-level shapes.
pub const NO_PARENT: &str = "none";

/// Textual description of one shape.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AccessibilityRow {
    pub label: String,
    pub parent_name: String,
    pub depth: usize,
    pub percentage: String,
    pub value: f64,
    pub value_text: String,
}

/// Describe every shape in `nodes`.
///
/// Shapes whose node id is foreign to `tree` read `"NaN%"` and `"none"`.
#[must_use]
pub fn describe(
    tree: &HierarchyTree,
    nodes: &[ShapeNode],
    layers: &[Layer],
    value_formatter: Option<ValueFormatter<'_>>,
) -> Vec<AccessibilityRow> {
    let _span = debug_span!("a11y_describe", rows = nodes.len()).entered();

    nodes
        .iter()
        .map(|shape| {
            let known = tree.get(shape.node).is_some();
            let parent = if known { tree.parent(shape.node) } else { None };
            let parent_name = match parent {
                Some(p) if shape.depth > 1 => format_label(layers, p.depth, &p.key),
                _ => NO_PARENT.to_owned(),
            };
            let parent_value = if known {
                tree.parent_aggregate(shape.node)
            } else {
                f64::NAN
            };
            AccessibilityRow {
                label: format_label(layers, shape.depth, &shape.data_name),
                parent_name,
                depth: shape.depth,
                percentage: percentage_text(shape.value, parent_value),
                value: shape.value,
                value_text: value_text(shape.value, value_formatter),
            }
        })
        .collect()
}

/// Everything a screen reader announces for one chart.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScreenReaderSummary {
    /// More than one caller level is present.
    pub has_multiple_layers: bool,
    pub rows: Vec<AccessibilityRow>,
}

impl ScreenReaderSummary {
    /// Summary of `tree` as drawn by `nodes`.
    #[must_use]
    pub fn new(
        tree: &HierarchyTree,
        nodes: &[ShapeNode],
        layers: &[Layer],
        value_formatter: Option<ValueFormatter<'_>>,
    ) -> Self {
        Self {
            has_multiple_layers: tree.max_depth() > 1,
            rows: describe(tree, nodes, layers, value_formatter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::shape_nodes;
    use partita_core::{Key, KeyAccessor, build_hierarchy};

    type Fact = (&'static str, &'static str, f64);

    fn tree() -> HierarchyTree {
        let facts: Vec<Fact> = vec![("A", "x", 2.0), ("A", "y", 1.0), ("B", "z", 1.0)];
        let outer = |f: &Fact, _: usize| Key::from(f.0);
        let inner = |f: &Fact, _: usize| Key::from(f.1);
        let levels: [KeyAccessor<'_, Fact>; 2] = [&outer, &inner];
        build_hierarchy(&facts, |f: &Fact| f.2, &levels)
    }

    #[test]
    fn rows_follow_shapes_with_parent_percentages() {
        let tree = tree();
        let shapes = shape_nodes(&tree, &[]);
        let rows = describe(&tree, &shapes, &[], None);
        let summary: Vec<(&str, &str, &str)> = rows
            .iter()
            .map(|r| (r.label.as_str(), r.parent_name.as_str(), r.percentage.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("A", "none", "75%"),
                ("x", "A", "67%"),
                ("y", "A", "33%"),
                ("B", "none", "25%"),
                ("z", "B", "100%"),
            ]
        );
        assert_eq!(rows[0].value_text, "3");
    }

    #[test]
    fn formatters_apply_to_labels_parents_and_values() {
        let tree = tree();
        let layers = vec![Layer::new().with_label(|k| format!("group {k}"))];
        let shapes = shape_nodes(&tree, &layers);
        let fmt = |v: f64| format!("{v} units");
        let rows = describe(&tree, &shapes, &layers, Some(&fmt));
        assert_eq!(rows[0].label, "group A");
        assert_eq!(rows[1].parent_name, "group A");
        assert_eq!(rows[1].value_text, "2 units");
    }

    #[test]
    fn foreign_shapes_read_nan() {
        let tree = tree();
        let shapes = shape_nodes(&tree, &[]);
        let rows = describe(&HierarchyTree::empty(), &shapes, &[], None);
        assert_eq!(rows[0].percentage, "NaN%");
        assert_eq!(rows[0].parent_name, NO_PARENT);
    }

    #[test]
    fn summary_reports_layering() {
        let tree = tree();
        let shapes = shape_nodes(&tree, &[]);
        let summary = ScreenReaderSummary::new(&tree, &shapes, &[], None);
        assert!(summary.has_multiple_layers);
        assert_eq!(summary.rows.len(), 5);
        assert!(ScreenReaderSummary::default().rows.is_empty());
    }
}
