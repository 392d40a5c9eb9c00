#![forbid(unsafe_code)]

//! Legend projection.
//!
//! Two sources feed legends:
//!
//! - [`legend_items`] reads shape nodes and so knows fill colours. It either
//!   limits rows by depth (no de-duplication), lists every node
//!   hierarchically, or collapses to a flat list that keeps the first row per
//!   `(key, fill)` pair. Rows are then ordered by [`compare_tree_paths`],
//!   which reproduces the chart's left-to-right, depth-first order.
//! - [`legend_labels`] reads the tree directly and yields one row per
//!   distinct formatted label with the deepest depth it occurs at.
//!
//! [`legend_extra_values`] maps each legend path to its aggregate so a legend
//! can print values next to labels.

use std::cmp::Ordering;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug_span, trace};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use partita_core::{HierarchyTree, Key, NodeId, PathStep};

use crate::format::{ValueFormatter, value_text};
use crate::layer::{Layer, format_label};
use crate::shape::ShapeNode;

/// Where the legend sits relative to the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LegendPosition {
    /// Above the chart.
    Top,
    /// Below the chart.
    Bottom,
    /// Left of the chart.
    Left,
    /// Right of the chart.
    #[default]
    Right,
}

impl LegendPosition {
    /// Parse `top|bottom|left|right` (case-insensitive).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    /// Top and bottom legends lay rows out horizontally.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }
}

/// Legend presentation settings.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LegendConfig {
    /// Collapse the legend to one de-duplicated level.
    pub flat_legend: bool,
    /// Legend placement.
    pub position: LegendPosition,
    /// Keep only rows at tree depth `<= max_depth`. `NaN` keeps nothing.
    #[cfg_attr(feature = "serde", serde(default, with = "max_depth_serde"))]
    pub max_depth: Option<f64>,
}

/// `max_depth` as a JSON number, or `"NaN"` / `"Infinity"` / `"-Infinity"`
/// for values JSON numbers cannot carry. `null` stays "no limit".
#[cfg(feature = "serde")]
mod max_depth_serde {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Depth {
        Num(f64),
        Text(String),
    }

    pub fn serialize<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let depth = value.map(|d| {
            if d.is_nan() {
                Depth::Text("NaN".to_owned())
            } else if d == f64::INFINITY {
                Depth::Text("Infinity".to_owned())
            } else if d == f64::NEG_INFINITY {
                Depth::Text("-Infinity".to_owned())
            } else {
                Depth::Num(d)
            }
        });
        depth.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Depth>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Depth::Num(d)) => Ok(Some(d)),
            Some(Depth::Text(text)) => match text.as_str() {
                "NaN" => Ok(Some(f64::NAN)),
                "Infinity" => Ok(Some(f64::INFINITY)),
                "-Infinity" => Ok(Some(f64::NEG_INFINITY)),
                other => Err(D::Error::custom(format!("invalid legend max_depth {other:?}"))),
            },
        }
    }
}

impl LegendConfig {
    /// Set the flat flag.
    #[must_use]
    pub fn with_flat_legend(mut self, flat: bool) -> Self {
        self.flat_legend = flat;
        self
    }

    /// Set the position.
    #[must_use]
    pub fn with_position(mut self, position: LegendPosition) -> Self {
        self.position = position;
        self
    }

    /// Set the depth limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<f64>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Flat mode is forced by the flag or by a horizontal position.
    #[must_use]
    pub fn force_flat(&self) -> bool {
        self.flat_legend || self.position.is_horizontal()
    }
}

/// Series a legend row stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SeriesIdentifier {
    /// Grouping key.
    pub key: Key,
    /// Chart the row belongs to.
    pub spec_id: String,
}

/// One legend row.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LegendItem {
    /// Swatch colour.
    pub color: String,
    /// Formatted label.
    pub label: String,
    /// Raw grouping key.
    pub child_id: Key,
    /// Indentation level: tree depth minus one, or 0 in flat mode.
    pub depth: usize,
    /// Path of the source shape.
    pub path: Vec<PathStep>,
    /// Series this row represents.
    pub series_identifiers: Vec<SeriesIdentifier>,
}

impl LegendItem {
    /// Path rendered as sort indices joined by `__`.
    #[must_use]
    pub fn path_key(&self) -> String {
        path_key(&self.path)
    }
}

/// Label-only legend row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LegendItemLabel {
    /// Formatted label.
    pub label: String,
    /// Deepest tree depth the label occurs at.
    pub depth: usize,
}

/// Aggregate shown next to a legend row.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtraValue {
    /// Raw aggregate.
    pub raw: f64,
    /// Formatted aggregate.
    pub formatted: String,
}

/// Order two paths by sort index, element-wise; a prefix sorts first.
#[must_use]
pub fn compare_tree_paths(a: &[PathStep], b: &[PathStep]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.index.cmp(&y.index))
        .find(|o| o.is_ne())
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

/// Sort indices joined by `__`.
#[must_use]
pub fn path_key(path: &[PathStep]) -> String {
    path.iter()
        .map(|step| step.index.to_string())
        .collect::<Vec<_>>()
        .join("__")
}

fn within_depth(depth: usize, max_depth: f64) -> bool {
    depth as f64 <= max_depth
}

/// Legend rows derived from shape nodes.
#[must_use]
pub fn legend_items(
    spec_id: &str,
    nodes: &[ShapeNode],
    layers: &[Layer],
    config: &LegendConfig,
) -> Vec<LegendItem> {
    let force_flat = config.force_flat();
    let _span = debug_span!(
        "legend_items",
        shapes = nodes.len(),
        flat = force_flat,
        limited = config.max_depth.is_some()
    )
    .entered();

    let mut seen: FxHashSet<(&Key, &str)> = FxHashSet::default();
    let mut rows: Vec<&ShapeNode> = nodes
        .iter()
        .filter(|n| match config.max_depth {
            Some(max) => within_depth(n.depth, max),
            None if !force_flat => true,
            None => {
                let first = seen.insert((&n.data_name, n.fill_color.as_str()));
                if !first {
                    trace!(key = %n.data_name, fill = %n.fill_color, "dropped duplicate legend row");
                }
                first
            }
        })
        .collect();
    rows.sort_by(|a, b| compare_tree_paths(&a.path, &b.path));

    rows.into_iter()
        .map(|n| LegendItem {
            color: n.fill_color.clone(),
            label: format_label(layers, n.depth, &n.data_name),
            child_id: n.data_name.clone(),
            depth: if force_flat { 0 } else { n.depth.saturating_sub(1) },
            path: n.path.clone(),
            series_identifiers: vec![SeriesIdentifier {
                key: n.data_name.clone(),
                spec_id: spec_id.to_owned(),
            }],
        })
        .collect()
}

/// Distinct formatted labels straight from the tree.
///
/// Rows keep first-seen pre-order order; each reports the deepest depth its
/// label occurs at. Root and empty labels are skipped.
#[must_use]
pub fn legend_labels(
    tree: &HierarchyTree,
    layers: &[Layer],
    max_depth: Option<f64>,
) -> Vec<LegendItemLabel> {
    let mut order: Vec<LegendItemLabel> = Vec::new();
    let mut index: FxHashMap<String, usize> = FxHashMap::default();

    for id in tree.preorder() {
        let node = tree.node(id);
        if node.key.is_null() {
            continue;
        }
        let label = format_label(layers, node.depth, &node.key);
        if label.is_empty() {
            continue;
        }
        match index.get(&label) {
            Some(&i) => order[i].depth = order[i].depth.max(node.depth),
            None => {
                index.insert(label.clone(), order.len());
                order.push(LegendItemLabel {
                    label,
                    depth: node.depth,
                });
            }
        }
    }

    match max_depth {
        Some(max) => order
            .into_iter()
            .filter(|l| within_depth(l.depth, max))
            .collect(),
        None => order,
    }
}

/// Aggregates keyed by [`path_key`] for nodes at depth `<= max_depth`.
#[must_use]
pub fn legend_extra_values(
    tree: &HierarchyTree,
    value_formatter: Option<ValueFormatter<'_>>,
    max_depth: usize,
) -> FxHashMap<String, ExtraValue> {
    let mut out = FxHashMap::default();
    for &root in tree.roots() {
        collect_extra(tree, root, value_formatter, max_depth, &mut out);
    }
    out
}

fn collect_extra(
    tree: &HierarchyTree,
    id: NodeId,
    value_formatter: Option<ValueFormatter<'_>>,
    max_depth: usize,
    out: &mut FxHashMap<String, ExtraValue>,
) {
    let node = tree.node(id);
    if !node.key.is_null() {
        out.insert(
            path_key(&tree.path(id)),
            ExtraValue {
                raw: node.aggregate,
                formatted: value_text(node.aggregate, value_formatter),
            },
        );
    }
    if node.depth < max_depth {
        for &child in &node.children {
            collect_extra(tree, child, value_formatter, max_depth, out);
        }
    }
}
