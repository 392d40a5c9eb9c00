#![forbid(unsafe_code)]

//! Derived views over a partition hierarchy.
//!
//! Everything here reads a [`partita_core::HierarchyTree`] or the
//! [`ShapeNode`]s drawn from it and produces plain read models:
//! - [`Layer`] - per-level label formatter, visibility and fill
//! - [`shape_nodes`] - geometry-free drawable nodes with paths and fills
//! - [`legend_items`], [`legend_labels`], [`legend_extra_values`] - legend rows
//! - [`describe`] / [`ScreenReaderSummary`] - screen-reader text
//! - [`match_by_key`], [`match_by_pointer`], [`LegendStrategy`] - interaction matching
//! - [`ProjectionCache`] - LRU memoization for rebuilt views
//!
//! All views agree on node identity: the same `(key, depth, value, path)`
//! fields flow from the tree into every projection.

pub mod a11y;
pub mod cache;
pub mod format;
pub mod interaction;
pub mod layer;
pub mod legend;
pub mod shape;

pub use a11y::{AccessibilityRow, NO_PARENT, ScreenReaderSummary, describe};
pub use cache::{CacheStats, DEFAULT_CACHE_CAPACITY, ProjectionCache, ProjectionKey};
pub use format::{ValueFormatter, default_value_text, percentage_text, round_half_up, value_text};
pub use interaction::{
    HitTest, LayerValue, LegendStrategy, Point, match_by_key, match_by_pointer, match_identity,
    picked_layer_values, same_branch, sort_by_path,
};
pub use layer::{
    DEFAULT_FILL, FillColor, FillFn, LabelFormatter, Layer, ShowPredicate, format_label,
    layer_for_depth,
};
pub use legend::{
    ExtraValue, LegendConfig, LegendItem, LegendItemLabel, LegendPosition, SeriesIdentifier,
    compare_tree_paths, legend_extra_values, legend_items, legend_labels, path_key,
};
pub use shape::{NodeIdentity, ShapeNode, shape_nodes};
