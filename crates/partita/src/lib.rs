#![forbid(unsafe_code)]

//! Partita public facade crate.
//!
//! Re-exports the hierarchy engine and its derived views, and adds the
//! [`PartitionChart`] orchestrator that keeps a tree and its memoized
//! projections together.
//!
//! # Example
//! ```
//! use partita::prelude::*;
//!
//! struct Sale { region: &'static str, product: &'static str, amount: f64 }
//!
//! let sales = [
//!     Sale { region: "north", product: "tea", amount: 3.0 },
//!     Sale { region: "north", product: "coffee", amount: 1.0 },
//!     Sale { region: "south", product: "tea", amount: 2.0 },
//! ];
//! let region = |s: &Sale, _: usize| Key::from(s.region);
//! let product = |s: &Sale, _: usize| Key::from(s.product);
//! let levels: [KeyAccessor<'_, Sale>; 2] = [&region, &product];
//!
//! let mut chart = PartitionChart::new("sales", PartitionConfig::default())?;
//! chart.rebuild(&sales, |s: &Sale| s.amount, &levels);
//!
//! let legend = chart.legend();
//! assert_eq!(legend[0].label, "north");
//! assert_eq!(chart.screen_reader().rows[1].percentage, "75%");
//! # Ok::<(), partita::Error>(())
//! ```

use std::fmt;

pub mod chart;
pub mod config;

pub use chart::{PartitionChart, SharedValueFormatter};
pub use config::{ConfigError, ConfigParse, PartitionConfig};

// --- Core re-exports -------------------------------------------------------

pub use partita_core::{
    AggregationNode, Aggregator, ArrayNode, ChildOrder, ChildTable, Count, FlatEntry,
    FnAggregator, HierarchyBuilder, HierarchyTree, Key, KeyAccessor, Max, Min, NodeId, PathStep,
    Rollup, RollupId, Sum, build_hierarchy, custom, flatten, is_renderable_value, materialize,
    materialize_with, rollup,
};

// --- View re-exports -------------------------------------------------------

pub use partita_views::{
    AccessibilityRow, CacheStats, ExtraValue, HitTest, Layer, LayerValue, LegendConfig,
    LegendItem, LegendItemLabel, LegendPosition, LegendStrategy, NodeIdentity, Point,
    ProjectionCache, ProjectionKey, ScreenReaderSummary, SeriesIdentifier, ShapeNode, compare_tree_paths,
    describe, legend_extra_values, legend_items, legend_labels, match_by_key, match_by_pointer,
    match_identity, picked_layer_values, shape_nodes,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Invalid configuration.
    Config(ConfigError),
    /// Node id does not belong to the chart's current tree.
    UnknownNode(NodeId),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid config: {err}"),
            Self::UnknownNode(id) => write!(f, "unknown node #{}", id.index()),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::UnknownNode(_) => None,
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for partita APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        ChildOrder, Error, HierarchyTree, Key, KeyAccessor, Layer, LegendConfig, LegendItem,
        LegendPosition, PartitionChart, PartitionConfig, Result, ShapeNode,
    };
}
