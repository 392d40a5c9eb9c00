#![forbid(unsafe_code)]

//! Rollup aggregation and tree materialization for partition charts.
//!
//! This crate turns a flat relation into a sorted, depth-addressable
//! hierarchy:
//! - [`Key`] - grouping key produced by a level accessor
//! - [`Aggregator`] - identity + reducer pair ([`Sum`], [`Count`], [`Min`], [`Max`])
//! - [`rollup`] - single-pass multi-key aggregation into nested key tables
//! - [`materialize`] - nested tables to a sorted [`HierarchyTree`]
//! - [`HierarchyBuilder`] - filtering + rollup + materialization
//! - [`flatten`] - pre-order `(key, depth, value)` projection
//!
//! # Example
//! ```
//! use partita_core::{Key, KeyAccessor, build_hierarchy, flatten};
//!
//! struct Sale { region: &'static str, amount: f64 }
//!
//! let sales = [
//!     Sale { region: "north", amount: 3.0 },
//!     Sale { region: "south", amount: 5.0 },
//!     Sale { region: "north", amount: 4.0 },
//! ];
//! let region = |s: &Sale, _: usize| Key::from(s.region);
//! let levels: [KeyAccessor<'_, Sale>; 1] = [&region];
//!
//! let tree = build_hierarchy(&sales, |s: &Sale| s.amount, &levels);
//! let root = tree.roots()[0];
//! assert!(tree.node(root).key.is_null());
//! assert_eq!(tree.node(root).aggregate, 12.0);
//!
//! let flat = flatten(&tree);
//! assert_eq!(flat[0].key, Key::from("north"));
//! assert_eq!(flat[0].value, 7.0);
//! ```

pub mod aggregator;
pub mod builder;
pub mod flatten;
pub mod key;
pub mod rollup;
pub mod tree;

pub use aggregator::{Aggregator, Count, FnAggregator, Max, Min, Sum, custom};
pub use builder::{HierarchyBuilder, build_hierarchy, is_renderable_value};
pub use flatten::{FlatEntry, flatten};
pub use key::Key;
pub use rollup::{AggregationNode, ChildTable, KeyAccessor, Rollup, RollupId, rollup};
pub use tree::{
    ArrayNode, ChildOrder, HierarchyTree, NodeId, PathStep, materialize, materialize_with,
};
