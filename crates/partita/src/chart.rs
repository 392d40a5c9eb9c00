#![forbid(unsafe_code)]

//! A partition chart: one hierarchy plus its memoized views.
//!
//! [`PartitionChart::rebuild`] replaces the tree wholesale; it is never
//! patched. Views are computed on first request and cached under the
//! chart id and the view's own settings, so asking again after an
//! unrelated state change is a cache hit. A rebuild that yields an equal
//! tree keeps the cached views; any other tree drops them. Changing layers
//! or the value formatter drops the cached views they affect.

use std::fmt;
use std::sync::Arc;

use tracing::debug_span;

use partita_core::{
    ArrayNode, FlatEntry, HierarchyBuilder, HierarchyTree, KeyAccessor, NodeId, flatten,
};
use partita_views::{
    CacheStats, ExtraValue, HitTest, Layer, LayerValue, LegendConfig, LegendItem, LegendItemLabel,
    LegendPosition, LegendStrategy, Point, ProjectionCache, ProjectionKey, ScreenReaderSummary,
    ShapeNode, legend_extra_values, legend_items, legend_labels, match_by_pointer,
    picked_layer_values, shape_nodes,
};
use rustc_hash::FxHashMap;

use crate::config::PartitionConfig;
use crate::{Error, Result};

/// Shared value formatter.
pub type SharedValueFormatter = Arc<dyn Fn(f64) -> String + Send + Sync>;

/// Legend settings as a cache key; `max_depth` by bit pattern.
type LegendKey = ProjectionKey<(bool, LegendPosition, Option<u64>)>;

/// Hierarchy, layer settings and cached views of one chart.
pub struct PartitionChart {
    id: String,
    config: PartitionConfig,
    layers: Vec<Layer>,
    value_formatter: Option<SharedValueFormatter>,
    tree: HierarchyTree,
    shapes: Vec<ShapeNode>,
    legend_cache: ProjectionCache<LegendKey, Vec<LegendItem>>,
    flat_cache: ProjectionCache<ProjectionKey<()>, Vec<FlatEntry>>,
    a11y_cache: ProjectionCache<ProjectionKey<()>, ScreenReaderSummary>,
}

impl fmt::Debug for PartitionChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartitionChart")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("layers", &self.layers.len())
            .field("nodes", &self.tree.len())
            .finish_non_exhaustive()
    }
}

impl PartitionChart {
    /// Empty chart; rejects configs that fail [`PartitionConfig::validate`].
    pub fn new(id: impl Into<String>, config: PartitionConfig) -> Result<Self> {
        if let Err(mut errors) = config.validate() {
            return Err(Error::Config(errors.remove(0)));
        }
        Ok(Self {
            id: id.into(),
            config,
            layers: Vec::new(),
            value_formatter: None,
            tree: HierarchyTree::empty(),
            shapes: Vec::new(),
            legend_cache: ProjectionCache::new(config.cache_capacity),
            flat_cache: ProjectionCache::new(config.cache_capacity),
            a11y_cache: ProjectionCache::new(config.cache_capacity),
        })
    }

    #[must_use]
    pub fn with_layers(mut self, layers: Vec<Layer>) -> Self {
        self.set_layers(layers);
        self
    }

    #[must_use]
    pub fn with_value_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(f64) -> String + Send + Sync + 'static,
    {
        self.set_value_formatter(Some(Arc::new(formatter)));
        self
    }

    /// Replace the layer configuration and re-derive shapes.
    pub fn set_layers(&mut self, layers: Vec<Layer>) {
        self.layers = layers;
        self.shapes = shape_nodes(&self.tree, &self.layers);
        self.legend_cache.clear();
        self.a11y_cache.clear();
    }

    pub fn set_value_formatter(&mut self, formatter: Option<SharedValueFormatter>) {
        self.value_formatter = formatter;
        self.a11y_cache.clear();
    }

    /// Swap the legend settings; cached legends for other settings stay.
    pub fn set_legend(&mut self, legend: LegendConfig) {
        self.config.legend = legend;
    }

    /// Rebuild the hierarchy from `facts`.
    ///
    /// Accessor panics propagate to the caller.
    pub fn rebuild<T, V>(
        &mut self,
        facts: &[T],
        value_accessor: V,
        key_accessors: &[KeyAccessor<'_, T>],
    ) where
        V: Fn(&T) -> f64,
    {
        let _span = debug_span!("chart_rebuild", chart = %self.id).entered();
        let tree = HierarchyBuilder::new()
            .child_order(self.config.child_order)
            .build(facts, value_accessor, key_accessors);
        if tree != self.tree {
            self.legend_cache.clear();
            self.flat_cache.clear();
            self.a11y_cache.clear();
        }
        self.tree = tree;
        self.shapes = shape_nodes(&self.tree, &self.layers);
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn config(&self) -> &PartitionConfig {
        &self.config
    }

    #[must_use]
    pub fn tree(&self) -> &HierarchyTree {
        &self.tree
    }

    /// Visible shapes in pre-order.
    #[must_use]
    pub fn shapes(&self) -> &[ShapeNode] {
        &self.shapes
    }

    /// Tree node by id, for ids that come from outside this chart.
    pub fn try_node(&self, id: NodeId) -> Result<&ArrayNode> {
        self.tree.get(id).ok_or(Error::UnknownNode(id))
    }

    /// Legend rows for the current legend settings.
    pub fn legend(&mut self) -> Arc<Vec<LegendItem>> {
        let legend = self.config.legend;
        let key = ProjectionKey::new(
            self.id.as_str(),
            (legend.flat_legend, legend.position, legend.max_depth.map(f64::to_bits)),
        );
        let (id, shapes, layers) = (&self.id, &self.shapes, &self.layers);
        self.legend_cache
            .get_or_compute_with(key, || legend_items(id, shapes, layers, &legend))
    }

    /// Pre-order `(key, depth, value)` rows.
    pub fn flat(&mut self) -> Arc<Vec<FlatEntry>> {
        let key = ProjectionKey::new(self.id.as_str(), ());
        let tree = &self.tree;
        self.flat_cache.get_or_compute_with(key, || flatten(tree))
    }

    /// Screen-reader summary using the chart's value formatter.
    pub fn screen_reader(&mut self) -> Arc<ScreenReaderSummary> {
        let key = ProjectionKey::new(self.id.as_str(), ());
        let (tree, shapes, layers) = (&self.tree, &self.shapes, &self.layers);
        let formatter = self
            .value_formatter
            .as_deref()
            .map(|f| f as &dyn Fn(f64) -> String);
        self.a11y_cache
            .get_or_compute_with(key, || ScreenReaderSummary::new(tree, shapes, layers, formatter))
    }

    /// Distinct labels up to the configured legend depth.
    #[must_use]
    pub fn legend_labels(&self) -> Vec<LegendItemLabel> {
        legend_labels(&self.tree, &self.layers, self.config.legend.max_depth)
    }

    /// Aggregates per legend path down to `max_depth`.
    #[must_use]
    pub fn legend_extra_values(&self, max_depth: usize) -> FxHashMap<String, ExtraValue> {
        let formatter = self.value_formatter.as_deref();
        legend_extra_values(
            &self.tree,
            formatter.map(|f| f as &dyn Fn(f64) -> String),
            max_depth,
        )
    }

    /// Shapes highlighted while `item` is hovered.
    #[must_use]
    pub fn highlighted(&self, item: &LegendItem, strategy: LegendStrategy) -> Vec<&ShapeNode> {
        match self.shapes.iter().find(|s| s.path == item.path) {
            Some(source) => strategy.highlighted_shapes(&self.shapes, source),
            None => Vec::new(),
        }
    }

    /// Branches under `point`, deepest shapes only.
    #[must_use]
    pub fn pick<H>(&self, point: Point, hit: &H) -> Vec<Vec<LayerValue>>
    where
        H: HitTest + ?Sized,
    {
        let picked = match_by_pointer(&self.shapes, point, hit);
        picked_layer_values(&self.tree, &picked)
    }

    /// Combined counters of every view cache.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        [
            self.legend_cache.stats(),
            self.flat_cache.stats(),
            self.a11y_cache.stats(),
        ]
        .into_iter()
        .fold(CacheStats::default(), |acc, s| CacheStats {
            hits: acc.hits + s.hits,
            misses: acc.misses + s.misses,
            size: acc.size + s.size,
            capacity: acc.capacity + s.capacity,
        })
    }
}
