#![forbid(unsafe_code)]

//! Per-level presentation settings.
//!
//! `layers[i]` configures hierarchy depth `i + 1`; the synthetic root level
//! has no layer. Every setting is optional and falls back to the raw key,
//! "always shown", and [`DEFAULT_FILL`].

use std::fmt;
use std::sync::Arc;

use partita_core::{ArrayNode, Key};

/// Fill used when a layer does not configure one.
pub const DEFAULT_FILL: &str = "rgba(128,0,0,0.5)";

/// Key to display label.
pub type LabelFormatter = Arc<dyn Fn(&Key) -> String + Send + Sync>;

/// Key to visibility.
pub type ShowPredicate = Arc<dyn Fn(&Key) -> bool + Send + Sync>;

/// Node to fill colour.
pub type FillFn = Arc<dyn Fn(&ArrayNode) -> String + Send + Sync>;

/// Fill colour of a layer.
#[derive(Clone)]
pub enum FillColor {
    /// Same colour for every node of the layer.
    Static(String),
    /// Colour computed from the node (key, value, `sort_index`).
    Computed(FillFn),
}

impl fmt::Debug for FillColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(c) => f.debug_tuple("Static").field(c).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Settings for one hierarchy level.
#[derive(Clone, Default)]
pub struct Layer {
    label_formatter: Option<LabelFormatter>,
    show: Option<ShowPredicate>,
    fill: Option<FillColor>,
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("label_formatter", &self.label_formatter.is_some())
            .field("show", &self.show.is_some())
            .field("fill", &self.fill)
            .finish()
    }
}

impl Layer {
    /// Layer with every setting defaulted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the label formatter.
    #[must_use]
    pub fn with_label<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&Key) -> String + Send + Sync + 'static,
    {
        self.label_formatter = Some(Arc::new(formatter));
        self
    }

    /// Set the visibility predicate.
    #[must_use]
    pub fn with_show<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Key) -> bool + Send + Sync + 'static,
    {
        self.show = Some(Arc::new(predicate));
        self
    }

    /// Use one fill colour for the whole layer.
    #[must_use]
    pub fn with_fill(mut self, color: impl Into<String>) -> Self {
        self.fill = Some(FillColor::Static(color.into()));
        self
    }

    /// Compute the fill colour per node.
    #[must_use]
    pub fn with_fill_fn<F>(mut self, fill: F) -> Self
    where
        F: Fn(&ArrayNode) -> String + Send + Sync + 'static,
    {
        self.fill = Some(FillColor::Computed(Arc::new(fill)));
        self
    }

    /// Display label for `key`.
    #[must_use]
    pub fn format_label(&self, key: &Key) -> String {
        match &self.label_formatter {
            Some(f) => f(key),
            None => key.to_string(),
        }
    }

    /// Whether nodes keyed `key` are shown.
    #[must_use]
    pub fn is_shown(&self, key: &Key) -> bool {
        self.show.as_ref().is_none_or(|f| f(key))
    }

    /// Fill colour for `node`.
    #[must_use]
    pub fn fill_for(&self, node: &ArrayNode) -> String {
        match &self.fill {
            Some(FillColor::Static(c)) => c.clone(),
            Some(FillColor::Computed(f)) => f(node),
            None => DEFAULT_FILL.to_owned(),
        }
    }
}

/// Layer configuring nodes at `depth`.
#[must_use]
pub fn layer_for_depth(layers: &[Layer], depth: usize) -> Option<&Layer> {
    depth.checked_sub(1).and_then(|i| layers.get(i))
}

/// Label of `key` at `depth`, raw key text when no layer formats it.
#[must_use]
pub fn format_label(layers: &[Layer], depth: usize, key: &Key) -> String {
    layer_for_depth(layers, depth).map_or_else(|| key.to_string(), |l| l.format_label(key))
}
