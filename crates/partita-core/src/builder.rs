#![forbid(unsafe_code)]

//! Facts to sorted hierarchy.
//!
//! [`HierarchyBuilder::build`] drops facts whose value is non-finite or not
//! positive, returns an empty tree when the remaining grand total is not
//! positive, and otherwise rolls the facts up under a synthetic `Null` level
//! so that the caller's first level lands at depth 1.
//!
//! Building is a pure function of its inputs: the same facts and accessors
//! always produce an equal tree.

use tracing::{debug, debug_span, trace};

use crate::aggregator::{Aggregator, Sum};
use crate::key::Key;
use crate::rollup::{KeyAccessor, rollup};
use crate::tree::{ChildOrder, HierarchyTree, materialize};

/// Whether a fact value may contribute to the hierarchy.
#[inline]
#[must_use]
pub fn is_renderable_value(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Configurable hierarchy builder.
#[derive(Debug, Clone, Copy, Default)]
pub struct HierarchyBuilder<A = Sum> {
    aggregator: A,
    order: ChildOrder,
}

impl HierarchyBuilder<Sum> {
    /// Sum aggregation, descending sibling order.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<A: Aggregator> HierarchyBuilder<A> {
    /// Replace the node aggregator.
    ///
    /// The empty-tree check always uses the summed grand total.
    #[must_use]
    pub fn aggregator<B: Aggregator>(self, aggregator: B) -> HierarchyBuilder<B> {
        HierarchyBuilder {
            aggregator,
            order: self.order,
        }
    }

    /// Set the sibling order.
    #[must_use]
    pub fn child_order(mut self, order: ChildOrder) -> Self {
        self.order = order;
        self
    }

    /// Current sibling order.
    #[must_use]
    pub fn order(&self) -> ChildOrder {
        self.order
    }

    /// Build the hierarchy.
    ///
    /// Accessor panics propagate to the caller.
    pub fn build<T, V>(
        &self,
        facts: &[T],
        value_accessor: V,
        key_accessors: &[KeyAccessor<'_, T>],
    ) -> HierarchyTree
    where
        V: Fn(&T) -> f64,
    {
        let _span = debug_span!(
            "hierarchy_build",
            facts = facts.len(),
            levels = key_accessors.len()
        )
        .entered();

        let kept: Vec<&T> = facts
            .iter()
            .filter(|fact| is_renderable_value(value_accessor(*fact)))
            .collect();
        if kept.len() < facts.len() {
            trace!(dropped = facts.len() - kept.len(), "dropped non-renderable facts");
        }

        let total = Sum.fold(kept.iter().map(|fact| value_accessor(*fact)));
        if !(total > 0.0) {
            debug!(total, "grand total not positive, empty hierarchy");
            return HierarchyTree::empty();
        }

        let root_level = |_: &T, _: usize| Key::Null;
        let mut levels: Vec<KeyAccessor<'_, T>> = Vec::with_capacity(key_accessors.len() + 1);
        levels.push(&root_level);
        levels.extend_from_slice(key_accessors);

        let rolled = rollup(&levels, &value_accessor, &self.aggregator, kept.iter().copied());
        let tree = materialize(&rolled, self.order);
        debug!(nodes = tree.len(), total, "hierarchy built");
        tree
    }
}

/// Build with sum aggregation and descending order.
pub fn build_hierarchy<T, V>(
    facts: &[T],
    value_accessor: V,
    key_accessors: &[KeyAccessor<'_, T>],
) -> HierarchyTree
where
    V: Fn(&T) -> f64,
{
    HierarchyBuilder::new().build(facts, value_accessor, key_accessors)
}
