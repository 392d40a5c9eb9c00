#![forbid(unsafe_code)]

//! Multi-key streaming aggregation.
//!
//! [`rollup`] makes a single pass over the facts. For each fact it walks the
//! key accessors in order, descending one level of the nested key table per
//! accessor and folding the fact's value into every node on the way. Nodes
//! live in an arena and each non-leaf node owns a [`ChildTable`] mapping
//! keys to arena indices, kept in first-insertion order.
//!
//! Cost is O(facts × levels).

use rustc_hash::FxHashMap;

use crate::aggregator::Aggregator;
use crate::key::Key;

/// A level key accessor: `(fact, index) -> key`.
///
/// `index` is the fact's position in the sequence being aggregated.
pub type KeyAccessor<'a, T> = &'a dyn Fn(&T, usize) -> Key;

/// Index of an [`AggregationNode`] inside a [`Rollup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RollupId(usize);

impl RollupId {
    /// Arena slot.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Key to node table, iterated in first-insertion order.
#[derive(Debug, Clone, Default)]
pub struct ChildTable {
    lookup: FxHashMap<Key, RollupId>,
    order: Vec<RollupId>,
}

impl ChildTable {
    /// Node stored under `key`.
    #[must_use]
    pub fn get(&self, key: &Key) -> Option<RollupId> {
        self.lookup.get(key).copied()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the table holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entry ids in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = RollupId> + '_ {
        self.order.iter().copied()
    }

    fn insert(&mut self, key: Key, id: RollupId) {
        self.lookup.insert(key, id);
        self.order.push(id);
    }
}

/// Intermediate node of the keyed form.
#[derive(Debug, Clone)]
pub struct AggregationNode {
    /// Key this node is stored under in its parent table.
    pub key: Key,
    /// Aggregate of every fact routed through this node.
    pub aggregate: f64,
    /// Level index (position of the accessor that produced `key`).
    pub depth: usize,
    /// Child table; `None` on the deepest level.
    pub children: Option<ChildTable>,
}

/// Result of a rollup: node arena plus the top-level table.
#[derive(Debug, Clone, Default)]
pub struct Rollup {
    nodes: Vec<AggregationNode>,
    roots: ChildTable,
}

impl Rollup {
    /// Top-level key table.
    #[must_use]
    pub fn roots(&self) -> &ChildTable {
        &self.roots
    }

    /// Node by id.
    #[must_use]
    pub fn node(&self, id: RollupId) -> &AggregationNode {
        &self.nodes[id.0]
    }

    /// Total number of nodes across all levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether nothing was aggregated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by its key path from the top level.
    #[must_use]
    pub fn lookup(&self, keys: &[Key]) -> Option<&AggregationNode> {
        let (first, rest) = keys.split_first()?;
        let mut id = self.roots.get(first)?;
        for key in rest {
            id = self.nodes[id.0].children.as_ref()?.get(key)?;
        }
        Some(&self.nodes[id.0])
    }

    fn table(&self, parent: Option<RollupId>) -> Option<&ChildTable> {
        match parent {
            None => Some(&self.roots),
            Some(id) => self.nodes[id.0].children.as_ref(),
        }
    }

    fn table_mut(&mut self, parent: Option<RollupId>) -> &mut ChildTable {
        match parent {
            None => &mut self.roots,
            Some(id) => self.nodes[id.0]
                .children
                .get_or_insert_with(ChildTable::default),
        }
    }
}

/// Group `facts` by the ordered `key_accessors` and aggregate their values.
///
/// Level `i` of the result is keyed by `key_accessors[i]`. Every node on a
/// fact's key path receives `aggregator.reduce(previous, value_accessor(fact))`,
/// starting from `aggregator.identity()` for fresh nodes.
pub fn rollup<'f, T, V, A>(
    key_accessors: &[KeyAccessor<'_, T>],
    value_accessor: V,
    aggregator: &A,
    facts: impl IntoIterator<Item = &'f T>,
) -> Rollup
where
    T: 'f,
    V: Fn(&T) -> f64,
    A: Aggregator + ?Sized,
{
    let mut out = Rollup::default();
    let levels = key_accessors.len();

    for (index, fact) in facts.into_iter().enumerate() {
        let value = value_accessor(fact);
        let mut parent: Option<RollupId> = None;

        for (depth, accessor) in key_accessors.iter().enumerate() {
            let key = accessor(fact, index);
            let existing = out.table(parent).and_then(|table| table.get(&key));
            let id = match existing {
                Some(id) => id,
                None => {
                    let id = RollupId(out.nodes.len());
                    out.nodes.push(AggregationNode {
                        key: key.clone(),
                        aggregate: aggregator.identity(),
                        depth,
                        children: (depth + 1 < levels).then(ChildTable::default),
                    });
                    out.table_mut(parent).insert(key, id);
                    id
                }
            };

            let node = &mut out.nodes[id.0];
            node.aggregate = aggregator.reduce(node.aggregate, value);
            parent = Some(id);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{Count, Max, Sum};

    struct Row {
        region: &'static str,
        city: &'static str,
        sales: f64,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { region: "north", city: "oslo", sales: 4.0 },
            Row { region: "south", city: "rome", sales: 2.0 },
            Row { region: "north", city: "bergen", sales: 1.0 },
            Row { region: "north", city: "oslo", sales: 3.0 },
        ]
    }

    fn region(r: &Row, _: usize) -> Key {
        Key::from(r.region)
    }

    fn city(r: &Row, _: usize) -> Key {
        Key::from(r.city)
    }

    #[test]
    fn identical_key_paths_accumulate() {
        let data = rows();
        let levels: [KeyAccessor<'_, Row>; 2] = [&region, &city];
        let out = rollup(&levels, |r: &Row| r.sales, &Sum, &data);

        let oslo = out
            .lookup(&[Key::from("north"), Key::from("oslo")])
            .expect("oslo node");
        assert_eq!(oslo.aggregate, 7.0);
        assert_eq!(oslo.depth, 1);
        assert!(oslo.children.is_none());

        let north = out.lookup(&[Key::from("north")]).expect("north node");
        assert_eq!(north.aggregate, 8.0);
        assert_eq!(north.children.as_ref().map(ChildTable::len), Some(2));
    }

    #[test]
    fn tables_keep_first_insertion_order() {
        let data = rows();
        let levels: [KeyAccessor<'_, Row>; 1] = [&region];
        let out = rollup(&levels, |r: &Row| r.sales, &Sum, &data);
        let keys: Vec<_> = out.roots().iter().map(|id| out.node(id).key.clone()).collect();
        assert_eq!(keys, vec![Key::from("north"), Key::from("south")]);
    }

    #[test]
    fn aggregator_is_applied_per_level() {
        let data = rows();
        let levels: [KeyAccessor<'_, Row>; 2] = [&region, &city];
        let counted = rollup(&levels, |r: &Row| r.sales, &Count, &data);
        assert_eq!(counted.lookup(&[Key::from("north")]).map(|n| n.aggregate), Some(3.0));

        let maxed = rollup(&levels, |r: &Row| r.sales, &Max, &data);
        assert_eq!(maxed.lookup(&[Key::from("north")]).map(|n| n.aggregate), Some(4.0));
    }

    #[test]
    fn accessor_receives_positional_index() {
        let data: Vec<Row> = [1.0, 2.0, 4.0, 8.0]
            .into_iter()
            .map(|sales| Row { region: "north", city: "oslo", sales })
            .collect();
        let by_parity = |_: &Row, i: usize| Key::from(if i % 2 == 0 { "even" } else { "odd" });
        let levels: [KeyAccessor<'_, Row>; 1] = [&by_parity];
        let out = rollup(&levels, |r: &Row| r.sales, &Sum, &data);
        // indices 0 and 2 carry 1 + 4, indices 1 and 3 carry 2 + 8
        assert_eq!(out.lookup(&[Key::from("even")]).map(|n| n.aggregate), Some(5.0));
        assert_eq!(out.lookup(&[Key::from("odd")]).map(|n| n.aggregate), Some(10.0));
    }

    #[test]
    fn no_facts_means_no_nodes() {
        let data: Vec<Row> = Vec::new();
        let levels: [KeyAccessor<'_, Row>; 1] = [&region];
        let out = rollup(&levels, |r: &Row| r.sales, &Sum, &data);
        assert!(out.is_empty());
        assert!(out.roots().is_empty());
    }
}
