/// Frequency tables: counts of records per category label.
///
/// Both table types keep keys in insertion order. Tables over a fixed
/// universe are created pre-seeded with every label so zero counts survive
/// into the chart legend; open-ended tables grow as new keys are seen.

use indexmap::IndexMap;

use crate::model::Category;

// ---------------------------------------------------------------------------
// Single dimension
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencyTable {
    counts: IndexMap<Category, u64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding every key of a fixed universe at zero.
    pub fn seeded(keys: &[Category]) -> Self {
        FrequencyTable {
            counts: keys.iter().cloned().map(|k| (k, 0)).collect(),
        }
    }

    pub fn increment(&mut self, key: &Category) {
        match self.counts.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(key.clone(), 1);
            }
        }
    }

    /// Count for `key`; `None` if the key has never been seen or seeded.
    pub fn get(&self, key: &Category) -> Option<u64> {
        self.counts.get(key).copied()
    }

    /// Sum of all counts, i.e. the number of records that contributed.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct keys, zero-count keys included.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Category> {
        self.counts.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Category, u64)> {
        self.counts.iter().map(|(k, v)| (k, *v))
    }

    /// Reorders keys ascending (years, months).
    pub fn sort_keys(&mut self) {
        self.counts.sort_keys();
    }
}

// ---------------------------------------------------------------------------
// Two dimensions
// ---------------------------------------------------------------------------

/// Per-group frequency tables, e.g. magnitude counts per city.
///
/// A group's sub-table is created the first time the group key is seen,
/// seeded with `universe` when the counted dimension is fixed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedFrequencyTable {
    universe: Option<Vec<Category>>,
    groups: IndexMap<Category, FrequencyTable>,
}

impl GroupedFrequencyTable {
    pub fn new(universe: Option<Vec<Category>>) -> Self {
        GroupedFrequencyTable {
            universe,
            groups: IndexMap::new(),
        }
    }

    pub fn increment(&mut self, group: &Category, key: &Category) {
        let universe = &self.universe;
        self.groups
            .entry(group.clone())
            .or_insert_with(|| match universe {
                Some(keys) => FrequencyTable::seeded(keys),
                None => FrequencyTable::new(),
            })
            .increment(key);
    }

    pub fn get(&self, group: &Category) -> Option<&FrequencyTable> {
        self.groups.get(group)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> impl Iterator<Item = &Category> {
        self.groups.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Category, &FrequencyTable)> {
        self.groups.iter()
    }

    /// Sum of counts over every group.
    pub fn total(&self) -> u64 {
        self.groups.values().map(FrequencyTable::total).sum()
    }

    pub fn sort_groups(&mut self) {
        self.groups.sort_keys();
    }

    /// Sorts the keys inside each group's sub-table.
    pub fn sort_inner_keys(&mut self) {
        for table in self.groups.values_mut() {
            table.sort_keys();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<Category> {
        names.iter().map(|n| Category::label(n)).collect()
    }

    #[test]
    fn test_seeded_table_keeps_zero_counts_in_order() {
        let mut table = FrequencyTable::seeded(&labels(&["a", "b", "c"]));
        table.increment(&Category::label("c"));
        let rows: Vec<_> = table.iter().map(|(k, v)| (k.to_string(), v)).collect();
        assert_eq!(
            rows,
            vec![("a".to_string(), 0), ("b".to_string(), 0), ("c".to_string(), 1)]
        );
        assert_eq!(table.total(), 1);
    }

    #[test]
    fn test_open_table_only_holds_observed_keys() {
        let mut table = FrequencyTable::new();
        assert!(table.is_empty());
        table.increment(&Category::label("Van"));
        table.increment(&Category::label("Izmir"));
        table.increment(&Category::label("Van"));
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&Category::label("Van")), Some(2));
        assert_eq!(table.get(&Category::label("Ankara")), None);
        let keys: Vec<_> = table.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["Van", "Izmir"], "encounter order is kept");
    }

    #[test]
    fn test_sort_keys_orders_years_numerically() {
        let mut table = FrequencyTable::new();
        for year in [2021, 1999, 2005] {
            table.increment(&Category::Year(year));
        }
        table.sort_keys();
        let keys: Vec<_> = table.keys().cloned().collect();
        assert_eq!(
            keys,
            vec![Category::Year(1999), Category::Year(2005), Category::Year(2021)]
        );
    }

    #[test]
    fn test_grouped_table_seeds_each_new_group() {
        let mut grouped = GroupedFrequencyTable::new(Some(labels(&["low", "high"])));
        grouped.increment(&Category::label("X"), &Category::label("high"));
        grouped.increment(&Category::label("Y"), &Category::label("low"));
        grouped.increment(&Category::label("X"), &Category::label("high"));

        let x = grouped.get(&Category::label("X")).expect("group X exists");
        assert_eq!(x.get(&Category::label("low")), Some(0));
        assert_eq!(x.get(&Category::label("high")), Some(2));
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped.total(), 3);
    }

    #[test]
    fn test_grouped_table_without_universe_is_lazy() {
        let mut grouped = GroupedFrequencyTable::new(None);
        assert!(grouped.is_empty());
        grouped.increment(&Category::label("X"), &Category::Month(4));
        let x = grouped.get(&Category::label("X")).unwrap();
        assert_eq!(x.len(), 1);
        assert!(grouped.get(&Category::label("Y")).is_none());
    }
}
