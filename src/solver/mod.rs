pub mod monte_carlo;

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ValueEstimate {
    pub avg: f64,
    pub count: u32,
}

impl ValueEstimate {
    // Incremental mean: V ← V + (G - V) / n.
    pub fn update(&mut self, value: f64) {
        self.count += 1;
        self.avg += (value - self.avg) / self.count as f64;
    }
}

// Running average return and visit count per key. Lives for one simulation run.
#[derive(Clone, Debug)]
pub struct ValueTable<K: Eq + Hash> {
    estimates: HashMap<K, ValueEstimate>,
}

impl<K: Eq + Hash> Default for ValueTable<K> {
    fn default() -> ValueTable<K> {
        ValueTable {
            estimates: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> ValueTable<K> {
    pub fn record(&mut self, key: K, value: f64) {
        self.estimates.entry(key).or_default().update(value);
    }

    pub fn value(&self, key: &K) -> Option<f64> {
        self.estimates.get(key).map(|e| e.avg)
    }

    pub fn visits(&self, key: &K) -> u32 {
        self.estimates.get(key).map_or(0, |e| e.count)
    }

    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &ValueEstimate)> {
        self.estimates.iter()
    }

    // Entries ordered by key, for reproducible traversal.
    pub fn sorted(&self) -> Vec<(&K, &ValueEstimate)>
    where
        K: Ord,
    {
        let mut entries: Vec<(&K, &ValueEstimate)> = self.estimates.iter().collect();
        entries.sort_by(|(k1, _), (k2, _)| k1.cmp(k2));
        entries
    }
}
