//! Group rows by a string key while keeping first-encounter order.
//!
//! ```text
//! rows (in file order)          groups (first-seen order)
//! ┌──────────────────────┐       ┌────────────────────────┐
//! │ Cancer    18,856.28  │       │ Cancer   sum  count    │
//! │ Obesity   33,643.33  │  →    │ Obesity  sum  count    │
//! │ Cancer    27,955.10  │       │ ...                    │
//! └──────────────────────┘       └────────────────────────┘
//! ```
//!
//! Rankings built from these groups use stable sorts, so ties keep the
//! order in which their keys first appeared.

use std::collections::HashMap;

/// Running sum and count for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accumulator {
    pub sum: f64,
    pub count: usize,
}

impl Accumulator {
    pub fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// Key → accumulator map that remembers insertion order.
#[derive(Debug, Clone, Default)]
pub struct OrderedGroups {
    index: HashMap<String, usize>,
    groups: Vec<(String, Accumulator)>,
}

impl OrderedGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulator for `key`, created on first use.
    pub fn entry(&mut self, key: &str) -> &mut Accumulator {
        let pos = match self.index.get(key) {
            Some(&pos) => pos,
            None => {
                self.groups.push((key.to_string(), Accumulator::default()));
                self.index.insert(key.to_string(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        &mut self.groups[pos].1
    }

    /// Add `value` to the group `key`.
    pub fn add(&mut self, key: &str, value: f64) {
        self.entry(key).add(value);
    }

    /// Make sure `key` exists without adding a value.
    pub fn touch(&mut self, key: &str) {
        self.entry(key);
    }

    pub fn get(&self, key: &str) -> Option<&Accumulator> {
        self.index.get(key).map(|&pos| &self.groups[pos].1)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Accumulator)> {
        self.groups.iter().map(|(k, acc)| (k.as_str(), acc))
    }

    /// `(key, value)` pairs sorted by value descending. Stable.
    pub fn ranked_by<F>(&self, value: F) -> Vec<(String, f64)>
    where
        F: Fn(&Accumulator) -> Option<f64>,
    {
        let mut ranked: Vec<(String, f64)> = self
            .groups
            .iter()
            .filter_map(|(k, acc)| value(acc).map(|v| (k.clone(), v)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

/// Group `items` by `key`, accumulating `value`.
pub fn group_by<T, K, V>(items: &[T], key: K, value: V) -> OrderedGroups
where
    K: Fn(&T) -> &str,
    V: Fn(&T) -> f64,
{
    let mut groups = OrderedGroups::new();
    for item in items {
        groups.add(key(item), value(item));
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_seen_order() {
        let rows = vec![("Obesity", 10.0), ("Cancer", 5.0), ("Obesity", 20.0), ("Asthma", 1.0)];
        let groups = group_by(&rows, |r| r.0, |r| r.1);

        let keys: Vec<&str> = groups.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Obesity", "Cancer", "Asthma"]);

        let obesity = groups.get("Obesity").unwrap();
        assert_eq!(obesity.sum, 30.0);
        assert_eq!(obesity.count, 2);
        assert_eq!(obesity.mean(), Some(15.0));
    }

    #[test]
    fn test_ranking_is_stable_on_ties() {
        let rows = vec![("B", 5.0), ("A", 5.0), ("C", 9.0)];
        let groups = group_by(&rows, |r| r.0, |r| r.1);

        let ranked = groups.ranked_by(|acc| Some(acc.sum));
        let keys: Vec<&str> = ranked.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_ranking_skips_groups_without_value() {
        let mut groups = OrderedGroups::new();
        groups.add("Flu", 3.0);
        groups.touch("Diabetes");

        let ranked = groups.ranked_by(|acc| acc.mean());
        assert_eq!(ranked, vec![("Flu".to_string(), 3.0)]);
        assert_eq!(groups.len(), 2);
    }
}
