use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of a top-N view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ranked {
    pub label: String,
    pub count: u64,
}

impl Ranked {
    pub fn new(label: impl Into<String>, count: u64) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// Count occurrences of each key, keeping keys in first-seen order.
pub fn value_counts<'a, I>(keys: I) -> Vec<(&'a str, u64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut slot: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<(&'a str, u64)> = Vec::new();
    for key in keys {
        match slot.get(key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                slot.insert(key, counts.len());
                counts.push((key, 1));
            }
        }
    }
    counts
}

/// The `n` most frequent keys, highest count first.
///
/// Ties keep first-occurrence order: the key seen earlier in `keys` ranks
/// higher. Fewer than `n` distinct keys returns them all.
pub fn top_n<'a, I>(keys: I, n: usize) -> Vec<Ranked>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts = value_counts(keys);
    // stable: equal counts stay in first-seen order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(n)
        .map(|(label, count)| Ranked::new(label, count))
        .collect()
}
