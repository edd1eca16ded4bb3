use std::{collections::HashMap, hash::Hash};

/// Returns the keys that occur more than once, in order of first occurrence.
pub fn duplicates<K, I>(keys: I) -> Vec<K>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let mut counts: HashMap<K, usize> = HashMap::new();
    let mut order = Vec::new();

    for key in keys {
        let count = counts.entry(key.clone()).or_insert(0);
        if *count == 0 {
            order.push(key);
        }
        *count += 1;
    }

    order.into_iter().filter(|k| counts[k] > 1).collect()
}

// -- Tests -------------------------------------------------------------------
