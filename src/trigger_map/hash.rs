use super::TriggerMap;
use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::BuildHasher;

/// A trigger map that uses token count buckets and hashmaps for lookups
///
/// If the `qp-trie` feature isn't enabled, this will be the default. Finding the prefixes takes
/// `O(longest_trigger)` hash lookups regardless of how many triggers share a prefix.
///
/// # Example
/// ```
/// use mathjson_notation::trigger_map::{HashTriggerMap, TriggerMap};
///
/// let map = HashTriggerMap::from_iter([(vec!["!", "<"], "NotLess")]);
/// assert_eq!(map.get_prefixes(["!", "<"]), [(2, &"NotLess")]);
/// ```
#[derive(Debug, Clone)]
pub struct HashTriggerMap<V, S = RandomState>(Box<[HashMap<String, V, S>]>);

impl<V, S> HashTriggerMap<V, S>
where
    S: BuildHasher + Default,
{
    /// Create from an iterator and custom hasher
    pub fn from_iter_hasher<T, I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (T, V)>,
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        let mut bins = Vec::new();
        for (tokens, val) in iter {
            let (key, len) = super::encode(tokens);
            bins.extend((bins.len()..=len).map(|_| HashMap::default()));
            bins[len].insert(key, val);
        }
        HashTriggerMap(bins.into())
    }
}

impl<T, V> FromIterator<(T, V)> for HashTriggerMap<V>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (T, V)>,
    {
        Self::from_iter_hasher(iter)
    }
}

impl<V, S> TriggerMap<V> for HashTriggerMap<V, S>
where
    S: BuildHasher,
{
    fn get_prefixes<'t, I>(&self, tokens: I) -> Vec<(usize, &V)>
    where
        I: IntoIterator<Item = &'t str>,
    {
        let mut keys = vec![String::new()];
        let mut key = String::new();
        for token in tokens.into_iter().take(self.0.len().saturating_sub(1)) {
            super::push_token(&mut key, token);
            keys.push(key.clone());
        }
        keys.iter()
            .zip(self.0.iter())
            .enumerate()
            .rev()
            .filter_map(|(len, (key, map))| map.get(key).map(|val| (len, val)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{HashTriggerMap, TriggerMap};

    #[test]
    fn correct_prefixes() {
        let map = HashTriggerMap::from_iter([
            (vec!["a"], 0),
            (vec!["a", "b", "c"], 1),
            (vec!["b", "c"], 2),
            (vec!["b", "c"], 3),
        ]);
        assert_eq!(map.get_prefixes(["a", "b", "c", "d"]), [(3, &1), (1, &0)]);
        assert_eq!(map.get_prefixes(["a", "b"]), [(1, &0)]);
        assert_eq!(map.get_prefixes(["b", "c", "d"]), [(2, &3)]);
        assert!(map.get_prefixes(["b", "d"]).is_empty());
        assert!(map.get_prefixes(["💖"]).is_empty());
    }

    #[test]
    fn works_for_perverse() {
        let map = HashTriggerMap::from_iter([(Vec::<&str>::new(), 0), (vec![" 3"], 1)]);
        assert_eq!(map.get_prefixes([" 3", " "]), [(1, &1), (0, &0)]);
        assert_eq!(map.get_prefixes(["ab"]), [(0, &0)]);
    }
}
