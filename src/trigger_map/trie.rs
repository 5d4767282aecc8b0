use super::TriggerMap;
use qp_trie::Trie;
use std::borrow::Borrow;

#[derive(Debug, PartialEq, Eq, Clone)]
struct Wrapper(String);

impl Borrow<[u8]> for Wrapper {
    fn borrow(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// A trigger map backed by a qp-trie
///
/// This is the default trigger map and requires the `qp-trie` feature (enabled by default).
/// Finding the prefixes of some tokens takes time `O(longest_trigger)`, since the walk stops as
/// soon as no key continues the tokens seen so far.
///
/// # Example
/// ```
/// use mathjson_notation::trigger_map::{QpTrieTriggerMap, TriggerMap};
///
/// let map = QpTrieTriggerMap::from_iter([(vec![r"\le"], 1), (vec!["<", "="], 2)]);
/// assert_eq!(map.get_prefixes(["<", "=", "x"]), [(2, &2)]);
/// ```
#[derive(Debug, Clone)]
pub struct QpTrieTriggerMap<V>(Trie<Wrapper, V>);

impl<T, V> FromIterator<(T, V)> for QpTrieTriggerMap<V>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (T, V)>,
    {
        QpTrieTriggerMap(
            iter.into_iter()
                .map(|(tokens, val)| (Wrapper(super::encode(tokens).0), val))
                .collect(),
        )
    }
}

impl<V> TriggerMap<V> for QpTrieTriggerMap<V> {
    fn get_prefixes<'t, I>(&self, tokens: I) -> Vec<(usize, &V)>
    where
        I: IntoIterator<Item = &'t str>,
    {
        let empty = &[][..];
        let mut subtrie = self.0.subtrie(empty);
        let mut res: Vec<_> = subtrie.get(empty).map(|val| (0, val)).into_iter().collect();
        let mut key = String::new();
        for (num, token) in tokens.into_iter().enumerate() {
            super::push_token(&mut key, token);
            let slice = key.as_bytes();
            subtrie = subtrie.subtrie(slice);
            if subtrie.is_empty() {
                break;
            } else if let Some(val) = subtrie.get(slice) {
                res.push((num + 1, val));
            }
        }
        res.reverse();
        res
    }
}

#[cfg(test)]
mod tests {
    use super::{QpTrieTriggerMap, TriggerMap};

    #[test]
    fn correct_prefixes() {
        let map = QpTrieTriggerMap::from_iter([
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
    fn tokens_are_not_characters() {
        let map = QpTrieTriggerMap::from_iter([(vec!["ab"], 0), (vec!["a"], 1)]);
        assert_eq!(map.get_prefixes(["a", "b"]), [(1, &1)]);
        assert_eq!(map.get_prefixes(["ab"]), [(1, &0)]);
    }
}
