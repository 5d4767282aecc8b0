//! TriggerMaps are maps keyed by token sequences that find every key that prefixes an input
//!
//! The parser uses them to find the dictionary entries whose trigger matches the tokens at the
//! cursor. Since this happens for every primary and every operator position, the efficiency of
//! these maps is heavily linked to overall parsing time. Results are ordered longest trigger
//! first, so the first result is always the greedy match.
//!
//! Keys are encoded as strings with every token prefixed by its byte length, so no token sequence
//! can be mistaken for another that happens to concatenate to the same text.
//!
//! # Example
//!
//! ```
//! use mathjson_notation::trigger_map::{LinearTriggerMap, TriggerMap};
//!
//! let map = LinearTriggerMap::from_vec(vec![(vec!["<"], "Less"), (vec!["<", "="], "LessEqual")]);
//! let found = map.get_prefixes(["<", "=", "b"]);
//! assert_eq!(found, [(2, &"LessEqual"), (1, &"Less")]);
//! ```

mod hash;
mod linear;
#[cfg(feature = "qp-trie")]
mod trie;

#[cfg(feature = "fnv")]
use ::fnv::FnvBuildHasher;
pub use hash::HashTriggerMap;
pub use linear::LinearTriggerMap;
#[cfg(feature = "qp-trie")]
pub use trie::QpTrieTriggerMap;

/// A hash trigger map using the fnv hasher
///
/// This requires the `fnv` feature.
///
/// # Example
/// ```
/// use mathjson_notation::trigger_map::{FnvHashTriggerMap, TriggerMap};
///
/// let map: FnvHashTriggerMap<u8> = FnvHashTriggerMap::from_iter_hasher([(["x"], 0)]);
/// assert_eq!(map.get_prefixes(["x"]), [(1, &0)]);
/// ```
#[cfg(feature = "fnv")]
pub type FnvHashTriggerMap<V> = HashTriggerMap<V, FnvBuildHasher>;

/// The trigger map used by the dictionary index
#[cfg(feature = "qp-trie")]
pub type DefaultTriggerMap<V> = QpTrieTriggerMap<V>;

/// The trigger map used by the dictionary index
#[cfg(all(not(feature = "qp-trie"), feature = "fnv"))]
pub type DefaultTriggerMap<V> = FnvHashTriggerMap<V>;

/// The trigger map used by the dictionary index
#[cfg(not(any(feature = "qp-trie", feature = "fnv")))]
pub type DefaultTriggerMap<V> = HashTriggerMap<V>;

/// A TriggerMap is a map that supports finding every key that prefixes some tokens
pub trait TriggerMap<V> {
    /// Get the length and value of every key that prefixes `tokens`, longest first
    ///
    /// # Example
    /// ```
    /// use mathjson_notation::trigger_map::{HashTriggerMap, TriggerMap};
    ///
    /// let map = HashTriggerMap::from_iter([(vec![":"], 1), (vec![":", "="], 2)]);
    /// assert_eq!(map.get_prefixes([":", "x"]), [(1, &1)]);
    /// ```
    fn get_prefixes<'t, I>(&self, tokens: I) -> Vec<(usize, &V)>
    where
        I: IntoIterator<Item = &'t str>;
}

/// Append the encoding of one token to a key
fn push_token(key: &mut String, token: &str) {
    key.push_str(&token.len().to_string());
    key.push(':');
    key.push_str(token);
}

/// Encode a sequence of tokens, returning the key and the number of tokens
fn encode<T>(tokens: T) -> (String, usize)
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut key = String::new();
    let mut len = 0;
    for token in tokens {
        push_token(&mut key, token.as_ref());
        len += 1;
    }
    (key, len)
}

/// From a vec-like, order all the entries and remove duplicates
fn remove_ordered_dups<K, V>(inp: &mut Vec<(K, V)>)
where
    K: Eq,
{
    if let Some((ref first, _)) = inp.first() {
        let mut last = first;
        let mut off = 0;
        for ind in 1..inp.len() {
            if &inp[ind].0 == last {
                off += 1;
            }
            inp.swap(ind - off, ind);
            last = &inp[ind - off].0;
        }
        inp.truncate(inp.len() - off);
    }
}

#[cfg(test)]
mod tests {
    use super::{encode, remove_ordered_dups};

    #[test]
    fn keys_are_unambiguous() {
        assert_ne!(encode(["ab"]).0, encode(["a", "b"]).0);
        assert_eq!(encode(["<", "="]), ("1:<1:=".to_owned(), 2));
    }

    #[test]
    fn later_duplicates_win() {
        let mut entries = vec![("a", 1), ("a", 2), ("b", 3)];
        remove_ordered_dups(&mut entries);
        assert_eq!(entries, [("a", 2), ("b", 3)]);
    }
}
