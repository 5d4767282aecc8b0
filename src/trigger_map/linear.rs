use super::TriggerMap;

/// A very simple trigger map
///
/// This trigger map stores triggers in descending order by length and checks each of them in
/// turn. While slow for large dictionaries, it's trivially correct, which makes it useful as a
/// reference for the other maps. Finding the prefixes takes `O(num_triggers)`.
///
/// # Example
/// ```
/// use mathjson_notation::trigger_map::{LinearTriggerMap, TriggerMap};
///
/// let map = LinearTriggerMap::from_vec(vec![(vec![r"\to"], 270)]);
/// assert_eq!(map.get_prefixes([r"\to", "x"]), [(1, &270)]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearTriggerMap<V>(Box<[(Vec<String>, V)]>);

impl<V> LinearTriggerMap<V> {
    /// Create from a vector of entries
    pub fn from_vec<T>(inp: Vec<(T, V)>) -> Self
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        let mut res: Vec<(Vec<String>, V)> = inp
            .into_iter()
            .map(|(tokens, val)| {
                let tokens = tokens
                    .into_iter()
                    .map(|token| token.as_ref().to_owned())
                    .collect();
                (tokens, val)
            })
            .collect();
        // stable, so later duplicates stay after earlier ones
        res.sort_by(|(left, _), (right, _)| {
            left.len()
                .cmp(&right.len())
                .reverse()
                .then_with(|| left.cmp(right))
        });
        super::remove_ordered_dups(&mut res);
        LinearTriggerMap(res.into())
    }
}

impl<T, V> FromIterator<(T, V)> for LinearTriggerMap<V>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (T, V)>,
    {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<V> TriggerMap<V> for LinearTriggerMap<V> {
    fn get_prefixes<'t, I>(&self, tokens: I) -> Vec<(usize, &V)>
    where
        I: IntoIterator<Item = &'t str>,
    {
        let longest = self.0.first().map_or(0, |(trigger, _)| trigger.len());
        let tokens: Vec<_> = tokens.into_iter().take(longest).collect();
        self.0
            .iter()
            .filter(|(trigger, _)| {
                trigger.len() <= tokens.len()
                    && trigger.iter().zip(&tokens).all(|(left, right)| left == right)
            })
            .map(|(trigger, val)| (trigger.len(), val))
            .collect()
    }
}
