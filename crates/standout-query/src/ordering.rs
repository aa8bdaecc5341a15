//! Ordering types for query result sorting.
//!
//! Provides [`Dir`] for sort direction and [`SortKey`] for sorting by a
//! typed key extracted from each item.

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{QueryError, Result};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Returns the direction for an `ascending` flag.
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            Dir::Asc
        } else {
            Dir::Desc
        }
    }

    /// Applies this direction to an ordering.
    ///
    /// For `Asc`, returns the ordering unchanged.
    /// For `Desc`, reverses the ordering. `Equal` stays `Equal` either way,
    /// so a stable sort keeps ties in scan order in both directions.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    /// Returns the display name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compares two sort keys in the given direction.
///
/// Keys that have no ordering between them (such as `NaN`) are a
/// [`QueryError::ContractViolation`].
pub fn compare_keys<K: PartialOrd>(a: &K, b: &K, dir: Dir) -> Result<Ordering> {
    a.partial_cmp(b)
        .map(|ordering| dir.apply(ordering))
        .ok_or_else(|| QueryError::ContractViolation {
            reason: "sort keys are not mutually comparable".to_string(),
        })
}

trait KeySort<T>: Send + Sync {
    fn sort<'a>(&self, items: &mut Vec<&'a T>, dir: Dir) -> Result<()>;
}

struct KeyFn<E, K> {
    extractor: E,
    _key: PhantomData<fn() -> K>,
}

impl<T, K, E> KeySort<T> for KeyFn<E, K>
where
    E: Fn(&T) -> K + Send + Sync,
    K: PartialOrd,
{
    fn sort<'a>(&self, items: &mut Vec<&'a T>, dir: Dir) -> Result<()> {
        // Extract each key once instead of twice per comparison.
        let keyed: Vec<(K, &'a T)> = items
            .iter()
            .map(|&item| ((self.extractor)(item), item))
            .collect();

        // A key that doesn't order against itself can't be placed anywhere.
        if let Some(position) = keyed.iter().position(|(key, _)| key.partial_cmp(key).is_none()) {
            return Err(QueryError::ContractViolation {
                reason: format!("sort key of match #{position} is not comparable with itself"),
            });
        }

        let keyed = merge_sort(keyed, dir)?;

        items.clear();
        items.extend(keyed.into_iter().map(|(_, item)| item));
        Ok(())
    }
}

/// Stable merge sort that stops at the first pair of keys with no ordering.
///
/// Ties take the left run first. When keys split into groups that only order
/// within themselves, the first merge joining two groups compares across them,
/// so a mixed input always fails.
fn merge_sort<K: PartialOrd, V>(mut keyed: Vec<(K, V)>, dir: Dir) -> Result<Vec<(K, V)>> {
    if keyed.len() <= 1 {
        return Ok(keyed);
    }
    let right = keyed.split_off(keyed.len() / 2);
    let left = merge_sort(keyed, dir)?;
    let right = merge_sort(right, dir)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    while let (Some(l), Some(r)) = (left.peek(), right.peek()) {
        let next = if compare_keys(&l.0, &r.0, dir)? == Ordering::Greater {
            right.next()
        } else {
            left.next()
        };
        merged.extend(next);
    }
    merged.extend(left);
    merged.extend(right);
    Ok(merged)
}

/// A typed sort key extracted from each item.
///
/// The key type only needs `PartialOrd`; keys that turn out not to be
/// comparable are reported when sorting rather than silently misplaced.
pub struct SortKey<T> {
    inner: Arc<dyn KeySort<T>>,
}

impl<T> SortKey<T> {
    /// Creates a sort key from an extractor.
    pub fn new<K, E>(extractor: E) -> Self
    where
        K: PartialOrd + 'static,
        E: Fn(&T) -> K + Send + Sync + 'static,
        T: 'static,
    {
        SortKey {
            inner: Arc::new(KeyFn {
                extractor,
                _key: PhantomData,
            }),
        }
    }

    /// Stable-sorts `items` by this key in direction `dir`.
    ///
    /// On error, `items` is left in its original order.
    pub fn sort<'a>(&self, items: &mut Vec<&'a T>, dir: Dir) -> Result<()> {
        self.inner.sort(items, dir)
    }
}

impl<T> Clone for SortKey<T> {
    fn clone(&self) -> Self {
        SortKey {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for SortKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SortKey(..)")
    }
}
