//! Duplicate detection over sequences.
//!
//! Equality is supplied as a key projection: two items are duplicates when
//! their keys are equal (and hash equally). The first occurrence of a key is
//! never reported; every later occurrence is, in input order.

use std::collections::HashSet;
use std::hash::Hash;

/// Positions of every repeated occurrence in `items`, in input order.
pub fn duplicate_indices<T, K>(items: &[T], key: impl Fn(&T) -> K) -> Vec<usize>
where
    K: Hash + Eq,
{
    let mut seen = HashSet::with_capacity(items.len());
    items
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| (!seen.insert(key(item))).then_some(idx))
        .collect()
}

/// One message per repeated occurrence, formatted by `on_duplicate`.
pub fn find_duplicates<T, K>(
    items: &[T],
    key: impl Fn(&T) -> K,
    on_duplicate: impl Fn(&T) -> String,
) -> Vec<String>
where
    K: Hash + Eq,
{
    duplicate_indices(items, key)
        .into_iter()
        .map(|idx| on_duplicate(&items[idx]))
        .collect()
}

/// The identity of a sample for duplicate detection: file name compared
/// without regard to case, plus the exact id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SampleKey {
    file_name: Option<String>,
    id: Option<i64>,
}

impl SampleKey {
    pub fn new(file_name: Option<&str>, id: Option<i64>) -> Self {
        Self {
            file_name: file_name.map(str::to_lowercase),
            id,
        }
    }
}
