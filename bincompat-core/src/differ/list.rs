//! Pairwise list differ.
//!
//! Member lists per type are small, so every element is matched by a linear
//! scan of the other list. Equality is a multi-field structural predicate,
//! which rules out a hash index keyed on one attribute.

use super::changes::{DiffCollection, DiffOperation};

/// Report items of `old` with no equal item in `new` as removed, then items
/// of `new` with no equal item in `old` as added. Both in source order.
pub fn diff_lists<I>(
    old: &[I],
    new: &[I],
    equal: impl Fn(&I, &I) -> bool,
    mut on_added: impl FnMut(&I),
    mut on_removed: impl FnMut(&I),
) {
    for item in old {
        if !new.iter().any(|candidate| equal(item, candidate)) {
            on_removed(item);
        }
    }
    for item in new {
        if !old.iter().any(|candidate| equal(candidate, item)) {
            on_added(item);
        }
    }
}

/// Collect removed then added items as owned copies.
pub fn diff_collection<T: Clone>(
    old: &[&T],
    new: &[&T],
    equal: impl Fn(&T, &T) -> bool,
) -> DiffCollection<T> {
    let mut removed = Vec::new();
    let mut added = Vec::new();
    diff_lists(
        old,
        new,
        |a, b| equal(*a, *b),
        |item| added.push((*item).clone()),
        |item| removed.push((*item).clone()),
    );

    let mut collection = DiffCollection::new();
    for item in removed {
        collection.push(DiffOperation::Removed, item);
    }
    for item in added {
        collection.push(DiffOperation::Added, item);
    }
    collection
}
