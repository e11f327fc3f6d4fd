//! Identifier generation.
//!
//! The next identifier is always derived from the ids currently in use: the
//! smallest free suffix wins, so ids freed by a delete (or by undoing an add)
//! are handed out again and a reloaded collection generates exactly what the
//! live one would have.

use std::collections::BTreeSet;

use crate::{
    error::{AppError, AppResult},
    models::SequentialId,
};

/// Smallest unused identifier of type `T`, given the ids already in use
pub fn next_id<'a, T>(existing: impl IntoIterator<Item = &'a T>) -> AppResult<T>
where
    T: SequentialId + 'a,
{
    let used: BTreeSet<u32> = existing.into_iter().map(|id| id.number()).collect();

    // `used` is sorted: the first position where the suffix runs ahead of the
    // expected value is the first gap.
    let mut candidate = 1u32;
    for number in used.into_iter().filter(|n| *n >= 1) {
        if number != candidate {
            break;
        }
        candidate += 1;
    }

    if candidate > T::MAX {
        return Err(AppError::Exhausted(format!(
            "Every {} from 1 to {} is already in use",
            T::KIND,
            T::MAX
        )));
    }
    T::from_number(candidate)
}
