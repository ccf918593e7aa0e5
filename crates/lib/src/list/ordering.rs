//! Placement rules for rank-ordered sequences.
//!
//! Everything here works on a slice that is already sorted by rank and only
//! rewrites ranks in place. No I/O; the [`ListManager`](super::ListManager)
//! decides what to persist.

use crate::Result;
use crate::rank::{Rank, Ranked, midpoint};

/// Clamp a requested position into `0..len`.
///
/// Negative targets go to the front, targets past the end go to the back.
/// An empty sequence clamps everything to 0.
pub fn clamp_index(target: i64, len: usize) -> usize {
    if len == 0 || target <= 0 {
        return 0;
    }
    usize::try_from(target).unwrap_or(usize::MAX).min(len - 1)
}

/// Place `item` at the end of `items` and return its index.
///
/// The new item always takes the last sentinel `"z"`. With two or more
/// existing items, the current last one is first pulled down to the
/// midpoint of its predecessor and `"z"`, which keeps the tail of the list
/// from growing one symbol per append.
pub fn append<T: Ranked>(items: &mut Vec<T>, mut item: T) -> Result<usize> {
    let last = Rank::last();
    match items.len() {
        0 => item.set_rank(Rank::first()),
        1 => {
            // A lone survivor of deletions may still hold the last sentinel.
            if items[0].rank() >= &last {
                items[0].set_rank(Rank::first());
            }
            item.set_rank(last);
        }
        len => {
            let shrunk = midpoint(items[len - 2].rank(), &last)?;
            tracing::debug!(from = %items[len - 1].rank(), to = %shrunk, "re-ranking tail before append");
            items[len - 1].set_rank(shrunk);
            item.set_rank(last);
        }
    }
    items.push(item);
    Ok(items.len() - 1)
}

/// Move the item at `from` to the clamped `target` and return where it landed.
///
/// Only the moved item is re-ranked, except when it lands on either end: it
/// then takes the sentinel for that end and the neighbor it displaced moves
/// to the midpoint of its new neighbors.
///
/// # Panics
///
/// If `from` is out of bounds.
pub fn move_to_index<T: Ranked>(items: &mut Vec<T>, from: usize, target: i64) -> Result<usize> {
    let len = items.len();
    let to = clamp_index(target, len);

    let item = items.remove(from);
    items.insert(to, item);

    match len {
        1 => {}
        2 => {
            items[0].set_rank(Rank::first());
            items[1].set_rank(Rank::last());
        }
        _ if to == 0 => {
            items[0].set_rank(Rank::first());
            let rank = midpoint(items[0].rank(), items[2].rank())?;
            items[1].set_rank(rank);
        }
        _ if to == len - 1 => {
            items[len - 1].set_rank(Rank::last());
            let rank = midpoint(items[len - 3].rank(), items[len - 1].rank())?;
            items[len - 2].set_rank(rank);
        }
        _ => {
            let rank = midpoint(items[to - 1].rank(), items[to + 1].rank())?;
            items[to].set_rank(rank);
        }
    }

    tracing::debug!(from, to, len, "moved item");
    Ok(to)
}

/// Append `item`, then move it to the clamped `target`.
pub fn insert_at<T: Ranked>(items: &mut Vec<T>, item: T, target: i64) -> Result<usize> {
    let from = append(items, item)?;
    move_to_index(items, from, target)
}

/// The first rank that is not strictly greater than its predecessor.
pub fn first_collision<T: Ranked>(items: &[T]) -> Option<&Rank> {
    items
        .windows(2)
        .find(|pair| pair[0].rank() >= pair[1].rank())
        .map(|pair| pair[1].rank())
}

/// True if ranks strictly increase along `items`.
pub fn is_strictly_ordered<T: Ranked>(items: &[T]) -> bool {
    first_collision(items).is_none()
}
