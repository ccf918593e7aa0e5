//! Whole-list rank reset by recursive bisection.

use super::{Rank, Ranked, midpoint};
use crate::Result;

/// Reassign every rank in `items`, which must already be in list order.
///
/// The first item gets `"b"`, the last `"z"`, and the interior is filled by
/// repeatedly giving the middle index of a range the midpoint of the range
/// ends. Rank lengths end up around `log26(len)` regardless of how long they
/// were before. A single item gets `"b"`.
pub fn rebalance<T: Ranked>(items: &mut [T]) -> Result<()> {
    match items.len() {
        0 => Ok(()),
        1 => {
            items[0].set_rank(Rank::first());
            Ok(())
        }
        len => {
            items[0].set_rank(Rank::first());
            items[len - 1].set_rank(Rank::last());
            bisect(items, 0, len - 1)
        }
    }
}

fn bisect<T: Ranked>(items: &mut [T], start: usize, end: usize) -> Result<()> {
    if end - start <= 1 {
        return Ok(());
    }

    let mid = (start + end) / 2;
    let rank = midpoint(items[start].rank(), items[end].rank())?;
    items[mid].set_rank(rank);

    bisect(items, start, mid)?;
    bisect(items, mid, end)
}
