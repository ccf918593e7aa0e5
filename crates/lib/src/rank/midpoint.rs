//! Rank midpoint: a new rank strictly between two existing ones.

use super::{Rank, RankError, codec};
use crate::Result;
use crate::constants::{FILLER_SYMBOL, MIN_SYMBOL};

fn pad(rank: &str, width: usize) -> String {
    let mut padded = String::with_capacity(width);
    padded.push_str(rank);
    padded.extend(std::iter::repeat_n(MIN_SYMBOL, width - rank.len()));
    padded
}

/// Compute a rank strictly between `low` and `high`.
///
/// Both bounds are right-padded with `a` to the same width, read as base-26
/// integers and averaged (floor). When the average lands on `low` the filler
/// symbol is appended; otherwise trailing `a` symbols are dropped since they
/// carry no magnitude.
///
/// Callers must pass `low < high` and neither may start with `a`. The list
/// manager uses the fixed sentinels `"b"`/`"z"` at the ends of a list
/// instead of calling this with an open bound.
///
/// # Errors
///
/// [`RankError::LeadingMinimum`], [`RankError::OutOfOrder`] or
/// [`RankError::NoRoomBetween`] when the preconditions do not hold.
///
/// ```
/// use lexlist::rank::{Rank, midpoint};
///
/// let low = Rank::parse("b").unwrap();
/// let high = Rank::parse("z").unwrap();
/// assert_eq!(midpoint(&low, &high).unwrap(), "n");
/// ```
pub fn midpoint(low: &Rank, high: &Rank) -> Result<Rank> {
    if low.starts_with_minimum() || high.starts_with_minimum() {
        return Err(RankError::LeadingMinimum {
            low: low.to_string(),
            high: high.to_string(),
        }
        .into());
    }
    if low >= high {
        return Err(RankError::OutOfOrder {
            low: low.to_string(),
            high: high.to_string(),
        }
        .into());
    }

    let width = low.len().max(high.len());
    let low_padded = pad(low.as_str(), width);
    let high_padded = pad(high.as_str(), width);

    let low_value = codec::to_integer(&low_padded)?;
    let high_value = codec::to_integer(&high_padded)?;
    if low_value == high_value {
        return Err(RankError::NoRoomBetween {
            low: low.to_string(),
            high: high.to_string(),
        }
        .into());
    }

    let average = (low_value + high_value) / 2u32;
    let mut digits = codec::from_integer(&average);

    if digits == low_padded {
        digits.push(FILLER_SYMBOL);
    } else {
        let kept = digits.trim_end_matches(MIN_SYMBOL).len();
        digits.truncate(kept);
    }

    tracing::trace!(%low, %high, mid = %digits, "computed rank midpoint");
    Ok(Rank::from_trusted(digits))
}
