//! Fractional lexical ranks.
//!
//! A [`Rank`] is a non-empty string over `a`..`z`. Entries of a list are
//! ordered by comparing their ranks as plain strings, so moving an entry only
//! ever rewrites the rank of that entry (and at most one neighbor), never
//! the whole list.
//!
//! * [`codec`] converts ranks to and from arbitrary precision integers.
//! * [`midpoint`](midpoint::midpoint) finds a rank strictly between two others.
//! * [`rebalance`](rebalance::rebalance) re-spreads a whole list when ranks
//!   grow too long.

pub mod codec;
pub mod errors;
pub mod midpoint;
pub mod rebalance;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{FIRST_RANK, LAST_RANK, MAX_SYMBOL, MIN_SYMBOL};

pub use errors::RankError;
pub use midpoint::midpoint;
pub use rebalance::rebalance;

/// A sortable position key.
///
/// Ordering is byte-wise string ordering, which for the `a`..`z` alphabet
/// matches both lexicographic and (after padding) numeric order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rank(String);

impl Rank {
    /// Validate and wrap a rank string.
    pub fn parse(rank: impl Into<String>) -> Result<Self, RankError> {
        let rank = rank.into();
        if rank.is_empty() {
            return Err(RankError::Empty);
        }
        if let Some(symbol) = rank.chars().find(|c| !(MIN_SYMBOL..=MAX_SYMBOL).contains(c)) {
            return Err(RankError::InvalidSymbol { rank, symbol });
        }
        Ok(Self(rank))
    }

    /// Wrap a string the caller has already produced from the alphabet.
    pub(crate) fn from_trusted(rank: String) -> Self {
        debug_assert!(!rank.is_empty() && rank.chars().all(|c| c.is_ascii_lowercase()));
        Self(rank)
    }

    /// The rank of the first entry of a list.
    pub fn first() -> Self {
        Self(FIRST_RANK.to_string())
    }

    /// The rank reserved for the last entry of a list.
    pub fn last() -> Self {
        Self(LAST_RANK.to_string())
    }

    /// The rank as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; ranks are non-empty. Present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if the rank starts with the zero-magnitude symbol.
    pub fn starts_with_minimum(&self) -> bool {
        self.0.starts_with(MIN_SYMBOL)
    }

    /// True if every symbol is the minimum symbol.
    pub fn is_minimum(&self) -> bool {
        self.0.chars().all(|c| c == MIN_SYMBOL)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Rank {
    type Err = RankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Rank {
    type Error = RankError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Rank> for String {
    fn from(rank: Rank) -> Self {
        rank.0
    }
}

impl AsRef<str> for Rank {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for Rank {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Anything that carries a rank the list algorithms may rewrite.
pub trait Ranked {
    /// Current rank.
    fn rank(&self) -> &Rank;

    /// Replace the rank.
    fn set_rank(&mut self, rank: Rank);
}

impl Ranked for Rank {
    fn rank(&self) -> &Rank {
        self
    }

    fn set_rank(&mut self, rank: Rank) {
        *self = rank;
    }
}
