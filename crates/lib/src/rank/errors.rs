//! Error types for rank parsing and rank arithmetic.

use thiserror::Error;

/// Errors raised by the rank codec and the midpoint algorithm.
///
/// Contract violations (`LeadingMinimum`, `OutOfOrder`, `NoRoomBetween`)
/// indicate a caller bug: the list manager never asks for a midpoint it
/// cannot get. Validation errors come from parsing untrusted rank strings.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RankError {
    /// A rank must contain at least one symbol.
    #[error("Rank must not be empty")]
    Empty,

    /// A rank contained a character outside `a`..`z`.
    #[error("Invalid symbol {symbol:?} in rank {rank:?}")]
    InvalidSymbol {
        /// The offending rank string
        rank: String,
        /// The first character outside the alphabet
        symbol: char,
    },

    /// Midpoint requested with a bound that starts with the minimum symbol.
    #[error("Cannot compute a midpoint for ranks that begin with 'a': {low:?}, {high:?}")]
    LeadingMinimum {
        /// Lower bound
        low: String,
        /// Upper bound
        high: String,
    },

    /// Midpoint requested with `low >= high`.
    #[error("Midpoint bounds out of order: {low:?} is not below {high:?}")]
    OutOfOrder {
        /// Lower bound
        low: String,
        /// Upper bound
        high: String,
    },

    /// The bounds differ only by trailing minimum symbols, so no string sorts
    /// strictly between them.
    #[error("No rank exists between {low:?} and {high:?}")]
    NoRoomBetween {
        /// Lower bound
        low: String,
        /// Upper bound
        high: String,
    },
}

impl RankError {
    /// Check if this error is a broken precondition of the midpoint algorithm.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            RankError::LeadingMinimum { .. }
                | RankError::OutOfOrder { .. }
                | RankError::NoRoomBetween { .. }
        )
    }

    /// Check if this error came from validating a rank string.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, RankError::Empty | RankError::InvalidSymbol { .. })
    }

    /// The `(low, high)` pair of a contract violation.
    pub fn bounds(&self) -> Option<(&str, &str)> {
        match self {
            RankError::LeadingMinimum { low, high }
            | RankError::OutOfOrder { low, high }
            | RankError::NoRoomBetween { low, high } => Some((low, high)),
            _ => None,
        }
    }
}

impl From<RankError> for crate::Error {
    fn from(err: RankError) -> Self {
        crate::Error::Rank(err)
    }
}
