//! Constants used throughout the lexlist library.
//!
//! Rank alphabet, sentinel ranks and defaults live here so the codec, the
//! midpoint algorithm and the list manager agree on them.

/// Number of symbols in the rank alphabet.
pub const RANK_BASE: u32 = 26;

/// The digit-zero symbol. Carries no magnitude; ranks may not start with it.
pub const MIN_SYMBOL: char = 'a';

/// The highest symbol of the rank alphabet.
pub const MAX_SYMBOL: char = 'z';

/// Appended when a midpoint collapses onto its lower bound.
pub const FILLER_SYMBOL: char = 'n';

/// Rank given to the first entry of a list.
pub const FIRST_RANK: &str = "b";

/// Rank reserved for the last entry of a list.
pub const LAST_RANK: &str = "z";

/// Rank length above which a list is rebalanced.
pub const DEFAULT_MAX_RANK_LENGTH: usize = 128;
