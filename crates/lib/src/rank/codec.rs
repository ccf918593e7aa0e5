//! Conversion between rank strings and their base-26 integer value.
//!
//! A rank is read most-significant symbol first with `a` = 0 and `z` = 25.
//! Values are unbounded, so the codec works on [`BigUint`].

use num_bigint::BigUint;

use super::errors::RankError;
use crate::Result;
use crate::constants::{MIN_SYMBOL, RANK_BASE};

/// Digit value of `symbol`, or `None` if it is outside the alphabet.
pub(crate) fn digit_of(symbol: char) -> Option<u8> {
    symbol
        .is_ascii_lowercase()
        .then(|| symbol as u8 - MIN_SYMBOL as u8)
}

fn symbol_of(digit: u8) -> char {
    (MIN_SYMBOL as u8 + digit) as char
}

/// Read `rank` as a base-26 numeral.
///
/// The empty string reads as zero.
pub fn to_integer(rank: &str) -> Result<BigUint> {
    let digits = rank
        .chars()
        .map(|symbol| {
            digit_of(symbol).ok_or_else(|| RankError::InvalidSymbol {
                rank: rank.to_string(),
                symbol,
            })
        })
        .collect::<std::result::Result<Vec<u8>, _>>()?;

    if digits.is_empty() {
        return Ok(BigUint::default());
    }

    // Every digit is below the radix, so this cannot fail.
    Ok(BigUint::from_radix_be(&digits, RANK_BASE).unwrap_or_default())
}

/// Write `value` as a base-26 numeral without leading zero digits.
///
/// Zero is written as a single minimum symbol.
pub fn from_integer(value: &BigUint) -> String {
    value
        .to_radix_be(RANK_BASE)
        .into_iter()
        .map(symbol_of)
        .collect()
}
