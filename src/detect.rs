//! Card brand identification using BIN prefix rules.
//!
//! The Bank Identification Number (BIN) is the leading 6-8 digits of a card
//! number. These functions strip formatting from the input and run it
//! through the standard [`BinTable`](crate::rules::BinTable): enumerated
//! niche BINs first, then ranges, then single-digit prefixes, then
//! `Unknown`.

use crate::rules::BinTable;
use crate::CardBrand;

/// Identifies the card brand of a raw form input.
///
/// Non-digit characters are stripped before matching. Empty input, or input
/// that matches no rule, yields `CardBrand::Unknown`. The function is pure
/// and total.
///
/// # Example
///
/// ```
/// use payframe::detect::identify_brand;
/// use payframe::CardBrand;
///
/// // Zinli BINs win over the generic Visa rule
/// assert_eq!(identify_brand("4022 7600 0000 0001"), CardBrand::Zinli);
/// assert_eq!(identify_brand("4111 1111 1111 1111"), CardBrand::Visa);
/// assert_eq!(identify_brand("5112345678901234"), CardBrand::Mastercard);
/// assert_eq!(identify_brand(""), CardBrand::Unknown);
/// ```
#[inline]
pub fn identify_brand(input: &str) -> CardBrand {
    BinTable::standard().identify(input)
}

/// Identifies the card brand from a slice of digit values (0-9).
///
/// # Example
///
/// ```
/// use payframe::detect::identify_digits;
/// use payframe::CardBrand;
///
/// assert_eq!(identify_digits(&[2, 2, 2, 1, 0, 0]), CardBrand::Mastercard);
/// assert_eq!(identify_digits(&[]), CardBrand::Unknown);
/// ```
#[inline]
pub fn identify_digits(digits: &[u8]) -> CardBrand {
    BinTable::standard().identify_digits(digits)
}
