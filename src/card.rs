//! Core card types for payment forms.
//!
//! This module provides the `CardBrand` enum the form layer uses to pick a
//! card-face visual, and the `CardNumber` struct for holding a submitted
//! card number securely for the life of one request.

use std::fmt;
use std::str::FromStr;
use zeroize::Zeroize;

use crate::error::FormError;

/// Card brands recognised by the payment forms.
///
/// The set is closed: anything the BIN rules do not recognise is `Unknown`,
/// which is a valid result and renders as a generic card face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CardBrand {
    /// Zinli - prepaid wallet card, enumerated 6-digit BINs inside the Visa range
    Zinli,
    /// Visa - Prefix 4
    Visa,
    /// Mastercard - Prefix 51-55, 2221-2720
    Mastercard,
    /// No rule matched
    Unknown,
}

impl CardBrand {
    /// All brands, in declaration order.
    pub const ALL: [CardBrand; 4] = [Self::Zinli, Self::Visa, Self::Mastercard, Self::Unknown];

    /// Returns the stable identifier used by the card-face components.
    #[inline]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::Zinli => "zinli",
            Self::Visa => "visa",
            Self::Mastercard => "mastercard",
            Self::Unknown => "unknown",
        }
    }

    /// Returns a human-readable name for the card brand.
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Zinli => "Zinli",
            Self::Visa => "Visa",
            Self::Mastercard => "Mastercard",
            Self::Unknown => "Unknown",
        }
    }

    /// Returns true for every brand except `Unknown`.
    #[inline]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Returns true if the brand is a prepaid wallet card.
    ///
    /// Prepaid cards get their own card face and never show the CVV
    /// beyond three mask characters.
    #[inline]
    pub const fn is_prepaid(&self) -> bool {
        matches!(self, Self::Zinli)
    }
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Error returned when a brand name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBrandError(pub String);

impl fmt::Display for ParseBrandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown brand name '{}'", self.0)
    }
}

impl std::error::Error for ParseBrandError {}

impl FromStr for CardBrand {
    type Err = ParseBrandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zinli" => Ok(Self::Zinli),
            "visa" => Ok(Self::Visa),
            "mastercard" | "mc" => Ok(Self::Mastercard),
            "unknown" => Ok(Self::Unknown),
            _ => Err(ParseBrandError(s.to_string())),
        }
    }
}

/// Maximum number of digits in a card number.
pub const MAX_CARD_DIGITS: usize = 19;

/// Minimum number of digits in a card number.
pub const MIN_CARD_DIGITS: usize = 13;

/// A card number captured from a payment form.
///
/// The digits are stored in a fixed-size array that is zeroed when the
/// struct is dropped. The number lives for one request/response cycle and
/// is never printed in full.
///
/// # Security
///
/// - `Debug` and `Display` show the first 6 and last 4 digits only
/// - The full number is only reachable through [`CardNumber::expose`]
#[derive(Clone)]
pub struct CardNumber {
    brand: CardBrand,
    digits: [u8; MAX_CARD_DIGITS],
    digit_count: u8,
}

impl CardNumber {
    /// Parses a card number typed into a form.
    ///
    /// Spaces and hyphens are accepted as separators; any other non-digit
    /// character is rejected. The brand is identified with the standard
    /// BIN table.
    ///
    /// # Example
    ///
    /// ```
    /// use payframe::{CardBrand, CardNumber};
    ///
    /// let card = CardNumber::parse("4022 7600 0000 0001").unwrap();
    /// assert_eq!(card.brand(), CardBrand::Zinli);
    /// assert_eq!(card.masked(), "402276******0001");
    /// ```
    pub fn parse(input: &str) -> Result<Self, FormError> {
        Self::parse_with(input, crate::rules::BinTable::standard())
    }

    /// Parses a card number and identifies it with a caller-supplied table.
    pub fn parse_with(input: &str, table: &crate::rules::BinTable) -> Result<Self, FormError> {
        let mut digits = [0u8; MAX_CARD_DIGITS];
        let mut count = 0usize;

        for (position, c) in input.chars().enumerate() {
            match c {
                '0'..='9' => {
                    if count < MAX_CARD_DIGITS {
                        digits[count] = c as u8 - b'0';
                    }
                    count += 1;
                }
                ' ' | '-' => {}
                _ => {
                    digits.zeroize();
                    return Err(FormError::InvalidCharacter {
                        field: "cardNumber",
                        position,
                        character: c,
                    });
                }
            }
        }

        if count == 0 {
            return Err(FormError::MissingField("cardNumber"));
        }
        if !(MIN_CARD_DIGITS..=MAX_CARD_DIGITS).contains(&count) {
            digits.zeroize();
            return Err(FormError::CardNumberLength {
                length: count,
                minimum: MIN_CARD_DIGITS,
                maximum: MAX_CARD_DIGITS,
            });
        }

        let brand = table.identify_digits(&digits[..count]);
        Ok(Self {
            brand,
            digits,
            digit_count: count as u8,
        })
    }

    /// Returns the identified card brand.
    #[inline]
    pub const fn brand(&self) -> CardBrand {
        self.brand
    }

    /// Returns the number of digits in the card number.
    #[inline]
    pub const fn length(&self) -> usize {
        self.digit_count as usize
    }

    /// Returns the 6-digit BIN.
    #[inline]
    pub fn bin6(&self) -> String {
        digits_to_string(&self.digits()[..6])
    }

    /// Returns the last four digits.
    #[inline]
    pub fn last_four(&self) -> String {
        let len = self.length();
        digits_to_string(&self.digits[len - 4..len])
    }

    /// Returns the card number with first 6 and last 4 digits visible.
    ///
    /// Format: `402276******0001`. This is the only form that may appear
    /// in logs.
    #[inline]
    pub fn masked(&self) -> String {
        crate::mask::mask_with_bin(self)
    }

    /// Returns the full card number as a digit string.
    ///
    /// # Security Warning
    ///
    /// This is the transmission form sent to the gateway. Never log it;
    /// use `masked()` instead.
    #[inline]
    pub fn expose(&self) -> String {
        digits_to_string(self.digits())
    }

    #[inline]
    pub(crate) fn digits(&self) -> &[u8] {
        &self.digits[..self.digit_count as usize]
    }
}

fn digits_to_string(digits: &[u8]) -> String {
    digits.iter().map(|&d| (b'0' + d) as char).collect()
}

impl fmt::Debug for CardNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardNumber")
            .field("brand", &self.brand)
            .field("number", &self.masked())
            .field("length", &self.digit_count)
            .finish()
    }
}

impl fmt::Display for CardNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.brand, self.masked())
    }
}

impl Drop for CardNumber {
    fn drop(&mut self) {
        self.digits.zeroize();
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for CardNumber {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.expose())
    }
}
