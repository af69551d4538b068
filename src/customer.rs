//! Payer identity values: identity documents and mobile numbers.
//!
//! The gateway identifies payers with a Venezuelan identity document
//! (`V` national, `E` foreign, `J` legal entity) followed by 6-10 digits,
//! and mobile payments with a `58` country code plus a 10-digit number.

use std::fmt;

use crate::error::FormError;

/// Shortest accepted identity document number.
pub const MIN_DOCUMENT_DIGITS: usize = 6;

/// Longest accepted identity document number.
pub const MAX_DOCUMENT_DIGITS: usize = 10;

/// Venezuelan country calling code.
pub const COUNTRY_CODE: &str = "58";

/// Kind of identity document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DocumentKind {
    /// Venezuelan national.
    #[default]
    V,
    /// Foreign resident.
    E,
    /// Legal entity (RIF).
    J,
}

impl DocumentKind {
    /// Parses the one-letter prefix, case-insensitively.
    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'V' => Some(Self::V),
            'E' => Some(Self::E),
            'J' => Some(Self::J),
            _ => None,
        }
    }

    /// Returns the upper-case prefix letter.
    pub const fn letter(&self) -> char {
        match self {
            Self::V => 'V',
            Self::E => 'E',
            Self::J => 'J',
        }
    }
}

/// A validated identity document (`V12345678`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomerId {
    kind: DocumentKind,
    number: String,
}

impl CustomerId {
    /// Builds a customer id from the two form fields.
    ///
    /// The number must be 6-10 ASCII digits.
    ///
    /// # Example
    ///
    /// ```
    /// use payframe::customer::{CustomerId, DocumentKind};
    ///
    /// let id = CustomerId::new(DocumentKind::V, "8019884").unwrap();
    /// assert_eq!(id.compact(), "V8019884");
    /// assert!(CustomerId::new(DocumentKind::V, "12345").is_err());
    /// ```
    pub fn new(kind: DocumentKind, number: &str) -> Result<Self, FormError> {
        let number = number.trim();
        if number.is_empty() {
            return Err(FormError::MissingField("customerId"));
        }
        if let Some((position, character)) =
            number.chars().enumerate().find(|(_, c)| !c.is_ascii_digit())
        {
            return Err(FormError::InvalidCharacter {
                field: "customerId",
                position,
                character,
            });
        }
        if !(MIN_DOCUMENT_DIGITS..=MAX_DOCUMENT_DIGITS).contains(&number.len()) {
            return Err(FormError::CustomerIdLength {
                length: number.len(),
            });
        }
        Ok(Self {
            kind,
            number: number.to_string(),
        })
    }

    /// Parses a combined id such as `V8019884`, `v8019884` or `J-12345678`.
    ///
    /// # Example
    ///
    /// ```
    /// use payframe::customer::{CustomerId, DocumentKind};
    ///
    /// let id = CustomerId::parse("J-12345678").unwrap();
    /// assert_eq!(id.kind(), DocumentKind::J);
    /// assert_eq!(id.number(), "12345678");
    /// ```
    pub fn parse(input: &str) -> Result<Self, FormError> {
        let input = input.trim();
        let mut chars = input.chars();
        let kind = chars
            .next()
            .and_then(DocumentKind::from_letter)
            .ok_or_else(|| FormError::InvalidCustomerId(input.to_string()))?;
        let rest = chars.as_str();
        let rest = rest.strip_prefix('-').unwrap_or(rest);
        Self::new(kind, rest)
    }

    /// Splits a pre-filled id into form fields, never failing.
    ///
    /// Values that do not parse fall back to `V` with whatever digits the
    /// input contains, so a half-valid id from the host still pre-fills the
    /// form.
    pub fn prefill(input: &str) -> (DocumentKind, String) {
        let input = input.trim();
        let mut chars = input.chars();
        if let Some(kind) = chars.next().and_then(DocumentKind::from_letter) {
            let rest = chars.as_str();
            let rest = rest.strip_prefix('-').unwrap_or(rest);
            if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) {
                return (kind, rest.to_string());
            }
        }
        (
            DocumentKind::V,
            input.chars().filter(|c| c.is_ascii_digit()).collect(),
        )
    }

    /// Returns the document kind.
    pub const fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Returns the document digits.
    pub fn number(&self) -> &str {
        &self.number
    }

    /// `V8019884`, used by credit card and mobile payments.
    pub fn compact(&self) -> String {
        format!("{}{}", self.kind.letter(), self.number)
    }

    /// `v8019884`, used by debit card payments.
    pub fn lowercase(&self) -> String {
        self.compact().to_lowercase()
    }

    /// `V-8019884`, used by transfer searches.
    pub fn hyphenated(&self) -> String {
        format!("{}-{}", self.kind.letter(), self.number)
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.letter(), self.number)
    }
}

/// A Venezuelan mobile number in `58XXXXXXXXXX` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MobileNumber(String);

impl MobileNumber {
    /// Parses a mobile number entered in a form.
    ///
    /// Non-digits are stripped. A bare 10-digit local number gets the `58`
    /// country code prepended. The result must be `58` plus 10 digits.
    ///
    /// # Example
    ///
    /// ```
    /// use payframe::customer::MobileNumber;
    ///
    /// let n = MobileNumber::parse("+58 414-259-1177", "originMobile").unwrap();
    /// assert_eq!(n.as_str(), "584142591177");
    ///
    /// let n = MobileNumber::parse("4142591177", "originMobile").unwrap();
    /// assert_eq!(n.as_str(), "584142591177");
    /// ```
    pub fn parse(input: &str, field: &'static str) -> Result<Self, FormError> {
        let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return Err(FormError::MissingField(field));
        }

        let full = if digits.len() == 10 && !digits.starts_with(COUNTRY_CODE) {
            format!("{}{}", COUNTRY_CODE, digits)
        } else {
            digits
        };

        if full.len() != 12 || !full.starts_with(COUNTRY_CODE) {
            return Err(FormError::MobileNumber { field });
        }
        Ok(Self(full))
    }

    /// Parses a number that must already be in `58XXXXXXXXXX` form.
    ///
    /// Used by the search forms, which take the international number as-is.
    pub fn parse_international(input: &str, field: &'static str) -> Result<Self, FormError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(FormError::MissingField(field));
        }
        if input.len() != 12
            || !input.starts_with(COUNTRY_CODE)
            || !input.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(FormError::MobileNumber { field });
        }
        Ok(Self(input.to_string()))
    }

    /// Returns the number as sent to the gateway.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MobileNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
