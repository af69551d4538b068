//! Card expiry date normalization.
//!
//! The payment forms take the expiry as it is printed on the gateway's
//! contract: year first, `YYYYMM`. From those six canonical digits two
//! renderings are derived:
//!
//! - **Wire format** `YYYY/MM`, sent to the gateway
//! - **Short format** `MM/YY`, shown on the card-face preview
//!
//! The string helpers never fail. When the input does not clean to exactly
//! six digits they hand it back unchanged, and the submission flow rejects
//! it with [`is_wire_format`].
//!
//! # Example
//!
//! ```
//! use payframe::expiry::{to_short_year, to_wire_format, is_wire_format};
//!
//! assert_eq!(to_wire_format("202710"), "2027/10");
//! assert_eq!(to_short_year("202710"), "10/27");
//!
//! // Wrong digit count: unchanged, caught by the wire check
//! assert_eq!(to_wire_format("20271"), "20271");
//! assert!(!is_wire_format("20271"));
//! ```

use std::fmt;

/// Number of canonical expiry digits (`YYYYMM`).
pub const CANONICAL_DIGITS: usize = 6;

/// Placeholder shown on the card face before any expiry digit is typed.
pub const CARD_FACE_PLACEHOLDER: &str = "••/••";

/// An expiry date parsed from its canonical `YYYYMM` digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExpiryDate {
    /// Four-digit year (e.g., 2027)
    year: u16,
    /// Month (1-12)
    month: u8,
}

impl ExpiryDate {
    /// Creates a new expiry date.
    ///
    /// Returns `None` if the month is not 1-12 or the year has more than
    /// four digits.
    pub fn new(year: u16, month: u8) -> Option<Self> {
        if !(1..=12).contains(&month) || year > 9999 {
            return None;
        }
        Some(Self { year, month })
    }

    /// Parses the canonical `YYYYMM` form.
    ///
    /// Separators are ignored, so `"2027/10"` and `"202710"` both parse.
    ///
    /// # Example
    ///
    /// ```
    /// use payframe::expiry::{ExpiryDate, ExpiryError};
    ///
    /// let exp = ExpiryDate::from_canonical("2027/10").unwrap();
    /// assert_eq!((exp.year(), exp.month()), (2027, 10));
    ///
    /// assert_eq!(ExpiryDate::from_canonical("202713"), Err(ExpiryError::InvalidMonth(13)));
    /// ```
    pub fn from_canonical(input: &str) -> Result<Self, ExpiryError> {
        let digits = canonical_digits(input).ok_or(ExpiryError::InvalidFormat {
            digits: input.chars().filter(|c| c.is_ascii_digit()).count(),
        })?;

        let year = digits[..4]
            .iter()
            .fold(0u16, |acc, &d| acc * 10 + (d - b'0') as u16);
        let month = (digits[4] - b'0') * 10 + (digits[5] - b'0');

        Self::new(year, month).ok_or(ExpiryError::InvalidMonth(month))
    }

    /// Returns the four-digit year.
    #[inline]
    pub const fn year(&self) -> u16 {
        self.year
    }

    /// Returns the month (1-12).
    #[inline]
    pub const fn month(&self) -> u8 {
        self.month
    }

    /// Formats as `YYYY/MM`, the gateway wire format.
    pub fn wire(&self) -> String {
        format!("{:04}/{:02}", self.year, self.month)
    }

    /// Formats as `MM/YY`, the card-face format.
    pub fn short(&self) -> String {
        format!("{:02}/{:02}", self.month, self.year % 100)
    }
}

impl fmt::Display for ExpiryDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}/{:02}", self.year, self.month)
    }
}

/// Errors from typed expiry parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpiryError {
    /// The input did not clean to exactly six digits.
    InvalidFormat {
        /// Number of digits found.
        digits: usize,
    },
    /// Month is out of range (must be 1-12).
    InvalidMonth(u8),
}

impl fmt::Display for ExpiryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat { digits } => write!(
                f,
                "invalid expiry format: expected YYYYMM (6 digits), got {} digits",
                digits
            ),
            Self::InvalidMonth(m) => write!(f, "invalid month {}: must be 1-12", m),
        }
    }
}

impl std::error::Error for ExpiryError {}

/// Returns the six canonical ASCII digits, or `None` on a wrong count.
fn canonical_digits(input: &str) -> Option<[u8; CANONICAL_DIGITS]> {
    let mut out = [0u8; CANONICAL_DIGITS];
    let mut count = 0;
    for b in input.bytes().filter(u8::is_ascii_digit) {
        if count == CANONICAL_DIGITS {
            return None;
        }
        out[count] = b;
        count += 1;
    }
    (count == CANONICAL_DIGITS).then_some(out)
}

/// Converts typed `YYYYMM` digits into the `YYYY/MM` wire format.
///
/// Returns the input unchanged when it does not contain exactly six digits.
/// The month is not range-checked here; use [`ExpiryDate::from_canonical`]
/// for that.
pub fn to_wire_format(input: &str) -> String {
    match canonical_digits(input) {
        Some(d) => {
            let mut out = String::with_capacity(7);
            out.extend(d[..4].iter().map(|&b| b as char));
            out.push('/');
            out.extend(d[4..].iter().map(|&b| b as char));
            out
        }
        None => input.to_string(),
    }
}

/// Converts typed `YYYYMM` digits into the `MM/YY` card-face format.
///
/// Month comes from digits 4-5 and the short year from digits 2-3. Returns
/// the input unchanged when it does not contain exactly six digits.
pub fn to_short_year(input: &str) -> String {
    match canonical_digits(input) {
        Some(d) => {
            let mut out = String::with_capacity(5);
            out.extend(d[4..6].iter().map(|&b| b as char));
            out.push('/');
            out.extend(d[2..4].iter().map(|&b| b as char));
            out
        }
        None => input.to_string(),
    }
}

/// Formats the expiry field as the user types.
///
/// Keeps at most six digits and inserts `/` after the year once a fifth
/// digit exists.
///
/// # Example
///
/// ```
/// use payframe::expiry::format_expiry_input;
///
/// assert_eq!(format_expiry_input("2027"), "2027");
/// assert_eq!(format_expiry_input("20271"), "2027/1");
/// assert_eq!(format_expiry_input("2027109"), "2027/10");
/// ```
pub fn format_expiry_input(input: &str) -> String {
    let digits: String = input
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(CANONICAL_DIGITS)
        .collect();

    if digits.len() > 4 {
        format!("{}/{}", &digits[..4], &digits[4..])
    } else {
        digits
    }
}

/// Returns true if `s` is exactly four digits, `/`, two digits.
///
/// This is the check the submission flow applies before sending a payment.
pub fn is_wire_format(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 7
        && b[..4].iter().all(u8::is_ascii_digit)
        && b[4] == b'/'
        && b[5..].iter().all(u8::is_ascii_digit)
}

/// Renders the expiry shown on the card-face preview.
///
/// Six or more digits render as `MM/YY` from the first six. Fewer digits
/// are padded with `•` and split after the second character, mirroring what
/// has been typed so far.
///
/// # Example
///
/// ```
/// use payframe::expiry::card_face_expiry;
///
/// assert_eq!(card_face_expiry("202710"), "10/27");
/// assert_eq!(card_face_expiry(""), "••/••");
/// assert_eq!(card_face_expiry("20"), "20/••");
/// ```
pub fn card_face_expiry(input: &str) -> String {
    let digits: String = input
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(CANONICAL_DIGITS)
        .collect();
    if digits.len() == CANONICAL_DIGITS {
        return to_short_year(&digits);
    }

    let mut chars: Vec<char> = digits.chars().take(4).collect();
    chars.resize(4, '•');

    let mut out: String = chars[..2].iter().collect();
    out.push('/');
    out.extend(&chars[2..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_wire_format() {
        assert_eq!(to_wire_format("202710"), "2027/10");
        assert_eq!(to_wire_format("2027/10"), "2027/10");
        assert_eq!(to_wire_format(" 2027 10 "), "2027/10");
    }

    #[test]
    fn test_to_wire_format_bad_length() {
        assert_eq!(to_wire_format("20271"), "20271");
        assert_eq!(to_wire_format("2027101"), "2027101");
        assert_eq!(to_wire_format(""), "");
        assert_eq!(to_wire_format("abc"), "abc");
    }

    #[test]
    fn test_to_short_year() {
        assert_eq!(to_short_year("202710"), "10/27");
        assert_eq!(to_short_year("2030/01"), "01/30");
        assert_eq!(to_short_year("2030"), "2030");
    }

    #[test]
    fn test_forms_share_canonical_digits() {
        let exp = ExpiryDate::from_canonical("202710").unwrap();
        assert_eq!(exp.wire(), to_wire_format("202710"));
        assert_eq!(exp.short(), to_short_year("202710"));
        assert_eq!(exp.to_string(), "2027/10");
    }

    #[test]
    fn test_from_canonical_errors() {
        assert_eq!(
            ExpiryDate::from_canonical("20271"),
            Err(ExpiryError::InvalidFormat { digits: 5 })
        );
        assert_eq!(
            ExpiryDate::from_canonical("202700"),
            Err(ExpiryError::InvalidMonth(0))
        );
        assert_eq!(
            ExpiryDate::from_canonical("202799"),
            Err(ExpiryError::InvalidMonth(99))
        );
    }

    #[test]
    fn test_expiry_date_new() {
        assert!(ExpiryDate::new(2027, 1).is_some());
        assert!(ExpiryDate::new(2027, 12).is_some());
        assert!(ExpiryDate::new(2027, 0).is_none());
        assert!(ExpiryDate::new(2027, 13).is_none());
    }

    #[test]
    fn test_format_expiry_input() {
        assert_eq!(format_expiry_input(""), "");
        assert_eq!(format_expiry_input("2"), "2");
        assert_eq!(format_expiry_input("2027"), "2027");
        assert_eq!(format_expiry_input("202710"), "2027/10");
        assert_eq!(format_expiry_input("2027/10"), "2027/10");
    }

    #[test]
    fn test_is_wire_format() {
        assert!(is_wire_format("2027/10"));
        assert!(!is_wire_format("202710"));
        assert!(!is_wire_format("10/27"));
        assert!(!is_wire_format("2027/1"));
        assert!(!is_wire_format("2027-10"));
        assert!(!is_wire_format("2027/100"));
    }

    #[test]
    fn test_card_face_expiry() {
        assert_eq!(card_face_expiry(""), CARD_FACE_PLACEHOLDER);
        assert_eq!(card_face_expiry("2"), "2•/••");
        assert_eq!(card_face_expiry("2027"), "20/27");
        assert_eq!(card_face_expiry("2027/10"), "10/27");
        assert_eq!(card_face_expiry("2027101"), "10/27");
        assert_eq!(card_face_expiry("20271099"), "10/27");
    }
}
