//! PCI-DSS compliant masking utilities.
//!
//! Card numbers may only leave the request path in masked form:
//!
//! - First 6 (BIN) and last 4 digits, for logs and request summaries
//! - Last 4 digits only, for customer-facing display
//!
//! Never display or log the full card number.

use crate::CardNumber;

/// Masks a card number showing the BIN (first 6) and last 4 digits.
///
/// Format: `402276******0001`
///
/// # Example
///
/// ```
/// use payframe::CardNumber;
///
/// let card = CardNumber::parse("4111-1111-1111-1111").unwrap();
/// assert_eq!(card.masked(), "411111******1111");
/// ```
#[inline]
pub fn mask_with_bin(card: &CardNumber) -> String {
    mask_digits(card.digits().iter().map(|&d| (b'0' + d) as char).collect())
}

/// Masks a raw card number string, keeping the first 6 and last 4 digits.
///
/// Non-digits are stripped first. Inputs of 10 digits or fewer are fully
/// masked, since showing 6 + 4 would reveal the whole number.
///
/// # Example
///
/// ```
/// use payframe::mask::mask_string;
///
/// assert_eq!(mask_string("4022 7600 0000 0001"), "402276******0001");
/// assert_eq!(mask_string("1234"), "****");
/// ```
#[inline]
pub fn mask_string(input: &str) -> String {
    mask_digits(input.chars().filter(|c| c.is_ascii_digit()).collect())
}

fn mask_digits(digits: Vec<char>) -> String {
    let len = digits.len();
    if len <= 10 {
        return "*".repeat(len);
    }

    let mut result = String::with_capacity(len);
    result.extend(&digits[..6]);
    for _ in 0..len - 10 {
        result.push('*');
    }
    result.extend(&digits[len - 4..]);
    result
}

/// Masks everything but the last 4 digits, grouped like the display form.
///
/// Format: `**** **** **** 0001`
#[inline]
pub fn mask_last_four(input: &str) -> String {
    let digits: Vec<char> = input.chars().filter(|c| c.is_ascii_digit()).collect();
    let len = digits.len();
    if len <= 4 {
        return "*".repeat(len);
    }

    let mut result = String::with_capacity(len + len / 4);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && i % 4 == 0 {
            result.push(' ');
        }
        result.push(if i < len - 4 { '*' } else { *c });
    }
    result
}

/// Masks a secret for debug output, keeping only the first `keep` characters.
///
/// Used for the encrypted gateway credentials in request summaries.
#[inline]
pub fn truncate_secret(secret: &str, keep: usize) -> String {
    let visible: String = secret.chars().take(keep).collect();
    if visible.len() == secret.len() {
        visible
    } else {
        format!("{}...", visible)
    }
}
