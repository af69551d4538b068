//! Card number formatting utilities.
//!
//! Display and transmission are separate concerns:
//!
//! - **Display**: digits grouped by four, capped at 16 digits. The cap is a
//!   UI constraint of the input field, not a validation rule.
//! - **Transmission**: every non-digit stripped, no length cap.
//!
//! # Example
//!
//! ```
//! use payframe::format::{clean_for_transmission, format_for_display};
//!
//! assert_eq!(format_for_display("4111111111111111"), "4111 1111 1111 1111");
//! assert_eq!(clean_for_transmission("4111 1111 1111 1111"), "4111111111111111");
//! ```

/// Number of digits kept by the display formatter.
pub const DISPLAY_DIGIT_CAP: usize = 16;

/// Digits per display group.
pub const GROUP_SIZE: usize = 4;

/// Placeholder shown on the card face before any digit is typed.
pub const CARD_FACE_PLACEHOLDER: &str = "•••• •••• •••• ••••";

/// Formats a card number for display in the form field.
///
/// Non-digits are stripped, the result is truncated to 16 digits and then
/// grouped in blocks of four separated by a single space.
///
/// # Example
///
/// ```
/// use payframe::format::format_for_display;
///
/// assert_eq!(format_for_display("41111"), "4111 1");
/// assert_eq!(format_for_display("4111-1111-1111-1111-999"), "4111 1111 1111 1111");
/// assert_eq!(format_for_display(""), "");
/// ```
pub fn format_for_display(input: &str) -> String {
    let digits: Vec<char> = input
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(DISPLAY_DIGIT_CAP)
        .collect();

    let mut result = String::with_capacity(digits.len() + digits.len() / GROUP_SIZE);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && i % GROUP_SIZE == 0 {
            result.push(' ');
        }
        result.push(*c);
    }
    result
}

/// Strips all formatting from a card number, leaving only digits.
///
/// No length cap is applied: some schemes use more than 16 digits.
///
/// # Example
///
/// ```
/// use payframe::format::clean_for_transmission;
///
/// assert_eq!(clean_for_transmission("4111 1111 1111 1111"), "4111111111111111");
/// assert_eq!(clean_for_transmission("6011-0009-9013-9424-123"), "6011000990139424123");
/// ```
pub fn clean_for_transmission(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Splits the display form into its digit groups.
///
/// # Example
///
/// ```
/// use payframe::format::split_groups;
///
/// assert_eq!(split_groups("4111111111"), vec!["4111", "1111", "11"]);
/// ```
pub fn split_groups(input: &str) -> Vec<String> {
    let digits: Vec<char> = input
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(DISPLAY_DIGIT_CAP)
        .collect();

    digits
        .chunks(GROUP_SIZE)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Renders the number shown on the card-face preview.
///
/// Unlike the form field, the card face is not capped: it shows every typed
/// digit. Empty input renders the placeholder.
pub fn card_face_number(input: &str) -> String {
    let digits = clean_for_transmission(input);
    if digits.is_empty() {
        return CARD_FACE_PLACEHOLDER.to_string();
    }

    let chars: Vec<char> = digits.chars().collect();
    chars
        .chunks(GROUP_SIZE)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}
