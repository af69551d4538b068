//! Property-based tests using proptest.
//!
//! These tests verify invariants that should hold for all inputs,
//! helping discover edge cases that manual tests might miss.

use payframe::{
    customer::CustomerId,
    expiry, format, identify_brand, mask,
    rules::{BinTable, ZINLI_BINS},
    CardBrand, CardNumber,
};
use proptest::prelude::*;

// =============================================================================
// STRATEGIES
// =============================================================================

/// Generates a random digit string of a given length.
fn digit_string(len: usize) -> impl Strategy<Value = String> {
    proptest::collection::vec(prop::char::range('0', '9'), len)
        .prop_map(|chars| chars.into_iter().collect())
}

/// Generates a random digit string of a length within range.
fn digit_string_range(range: std::ops::RangeInclusive<usize>) -> impl Strategy<Value = String> {
    range.prop_flat_map(digit_string)
}

/// Generates a string with separators (spaces, dashes) mixed in.
fn with_separators(digits: String) -> impl Strategy<Value = String> {
    let len = digits.len();
    proptest::collection::vec(
        prop_oneof![Just(""), Just(" "), Just("-"), Just("  "), Just(" - ")],
        len + 1,
    )
    .prop_map(move |seps| {
        let mut result = String::new();
        for (i, c) in digits.chars().enumerate() {
            result.push_str(seps.get(i).copied().unwrap_or(""));
            result.push(c);
        }
        result.push_str(seps.last().copied().unwrap_or(""));
        result
    })
}

/// Generates a card number starting with one of the Zinli BINs.
fn zinli_card() -> impl Strategy<Value = String> {
    (prop::sample::select(ZINLI_BINS.to_vec()), digit_string_range(7..=13))
        .prop_map(|(bin, rest)| format!("{}{}", bin, rest))
}

// =============================================================================
// BRAND IDENTIFICATION PROPERTIES
// =============================================================================

proptest! {
    /// Property: Identification never panics, whatever the input.
    #[test]
    fn identify_never_panics(input in ".*") {
        let _ = identify_brand(&input);
    }

    /// Property: Identification is deterministic.
    #[test]
    fn identify_is_deterministic(input in "[0-9 -]{0,24}") {
        prop_assert_eq!(identify_brand(&input), identify_brand(&input));
    }

    /// Property: Separators never change the brand.
    #[test]
    fn separators_do_not_change_brand(
        spaced in digit_string_range(0..=19).prop_flat_map(with_separators)
    ) {
        let digits = format::clean_for_transmission(&spaced);
        prop_assert_eq!(identify_brand(&spaced), identify_brand(&digits));
    }

    /// Property: Any card on a Zinli BIN is Zinli, never Visa.
    #[test]
    fn zinli_bins_take_precedence(card in zinli_card()) {
        prop_assert_eq!(identify_brand(&card), CardBrand::Zinli);
    }

    /// Property: Every other card starting with 4 is Visa.
    #[test]
    fn other_fours_are_visa(rest in digit_string_range(5..=15)) {
        let card = format!("4{}", rest);
        prop_assume!(!ZINLI_BINS.iter().any(|bin| card.starts_with(bin)));
        prop_assert_eq!(identify_brand(&card), CardBrand::Visa);
    }

    /// Property: 51-55 is always Mastercard.
    #[test]
    fn mastercard_51_to_55(second in 1u8..=5, rest in digit_string_range(0..=14)) {
        let card = format!("5{}{}", second, rest);
        prop_assert_eq!(identify_brand(&card), CardBrand::Mastercard);
    }

    /// Property: 2221-2720 is always Mastercard.
    #[test]
    fn mastercard_2_series(prefix in 2221u32..=2720, rest in digit_string_range(0..=12)) {
        let card = format!("{}{}", prefix, rest);
        prop_assert_eq!(identify_brand(&card), CardBrand::Mastercard);
    }

    /// Property: Prefixes outside every rule are Unknown.
    #[test]
    fn unmatched_prefixes_are_unknown(
        first in prop_oneof![Just('0'), Just('1'), Just('3'), Just('6'), Just('7'), Just('8'), Just('9')],
        rest in digit_string_range(0..=15)
    ) {
        let card = format!("{}{}", first, rest);
        prop_assert_eq!(identify_brand(&card), CardBrand::Unknown);
    }

    /// Property: The standard table agrees with the free function.
    #[test]
    fn standard_table_matches_identify(input in digit_string_range(0..=19)) {
        prop_assert_eq!(BinTable::standard().identify(&input), identify_brand(&input));
    }
}

// =============================================================================
// FORMATTING PROPERTIES
// =============================================================================

proptest! {
    /// Property: Display form is idempotent.
    #[test]
    fn display_is_idempotent(input in ".{0,40}") {
        let once = format::format_for_display(&input);
        prop_assert_eq!(format::format_for_display(&once), once);
    }

    /// Property: Display form keeps at most 16 digits in groups of at most 4.
    #[test]
    fn display_shape(input in digit_string_range(0..=30)) {
        let shown = format::format_for_display(&input);
        let digits = format::clean_for_transmission(&shown);

        prop_assert_eq!(digits.len(), input.len().min(16));
        prop_assert!(input.starts_with(&digits));
        prop_assert!(shown.split(' ').all(|group| group.len() <= 4));
        prop_assert!(!shown.starts_with(' ') && !shown.ends_with(' '));
    }

    /// Property: Transmission form keeps every digit, in order.
    #[test]
    fn clean_keeps_all_digits(spaced in digit_string_range(0..=24).prop_flat_map(with_separators)) {
        let clean = format::clean_for_transmission(&spaced);
        let expected: String = spaced.chars().filter(|c| c.is_ascii_digit()).collect();
        prop_assert_eq!(clean, expected);
    }

    /// Property: Display groups rejoin into the display form.
    #[test]
    fn groups_rejoin(input in digit_string_range(0..=20)) {
        prop_assert_eq!(
            format::split_groups(&input).join(" "),
            format::format_for_display(&input)
        );
    }
}

// =============================================================================
// EXPIRY PROPERTIES
// =============================================================================

proptest! {
    /// Property: Wire and short forms are built from the same digits.
    #[test]
    fn wire_and_short_agree(input in digit_string(6)) {
        let wire = expiry::to_wire_format(&input);
        let short = expiry::to_short_year(&input);

        prop_assert!(expiry::is_wire_format(&wire));
        prop_assert_eq!(&wire[..4], &input[..4]);
        prop_assert_eq!(&wire[5..], &input[4..]);
        prop_assert_eq!(&short[..2], &input[4..]);
        prop_assert_eq!(&short[3..], &input[2..4]);
    }

    /// Property: Inputs without exactly six digits come back unchanged.
    #[test]
    fn non_six_digit_input_unchanged(
        input in prop_oneof![digit_string_range(0..=5), digit_string_range(7..=12)]
    ) {
        prop_assert_eq!(expiry::to_wire_format(&input), input.clone());
        prop_assert_eq!(expiry::to_short_year(&input), input);
    }

    /// Property: Valid months parse back to the same date.
    #[test]
    fn valid_months_parse(year in 2000u16..=2099, month in 1u8..=12) {
        let typed = format!("{:04}{:02}", year, month);
        let exp = expiry::ExpiryDate::from_canonical(&expiry::to_wire_format(&typed)).unwrap();
        prop_assert_eq!(exp.year(), year);
        prop_assert_eq!(exp.month(), month);
        prop_assert_eq!(exp.wire(), expiry::to_wire_format(&typed));
        prop_assert_eq!(exp.short(), expiry::to_short_year(&typed));
    }

    /// Property: Months outside 01-12 are rejected.
    #[test]
    fn invalid_months_rejected(year in 2000u16..=2099, month in prop_oneof![Just(0u8), 13u8..=99]) {
        let typed = format!("{:04}{:02}", year, month);
        prop_assert!(expiry::ExpiryDate::from_canonical(&typed).is_err());
    }

    /// Property: Typing never yields more than six digits.
    #[test]
    fn expiry_input_capped(input in ".{0,20}") {
        let typed = expiry::format_expiry_input(&input);
        prop_assert!(typed.chars().filter(|c| c.is_ascii_digit()).count() <= 6);
    }
}

// =============================================================================
// CARD NUMBER AND MASKING PROPERTIES
// =============================================================================

proptest! {
    /// Property: Valid-length numbers parse and expose the same digits.
    #[test]
    fn card_parse_round_trip(digits in digit_string_range(13..=19)) {
        let card = CardNumber::parse(&digits).unwrap();
        prop_assert_eq!(card.length(), digits.len());
        prop_assert_eq!(card.expose(), digits.clone());
        prop_assert_eq!(card.brand(), identify_brand(&digits));
    }

    /// Property: Out-of-range lengths are rejected.
    #[test]
    fn card_bad_length_rejected(
        digits in prop_oneof![digit_string_range(1..=12), digit_string_range(20..=25)]
    ) {
        prop_assert!(CardNumber::parse(&digits).is_err());
    }

    /// Property: Masks keep the length and show at most 10 digits.
    #[test]
    fn mask_never_reveals_middle(digits in digit_string_range(13..=19)) {
        let masked = mask::mask_string(&digits);
        prop_assert_eq!(masked.len(), digits.len());
        prop_assert_eq!(&masked[..6], &digits[..6]);
        prop_assert_eq!(&masked[masked.len() - 4..], &digits[digits.len() - 4..]);
        prop_assert!(masked[6..masked.len() - 4].chars().all(|c| c == '*'));
    }

    /// Property: Debug and Display never contain the full number.
    #[test]
    fn card_rendering_is_masked(digits in digit_string_range(13..=19)) {
        let card = CardNumber::parse(&digits).unwrap();
        let debug = format!("{:?}", card);
        let display = card.to_string();
        prop_assert!(!debug.contains(&digits));
        prop_assert!(!display.contains(&digits));
    }
}

// =============================================================================
// CUSTOMER ID PROPERTIES
// =============================================================================

proptest! {
    /// Property: Every rendering carries the same digits.
    #[test]
    fn customer_renderings_agree(
        letter in prop_oneof![Just('V'), Just('E'), Just('J'), Just('v'), Just('e'), Just('j')],
        number in digit_string_range(6..=10)
    ) {
        let id = CustomerId::parse(&format!("{}{}", letter, number)).unwrap();
        let upper = letter.to_ascii_uppercase();

        prop_assert_eq!(id.compact(), format!("{}{}", upper, number));
        prop_assert_eq!(id.hyphenated(), format!("{}-{}", upper, number));
        prop_assert_eq!(id.lowercase(), format!("{}{}", letter.to_ascii_lowercase(), number));
    }

    /// Property: Prefill never panics.
    #[test]
    fn prefill_never_panics(input in ".{0,20}") {
        let _ = CustomerId::prefill(&input);
    }
}
