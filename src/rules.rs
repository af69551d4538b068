//! BIN rule tables for card brand identification.
//!
//! A [`BinTable`] is an immutable list of [`BrandRule`]s kept in ascending
//! priority order. Identification walks the table and returns the brand of
//! the first rule whose [`BinMatcher`] accepts the card digits.
//!
//! Niche brands whose BINs sit inside a broader range (Zinli prepaid cards
//! are issued on Visa `4xxxxx` BINs) must carry a lower priority value than
//! the broad rule, otherwise they are unreachable.
//!
//! # Standard table
//!
//! | Priority | Brand | Matcher |
//! |----------|-------|---------|
//! | 0 | Zinli | `402276`, `402277`, `410787`, `422052`, `455587`, `476130` |
//! | 10 | Mastercard | 51-55 |
//! | 10 | Mastercard | 2221-2720 |
//! | 20 | Visa | 4 |
//!
//! # Loading a partner table
//!
//! With the `bin-json` feature, a table can be read from JSON:
//!
//! ```json
//! [
//!   { "brand": "zinli", "priority": 0, "prefixes": ["402276", "402277"] },
//!   { "brand": "mastercard", "priority": 10, "range": { "width": 2, "low": 51, "high": 55 } },
//!   { "brand": "visa", "priority": 20, "prefixes": ["4"] }
//! ]
//! ```

use std::sync::OnceLock;

use crate::error::TableError;
use crate::CardBrand;

/// Longest prefix a rule may inspect.
pub const MAX_PREFIX_DIGITS: usize = 8;

/// Enumerated Zinli BINs in the standard table.
pub const ZINLI_BINS: [&str; 6] = ["402276", "402277", "410787", "422052", "455587", "476130"];

/// Predicate over the leading digits of a card number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinMatcher {
    /// Matches when the card starts with any of the listed digit prefixes.
    Prefixes(Vec<Vec<u8>>),
    /// Matches when the number formed by the first `width` digits lies in
    /// `low..=high`. Cards shorter than `width` never match.
    Range {
        /// Number of leading digits inspected.
        width: usize,
        /// Inclusive lower bound.
        low: u32,
        /// Inclusive upper bound.
        high: u32,
    },
}

impl BinMatcher {
    /// Builds a prefix matcher from digit strings.
    pub fn prefixes<I, S>(prefixes: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = Vec::new();
        for prefix in prefixes {
            let prefix = prefix.as_ref();
            let valid = !prefix.is_empty()
                && prefix.len() <= MAX_PREFIX_DIGITS
                && prefix.bytes().all(|b| b.is_ascii_digit());
            if !valid {
                return Err(TableError::InvalidPrefix(prefix.to_string()));
            }
            parsed.push(prefix.bytes().map(|b| b - b'0').collect());
        }
        let matcher = Self::Prefixes(parsed);
        matcher.validate()?;
        Ok(matcher)
    }

    /// Builds a range matcher over the first `width` digits.
    pub fn range(width: usize, low: u32, high: u32) -> Result<Self, TableError> {
        let matcher = Self::Range { width, low, high };
        matcher.validate()?;
        Ok(matcher)
    }

    /// Checks the matcher against the limits enforced by its constructors.
    ///
    /// Prefixes must be 1 to [`MAX_PREFIX_DIGITS`] digits with values 0-9.
    /// Ranges must be 1 to [`MAX_PREFIX_DIGITS`] wide with `low <= high`
    /// and `high` representable in `width` digits.
    pub fn validate(&self) -> Result<(), TableError> {
        match self {
            Self::Prefixes(prefixes) => {
                if prefixes.is_empty() {
                    return Err(TableError::InvalidPrefix(String::new()));
                }
                for prefix in prefixes {
                    let valid = !prefix.is_empty()
                        && prefix.len() <= MAX_PREFIX_DIGITS
                        && prefix.iter().all(|&d| d <= 9);
                    if !valid {
                        let text = prefix
                            .iter()
                            .map(|&d| if d <= 9 { char::from(b'0' + d) } else { '?' })
                            .collect();
                        return Err(TableError::InvalidPrefix(text));
                    }
                }
                Ok(())
            }
            &Self::Range { width, low, high } => {
                let invalid = TableError::InvalidRange { width, low, high };
                if width == 0 || width > MAX_PREFIX_DIGITS || low > high {
                    return Err(invalid);
                }
                if high >= 10u32.pow(width as u32) {
                    return Err(invalid);
                }
                Ok(())
            }
        }
    }

    /// Returns true if the digits satisfy this matcher.
    pub fn matches(&self, digits: &[u8]) -> bool {
        match self {
            Self::Prefixes(prefixes) => prefixes.iter().any(|p| digits.starts_with(p)),
            Self::Range { width, low, high } => {
                if digits.len() < *width {
                    return false;
                }
                let value = digits[..*width].iter().try_fold(0u64, |acc, &d| {
                    acc.checked_mul(10)?.checked_add(u64::from(d))
                });
                value.is_some_and(|v| (u64::from(*low)..=u64::from(*high)).contains(&v))
            }
        }
    }
}

/// One brand identification rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandRule {
    /// Brand reported when the rule matches.
    pub brand: CardBrand,
    /// Lower values are checked first.
    pub priority: u16,
    /// Digit predicate.
    pub matcher: BinMatcher,
}

/// Immutable, priority-ordered set of brand rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinTable {
    rules: Vec<BrandRule>,
}

impl BinTable {
    /// Returns the process-wide standard table.
    pub fn standard() -> &'static BinTable {
        static STANDARD: OnceLock<BinTable> = OnceLock::new();
        STANDARD.get_or_init(|| BinTable {
            rules: vec![
                BrandRule {
                    brand: CardBrand::Zinli,
                    priority: 0,
                    matcher: BinMatcher::Prefixes(
                        ZINLI_BINS
                            .iter()
                            .map(|bin| bin.bytes().map(|b| b - b'0').collect())
                            .collect(),
                    ),
                },
                BrandRule {
                    brand: CardBrand::Mastercard,
                    priority: 10,
                    matcher: BinMatcher::Range { width: 2, low: 51, high: 55 },
                },
                BrandRule {
                    brand: CardBrand::Mastercard,
                    priority: 10,
                    matcher: BinMatcher::Range { width: 4, low: 2221, high: 2720 },
                },
                BrandRule {
                    brand: CardBrand::Visa,
                    priority: 20,
                    matcher: BinMatcher::Prefixes(vec![vec![4]]),
                },
            ],
        })
    }

    /// Starts an empty table builder.
    pub fn builder() -> BinTableBuilder {
        BinTableBuilder::default()
    }

    /// Returns the rules in evaluation order.
    pub fn rules(&self) -> &[BrandRule] {
        &self.rules
    }

    /// Identifies the brand of an already-cleaned digit slice (values 0-9).
    ///
    /// Returns `CardBrand::Unknown` for empty input or when no rule matches.
    pub fn identify_digits(&self, digits: &[u8]) -> CardBrand {
        if digits.is_empty() {
            return CardBrand::Unknown;
        }
        self.rules
            .iter()
            .find(|rule| rule.matcher.matches(digits))
            .map(|rule| rule.brand)
            .unwrap_or(CardBrand::Unknown)
    }

    /// Identifies the brand of a raw input string.
    ///
    /// Every non-digit character is ignored.
    pub fn identify(&self, input: &str) -> CardBrand {
        let digits: Vec<u8> = input
            .chars()
            .filter(|c| c.is_ascii_digit())
            .take(MAX_PREFIX_DIGITS)
            .map(|c| c as u8 - b'0')
            .collect();
        self.identify_digits(&digits)
    }
}

/// Builder for [`BinTable`].
#[derive(Debug, Default)]
pub struct BinTableBuilder {
    rules: Vec<BrandRule>,
}

impl BinTableBuilder {
    /// Adds a rule.
    pub fn rule(mut self, brand: CardBrand, priority: u16, matcher: BinMatcher) -> Self {
        self.rules.push(BrandRule {
            brand,
            priority,
            matcher,
        });
        self
    }

    /// Validates the rules and freezes them into a table.
    ///
    /// Every matcher is rechecked, including ones built directly from the
    /// enum variants. Rules with equal priority keep the order they were
    /// added in.
    pub fn build(mut self) -> Result<BinTable, TableError> {
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.brand == CardBrand::Unknown {
                return Err(TableError::UnknownBrandRule { index });
            }
            rule.matcher.validate()?;
        }
        self.rules.sort_by_key(|rule| rule.priority);
        Ok(BinTable { rules: self.rules })
    }
}

#[cfg(feature = "bin-json")]
mod json {
    use super::{BinMatcher, BinTable, TableError};
    use crate::CardBrand;
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(rename_all = "snake_case")]
    enum JsonMatcher {
        Prefixes(Vec<String>),
        Range { width: usize, low: u32, high: u32 },
    }

    #[derive(Deserialize)]
    struct JsonRule {
        brand: CardBrand,
        #[serde(default)]
        priority: u16,
        #[serde(flatten)]
        matcher: JsonMatcher,
    }

    impl BinTable {
        /// Loads a table from a JSON array of rules.
        ///
        /// # Example
        ///
        /// ```
        /// use payframe::{rules::BinTable, CardBrand};
        ///
        /// let table = BinTable::from_json(r#"[
        ///     { "brand": "zinli", "priority": 0, "prefixes": ["400000"] },
        ///     { "brand": "visa", "priority": 5, "prefixes": ["4"] }
        /// ]"#).unwrap();
        ///
        /// assert_eq!(table.identify("4000001234567890"), CardBrand::Zinli);
        /// assert_eq!(table.identify("4111111111111111"), CardBrand::Visa);
        /// ```
        pub fn from_json(json: &str) -> Result<BinTable, TableError> {
            let entries: Vec<JsonRule> = serde_json::from_str(json)
                .map_err(|e| TableError::Parse(format!("JSON parse error: {}", e)))?;

            let mut builder = BinTable::builder();
            for entry in entries {
                let matcher = match entry.matcher {
                    JsonMatcher::Prefixes(prefixes) => BinMatcher::prefixes(prefixes)?,
                    JsonMatcher::Range { width, low, high } => BinMatcher::range(width, low, high)?,
                };
                builder = builder.rule(entry.brand, entry.priority, matcher);
            }
            builder.build()
        }
    }
}
