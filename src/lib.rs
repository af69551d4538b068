//! # payframe
//!
//! Card identification, formatting and gateway contracts for embeddable
//! payment forms.
//!
//! ## Features
//!
//! - Card brand identification from an ordered BIN rule table
//! - Card number display grouping and transmission cleaning
//! - Expiry normalization between typed, wire and card-face forms
//! - PCI-safe masking for logs
//! - Typed gateway requests and responses, client configuration and
//!   parent-frame messages (feature `gateway`)
//! - Multiple interfaces: library, CLI, REST API, WASM
//!
//! ## Quick Start
//!
//! ```rust
//! use payframe::{identify_brand, CardBrand, CardNumber};
//!
//! // Identify a brand while the user types
//! assert_eq!(identify_brand("4022 76"), CardBrand::Zinli);
//! assert_eq!(identify_brand("4022"), CardBrand::Visa);
//! assert_eq!(identify_brand("5112"), CardBrand::Mastercard);
//!
//! // Safe for logging - never exposes full card number
//! let card = CardNumber::parse("4022-7600-0000-0001").unwrap();
//! println!("Card: {}", card.masked()); // "402276******0001"
//! ```
//!
//! ## Card Formatting
//!
//! ```rust
//! use payframe::format;
//!
//! // Grouped by four, capped at 16 digits
//! assert_eq!(format::format_for_display("41111111111111119"), "4111 1111 1111 1111");
//!
//! // Transmission form keeps every digit
//! assert_eq!(format::clean_for_transmission("4111 1111 1111 1111 9"), "41111111111111119");
//! ```
//!
//! ## Expiry Normalization
//!
//! ```rust
//! use payframe::expiry;
//!
//! assert_eq!(expiry::to_wire_format("202710"), "2027/10");
//! assert_eq!(expiry::to_short_year("202710"), "10/27");
//!
//! // Anything that is not six digits comes back unchanged
//! assert_eq!(expiry::to_wire_format("20271"), "20271");
//! ```
//!
//! ## Custom BIN Tables
//!
//! ```rust
//! use payframe::rules::{BinMatcher, BinTable};
//! use payframe::CardBrand;
//!
//! let table = BinTable::builder()
//!     .rule(CardBrand::Zinli, 0, BinMatcher::prefixes(["411111"]).unwrap())
//!     .rule(CardBrand::Visa, 20, BinMatcher::prefixes(["4"]).unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(table.identify("4111 1111 1111 1111"), CardBrand::Zinli);
//! ```
//!
//! ## Supported Card Brands
//!
//! | Brand | Prefix | Priority |
//! |-------|--------|----------|
//! | Zinli | 402276, 402277, 410787, 422052, 455587, 476130 | 0 |
//! | Mastercard | 51-55, 2221-2720 | 10 |
//! | Visa | 4 | 20 |
//!
//! Anything else is `Unknown`.
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `gateway` | Gateway contracts, client configuration, frame messages (default) |
//! | `bin-json` | JSON BIN table loader |
//! | `cli` | Command-line tool |
//! | `server` | REST API with Swagger UI |
//! | `wasm` | WebAssembly support |
//!
//! ## Security
//!
//! - Card numbers stored in fixed-size arrays, not heap strings
//! - Automatic memory zeroization when a `CardNumber`, CVV or OTP is dropped
//! - `Debug` and `Display` show masked values only
//! - No unsafe code (`#![deny(unsafe_code)]`)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod banks;
pub mod card;
pub mod customer;
pub mod detect;
pub mod error;
pub mod expiry;
pub mod format;
pub mod mask;
pub mod rules;

#[cfg(feature = "gateway")]
pub mod config;
#[cfg(feature = "gateway")]
pub mod frame;
#[cfg(feature = "gateway")]
pub mod gateway;

#[cfg(feature = "wasm")]
mod wasm;

// Re-export main types at crate root
pub use card::{CardBrand, CardNumber, MAX_CARD_DIGITS, MIN_CARD_DIGITS};
pub use detect::{identify_brand, identify_digits};
pub use error::{ConfigError, FormError, GatewayError, TableError};
pub use expiry::{to_short_year, to_wire_format, ExpiryDate};
pub use format::{clean_for_transmission, format_for_display};
pub use rules::BinTable;

// Re-export mask utilities
pub use mask::mask_string;
