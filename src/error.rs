//! Error types for payment form handling.
//!
//! Each concern gets its own enum with a message that tells the caller
//! exactly which field or value was wrong.

use std::fmt;

/// Errors raised while validating a form submission at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum FormError {
    /// A required field was empty.
    MissingField(&'static str),

    /// A field contained a character it does not accept.
    InvalidCharacter {
        /// Gateway name of the field.
        field: &'static str,
        /// The position in the input string (0-indexed).
        position: usize,
        /// The invalid character that was found.
        character: char,
    },

    /// The card number has the wrong number of digits.
    CardNumberLength {
        /// The actual number of digits provided.
        length: usize,
        /// The minimum required digits (13).
        minimum: usize,
        /// The maximum allowed digits (19).
        maximum: usize,
    },

    /// The CVV is not 3 or 4 digits.
    CvvLength {
        /// The actual number of digits provided.
        length: usize,
    },

    /// The identity document number is not 6-10 digits.
    CustomerIdLength {
        /// The actual number of digits provided.
        length: usize,
    },

    /// The identity document prefix is not V, E or J.
    InvalidCustomerId(String),

    /// The expiry did not normalize to `YYYY/MM`.
    ExpiryFormat(String),

    /// The expiry month is outside 1-12.
    InvalidMonth(u8),

    /// A mobile number is not `58` followed by 10 digits.
    MobileNumber {
        /// Gateway name of the field.
        field: &'static str,
    },

    /// A date is not a valid `YYYY-MM-DD` calendar date.
    DateFormat(String),

    /// The amount is zero, negative or not finite.
    InvalidAmount(f64),

    /// A one-time code has the wrong number of digits.
    OtpLength {
        /// Required number of digits.
        expected: usize,
        /// The actual number of digits provided.
        length: usize,
    },
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "required field '{}' is empty", field),

            Self::InvalidCharacter {
                field,
                position,
                character,
            } => write!(
                f,
                "invalid character '{}' at position {} in '{}'",
                character.escape_default(),
                position,
                field
            ),

            Self::CardNumberLength {
                length,
                minimum,
                maximum,
            } => write!(
                f,
                "card number must have {} to {} digits, got {}",
                minimum, maximum, length
            ),

            Self::CvvLength { length } => {
                write!(f, "cvv must have 3 or 4 digits, got {}", length)
            }

            Self::CustomerIdLength { length } => write!(
                f,
                "identity document must have 6 to 10 digits, got {}",
                length
            ),

            Self::InvalidCustomerId(value) => write!(
                f,
                "invalid identity document '{}' (expected V, E or J followed by digits)",
                value
            ),

            Self::ExpiryFormat(value) => write!(
                f,
                "invalid expiry '{}': use YYYY/MM (e.g. 2027/10)",
                value
            ),

            Self::InvalidMonth(month) => write!(f, "invalid expiry month {}: must be 1-12", month),

            Self::MobileNumber { field } => write!(
                f,
                "'{}' must have the format 58XXXXXXXXXX",
                field
            ),

            Self::DateFormat(value) => write!(f, "invalid date '{}': use YYYY-MM-DD", value),

            Self::InvalidAmount(amount) => write!(f, "amount must be greater than zero, got {}", amount),

            Self::OtpLength { expected, length } => write!(
                f,
                "verification code must have {} digits, got {}",
                expected, length
            ),
        }
    }
}

impl std::error::Error for FormError {}

/// Errors raised while building a BIN rule table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// A prefix was empty, too long or contained non-digits.
    InvalidPrefix(String),

    /// A range had a bad width or bounds.
    InvalidRange {
        /// Number of leading digits inspected.
        width: usize,
        /// Lower bound.
        low: u32,
        /// Upper bound.
        high: u32,
    },

    /// A rule targeted `CardBrand::Unknown`, which is reserved for "no match".
    UnknownBrandRule {
        /// Index of the offending rule in declaration order.
        index: usize,
    },

    /// The table document could not be parsed.
    Parse(String),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPrefix(prefix) => write!(
                f,
                "invalid BIN prefix '{}' (expected 1 to 8 digits)",
                prefix
            ),
            Self::InvalidRange { width, low, high } => write!(
                f,
                "invalid BIN range {}..={} over {} digits",
                low, high, width
            ),
            Self::UnknownBrandRule { index } => {
                write!(f, "rule {} targets the reserved 'unknown' brand", index)
            }
            Self::Parse(msg) => write!(f, "BIN table parse error: {}", msg),
        }
    }
}

impl std::error::Error for TableError {}

/// Errors raised while reading the client configuration from the page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The `data` query parameter is absent.
    MissingData,

    /// The `data` parameter is not valid base64.
    Base64(String),

    /// The decoded payload is not a valid client configuration.
    Json(String),

    /// The `mode` parameter is neither `odoo` nor `standalone`.
    InvalidMode(String),

    /// A payment link base is not an absolute `http(s)` URL.
    InvalidBaseUrl(String),

    /// The service name matches no payment or search page.
    InvalidService(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingData => write!(f, "missing 'data' parameter"),
            Self::Base64(msg) => write!(f, "client data is not valid base64: {}", msg),
            Self::Json(msg) => write!(f, "client data is not valid JSON: {}", msg),
            Self::InvalidMode(mode) => write!(
                f,
                "invalid mode '{}' (expected 'odoo' or 'standalone')",
                mode
            ),
            Self::InvalidBaseUrl(url) => write!(f, "invalid base URL '{}'", url),
            Self::InvalidService(name) => write!(f, "unknown service '{}'", name),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors raised while encoding a gateway request or interpreting its reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The response body is not JSON.
    InvalidBody {
        /// HTTP status code.
        status: u16,
        /// Raw body text, or `HTTP <status>` when empty.
        message: String,
    },

    /// The gateway answered with an error status.
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Message reported by the gateway.
        message: String,
    },

    /// The HTTP status was not 2xx.
    Http {
        /// HTTP status code.
        status: u16,
        /// Message reported by the gateway, if any.
        message: String,
    },

    /// The JSON did not match the expected response shape.
    Schema(String),

    /// The request could not be serialized.
    Encode(String),
}

impl GatewayError {
    /// Returns the HTTP status attached to the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::InvalidBody { status, .. }
            | Self::Rejected { status, .. }
            | Self::Http { status, .. } => Some(*status),
            Self::Schema(_) | Self::Encode(_) => None,
        }
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBody { message, .. } => write!(f, "{}", message),
            Self::Rejected { message, .. } => write!(f, "{}", message),
            Self::Http { status, message } => write!(f, "HTTP {}: {}", status, message),
            Self::Schema(msg) => write!(f, "unexpected gateway response: {}", msg),
            Self::Encode(msg) => write!(f, "could not encode request: {}", msg),
        }
    }
}

impl std::error::Error for GatewayError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_error_display() {
        assert_eq!(
            FormError::MissingField("cvv").to_string(),
            "required field 'cvv' is empty"
        );
        assert_eq!(
            FormError::CustomerIdLength { length: 4 }.to_string(),
            "identity document must have 6 to 10 digits, got 4"
        );
        assert_eq!(
            FormError::ExpiryFormat("20271".to_string()).to_string(),
            "invalid expiry '20271': use YYYY/MM (e.g. 2027/10)"
        );
        assert_eq!(
            FormError::MobileNumber { field: "originMobile" }.to_string(),
            "'originMobile' must have the format 58XXXXXXXXXX"
        );
    }

    #[test]
    fn test_gateway_error_display() {
        let err = GatewayError::Rejected {
            status: 400,
            message: "Tarjeta inválida".to_string(),
        };
        assert_eq!(err.to_string(), "Tarjeta inválida");
        assert_eq!(err.status(), Some(400));

        let err = GatewayError::Http {
            status: 502,
            message: "Bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 502: Bad gateway");
        assert_eq!(GatewayError::Schema("x".into()).status(), None);
    }

    #[test]
    fn test_table_error_display() {
        assert_eq!(
            TableError::InvalidRange { width: 2, low: 55, high: 51 }.to_string(),
            "invalid BIN range 55..=51 over 2 digits"
        );
    }

    #[test]
    fn test_errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FormError>();
        assert_send_sync::<TableError>();
        assert_send_sync::<ConfigError>();
        assert_send_sync::<GatewayError>();
    }
}
