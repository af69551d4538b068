//! Messages and redirects sent from the payment frame to its host.
//!
//! When the page is embedded it reports to the parent window with
//! `postMessage`; when a `return_url` was given it also redirects there.
//! [`FrameReply`] bundles both for one payment or search outcome.
//!
//! Payment pages post the `payment_*` family. The two search pages post
//! their own families, `transfer_search_*` and `mobile_payment_search_*`,
//! selected by [`SearchKind`].
//!
//! # Example
//!
//! ```
//! use payframe::config::FrameParams;
//! use payframe::frame::FrameReply;
//!
//! let params = FrameParams::from_query("origin=https://erp.example&return_url=https://erp.example/done").unwrap();
//! let reply = FrameReply::error(&params, "Tarjeta rechazada");
//!
//! assert_eq!(reply.target_origin, "https://erp.example");
//! assert_eq!(
//!     reply.redirect.as_deref(),
//!     Some("https://erp.example/done?status=error&error_message=Tarjeta%20rechazada")
//! );
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{now_iso8601, FrameMode, FrameParams};
use crate::error::GatewayError;
use crate::gateway::{
    MerchantIdentify, MobilePaymentRecord, PaymentResponse, SearchResponse, TransferRecord,
};

/// `status` value of the loaded message.
pub const READY_STATUS: &str = "ready";

/// Context attached to success and error messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMetadata {
    /// Frame mode.
    pub source: FrameMode,
    /// ISO-8601 time the message was built.
    pub timestamp: String,
}

impl MessageMetadata {
    fn now(mode: FrameMode) -> Self {
        Self {
            source: mode,
            timestamp: now_iso8601(),
        }
    }
}

/// Payment summary handed to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentResult {
    /// Bank reference of the payment.
    pub acquirer_reference: String,
    /// Bank internal status code.
    pub transaction_id: String,
    /// Charged amount.
    pub amount: f64,
    /// Currency code.
    pub currency: String,
    /// Bank timestamp.
    pub transaction_date: String,
    /// Merchant identity.
    pub merchant_identify: MerchantIdentify,
    /// The complete gateway reply.
    pub raw_response: Value,
}

impl PaymentResult {
    /// Summarizes a gateway payment reply.
    pub fn from_response(response: &PaymentResponse) -> Result<Self, GatewayError> {
        let trx = &response.bank_response.transaction_response;
        Ok(Self {
            acquirer_reference: trx.payment_reference.clone(),
            transaction_id: trx.trx_internal_status.clone(),
            amount: trx.amount,
            currency: trx.currency.clone(),
            transaction_date: trx.processing_date.clone(),
            merchant_identify: response.bank_response.merchant_identify.clone(),
            raw_response: serde_json::to_value(response)
                .map_err(|e| GatewayError::Encode(e.to_string()))?,
        })
    }
}

/// Which search page is reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchKind {
    /// Bank transfer search.
    Transfers,
    /// Mobile payment search.
    MobilePayments,
}

/// Records a search page can report, tied to the page that searches them.
pub trait SearchRecord: Serialize {
    /// Page reporting this record type.
    const KIND: SearchKind;
}

impl SearchRecord for TransferRecord {
    const KIND: SearchKind = SearchKind::Transfers;
}

impl SearchRecord for MobilePaymentRecord {
    const KIND: SearchKind = SearchKind::MobilePayments;
}

/// A message posted to the parent window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FrameMessage {
    /// The page finished loading its configuration.
    #[serde(rename = "payment_iframe_loaded")]
    Loaded {
        /// Always [`READY_STATUS`].
        status: String,
        /// Frame mode.
        mode: FrameMode,
        /// Origin of the payment page itself.
        origin: String,
    },

    /// The gateway approved the payment.
    #[serde(rename = "payment_success")]
    Success {
        /// Payment summary.
        #[serde(rename = "paymentResult")]
        payment_result: PaymentResult,
        /// Message context.
        metadata: MessageMetadata,
    },

    /// The payment, or loading the page, failed.
    #[serde(rename = "payment_error")]
    Error {
        /// Message to show the user.
        message: String,
        /// Message context; absent when the page failed to initialize.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<MessageMetadata>,
    },

    /// The transfer search page finished loading.
    #[serde(rename = "transfer_search_iframe_loaded")]
    TransferSearchLoaded {
        /// Always [`READY_STATUS`].
        status: String,
        /// Frame mode.
        mode: FrameMode,
        /// Origin of the search page itself.
        origin: String,
    },

    /// The transfer search completed.
    #[serde(rename = "transfer_search_success")]
    TransferSearchSuccess {
        /// The complete gateway reply.
        #[serde(rename = "searchResult")]
        search_result: Value,
        /// Message context.
        metadata: MessageMetadata,
    },

    /// The transfer search, or loading its page, failed.
    #[serde(rename = "transfer_search_error")]
    TransferSearchError {
        /// Message to show the user.
        message: String,
        /// Message context; absent when the page failed to initialize.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<MessageMetadata>,
    },

    /// The mobile payment search page finished loading.
    #[serde(rename = "mobile_payment_search_iframe_loaded")]
    MobileSearchLoaded {
        /// Always [`READY_STATUS`].
        status: String,
        /// Frame mode.
        mode: FrameMode,
        /// Origin of the search page itself.
        origin: String,
    },

    /// The mobile payment search completed.
    #[serde(rename = "mobile_payment_search_success")]
    MobileSearchSuccess {
        /// The complete gateway reply.
        #[serde(rename = "searchResult")]
        search_result: Value,
        /// Message context.
        metadata: MessageMetadata,
    },

    /// The mobile payment search, or loading its page, failed.
    #[serde(rename = "mobile_payment_search_error")]
    MobileSearchError {
        /// Message to show the user.
        message: String,
        /// Message context; absent when the page failed to initialize.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<MessageMetadata>,
    },
}

impl FrameMessage {
    /// Builds the loaded notification. `page_origin` is the payment page's
    /// own origin, not the host's.
    pub fn loaded(mode: FrameMode, page_origin: impl Into<String>) -> Self {
        Self::Loaded {
            status: READY_STATUS.to_string(),
            mode,
            origin: page_origin.into(),
        }
    }

    /// Builds the success notification for a gateway reply.
    pub fn success(mode: FrameMode, response: &PaymentResponse) -> Result<Self, GatewayError> {
        Ok(Self::Success {
            payment_result: PaymentResult::from_response(response)?,
            metadata: MessageMetadata::now(mode),
        })
    }

    /// Builds the error notification for a failed payment.
    pub fn error(mode: FrameMode, message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            metadata: Some(MessageMetadata::now(mode)),
        }
    }

    /// Builds the error notification for a page that could not start.
    pub fn init_error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            metadata: None,
        }
    }

    /// Builds the loaded notification of a search page.
    pub fn search_loaded(kind: SearchKind, mode: FrameMode, page_origin: impl Into<String>) -> Self {
        let status = READY_STATUS.to_string();
        let origin = page_origin.into();
        match kind {
            SearchKind::Transfers => Self::TransferSearchLoaded { status, mode, origin },
            SearchKind::MobilePayments => Self::MobileSearchLoaded { status, mode, origin },
        }
    }

    /// Builds the success notification for a search reply. The whole reply
    /// is forwarded, found or not.
    pub fn search_success<T: SearchRecord>(
        mode: FrameMode,
        response: &SearchResponse<T>,
    ) -> Result<Self, GatewayError> {
        let search_result =
            serde_json::to_value(response).map_err(|e| GatewayError::Encode(e.to_string()))?;
        let metadata = MessageMetadata::now(mode);
        Ok(match T::KIND {
            SearchKind::Transfers => Self::TransferSearchSuccess { search_result, metadata },
            SearchKind::MobilePayments => Self::MobileSearchSuccess { search_result, metadata },
        })
    }

    /// Builds the error notification for a failed search.
    pub fn search_error(kind: SearchKind, mode: FrameMode, message: impl Into<String>) -> Self {
        Self::search_fault(kind, message.into(), Some(MessageMetadata::now(mode)))
    }

    /// Builds the error notification for a search page that could not start.
    pub fn search_init_error(kind: SearchKind, message: impl Into<String>) -> Self {
        Self::search_fault(kind, message.into(), None)
    }

    fn search_fault(kind: SearchKind, message: String, metadata: Option<MessageMetadata>) -> Self {
        match kind {
            SearchKind::Transfers => Self::TransferSearchError { message, metadata },
            SearchKind::MobilePayments => Self::MobileSearchError { message, metadata },
        }
    }

    /// Returns the `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Loaded { .. } => "payment_iframe_loaded",
            Self::Success { .. } => "payment_success",
            Self::Error { .. } => "payment_error",
            Self::TransferSearchLoaded { .. } => "transfer_search_iframe_loaded",
            Self::TransferSearchSuccess { .. } => "transfer_search_success",
            Self::TransferSearchError { .. } => "transfer_search_error",
            Self::MobileSearchLoaded { .. } => "mobile_payment_search_iframe_loaded",
            Self::MobileSearchSuccess { .. } => "mobile_payment_search_success",
            Self::MobileSearchError { .. } => "mobile_payment_search_error",
        }
    }

    /// Serializes the message for `postMessage`.
    pub fn to_json(&self) -> Result<String, GatewayError> {
        serde_json::to_string(self).map_err(|e| GatewayError::Encode(e.to_string()))
    }
}

/// Everything the page does after a payment outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReply {
    /// Message for the parent window.
    pub message: FrameMessage,
    /// `targetOrigin` for `postMessage`.
    pub target_origin: String,
    /// Where to send the browser, if a return URL was configured.
    pub redirect: Option<String>,
}

impl FrameReply {
    /// Reply for an approved payment.
    pub fn success(params: &FrameParams, response: &PaymentResponse) -> Result<Self, GatewayError> {
        Ok(Self {
            message: FrameMessage::success(params.mode, response)?,
            target_origin: params.target_origin().to_string(),
            redirect: params
                .return_url
                .as_deref()
                .map(|url| success_return_url(url, response.payment_reference())),
        })
    }

    /// Reply for a failed payment.
    pub fn error(params: &FrameParams, message: &str) -> Self {
        Self {
            message: FrameMessage::error(params.mode, message),
            target_origin: params.target_origin().to_string(),
            redirect: params
                .return_url
                .as_deref()
                .map(|url| error_return_url(url, message)),
        }
    }

    /// Reply for a completed search.
    pub fn search_success<T: SearchRecord>(
        params: &FrameParams,
        response: &SearchResponse<T>,
    ) -> Result<Self, GatewayError> {
        let redirect = match params.return_url.as_deref() {
            Some(url) => Some(search_return_url(url, response)?),
            None => None,
        };
        Ok(Self {
            message: FrameMessage::search_success(params.mode, response)?,
            target_origin: params.target_origin().to_string(),
            redirect,
        })
    }

    /// Reply for a failed search.
    pub fn search_error(params: &FrameParams, kind: SearchKind, message: &str) -> Self {
        Self {
            message: FrameMessage::search_error(kind, params.mode, message),
            target_origin: params.target_origin().to_string(),
            redirect: params
                .return_url
                .as_deref()
                .map(|url| error_return_url(url, message)),
        }
    }
}

/// Return URL for a successful payment.
///
/// # Example
///
/// ```
/// use payframe::frame::success_return_url;
///
/// assert_eq!(
///     success_return_url("https://erp.example/done?order=7", "000000000001479"),
///     "https://erp.example/done?order=7&transaction_id=000000000001479&status=success"
/// );
/// ```
pub fn success_return_url(return_url: &str, payment_reference: &str) -> String {
    with_query_params(
        return_url,
        &[("transaction_id", payment_reference), ("status", "success")],
    )
}

/// Return URL for a completed search, carrying the reply as JSON in
/// `search_result`.
pub fn search_return_url<T: Serialize>(
    return_url: &str,
    response: &SearchResponse<T>,
) -> Result<String, GatewayError> {
    let json = serde_json::to_string(response).map_err(|e| GatewayError::Encode(e.to_string()))?;
    Ok(with_query_params(
        return_url,
        &[("search_result", json.as_str()), ("status", "success")],
    ))
}

/// Return URL for a failed payment or search.
pub fn error_return_url(return_url: &str, message: &str) -> String {
    with_query_params(return_url, &[("status", "error"), ("error_message", message)])
}

/// Sets query parameters on a URL, replacing existing ones with the same
/// key and keeping any fragment at the end.
fn with_query_params(url: &str, params: &[(&str, &str)]) -> String {
    let (head, fragment) = match url.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (url, None),
    };
    let (base, query) = head.split_once('?').unwrap_or((head, ""));

    let mut pairs: Vec<String> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let key = pair.split('=').next().unwrap_or_default();
            !params.iter().any(|(k, _)| *k == key)
        })
        .map(str::to_string)
        .collect();
    pairs.extend(
        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v))),
    );

    let mut out = format!("{}?{}", base, pairs.join("&"));
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}
