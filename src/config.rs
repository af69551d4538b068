//! Client configuration carried in the payment page URL.
//!
//! The host application opens a payment page with a query string such as
//!
//! ```text
//! ?data=<base64 JSON>&return_url=https://erp.example/pay/done&origin=https://erp.example&mode=odoo
//! ```
//!
//! `data` holds a [`ClientData`] document, standard base64 encoded. The
//! remaining parameters describe how the frame talks back to its host.
//!
//! Host applications build those URLs with [`payment_link`].

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose, Engine as _};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::mask::truncate_secret;

/// Language used when the URL does not name one.
pub const DEFAULT_LANGUAGE: &str = "es";

/// How the payment page is embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameMode {
    /// Embedded by an Odoo/ERP checkout.
    Odoo,
    /// Opened directly or embedded by an arbitrary page.
    #[default]
    Standalone,
}

impl FrameMode {
    /// Returns the URL value.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Odoo => "odoo",
            Self::Standalone => "standalone",
        }
    }
}

impl fmt::Display for FrameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FrameMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "odoo" => Ok(Self::Odoo),
            "standalone" => Ok(Self::Standalone),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

/// Context attached to a payment by the page that processed it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMetadata {
    /// Frame mode the payment was made in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Where the page redirects when done.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
    /// Origin of the host page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// UI language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// ISO-8601 time the page loaded the configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Payment configuration supplied by the host application.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientData {
    /// Encrypted integrator/client id.
    pub encrypted_client: String,
    /// Encrypted merchant id.
    pub encrypted_merchant: String,
    /// Encrypted secret key.
    pub encrypted_key: String,
    /// Invoice being paid.
    pub invoice_number: String,
    /// Amount to charge.
    pub amount: f64,
    /// Pre-filled payer identity, e.g. `v8019884`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    /// Free-text description shown on the form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Host-side order id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Context added by the page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ClientMetadata>,
}

impl fmt::Debug for ClientData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientData")
            .field("encrypted_client", &truncate_secret(&self.encrypted_client, 10))
            .field("encrypted_merchant", &truncate_secret(&self.encrypted_merchant, 10))
            .field("encrypted_key", &truncate_secret(&self.encrypted_key, 10))
            .field("invoice_number", &self.invoice_number)
            .field("amount", &self.amount)
            .field("customer_id", &self.customer_id)
            .field("description", &self.description)
            .field("order_id", &self.order_id)
            .field("metadata", &self.metadata)
            .finish()
    }
}

impl ClientData {
    /// Decodes the `data` URL parameter.
    ///
    /// Spaces are read back as `+`, since a query string decoder turns an
    /// unescaped `+` in the base64 text into a space.
    ///
    /// # Example
    ///
    /// ```
    /// use payframe::config::ClientData;
    ///
    /// let json = r#"{"encryptedClient":"c","encryptedMerchant":"m","encryptedKey":"k","invoiceNumber":"INV-1","amount":10.5}"#;
    /// let data = payframe::config::encode_client_data_json(json);
    /// let client = ClientData::from_base64(&data).unwrap();
    /// assert_eq!(client.invoice_number, "INV-1");
    /// assert_eq!(client.amount, 10.5);
    /// ```
    pub fn from_base64(data: &str) -> Result<Self, ConfigError> {
        let data = data.trim().replace(' ', "+");
        let bytes = general_purpose::STANDARD.decode(data.as_bytes()).map_err(|e| {
            tracing::warn!(error = %e, "client data is not valid base64");
            ConfigError::Base64(e.to_string())
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(error = %e, "client data is not a valid configuration");
            ConfigError::Json(e.to_string())
        })
    }

    /// Encodes the configuration the way a host application would.
    pub fn to_base64(&self) -> Result<String, ConfigError> {
        let json = serde_json::to_vec(self).map_err(|e| ConfigError::Json(e.to_string()))?;
        Ok(general_purpose::STANDARD.encode(json))
    }

    /// Records the frame parameters and the load time in `metadata`.
    pub fn attach_metadata(&mut self, params: &FrameParams) {
        self.metadata = Some(ClientMetadata {
            source: Some(params.mode.to_string()),
            return_url: params.return_url.clone(),
            origin: params.origin.clone(),
            language: Some(params.language.clone()),
            timestamp: Some(now_iso8601()),
        });
    }
}

/// Base64-encodes a raw JSON document for the `data` parameter.
pub fn encode_client_data_json(json: &str) -> String {
    general_purpose::STANDARD.encode(json.as_bytes())
}

/// Current UTC time as `2025-01-10T14:03:07.123Z`.
pub(crate) fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Payment and search pages a link can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceRoute {
    /// Credit card payment.
    CreditCard,
    /// Debit card payment.
    DebitCard,
    /// Mobile payment.
    MobilePayment,
    /// Bank transfer search.
    TransferSearch,
    /// Mobile payment search.
    MobilePaymentSearch,
}

impl ServiceRoute {
    /// All routes, in menu order.
    pub const ALL: [ServiceRoute; 5] = [
        Self::CreditCard,
        Self::DebitCard,
        Self::MobilePayment,
        Self::TransferSearch,
        Self::MobilePaymentSearch,
    ];

    /// Service name used by host applications.
    pub const fn id(&self) -> &'static str {
        match self {
            Self::CreditCard => "tdc",
            Self::DebitCard => "tdd",
            Self::MobilePayment => "payment-mobile",
            Self::TransferSearch => "search-transfers",
            Self::MobilePaymentSearch => "search-mobile-payments",
        }
    }

    /// Page path, relative to the deployment base URL.
    pub const fn path(&self) -> &'static str {
        match self {
            Self::CreditCard => "/payment/tdc",
            Self::DebitCard => "/payment/tdd",
            Self::MobilePayment => "/payment/payment-mobile",
            Self::TransferSearch => "/search/transfers",
            Self::MobilePaymentSearch => "/search/mobile-payments",
        }
    }
}

impl fmt::Display for ServiceRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ServiceRoute {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|route| route.id() == s)
            .ok_or_else(|| ConfigError::InvalidService(s.to_string()))
    }
}

/// Builds the standalone link a host hands to its customer.
///
/// The client data is base64 encoded and percent-encoded into `data`. A
/// trailing `/` on `base_url` is dropped.
///
/// # Example
///
/// ```
/// use payframe::config::{encode_client_data_json, payment_link, ClientData, FrameParams, ServiceRoute};
///
/// let json = r#"{"encryptedClient":"c","encryptedMerchant":"m","encryptedKey":"k","invoiceNumber":"INV-1","amount":10.5}"#;
/// let client = ClientData::from_base64(&encode_client_data_json(json)).unwrap();
///
/// let link = payment_link("https://pay.example/", ServiceRoute::DebitCard, &client).unwrap();
/// assert!(link.starts_with("https://pay.example/payment/tdd?data="));
/// assert!(link.ends_with("&mode=standalone"));
///
/// let query = link.split_once('?').unwrap().1;
/// let decoded = FrameParams::from_query(query).unwrap().client_data().unwrap();
/// assert_eq!(decoded.invoice_number, "INV-1");
/// ```
pub fn payment_link(
    base_url: &str,
    route: ServiceRoute,
    client: &ClientData,
) -> Result<String, ConfigError> {
    let base = base_url.trim().trim_end_matches('/');
    let host = base
        .strip_prefix("https://")
        .or_else(|| base.strip_prefix("http://"))
        .unwrap_or_default();
    if host.is_empty() || base.contains(['?', '#']) {
        return Err(ConfigError::InvalidBaseUrl(base_url.to_string()));
    }

    let data = client.to_base64()?;
    Ok(format!(
        "{}{}?data={}&mode={}",
        base,
        route.path(),
        urlencoding::encode(&data),
        FrameMode::Standalone
    ))
}

/// Parameters read from the payment page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameParams {
    /// Base64 client configuration, if present.
    pub data: Option<String>,
    /// Redirect target after the payment.
    pub return_url: Option<String>,
    /// Origin of the host page; messages target it.
    pub origin: Option<String>,
    /// Embedding mode.
    pub mode: FrameMode,
    /// UI language.
    pub language: String,
}

impl Default for FrameParams {
    fn default() -> Self {
        Self {
            data: None,
            return_url: None,
            origin: None,
            mode: FrameMode::default(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl FrameParams {
    /// Parses a query string, with or without its leading `?`.
    ///
    /// Empty values count as absent. Unknown keys are ignored; for repeated
    /// keys the first occurrence wins.
    ///
    /// # Example
    ///
    /// ```
    /// use payframe::config::{FrameMode, FrameParams};
    ///
    /// let params = FrameParams::from_query("?mode=odoo&origin=https%3A%2F%2Ferp.example").unwrap();
    /// assert_eq!(params.mode, FrameMode::Odoo);
    /// assert_eq!(params.origin.as_deref(), Some("https://erp.example"));
    /// assert_eq!(params.language, "es");
    /// ```
    pub fn from_query(query: &str) -> Result<Self, ConfigError> {
        let mut params = Self::default();
        let mut mode = None;
        let mut language = None;

        for pair in query.trim_start_matches('?').split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = decode_component(value);
            if value.is_empty() {
                continue;
            }

            let slot = match decode_component(key).as_str() {
                "data" => &mut params.data,
                "return_url" => &mut params.return_url,
                "origin" => &mut params.origin,
                "mode" => &mut mode,
                "language" => &mut language,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }

        if let Some(mode) = mode {
            params.mode = mode.parse().map_err(|e| {
                tracing::warn!(mode = %mode, "unknown frame mode");
                e
            })?;
        }
        if let Some(language) = language {
            params.language = language;
        }
        Ok(params)
    }

    /// Decodes `data` into a [`ClientData`] and attaches the frame metadata.
    pub fn client_data(&self) -> Result<ClientData, ConfigError> {
        let data = self.data.as_deref().ok_or(ConfigError::MissingData)?;
        let mut client = ClientData::from_base64(data)?;
        client.attach_metadata(self);
        Ok(client)
    }

    /// Origin to post frame messages to: the configured one, or `*`.
    pub fn target_origin(&self) -> &str {
        self.origin.as_deref().unwrap_or("*")
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLIENT_JSON: &str = r#"{
        "encryptedClient": "pXsM1bjazk/Gc7ASLqJLje4Hc8VR3MPD4Q+D8t46NMvTnPDDCz3ItgPpOby/5Rop",
        "encryptedMerchant": "XAhbCqpM4LIWlGq+eA85Tg==",
        "encryptedKey": "i9lmbuSvM95bN1EERt78dLEKuEzbnmlCspcs3erDSQ8=",
        "invoiceNumber": "INV-2025-001",
        "amount": 100.5,
        "customerId": "v8019884",
        "orderId": "SO042"
    }"#;

    #[test]
    fn test_decode_client_data() {
        let data = encode_client_data_json(CLIENT_JSON);
        let client = ClientData::from_base64(&data).unwrap();
        assert_eq!(client.encrypted_merchant, "XAhbCqpM4LIWlGq+eA85Tg==");
        assert_eq!(client.customer_id.as_deref(), Some("v8019884"));
        assert_eq!(client.order_id.as_deref(), Some("SO042"));
        assert_eq!(client.description, None);
        assert_eq!(client.metadata, None);
    }

    #[test]
    fn test_decode_client_data_errors() {
        assert!(matches!(
            ClientData::from_base64("not base64!"),
            Err(ConfigError::Base64(_))
        ));
        let data = encode_client_data_json(r#"{"amount": 1}"#);
        assert!(matches!(
            ClientData::from_base64(&data),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_plus_survives_query_decoding() {
        let json = r#"{"encryptedClient":"c","encryptedMerchant":"m","encryptedKey":"k","invoiceNumber":"~~~>","amount":1}"#;
        let data = encode_client_data_json(json);
        assert!(data.contains('+'));
        let query = format!("data={}", data);
        let params = FrameParams::from_query(&query).unwrap();
        let client = params.client_data().unwrap();
        assert_eq!(client.invoice_number, "~~~>");
    }

    #[test]
    fn test_round_trip_through_url() {
        let client = ClientData::from_base64(&encode_client_data_json(CLIENT_JSON)).unwrap();
        let encoded = client.to_base64().unwrap();
        let query = format!("?data={}&mode=odoo", urlencoding::encode(&encoded));
        let params = FrameParams::from_query(&query).unwrap();
        let decoded = params.client_data().unwrap();
        assert_eq!(decoded.invoice_number, client.invoice_number);

        let metadata = decoded.metadata.unwrap();
        assert_eq!(metadata.source.as_deref(), Some("odoo"));
        assert_eq!(metadata.language.as_deref(), Some("es"));
        assert!(metadata.timestamp.unwrap().ends_with('Z'));
    }

    #[test]
    fn test_frame_params_defaults() {
        let params = FrameParams::from_query("").unwrap();
        assert_eq!(params, FrameParams::default());
        assert_eq!(params.mode, FrameMode::Standalone);
        assert_eq!(params.target_origin(), "*");
        assert_eq!(params.client_data(), Err(ConfigError::MissingData));
    }

    #[test]
    fn test_frame_params_values() {
        let params = FrameParams::from_query(
            "return_url=https%3A%2F%2Ferp.example%2Fdone&origin=https://erp.example&language=en&mode=&x=1",
        )
        .unwrap();
        assert_eq!(params.return_url.as_deref(), Some("https://erp.example/done"));
        assert_eq!(params.target_origin(), "https://erp.example");
        assert_eq!(params.language, "en");
        assert_eq!(params.mode, FrameMode::Standalone);
    }

    #[test]
    fn test_invalid_mode() {
        assert_eq!(
            FrameParams::from_query("mode=popup"),
            Err(ConfigError::InvalidMode("popup".to_string()))
        );
    }

    #[test]
    fn test_service_routes() {
        for route in ServiceRoute::ALL {
            assert_eq!(route.id().parse::<ServiceRoute>(), Ok(route));
        }
        assert_eq!(ServiceRoute::MobilePaymentSearch.path(), "/search/mobile-payments");
        assert_eq!(
            "paypal".parse::<ServiceRoute>(),
            Err(ConfigError::InvalidService("paypal".to_string()))
        );
    }

    #[test]
    fn test_payment_link_round_trip() {
        let client = ClientData::from_base64(&encode_client_data_json(CLIENT_JSON)).unwrap();
        let link = payment_link("https://pay.example", ServiceRoute::TransferSearch, &client).unwrap();

        let (page, query) = link.split_once('?').unwrap();
        assert_eq!(page, "https://pay.example/search/transfers");
        assert!(!query.contains('+'));
        assert!(query.ends_with("&mode=standalone"));

        let params = FrameParams::from_query(query).unwrap();
        assert_eq!(params.mode, FrameMode::Standalone);
        let decoded = params.client_data().unwrap();
        assert_eq!(decoded.encrypted_client, client.encrypted_client);
        assert_eq!(decoded.encrypted_merchant, "XAhbCqpM4LIWlGq+eA85Tg==");
        assert_eq!(decoded.amount, 100.5);
    }

    #[test]
    fn test_payment_link_rejects_bad_base() {
        let client = ClientData::from_base64(&encode_client_data_json(CLIENT_JSON)).unwrap();
        for base in ["", "pay.example", "https://", "https://pay.example?x=1"] {
            assert_eq!(
                payment_link(base, ServiceRoute::CreditCard, &client),
                Err(ConfigError::InvalidBaseUrl(base.to_string())),
                "base {:?}",
                base
            );
        }
    }

    #[test]
    fn test_debug_hides_credentials() {
        let client = ClientData::from_base64(&encode_client_data_json(CLIENT_JSON)).unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("i9lmbuSvM95bN1EERt78dLEKuEzbnmlCspcs3erDSQ8="));
        assert!(debug.contains("INV-2025-001"));
    }
}
