//! Typed request and response contracts for the payment gateway.
//!
//! Every endpoint has its own request struct, validated at construction,
//! and a response struct decoded by [`decode_response`]. Nothing here opens
//! a socket: the embedding application posts [`GatewayCall::encode`]'s body
//! to `base_url + C::ENDPOINT.path()` and feeds the status and body it gets
//! back to [`GatewayCall::decode`].
//!
//! # Example
//!
//! ```
//! use payframe::customer::{CustomerId, DocumentKind};
//! use payframe::gateway::{CardPaymentForm, Credentials, CreditPaymentRequest, GatewayCall};
//!
//! let credentials = Credentials::new("client==", "merchant==", "key==");
//! let customer = CustomerId::new(DocumentKind::V, "8019884").unwrap();
//! let form = CardPaymentForm {
//!     card_number: "4111 1111 1111 1111",
//!     cvv: "123",
//!     expiry: "202710",
//!     customer: &customer,
//!     invoice_number: "INV-001",
//!     amount: 15.5,
//! };
//!
//! let request = CreditPaymentRequest::from_form(credentials, &form).unwrap();
//! let body = request.encode().unwrap();
//! assert!(body.contains(r#""expirationDate":"2027/10""#));
//! assert!(body.contains(r#""paymentMethod":"tdc""#));
//! ```

use std::fmt;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use zeroize::Zeroize;

use crate::card::CardNumber;
use crate::config::{ClientData, ClientMetadata};
use crate::customer::{CustomerId, MobileNumber};
use crate::error::{FormError, GatewayError};
use crate::expiry::{is_wire_format, to_wire_format, ExpiryDate, ExpiryError};
use crate::mask::truncate_secret;

/// Digits required in a mobile payment verification code.
pub const MOBILE_OTP_DIGITS: usize = 8;

/// `transactionType` sent with every transfer search.
pub const TRANSFER_TRANSACTION_TYPE: u8 = 1;

/// Currency used by mobile payment searches when none is given.
pub const DEFAULT_CURRENCY: &str = "ves";

/// Characters of each credential kept in log summaries.
const SECRET_PREVIEW: usize = 10;

// ============================================================================
// Shared request parts
// ============================================================================

/// Encrypted merchant credentials issued by the gateway.
///
/// They are opaque to this crate and forwarded verbatim with every request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Encrypted integrator/client id.
    pub encrypted_client: String,
    /// Encrypted merchant id.
    pub encrypted_merchant: String,
    /// Encrypted secret key.
    pub encrypted_key: String,
}

impl Credentials {
    /// Bundles the three encrypted values.
    pub fn new(
        client: impl Into<String>,
        merchant: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            encrypted_client: client.into(),
            encrypted_merchant: merchant.into(),
            encrypted_key: key.into(),
        }
    }
}

impl From<&ClientData> for Credentials {
    fn from(data: &ClientData) -> Self {
        Self::new(
            data.encrypted_client.clone(),
            data.encrypted_merchant.clone(),
            data.encrypted_key.clone(),
        )
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("encrypted_client", &truncate_secret(&self.encrypted_client, SECRET_PREVIEW))
            .field("encrypted_merchant", &truncate_secret(&self.encrypted_merchant, SECRET_PREVIEW))
            .field("encrypted_key", &truncate_secret(&self.encrypted_key, SECRET_PREVIEW))
            .finish()
    }
}

/// Payment method codes understood by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Credit card (`tdc`).
    Tdc,
    /// Debit card (`tdd`).
    Tdd,
    /// Mobile payment (`pago_movil`).
    PagoMovil,
}

impl PaymentMethod {
    /// Returns the wire code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Tdc => "tdc",
            Self::Tdd => "tdd",
            Self::PagoMovil => "pago_movil",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Account debited by a debit card payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AccountType {
    /// Checking account.
    #[default]
    #[serde(rename = "CC")]
    Checking,
    /// Savings account.
    #[serde(rename = "CA")]
    Savings,
}

/// A short numeric secret (CVV or one-time code).
///
/// Wiped on drop and never shown by `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SecretCode(String);

impl SecretCode {
    fn digits(input: &str, field: &'static str) -> Result<Self, FormError> {
        let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
        if cleaned.is_empty() {
            return Err(FormError::MissingField(field));
        }
        if let Some((position, character)) =
            cleaned.chars().enumerate().find(|(_, c)| !c.is_ascii_digit())
        {
            return Err(FormError::InvalidCharacter {
                field,
                position,
                character,
            });
        }
        Ok(Self(cleaned))
    }

    /// Parses a card verification value: 3 or 4 digits.
    pub fn cvv(input: &str) -> Result<Self, FormError> {
        let code = Self::digits(input, "cvv")?;
        if !(3..=4).contains(&code.len()) {
            return Err(FormError::CvvLength { length: code.len() });
        }
        Ok(code)
    }

    /// Parses a one-time code of any length.
    pub fn otp(input: &str) -> Result<Self, FormError> {
        Self::digits(input, "twofactorAuth")
    }

    /// Parses a one-time code that must have exactly `expected` digits.
    pub fn otp_exact(input: &str, expected: usize) -> Result<Self, FormError> {
        let code = Self::otp(input)?;
        if code.len() != expected {
            return Err(FormError::OtpLength {
                expected,
                length: code.len(),
            });
        }
        Ok(code)
    }

    /// Number of digits.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a parsed code.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretCode(***)")
    }
}

impl Drop for SecretCode {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

fn require(value: &str, field: &'static str) -> Result<String, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FormError::MissingField(field));
    }
    Ok(value.to_string())
}

fn positive_amount(amount: f64) -> Result<f64, FormError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(FormError::InvalidAmount(amount))
    }
}

fn wire_expiry(input: &str) -> Result<String, FormError> {
    if input.trim().is_empty() {
        return Err(FormError::MissingField("expirationDate"));
    }
    let wire = to_wire_format(input);
    if !is_wire_format(&wire) {
        return Err(FormError::ExpiryFormat(input.to_string()));
    }
    match ExpiryDate::from_canonical(&wire) {
        Ok(_) => Ok(wire),
        Err(ExpiryError::InvalidMonth(month)) => Err(FormError::InvalidMonth(month)),
        Err(ExpiryError::InvalidFormat { .. }) => Err(FormError::ExpiryFormat(input.to_string())),
    }
}

fn search_date(input: &str) -> Result<String, FormError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(FormError::MissingField("trxDate"));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| FormError::DateFormat(input.to_string()))
}

// ============================================================================
// Endpoints
// ============================================================================

/// Gateway endpoints, relative to the gateway base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Request a card OTP.
    CardAuth,
    /// Submit a credit or debit card payment.
    CardPayment,
    /// Request a mobile payment code.
    MobileAuth,
    /// Submit a mobile payment.
    MobilePayment,
    /// Look up a bank transfer.
    TransferSearch,
    /// Look up a received mobile payment.
    MobilePaymentSearch,
}

impl Endpoint {
    /// Returns the request path.
    pub const fn path(&self) -> &'static str {
        match self {
            Self::CardAuth => "/auth",
            Self::CardPayment => "/pay",
            Self::MobileAuth => "/api/pay-mobile/request-payment-code",
            Self::MobilePayment => "/api/pay-mobile/c2p",
            Self::TransferSearch => "/mercantil/search_transfers",
            Self::MobilePaymentSearch => "/mercantil/search_mobile_payments",
        }
    }

    /// Joins the path onto a base URL, tolerating a trailing slash.
    pub fn url(&self, base: &str) -> String {
        format!("{}{}", base.trim_end_matches('/'), self.path())
    }
}

/// A request bound to one gateway endpoint.
pub trait GatewayCall: Serialize {
    /// Typed success response.
    type Response: DeserializeOwned;

    /// Endpoint the request is posted to.
    const ENDPOINT: Endpoint;

    /// One-line description with every secret masked, safe for logs.
    fn summary(&self) -> String;

    /// Serializes the JSON request body.
    fn encode(&self) -> Result<String, GatewayError> {
        tracing::debug!(endpoint = Self::ENDPOINT.path(), request = %self.summary(), "encoding gateway request");
        serde_json::to_string(self).map_err(|e| GatewayError::Encode(e.to_string()))
    }

    /// Interprets the gateway's reply to this request.
    fn decode(status: u16, body: &str) -> Result<Self::Response, GatewayError> {
        decode_response(status, body)
    }
}

// ============================================================================
// Card payments
// ============================================================================

/// Requests an OTP for a card (`/auth`).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardAuthRequest {
    #[serde(flatten)]
    credentials: Credentials,
    card_number: CardNumber,
    customer_id: String,
}

impl CardAuthRequest {
    /// Validates the card number and builds the request.
    pub fn new(
        credentials: Credentials,
        card_number: &str,
        customer: &CustomerId,
    ) -> Result<Self, FormError> {
        Ok(Self {
            credentials,
            card_number: CardNumber::parse(card_number)?,
            customer_id: customer.compact(),
        })
    }
}

impl GatewayCall for CardAuthRequest {
    type Response = AuthResponse;
    const ENDPOINT: Endpoint = Endpoint::CardAuth;

    fn summary(&self) -> String {
        format!(
            "card={} customer={}",
            self.card_number.masked(),
            self.customer_id
        )
    }
}

/// Raw card form fields shared by credit and debit payments.
#[derive(Debug, Clone, Copy)]
pub struct CardPaymentForm<'a> {
    /// Card number as typed.
    pub card_number: &'a str,
    /// CVV as typed.
    pub cvv: &'a str,
    /// Expiry as typed, `YYYYMM` or `YYYY/MM`.
    pub expiry: &'a str,
    /// Validated payer identity.
    pub customer: &'a CustomerId,
    /// Merchant invoice number.
    pub invoice_number: &'a str,
    /// Amount to charge.
    pub amount: f64,
}

struct CardFields {
    card_number: CardNumber,
    cvv: SecretCode,
    expiration_date: String,
    invoice_number: String,
    amount: f64,
}

impl CardFields {
    fn validate(form: &CardPaymentForm<'_>) -> Result<Self, FormError> {
        Ok(Self {
            card_number: CardNumber::parse(form.card_number)?,
            cvv: SecretCode::cvv(form.cvv)?,
            expiration_date: wire_expiry(form.expiry)?,
            invoice_number: require(form.invoice_number, "invoiceNumber")?,
            amount: positive_amount(form.amount)?,
        })
    }
}

/// Credit card payment (`/pay`, `tdc`).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditPaymentRequest {
    #[serde(flatten)]
    credentials: Credentials,
    card_number: CardNumber,
    cvv: SecretCode,
    expiration_date: String,
    customer_id: String,
    invoice_number: String,
    amount: f64,
    payment_method: PaymentMethod,
}

impl CreditPaymentRequest {
    /// Validates the card form and builds the request.
    ///
    /// The expiry is converted to `YYYY/MM` and must then pass the wire
    /// check and have a month in 1-12.
    pub fn from_form(credentials: Credentials, form: &CardPaymentForm<'_>) -> Result<Self, FormError> {
        let fields = CardFields::validate(form)?;
        Ok(Self {
            credentials,
            card_number: fields.card_number,
            cvv: fields.cvv,
            expiration_date: fields.expiration_date,
            customer_id: form.customer.compact(),
            invoice_number: fields.invoice_number,
            amount: fields.amount,
            payment_method: PaymentMethod::Tdc,
        })
    }
}

impl GatewayCall for CreditPaymentRequest {
    type Response = PaymentResponse;
    const ENDPOINT: Endpoint = Endpoint::CardPayment;

    fn summary(&self) -> String {
        format!(
            "tdc card={} exp={} invoice={} amount={}",
            self.card_number.masked(),
            self.expiration_date,
            self.invoice_number,
            self.amount
        )
    }
}

/// Debit card payment (`/pay`, `tdd`), confirmed with the card OTP.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebitPaymentRequest {
    #[serde(flatten)]
    credentials: Credentials,
    card_number: CardNumber,
    cvv: SecretCode,
    expiration_date: String,
    customer_id: String,
    invoice_number: String,
    amount: f64,
    payment_method: PaymentMethod,
    account_type: AccountType,
    twofactor_auth: SecretCode,
}

impl DebitPaymentRequest {
    /// Validates the card form plus the OTP and builds the request.
    ///
    /// The debit endpoint expects the customer id in lower case.
    pub fn from_form(
        credentials: Credentials,
        form: &CardPaymentForm<'_>,
        account_type: AccountType,
        otp: &str,
    ) -> Result<Self, FormError> {
        let fields = CardFields::validate(form)?;
        let twofactor_auth = SecretCode::otp(otp)?;
        Ok(Self {
            credentials,
            card_number: fields.card_number,
            cvv: fields.cvv,
            expiration_date: fields.expiration_date,
            customer_id: form.customer.lowercase(),
            invoice_number: fields.invoice_number,
            amount: fields.amount,
            payment_method: PaymentMethod::Tdd,
            account_type,
            twofactor_auth,
        })
    }
}

impl GatewayCall for DebitPaymentRequest {
    type Response = PaymentResponse;
    const ENDPOINT: Endpoint = Endpoint::CardPayment;

    fn summary(&self) -> String {
        format!(
            "tdd card={} exp={} invoice={} amount={} otp=***",
            self.card_number.masked(),
            self.expiration_date,
            self.invoice_number,
            self.amount
        )
    }
}

// ============================================================================
// Mobile payments
// ============================================================================

/// Requests a payment code for a mobile payment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileAuthRequest {
    #[serde(flatten)]
    credentials: Credentials,
    destination_id: String,
    destination_mobile: MobileNumber,
}

impl MobileAuthRequest {
    /// Validates the payee's phone number and builds the request.
    pub fn new(
        credentials: Credentials,
        destination: &CustomerId,
        destination_mobile: &str,
    ) -> Result<Self, FormError> {
        Ok(Self {
            credentials,
            destination_id: destination.compact(),
            destination_mobile: MobileNumber::parse(destination_mobile, "destinationMobile")?,
        })
    }
}

impl GatewayCall for MobileAuthRequest {
    type Response = AuthResponse;
    const ENDPOINT: Endpoint = Endpoint::MobileAuth;

    fn summary(&self) -> String {
        format!(
            "destination={} mobile={}",
            self.destination_id, self.destination_mobile
        )
    }
}

/// Mobile payment (`c2p`) confirmed with the 8-digit code.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MobilePaymentRequest {
    #[serde(flatten)]
    credentials: Credentials,
    destination_id: String,
    destination_mobile: MobileNumber,
    origin_mobile: MobileNumber,
    amount: f64,
    invoice_number: String,
    twofactor_auth: SecretCode,
}

/// Raw mobile payment form fields.
#[derive(Debug, Clone, Copy)]
pub struct MobilePaymentForm<'a> {
    /// Payee identity.
    pub destination: &'a CustomerId,
    /// Payee phone, 10 digits or with country code.
    pub destination_mobile: &'a str,
    /// Payer phone, 10 digits or with country code.
    pub origin_mobile: &'a str,
    /// Merchant invoice number.
    pub invoice_number: &'a str,
    /// Amount to charge.
    pub amount: f64,
    /// Verification code received by the payer.
    pub otp: &'a str,
}

impl MobilePaymentRequest {
    /// Validates the mobile form and builds the request.
    pub fn from_form(credentials: Credentials, form: &MobilePaymentForm<'_>) -> Result<Self, FormError> {
        Ok(Self {
            credentials,
            destination_id: form.destination.compact(),
            destination_mobile: MobileNumber::parse(form.destination_mobile, "destinationMobile")?,
            origin_mobile: MobileNumber::parse(form.origin_mobile, "originMobile")?,
            amount: positive_amount(form.amount)?,
            invoice_number: require(form.invoice_number, "invoiceNumber")?,
            twofactor_auth: SecretCode::otp_exact(form.otp, MOBILE_OTP_DIGITS)?,
        })
    }
}

impl GatewayCall for MobilePaymentRequest {
    type Response = PaymentResponse;
    const ENDPOINT: Endpoint = Endpoint::MobilePayment;

    fn summary(&self) -> String {
        format!(
            "pago_movil destination={} from={} invoice={} amount={} otp=***",
            self.destination_id, self.origin_mobile, self.invoice_number, self.amount
        )
    }
}

// ============================================================================
// Searches
// ============================================================================

/// Raw transfer search form fields.
#[derive(Debug, Clone, Copy)]
pub struct TransferSearchForm<'a> {
    /// Destination account number; whitespace is stripped.
    pub account_number: &'a str,
    /// Identity of the account holder who sent the transfer.
    pub issuer: &'a CustomerId,
    /// Transaction date, `YYYY-MM-DD`.
    pub trx_date: &'a str,
    /// Issuing bank id, see [`crate::banks`].
    pub issuer_bank_id: u16,
    /// Bank reference of the transfer.
    pub payment_reference: &'a str,
    /// Transferred amount.
    pub amount: f64,
}

/// Looks up a bank transfer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferSearchRequest {
    #[serde(flatten)]
    credentials: Credentials,
    account_number: String,
    issuer_customer_id: String,
    trx_date: String,
    issuer_bank_id: u16,
    transaction_type: u8,
    payment_reference: String,
    amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<ClientMetadata>,
}

impl TransferSearchRequest {
    /// Validates the search form and builds the request.
    pub fn from_form(
        credentials: Credentials,
        form: &TransferSearchForm<'_>,
        metadata: Option<ClientMetadata>,
    ) -> Result<Self, FormError> {
        let account_number: String = form
            .account_number
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if account_number.is_empty() {
            return Err(FormError::MissingField("accountNumber"));
        }
        Ok(Self {
            credentials,
            account_number,
            issuer_customer_id: form.issuer.hyphenated(),
            trx_date: search_date(form.trx_date)?,
            issuer_bank_id: form.issuer_bank_id,
            transaction_type: TRANSFER_TRANSACTION_TYPE,
            payment_reference: require(form.payment_reference, "paymentReference")?,
            amount: positive_amount(form.amount)?,
            metadata,
        })
    }
}

impl GatewayCall for TransferSearchRequest {
    type Response = SearchResponse<TransferRecord>;
    const ENDPOINT: Endpoint = Endpoint::TransferSearch;

    fn summary(&self) -> String {
        format!(
            "transfer ref={} date={} bank={} amount={}",
            self.payment_reference, self.trx_date, self.issuer_bank_id, self.amount
        )
    }
}

/// Raw mobile payment search form fields.
#[derive(Debug, Clone, Copy)]
pub struct MobilePaymentSearchForm<'a> {
    /// Payer phone, `58XXXXXXXXXX`.
    pub origin_mobile_number: &'a str,
    /// Payee phone, `58XXXXXXXXXX`.
    pub destination_mobile_number: &'a str,
    /// Bank reference of the payment.
    pub payment_reference: &'a str,
    /// Transaction date, `YYYY-MM-DD`.
    pub trx_date: &'a str,
    /// Paid amount.
    pub amount: f64,
    /// Currency code; empty means [`DEFAULT_CURRENCY`].
    pub currency: &'a str,
}

/// Looks up a received mobile payment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MobilePaymentSearchRequest {
    #[serde(flatten)]
    credentials: Credentials,
    amount: f64,
    currency: String,
    origin_mobile_number: MobileNumber,
    destination_mobile_number: MobileNumber,
    payment_reference: String,
    trx_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<ClientMetadata>,
}

impl MobilePaymentSearchRequest {
    /// Validates the search form and builds the request.
    ///
    /// Phone numbers must already carry the `58` country code.
    pub fn from_form(
        credentials: Credentials,
        form: &MobilePaymentSearchForm<'_>,
        metadata: Option<ClientMetadata>,
    ) -> Result<Self, FormError> {
        let currency = match form.currency.trim() {
            "" => DEFAULT_CURRENCY.to_string(),
            c => c.to_string(),
        };
        Ok(Self {
            credentials,
            amount: positive_amount(form.amount)?,
            currency,
            origin_mobile_number: MobileNumber::parse_international(
                form.origin_mobile_number,
                "originMobileNumber",
            )?,
            destination_mobile_number: MobileNumber::parse_international(
                form.destination_mobile_number,
                "destinationMobileNumber",
            )?,
            payment_reference: require(form.payment_reference, "paymentReference")?,
            trx_date: search_date(form.trx_date)?,
            metadata,
        })
    }
}

impl GatewayCall for MobilePaymentSearchRequest {
    type Response = SearchResponse<MobilePaymentRecord>;
    const ENDPOINT: Endpoint = Endpoint::MobilePaymentSearch;

    fn summary(&self) -> String {
        format!(
            "mobile ref={} date={} from={} amount={} {}",
            self.payment_reference,
            self.trx_date,
            self.origin_mobile_number,
            self.amount,
            self.currency
        )
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Second-factor prompt returned by the OTP endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoFactor {
    /// Factor kind, normally `otp`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Label to show next to the input.
    #[serde(default)]
    pub label: String,
    /// Input kind, normally `numeric`.
    #[serde(default)]
    pub field_type: String,
    /// Expected code length. The gateway sends it as a string.
    #[serde(default)]
    pub length: String,
}

impl TwoFactor {
    /// Parses [`TwoFactor::length`] as a number.
    pub fn expected_length(&self) -> Option<usize> {
        self.length.trim().parse().ok()
    }
}

/// Reply to an OTP request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// `success` or `error`.
    pub status: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Gateway timestamp.
    #[serde(default)]
    pub processing_date: Option<String>,
    /// `approved` or `rejected`; absent for mobile payments.
    #[serde(default)]
    pub trx_status: Option<String>,
    /// Transaction type.
    #[serde(default)]
    pub trx_type: Option<String>,
    /// Payment method the OTP applies to.
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    /// Second-factor prompt.
    #[serde(default)]
    pub twofactor: Option<TwoFactor>,
    /// Gateway processing time in milliseconds.
    #[serde(default)]
    pub response_time: Option<f64>,
}

/// Merchant identity echoed by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantIdentify {
    /// Integrator id.
    pub integrator_id: i64,
    /// Merchant id.
    pub merchant_id: i64,
    /// Terminal id.
    pub terminal_id: String,
}

/// Outcome of a payment at the acquiring bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionResponse {
    /// Bank timestamp.
    #[serde(default)]
    pub processing_date: String,
    /// `approved` or `rejected`.
    pub trx_status: String,
    /// Bank reference, used as the transaction id on redirects.
    pub payment_reference: String,
    /// Internal status code.
    #[serde(default)]
    pub trx_internal_status: String,
    /// Transaction type (`compra`, ...).
    #[serde(default)]
    pub trx_type: String,
    /// Payment method code.
    #[serde(default)]
    pub payment_method: String,
    /// Invoice number echoed back.
    #[serde(default)]
    pub invoice_number: String,
    /// Charged amount.
    #[serde(default)]
    pub amount: f64,
    /// Currency code.
    #[serde(default)]
    pub currency: String,
}

impl TransactionResponse {
    /// True if the bank approved the transaction.
    pub fn is_approved(&self) -> bool {
        self.trx_status.eq_ignore_ascii_case("approved")
    }
}

/// Bank section of a payment reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentBankResponse {
    /// Merchant identity.
    pub merchant_identify: MerchantIdentify,
    /// Transaction outcome.
    pub transaction_response: TransactionResponse,
}

/// Reply to a card or mobile payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentResponse {
    /// `success` or `error`.
    pub status: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Gateway processing time, e.g. `355 ms`.
    #[serde(default)]
    pub processing_time: Option<String>,
    /// Bank outcome.
    pub bank_response: PaymentBankResponse,
}

impl PaymentResponse {
    /// Shortcut to the bank reference.
    pub fn payment_reference(&self) -> &str {
        &self.bank_response.transaction_response.payment_reference
    }
}

/// Error entry reported by a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayFault {
    /// Bank error code.
    pub error_code: String,
    /// Description.
    #[serde(default)]
    pub description: String,
}

/// Bank section of a search reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults<T> {
    /// Bank timestamp.
    #[serde(default)]
    pub processing_date: Option<String>,
    /// Merchant identity.
    #[serde(default)]
    pub merchant_identify: Option<MerchantIdentify>,
    /// Matching records.
    #[serde(
        default = "Vec::new",
        rename = "records",
        alias = "transferSearchList",
        alias = "mobile_payment_search_list"
    )]
    pub records: Vec<T>,
    /// Bank-reported errors.
    #[serde(default)]
    pub error_list: Vec<GatewayFault>,
}

/// Reply to a transfer or mobile payment search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse<T> {
    /// `success` or `error`.
    pub status: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Bank section.
    #[serde(default = "Option::default")]
    pub bank_response: Option<SearchResults<T>>,
    /// Gateway processing time in milliseconds.
    #[serde(default)]
    pub response_time: Option<f64>,
}

impl<T> SearchResponse<T> {
    /// True if the gateway found the transaction.
    pub fn is_found(&self) -> bool {
        self.status == "success" && self.first().is_some()
    }

    /// First matching record.
    pub fn first(&self) -> Option<&T> {
        self.bank_response.as_ref().and_then(|b| b.records.first())
    }
}

/// One transfer returned by a transfer search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
    /// Bank reference.
    #[serde(default)]
    pub payment_reference: Option<String>,
    /// Transaction date.
    #[serde(default)]
    pub trx_date: Option<String>,
    /// Transferred amount.
    #[serde(default)]
    pub amount: Option<f64>,
    /// Account credited.
    #[serde(default)]
    pub account_number: Option<String>,
    /// Status reported by the bank.
    #[serde(default)]
    pub trx_status: Option<String>,
    /// Fields this crate does not model.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One payment returned by a mobile payment search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobilePaymentRecord {
    /// Bank reference.
    pub payment_reference: String,
    /// Transaction time.
    #[serde(default)]
    pub trx_time: Option<String>,
    /// Currency code.
    #[serde(default)]
    pub currency: Option<String>,
    /// Status reported by the bank.
    #[serde(default)]
    pub trx_status: Option<String>,
    /// Payer phone.
    #[serde(default)]
    pub origin_mobile_number: Option<String>,
    /// Payee phone.
    #[serde(default)]
    pub destination_mobile_number: Option<String>,
    /// Paid amount.
    #[serde(default)]
    pub amount: Option<f64>,
    /// Fields this crate does not model.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Interprets a gateway reply.
///
/// Checks run in a fixed order:
///
/// 1. The body must be JSON, else [`GatewayError::InvalidBody`] carrying the
///    raw text (or `HTTP <status>` when empty).
/// 2. A `"status": "error"` or `"success": false` body is a
///    [`GatewayError::Rejected`], whatever the HTTP status.
/// 3. A non-2xx status is a [`GatewayError::Http`].
/// 4. The JSON must decode into `T`, else [`GatewayError::Schema`].
///
/// # Example
///
/// ```
/// use payframe::gateway::{decode_response, AuthResponse};
/// use payframe::error::GatewayError;
///
/// let err = decode_response::<AuthResponse>(200, r#"{"status":"error","message":"Tarjeta bloqueada"}"#)
///     .unwrap_err();
/// assert_eq!(err, GatewayError::Rejected { status: 200, message: "Tarjeta bloqueada".into() });
/// ```
pub fn decode_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, GatewayError> {
    let value: Value = serde_json::from_str(body).map_err(|_| {
        let message = if body.trim().is_empty() {
            format!("HTTP {}", status)
        } else {
            body.to_string()
        };
        tracing::debug!(status, "gateway reply is not JSON");
        GatewayError::InvalidBody { status, message }
    })?;

    let message = value
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string);

    let reported_error = value.get("status").and_then(Value::as_str) == Some("error")
        || value.get("success").and_then(Value::as_bool) == Some(false);
    if reported_error {
        tracing::debug!(status, message = ?message, "gateway rejected request");
        return Err(GatewayError::Rejected {
            status,
            message: message.unwrap_or_else(|| "payment processing failed".to_string()),
        });
    }

    if !(200..300).contains(&status) {
        return Err(GatewayError::Http {
            status,
            message: message.unwrap_or_else(|| format!("HTTP {}", status)),
        });
    }

    serde_json::from_value(value).map_err(|e| GatewayError::Schema(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::DocumentKind;

    fn credentials() -> Credentials {
        Credentials::new("pXsM1bjazk/Gc7ASLqJLje4", "merchant-secret-value", "key-secret-value")
    }

    fn customer() -> CustomerId {
        CustomerId::new(DocumentKind::V, "8019884").unwrap()
    }

    fn card_form(customer: &CustomerId) -> CardPaymentForm<'_> {
        CardPaymentForm {
            card_number: "4111 1111 1111 1111",
            cvv: "123",
            expiry: "202710",
            customer,
            invoice_number: "INV-001",
            amount: 15.5,
        }
    }

    const PAYMENT_OK: &str = r#"{
        "status": "success",
        "message": "Pago procesado correctamente",
        "processing_time": "355 ms",
        "bank_response": {
            "merchant_identify": {"integratorId": 31, "merchantId": 200284, "terminalId": "abcde"},
            "transaction_response": {
                "processing_date": "2025-01-10 10:00:00 VET",
                "trx_status": "approved",
                "payment_reference": "000000000001479",
                "trx_internal_status": "0000",
                "trx_type": "compra",
                "payment_method": "tdc",
                "invoice_number": "INV-001",
                "amount": 15.5,
                "currency": "VES"
            }
        }
    }"#;

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(Endpoint::CardAuth.path(), "/auth");
        assert_eq!(Endpoint::CardPayment.path(), "/pay");
        assert_eq!(
            Endpoint::MobilePayment.url("https://gw.example.com/"),
            "https://gw.example.com/api/pay-mobile/c2p"
        );
        assert_eq!(CreditPaymentRequest::ENDPOINT, Endpoint::CardPayment);
        assert_eq!(MobilePaymentSearchRequest::ENDPOINT.path(), "/mercantil/search_mobile_payments");
    }

    #[test]
    fn test_credit_payment_body() {
        let customer = customer();
        let request = CreditPaymentRequest::from_form(credentials(), &card_form(&customer)).unwrap();
        let body: Value = serde_json::from_str(&request.encode().unwrap()).unwrap();

        assert_eq!(body["encryptedClient"], "pXsM1bjazk/Gc7ASLqJLje4");
        assert_eq!(body["cardNumber"], "4111111111111111");
        assert_eq!(body["cvv"], "123");
        assert_eq!(body["expirationDate"], "2027/10");
        assert_eq!(body["customerId"], "V8019884");
        assert_eq!(body["invoiceNumber"], "INV-001");
        assert_eq!(body["amount"], 15.5);
        assert_eq!(body["paymentMethod"], "tdc");
        assert!(body.get("accountType").is_none());
    }

    #[test]
    fn test_debit_payment_body() {
        let customer = customer();
        let request = DebitPaymentRequest::from_form(
            credentials(),
            &card_form(&customer),
            AccountType::default(),
            "123456",
        )
        .unwrap();
        let body: Value = serde_json::from_str(&request.encode().unwrap()).unwrap();

        assert_eq!(body["customerId"], "v8019884");
        assert_eq!(body["paymentMethod"], "tdd");
        assert_eq!(body["accountType"], "CC");
        assert_eq!(body["twofactorAuth"], "123456");
    }

    #[test]
    fn test_card_form_validation() {
        let customer = customer();

        let mut form = card_form(&customer);
        form.expiry = "20271";
        assert_eq!(
            CreditPaymentRequest::from_form(credentials(), &form).unwrap_err(),
            FormError::ExpiryFormat("20271".to_string())
        );

        let mut form = card_form(&customer);
        form.expiry = "202713";
        assert_eq!(
            CreditPaymentRequest::from_form(credentials(), &form).unwrap_err(),
            FormError::InvalidMonth(13)
        );

        let mut form = card_form(&customer);
        form.cvv = "12";
        assert_eq!(
            CreditPaymentRequest::from_form(credentials(), &form).unwrap_err(),
            FormError::CvvLength { length: 2 }
        );

        let mut form = card_form(&customer);
        form.amount = 0.0;
        assert_eq!(
            CreditPaymentRequest::from_form(credentials(), &form).unwrap_err(),
            FormError::InvalidAmount(0.0)
        );

        let mut form = card_form(&customer);
        form.invoice_number = "  ";
        assert_eq!(
            CreditPaymentRequest::from_form(credentials(), &form).unwrap_err(),
            FormError::MissingField("invoiceNumber")
        );

        let form = card_form(&customer);
        assert_eq!(
            DebitPaymentRequest::from_form(credentials(), &form, AccountType::Savings, "").unwrap_err(),
            FormError::MissingField("twofactorAuth")
        );
    }

    #[test]
    fn test_card_auth_request() {
        let request = CardAuthRequest::new(credentials(), "4022760000000001", &customer()).unwrap();
        assert_eq!(request.summary(), "card=402276******0001 customer=V8019884");

        let body: Value = serde_json::from_str(&request.encode().unwrap()).unwrap();
        assert_eq!(body["cardNumber"], "4022760000000001");
        assert_eq!(body["customerId"], "V8019884");
    }

    #[test]
    fn test_mobile_payment_request() {
        let destination = CustomerId::new(DocumentKind::J, "12345678").unwrap();
        let form = MobilePaymentForm {
            destination: &destination,
            destination_mobile: "4241513063",
            origin_mobile: "4142591177",
            invoice_number: "INV-9",
            amount: 100.0,
            otp: "12345678",
        };
        let request = MobilePaymentRequest::from_form(credentials(), &form).unwrap();
        let body: Value = serde_json::from_str(&request.encode().unwrap()).unwrap();

        assert_eq!(body["destinationId"], "J12345678");
        assert_eq!(body["destinationMobile"], "584241513063");
        assert_eq!(body["originMobile"], "584142591177");
        assert_eq!(body["twofactorAuth"], "12345678");

        let short_otp = MobilePaymentForm { otp: "1234", ..form };
        assert_eq!(
            MobilePaymentRequest::from_form(credentials(), &short_otp).unwrap_err(),
            FormError::OtpLength { expected: 8, length: 4 }
        );
    }

    #[test]
    fn test_mobile_auth_request() {
        let request = MobileAuthRequest::new(credentials(), &customer(), "4241513063").unwrap();
        let body: Value = serde_json::from_str(&request.encode().unwrap()).unwrap();
        assert_eq!(body["destinationId"], "V8019884");
        assert_eq!(body["destinationMobile"], "584241513063");
    }

    #[test]
    fn test_transfer_search_request() {
        let issuer = customer();
        let form = TransferSearchForm {
            account_number: "0105 0054 1510 5454 0721",
            issuer: &issuer,
            trx_date: "2025-03-14",
            issuer_bank_id: crate::banks::DEFAULT_ISSUER_BANK_ID,
            payment_reference: "123456",
            amount: 20.0,
        };
        let request = TransferSearchRequest::from_form(credentials(), &form, None).unwrap();
        let body: Value = serde_json::from_str(&request.encode().unwrap()).unwrap();

        assert_eq!(body["accountNumber"], "01050054151054540721");
        assert_eq!(body["issuerCustomerId"], "V-8019884");
        assert_eq!(body["trxDate"], "2025-03-14");
        assert_eq!(body["issuerBankId"], 105);
        assert_eq!(body["transactionType"], 1);
        assert!(body.get("metadata").is_none());

        let bad_date = TransferSearchForm { trx_date: "2025-02-30", ..form };
        assert_eq!(
            TransferSearchRequest::from_form(credentials(), &bad_date, None).unwrap_err(),
            FormError::DateFormat("2025-02-30".to_string())
        );
    }

    #[test]
    fn test_mobile_search_request() {
        let form = MobilePaymentSearchForm {
            origin_mobile_number: "584142591177",
            destination_mobile_number: "584241513063",
            payment_reference: "000123",
            trx_date: "2025-03-14",
            amount: 10.0,
            currency: "",
        };
        let request = MobilePaymentSearchRequest::from_form(credentials(), &form, None).unwrap();
        let body: Value = serde_json::from_str(&request.encode().unwrap()).unwrap();
        assert_eq!(body["currency"], "ves");
        assert_eq!(body["originMobileNumber"], "584142591177");

        let local = MobilePaymentSearchForm { origin_mobile_number: "4142591177", ..form };
        assert_eq!(
            MobilePaymentSearchRequest::from_form(credentials(), &local, None).unwrap_err(),
            FormError::MobileNumber { field: "originMobileNumber" }
        );
    }

    #[test]
    fn test_secrets_are_masked_in_debug() {
        let customer = customer();
        let request = DebitPaymentRequest::from_form(
            credentials(),
            &card_form(&customer),
            AccountType::Checking,
            "987654",
        )
        .unwrap();
        let debug = format!("{:?}", request);
        assert!(!debug.contains("4111111111111111"));
        assert!(!debug.contains("987654"));
        assert!(!debug.contains("merchant-secret-value"));
        assert!(debug.contains("411111******1111"));
    }

    #[test]
    fn test_decode_payment_ok() {
        let response = CreditPaymentRequest::decode(200, PAYMENT_OK).unwrap();
        assert_eq!(response.payment_reference(), "000000000001479");
        assert!(response.bank_response.transaction_response.is_approved());
        assert_eq!(response.bank_response.merchant_identify.merchant_id, 200284);
    }

    #[test]
    fn test_decode_order() {
        // Not JSON
        assert_eq!(
            decode_response::<PaymentResponse>(502, "Bad Gateway").unwrap_err(),
            GatewayError::InvalidBody { status: 502, message: "Bad Gateway".into() }
        );
        assert_eq!(
            decode_response::<PaymentResponse>(500, "").unwrap_err(),
            GatewayError::InvalidBody { status: 500, message: "HTTP 500".into() }
        );

        // Reported error wins over HTTP status
        assert_eq!(
            decode_response::<PaymentResponse>(400, r#"{"status":"error","message":"CVV inválido"}"#)
                .unwrap_err(),
            GatewayError::Rejected { status: 400, message: "CVV inválido".into() }
        );
        assert_eq!(
            decode_response::<PaymentResponse>(200, r#"{"success":false}"#).unwrap_err(),
            GatewayError::Rejected { status: 200, message: "payment processing failed".into() }
        );

        // HTTP failure with a JSON body
        assert_eq!(
            decode_response::<PaymentResponse>(503, r#"{"message":"maintenance"}"#).unwrap_err(),
            GatewayError::Http { status: 503, message: "maintenance".into() }
        );
        assert_eq!(
            decode_response::<PaymentResponse>(503, "{}").unwrap_err(),
            GatewayError::Http { status: 503, message: "HTTP 503".into() }
        );

        // Wrong shape
        assert!(matches!(
            decode_response::<PaymentResponse>(200, r#"{"status":"success"}"#),
            Err(GatewayError::Schema(_))
        ));
    }

    #[test]
    fn test_decode_auth() {
        let body = r#"{
            "status": "success",
            "message": "OTP enviada",
            "processing_date": "2025-01-10",
            "trx_status": "approved",
            "trx_type": "auth",
            "payment_method": "tdd",
            "twofactor": {"type": "otp", "label": "Clave", "field_type": "numeric", "length": "6"},
            "response_time": 120
        }"#;
        let response = CardAuthRequest::decode(200, body).unwrap();
        assert_eq!(response.payment_method, Some(PaymentMethod::Tdd));
        assert_eq!(response.twofactor.unwrap().expected_length(), Some(6));
    }

    #[test]
    fn test_decode_searches() {
        let body = r#"{
            "status": "success",
            "message": "ok",
            "bank_response": {
                "transferSearchList": [{"paymentReference": "123456", "amount": 20.0, "bankCode": "0105"}]
            }
        }"#;
        let response = TransferSearchRequest::decode(200, body).unwrap();
        assert!(response.is_found());
        let record = response.first().unwrap();
        assert_eq!(record.payment_reference.as_deref(), Some("123456"));
        assert_eq!(record.extra["bankCode"], "0105");

        let body = r#"{
            "status": "success",
            "message": "ok",
            "bank_response": {
                "mobile_payment_search_list": [{"paymentReference": "000123", "trxStatus": "approved"}],
                "error_list": []
            }
        }"#;
        let response = MobilePaymentSearchRequest::decode(200, body).unwrap();
        assert_eq!(response.first().map(|r| r.payment_reference.as_str()), Some("000123"));

        let empty: SearchResponse<MobilePaymentRecord> =
            decode_response(200, r#"{"status":"success","message":"sin resultados"}"#).unwrap();
        assert!(!empty.is_found());
    }
}
