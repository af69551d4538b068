//! WebAssembly bindings for the payment pages.
//!
//! This module exposes the form helpers and the gateway plumbing to the
//! browser pages that host the payment forms.
//!
//! # Usage from JavaScript
//!
//! ```javascript
//! import init, { identify_brand, format_card, to_wire_format, payment_outcome } from 'payframe';
//!
//! await init();
//!
//! // As the user types
//! cardInput.value = format_card(cardInput.value);
//! cardFace.dataset.brand = identify_brand(cardInput.value);   // "zinli"
//!
//! // On submit
//! const expirationDate = to_wire_format(expiryInput.value);    // "2027/10"
//!
//! // After the gateway answers
//! const outcome = payment_outcome(location.search, response.status, await response.text());
//! window.parent.postMessage(JSON.parse(outcome.message), outcome.target_origin);
//! if (outcome.redirect) location.href = outcome.redirect;
//! ```

#![cfg(feature = "wasm")]

use wasm_bindgen::prelude::*;

use crate::config::FrameParams;
use crate::frame::{FrameReply, SearchRecord};
use crate::gateway::{
    decode_response, MobilePaymentRecord, PaymentResponse, SearchResponse, TransferRecord,
};

/// Identifies the brand of a (partial) card number.
///
/// Returns the stable brand id: `zinli`, `visa`, `mastercard` or `unknown`.
///
/// # Example
/// ```javascript
/// identify_brand("4022 76");  // "zinli"
/// identify_brand("4022");     // "visa"
/// ```
#[wasm_bindgen]
pub fn identify_brand(card_number: &str) -> String {
    crate::identify_brand(card_number).id().to_string()
}

/// Returns the human-readable brand name of a (partial) card number.
#[wasm_bindgen]
pub fn brand_name(card_number: &str) -> String {
    crate::identify_brand(card_number).name().to_string()
}

/// Formats a card number for the input field, grouped by four.
///
/// # Example
/// ```javascript
/// format_card("41111111");  // "4111 1111"
/// ```
#[wasm_bindgen]
pub fn format_card(card_number: &str) -> String {
    crate::format::format_for_display(card_number)
}

/// Strips all formatting, leaving the digits sent to the gateway.
#[wasm_bindgen]
pub fn clean_card(card_number: &str) -> String {
    crate::format::clean_for_transmission(card_number)
}

/// Returns the display groups as an array of strings.
#[wasm_bindgen]
pub fn card_groups(card_number: &str) -> js_sys::Array {
    crate::format::split_groups(card_number)
        .into_iter()
        .map(JsValue::from)
        .collect()
}

/// Renders the number shown on the card-face preview.
#[wasm_bindgen]
pub fn card_face_number(card_number: &str) -> String {
    crate::format::card_face_number(card_number)
}

/// Masks a card number for display, keeping the last four digits.
#[wasm_bindgen]
pub fn mask_card(card_number: &str) -> String {
    crate::mask::mask_last_four(card_number)
}

/// Formats the expiry field as the user types (`YYYY/MM`).
#[wasm_bindgen]
pub fn format_expiry_input(expiry: &str) -> String {
    crate::expiry::format_expiry_input(expiry)
}

/// Converts typed `YYYYMM` digits into the `YYYY/MM` wire format.
#[wasm_bindgen]
pub fn to_wire_format(expiry: &str) -> String {
    crate::expiry::to_wire_format(expiry)
}

/// Converts typed `YYYYMM` digits into `MM/YY`.
#[wasm_bindgen]
pub fn to_short_year(expiry: &str) -> String {
    crate::expiry::to_short_year(expiry)
}

/// Returns true if the value is in `YYYY/MM` form.
#[wasm_bindgen]
pub fn is_wire_format(expiry: &str) -> bool {
    crate::expiry::is_wire_format(expiry)
}

/// Renders the expiry shown on the card-face preview.
#[wasm_bindgen]
pub fn card_face_expiry(expiry: &str) -> String {
    crate::expiry::card_face_expiry(expiry)
}

/// Result of typed expiry parsing, returned to JavaScript.
#[wasm_bindgen]
pub struct ExpiryResult {
    valid: bool,
    month: Option<u8>,
    year: Option<u16>,
    wire: Option<String>,
    short: Option<String>,
    error: Option<String>,
}

#[wasm_bindgen]
impl ExpiryResult {
    #[wasm_bindgen(getter)]
    pub fn valid(&self) -> bool {
        self.valid
    }

    #[wasm_bindgen(getter)]
    pub fn month(&self) -> Option<u8> {
        self.month
    }

    #[wasm_bindgen(getter)]
    pub fn year(&self) -> Option<u16> {
        self.year
    }

    #[wasm_bindgen(getter)]
    pub fn wire(&self) -> Option<String> {
        self.wire.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn short(&self) -> Option<String> {
        self.short.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn error(&self) -> Option<String> {
        self.error.clone()
    }
}

/// Parses the expiry and checks the month.
///
/// # Example
/// ```javascript
/// const result = parse_expiry("202710");
/// console.log(result.wire);   // "2027/10"
/// console.log(result.short);  // "10/27"
/// ```
#[wasm_bindgen]
pub fn parse_expiry(expiry: &str) -> ExpiryResult {
    match crate::expiry::ExpiryDate::from_canonical(expiry) {
        Ok(exp) => ExpiryResult {
            valid: true,
            month: Some(exp.month()),
            year: Some(exp.year()),
            wire: Some(exp.wire()),
            short: Some(exp.short()),
            error: None,
        },
        Err(e) => ExpiryResult {
            valid: false,
            month: None,
            year: None,
            wire: None,
            short: None,
            error: Some(e.to_string()),
        },
    }
}

/// Decodes the page's query string into the client configuration JSON.
///
/// The returned document carries the frame metadata.
#[wasm_bindgen]
pub fn load_client_data(query: &str) -> Result<String, JsValue> {
    let params = FrameParams::from_query(query).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let client = params
        .client_data()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_json::to_string(&client).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// What the page should do after a payment reply, returned to JavaScript.
#[wasm_bindgen]
pub struct PaymentOutcome {
    success: bool,
    message: String,
    target_origin: String,
    redirect: Option<String>,
}

#[wasm_bindgen]
impl PaymentOutcome {
    #[wasm_bindgen(getter)]
    pub fn success(&self) -> bool {
        self.success
    }

    /// Frame message JSON for `postMessage`.
    #[wasm_bindgen(getter)]
    pub fn message(&self) -> String {
        self.message.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn target_origin(&self) -> String {
        self.target_origin.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn redirect(&self) -> Option<String> {
        self.redirect.clone()
    }
}

/// Interprets a payment reply and builds the host notification.
#[wasm_bindgen]
pub fn payment_outcome(query: &str, status: u16, body: &str) -> Result<PaymentOutcome, JsValue> {
    let params = FrameParams::from_query(query).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let (success, reply) = match decode_response::<PaymentResponse>(status, body) {
        Ok(response) => {
            let reply = FrameReply::success(&params, &response)
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            (true, reply)
        }
        Err(e) => (false, FrameReply::error(&params, &e.to_string())),
    };

    outcome(success, reply)
}

/// Interprets a transfer search reply and builds the host notification.
#[wasm_bindgen]
pub fn transfer_search_outcome(query: &str, status: u16, body: &str) -> Result<PaymentOutcome, JsValue> {
    search_outcome::<TransferRecord>(query, status, body)
}

/// Interprets a mobile payment search reply and builds the host notification.
#[wasm_bindgen]
pub fn mobile_payment_search_outcome(
    query: &str,
    status: u16,
    body: &str,
) -> Result<PaymentOutcome, JsValue> {
    search_outcome::<MobilePaymentRecord>(query, status, body)
}

fn search_outcome<T>(query: &str, status: u16, body: &str) -> Result<PaymentOutcome, JsValue>
where
    T: SearchRecord + serde::de::DeserializeOwned,
{
    let params = FrameParams::from_query(query).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let (success, reply) = match decode_response::<SearchResponse<T>>(status, body) {
        Ok(response) => {
            let reply = FrameReply::search_success(&params, &response)
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            (true, reply)
        }
        Err(e) => (false, FrameReply::search_error(&params, T::KIND, &e.to_string())),
    };

    outcome(success, reply)
}

fn outcome(success: bool, reply: FrameReply) -> Result<PaymentOutcome, JsValue> {
    Ok(PaymentOutcome {
        success,
        message: reply
            .message
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))?,
        target_origin: reply.target_origin,
        redirect: reply.redirect,
    })
}
