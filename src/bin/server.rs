//! REST API server for the payment form helpers.
//!
//! Lets server-rendered payment pages and host applications reuse the
//! same card identification, formatting and frame logic as the browser.
//!
//! # Usage
//!
//! ```bash
//! # Start server
//! payframe-server
//!
//! # With custom port
//! payframe-server --port 8080
//! ```
//!
//! # Swagger UI
//!
//! Visit http://localhost:3000/swagger-ui/ for interactive API documentation.

use axum::{
    extract::Query,
    http::{header, Method, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::{IntoParams, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use payframe::config::FrameParams;
use payframe::frame::FrameReply;
use payframe::gateway::{decode_response, PaymentResponse};
use payframe::{banks, expiry, format, identify_brand, mask, CardNumber};

// ============================================================================
// OpenAPI Documentation
// ============================================================================

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Payframe API",
        version = "0.1.0",
        description = "Card identification, formatting and payment frame helpers for embeddable payment forms.",
        license(name = "MIT OR Apache-2.0"),
        contact(name = "API Support")
    ),
    tags(
        (name = "Cards", description = "Card brand identification and checks"),
        (name = "Formatting", description = "Card number and expiry formatting"),
        (name = "Frame", description = "Client configuration and host notifications"),
        (name = "Banks", description = "Venezuelan bank directory"),
        (name = "System", description = "Health and status endpoints")
    ),
    paths(
        identify_handler,
        card_handler,
        format_handler,
        expiry_handler,
        mask_handler,
        config_handler,
        outcome_handler,
        banks_handler,
        health,
    ),
    components(schemas(
        IdentifyQuery,
        IdentifyResponse,
        CardRequest,
        CardResponse,
        FormatRequest,
        FormatResponse,
        ExpiryRequest,
        ExpiryResponse,
        MaskRequest,
        MaskResponse,
        ConfigRequest,
        ConfigResponse,
        OutcomeRequest,
        OutcomeResponse,
        BankEntry,
        HealthResponse,
    ))
)]
struct ApiDoc;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize, ToSchema, IntoParams)]
struct IdentifyQuery {
    /// Card number or prefix; separators are ignored
    card: String,
}

#[derive(Serialize, ToSchema)]
#[schema(example = json!({"brand": "zinli", "name": "Zinli", "known": true}))]
struct IdentifyResponse {
    /// Stable brand id: zinli, visa, mastercard or unknown
    brand: String,
    /// Display name
    name: String,
    /// Whether a BIN rule matched
    known: bool,
}

#[derive(Deserialize, ToSchema)]
#[schema(example = json!({"card_number": "4022 7600 0000 0001"}))]
struct CardRequest {
    /// Complete card number (13-19 digits, spaces or dashes allowed)
    card_number: String,
}

#[derive(Serialize, ToSchema)]
#[schema(example = json!({
    "valid": true,
    "brand": "zinli",
    "last_four": "0001",
    "masked": "402276******0001"
}))]
struct CardResponse {
    /// Whether the number is acceptable for submission
    valid: bool,
    /// Identified brand id
    #[serde(skip_serializing_if = "Option::is_none")]
    brand: Option<String>,
    /// Last 4 digits (safe for display per PCI-DSS)
    #[serde(skip_serializing_if = "Option::is_none")]
    last_four: Option<String>,
    /// BIN and last four with the middle masked (safe for logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    masked: Option<String>,
    /// Why the number was rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[schema(example = json!({"card_number": "41111111111111119"}))]
struct FormatRequest {
    /// Card number as typed
    card_number: String,
}

#[derive(Serialize, ToSchema)]
struct FormatResponse {
    /// Display form: groups of four, at most 16 digits
    display: String,
    /// Transmission form: every digit, no separators
    clean: String,
    /// Display groups
    groups: Vec<String>,
    /// Card-face preview
    card_face: String,
}

#[derive(Deserialize, ToSchema)]
#[schema(example = json!({"date": "202710"}))]
struct ExpiryRequest {
    /// Expiry typed as YYYYMM
    date: String,
}

#[derive(Serialize, ToSchema)]
struct ExpiryResponse {
    /// Whether the date has six digits and a month in 01-12
    valid: bool,
    /// Wire format (YYYY/MM); the input unchanged when it is not six digits
    wire: String,
    /// Card-face format (MM/YY); the input unchanged when it is not six digits
    short: String,
    /// Month (1-12)
    #[serde(skip_serializing_if = "Option::is_none")]
    month: Option<u8>,
    /// Year (4 digits)
    #[serde(skip_serializing_if = "Option::is_none")]
    year: Option<u16>,
    /// Why the date was rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Deserialize, ToSchema)]
struct MaskRequest {
    /// Card number to mask
    card_number: String,
    /// Keep the BIN (first 6 digits) visible
    #[serde(default)]
    with_bin: bool,
}

#[derive(Serialize, ToSchema)]
struct MaskResponse {
    /// Masked card number
    masked: String,
}

#[derive(Deserialize, ToSchema)]
#[schema(example = json!({"query": "?data=eyJ...&mode=odoo&origin=https://erp.example"}))]
struct ConfigRequest {
    /// Query string of the payment page URL
    query: String,
}

#[derive(Serialize, ToSchema)]
struct ConfigResponse {
    /// Invoice being paid
    invoice_number: String,
    /// Amount to charge
    amount: f64,
    /// Customer document, if prefilled
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_id: Option<String>,
    /// Host order reference
    #[serde(skip_serializing_if = "Option::is_none")]
    order_id: Option<String>,
    /// Frame mode: odoo or standalone
    mode: String,
    /// UI language
    language: String,
    /// targetOrigin used for postMessage
    target_origin: String,
    /// Where the browser returns after payment
    #[serde(skip_serializing_if = "Option::is_none")]
    return_url: Option<String>,
}

#[derive(Deserialize, ToSchema)]
struct OutcomeRequest {
    /// Query string of the payment page URL
    query: String,
    /// HTTP status of the gateway reply
    status: u16,
    /// Raw body of the gateway reply
    body: String,
}

#[derive(Serialize, ToSchema)]
struct OutcomeResponse {
    /// Whether the payment was approved
    success: bool,
    /// Message to post to the parent window
    #[schema(value_type = Object)]
    message: serde_json::Value,
    /// targetOrigin for postMessage
    target_origin: String,
    /// Redirect URL, when the page has a return URL
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect: Option<String>,
}

#[derive(Serialize, ToSchema)]
struct BankEntry {
    /// Four-digit bank code
    code: String,
    /// Commercial name
    name: String,
}

#[derive(Serialize, ToSchema)]
struct HealthResponse {
    /// Service status
    status: String,
    /// API version
    version: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Identify the brand of a (partial) card number
#[utoipa::path(
    get,
    path = "/identify",
    params(IdentifyQuery),
    responses(
        (status = 200, description = "Identified brand", body = IdentifyResponse)
    ),
    tag = "Cards"
)]
async fn identify_handler(Query(query): Query<IdentifyQuery>) -> Json<IdentifyResponse> {
    let brand = identify_brand(&query.card);
    Json(IdentifyResponse {
        brand: brand.id().to_string(),
        name: brand.name().to_string(),
        known: brand.is_known(),
    })
}

/// Check a complete card number
#[utoipa::path(
    post,
    path = "/card",
    request_body = CardRequest,
    responses(
        (status = 200, description = "Card check result", body = CardResponse)
    ),
    tag = "Cards"
)]
async fn card_handler(Json(req): Json<CardRequest>) -> Json<CardResponse> {
    match CardNumber::parse(&req.card_number) {
        Ok(card) => Json(CardResponse {
            valid: true,
            brand: Some(card.brand().id().to_string()),
            last_four: Some(card.last_four()),
            masked: Some(card.masked()),
            error: None,
        }),
        Err(e) => Json(CardResponse {
            valid: false,
            brand: None,
            last_four: None,
            masked: None,
            error: Some(e.to_string()),
        }),
    }
}

/// Format a card number
#[utoipa::path(
    post,
    path = "/format",
    request_body = FormatRequest,
    responses(
        (status = 200, description = "Formatted card", body = FormatResponse)
    ),
    tag = "Formatting"
)]
async fn format_handler(Json(req): Json<FormatRequest>) -> Json<FormatResponse> {
    Json(FormatResponse {
        display: format::format_for_display(&req.card_number),
        clean: format::clean_for_transmission(&req.card_number),
        groups: format::split_groups(&req.card_number),
        card_face: format::card_face_number(&req.card_number),
    })
}

/// Normalize an expiry date
#[utoipa::path(
    post,
    path = "/expiry",
    request_body = ExpiryRequest,
    responses(
        (status = 200, description = "Expiry forms", body = ExpiryResponse)
    ),
    tag = "Formatting"
)]
async fn expiry_handler(Json(req): Json<ExpiryRequest>) -> Json<ExpiryResponse> {
    let wire = expiry::to_wire_format(&req.date);
    let short = expiry::to_short_year(&req.date);

    match expiry::ExpiryDate::from_canonical(&req.date) {
        Ok(exp) => Json(ExpiryResponse {
            valid: true,
            wire,
            short,
            month: Some(exp.month()),
            year: Some(exp.year()),
            error: None,
        }),
        Err(e) => Json(ExpiryResponse {
            valid: false,
            wire,
            short,
            month: None,
            year: None,
            error: Some(e.to_string()),
        }),
    }
}

/// Mask a card number for display or logs
#[utoipa::path(
    post,
    path = "/mask",
    request_body = MaskRequest,
    responses(
        (status = 200, description = "Masked card", body = MaskResponse),
        (status = 400, description = "Card number rejected")
    ),
    tag = "Cards"
)]
async fn mask_handler(Json(req): Json<MaskRequest>) -> Result<Json<MaskResponse>, (StatusCode, String)> {
    let masked = if req.with_bin {
        let card = CardNumber::parse(&req.card_number)
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
        mask::mask_with_bin(&card)
    } else {
        mask::mask_last_four(&format::clean_for_transmission(&req.card_number))
    };
    Ok(Json(MaskResponse { masked }))
}

/// Decode the client configuration of a payment page URL
#[utoipa::path(
    post,
    path = "/config/decode",
    request_body = ConfigRequest,
    responses(
        (status = 200, description = "Decoded configuration", body = ConfigResponse),
        (status = 400, description = "Missing or malformed configuration")
    ),
    tag = "Frame"
)]
async fn config_handler(Json(req): Json<ConfigRequest>) -> Result<Json<ConfigResponse>, (StatusCode, String)> {
    let params = FrameParams::from_query(&req.query).map_err(bad_request)?;
    let client = params.client_data().map_err(bad_request)?;

    Ok(Json(ConfigResponse {
        invoice_number: client.invoice_number,
        amount: client.amount,
        customer_id: client.customer_id,
        order_id: client.order_id,
        mode: params.mode.to_string(),
        language: params.language.clone(),
        target_origin: params.target_origin().to_string(),
        return_url: params.return_url.clone(),
    }))
}

/// Build the host notification for a gateway payment reply
#[utoipa::path(
    post,
    path = "/payment/outcome",
    request_body = OutcomeRequest,
    responses(
        (status = 200, description = "Frame message and redirect", body = OutcomeResponse),
        (status = 400, description = "Malformed query string")
    ),
    tag = "Frame"
)]
async fn outcome_handler(Json(req): Json<OutcomeRequest>) -> Result<Json<OutcomeResponse>, (StatusCode, String)> {
    let params = FrameParams::from_query(&req.query).map_err(bad_request)?;

    let (success, reply) = match decode_response::<PaymentResponse>(req.status, &req.body) {
        Ok(response) => {
            let reply = FrameReply::success(&params, &response).map_err(internal_error)?;
            (true, reply)
        }
        Err(e) => {
            tracing::info!(status = e.status(), "payment rejected: {}", e);
            (false, FrameReply::error(&params, &e.to_string()))
        }
    };

    Ok(Json(OutcomeResponse {
        success,
        message: serde_json::to_value(&reply.message).map_err(internal_error)?,
        target_origin: reply.target_origin,
        redirect: reply.redirect,
    }))
}

/// List Venezuelan banks
#[utoipa::path(
    get,
    path = "/banks",
    responses(
        (status = 200, description = "Bank directory", body = [BankEntry])
    ),
    tag = "Banks"
)]
async fn banks_handler() -> Json<Vec<BankEntry>> {
    Json(
        banks::BANKS
            .iter()
            .map(|bank| BankEntry {
                code: bank.code.to_string(),
                name: bank.name.to_string(),
            })
            .collect(),
    )
}

/// Health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "System"
)]
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Helpers
// ============================================================================

fn bad_request(e: impl std::fmt::Display) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, e.to_string())
}

fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    tracing::error!("failed to build frame reply: {}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse args
    let port: u16 = std::env::args()
        .skip_while(|a| a != "--port")
        .nth(1)
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin(Any);

    // Build router with Swagger UI
    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/identify", get(identify_handler))
        .route("/card", post(card_handler))
        .route("/format", post(format_handler))
        .route("/expiry", post(expiry_handler))
        .route("/mask", post(mask_handler))
        .route("/config/decode", post(config_handler))
        .route("/payment/outcome", post(outcome_handler))
        .route("/banks", get(banks_handler))
        .route("/health", get(health))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting server on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}:{}/swagger-ui/", "localhost", port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
