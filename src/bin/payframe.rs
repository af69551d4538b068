//! CLI tool for payment form helpers.
//!
//! # Usage
//!
//! ```bash
//! # Identify a card brand (partial numbers allowed)
//! payframe brand 402276
//!
//! # Identify with a partner-issued BIN table
//! payframe brand 4000001234567890 --table bins.json
//!
//! # Format a card number for display or transmission
//! payframe format 4111111111111111
//! payframe format "4111 1111 1111 1111" --clean
//!
//! # Normalize an expiry date
//! payframe expiry 202710
//!
//! # Decode the `data` parameter of a payment page URL
//! payframe config --query "?data=eyJlbmNyeXB0ZWRDbGllbnQiOi...&mode=odoo"
//!
//! # Build a standalone debit card payment link
//! payframe link client.json --service tdd --base https://pay.example
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use payframe::config::{
    encode_client_data_json, payment_link, ClientData, FrameParams, ServiceRoute,
};
use payframe::rules::BinTable;
use payframe::{banks, expiry, format, mask, CardNumber, ConfigError};

#[derive(Parser)]
#[command(name = "payframe")]
#[command(author, version, about = "Card identification and payment form helpers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Identify the brand of a (partial) card number
    Brand {
        /// Card number or prefix (spaces and dashes allowed)
        card_number: String,

        /// JSON BIN table replacing the built-in one
        #[arg(short, long)]
        table: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },

    /// Check a complete card number as the payment form would
    Card {
        /// Card number (13-19 digits)
        card_number: String,

        /// Output format
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },

    /// Format a card number
    Format {
        /// Card number to format
        card_number: String,

        /// Print the transmission form (digits only, no cap)
        #[arg(short, long)]
        clean: bool,
    },

    /// Normalize an expiry date typed as YYYYMM
    Expiry {
        /// Expiry date
        date: String,
    },

    /// Mask a card number (PCI-DSS compliant)
    Mask {
        /// Card number to mask
        card_number: String,

        /// Include BIN (first 6 digits)
        #[arg(short, long)]
        with_bin: bool,
    },

    /// Decode or build the client configuration of a payment page URL
    Config {
        /// Base64 `data` parameter
        data: Option<String>,

        /// Full query string; takes precedence over DATA
        #[arg(short, long)]
        query: Option<String>,

        /// Encode this JSON file instead of decoding
        #[arg(short, long, conflicts_with_all = ["data", "query"])]
        encode: Option<PathBuf>,
    },

    /// Build a standalone payment link from a client JSON file
    Link {
        /// Client configuration JSON file
        file: PathBuf,

        /// Service: tdc, tdd, payment-mobile, search-transfers, search-mobile-payments
        #[arg(short, long, default_value = "tdd")]
        service: String,

        /// Deployment base URL of the payment pages
        #[arg(short, long)]
        base: String,
    },

    /// List Venezuelan banks, or look one up by code
    Banks {
        /// Four-digit bank code
        code: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Brand {
            card_number,
            table,
            output,
        } => cmd_brand(&card_number, table, output),
        Commands::Card {
            card_number,
            output,
        } => cmd_card(&card_number, output),
        Commands::Format { card_number, clean } => {
            cmd_format(&card_number, clean);
            Ok(())
        }
        Commands::Expiry { date } => cmd_expiry(&date),
        Commands::Mask {
            card_number,
            with_bin,
        } => cmd_mask(&card_number, with_bin),
        Commands::Config {
            data,
            query,
            encode,
        } => cmd_config(data, query, encode),
        Commands::Link {
            file,
            service,
            base,
        } => cmd_link(&file, &service, &base),
        Commands::Banks { code } => cmd_banks(code.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_brand(card_number: &str, table: Option<PathBuf>, output: OutputFormat) -> Result<(), String> {
    let loaded;
    let table = match table {
        Some(path) => {
            let json = fs::read_to_string(&path)
                .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
            loaded = BinTable::from_json(&json).map_err(|e| e.to_string())?;
            &loaded
        }
        None => BinTable::standard(),
    };

    let brand = table.identify(card_number);
    match output {
        OutputFormat::Text => {
            println!("Brand: {}", brand.name());
            println!("Id: {}", brand.id());
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "brand": brand,
                "name": brand.name(),
                "known": brand.is_known(),
            });
            println!("{}", value);
        }
    }
    Ok(())
}

fn cmd_card(card_number: &str, output: OutputFormat) -> Result<(), String> {
    let card = CardNumber::parse(card_number).map_err(|e| e.to_string())?;
    match output {
        OutputFormat::Text => {
            println!("Brand: {}", card.brand().name());
            println!("Length: {}", card.length());
            println!("Last Four: {}", card.last_four());
            println!("Masked: {}", card.masked());
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "brand": card.brand(),
                "length": card.length(),
                "last_four": card.last_four(),
                "masked": card.masked(),
            });
            println!("{}", value);
        }
    }
    Ok(())
}

fn cmd_format(card_number: &str, clean: bool) {
    if clean {
        println!("{}", format::clean_for_transmission(card_number));
    } else {
        println!("{}", format::format_for_display(card_number));
    }
}

fn cmd_expiry(date: &str) -> Result<(), String> {
    let wire = expiry::to_wire_format(date);
    if !expiry::is_wire_format(&wire) {
        return Err(format!("'{}' is not YYYYMM (e.g. 202710)", date));
    }

    let exp = expiry::ExpiryDate::from_canonical(&wire).map_err(|e| e.to_string())?;
    println!("Wire: {}", exp.wire());
    println!("Card Face: {}", exp.short());
    println!("Month: {:02}", exp.month());
    println!("Year: {}", exp.year());
    Ok(())
}

fn cmd_mask(card_number: &str, with_bin: bool) -> Result<(), String> {
    if with_bin {
        let card = CardNumber::parse(card_number).map_err(|e| e.to_string())?;
        println!("{}", mask::mask_with_bin(&card));
    } else {
        let digits = format::clean_for_transmission(card_number);
        if digits.len() < 4 {
            return Err("card number too short".to_string());
        }
        println!("{}", mask::mask_last_four(&digits));
    }
    Ok(())
}

fn cmd_link(file: &Path, service: &str, base: &str) -> Result<(), String> {
    let route: ServiceRoute = service.parse().map_err(|e: ConfigError| e.to_string())?;
    let json = fs::read_to_string(file)
        .map_err(|e| format!("cannot read {}: {}", file.display(), e))?;
    let client: ClientData = serde_json::from_str(&json).map_err(|e| e.to_string())?;
    let link = payment_link(base, route, &client).map_err(|e| e.to_string())?;
    println!("{}", link);
    Ok(())
}

fn cmd_config(
    data: Option<String>,
    query: Option<String>,
    encode: Option<PathBuf>,
) -> Result<(), String> {
    if let Some(path) = encode {
        let json = fs::read_to_string(&path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
        // Reject documents the payment pages would not accept.
        serde_json::from_str::<ClientData>(&json).map_err(|e| e.to_string())?;
        println!("{}", encode_client_data_json(json.trim()));
        return Ok(());
    }

    let params = match (query, data) {
        (Some(query), _) => FrameParams::from_query(&query).map_err(|e| e.to_string())?,
        (None, Some(data)) => FrameParams {
            data: Some(data),
            ..FrameParams::default()
        },
        (None, None) => return Err("provide DATA, --query or --encode".to_string()),
    };

    let client = params.client_data().map_err(|e| e.to_string())?;
    println!("Invoice: {}", client.invoice_number);
    println!("Amount: {}", client.amount);
    if let Some(customer) = &client.customer_id {
        println!("Customer: {}", customer);
    }
    if let Some(order) = &client.order_id {
        println!("Order: {}", order);
    }
    if let Some(description) = &client.description {
        println!("Description: {}", description);
    }
    println!("Mode: {}", params.mode);
    println!("Language: {}", params.language);
    println!("Target Origin: {}", params.target_origin());
    if let Some(url) = &params.return_url {
        println!("Return URL: {}", url);
    }
    println!("Credentials: {}", mask::truncate_secret(&client.encrypted_client, 10));
    Ok(())
}

fn cmd_banks(code: Option<&str>) -> Result<(), String> {
    match code {
        Some(code) => {
            let bank = banks::lookup(code).ok_or_else(|| format!("no bank with code {}", code))?;
            println!("{} {}", bank.code, bank.name);
        }
        None => {
            for bank in banks::BANKS {
                println!("{} {}", bank.code, bank.name);
            }
        }
    }
    Ok(())
}
