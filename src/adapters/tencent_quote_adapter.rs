//! Tencent real-time quote adapter implementing QuotePort.
//!
//! `GET http://qt.gtimg.cn/q=sh601991` answers with a single JS assignment:
//!
//! ```text
//! v_sh601991="1~大唐发电~601991~3.45~3.41~3.40~...";
//! ```
//!
//! Fields are `~`-separated: 2 is the code, 3 the current price, 4 the
//! previous close and 5 the open. The body is GBK; only the ASCII numeric
//! fields are used, so it is decoded lossily.

use log::debug;
use reqwest::blocking::Client;

use crate::domain::error::DigestError;
use crate::domain::quote::Quote;
use crate::domain::settings::QuoteSettings;
use crate::domain::symbol::Symbol;
use crate::ports::quote_port::QuotePort;

const FIELD_CODE: usize = 2;
const FIELD_PRICE: usize = 3;
const FIELD_PREVIOUS_CLOSE: usize = 4;
const FIELD_OPEN: usize = 5;

pub struct TencentQuoteAdapter {
    client: Client,
    endpoint: String,
}

impl TencentQuoteAdapter {
    pub fn new(settings: &QuoteSettings) -> Result<Self, DigestError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| DigestError::Io(std::io::Error::other(e)))?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
        })
    }

    fn url(&self, symbol: &Symbol) -> String {
        format!("{}{}", self.endpoint, symbol)
    }
}

impl QuotePort for TencentQuoteAdapter {
    fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote, DigestError> {
        let unavailable = |reason: String| DigestError::QuoteUnavailable {
            symbol: symbol.to_string(),
            reason,
        };

        let response = self
            .client
            .get(self.url(symbol))
            .send()
            .map_err(|e| unavailable(format!("request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!("HTTP {status}")));
        }
        let bytes = response
            .bytes()
            .map_err(|e| unavailable(format!("failed to read body: {e}")))?;
        let body = String::from_utf8_lossy(&bytes);
        debug!("quote body for {symbol}: {}", body.trim());

        parse_quote(&body, symbol).map_err(unavailable)
    }
}

/// Parses a Tencent quote response body for `symbol`.
pub fn parse_quote(body: &str, symbol: &Symbol) -> Result<Quote, String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err("empty response".into());
    }
    if trimmed.contains("v_pv_none_match") {
        return Err("unknown symbol".into());
    }

    let payload = match (trimmed.find('"'), trimmed.rfind('"')) {
        (Some(start), Some(end)) if end > start => &trimmed[start + 1..end],
        _ => trimmed,
    };
    let fields: Vec<&str> = payload.split('~').collect();
    if fields.len() <= FIELD_PREVIOUS_CLOSE {
        return Err(format!("expected at least 5 fields, got {}", fields.len()));
    }

    let code = fields[FIELD_CODE].trim();
    if !code.eq_ignore_ascii_case(&symbol.code) {
        return Err(format!("response is for {code}, not {}", symbol.code));
    }

    let current_price = parse_price(fields[FIELD_PRICE], "current price")?;
    if current_price <= 0.0 {
        return Err("no trade price (suspended or not yet open)".into());
    }
    let previous_close = parse_price(fields[FIELD_PREVIOUS_CLOSE], "previous close")?;
    let open = fields
        .get(FIELD_OPEN)
        .and_then(|f| f.trim().parse::<f64>().ok())
        .filter(|p| p.is_finite() && *p > 0.0);

    Ok(Quote {
        current_price,
        previous_close: Some(previous_close).filter(|p| *p > 0.0),
        open,
    })
}

fn parse_price(field: &str, what: &str) -> Result<f64, String> {
    let value: f64 = field
        .trim()
        .parse()
        .map_err(|_| format!("{what} is not a number: '{}'", field.trim()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{what} out of range: {value}"));
    }
    Ok(value)
}
