//! Market-prefixed stock symbols (`sh601991`, `sz000767`, ...).
//!
//! The prefix selects the exchange the quote source should ask; the code
//! is the exchange's own ticker. Symbol lists in the portfolio config are
//! parsed here, mirroring how ticker lists are validated elsewhere: no
//! empty tokens, no duplicates.

use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Market {
    Shanghai,
    Shenzhen,
    Beijing,
    HongKong,
}

impl Market {
    pub fn prefix(&self) -> &'static str {
        match self {
            Market::Shanghai => "sh",
            Market::Shenzhen => "sz",
            Market::Beijing => "bj",
            Market::HongKong => "hk",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Market> {
        match prefix {
            "sh" => Some(Market::Shanghai),
            "sz" => Some(Market::Shenzhen),
            "bj" => Some(Market::Beijing),
            "hk" => Some(Market::HongKong),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    pub market: Market,
    pub code: String,
}

impl Symbol {
    pub fn new(market: Market, code: impl Into<String>) -> Self {
        Symbol {
            market,
            code: code.into(),
        }
    }

    pub fn parse(input: &str) -> Result<Symbol, SymbolError> {
        let lowered = input.trim().to_lowercase();
        if lowered.len() < 3 || !lowered.is_ascii() {
            return Err(SymbolError::Malformed(input.trim().to_string()));
        }
        let (prefix, code) = lowered.split_at(2);
        let market = Market::from_prefix(prefix)
            .ok_or_else(|| SymbolError::UnknownMarket(prefix.to_string()))?;
        if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(SymbolError::Malformed(input.trim().to_string()));
        }
        Ok(Symbol::new(market, code))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.market.prefix(), self.code)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SymbolError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("unknown market prefix: {0}")]
    UnknownMarket(String),

    #[error("malformed symbol: {0}")]
    Malformed(String),
}

pub fn parse_symbols(input: &str) -> Result<Vec<Symbol>, SymbolError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(SymbolError::EmptyToken);
        }
        let symbol = Symbol::parse(trimmed)?;
        if !seen.insert(symbol.clone()) {
            return Err(SymbolError::DuplicateSymbol(symbol.to_string()));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}
