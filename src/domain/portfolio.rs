//! Portfolio composition loaded from configuration.
//!
//! The `[portfolio]` section lists symbols in report order; every symbol
//! has a `[position.<symbol>]` section with a display name and its lots:
//!
//! ```ini
//! [portfolio]
//! symbols = sh601991, sz000767
//!
//! [position.sh601991]
//! name = 大唐发电
//! lots = 中信:186700@3.272, 国信:43300@3.507
//! ```

use std::collections::HashSet;

use super::error::DigestError;
use super::position::{Lot, Position};
use super::symbol::{Symbol, parse_symbols};
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub positions: Vec<Position>,
}

impl Portfolio {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

pub fn position_section(symbol: &Symbol) -> String {
    format!("position.{symbol}")
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LotError {
    #[error("empty lot entry")]
    Empty,

    #[error("lot '{0}' must look like label:shares@cost")]
    Malformed(String),

    #[error("lot '{label}': shares must be a non-negative integer, got '{value}'")]
    InvalidShares { label: String, value: String },

    #[error("lot '{label}': cost must be a non-negative number, got '{value}'")]
    InvalidCost { label: String, value: String },

    #[error("duplicate lot label: {0}")]
    DuplicateLabel(String),
}

/// Parses `label:shares@cost` entries separated by commas.
pub fn parse_lots(input: &str) -> Result<Vec<Lot>, LotError> {
    let mut lots = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let entry = token.trim();
        if entry.is_empty() {
            return Err(LotError::Empty);
        }
        let (head, cost_str) = entry
            .rsplit_once('@')
            .ok_or_else(|| LotError::Malformed(entry.to_string()))?;
        let (label, shares_str) = head
            .rsplit_once(':')
            .ok_or_else(|| LotError::Malformed(entry.to_string()))?;
        let label = label.trim();
        if label.is_empty() {
            return Err(LotError::Malformed(entry.to_string()));
        }

        let shares: u64 = shares_str
            .trim()
            .parse()
            .map_err(|_| LotError::InvalidShares {
                label: label.to_string(),
                value: shares_str.trim().to_string(),
            })?;
        let cost: f64 = cost_str
            .trim()
            .parse()
            .ok()
            .filter(|c: &f64| c.is_finite() && *c >= 0.0)
            .ok_or_else(|| LotError::InvalidCost {
                label: label.to_string(),
                value: cost_str.trim().to_string(),
            })?;

        if !seen.insert(label.to_string()) {
            return Err(LotError::DuplicateLabel(label.to_string()));
        }
        lots.push(Lot::new(label, shares, cost));
    }

    Ok(lots)
}

pub fn load_portfolio(config: &dyn ConfigPort) -> Result<Portfolio, DigestError> {
    let symbols_str = config
        .get_string("portfolio", "symbols")
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| DigestError::missing("portfolio", "symbols"))?;
    let symbols =
        parse_symbols(&symbols_str).map_err(|e| DigestError::invalid("portfolio", "symbols", e.to_string()))?;

    let mut positions = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        positions.push(load_position(config, symbol)?);
    }

    Ok(Portfolio { positions })
}

fn load_position(config: &dyn ConfigPort, symbol: Symbol) -> Result<Position, DigestError> {
    let section = position_section(&symbol);
    if !config.has_section(&section) {
        return Err(DigestError::missing(&section, "lots"));
    }

    let name = config
        .get_string(&section, "name")
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| symbol.to_string());

    let lots_str = config
        .get_string(&section, "lots")
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| DigestError::missing(&section, "lots"))?;
    let lots = parse_lots(&lots_str).map_err(|e| DigestError::invalid(&section, "lots", e.to_string()))?;

    let position = Position::new(symbol, name, lots);
    if position.total_shares() == 0 {
        return Err(DigestError::invalid(
            &section,
            "lots",
            "total shares must be positive",
        ));
    }
    Ok(position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    #[test]
    fn parse_lots_reads_label_shares_cost() {
        let lots = parse_lots("中信:186700@3.272, 国信:43300@3.507").unwrap();
        assert_eq!(lots.len(), 2);
        assert_eq!(lots[0], Lot::new("中信", 186700, 3.272));
        assert_eq!(lots[1], Lot::new("国信", 43300, 3.507));
    }

    #[test]
    fn parse_lots_tolerates_spacing() {
        let lots = parse_lots(" add 1 : 9300 @ 8.59 ").unwrap();
        assert_eq!(lots, vec![Lot::new("add 1", 9300, 8.59)]);
    }

    #[test]
    fn parse_lots_allows_zero_shares_and_zero_cost() {
        let lots = parse_lots("gift:100@0, sold:0@8.5").unwrap();
        assert_eq!(lots[0].cost, 0.0);
        assert_eq!(lots[1].shares, 0);
    }

    #[test]
    fn parse_lots_rejects_malformed() {
        assert_eq!(parse_lots("100@3.0"), Err(LotError::Malformed("100@3.0".into())));
        assert_eq!(parse_lots("a:100"), Err(LotError::Malformed("a:100".into())));
        assert_eq!(parse_lots(":100@3.0"), Err(LotError::Malformed(":100@3.0".into())));
        assert_eq!(parse_lots("a:1@1,,b:1@1"), Err(LotError::Empty));
    }

    #[test]
    fn parse_lots_rejects_negative_shares_and_cost() {
        assert!(matches!(parse_lots("a:-100@3.0"), Err(LotError::InvalidShares { .. })));
        assert!(matches!(parse_lots("a:1.5@3.0"), Err(LotError::InvalidShares { .. })));
        assert!(matches!(parse_lots("a:100@-3.0"), Err(LotError::InvalidCost { .. })));
        assert!(matches!(parse_lots("a:100@abc"), Err(LotError::InvalidCost { .. })));
        assert!(matches!(parse_lots("a:100@inf"), Err(LotError::InvalidCost { .. })));
    }

    #[test]
    fn parse_lots_rejects_duplicate_labels() {
        assert_eq!(
            parse_lots("a:1@1, a:2@2"),
            Err(LotError::DuplicateLabel("a".into()))
        );
    }

    const PORTFOLIO_INI: &str = r#"
[portfolio]
symbols = sh601991, sz000767

[position.sh601991]
name = 大唐发电
lots = 中信:186700@3.272, 国信:43300@3.507, 东方:163600@2.926

[position.sz000767]
lots = 中信:30100@2.998
"#;

    #[test]
    fn load_portfolio_in_configured_order() {
        let adapter = FileConfigAdapter::from_string(PORTFOLIO_INI).unwrap();
        let portfolio = load_portfolio(&adapter).unwrap();
        assert_eq!(portfolio.len(), 2);
        assert_eq!(portfolio.positions[0].symbol.to_string(), "sh601991");
        assert_eq!(portfolio.positions[0].name, "大唐发电");
        assert_eq!(portfolio.positions[0].total_shares(), 393600);
        assert_eq!(portfolio.positions[1].name, "sz000767");
    }

    #[test]
    fn load_portfolio_requires_symbols() {
        let adapter = FileConfigAdapter::from_string("[portfolio]\n").unwrap();
        let err = load_portfolio(&adapter).unwrap_err();
        assert!(matches!(err, DigestError::ConfigMissing { key, .. } if key == "symbols"));
    }

    #[test]
    fn load_portfolio_requires_position_section() {
        let adapter =
            FileConfigAdapter::from_string("[portfolio]\nsymbols = sh601991\n").unwrap();
        let err = load_portfolio(&adapter).unwrap_err();
        assert!(
            matches!(err, DigestError::ConfigMissing { section, .. } if section == "position.sh601991")
        );
    }

    #[test]
    fn load_portfolio_rejects_zero_total_shares() {
        let ini = "[portfolio]\nsymbols = sh601991\n\n[position.sh601991]\nlots = a:0@3.0\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let err = load_portfolio(&adapter).unwrap_err();
        assert!(matches!(err, DigestError::ConfigInvalid { key, .. } if key == "lots"));
    }

    #[test]
    fn load_portfolio_reports_bad_symbol() {
        let adapter =
            FileConfigAdapter::from_string("[portfolio]\nsymbols = xx601991\n").unwrap();
        let err = load_portfolio(&adapter).unwrap_err();
        assert!(matches!(err, DigestError::ConfigInvalid { key, .. } if key == "symbols"));
    }
}
