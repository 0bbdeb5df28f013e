//! Positions and the lots they are built from.

use super::symbol::Symbol;

/// One batch of shares bought at a single cost basis.
#[derive(Debug, Clone, PartialEq)]
pub struct Lot {
    pub label: String,
    pub shares: u64,
    pub cost: f64,
}

impl Lot {
    pub fn new(label: impl Into<String>, shares: u64, cost: f64) -> Self {
        Lot {
            label: label.into(),
            shares,
            cost,
        }
    }

    pub fn cost_basis(&self) -> f64 {
        self.shares as f64 * self.cost
    }
}

/// A holding in one symbol, aggregated across its lots.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub symbol: Symbol,
    pub name: String,
    pub lots: Vec<Lot>,
}

impl Position {
    pub fn new(symbol: Symbol, name: impl Into<String>, lots: Vec<Lot>) -> Self {
        Position {
            symbol,
            name: name.into(),
            lots,
        }
    }

    pub fn total_shares(&self) -> u64 {
        self.lots.iter().map(|lot| lot.shares).sum()
    }

    pub fn total_cost(&self) -> f64 {
        self.lots.iter().map(Lot::cost_basis).sum()
    }

    /// Average cost per share; 0 for a position with no shares.
    pub fn average_cost(&self) -> f64 {
        let shares = self.total_shares();
        if shares == 0 {
            0.0
        } else {
            self.total_cost() / shares as f64
        }
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.total_shares() as f64 * price
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::symbol::Market;
    use approx::assert_relative_eq;

    fn three_lot_position() -> Position {
        Position::new(
            Symbol::new(Market::Shanghai, "601991"),
            "大唐发电",
            vec![
                Lot::new("中信", 100, 3.00),
                Lot::new("国信", 200, 3.20),
                Lot::new("东方", 100, 3.10),
            ],
        )
    }

    #[test]
    fn totals_sum_over_lots() {
        let pos = three_lot_position();
        assert_eq!(pos.total_shares(), 400);
        assert_relative_eq!(pos.total_cost(), 1250.0, epsilon = 1e-9);
    }

    #[test]
    fn average_cost() {
        let pos = three_lot_position();
        assert_relative_eq!(pos.average_cost(), 3.125, epsilon = 1e-12);
    }

    #[test]
    fn average_cost_without_shares_is_zero() {
        let pos = Position::new(Symbol::new(Market::Shenzhen, "000767"), "晋控电力", vec![]);
        assert_eq!(pos.total_shares(), 0);
        assert_eq!(pos.total_cost(), 0.0);
        assert_eq!(pos.average_cost(), 0.0);
    }

    #[test]
    fn market_value_uses_all_shares() {
        let pos = three_lot_position();
        assert_relative_eq!(pos.market_value(3.5), 1400.0, epsilon = 1e-9);
    }

    #[test]
    fn lot_cost_basis() {
        let lot = Lot::new("加仓1", 9300, 8.59);
        assert_relative_eq!(lot.cost_basis(), 79887.0, epsilon = 1e-6);
    }
}
