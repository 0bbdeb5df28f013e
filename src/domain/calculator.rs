//! Profit and loss for positions and the whole portfolio.
//!
//! Everything here is pure: quotes and the price history come in, results
//! come out. A failed quote degrades only its own position, which then
//! contributes exactly zero to every aggregate.

use chrono::NaiveDate;

use super::position::Position;
use super::price_history::{DEFAULT_LOOKBACK_DAYS, PriceHistory};
use super::quote::{Quote, QuoteStatus};

/// Where the day-over-day baseline came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReferenceSource {
    /// Exchange-reported previous close embedded in the quote.
    Quote,
    /// A price recorded by an earlier run.
    Stored { date: NaiveDate },
    /// Nothing known yet; the current price is its own baseline.
    FirstObservation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionMetrics {
    pub current_price: f64,
    pub reference_price: f64,
    pub reference_source: ReferenceSource,
    pub market_value: f64,
    pub profit: f64,
    pub profit_rate: f64,
    pub daily_delta: f64,
    pub daily_profit: f64,
    pub daily_rate: f64,
    pub price_change_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PositionStatus {
    Available(PositionMetrics),
    Unavailable { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionResult {
    pub symbol: String,
    pub name: String,
    pub total_shares: u64,
    pub total_cost: f64,
    pub status: PositionStatus,
}

impl PositionResult {
    pub fn metrics(&self) -> Option<&PositionMetrics> {
        match &self.status {
            PositionStatus::Available(m) => Some(m),
            PositionStatus::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.metrics().is_some()
    }

    pub fn profit(&self) -> f64 {
        self.metrics().map_or(0.0, |m| m.profit)
    }

    pub fn daily_profit(&self) -> f64 {
        self.metrics().map_or(0.0, |m| m.daily_profit)
    }

    pub fn market_value(&self) -> f64 {
        self.metrics().map_or(0.0, |m| m.market_value)
    }

    pub fn average_cost(&self) -> f64 {
        ratio(self.total_cost, self.total_shares as f64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioReport {
    pub positions: Vec<PositionResult>,
    pub total_cost: f64,
    pub total_market_value: f64,
    pub total_profit: f64,
    pub total_daily_profit: f64,
    pub total_rate: f64,
    pub total_daily_rate: f64,
    pub available_count: usize,
    pub unavailable_count: usize,
}

impl PortfolioReport {
    pub fn from_results(positions: Vec<PositionResult>) -> Self {
        let available: Vec<&PositionResult> =
            positions.iter().filter(|p| p.is_available()).collect();

        let total_cost: f64 = available.iter().map(|p| p.total_cost).sum();
        let total_market_value: f64 = available.iter().map(|p| p.market_value()).sum();
        let total_profit: f64 = available.iter().map(|p| p.profit()).sum();
        let total_daily_profit: f64 = available.iter().map(|p| p.daily_profit()).sum();
        let available_count = available.len();
        let unavailable_count = positions.len() - available_count;

        PortfolioReport {
            total_rate: ratio(total_profit, total_cost),
            total_daily_rate: ratio(total_daily_profit, total_cost),
            positions,
            total_cost,
            total_market_value,
            total_profit,
            total_daily_profit,
            available_count,
            unavailable_count,
        }
    }

    pub fn unavailable(&self) -> impl Iterator<Item = &PositionResult> {
        self.positions.iter().filter(|p| !p.is_available())
    }
}

/// Evaluates positions against quotes and the recorded history.
#[derive(Debug, Clone, Copy)]
pub struct ProfitCalculator {
    pub today: NaiveDate,
    pub lookback_days: u32,
}

impl ProfitCalculator {
    pub fn new(today: NaiveDate) -> Self {
        ProfitCalculator {
            today,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }

    pub fn with_lookback(mut self, lookback_days: u32) -> Self {
        self.lookback_days = lookback_days;
        self
    }

    pub fn evaluate(
        &self,
        position: &Position,
        quote: &QuoteStatus,
        history: &PriceHistory,
    ) -> PositionResult {
        let total_shares = position.total_shares();
        let total_cost = position.total_cost();

        let status = match quote {
            QuoteStatus::Available(quote) => {
                let (reference_price, reference_source) =
                    self.resolve_reference(&position.symbol.to_string(), quote, history);
                PositionStatus::Available(compute_metrics(
                    total_shares,
                    total_cost,
                    quote.current_price,
                    reference_price,
                    reference_source,
                ))
            }
            QuoteStatus::Unavailable { reason } => PositionStatus::Unavailable {
                reason: reason.clone(),
            },
        };

        PositionResult {
            symbol: position.symbol.to_string(),
            name: position.name.clone(),
            total_shares,
            total_cost,
            status,
        }
    }

    pub fn resolve_reference(
        &self,
        symbol: &str,
        quote: &Quote,
        history: &PriceHistory,
    ) -> (f64, ReferenceSource) {
        if let Some(previous_close) = quote.usable_previous_close() {
            return (previous_close, ReferenceSource::Quote);
        }
        match history.lookup(symbol, self.today, self.lookback_days) {
            Some((date, price)) => (price, ReferenceSource::Stored { date }),
            None => (quote.current_price, ReferenceSource::FirstObservation),
        }
    }

    /// Evaluates every position in order and aggregates the results.
    pub fn build_report(
        &self,
        evaluated: impl IntoIterator<Item = (Position, QuoteStatus)>,
        history: &PriceHistory,
    ) -> PortfolioReport {
        let results = evaluated
            .into_iter()
            .map(|(position, quote)| self.evaluate(&position, &quote, history))
            .collect();
        PortfolioReport::from_results(results)
    }

    /// Writes each available position's current price under the run date.
    /// Unavailable positions leave the history untouched.
    pub fn record_prices(&self, report: &PortfolioReport, history: &mut PriceHistory) -> usize {
        let mut recorded = 0;
        for result in &report.positions {
            if let Some(metrics) = result.metrics() {
                history.record(self.today, &result.symbol, metrics.current_price);
                recorded += 1;
            }
        }
        recorded
    }
}

pub fn compute_metrics(
    total_shares: u64,
    total_cost: f64,
    current_price: f64,
    reference_price: f64,
    reference_source: ReferenceSource,
) -> PositionMetrics {
    let shares = total_shares as f64;
    let market_value = shares * current_price;
    let profit = market_value - total_cost;
    let daily_delta = current_price - reference_price;
    let daily_profit = shares * daily_delta;

    PositionMetrics {
        current_price,
        reference_price,
        reference_source,
        market_value,
        profit,
        profit_rate: ratio(profit, total_cost),
        daily_delta,
        daily_profit,
        daily_rate: ratio(daily_profit, total_cost),
        price_change_rate: ratio(daily_delta, reference_price),
    }
}

/// `numerator / denominator`, or 0 when the denominator is 0.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
