//! Date-keyed reference price history.
//!
//! Each run records the prices it observed under the run date. Lookups
//! walk backward from the day before the run date for a bounded number of
//! days, so a Monday run still finds Friday's prices while a symbol that
//! was never recorded yields nothing.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_LOOKBACK_DAYS: u32 = 7;
pub const DEFAULT_RETAIN_DAYS: u32 = 30;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceHistory {
    entries: BTreeMap<NaiveDate, BTreeMap<String, f64>>,
}

impl PriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = &NaiveDate> {
        self.entries.keys()
    }

    pub fn prices_on(&self, date: NaiveDate) -> Option<&BTreeMap<String, f64>> {
        self.entries.get(&date)
    }

    pub fn record(&mut self, date: NaiveDate, symbol: &str, price: f64) {
        self.entries
            .entry(date)
            .or_default()
            .insert(symbol.to_string(), price);
    }

    pub fn get(&self, date: NaiveDate, symbol: &str) -> Option<f64> {
        self.entries.get(&date).and_then(|m| m.get(symbol)).copied()
    }

    /// Most recent price for `symbol` strictly before `today`, at most
    /// `lookback_days` back.
    pub fn lookup(&self, symbol: &str, today: NaiveDate, lookback_days: u32) -> Option<(NaiveDate, f64)> {
        (1..=i64::from(lookback_days))
            .map_while(|back| today.checked_sub_signed(Duration::days(back)))
            .find_map(|date| self.get(date, symbol).map(|price| (date, price)))
    }

    pub fn latest_for(&self, symbol: &str) -> Option<(NaiveDate, f64)> {
        self.entries
            .iter()
            .rev()
            .find_map(|(date, prices)| prices.get(symbol).map(|p| (*date, *p)))
    }

    /// Drops every date older than `today - retain_days`. Returns how many
    /// dates were removed. A window reaching past the earliest
    /// representable date keeps everything.
    pub fn prune(&mut self, today: NaiveDate, retain_days: u32) -> usize {
        let Some(cutoff) = today.checked_sub_signed(Duration::days(i64::from(retain_days))) else {
            return 0;
        };
        let before = self.entries.len();
        self.entries.retain(|date, _| *date >= cutoff);
        before - self.entries.len()
    }
}
