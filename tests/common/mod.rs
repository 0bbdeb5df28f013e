#![allow(dead_code)]

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use stockdigest::cli::RunOptions;
use stockdigest::domain::error::DigestError;
use stockdigest::domain::portfolio::Portfolio;
use stockdigest::domain::position::{Lot, Position};
use stockdigest::domain::price_history::PriceHistory;
use stockdigest::domain::quote::Quote;
use stockdigest::domain::symbol::Symbol;
use stockdigest::ports::notify_port::{Digest, NotifyPort};
use stockdigest::ports::quote_port::QuotePort;
use stockdigest::ports::store_port::StorePort;

pub struct MockQuotePort {
    pub quotes: HashMap<String, Quote>,
    pub errors: HashMap<String, String>,
    pub requested: RefCell<Vec<String>>,
}

impl MockQuotePort {
    pub fn new() -> Self {
        Self {
            quotes: HashMap::new(),
            errors: HashMap::new(),
            requested: RefCell::new(Vec::new()),
        }
    }

    pub fn with_quote(mut self, symbol: &str, quote: Quote) -> Self {
        self.quotes.insert(symbol.to_string(), quote);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl QuotePort for MockQuotePort {
    fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote, DigestError> {
        let key = symbol.to_string();
        self.requested.borrow_mut().push(key.clone());
        if let Some(reason) = self.errors.get(&key) {
            return Err(DigestError::QuoteUnavailable {
                symbol: key,
                reason: reason.clone(),
            });
        }
        self.quotes
            .get(&key)
            .copied()
            .ok_or_else(|| DigestError::QuoteUnavailable {
                symbol: key,
                reason: "no mock quote".into(),
            })
    }
}

/// In-memory store; `fail_load` / `fail_save` simulate a broken file.
pub struct MemoryStore {
    pub history: RefCell<PriceHistory>,
    pub saves: RefCell<usize>,
    pub fail_load: bool,
    pub fail_save: bool,
}

impl MemoryStore {
    pub fn new(history: PriceHistory) -> Self {
        Self {
            history: RefCell::new(history),
            saves: RefCell::new(0),
            fail_load: false,
            fail_save: false,
        }
    }

    pub fn empty() -> Self {
        Self::new(PriceHistory::new())
    }
}

impl StorePort for MemoryStore {
    fn load(&self) -> Result<PriceHistory, DigestError> {
        if self.fail_load {
            return Err(DigestError::Store {
                path: "memory".into(),
                reason: "corrupt".into(),
            });
        }
        Ok(self.history.borrow().clone())
    }

    fn save(&self, history: &PriceHistory) -> Result<(), DigestError> {
        if self.fail_save {
            return Err(DigestError::Store {
                path: "memory".into(),
                reason: "read-only".into(),
            });
        }
        *self.history.borrow_mut() = history.clone();
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}

/// Records sent digests into a shared log the test keeps a handle on.
pub struct RecordingNotifier {
    pub name: String,
    pub fail: bool,
    pub sent: Rc<RefCell<Vec<Digest>>>,
}

impl RecordingNotifier {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fail: false,
            sent: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            fail: true,
            ..Self::new(name)
        }
    }
}

impl NotifyPort for RecordingNotifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, digest: &Digest) -> Result<(), DigestError> {
        if self.fail {
            return Err(DigestError::NotificationFailed {
                sink: self.name.clone(),
                reason: "HTTP 500".into(),
            });
        }
        self.sent.borrow_mut().push(digest.clone());
        Ok(())
    }
}

pub fn symbol(s: &str) -> Symbol {
    Symbol::parse(s).unwrap()
}

pub fn scenario_position() -> Position {
    Position::new(
        symbol("sh601991"),
        "大唐发电",
        vec![
            Lot::new("中信", 100, 3.00),
            Lot::new("国信", 200, 3.20),
            Lot::new("东方", 100, 3.10),
        ],
    )
}

pub fn second_position() -> Position {
    Position::new(
        symbol("sz000767"),
        "晋控电力",
        vec![Lot::new("中信", 1000, 3.00), Lot::new("国信", 500, 3.10)],
    )
}

pub fn sample_portfolio() -> Portfolio {
    Portfolio {
        positions: vec![scenario_position(), second_position()],
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn generated_at(today: NaiveDate) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(8 * 3600)
        .unwrap()
        .from_local_datetime(&today.and_hms_opt(15, 5, 0).unwrap())
        .unwrap()
}

pub fn options(today: NaiveDate) -> RunOptions {
    RunOptions {
        today,
        generated_at: generated_at(today),
        dry_run: false,
        notify: true,
    }
}
