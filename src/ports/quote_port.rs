//! Quote source port trait.

use crate::domain::error::DigestError;
use crate::domain::quote::Quote;
use crate::domain::symbol::Symbol;

pub trait QuotePort {
    /// Fetches the current quote for `symbol`. Any failure is reported as
    /// [`DigestError::QuoteUnavailable`].
    fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote, DigestError>;
}
