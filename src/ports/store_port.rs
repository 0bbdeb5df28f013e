//! Reference price persistence port trait.

use crate::domain::error::DigestError;
use crate::domain::price_history::PriceHistory;

pub trait StorePort {
    /// Loads the stored history. A store that does not exist yet loads as
    /// an empty history.
    fn load(&self) -> Result<PriceHistory, DigestError>;

    fn save(&self, history: &PriceHistory) -> Result<(), DigestError>;
}
