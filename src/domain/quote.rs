//! Quotes as reported by the quote source.

use super::error::DigestError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub current_price: f64,
    /// Exchange-reported previous close, when the source provides one.
    pub previous_close: Option<f64>,
    pub open: Option<f64>,
}

impl Quote {
    pub fn new(current_price: f64) -> Self {
        Quote {
            current_price,
            previous_close: None,
            open: None,
        }
    }

    pub fn with_previous_close(mut self, previous_close: f64) -> Self {
        self.previous_close = Some(previous_close);
        self
    }

    /// Previous close usable as a reference price (present and positive).
    pub fn usable_previous_close(&self) -> Option<f64> {
        self.previous_close.filter(|p| p.is_finite() && *p > 0.0)
    }
}

/// Outcome of fetching one quote. A failed fetch stays a failure all the
/// way to the report; it is never replaced by a placeholder price.
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteStatus {
    Available(Quote),
    Unavailable { reason: String },
}

impl QuoteStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, QuoteStatus::Available(_))
    }
}

impl From<Result<Quote, DigestError>> for QuoteStatus {
    fn from(result: Result<Quote, DigestError>) -> Self {
        match result {
            Ok(quote) => QuoteStatus::Available(quote),
            Err(DigestError::QuoteUnavailable { reason, .. }) => QuoteStatus::Unavailable { reason },
            Err(e) => QuoteStatus::Unavailable {
                reason: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usable_previous_close_filters_non_positive() {
        assert_eq!(Quote::new(3.5).usable_previous_close(), None);
        assert_eq!(
            Quote::new(3.5).with_previous_close(0.0).usable_previous_close(),
            None
        );
        assert_eq!(
            Quote::new(3.5).with_previous_close(3.3).usable_previous_close(),
            Some(3.3)
        );
    }

    #[test]
    fn status_from_unavailable_error_keeps_reason() {
        let status: QuoteStatus = Err(DigestError::QuoteUnavailable {
            symbol: "sh601991".into(),
            reason: "connection refused".into(),
        })
        .into();
        assert_eq!(
            status,
            QuoteStatus::Unavailable {
                reason: "connection refused".into()
            }
        );
    }

    #[test]
    fn status_from_ok() {
        let status: QuoteStatus = Ok(Quote::new(3.45)).into();
        assert!(status.is_available());
    }
}
