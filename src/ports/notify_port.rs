//! Notification sink port trait.

use crate::domain::error::DigestError;

/// A rendered report ready for delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct Digest {
    pub title: String,
    pub markdown: String,
    pub html: String,
}

pub trait NotifyPort {
    /// Short sink name used in logs and errors.
    fn name(&self) -> &str;

    fn send(&self, digest: &Digest) -> Result<(), DigestError>;
}
