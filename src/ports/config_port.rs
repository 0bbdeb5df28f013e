//! Configuration access port trait.

use crate::domain::error::DigestError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    /// Returns `default` when the key is absent and `ConfigInvalid` when
    /// it is present but not an integer.
    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, DigestError>;
    fn has_section(&self, section: &str) -> bool;
}
