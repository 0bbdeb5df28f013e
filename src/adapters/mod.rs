//! Concrete adapter implementations for ports.

pub mod digest_report;
pub mod file_config_adapter;
pub mod json_store_adapter;
pub mod serverchan_adapter;
pub mod smtp_adapter;
pub mod tencent_quote_adapter;
