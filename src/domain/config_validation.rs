//! Configuration validation.
//!
//! Validates every settings field before any quote is fetched, so a bad
//! config aborts the run instead of producing a partial digest.

use crate::domain::error::DigestError;
use crate::domain::portfolio::{Portfolio, load_portfolio};
use crate::domain::price_history::{DEFAULT_LOOKBACK_DAYS, DEFAULT_RETAIN_DAYS};
use crate::domain::settings::{DEFAULT_SMTP_PORT, DEFAULT_TIMEOUT_SECS, DEFAULT_UTC_OFFSET_HOURS};
use crate::ports::config_port::ConfigPort;

pub const MAX_TIMEOUT_SECS: i64 = 120;
pub const MAX_LOOKBACK_DAYS: i64 = 31;
/// Ten years of daily entries.
pub const MAX_RETAIN_DAYS: i64 = 3660;

pub fn validate_settings_config(config: &dyn ConfigPort) -> Result<(), DigestError> {
    validate_timeout(config)?;
    validate_endpoint(config, "quote")?;
    validate_endpoint(config, "push")?;
    validate_store(config)?;
    validate_utc_offset(config)?;
    validate_smtp_port(config)?;
    Ok(())
}

/// Validates the settings and loads the portfolio, which validates every
/// position and lot on the way.
pub fn validate_config(config: &dyn ConfigPort) -> Result<Portfolio, DigestError> {
    validate_settings_config(config)?;
    load_portfolio(config)
}

fn validate_timeout(config: &dyn ConfigPort) -> Result<(), DigestError> {
    let value = config.get_int("quote", "timeout_secs", DEFAULT_TIMEOUT_SECS)?;
    if !(1..=MAX_TIMEOUT_SECS).contains(&value) {
        return Err(DigestError::invalid(
            "quote",
            "timeout_secs",
            format!("timeout_secs must be between 1 and {MAX_TIMEOUT_SECS}"),
        ));
    }
    Ok(())
}

fn validate_endpoint(config: &dyn ConfigPort, section: &str) -> Result<(), DigestError> {
    match config.get_string(section, "endpoint") {
        Some(s) if !(s.starts_with("http://") || s.starts_with("https://")) => Err(
            DigestError::invalid(section, "endpoint", "endpoint must be an http(s) URL"),
        ),
        _ => Ok(()),
    }
}

fn validate_store(config: &dyn ConfigPort) -> Result<(), DigestError> {
    if let Some(path) = config.get_string("store", "path") {
        if path.trim().is_empty() {
            return Err(DigestError::invalid("store", "path", "path must not be empty"));
        }
    }

    let lookback = config.get_int("store", "lookback_days", i64::from(DEFAULT_LOOKBACK_DAYS))?;
    if !(1..=MAX_LOOKBACK_DAYS).contains(&lookback) {
        return Err(DigestError::invalid(
            "store",
            "lookback_days",
            format!("lookback_days must be between 1 and {MAX_LOOKBACK_DAYS}"),
        ));
    }

    let retain = config.get_int("store", "retain_days", i64::from(DEFAULT_RETAIN_DAYS))?;
    if retain < lookback {
        return Err(DigestError::invalid(
            "store",
            "retain_days",
            "retain_days must be at least lookback_days",
        ));
    }
    if retain > MAX_RETAIN_DAYS {
        return Err(DigestError::invalid(
            "store",
            "retain_days",
            format!("retain_days must be at most {MAX_RETAIN_DAYS}"),
        ));
    }
    Ok(())
}

fn validate_utc_offset(config: &dyn ConfigPort) -> Result<(), DigestError> {
    let value = config.get_int("report", "utc_offset_hours", DEFAULT_UTC_OFFSET_HOURS)?;
    if !(-12..=14).contains(&value) {
        return Err(DigestError::invalid(
            "report",
            "utc_offset_hours",
            "utc_offset_hours must be between -12 and 14",
        ));
    }
    Ok(())
}

fn validate_smtp_port(config: &dyn ConfigPort) -> Result<(), DigestError> {
    let value = config.get_int("email", "smtp_port", DEFAULT_SMTP_PORT)?;
    if !(1..=i64::from(u16::MAX)).contains(&value) {
        return Err(DigestError::invalid(
            "email",
            "smtp_port",
            "smtp_port must be between 1 and 65535",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn adapter(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    fn invalid_key(err: DigestError) -> String {
        match err {
            DigestError::ConfigInvalid { key, .. } => key,
            other => panic!("expected ConfigInvalid, got {other:?}"),
        }
    }

    #[test]
    fn empty_settings_use_valid_defaults() {
        assert!(validate_settings_config(&adapter("[quote]\n")).is_ok());
    }

    #[test]
    fn full_settings_pass() {
        let ini = r#"
[quote]
endpoint = http://qt.gtimg.cn/q=
timeout_secs = 10

[store]
path = state/prices.json
lookback_days = 7
retain_days = 30

[report]
utc_offset_hours = 8

[email]
smtp_port = 465

[push]
endpoint = https://sctapi.ftqq.com
"#;
        assert!(validate_settings_config(&adapter(ini)).is_ok());
    }

    #[test]
    fn timeout_out_of_range() {
        let err = validate_settings_config(&adapter("[quote]\ntimeout_secs = 0\n")).unwrap_err();
        assert_eq!(invalid_key(err), "timeout_secs");
        let err = validate_settings_config(&adapter("[quote]\ntimeout_secs = 500\n")).unwrap_err();
        assert_eq!(invalid_key(err), "timeout_secs");
    }

    #[test]
    fn endpoint_must_be_http() {
        let err =
            validate_settings_config(&adapter("[quote]\nendpoint = ftp://example.com/\n")).unwrap_err();
        assert_eq!(invalid_key(err), "endpoint");
    }

    #[test]
    fn lookback_out_of_range() {
        let err = validate_settings_config(&adapter("[store]\nlookback_days = 0\n")).unwrap_err();
        assert_eq!(invalid_key(err), "lookback_days");
        let err = validate_settings_config(&adapter("[store]\nlookback_days = 60\n")).unwrap_err();
        assert_eq!(invalid_key(err), "lookback_days");
    }

    #[test]
    fn retain_shorter_than_lookback() {
        let err = validate_settings_config(&adapter(
            "[store]\nlookback_days = 7\nretain_days = 3\n",
        ))
        .unwrap_err();
        assert_eq!(invalid_key(err), "retain_days");
    }

    #[test]
    fn retain_days_capped() {
        let err = validate_settings_config(&adapter("[store]\nretain_days = 4000000000\n"))
            .unwrap_err();
        assert_eq!(invalid_key(err), "retain_days");
        assert!(
            validate_settings_config(&adapter(&format!("[store]\nretain_days = {MAX_RETAIN_DAYS}\n")))
                .is_ok()
        );
    }

    #[test]
    fn non_numeric_values_rejected() {
        let err = validate_settings_config(&adapter("[quote]\ntimeout_secs = abc\n")).unwrap_err();
        assert_eq!(invalid_key(err), "timeout_secs");
        let err =
            validate_settings_config(&adapter("[store]\nlookback_days = seven\n")).unwrap_err();
        assert_eq!(invalid_key(err), "lookback_days");
        let err =
            validate_settings_config(&adapter("[email]\nsmtp_port = ssl\n")).unwrap_err();
        assert_eq!(invalid_key(err), "smtp_port");
    }

    #[test]
    fn utc_offset_out_of_range() {
        let err =
            validate_settings_config(&adapter("[report]\nutc_offset_hours = 15\n")).unwrap_err();
        assert_eq!(invalid_key(err), "utc_offset_hours");
    }

    #[test]
    fn smtp_port_out_of_range() {
        let err = validate_settings_config(&adapter("[email]\nsmtp_port = 70000\n")).unwrap_err();
        assert_eq!(invalid_key(err), "smtp_port");
    }

    #[test]
    fn validate_config_returns_portfolio() {
        let ini = "[portfolio]\nsymbols = sh601991\n\n[position.sh601991]\nname = 大唐发电\nlots = a:100@3.0\n";
        let portfolio = validate_config(&adapter(ini)).unwrap();
        assert_eq!(portfolio.len(), 1);
    }

    #[test]
    fn validate_config_checks_settings_first() {
        let ini = "[quote]\ntimeout_secs = 0\n";
        let err = validate_config(&adapter(ini)).unwrap_err();
        assert_eq!(invalid_key(err), "timeout_secs");
    }
}
