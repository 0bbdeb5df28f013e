//! Run settings read from the non-portfolio config sections.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use std::path::PathBuf;
use std::time::Duration;

use super::price_history::{DEFAULT_LOOKBACK_DAYS, DEFAULT_RETAIN_DAYS};

pub const DEFAULT_QUOTE_ENDPOINT: &str = "http://qt.gtimg.cn/q=";
pub const DEFAULT_TIMEOUT_SECS: i64 = 10;
pub const DEFAULT_STORE_PATH: &str = "reference_prices.json";
pub const DEFAULT_UTC_OFFSET_HOURS: i64 = 8;
pub const DEFAULT_PUSH_ENDPOINT: &str = "https://sctapi.ftqq.com";
pub const DEFAULT_SMTP_HOST: &str = "smtp.qq.com";
pub const DEFAULT_SMTP_PORT: i64 = 465;

#[derive(Debug, Clone, PartialEq)]
pub struct QuoteSettings {
    pub endpoint: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreSettings {
    pub path: PathBuf,
    pub lookback_days: u32,
    pub retain_days: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    pub utc_offset: FixedOffset,
    pub template_path: Option<PathBuf>,
}

impl ReportSettings {
    pub fn local_now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.utc_offset)
    }

    pub fn today(&self) -> NaiveDate {
        self.local_now().date_naive()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PushSettings {
    pub endpoint: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailSettings {
    pub smtp_host: String,
    pub smtp_port: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub quote: QuoteSettings,
    pub store: StoreSettings,
    pub report: ReportSettings,
    pub push: PushSettings,
    pub email: EmailSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            quote: QuoteSettings {
                endpoint: DEFAULT_QUOTE_ENDPOINT.to_string(),
                timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS as u64),
            },
            store: StoreSettings {
                path: PathBuf::from(DEFAULT_STORE_PATH),
                lookback_days: DEFAULT_LOOKBACK_DAYS,
                retain_days: DEFAULT_RETAIN_DAYS,
            },
            report: ReportSettings {
                utc_offset: FixedOffset::east_opt(DEFAULT_UTC_OFFSET_HOURS as i32 * 3600)
                    .unwrap_or_else(|| Utc.fix()),
                template_path: None,
            },
            push: PushSettings {
                endpoint: DEFAULT_PUSH_ENDPOINT.to_string(),
            },
            email: EmailSettings {
                smtp_host: DEFAULT_SMTP_HOST.to_string(),
                smtp_port: DEFAULT_SMTP_PORT as u16,
            },
        }
    }
}
