//! CLI definition and dispatch.

use chrono::{DateTime, FixedOffset, NaiveDate};
use clap::{Parser, Subcommand};
use env_logger::Builder;
use log::{LevelFilter, error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use crate::adapters::digest_report::{self, ReportContext, default_template};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_store_adapter::JsonStoreAdapter;
use crate::adapters::serverchan_adapter::ServerChanAdapter;
use crate::adapters::smtp_adapter::SmtpAdapter;
use crate::adapters::tencent_quote_adapter::TencentQuoteAdapter;
use crate::domain::calculator::{PortfolioReport, ProfitCalculator};
use crate::domain::config_validation::validate_config;
use crate::domain::error::DigestError;
use crate::domain::portfolio::Portfolio;
use crate::domain::price_history::{DEFAULT_LOOKBACK_DAYS, DEFAULT_RETAIN_DAYS, PriceHistory};
use crate::domain::quote::QuoteStatus;
use crate::domain::settings::{
    DEFAULT_PUSH_ENDPOINT, DEFAULT_QUOTE_ENDPOINT, DEFAULT_SMTP_HOST, DEFAULT_SMTP_PORT,
    DEFAULT_STORE_PATH, DEFAULT_TIMEOUT_SECS, DEFAULT_UTC_OFFSET_HOURS, EmailSettings,
    PushSettings, QuoteSettings, ReportSettings, Settings, StoreSettings,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::notify_port::{Digest, NotifyPort};
use crate::ports::quote_port::QuotePort;
use crate::ports::store_port::StorePort;

#[derive(Parser, Debug)]
#[command(name = "stockdigest", about = "Daily profit/loss digest for a stock portfolio")]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch quotes, compute profit/loss and send the digest
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Run date (YYYY-MM-DD); defaults to today at the configured UTC offset
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Compute and print only: no history update, no notifications
        #[arg(long)]
        dry_run: bool,
        /// Update the history but skip notifications
        #[arg(long)]
        no_notify: bool,
    },
    /// Validate the portfolio configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show stored reference prices
    History {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
}

pub fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    // Already initialised when the library is driven from tests.
    Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_secs()
        .try_init()
        .ok();
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(cli.verbose);
    match cli.command {
        Command::Run {
            config,
            date,
            dry_run,
            no_notify,
        } => run_digest(&config, date, dry_run, no_notify),
        Command::Validate { config } => run_validate(&config),
        Command::History { config, symbol } => run_history(&config, symbol.as_deref()),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = DigestError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        error!("{err}");
        ExitCode::from(&err)
    })
}

pub fn build_settings(adapter: &dyn ConfigPort) -> Result<Settings, DigestError> {
    let timeout_secs = adapter.get_int("quote", "timeout_secs", DEFAULT_TIMEOUT_SECS)?;
    let timeout_secs = u64::try_from(timeout_secs)
        .map_err(|_| DigestError::invalid("quote", "timeout_secs", "must be positive"))?;

    let lookback_days = adapter.get_int("store", "lookback_days", i64::from(DEFAULT_LOOKBACK_DAYS))?;
    let lookback_days = u32::try_from(lookback_days)
        .map_err(|_| DigestError::invalid("store", "lookback_days", "must be positive"))?;
    let retain_days = adapter.get_int("store", "retain_days", i64::from(DEFAULT_RETAIN_DAYS))?;
    let retain_days = u32::try_from(retain_days)
        .map_err(|_| DigestError::invalid("store", "retain_days", "must be positive"))?;

    let offset_hours = adapter.get_int("report", "utc_offset_hours", DEFAULT_UTC_OFFSET_HOURS)?;
    let utc_offset = i32::try_from(offset_hours)
        .ok()
        .and_then(|h| h.checked_mul(3600))
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| DigestError::invalid("report", "utc_offset_hours", "out of range"))?;

    let smtp_port = adapter.get_int("email", "smtp_port", DEFAULT_SMTP_PORT)?;
    let smtp_port = u16::try_from(smtp_port)
        .map_err(|_| DigestError::invalid("email", "smtp_port", "out of range"))?;

    Ok(Settings {
        quote: QuoteSettings {
            endpoint: adapter
                .get_string("quote", "endpoint")
                .unwrap_or_else(|| DEFAULT_QUOTE_ENDPOINT.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        },
        store: StoreSettings {
            path: PathBuf::from(
                adapter
                    .get_string("store", "path")
                    .unwrap_or_else(|| DEFAULT_STORE_PATH.to_string()),
            ),
            lookback_days,
            retain_days,
        },
        report: ReportSettings {
            utc_offset,
            template_path: adapter
                .get_string("report", "template_path")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        },
        push: PushSettings {
            endpoint: adapter
                .get_string("push", "endpoint")
                .unwrap_or_else(|| DEFAULT_PUSH_ENDPOINT.to_string()),
        },
        email: EmailSettings {
            smtp_host: adapter
                .get_string("email", "smtp_host")
                .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            smtp_port,
        },
    })
}

/// Per-request timeout shared by the push and email sinks.
pub const NOTIFY_TIMEOUT_SECS: u64 = 15;

/// Builds every sink whose credentials are present. Missing credentials
/// skip the sink; a sink that fails to build is logged and skipped.
pub fn build_notifiers(
    settings: &Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Vec<Box<dyn NotifyPort>> {
    let mut notifiers: Vec<Box<dyn NotifyPort>> = Vec::new();
    let timeout = Duration::from_secs(NOTIFY_TIMEOUT_SECS);

    match ServerChanAdapter::from_lookup(&settings.push, timeout, &lookup) {
        Some(Ok(sink)) => notifiers.push(Box::new(sink)),
        Some(Err(e)) => error!("push notifications disabled: {e}"),
        None => info!("SERVERCHAN_KEY not set, skipping push notification"),
    }
    match SmtpAdapter::from_lookup(&settings.email, timeout, &lookup) {
        Some(Ok(sink)) => notifiers.push(Box::new(sink)),
        Some(Err(e)) => error!("email notifications disabled: {e}"),
        None => info!("SMTP_USER/SMTP_PASSWORD not set, skipping email"),
    }
    notifiers
}

/// Load the template from `template_path`, falling back to the built-in
/// default when it is unset or unreadable.
pub fn load_template(template_path: Option<&Path>) -> String {
    match template_path {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(
                    "failed to read template {}: {e}; using default",
                    path.display()
                );
                default_template::template().to_string()
            }
        },
        None => default_template::template().to_string(),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub today: NaiveDate,
    pub generated_at: DateTime<FixedOffset>,
    pub dry_run: bool,
    pub notify: bool,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub report: PortfolioReport,
    pub digest: Digest,
    pub history: PriceHistory,
    pub history_saved: bool,
    pub notified: Vec<String>,
    pub notify_failed: Vec<String>,
}

/// The ports a digest run talks to.
pub struct DigestPipeline<'a> {
    pub quotes: &'a dyn QuotePort,
    pub store: &'a dyn StorePort,
    pub notifiers: &'a [Box<dyn NotifyPort>],
}

impl DigestPipeline<'_> {
    pub fn run(
        &self,
        portfolio: &Portfolio,
        settings: &Settings,
        template: &str,
        options: &RunOptions,
    ) -> RunOutcome {
        // Stage 1: Load reference prices
        let mut history = match self.store.load() {
            Ok(h) => h,
            Err(e) => {
                warn!("{e}; continuing with empty history");
                PriceHistory::new()
            }
        };

        // Stage 2: Fetch quotes, one symbol at a time
        let mut evaluated = Vec::with_capacity(portfolio.len());
        for position in &portfolio.positions {
            info!("Fetching quote for {} ({})", position.symbol, position.name);
            let status = QuoteStatus::from(self.quotes.fetch_quote(&position.symbol));
            if let QuoteStatus::Unavailable { reason } = &status {
                warn!("{} unavailable: {reason}", position.symbol);
            }
            evaluated.push((position.clone(), status));
        }

        // Stage 3: Compute profit/loss
        let calculator =
            ProfitCalculator::new(options.today).with_lookback(settings.store.lookback_days);
        let report = calculator.build_report(evaluated, &history);
        info!(
            "Computed {} positions ({} unavailable): total {:.2}, today {:.2}",
            report.positions.len(),
            report.unavailable_count,
            report.total_profit,
            report.total_daily_profit
        );

        // Stage 4: Persist this run's prices
        let mut history_saved = false;
        if options.dry_run {
            info!("Dry run: reference prices not saved");
        } else {
            let recorded = calculator.record_prices(&report, &mut history);
            let pruned = history.prune(options.today, settings.store.retain_days);
            if pruned > 0 {
                info!("Pruned {pruned} old history dates");
            }
            match self.store.save(&history) {
                Ok(()) => {
                    info!("Saved {recorded} reference prices for {}", options.today);
                    history_saved = true;
                }
                Err(e) => warn!("{e}; reference prices not updated"),
            }
        }

        // Stage 5: Render
        let ctx = ReportContext {
            report: &report,
            generated_at: options.generated_at,
        };
        let digest = digest_report::render_digest(template, &ctx);

        // Stage 6: Notify
        let mut notified = Vec::new();
        let mut notify_failed = Vec::new();
        if options.dry_run || !options.notify {
            info!("Notifications skipped");
        } else {
            for sink in self.notifiers {
                match sink.send(&digest) {
                    Ok(()) => {
                        info!("Digest sent via {}", sink.name());
                        notified.push(sink.name().to_string());
                    }
                    Err(e) => {
                        error!("{e}");
                        notify_failed.push(sink.name().to_string());
                    }
                }
            }
        }

        RunOutcome {
            report,
            digest,
            history,
            history_saved,
            notified,
            notify_failed,
        }
    }
}

fn run_digest(
    config_path: &Path,
    date: Option<NaiveDate>,
    dry_run: bool,
    no_notify: bool,
) -> ExitCode {
    info!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let portfolio = match validate_config(&adapter) {
        Ok(p) => p,
        Err(e) => {
            error!("{e}");
            return (&e).into();
        }
    };
    let settings = match build_settings(&adapter) {
        Ok(s) => s,
        Err(e) => {
            error!("{e}");
            return (&e).into();
        }
    };

    let quotes = match TencentQuoteAdapter::new(&settings.quote) {
        Ok(q) => q,
        Err(e) => {
            error!("{e}");
            return (&e).into();
        }
    };
    let store = JsonStoreAdapter::new(settings.store.path.clone());
    let notifiers = build_notifiers(&settings, |key| std::env::var(key).ok());
    let template = load_template(settings.report.template_path.as_deref());

    let generated_at = settings.report.local_now();
    let options = RunOptions {
        today: date.unwrap_or_else(|| generated_at.date_naive()),
        generated_at,
        dry_run,
        notify: !no_notify,
    };

    let pipeline = DigestPipeline {
        quotes: &quotes,
        store: &store,
        notifiers: &notifiers,
    };
    let outcome = pipeline.run(&portfolio, &settings, &template, &options);

    println!("{}\n", outcome.digest.title);
    println!("{}", outcome.digest.markdown);
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    info!("Validating {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let portfolio = match validate_config(&adapter) {
        Ok(p) => p,
        Err(e) => {
            error!("{e}");
            return (&e).into();
        }
    };
    if let Err(e) = build_settings(&adapter) {
        error!("{e}");
        return (&e).into();
    }

    println!("{} positions:", portfolio.len());
    for position in &portfolio.positions {
        println!(
            "  {} {}: {} lots, {} shares, cost {:.2} (avg {:.3})",
            position.symbol,
            position.name,
            position.lots.len(),
            position.total_shares(),
            position.total_cost(),
            position.average_cost()
        );
    }
    println!("Config validated successfully");
    ExitCode::SUCCESS
}

fn run_history(config_path: &Path, symbol: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let settings = match build_settings(&adapter) {
        Ok(s) => s,
        Err(e) => {
            error!("{e}");
            return (&e).into();
        }
    };

    let store = JsonStoreAdapter::new(settings.store.path.clone());
    let history = match store.load() {
        Ok(h) => h,
        Err(e) => {
            error!("{e}");
            return (&e).into();
        }
    };

    let lines = format_history(&history, symbol);
    if lines.is_empty() {
        println!("No reference prices stored in {}", store.path().display());
    }
    for line in lines {
        println!("{line}");
    }
    ExitCode::SUCCESS
}

/// One line per stored date, optionally narrowed to a single symbol. A
/// symbol filter also ends with the price the next run would fall back to.
pub fn format_history(history: &PriceHistory, symbol: Option<&str>) -> Vec<String> {
    let wanted = symbol.map(|s| s.trim().to_lowercase());
    let mut lines: Vec<String> = history
        .dates()
        .filter_map(|date| {
            let prices = history.prices_on(*date)?;
            let entries: Vec<String> = prices
                .iter()
                .filter(|(s, _)| wanted.as_deref().is_none_or(|w| w == s.as_str()))
                .map(|(s, p)| format!("{s}={p}"))
                .collect();
            (!entries.is_empty()).then(|| format!("{date}  {}", entries.join("  ")))
        })
        .collect();
    if let Some(w) = wanted.as_deref() {
        if let Some((date, price)) = history.latest_for(w) {
            lines.push(format!("latest {w}: {price} ({date})"));
        }
    }
    lines
}
