//! Markdown and HTML blocks for the digest.
//!
//! Every position goes through the same renderer, in portfolio order.
//! Positions whose quote failed get an explicit "data unavailable" line
//! instead of figures.

use crate::domain::calculator::{
    PortfolioReport, PositionMetrics, PositionResult, PositionStatus, ReferenceSource,
};

use super::format::{amount, escape_html, shares, signed_amount, signed_percent};

const CURRENCY: &str = "元";

/// A-share convention: red for gains, green for losses.
pub fn trend_marker(daily_profit: f64) -> &'static str {
    if daily_profit >= 0.0 { "🔴" } else { "🟢" }
}

pub const UNAVAILABLE_MARKER: &str = "⚠️";

pub fn render_title(report: &PortfolioReport) -> String {
    format!(
        "📊 盈亏日报 | 总{} | 今日{}",
        signed_amount(report.total_profit, 0),
        signed_amount(report.total_daily_profit, 0)
    )
}

fn reference_note(source: ReferenceSource) -> String {
    match source {
        ReferenceSource::Quote => String::new(),
        ReferenceSource::Stored { date } => format!(" (基准 {date})"),
        ReferenceSource::FirstObservation => " (首次记录)".to_string(),
    }
}

pub fn render_overview_markdown(report: &PortfolioReport) -> String {
    let mut out = String::from("🔥 **账户总览**\n");
    out.push_str(&format!(
        "- 累计总盈亏: **{}** {CURRENCY}\n",
        signed_amount(report.total_profit, 2)
    ));
    out.push_str(&format!("- 累计收益率: **{}**\n", signed_percent(report.total_rate)));
    out.push_str(&format!(
        "- 今日总盈亏: **{}** {CURRENCY}\n",
        signed_amount(report.total_daily_profit, 2)
    ));
    out.push_str(&format!(
        "- 今日收益率: **{}**\n",
        signed_percent(report.total_daily_rate)
    ));
    out.push_str(&format!(
        "- 市值/成本: {} / {}\n",
        amount(report.total_market_value, 2),
        amount(report.total_cost, 2)
    ));
    if report.unavailable_count > 0 {
        out.push_str(&format!(
            "- {UNAVAILABLE_MARKER} {} 只股票数据不可用，未计入合计\n",
            report.unavailable_count
        ));
    }
    out
}

pub fn render_position_markdown(result: &PositionResult) -> String {
    match &result.status {
        PositionStatus::Available(m) => render_metrics_markdown(result, m),
        PositionStatus::Unavailable { reason } => format!(
            "{UNAVAILABLE_MARKER} **{}** ({}) 数据不可用: {}\n\n",
            result.name, result.symbol, reason
        ),
    }
}

fn render_metrics_markdown(result: &PositionResult, m: &PositionMetrics) -> String {
    let mut out = format!(
        "{} **{}** ({})\n",
        trend_marker(m.daily_profit),
        result.name,
        result.symbol
    );
    out.push_str(&format!(
        "- 累计盈利: `{}` ({})\n",
        signed_amount(m.profit, 0),
        signed_percent(m.profit_rate)
    ));
    out.push_str(&format!(
        "- 当日盈亏: `{}` ({})\n",
        signed_amount(m.daily_profit, 0),
        signed_percent(m.daily_rate)
    ));
    out.push_str(&format!(
        "- 现价/昨收: {:.2} / {:.2}{}\n",
        m.current_price,
        m.reference_price,
        reference_note(m.reference_source)
    ));
    out.push_str(&format!(
        "- 今日涨跌: {} ({})\n",
        signed_amount(m.daily_delta, 2),
        signed_percent(m.price_change_rate)
    ));
    out.push_str(&format!(
        "- 持仓/成本: {} / {:.3}\n",
        shares(result.total_shares),
        result.average_cost()
    ));
    // Blank line keeps blocks apart in WeChat's markdown view.
    out.push('\n');
    out
}

pub fn render_positions_markdown(report: &PortfolioReport) -> String {
    report.positions.iter().map(render_position_markdown).collect()
}

fn colored(value: f64, text: &str) -> String {
    let color = if value >= 0.0 { "#d32f2f" } else { "#2e7d32" };
    format!("<span style=\"color:{color}\">{text}</span>")
}

pub fn render_overview_html(report: &PortfolioReport) -> String {
    let mut out = String::from("<h3>账户总览</h3>\n<ul>\n");
    out.push_str(&format!(
        "<li>累计总盈亏: <b>{}</b> {CURRENCY} ({})</li>\n",
        colored(report.total_profit, &signed_amount(report.total_profit, 2)),
        signed_percent(report.total_rate)
    ));
    out.push_str(&format!(
        "<li>今日总盈亏: <b>{}</b> {CURRENCY} ({})</li>\n",
        colored(
            report.total_daily_profit,
            &signed_amount(report.total_daily_profit, 2)
        ),
        signed_percent(report.total_daily_rate)
    ));
    out.push_str(&format!(
        "<li>市值/成本: {} / {}</li>\n",
        amount(report.total_market_value, 2),
        amount(report.total_cost, 2)
    ));
    if report.unavailable_count > 0 {
        out.push_str(&format!(
            "<li>{UNAVAILABLE_MARKER} {} 只股票数据不可用，未计入合计</li>\n",
            report.unavailable_count
        ));
    }
    out.push_str("</ul>\n");
    out
}

pub fn render_position_html(result: &PositionResult) -> String {
    let name = escape_html(&result.name);
    let symbol = escape_html(&result.symbol);
    match &result.status {
        PositionStatus::Unavailable { reason } => format!(
            "<p>{UNAVAILABLE_MARKER} <b>{name}</b> ({symbol}) 数据不可用: {}</p>\n",
            escape_html(reason)
        ),
        PositionStatus::Available(m) => {
            let mut out = format!("<h4>{name} ({symbol})</h4>\n<table>\n");
            let rows = [
                (
                    "累计盈利",
                    format!(
                        "{} ({})",
                        colored(m.profit, &signed_amount(m.profit, 0)),
                        signed_percent(m.profit_rate)
                    ),
                ),
                (
                    "当日盈亏",
                    format!(
                        "{} ({})",
                        colored(m.daily_profit, &signed_amount(m.daily_profit, 0)),
                        signed_percent(m.daily_rate)
                    ),
                ),
                (
                    "现价/昨收",
                    format!(
                        "{:.2} / {:.2}{}",
                        m.current_price,
                        m.reference_price,
                        escape_html(&reference_note(m.reference_source))
                    ),
                ),
                (
                    "今日涨跌",
                    format!(
                        "{} ({})",
                        signed_amount(m.daily_delta, 2),
                        signed_percent(m.price_change_rate)
                    ),
                ),
                (
                    "持仓/成本",
                    format!("{} / {:.3}", shares(result.total_shares), result.average_cost()),
                ),
            ];
            for (label, value) in rows {
                out.push_str(&format!("<tr><td>{label}</td><td>{value}</td></tr>\n"));
            }
            out.push_str("</table>\n");
            out
        }
    }
}

pub fn render_positions_html(report: &PortfolioReport) -> String {
    report.positions.iter().map(render_position_html).collect()
}
