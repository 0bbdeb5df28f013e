//! Digest rendering.
//!
//! The markdown body is produced from a template (the built-in default or
//! a custom file via `[report] template_path`) by resolving
//! `{{PLACEHOLDER}}` markers with blocks from [`sections`]. The HTML body
//! for email is rendered directly.

pub mod default_template;
pub mod format;
pub mod sections;

use chrono::{DateTime, FixedOffset};

use crate::domain::calculator::PortfolioReport;
use crate::ports::notify_port::Digest;

/// Context for resolving template placeholders.
pub struct ReportContext<'a> {
    pub report: &'a PortfolioReport,
    pub generated_at: DateTime<FixedOffset>,
}

impl ReportContext<'_> {
    fn timestamp(&self) -> String {
        self.generated_at.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// Resolve all `{{PLACEHOLDER}}`s in the given markdown template.
pub fn resolve(template: &str, ctx: &ReportContext) -> String {
    template
        .replace("{{TITLE}}", &sections::render_title(ctx.report))
        .replace("{{TIMESTAMP}}", &ctx.timestamp())
        .replace("{{OVERVIEW}}", &sections::render_overview_markdown(ctx.report))
        .replace("{{POSITIONS}}", &sections::render_positions_markdown(ctx.report))
}

pub fn render_html(ctx: &ReportContext) -> String {
    let mut out = String::from("<html><body>\n");
    out.push_str(&format!(
        "<h2>{}</h2>\n<p>{}</p>\n",
        format::escape_html(&sections::render_title(ctx.report)),
        ctx.timestamp()
    ));
    out.push_str(&sections::render_overview_html(ctx.report));
    out.push_str("<hr/>\n");
    out.push_str(&sections::render_positions_html(ctx.report));
    out.push_str("</body></html>\n");
    out
}

/// Renders the title and both bodies.
pub fn render_digest(template: &str, ctx: &ReportContext) -> Digest {
    Digest {
        title: sections::render_title(ctx.report),
        markdown: resolve(template, ctx),
        html: render_html(ctx),
    }
}
