//! Built-in markdown digest template with `{{PLACEHOLDER}}` substitution.

const DEFAULT_TEMPLATE: &str = "📅 {{TIMESTAMP}}

{{OVERVIEW}}
---
{{POSITIONS}}";

pub fn template() -> &'static str {
    DEFAULT_TEMPLATE
}
