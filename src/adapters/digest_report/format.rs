//! Number and text formatting shared by the markdown and HTML renderers.

/// Formats `value` with an explicit sign, thousands separators and a fixed
/// number of decimals: `+1,234.50`, `-56`. Values that round to zero are
/// shown with a plus sign.
pub fn signed_amount(value: f64, decimals: usize) -> String {
    let body = grouped(value.abs(), decimals);
    let sign = if value < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        '-'
    } else {
        '+'
    };
    format!("{sign}{body}")
}

/// Unsigned amount with thousands separators: `1,234.50`.
pub fn amount(value: f64, decimals: usize) -> String {
    let body = grouped(value.abs(), decimals);
    if value < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{body}")
    } else {
        body
    }
}

/// A fraction as a signed percentage with two decimals: `0.12` → `+12.00%`.
pub fn signed_percent(rate: f64) -> String {
    let pct = rate * 100.0;
    let body = format!("{:.2}", pct.abs());
    let sign = if pct < 0.0 && body != "0.00" { '-' } else { '+' };
    format!("{sign}{body}%")
}

/// Share counts with thousands separators.
pub fn shares(count: u64) -> String {
    group_digits(&count.to_string())
}

fn grouped(abs_value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, abs_value);
    match fixed.split_once('.') {
        Some((int_part, frac)) => format!("{}.{}", group_digits(int_part), frac),
        None => group_digits(&fixed),
    }
}

fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
