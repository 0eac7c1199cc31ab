//! Display formatting shared by chart labels and renderers.

use chrono::NaiveDate;

/// Rendered for any undefined figure.
pub const NO_DATA: &str = "-";

/// Up to two decimals, thousands grouped with `,`, trailing zeros dropped.
pub fn number(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => group_thousands(v),
        _ => NO_DATA.to_string(),
    }
}

/// One decimal and a `%` suffix, e.g. `30.0%`.
pub fn percent(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.1}%", v),
        _ => NO_DATA.to_string(),
    }
}

/// `YYYY-MM-DD...` → `DD/MM/YYYY`. Unparseable input is shown as-is.
pub fn date(value: Option<&str>) -> String {
    let Some(raw) = value else {
        return NO_DATA.to_string();
    };
    raw.get(0..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| raw.to_string())
}

pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.is_empty() {
        return NO_DATA.to_string();
    }
    if s.chars().count() > max_chars {
        let head: String = s.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

fn group_thousands(v: f64) -> String {
    let fixed = format!("{:.2}", v.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if v < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        "-"
    } else {
        ""
    };
    if frac.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac)
    }
}
