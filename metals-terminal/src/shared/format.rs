//! Number formatting helpers shared by every panel

use rust_decimal::prelude::{FromPrimitive, RoundingStrategy};
use rust_decimal::Decimal;

/// Shown in place of a number that is absent
pub const PLACEHOLDER: &str = "--.--";

/// Render a value with en-US thousands grouping and fixed decimals
///
/// `format_number(Some(1234.5), 2) == "1,234.50"`; absent or non-finite
/// values render as [`PLACEHOLDER`].
pub fn format_number(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => group_thousands(&to_fixed(v, decimals)),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Prefix a currency symbol onto a 2-decimal grouped number
pub fn format_currency(value: Option<f64>, symbol: &str) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{}{}", symbol, format_number(Some(v), 2)),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Fixed decimals with an explicit `+` for strictly positive values
pub fn format_signed(value: f64, decimals: usize) -> String {
    let sign = if value > 0.0 { "+" } else { "" };
    format!("{}{}", sign, to_fixed(value, decimals))
}

/// Signed percentage with 2 decimals ("+1.23%", "-0.33%")
pub fn format_percent(value: f64) -> String {
    format!("{}%", format_signed(value, 2))
}

/// Recover the number from rendered text by keeping only digits, `.` and `-`
pub fn parse_displayed_number(text: &str) -> Option<f64> {
    let numeric: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    numeric.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Fixed decimals with exact ties rounded away from zero (2.5 -> "3")
///
/// Values outside the `Decimal` range fall back to the float formatter.
fn to_fixed(value: f64, decimals: usize) -> String {
    match Decimal::from_f64(value) {
        Some(decimal) => {
            let rounded = decimal
                .round_dp_with_strategy(decimals as u32, RoundingStrategy::MidpointAwayFromZero);
            format!("{:.*}", decimals, rounded)
        }
        None => format!("{:.*}", decimals, value),
    }
}

fn group_thousands(fixed: &str) -> String {
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits, None),
    };

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3);
    out.push_str(sign);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(frac_part) = frac_part {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}
