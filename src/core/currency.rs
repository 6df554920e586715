//! Price string normalization.
//!
//! Stored prices arrive as free-form text (`"$20"`, `"1700"`, `"₹1,50,000"`,
//! `"20 - 50"`) or bare JSON numbers. Normalization maps them onto one
//! canonical display form per currency:
//!
//! * USD: `$` prefix, no digit grouping (`$1700`).
//! * INR: `₹` prefix, Indian grouping (`₹1,50,000`).
//!
//! Ranges keep both endpoints, each with its own symbol (`$20-$50`).
//! Anything that cannot be read as a number is passed through behind the
//! symbol, so the function never fails and is idempotent.

use crate::domain::model::{Currency, PriceInput};

/// INR amounts keep at most this many fraction digits.
const INR_MAX_FRACTION_DIGITS: usize = 3;

/// Normalizes an optional stored value. `None` means the field is absent
/// and the caller should leave it alone.
pub fn normalize_currency(raw: Option<PriceInput>, currency: Currency) -> Option<String> {
    raw.map(|value| normalize_amount(value, currency))
}

/// Normalizes a present value into its canonical string.
pub fn normalize_amount(raw: impl Into<PriceInput>, currency: Currency) -> String {
    let cleaned = strip_formatting(&raw.into().to_raw_string());

    match cleaned.split_once('-') {
        Some((low, high)) => format!(
            "{}-{}",
            format_scalar(low.trim(), currency),
            format_scalar(high.trim(), currency)
        ),
        None => format_scalar(&cleaned, currency),
    }
}

/// Removes currency symbols and thousands separators, then trims.
pub(crate) fn strip_formatting(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '$' | '₹' | ','))
        .collect::<String>()
        .trim()
        .to_string()
}

fn format_scalar(value: &str, currency: Currency) -> String {
    match currency {
        Currency::Usd => format!("{}{}", currency.symbol(), value),
        Currency::Inr => match value.parse::<f64>() {
            Ok(amount) if amount.is_finite() => {
                format!("{}{}", currency.symbol(), format_indian(amount))
            }
            _ => format!("{}{}", currency.symbol(), value),
        },
    }
}

/// Renders a finite amount with Indian digit grouping: the last three
/// integer digits form one group, everything before them groups in twos.
pub fn format_indian(amount: f64) -> String {
    let rendered = format!("{:.*}", INR_MAX_FRACTION_DIGITS, amount.abs());
    let (integer, fraction) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut out = String::with_capacity(rendered.len() + 8);
    let is_zero = integer.bytes().all(|b| b == b'0') && fraction.is_empty();
    if amount.is_sign_negative() && !is_zero {
        out.push('-');
    }
    out.push_str(&group_indian_digits(integer));
    if !fraction.is_empty() {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

fn group_indian_digits(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (mut head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::with_capacity(head.len() / 2 + 2);
    groups.push(tail);
    while head.len() > 2 {
        let (rest, pair) = head.split_at(head.len() - 2);
        groups.push(pair);
        head = rest;
    }
    groups.push(head);
    groups.reverse();
    groups.join(",")
}
