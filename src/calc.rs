use std::fmt::Display;

use chrono::{DateTime, Days, Locale, NaiveDate, TimeZone};

pub const CURRENCY: &str = "FCFA";
pub const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";
const GROUP_SEPARATOR: char = '\u{202f}';

/// Amount rounded to the unit with French digit grouping: `12 450 FCFA`.
pub fn format_cfa(amount: f64) -> String {
    if amount.is_nan() {
        return format!("NaN {CURRENCY}");
    }
    if amount.is_infinite() {
        let sign = if amount < 0.0 { "-" } else { "" };
        return format!("{sign}∞ {CURRENCY}");
    }
    // Half values round up, towards positive infinity
    let rounded = (amount + 0.5).floor() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 * 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(GROUP_SEPARATOR);
        }
        grouped.push(c);
    }
    let sign = if rounded < 0 { "-" } else { "" };
    format!("{sign}{grouped} {CURRENCY}")
}

/// `2026-10-09` (optionally followed by a time) as `09/10/2026`. Empty or
/// unreadable input gives an empty string.
pub fn format_date(value: &str) -> String {
    parse_date(value)
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_default()
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let day = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(day, DATE_INPUT_FORMAT).ok()
}

/// Lenient number input: the longest leading number, `0` when there is none.
pub fn parse_amount(value: &str) -> f64 {
    let value = value.trim_start();
    let bytes = value.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'-') | Some(b'+')) {
        end = 1;
    }
    let digits_from = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - digits_from;
    if end < bytes.len() && bytes[end] == b'.' {
        let fraction_from = end + 1;
        let mut fraction_end = fraction_from;
        while fraction_end < bytes.len() && bytes[fraction_end].is_ascii_digit() {
            fraction_end += 1;
        }
        mantissa_digits += fraction_end - fraction_from;
        end = fraction_end;
    }
    if mantissa_digits == 0 {
        return 0.0;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'-' | b'+') {
            exp_end += 1;
        }
        let exp_digits_from = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_from {
            end = exp_end;
        }
    }
    value[..end].parse::<f64>().unwrap_or(0.0)
}

/// Remaining balance of an invoice: amount minus what was already paid.
pub fn calculer_solde(montant: &str, versement: &str) -> f64 {
    parse_amount(montant) - parse_amount(versement)
}

/// Due date `days` after the invoice date, in input format. `None` when the
/// invoice date is missing or unreadable.
pub fn date_echeance(date_facturation: &str, days: u64) -> Option<String> {
    let date = parse_date(date_facturation)?;
    let due = date.checked_add_days(Days::new(days))?;
    Some(due.format(DATE_INPUT_FORMAT).to_string())
}

/// Long French date and time: `lundi 19 octobre 2026 à 14:05`.
pub fn format_clock<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    now.format_localized("%A %-d %B %Y à %H:%M", Locale::fr_FR)
        .to_string()
}
