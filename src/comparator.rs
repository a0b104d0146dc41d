use std::cmp::Ordering;

use icu_collator::{Collator, CollatorOptions};
use icu_locid::locale;

use crate::domain::TVError;

/// Extract a number from a displayed cell.
///
/// Everything except ASCII digits, `-` and `.` is dropped first, so currency
/// suffixes and digit grouping disappear ("12 450 FCFA" -> 12450). The longest
/// numeric prefix of what remains is parsed, which means a second separator
/// ends the number ("1.200,50" -> 1.2005). A value without any digit is not a
/// number.
pub fn parse_numeric(value: &str) -> Option<f64> {
    let stripped: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-' || *c == '.')
        .collect();

    let bytes = stripped.as_bytes();
    let mut end = 0;
    if bytes.first() == Some(&b'-') {
        end = 1;
    }
    let mut seen_digit = false;
    let mut seen_dot = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }

    if !seen_digit {
        return None;
    }
    stripped[..end].parse::<f64>().ok()
}

/// A cell parsed once for sorting.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Number(f64),
    Text(String),
}

/// Orders cells: numerically when both parse, by French collation when
/// neither does. Numbers come before text.
pub struct CellComparator {
    collator: Collator,
}

impl CellComparator {
    pub fn french() -> Result<Self, TVError> {
        let collator = Collator::try_new(&locale!("fr").into(), CollatorOptions::new())
            .map_err(|e| TVError::Collation(e.to_string()))?;
        Ok(Self { collator })
    }

    pub fn key(value: &str) -> SortKey {
        let value = value.trim();
        match parse_numeric(value) {
            Some(n) => SortKey::Number(n),
            None => SortKey::Text(value.to_string()),
        }
    }

    pub fn compare_keys(&self, a: &SortKey, b: &SortKey) -> Ordering {
        match (a, b) {
            (SortKey::Number(a), SortKey::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (SortKey::Text(a), SortKey::Text(b)) => self.collator.compare(a, b),
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
        }
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        self.compare_keys(&Self::key(a), &Self::key(b))
    }
}
