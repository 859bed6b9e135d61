use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

/// Currency suffixes that may trail an amount typed into a spreadsheet cell.
const CURRENCY_SUFFIXES: &[&str] = &["MRU", "UM"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal)
    }

    /// Converts a spreadsheet float. Returns `None` for NaN and infinities.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        Decimal::from_f64(value).map(Money)
    }

    /// Parses an amount typed as text: `"1 234.5"`, `"1,234.50"` and
    /// `"250 MRU"` are accepted. A comma is only read as a thousands
    /// separator, so `"200,5"` and `"1 234,5"` are rejected.
    pub fn parse(s: &str) -> Option<Self> {
        let mut s = s.trim();
        for suffix in CURRENCY_SUFFIXES {
            if let Some(stripped) = s.strip_suffix(suffix) {
                s = stripped.trim_end();
            }
        }
        let spaced: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '\u{a0}' | '\u{202f}'))
            .collect();
        if spaced.is_empty() {
            return None;
        }
        let cleaned = if spaced.contains(',') {
            if !has_comma_grouping(&spaced) {
                return None;
            }
            spaced.replace(',', "")
        } else {
            spaced
        };
        Decimal::from_str(&cleaned)
            .or_else(|_| Decimal::from_scientific(&cleaned))
            .ok()
            .map(Money)
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    /// Fixed-point rendering with a space as thousands separator: `1 234.5`.
    pub fn format(self, decimals: u32) -> String {
        let rounded = self.0.round_dp(decimals);
        let digits = rounded.abs().to_string();
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i.to_string(), f.to_string()),
            None => (digits, String::new()),
        };

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(' ');
            }
            grouped.push(ch);
        }

        let mut out = String::new();
        if rounded.is_sign_negative() && !rounded.is_zero() {
            out.push('-');
        }
        out.push_str(&grouped);
        if decimals > 0 {
            let mut frac = frac_part;
            while frac.len() < decimals as usize {
                frac.push('0');
            }
            out.push('.');
            out.push_str(&frac);
        }
        out
    }
}

/// `-1,234,567.89`: one to three leading digits, then groups of exactly three.
fn has_comma_grouping(s: &str) -> bool {
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };
    let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    if frac_part.is_some_and(|f| !all_digits(f)) {
        return false;
    }
    let mut groups = int_part.split(',');
    let lead_ok = groups.next().is_some_and(|g| g.len() <= 3 && all_digits(g));
    lead_ok && groups.all(|g| g.len() == 3 && all_digits(g))
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(2))
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |a, b| a + b)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
