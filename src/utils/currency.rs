//! Currency formatting configuration
//!
//! Formatting settings are passed around explicitly instead of living in
//! process-wide locale state.

use bigdecimal::{BigDecimal, RoundingMode};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How monetary amounts are written into and read back from the sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrencyFormat {
    /// Symbol placed before the amount (e.g. `$`)
    pub symbol: String,
    /// Separator between whole and fractional parts
    pub decimal_separator: char,
    /// Separator between groups of three digits, if any
    pub grouping_separator: Option<char>,
    /// Digits after the decimal separator
    pub decimal_places: u32,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::en_us()
    }
}

impl CurrencyFormat {
    /// US dollars: `-$1,234.50`
    pub fn en_us() -> Self {
        Self {
            symbol: "$".to_string(),
            decimal_separator: '.',
            grouping_separator: Some(','),
            decimal_places: 2,
        }
    }

    /// Format an amount, rounding half away from zero
    pub fn format(&self, amount: &BigDecimal) -> String {
        let rounded = amount.with_scale_round(self.decimal_places as i64, RoundingMode::HalfUp);
        let negative = rounded < BigDecimal::from(0);
        let digits = rounded.abs().to_string();

        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole.to_string(), Some(fraction.to_string())),
            None => (digits, None),
        };

        let mut out = String::new();
        if negative {
            out.push('-');
        }
        out.push_str(&self.symbol);
        out.push_str(&self.group_digits(&whole));
        if let Some(fraction) = fraction.filter(|_| self.decimal_places > 0) {
            out.push(self.decimal_separator);
            out.push_str(&fraction);
        }
        out
    }

    /// Parse a currency string written in this format.
    ///
    /// Accepts a leading or trailing minus, accounting-style parentheses,
    /// and plain numbers without the symbol.
    pub fn parse(&self, text: &str) -> Option<BigDecimal> {
        let mut s = text.trim();
        if s.is_empty() {
            return None;
        }

        let mut negative = false;
        if let Some(inner) = s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
            negative = true;
            s = inner.trim();
        }
        if let Some(rest) = s.strip_prefix('-') {
            negative = !negative;
            s = rest.trim_start();
        } else if let Some(rest) = s.strip_suffix('-') {
            negative = !negative;
            s = rest.trim_end();
        }
        if !self.symbol.is_empty() {
            if let Some(rest) = s.strip_prefix(self.symbol.as_str()) {
                s = rest.trim_start();
            }
        }
        // "$-5.00" is how some sheets render negatives
        if let Some(rest) = s.strip_prefix('-') {
            negative = !negative;
            s = rest;
        }

        let mut normalized = String::with_capacity(s.len());
        for c in s.chars() {
            if Some(c) == self.grouping_separator {
                continue;
            } else if c == self.decimal_separator {
                normalized.push('.');
            } else if c.is_ascii_digit() {
                normalized.push(c);
            } else {
                return None;
            }
        }

        let value = BigDecimal::from_str(&normalized).ok()?;
        Some(if negative { -value } else { value })
    }

    fn group_digits(&self, whole: &str) -> String {
        let Some(sep) = self.grouping_separator else {
            return whole.to_string();
        };

        let len = whole.len();
        let mut grouped = String::with_capacity(len + len / 3);
        for (i, c) in whole.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                grouped.push(sep);
            }
            grouped.push(c);
        }
        grouped
    }
}
