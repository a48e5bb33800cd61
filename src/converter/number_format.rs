//! Decimal patterns in the `###.#####` / `0.0###E0###` style.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TableError};

/// A compiled decimal or scientific number pattern.
///
/// `0` is a required digit and `#` an optional one. A `,` in the integer
/// part sets the grouping size; an `E` switches to scientific notation with
/// one integer digit in the mantissa.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberPattern {
    source: String,
    min_int: usize,
    min_frac: usize,
    max_frac: usize,
    grouping: Option<usize>,
    min_exp: Option<usize>,
}

impl FromStr for NumberPattern {
    type Err = TableError;

    fn from_str(pattern: &str) -> Result<Self> {
        let (mantissa, exponent) = match pattern.split_once('E') {
            Some((m, e)) => (m, Some(e)),
            None => (pattern, None),
        };
        let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));

        if let Some(pos) = int_part.find(|c| !matches!(c, '0' | '#' | ',')) {
            return Err(TableError::type_expr(pos, format!("unexpected character in pattern '{}'", pattern)));
        }
        let frac_offset = int_part.len() + 1;
        if let Some(pos) = frac_part.find(|c| !matches!(c, '0' | '#')) {
            return Err(TableError::type_expr(
                frac_offset + pos,
                format!("unexpected character in pattern '{}'", pattern),
            ));
        }

        let min_exp = match exponent {
            Some(e) => {
                if e.is_empty() || e.contains(|c| !matches!(c, '0' | '#')) {
                    return Err(TableError::type_expr(mantissa.len(), "exponent needs digit placeholders"));
                }
                Some(e.chars().filter(|&c| c == '0').count().max(1))
            },
            None => None,
        };

        let grouping = int_part
            .rfind(',')
            .map(|pos| int_part.len() - pos - 1)
            .filter(|&size| size > 0);

        Ok(Self {
            source: pattern.to_string(),
            min_int: int_part.chars().filter(|&c| c == '0').count(),
            min_frac: frac_part.chars().take_while(|&c| c == '0').count(),
            max_frac: frac_part.len(),
            grouping,
            min_exp,
        })
    }
}

impl fmt::Display for NumberPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl NumberPattern {
    /// Check if this pattern uses scientific notation.
    pub fn is_scientific(&self) -> bool {
        self.min_exp.is_some()
    }

    /// Format `value` with this pattern.
    pub fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return value.to_string();
        }
        match self.min_exp {
            Some(min_exp) => self.format_scientific(value, min_exp),
            None => self.format_decimal(value),
        }
    }

    fn format_decimal(&self, value: f64) -> String {
        let (int_digits, frac_digits) = self.split_digits(value.abs());
        let mut int_digits = int_digits.trim_start_matches('0').to_string();
        while int_digits.len() < self.min_int {
            int_digits.insert(0, '0');
        }
        if let Some(size) = self.grouping {
            int_digits = group(&int_digits, size);
        }
        let body = if frac_digits.is_empty() {
            if int_digits.is_empty() {
                "0".to_string()
            } else {
                int_digits
            }
        } else {
            format!("{}.{}", int_digits, frac_digits)
        };
        self.signed(value, body)
    }

    fn format_scientific(&self, value: f64, min_exp: usize) -> String {
        let magnitude = value.abs();
        let mut exponent = if magnitude == 0.0 {
            0
        } else {
            magnitude.log10().floor() as i32
        };
        let mut mantissa = magnitude / 10f64.powi(exponent);
        let (mut int_digits, mut frac_digits) = self.split_digits(mantissa);
        if int_digits.len() > 1 {
            exponent += 1;
            mantissa /= 10.0;
            (int_digits, frac_digits) = self.split_digits(mantissa);
        }
        let mut body = int_digits;
        if !frac_digits.is_empty() {
            body.push('.');
            body.push_str(&frac_digits);
        }
        let sign = if exponent < 0 { "-" } else { "" };
        let digits = exponent.unsigned_abs().to_string();
        let pad = "0".repeat(min_exp.saturating_sub(digits.len()));
        self.signed(value, format!("{}E{}{}{}", body, sign, pad, digits))
    }

    /// Integer digits and trimmed fraction digits of `magnitude`.
    fn split_digits(&self, magnitude: f64) -> (String, String) {
        let text = format!("{:.*}", self.max_frac, magnitude);
        let (int_digits, frac) = text.split_once('.').unwrap_or((&text, ""));
        let mut frac = frac.to_string();
        while frac.len() > self.min_frac && frac.ends_with('0') {
            frac.pop();
        }
        (int_digits.to_string(), frac)
    }

    fn signed(&self, value: f64, body: String) -> String {
        if value < 0.0 && body.chars().any(|c| matches!(c, '1'..='9')) {
            format!("-{}", body)
        } else {
            body
        }
    }
}

fn group(digits: &str, size: usize) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / size);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % size == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(pattern: &str, value: f64) -> String {
        pattern.parse::<NumberPattern>().unwrap().format(value)
    }

    #[test]
    fn test_default_custom_pattern() {
        assert_eq!(fmt("###.#####", 3.14159265), "3.14159");
        assert_eq!(fmt("###.#####", 42.0), "42");
        assert_eq!(fmt("###.#####", 0.5), ".5");
        assert_eq!(fmt("###.#####", 0.0), "0");
        assert_eq!(fmt("###.#####", -2.25), "-2.25");
    }

    #[test]
    fn test_required_digits_and_grouping() {
        assert_eq!(fmt("0.00", 0.5), "0.50");
        assert_eq!(fmt("#,##0.0", 1234567.0), "1,234,567.0");
        assert_eq!(fmt("000", 7.0), "007");
    }

    #[test]
    fn test_scientific_pattern() {
        assert_eq!(fmt("0.0###E0###", 12345.0), "1.2345E4");
        assert_eq!(fmt("0.0###E0###", 0.00012), "1.2E-4");
        assert_eq!(fmt("0.0###E0###", 0.0), "0.0E0");
        assert_eq!(fmt("0.0###E0###", -99999.9), "-1.0E5");
        assert_eq!(fmt("0.00E00", 1.0), "1.00E00");
    }

    #[test]
    fn test_invalid_patterns() {
        assert!("#x#".parse::<NumberPattern>().is_err());
        assert!("0.0E".parse::<NumberPattern>().is_err());
        assert!("0.0E0".parse::<NumberPattern>().unwrap().is_scientific());
    }
}
