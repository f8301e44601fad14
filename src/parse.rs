//! Tolerant numeric parsing for marketplace cell text.
//!
//! Amounts are rendered with locale-dependent separators ("1.234,56" vs
//! "1,234.56") and ranges as inline "min CUR - max" text, so one forgiving
//! parser covers every variant instead of branching per locale.

use regex::Regex;

use crate::types::AmountRange;

/// Parses free-form numeric text into a finite number.
///
/// Separator rules: comma and dot together — comma is a thousands separator;
/// comma alone — comma is the decimal point. Any dot after the first is
/// dropped, so "1.2.3" reads as 1.23 rather than failing outright.
pub fn parse_number(text: &str) -> Option<f64> {
    let mut s: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let has_comma = s.contains(',');
    let has_dot = s.contains('.');
    if has_comma && has_dot {
        s.retain(|c| c != ',');
    } else if has_comma {
        s = s.replace(',', ".");
    }
    s.retain(|c| c.is_ascii_digit() || c == '.');
    if let Some(first_dot) = s.find('.') {
        let (head, tail) = s.split_at(first_dot + 1);
        let tail: String = tail.chars().filter(|&c| c != '.').collect();
        s = format!("{head}{tail}");
    }
    let num: f64 = s.parse().ok()?;
    num.is_finite().then_some(num)
}

/// Compiled matcher for "min CUR - max" range text.
///
/// The currency code is matched as a literal case-insensitive substring, not
/// validated against any list; it is escaped so punctuation in a miskeyed
/// setting cannot change the pattern.
pub struct RangePattern {
    re: Regex,
}

impl RangePattern {
    pub fn new(currency: &str) -> Self {
        let re = Regex::new(&format!(
            r"(?i)([\d.,\s]+)\s*{}\s*-\s*([\d.,\s]+)",
            regex::escape(currency)
        ))
        .expect("escaped currency yields a valid pattern");
        Self { re }
    }

    pub fn parse(&self, text: &str) -> Option<AmountRange> {
        let caps = self.re.captures(text)?;
        let min = parse_number(caps.get(1)?.as_str())?;
        let max = parse_number(caps.get(2)?.as_str())?;
        Some(AmountRange { min, max })
    }
}

/// One-shot form of [`RangePattern::parse`].
pub fn parse_range(text: &str, currency: &str) -> Option<AmountRange> {
    RangePattern::new(currency).parse(text)
}

/// Inclusive interval overlap. Absent user bounds never match.
pub fn ranges_overlap(
    user_min: Option<f64>,
    user_max: Option<f64>,
    offer_min: f64,
    offer_max: f64,
) -> bool {
    let (Some(user_min), Some(user_max)) = (user_min, user_max) else {
        return false;
    };
    offer_min <= user_max && offer_max >= user_min
}

/// Collapses whitespace runs to single spaces and trims.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}
