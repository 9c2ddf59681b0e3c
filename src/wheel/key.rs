//! Outcome keys
//!
//! A key is either a signed day count (`+3日`, `-1日`) or a free-form label
//! kept from older data. Only the structured form takes part in day sums.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Suffix of a structured key
pub const DAY_SUFFIX: char = '日';

/// Direction of a structured outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sign {
    Plus,
    Minus,
}

impl Sign {
    pub fn as_char(&self) -> char {
        match self {
            Sign::Plus => '+',
            Sign::Minus => '-',
        }
    }

    /// Full-width symbol used in labels
    pub fn full_width(&self) -> char {
        match self {
            Sign::Plus => '＋',
            Sign::Minus => '－',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Sign::Plus),
            '-' => Some(Sign::Minus),
            _ => None,
        }
    }
}

/// One labeled result of a spin
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OutcomeKey {
    Structured { sign: Sign, days: u32 },
    Freeform(String),
}

impl OutcomeKey {
    pub fn structured(sign: Sign, days: u32) -> Self {
        OutcomeKey::Structured { sign, days }
    }

    /// Parse a stored key. Anything that is not exactly `<sign><days>日`
    /// (canonical digits, no leading zeros) stays free-form.
    pub fn parse(raw: &str) -> Self {
        parse_structured(raw)
            .map(|(sign, days)| OutcomeKey::Structured { sign, days })
            .unwrap_or_else(|| OutcomeKey::Freeform(raw.to_string()))
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, OutcomeKey::Structured { .. })
    }

    /// Signed day count, `None` for free-form keys
    pub fn signed_days(&self) -> Option<i64> {
        match self {
            OutcomeKey::Structured { sign: Sign::Plus, days } => Some(i64::from(*days)),
            OutcomeKey::Structured { sign: Sign::Minus, days } => Some(-i64::from(*days)),
            OutcomeKey::Freeform(_) => None,
        }
    }

    /// Label for display: `＋３日` for structured keys, the raw text otherwise
    pub fn display_label(&self) -> String {
        match self {
            OutcomeKey::Structured { sign, days } => {
                format!("{}{}{}", sign.full_width(), to_full_width(&days.to_string()), DAY_SUFFIX)
            }
            OutcomeKey::Freeform(label) => label.clone(),
        }
    }
}

fn parse_structured(raw: &str) -> Option<(Sign, u32)> {
    let body = raw.strip_suffix(DAY_SUFFIX)?;
    let mut chars = body.chars();
    let sign = Sign::from_char(chars.next()?)?;
    let digits = chars.as_str();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    let days = digits.parse().ok()?;
    Some((sign, days))
}

impl fmt::Display for OutcomeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeKey::Structured { sign, days } => {
                write!(f, "{}{}{}", sign.as_char(), days, DAY_SUFFIX)
            }
            OutcomeKey::Freeform(label) => f.write_str(label),
        }
    }
}

impl From<String> for OutcomeKey {
    fn from(raw: String) -> Self {
        match parse_structured(&raw) {
            Some((sign, days)) => OutcomeKey::Structured { sign, days },
            None => OutcomeKey::Freeform(raw),
        }
    }
}

impl From<&str> for OutcomeKey {
    fn from(raw: &str) -> Self {
        OutcomeKey::parse(raw)
    }
}

impl From<OutcomeKey> for String {
    fn from(key: OutcomeKey) -> Self {
        key.to_string()
    }
}

/// Convert ASCII digits to their full-width forms (`12` → `１２`)
pub fn to_full_width(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '0'..='9' => char::from_u32(c as u32 + 0xFEE0).unwrap_or(c),
            _ => c,
        })
        .collect()
}
