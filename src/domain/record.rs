// Raw CSV row model with dynamic cell typing
use serde::Serialize;
use std::collections::HashMap;

/// Largest magnitude kept as a number; bigger numerals stay text
const MAX_EXACT_NUMBER: f64 = 9_007_199_254_740_992.0; // 2^53

/// A single parsed CSV cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Bool(bool),
    Text(String),
    Null,
}

impl CellValue {
    /// Infer the type of a raw cell: empty is null, `true`/`TRUE`/`false`/`FALSE`
    /// are booleans, plain decimal numbers below 2^53 in magnitude are
    /// numbers, everything else is text.
    pub fn infer(raw: &str) -> Self {
        match raw {
            "" => return CellValue::Null,
            "true" | "TRUE" => return CellValue::Bool(true),
            "false" | "FALSE" => return CellValue::Bool(false),
            _ => {}
        }
        if is_plain_number(raw) {
            if let Ok(n) = raw.trim().parse::<f64>() {
                if n.abs() < MAX_EXACT_NUMBER {
                    return CellValue::Number(n);
                }
            }
        }
        CellValue::Text(raw.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Display form of the cell; `None` for null.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Number(n) => Some(format_number(*n)),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Null => None,
        }
    }
}

/// Integral values print without a trailing `.0`
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Matches `-?(\d+\.?|\.\d+|\d+\.\d+)([eE][-+]?\d+)?` with optional surrounding whitespace
fn is_plain_number(raw: &str) -> bool {
    let s = raw.trim();
    let s = s.strip_prefix('-').unwrap_or(s);
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(idx) => (&s[..idx], Some(&s[idx + 1..])),
        None => (s, None),
    };

    let mantissa_ok = match mantissa.split_once('.') {
        Some((int, frac)) => {
            let int_ok = int.chars().all(|c| c.is_ascii_digit());
            let frac_ok = frac.chars().all(|c| c.is_ascii_digit());
            int_ok && frac_ok && !(int.is_empty() && frac.is_empty())
        }
        None => !mantissa.is_empty() && mantissa.chars().all(|c| c.is_ascii_digit()),
    };

    let exponent_ok = match exponent {
        Some(exp) => {
            let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
        }
        None => true,
    };

    mantissa_ok && exponent_ok
}

/// One CSV row keyed by header name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: HashMap<String, CellValue>,
}

impl Record {
    /// Cell for a column; a missing column reads as null.
    pub fn get(&self, column: &str) -> &CellValue {
        self.fields.get(column).unwrap_or(&CellValue::Null)
    }

    pub fn is_null(&self, column: &str) -> bool {
        self.get(column).is_null()
    }

    pub fn text(&self, column: &str) -> Option<String> {
        self.get(column).as_text()
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).as_f64()
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
