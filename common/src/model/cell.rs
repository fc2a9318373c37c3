use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest magnitude below which every integer is exactly representable in an `f64`.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0; // 2^53

/// A single cell value as held by the tabular store.
///
/// Formulas are stored next to the value and are never evaluated locally, so a
/// formula cell reads back as whatever value was last written to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    /// Always finite.
    Number(f64),
}

impl CellValue {
    /// Returns `true` when the cell renders as an empty string.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// Parses raw imported text. Only plain decimals (`-12`, `3.5`) become numbers;
    /// words like `nan` or `Infinity` and exponent forms like `1e3` stay text.
    pub fn from_raw(raw: &str) -> Self {
        if raw.is_empty() {
            return CellValue::Empty;
        }
        if is_plain_decimal(raw) {
            if let Ok(n) = raw.parse::<f64>() {
                if n.is_finite() {
                    return CellValue::Number(n);
                }
            }
        }
        CellValue::Text(raw.to_string())
    }
}

/// Optional sign, digits, optional fraction; at least one digit overall.
fn is_plain_decimal(raw: &str) -> bool {
    let unsigned = raw.strip_prefix(['-', '+']).unwrap_or(raw);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (unsigned, ""),
    };
    !(int_part.is_empty() && frac_part.is_empty())
        && int_part.bytes().all(|b| b.is_ascii_digit())
        && frac_part.bytes().all(|b| b.is_ascii_digit())
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            // Integral numbers render without a fractional part, as a sheet shows them.
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < MAX_EXACT_INTEGER => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}
