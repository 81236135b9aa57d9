use std::{
    cmp::Ordering,
    fmt::{self, Display},
    hash::{Hash, Hasher},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Text written by exact-match lookups when a key has no match, mirroring the
/// spreadsheet `#N/A` error value.
pub const NOT_AVAILABLE: &str = "#N/A";

/// A single decoded spreadsheet cell.
///
/// Positions in a row are meaningful; values are heterogeneous. Error cells are
/// carried as text holding their error code (`#N/A`, `#REF!`, ...).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Int(i64),
    Number(f64),
    Text(String),
    Boolean(bool),
}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            CellValue::Empty => state.write_u8(0),
            CellValue::Int(i) => i.hash(state),
            CellValue::Number(n) => n.to_bits().hash(state),
            CellValue::Text(s) => s.hash(state),
            CellValue::Boolean(b) => b.hash(state),
        }
    }
}

impl Eq for CellValue {}

impl Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => write!(f, ""),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

impl CellValue {
    /// The `#N/A` marker produced by a lookup miss.
    pub fn not_available() -> Self {
        CellValue::Text(NOT_AVAILABLE.to_string())
    }

    pub fn is_not_available(&self) -> bool {
        matches!(self, CellValue::Text(s) if s == NOT_AVAILABLE)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric coercion used for keys.
    ///
    /// Numbers pass through, text is trimmed and parsed. Empty cells, booleans,
    /// blank or non-numeric text and non-finite results yield `None`.
    pub fn coerce_number(&self) -> Option<f64> {
        let n = match self {
            CellValue::Int(i) => *i as f64,
            CellValue::Number(n) => *n,
            CellValue::Text(s) => {
                let t = s.trim();
                if t.is_empty() {
                    return None;
                }
                t.parse::<f64>().ok()?
            }
            CellValue::Empty | CellValue::Boolean(_) => return None,
        };
        n.is_finite().then_some(n)
    }

    pub fn as_key(&self) -> Option<Key> {
        self.coerce_number().map(Key::new)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Int(value as i64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<Key> for CellValue {
    fn from(value: Key) -> Self {
        value.to_cell()
    }
}

/// Largest integer magnitude an `f64` represents exactly.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Numeric identity of a row, derived from one of its cells.
///
/// Equality and hashing work on the bit pattern after folding `-0.0` into
/// `0.0`; ordering is total. Construction through [`CellValue::as_key`]
/// guarantees the value is finite.
#[derive(Debug, Clone, Copy)]
pub struct Key(f64);

impl Key {
    pub fn new(value: f64) -> Self {
        if value == 0.0 { Key(0.0) } else { Key(value) }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Cell form of the key: integral keys become `Int`, the rest `Number`.
    pub fn to_cell(self) -> CellValue {
        if self.0.fract() == 0.0 && self.0.abs() < MAX_EXACT_INT {
            CellValue::Int(self.0 as i64)
        } else {
            CellValue::Number(self.0)
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_and_numeric_text_coerce() {
        assert_eq!(CellValue::Int(5).coerce_number(), Some(5.0));
        assert_eq!(CellValue::Number(2.5).coerce_number(), Some(2.5));
        assert_eq!(CellValue::from(" 42 ").coerce_number(), Some(42.0));
        assert_eq!(CellValue::from("1e3").coerce_number(), Some(1000.0));
    }

    #[test]
    fn noise_does_not_coerce() {
        assert_eq!(CellValue::Empty.coerce_number(), None);
        assert_eq!(CellValue::from("").coerce_number(), None);
        assert_eq!(CellValue::from("   ").coerce_number(), None);
        assert_eq!(CellValue::from("abc").coerce_number(), None);
        assert_eq!(CellValue::from("NaN").coerce_number(), None);
        assert_eq!(CellValue::from("inf").coerce_number(), None);
        assert_eq!(CellValue::Boolean(true).coerce_number(), None);
        assert_eq!(CellValue::Number(f64::NAN).coerce_number(), None);
    }

    #[test]
    fn text_and_numeric_keys_collide() {
        assert_eq!(CellValue::from("7").as_key(), CellValue::Int(7).as_key());
        assert_eq!(CellValue::Number(-0.0).as_key(), CellValue::Int(0).as_key());
    }

    #[test]
    fn key_cell_form_prefers_integers() {
        assert_eq!(Key::new(7.0).to_cell(), CellValue::Int(7));
        assert_eq!(Key::new(7.5).to_cell(), CellValue::Number(7.5));
        assert_eq!(Key::new(7.0).to_string(), "7");
    }

    #[test]
    fn not_available_marker() {
        assert!(CellValue::not_available().is_not_available());
        assert!(!CellValue::from("#n/a").is_not_available());
        assert_eq!(CellValue::not_available().to_string(), NOT_AVAILABLE);
    }
}
