//! Polymorphic scalar/list value type for tree leaves.
//!
//! [`Value`] is a closed variant over the seven payload kinds a parameter
//! entry can hold: empty, integer, double, string, and homogeneous lists of
//! strings, integers, and doubles. Construction normalizes every integer
//! width to `i64` and every float width to `f64`; extraction is checked and
//! fails on kind mismatch instead of coercing.
//!
//! # Examples
//!
//! ```
//! use param_tree_core::{Value, ValueKind};
//!
//! let v = Value::from(42i32);
//! assert_eq!(v.kind(), ValueKind::Int);
//! assert_eq!(i64::try_from(&v), Ok(42));
//!
//! // Extraction is strict: an Int is not a Double.
//! assert!(f64::try_from(&v).is_err());
//!
//! // An empty string is not an empty value.
//! assert!(!Value::from("").is_empty());
//! assert!(Value::Empty.is_empty());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ParamError, Result};

/// Discriminant of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    /// No value set.
    Empty,
    /// 64-bit signed integer.
    Int,
    /// 64-bit float.
    Double,
    /// UTF-8 string.
    Str,
    /// List of strings.
    StrList,
    /// List of 64-bit signed integers.
    IntList,
    /// List of 64-bit floats.
    DoubleList,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Empty => "empty",
            Self::Int => "int",
            Self::Double => "double",
            Self::Str => "string",
            Self::StrList => "string list",
            Self::IntList => "int list",
            Self::DoubleList => "double list",
        };
        f.write_str(name)
    }
}

/// Polymorphic value held by a parameter entry.
///
/// Each variant exclusively owns its payload; cloning duplicates it and
/// [`take`](Value::take) moves it out, leaving the source [`Empty`](Value::Empty).
/// Equality compares discriminant and payload exactly, with no cross-kind
/// coercion: `Int(5)` and `Double(5.0)` are not equal.
///
/// # Examples
///
/// ```
/// use param_tree_core::Value;
///
/// let v = Value::from(vec!["a", "b"]);
/// assert_eq!(v.as_str_list().unwrap(), ["a", "b"]);
///
/// // Booleans are stored as their string markers so they round-trip
/// // through `to_bool`.
/// assert_eq!(Value::from(true).to_bool(), Ok(true));
/// assert!(Value::from(1i64).to_bool().is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// No value set. Distinct from an empty string or an empty list.
    #[default]
    Empty,
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit float.
    Double(f64),
    /// UTF-8 string.
    Str(String),
    /// List of strings.
    StrList(Vec<String>),
    /// List of 64-bit signed integers.
    IntList(Vec<i64>),
    /// List of 64-bit floats.
    DoubleList(Vec<f64>),
}

impl Value {
    /// Returns the active discriminant.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Empty => ValueKind::Empty,
            Self::Int(_) => ValueKind::Int,
            Self::Double(_) => ValueKind::Double,
            Self::Str(_) => ValueKind::Str,
            Self::StrList(_) => ValueKind::StrList,
            Self::IntList(_) => ValueKind::IntList,
            Self::DoubleList(_) => ValueKind::DoubleList,
        }
    }

    /// Returns `true` only for the [`Empty`](Value::Empty) kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use param_tree_core::Value;
    ///
    /// assert!(Value::Empty.is_empty());
    /// assert!(!Value::from("").is_empty());
    /// assert!(!Value::from(Vec::<String>::new()).is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Moves the payload out, leaving [`Empty`](Value::Empty) behind.
    ///
    /// # Examples
    ///
    /// ```
    /// use param_tree_core::Value;
    ///
    /// let mut v = Value::from("moved");
    /// let taken = v.take();
    /// assert_eq!(taken.as_str(), Ok("moved"));
    /// assert!(v.is_empty());
    /// ```
    pub fn take(&mut self) -> Value {
        std::mem::take(self)
    }

    /// Borrows the string payload, failing on any other kind.
    pub fn as_str(&self) -> Result<&str> {
        match self {
            Self::Str(s) => Ok(s),
            other => Err(ParamError::WrongKind {
                from: other.kind(),
                to: "str",
            }),
        }
    }

    /// Borrows the string list payload, failing on any other kind.
    pub fn as_str_list(&self) -> Result<&[String]> {
        match self {
            Self::StrList(list) => Ok(list),
            other => Err(ParamError::WrongKind {
                from: other.kind(),
                to: "string list",
            }),
        }
    }

    /// Borrows the integer list payload, failing on any other kind.
    pub fn as_int_list(&self) -> Result<&[i64]> {
        match self {
            Self::IntList(list) => Ok(list),
            other => Err(ParamError::WrongKind {
                from: other.kind(),
                to: "int list",
            }),
        }
    }

    /// Borrows the double list payload, failing on any other kind.
    pub fn as_double_list(&self) -> Result<&[f64]> {
        match self {
            Self::DoubleList(list) => Ok(list),
            other => Err(ParamError::WrongKind {
                from: other.kind(),
                to: "double list",
            }),
        }
    }

    /// Reads a string value as a boolean marker.
    ///
    /// Succeeds only for `Str("true")` and `Str("false")`, case-sensitive.
    /// Every other kind or content is an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use param_tree_core::Value;
    ///
    /// assert_eq!(Value::from("true").to_bool(), Ok(true));
    /// assert_eq!(Value::from("false").to_bool(), Ok(false));
    /// assert!(Value::from("True").to_bool().is_err());
    /// assert!(Value::from(0i64).to_bool().is_err());
    /// ```
    pub fn to_bool(&self) -> Result<bool> {
        match self {
            Self::Str(s) if s == "true" => Ok(true),
            Self::Str(s) if s == "false" => Ok(false),
            Self::Str(s) => Err(ParamError::NotBool(s.clone())),
            other => Err(ParamError::WrongKind {
                from: other.kind(),
                to: "bool",
            }),
        }
    }

    /// Renders the value as a display string.
    ///
    /// With `full_precision`, doubles use the shortest representation that
    /// parses back to the same bits. Without it, doubles use a shortened
    /// human form: three decimals with trailing zeros trimmed, switching to
    /// two-decimal exponential notation at magnitudes of `1e5` and above or
    /// `1e-5` and below. Lists render as `[e1, e2, ...]` with the same
    /// per-element rule.
    ///
    /// # Examples
    ///
    /// ```
    /// use param_tree_core::Value;
    ///
    /// assert_eq!(Value::from(17.4).to_display_string(true), "17.4");
    /// assert_eq!(Value::from(0.123456).to_display_string(false), "0.123");
    /// assert_eq!(Value::from(174000.0).to_display_string(false), "1.74e5");
    /// assert_eq!(
    ///     Value::from(vec![1i64, 2, 3]).to_display_string(true),
    ///     "[1, 2, 3]"
    /// );
    /// ```
    pub fn to_display_string(&self, full_precision: bool) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Int(i) => i.to_string(),
            Self::Double(d) => render_double(*d, full_precision),
            Self::Str(s) => s.clone(),
            Self::StrList(list) => render_list(list.iter().cloned()),
            Self::IntList(list) => render_list(list.iter().map(|i| i.to_string())),
            Self::DoubleList(list) => {
                render_list(list.iter().map(|d| render_double(*d, full_precision)))
            }
        }
    }
}

fn render_double(d: f64, full_precision: bool) -> String {
    if full_precision {
        return format!("{d}");
    }
    if d == 0.0 {
        return "0".to_string();
    }
    let magnitude = d.abs();
    if magnitude >= 1e5 || magnitude <= 1e-5 {
        format!("{d:.2e}")
    } else {
        let fixed = format!("{d:.3}");
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn render_list(items: impl Iterator<Item = String>) -> String {
    let joined = items.collect::<Vec<_>>().join(", ");
    format!("[{joined}]")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string(true))
    }
}

macro_rules! value_from_int {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::Int(i64::from(v))
            }
        }
    )*};
}

value_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl TryFrom<u64> for Value {
    type Error = ParamError;

    /// Range-checked: values above `i64::MAX` do not fit the integer kind.
    fn try_from(v: u64) -> Result<Value> {
        i64::try_from(v)
            .map(Value::Int)
            .map_err(|_| ParamError::OutOfRange {
                value: v as i128,
                target: "i64",
            })
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Double(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<bool> for Value {
    /// Stored as the string marker `"true"`/`"false"` so flag entries
    /// round-trip through [`Value::to_bool`].
    fn from(v: bool) -> Self {
        Value::Str(if v { "true" } else { "false" }.to_string())
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::StrList(v)
    }
}

impl From<Vec<&str>> for Value {
    fn from(v: Vec<&str>) -> Self {
        Value::StrList(v.into_iter().map(String::from).collect())
    }
}

impl From<Vec<i64>> for Value {
    fn from(v: Vec<i64>) -> Self {
        Value::IntList(v)
    }
}

impl From<Vec<i32>> for Value {
    fn from(v: Vec<i32>) -> Self {
        Value::IntList(v.into_iter().map(i64::from).collect())
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::DoubleList(v)
    }
}

macro_rules! int_try_from_value {
    ($($ty:ty),*) => {$(
        impl TryFrom<&Value> for $ty {
            type Error = ParamError;

            fn try_from(value: &Value) -> Result<$ty> {
                match value {
                    Value::Int(i) => <$ty>::try_from(*i).map_err(|_| ParamError::OutOfRange {
                        value: *i as i128,
                        target: stringify!($ty),
                    }),
                    other => Err(ParamError::WrongKind {
                        from: other.kind(),
                        to: stringify!($ty),
                    }),
                }
            }
        }
    )*};
}

int_try_from_value!(i8, i16, i32, i64, u8, u16, u32, u64);

impl TryFrom<&Value> for f64 {
    type Error = ParamError;

    fn try_from(value: &Value) -> Result<f64> {
        match value {
            Value::Double(d) => Ok(*d),
            other => Err(ParamError::WrongKind {
                from: other.kind(),
                to: "f64",
            }),
        }
    }
}

impl TryFrom<&Value> for f32 {
    type Error = ParamError;

    fn try_from(value: &Value) -> Result<f32> {
        f64::try_from(value).map(|d| d as f32)
    }
}

impl TryFrom<&Value> for String {
    type Error = ParamError;

    fn try_from(value: &Value) -> Result<String> {
        value.as_str().map(String::from)
    }
}

impl TryFrom<Value> for String {
    type Error = ParamError;

    fn try_from(value: Value) -> Result<String> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(ParamError::WrongKind {
                from: other.kind(),
                to: "String",
            }),
        }
    }
}

impl TryFrom<Value> for Vec<String> {
    type Error = ParamError;

    fn try_from(value: Value) -> Result<Vec<String>> {
        match value {
            Value::StrList(list) => Ok(list),
            other => Err(ParamError::WrongKind {
                from: other.kind(),
                to: "Vec<String>",
            }),
        }
    }
}

impl TryFrom<Value> for Vec<i64> {
    type Error = ParamError;

    fn try_from(value: Value) -> Result<Vec<i64>> {
        match value {
            Value::IntList(list) => Ok(list),
            other => Err(ParamError::WrongKind {
                from: other.kind(),
                to: "Vec<i64>",
            }),
        }
    }
}

impl TryFrom<Value> for Vec<f64> {
    type Error = ParamError;

    fn try_from(value: Value) -> Result<Vec<f64>> {
        match value {
            Value::DoubleList(list) => Ok(list),
            other => Err(ParamError::WrongKind {
                from: other.kind(),
                to: "Vec<f64>",
            }),
        }
    }
}

impl PartialEq<i64> for Value {
    fn eq(&self, other: &i64) -> bool {
        matches!(self, Value::Int(i) if i == other)
    }
}

impl PartialEq<i32> for Value {
    fn eq(&self, other: &i32) -> bool {
        matches!(self, Value::Int(i) if *i == i64::from(*other))
    }
}

impl PartialEq<f64> for Value {
    fn eq(&self, other: &f64) -> bool {
        matches!(self, Value::Double(d) if d == other)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, Value::Str(s) if s == other)
    }
}

impl PartialEq<String> for Value {
    fn eq(&self, other: &String) -> bool {
        matches!(self, Value::Str(s) if s == other)
    }
}

impl PartialEq<bool> for Value {
    fn eq(&self, other: &bool) -> bool {
        self.to_bool() == Ok(*other)
    }
}

impl PartialEq<Vec<String>> for Value {
    fn eq(&self, other: &Vec<String>) -> bool {
        matches!(self, Value::StrList(list) if list == other)
    }
}

impl PartialEq<Vec<i64>> for Value {
    fn eq(&self, other: &Vec<i64>) -> bool {
        matches!(self, Value::IntList(list) if list == other)
    }
}

impl PartialEq<Vec<f64>> for Value {
    fn eq(&self, other: &Vec<f64>) -> bool {
        matches!(self, Value::DoubleList(list) if list == other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_selects_one_kind() {
        assert_eq!(Value::from(3i8).kind(), ValueKind::Int);
        assert_eq!(Value::from(3u32).kind(), ValueKind::Int);
        assert_eq!(Value::from(3.5f32).kind(), ValueKind::Double);
        assert_eq!(Value::from("x").kind(), ValueKind::Str);
        assert_eq!(Value::from(vec![1i64]).kind(), ValueKind::IntList);
        assert_eq!(Value::from(vec![1.5]).kind(), ValueKind::DoubleList);
        assert_eq!(Value::from(vec!["a"]).kind(), ValueKind::StrList);
    }

    #[test]
    fn test_empty_is_distinct_from_empty_string_and_list() {
        assert!(Value::Empty.is_empty());
        assert!(!Value::from("").is_empty());
        assert!(!Value::from(Vec::<String>::new()).is_empty());
        assert_ne!(Value::Empty, Value::from(""));
        assert_ne!(Value::Empty, Value::from(Vec::<String>::new()));
    }

    #[test]
    fn test_equality_has_no_cross_kind_coercion() {
        assert_ne!(Value::from(5i64), Value::from(5.0));
        assert_ne!(Value::from("5"), Value::from(5i64));
    }

    #[test]
    fn test_integer_family_narrowing_is_range_checked() {
        let v = Value::from(300i64);
        assert_eq!(i32::try_from(&v), Ok(300));
        assert_eq!(u16::try_from(&v), Ok(300));
        assert_eq!(
            i8::try_from(&v),
            Err(ParamError::OutOfRange {
                value: 300,
                target: "i8"
            })
        );

        let negative = Value::from(-1i64);
        assert!(u64::try_from(&negative).is_err());
    }

    #[test]
    fn test_wrong_kind_extraction_fails() {
        let d = Value::from(2.5);
        assert_eq!(
            i64::try_from(&d),
            Err(ParamError::WrongKind {
                from: ValueKind::Double,
                to: "i64"
            })
        );
        assert!(f64::try_from(&Value::from(2i64)).is_err());
        assert!(Value::from(2i64).as_str().is_err());
    }

    #[test]
    fn test_u64_construction_is_range_checked() {
        assert_eq!(Value::try_from(7u64), Ok(Value::Int(7)));
        assert!(Value::try_from(u64::MAX).is_err());
    }

    #[test]
    fn test_bool_round_trips_through_string_marker() {
        assert_eq!(Value::from(true), Value::from("true"));
        assert_eq!(Value::from(true).to_bool(), Ok(true));
        assert_eq!(Value::from(false).to_bool(), Ok(false));
        assert_eq!(
            Value::from("maybe").to_bool(),
            Err(ParamError::NotBool("maybe".to_string()))
        );
    }

    #[test]
    fn test_display_full_precision_round_trips() {
        let d: f64 = 0.1 + 0.2;
        let rendered = Value::from(d).to_display_string(true);
        assert_eq!(rendered.parse::<f64>().unwrap().to_bits(), d.to_bits());

        assert_eq!(Value::from(17i64).to_display_string(true), "17");
        assert_eq!(Value::from("abc").to_display_string(true), "abc");
    }

    #[test]
    fn test_display_short_precision() {
        assert_eq!(Value::from(17.4).to_display_string(false), "17.4");
        assert_eq!(Value::from(0.123456).to_display_string(false), "0.123");
        assert_eq!(Value::from(2.0).to_display_string(false), "2");
        assert_eq!(Value::from(0.0).to_display_string(false), "0");
        assert_eq!(Value::from(174000.0).to_display_string(false), "1.74e5");
        assert_eq!(Value::from(0.0000017).to_display_string(false), "1.70e-6");
    }

    #[test]
    fn test_list_display() {
        assert_eq!(
            Value::from(vec!["a", "b"]).to_display_string(true),
            "[a, b]"
        );
        assert_eq!(Value::from(vec![1i64, 2]).to_display_string(true), "[1, 2]");
        assert_eq!(
            Value::from(Vec::<String>::new()).to_display_string(true),
            "[]"
        );
    }

    #[test]
    fn test_builtin_comparisons_match_shape() {
        assert_eq!(Value::from(5i64), 5i64);
        assert_eq!(Value::from(5i64), 5i32);
        assert_eq!(Value::from(2.5), 2.5);
        assert_eq!(Value::from("x"), "x");
        assert_eq!(Value::from(true), true);
        assert_eq!(Value::from(vec![1i64, 2]), vec![1i64, 2]);
        assert_ne!(Value::from(5i64), 5.0);
    }

    #[test]
    fn test_take_leaves_empty() {
        let mut v = Value::from(vec![1.0, 2.0]);
        let taken = v.take();
        assert_eq!(taken, vec![1.0, 2.0]);
        assert_eq!(v, Value::default());
        assert!(v.is_empty());
    }
}
