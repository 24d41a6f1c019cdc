//! Supported column types and typed values.
//!
//! External inputs arrive as [`serde_json::Value`] and are coerced into the
//! closed [`DataValue`] sum in one dispatch, so the type check is total: a
//! stored value always matches its column's [`ColumnType`] tag.

use std::fmt;

use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::{Result, StoreError};

/// Closed set of column type tags.
///
/// The serialized names (`integer`, `real`, `char`, `string`, `realInv`,
/// `image`) are the tags used in schemas, snapshots and API requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// Signed 64-bit integer.
    #[serde(rename = "integer")]
    Integer,
    /// 64-bit IEEE-754 float.
    #[serde(rename = "real")]
    Real,
    /// One Unicode scalar.
    #[serde(rename = "char")]
    Char,
    /// Arbitrary Unicode text.
    #[serde(rename = "string")]
    String,
    /// Closed real interval `[a, b]` with `a <= b`.
    #[serde(rename = "realInv")]
    RealInv,
    /// Opaque text blob, stored like a string.
    #[serde(rename = "image")]
    Image,
}

impl ColumnType {
    /// Every supported type tag.
    pub const ALL: [Self; 6] = [
        Self::Integer,
        Self::Real,
        Self::Char,
        Self::String,
        Self::RealInv,
        Self::Image,
    ];

    /// Parses a wire tag into a type.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "integer" => Some(Self::Integer),
            "real" => Some(Self::Real),
            "char" => Some(Self::Char),
            "string" => Some(Self::String),
            "realInv" => Some(Self::RealInv),
            "image" => Some(Self::Image),
            _ => None,
        }
    }

    /// Whether `tag` names a supported type.
    #[must_use]
    pub fn is_available_name(tag: &str) -> bool {
        Self::parse(tag).is_some()
    }

    /// Returns the wire tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Real => "real",
            Self::Char => "char",
            Self::String => "string",
            Self::RealInv => "realInv",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed value stored in a table cell.
///
/// Equality is structural; floats compare with `==`, so `NaN != NaN`.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    /// Signed 64-bit integer.
    Integer(i64),
    /// 64-bit float.
    Real(f64),
    /// One Unicode scalar.
    Char(char),
    /// Unicode text.
    String(String),
    /// Opaque text blob.
    Image(String),
    /// Closed real interval, lower bound first.
    RealInv(f64, f64),
}

impl DataValue {
    /// Coerces an untyped JSON value into the given column type.
    ///
    /// Numeric widening is permitted; floats truncate toward zero when an
    /// integer column receives one (a deliberate tolerance for JSON numeric
    /// ambiguity). `column` is only used for error context.
    pub fn coerce(column: &str, ty: ColumnType, value: &Value) -> Result<Self> {
        match ty {
            ColumnType::Integer => coerce_integer(column, value),
            ColumnType::Real => real_from(column, value).map(Self::Real),
            ColumnType::Char => coerce_char(column, value),
            ColumnType::String => coerce_text(column, ColumnType::String, value).map(Self::String),
            ColumnType::Image => coerce_text(column, ColumnType::Image, value).map(Self::Image),
            ColumnType::RealInv => coerce_real_inv(column, value),
        }
    }

    /// The type tag this value carries.
    #[must_use]
    pub const fn column_type(&self) -> ColumnType {
        match self {
            Self::Integer(_) => ColumnType::Integer,
            Self::Real(_) => ColumnType::Real,
            Self::Char(_) => ColumnType::Char,
            Self::String(_) => ColumnType::String,
            Self::Image(_) => ColumnType::Image,
            Self::RealInv(_, _) => ColumnType::RealInv,
        }
    }

    /// Converts the value back to its JSON wire form.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Integer(i) => Value::from(*i),
            Self::Real(f) => Value::from(*f),
            Self::Char(c) => Value::String(c.to_string()),
            Self::String(s) | Self::Image(s) => Value::String(s.clone()),
            Self::RealInv(a, b) => Value::Array(vec![Value::from(*a), Value::from(*b)]),
        }
    }
}

impl fmt::Display for DataValue {
    /// Canonical stringification, also used for duplicate fingerprints.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Char(c) => write!(f, "{c}"),
            Self::String(s) | Self::Image(s) => f.write_str(s),
            Self::RealInv(a, b) => write!(f, "[{a}, {b}]"),
        }
    }
}

impl Serialize for DataValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Real(v) => serializer.serialize_f64(*v),
            Self::Char(c) => serializer.serialize_char(*c),
            Self::String(s) | Self::Image(s) => serializer.serialize_str(s),
            Self::RealInv(a, b) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(a)?;
                seq.serialize_element(b)?;
                seq.end()
            }
        }
    }
}

fn mismatch(column: &str, expected: ColumnType) -> StoreError {
    StoreError::TypeMismatch {
        column: column.to_string(),
        expected,
    }
}

fn coerce_integer(column: &str, value: &Value) -> Result<DataValue> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(DataValue::Integer(i))
            } else if n.is_u64() {
                // Above i64::MAX: not value-preserving.
                Err(mismatch(column, ColumnType::Integer))
            } else if let Some(f) = n.as_f64() {
                Ok(DataValue::Integer(f as i64))
            } else {
                Err(mismatch(column, ColumnType::Integer))
            }
        }
        Value::String(s) => s
            .parse::<i64>()
            .map(DataValue::Integer)
            .map_err(|_| mismatch(column, ColumnType::Integer)),
        _ => Err(mismatch(column, ColumnType::Integer)),
    }
}

fn real_from(column: &str, value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| mismatch(column, ColumnType::Real)),
        Value::String(s) => s
            .parse::<f64>()
            .map_err(|_| mismatch(column, ColumnType::Real)),
        _ => Err(mismatch(column, ColumnType::Real)),
    }
}

fn coerce_char(column: &str, value: &Value) -> Result<DataValue> {
    match value {
        Value::String(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(DataValue::Char(c)),
                _ => Err(mismatch(column, ColumnType::Char)),
            }
        }
        Value::Number(n) => n
            .as_u64()
            .and_then(|code| u32::try_from(code).ok())
            .and_then(char::from_u32)
            .map(DataValue::Char)
            .ok_or_else(|| mismatch(column, ColumnType::Char)),
        _ => Err(mismatch(column, ColumnType::Char)),
    }
}

fn coerce_text(column: &str, ty: ColumnType, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(mismatch(column, ty)),
    }
}

fn coerce_real_inv(column: &str, value: &Value) -> Result<DataValue> {
    let Value::Array(items) = value else {
        return Err(StoreError::InvalidRangeDeclaration);
    };
    let [a, b] = items.as_slice() else {
        return Err(StoreError::InvalidRangeDeclaration);
    };
    let a = real_from(column, a)?;
    let b = real_from(column, b)?;
    if a > b {
        return Err(StoreError::InvalidRange { a, b });
    }
    Ok(DataValue::RealInv(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn coerce(ty: ColumnType, value: &Value) -> Result<DataValue> {
        DataValue::coerce("c", ty, value)
    }

    #[test]
    fn tag_round_trip() {
        for ty in ColumnType::ALL {
            assert_eq!(ColumnType::parse(ty.as_str()), Some(ty));
            assert!(ColumnType::is_available_name(ty.as_str()));
        }
        assert!(!ColumnType::is_available_name("blob"));
        assert!(!ColumnType::is_available_name("Integer"));
    }

    #[test]
    fn integer_accepts_numbers_and_digit_strings() {
        assert_eq!(
            coerce(ColumnType::Integer, &json!(42)).unwrap(),
            DataValue::Integer(42)
        );
        assert_eq!(
            coerce(ColumnType::Integer, &json!(-7)).unwrap(),
            DataValue::Integer(-7)
        );
        assert_eq!(
            coerce(ColumnType::Integer, &json!("1024")).unwrap(),
            DataValue::Integer(1024)
        );
    }

    #[test]
    fn integer_truncates_floats_toward_zero() {
        assert_eq!(
            coerce(ColumnType::Integer, &json!(3.9)).unwrap(),
            DataValue::Integer(3)
        );
        assert_eq!(
            coerce(ColumnType::Integer, &json!(-3.9)).unwrap(),
            DataValue::Integer(-3)
        );
    }

    #[test]
    fn integer_rejects_other_shapes() {
        assert!(coerce(ColumnType::Integer, &json!(true)).is_err());
        assert!(coerce(ColumnType::Integer, &json!("12.5")).is_err());
        assert!(coerce(ColumnType::Integer, &json!([1])).is_err());
        assert!(coerce(ColumnType::Integer, &json!(u64::MAX)).is_err());
        assert!(coerce(ColumnType::Integer, &Value::Null).is_err());
    }

    #[test]
    fn real_accepts_numbers_and_decimal_strings() {
        assert_eq!(
            coerce(ColumnType::Real, &json!(2)).unwrap(),
            DataValue::Real(2.0)
        );
        assert_eq!(
            coerce(ColumnType::Real, &json!(2.5)).unwrap(),
            DataValue::Real(2.5)
        );
        assert_eq!(
            coerce(ColumnType::Real, &json!("2.5")).unwrap(),
            DataValue::Real(2.5)
        );
        assert!(coerce(ColumnType::Real, &json!("2,5")).is_err());
        assert!(coerce(ColumnType::Real, &json!(null)).is_err());
    }

    #[test]
    fn char_accepts_one_scalar() {
        assert_eq!(
            coerce(ColumnType::Char, &json!("q")).unwrap(),
            DataValue::Char('q')
        );
        assert_eq!(
            coerce(ColumnType::Char, &json!("ж")).unwrap(),
            DataValue::Char('ж')
        );
        assert_eq!(
            coerce(ColumnType::Char, &json!(97)).unwrap(),
            DataValue::Char('a')
        );
        assert!(coerce(ColumnType::Char, &json!("ab")).is_err());
        assert!(coerce(ColumnType::Char, &json!("")).is_err());
        assert!(coerce(ColumnType::Char, &json!(-1)).is_err());
        // Surrogate range is not a Unicode scalar.
        assert!(coerce(ColumnType::Char, &json!(0xD800)).is_err());
    }

    #[test]
    fn string_accepts_textual_forms() {
        assert_eq!(
            coerce(ColumnType::String, &json!("pond")).unwrap(),
            DataValue::String("pond".into())
        );
        assert_eq!(
            coerce(ColumnType::String, &json!(12)).unwrap(),
            DataValue::String("12".into())
        );
        assert_eq!(
            coerce(ColumnType::String, &json!(false)).unwrap(),
            DataValue::String("false".into())
        );
        assert!(coerce(ColumnType::String, &json!({"a": 1})).is_err());
        assert!(coerce(ColumnType::String, &json!([1, 2])).is_err());
    }

    #[test]
    fn image_behaves_like_string() {
        assert_eq!(
            coerce(ColumnType::Image, &json!("deadbeef")).unwrap(),
            DataValue::Image("deadbeef".into())
        );
    }

    #[test]
    fn real_inv_accepts_ordered_pairs() {
        assert_eq!(
            coerce(ColumnType::RealInv, &json!([2.2, 3.3])).unwrap(),
            DataValue::RealInv(2.2, 3.3)
        );
        // Mixed numeric elements widen to real.
        assert_eq!(
            coerce(ColumnType::RealInv, &json!([2, 3.5])).unwrap(),
            DataValue::RealInv(2.0, 3.5)
        );
        // Degenerate interval is still an interval.
        assert_eq!(
            coerce(ColumnType::RealInv, &json!([1.0, 1.0])).unwrap(),
            DataValue::RealInv(1.0, 1.0)
        );
    }

    #[test]
    fn real_inv_rejects_bad_shapes() {
        assert!(matches!(
            coerce(ColumnType::RealInv, &json!([1.0])),
            Err(StoreError::InvalidRangeDeclaration)
        ));
        assert!(matches!(
            coerce(ColumnType::RealInv, &json!([1.0, 2.0, 3.0])),
            Err(StoreError::InvalidRangeDeclaration)
        ));
        assert!(matches!(
            coerce(ColumnType::RealInv, &json!(1.0)),
            Err(StoreError::InvalidRangeDeclaration)
        ));
        assert!(matches!(
            coerce(ColumnType::RealInv, &json!([3.0, 1.0])),
            Err(StoreError::InvalidRange { a, b }) if a == 3.0 && b == 1.0
        ));
    }

    #[test]
    fn equality_is_structural() {
        assert_eq!(DataValue::RealInv(1.0, 2.0), DataValue::RealInv(1.0, 2.0));
        assert_ne!(DataValue::RealInv(1.0, 2.0), DataValue::RealInv(1.0, 2.5));
        assert_ne!(
            DataValue::Real(f64::NAN),
            DataValue::Real(f64::NAN),
            "NaN never equals NaN"
        );
        assert_ne!(DataValue::String("a".into()), DataValue::Image("a".into()));
    }

    #[test]
    fn json_round_trip() {
        assert_eq!(DataValue::Integer(5).to_json(), json!(5));
        assert_eq!(DataValue::Real(2.5).to_json(), json!(2.5));
        assert_eq!(DataValue::Char('x').to_json(), json!("x"));
        assert_eq!(DataValue::RealInv(1.0, 2.0).to_json(), json!([1.0, 2.0]));
        assert_eq!(
            serde_json::to_value(DataValue::RealInv(1.0, 2.0)).unwrap(),
            json!([1.0, 2.0])
        );
    }

    #[test]
    fn canonical_strings() {
        assert_eq!(DataValue::Integer(5).to_string(), "5");
        assert_eq!(DataValue::Real(2.5).to_string(), "2.5");
        assert_eq!(DataValue::Char('x').to_string(), "x");
        assert_eq!(DataValue::RealInv(1.0, 2.0).to_string(), "[1, 2]");
    }
}
