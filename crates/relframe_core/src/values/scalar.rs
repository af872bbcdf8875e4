use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use super::datatype::DataType;

/// A single owned value.
#[derive(Debug, Clone)]
pub enum ScalarValue {
    Null,
    Boolean(bool),
    Int64(i64),
    Float64(f64),
    Utf8(String),
    List(Vec<ScalarValue>),
}

impl ScalarValue {
    pub fn datatype(&self) -> DataType {
        match self {
            Self::Null => DataType::Null,
            Self::Boolean(_) => DataType::Boolean,
            Self::Int64(_) => DataType::Int64,
            Self::Float64(_) => DataType::Float64,
            Self::Utf8(_) => DataType::Utf8,
            Self::List(vals) => {
                let inner = vals
                    .iter()
                    .map(|v| v.datatype())
                    .try_fold(DataType::Null, |acc, t| acc.unify(&t))
                    .unwrap_or(DataType::Null);
                DataType::List(Box::new(inner))
            }
        }
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    pub const fn try_as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub const fn try_as_i64(&self) -> Option<i64> {
        match self {
            Self::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric value widened to a float.
    pub const fn try_as_f64(&self) -> Option<f64> {
        match self {
            Self::Int64(v) => Some(*v as f64),
            Self::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Convert integers to floats wherever `datatype` expects floats,
    /// including list elements. Returns `None` if nothing needs converting.
    pub fn widen_to(&self, datatype: &DataType) -> Option<ScalarValue> {
        match (self, datatype) {
            (Self::Int64(v), DataType::Float64) => Some(Self::Float64(*v as f64)),
            (Self::List(vals), DataType::List(inner)) => {
                let widened: Vec<_> = vals.iter().map(|v| v.widen_to(inner)).collect();
                if widened.iter().all(Option::is_none) {
                    return None;
                }
                Some(Self::List(
                    widened
                        .into_iter()
                        .zip(vals)
                        .map(|(w, v)| w.unwrap_or_else(|| v.clone()))
                        .collect(),
                ))
            }
            _ => None,
        }
    }

    pub fn try_as_str(&self) -> Option<&str> {
        match self {
            Self::Utf8(s) => Some(s),
            _ => None,
        }
    }

    /// Ordering used for sorting and min/max.
    ///
    /// Nulls sort before everything else, integers and floats compare by
    /// numeric value, and values of otherwise unrelated types order by type.
    pub fn sort_cmp(&self, other: &ScalarValue) -> Ordering {
        match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Null, _) => Ordering::Less,
            (_, Self::Null) => Ordering::Greater,
            (Self::Boolean(a), Self::Boolean(b)) => a.cmp(b),
            (Self::Int64(a), Self::Int64(b)) => a.cmp(b),
            (Self::Int64(_) | Self::Float64(_), Self::Int64(_) | Self::Float64(_)) => {
                // Both numeric, unwraps can't fail.
                let a = self.try_as_f64().unwrap_or_default();
                let b = other.try_as_f64().unwrap_or_default();
                a.total_cmp(&b)
            }
            (Self::Utf8(a), Self::Utf8(b)) => a.cmp(b),
            (Self::List(a), Self::List(b)) => {
                for (a, b) in a.iter().zip(b.iter()) {
                    match a.sort_cmp(b) {
                        Ordering::Equal => continue,
                        other => return other,
                    }
                }
                a.len().cmp(&b.len())
            }
            (a, b) => a.type_rank().cmp(&b.type_rank()),
        }
    }

    const fn type_rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Boolean(_) => 1,
            Self::Int64(_) | Self::Float64(_) => 2,
            Self::Utf8(_) => 3,
            Self::List(_) => 4,
        }
    }

    /// Formats the value the way it appears in expression text, with strings
    /// quoted.
    pub fn fmt_literal(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8(s) => write!(f, "'{s}'"),
            Self::List(vals) => {
                write!(f, "[")?;
                for (idx, val) in vals.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    val.fmt_literal(f)?;
                }
                write!(f, "]")
            }
            other => write!(f, "{other}"),
        }
    }
}

impl PartialEq for ScalarValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Int64(a), Self::Int64(b)) => a == b,
            // Bitwise so that NaN groups with itself.
            (Self::Float64(a), Self::Float64(b)) => a.to_bits() == b.to_bits(),
            (Self::Utf8(a), Self::Utf8(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ScalarValue {}

impl Hash for ScalarValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => (),
            Self::Boolean(v) => v.hash(state),
            Self::Int64(v) => v.hash(state),
            Self::Float64(v) => v.to_bits().hash(state),
            Self::Utf8(v) => v.hash(state),
            Self::List(v) => v.hash(state),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Utf8(v) => write!(f, "{v}"),
            Self::List(vals) => {
                write!(f, "[")?;
                for (idx, val) in vals.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{val}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl Serialize for ScalarValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Boolean(v) => serializer.serialize_bool(*v),
            Self::Int64(v) => serializer.serialize_i64(*v),
            Self::Float64(v) => serializer.serialize_f64(*v),
            Self::Utf8(v) => serializer.serialize_str(v),
            Self::List(vals) => {
                let mut seq = serializer.serialize_seq(Some(vals.len()))?;
                for val in vals {
                    seq.serialize_element(val)?;
                }
                seq.end()
            }
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Boolean(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Int64(value)
    }
}

impl From<i32> for ScalarValue {
    fn from(value: i32) -> Self {
        ScalarValue::Int64(value as i64)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Float64(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Utf8(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::Utf8(value)
    }
}

impl<T> From<Option<T>> for ScalarValue
where
    T: Into<ScalarValue>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => ScalarValue::Null,
        }
    }
}

impl<T> From<Vec<T>> for ScalarValue
where
    T: Into<ScalarValue>,
{
    fn from(value: Vec<T>) -> Self {
        ScalarValue::List(value.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn nulls_sort_first() {
        let mut vals = vec![
            ScalarValue::Int64(3),
            ScalarValue::Null,
            ScalarValue::Float64(1.5),
            ScalarValue::Int64(-1),
        ];
        vals.sort_by(|a, b| a.sort_cmp(b));

        assert_eq!(
            vec![
                ScalarValue::Null,
                ScalarValue::Int64(-1),
                ScalarValue::Float64(1.5),
                ScalarValue::Int64(3),
            ],
            vals
        );
    }

    #[test]
    fn nan_hashes_consistently() {
        let mut set = HashSet::new();
        set.insert(ScalarValue::Float64(f64::NAN));
        set.insert(ScalarValue::Float64(f64::NAN));
        assert_eq!(1, set.len());
    }

    #[test]
    fn literal_formatting() {
        struct Lit(ScalarValue);
        impl fmt::Display for Lit {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt_literal(f)
            }
        }

        assert_eq!("'a'", Lit("a".into()).to_string());
        assert_eq!("a", ScalarValue::from("a").to_string());
        assert_eq!("['x', NULL]", Lit(vec![Some("x"), None].into()).to_string());
    }

    #[test]
    fn list_datatype() {
        let list: ScalarValue = vec![ScalarValue::Null, ScalarValue::Int64(1)].into();
        assert_eq!(DataType::List(Box::new(DataType::Int64)), list.datatype());
    }

    #[test]
    fn widen_integers() {
        assert_eq!(
            Some(ScalarValue::Float64(2.0)),
            ScalarValue::Int64(2).widen_to(&DataType::Float64)
        );
        assert_eq!(None, ScalarValue::Float64(2.0).widen_to(&DataType::Float64));
        assert_eq!(None, ScalarValue::Null.widen_to(&DataType::Float64));
        assert_eq!(None, ScalarValue::Int64(2).widen_to(&DataType::Int64));

        let list: ScalarValue = vec![ScalarValue::Int64(1), ScalarValue::Float64(0.5)].into();
        assert_eq!(
            Some(ScalarValue::from(vec![1.0, 0.5])),
            list.widen_to(&DataType::List(Box::new(DataType::Float64)))
        );
    }
}
