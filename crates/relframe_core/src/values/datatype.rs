use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Type of a bare NULL literal. Compatible with every other type.
    Null,
    Boolean,
    Int64,
    Float64,
    Utf8,
    List(Box<DataType>),
}

impl DataType {
    pub const fn is_numeric(&self) -> bool {
        matches!(self, DataType::Int64 | DataType::Float64)
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, DataType::Null)
    }

    /// Type usable where either `self` or `other` is expected.
    ///
    /// Returns `None` if the types cannot be unified.
    pub fn unify(&self, other: &DataType) -> Option<DataType> {
        match (self, other) {
            (DataType::Null, t) | (t, DataType::Null) => Some(t.clone()),
            (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
                Some(DataType::Float64)
            }
            (DataType::List(a), DataType::List(b)) => {
                a.unify(b).map(|t| DataType::List(Box::new(t)))
            }
            (a, b) if a == b => Some(a.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "Null"),
            Self::Boolean => write!(f, "Boolean"),
            Self::Int64 => write!(f, "Int64"),
            Self::Float64 => write!(f, "Float64"),
            Self::Utf8 => write!(f, "Utf8"),
            Self::List(inner) => write!(f, "List[{inner}]"),
        }
    }
}
