use std::fmt;
use std::ops::{Index, IndexMut};
use std::sync::Arc;

use super::scalar::ScalarValue;

/// A row shared between the producer of a partition and whoever is reading
/// it. Must be copied before handing it to user code.
pub type SharedRow = Arc<Row>;

/// An ordered list of values conforming to some schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Row(Vec<ScalarValue>);

impl Row {
    pub fn new(values: impl IntoIterator<Item = ScalarValue>) -> Self {
        Row(values.into_iter().collect())
    }

    /// A row of `n` nulls.
    pub fn nulls(n: usize) -> Self {
        Row(vec![ScalarValue::Null; n])
    }

    pub fn num_columns(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, idx: usize) -> Option<&ScalarValue> {
        self.0.get(idx)
    }

    pub fn values(&self) -> &[ScalarValue] {
        &self.0
    }

    pub fn values_mut(&mut self) -> &mut [ScalarValue] {
        &mut self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScalarValue> {
        self.0.iter()
    }

    pub fn into_values(self) -> Vec<ScalarValue> {
        self.0
    }

    /// Concatenate two rows, `self` first.
    pub fn concat(&self, other: &Row) -> Row {
        let mut values = Vec::with_capacity(self.0.len() + other.0.len());
        values.extend_from_slice(&self.0);
        values.extend_from_slice(&other.0);
        Row(values)
    }
}

impl From<Vec<ScalarValue>> for Row {
    fn from(values: Vec<ScalarValue>) -> Self {
        Row(values)
    }
}

impl Index<usize> for Row {
    type Output = ScalarValue;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IndexMut<usize> for Row {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (idx, val) in self.0.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            val.fmt_literal(f)?;
        }
        write!(f, ")")
    }
}

/// Create a row from a list of values convertible into scalars.
///
/// ```
/// use relframe_core::row;
/// use relframe_core::values::scalar::ScalarValue;
///
/// let r = row![1, "a", None::<i64>];
/// assert_eq!(ScalarValue::Null, r[2]);
/// ```
#[macro_export]
macro_rules! row {
    () => {
        $crate::values::row::Row::default()
    };
    ($($val:expr),+ $(,)?) => {
        $crate::values::row::Row::new([
            $($crate::values::scalar::ScalarValue::from($val)),+
        ])
    };
}
