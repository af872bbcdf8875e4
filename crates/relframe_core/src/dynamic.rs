//! Row predicates over a loosely typed view of the row.
//!
//! Every value is rendered to text before the predicate sees it, and field
//! names are looked up at evaluation time. Nothing here is checked during
//! analysis beyond the predicate being boolean. Unstable, only available with
//! the `unstable-dynamic-rows` feature.

use std::fmt;
use std::sync::Arc;

use relframe_error::{RelError, Result};

use crate::expr::udf::BoxError;
use crate::values::row::Row;

pub type DynamicFn = dyn Fn(&DynamicRow<'_>) -> Result<bool, BoxError> + Send + Sync;

/// A textual view over a single row.
#[derive(Debug)]
pub struct DynamicRow<'a> {
    names: &'a [String],
    text: Vec<Option<String>>,
    row: &'a Row,
}

impl<'a> DynamicRow<'a> {
    pub fn new(names: &'a [String], row: &'a Row) -> Self {
        let text = row
            .iter()
            .map(|v| if v.is_null() { None } else { Some(v.to_string()) })
            .collect();
        DynamicRow { names, text, row }
    }

    /// Get the textual value of a field. Returns `None` if the field doesn't
    /// exist or is null.
    pub fn get(&self, field: &str) -> Option<&str> {
        let idx = self.names.iter().position(|name| name == field)?;
        self.text.get(idx)?.as_deref()
    }

    pub fn field_names(&self) -> &[String] {
        self.names
    }

    /// The underlying typed row.
    pub fn row(&self) -> &Row {
        self.row
    }
}

#[derive(Clone)]
pub struct DynamicPredicate {
    func: Arc<DynamicFn>,
}

impl DynamicPredicate {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&DynamicRow<'_>) -> Result<bool, BoxError> + Send + Sync + 'static,
    {
        DynamicPredicate {
            func: Arc::new(func),
        }
    }

    pub fn evaluate(&self, names: &[String], row: &Row) -> Result<bool> {
        let view = DynamicRow::new(names, row);
        (self.func)(&view).map_err(|e| RelError::user_function("dynamic_row_predicate", e))
    }
}

impl PartialEq for DynamicPredicate {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for DynamicPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicPredicate").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;

    #[test]
    fn textual_view() {
        let names = vec!["key".to_string(), "value".to_string(), "n".to_string()];
        let r = row![1, "a", None::<i64>];
        let view = DynamicRow::new(&names, &r);

        assert_eq!(Some("1"), view.get("key"));
        assert_eq!(Some("a"), view.get("value"));
        assert_eq!(None, view.get("n"));
        assert_eq!(None, view.get("missing"));
        assert_eq!(&r, view.row());
        assert_eq!(names.as_slice(), view.field_names());
    }

    #[test]
    fn evaluate_predicate() {
        let names = vec!["key".to_string()];
        let pred = DynamicPredicate::new(|r| Ok(r.get("key") == Some("2")));

        assert!(pred.evaluate(&names, &row![2]).unwrap());
        assert!(!pred.evaluate(&names, &row![3]).unwrap());
    }
}
