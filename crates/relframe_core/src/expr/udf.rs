use std::fmt;
use std::sync::Arc;

use relframe_error::{RelError, Result};

use crate::values::datatype::DataType;
use crate::values::scalar::ScalarValue;

/// Error type host functions may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type ScalarFn = dyn Fn(&[ScalarValue]) -> Result<ScalarValue, BoxError> + Send + Sync;

/// An opaque host function that can be applied to column values.
///
/// Two functions are equal only if they have the same name and wrap the same
/// closure.
#[derive(Clone)]
pub struct UserFunction {
    name: String,
    return_type: DataType,
    func: Arc<ScalarFn>,
}

impl UserFunction {
    pub fn new<F>(name: impl Into<String>, return_type: DataType, func: F) -> Self
    where
        F: Fn(&[ScalarValue]) -> Result<ScalarValue, BoxError> + Send + Sync + 'static,
    {
        UserFunction {
            name: name.into(),
            return_type,
            func: Arc::new(func),
        }
    }

    /// Wrap a single-argument predicate.
    pub fn predicate<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&ScalarValue) -> Result<bool, BoxError> + Send + Sync + 'static,
    {
        let name = name.into();
        let fn_name = name.clone();
        Self::new(name, DataType::Boolean, move |args| match args {
            [arg] => predicate(arg).map(ScalarValue::Boolean),
            _ => Err(format!("{fn_name} expects 1 argument, got {}", args.len()).into()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn return_type(&self) -> &DataType {
        &self.return_type
    }

    pub fn invoke(&self, args: &[ScalarValue]) -> Result<ScalarValue> {
        (self.func)(args).map_err(|e| RelError::user_function(&self.name, e))
    }
}

impl PartialEq for UserFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for UserFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserFunction")
            .field("name", &self.name)
            .field("return_type", &self.return_type)
            .finish_non_exhaustive()
    }
}
