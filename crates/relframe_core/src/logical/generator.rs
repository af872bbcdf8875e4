use std::fmt;
use std::sync::Arc;

use relframe_error::{RelError, Result};

use crate::expr::Expression;
use crate::expr::udf::BoxError;
use crate::values::field::Field;
use crate::values::row::Row;
use crate::values::scalar::ScalarValue;

pub type GeneratorFn = dyn Fn(&[ScalarValue]) -> Result<Vec<Row>, BoxError> + Send + Sync;

/// Produces zero or more rows for every input row.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorOp {
    /// One row per element of a list valued expression. The single output
    /// column is named `col`.
    Explode(Expression),
    User(UserGenerator),
}

impl GeneratorOp {
    pub fn inputs(&self) -> Vec<&Expression> {
        match self {
            Self::Explode(expr) => vec![expr],
            Self::User(generator) => generator.inputs.iter().collect(),
        }
    }
}

impl fmt::Display for GeneratorOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explode(expr) => write!(f, "explode({expr})"),
            Self::User(generator) => {
                write!(f, "{}(", generator.name)?;
                for (idx, input) in generator.inputs.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{input}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A generator backed by a host function.
///
/// The function receives the evaluated `inputs` and must return rows matching
/// `output`.
#[derive(Clone)]
pub struct UserGenerator {
    pub name: String,
    pub inputs: Vec<Expression>,
    pub output: Vec<Field>,
    func: Arc<GeneratorFn>,
}

impl UserGenerator {
    pub fn new<F>(
        name: impl Into<String>,
        inputs: Vec<Expression>,
        output: Vec<Field>,
        func: F,
    ) -> Self
    where
        F: Fn(&[ScalarValue]) -> Result<Vec<Row>, BoxError> + Send + Sync + 'static,
    {
        UserGenerator {
            name: name.into(),
            inputs,
            output,
            func: Arc::new(func),
        }
    }

    pub fn invoke(&self, args: &[ScalarValue]) -> Result<Vec<Row>> {
        let rows = (self.func)(args).map_err(|e| RelError::user_function(&self.name, e))?;
        if let Some(row) = rows.iter().find(|r| r.num_columns() != self.output.len()) {
            return Err(RelError::user_function(
                &self.name,
                format!(
                    "generated row {row} has {} columns, expected {}",
                    row.num_columns(),
                    self.output.len()
                ),
            ));
        }
        Ok(rows)
    }
}

impl PartialEq for UserGenerator {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.inputs == other.inputs
            && self.output == other.output
            && Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for UserGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserGenerator")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}
