//! Resolve column names and check expression types against an input schema.

use std::fmt;

use relframe_error::{RelError, Result};

use super::physical_expr::PhysicalExpr;
use crate::expr::Expression;
use crate::expr::column_expr::ColumnRef;
use crate::values::datatype::DataType;
use crate::values::field::{ColumnLookup, Field, Schema};

/// A bound expression along with its output type.
#[derive(Debug, Clone)]
pub struct BoundExpr {
    pub expr: PhysicalExpr,
    pub datatype: DataType,
    pub nullable: bool,
}

/// Binds expressions for a single plan node.
///
/// `node` is only used for error messages.
#[derive(Clone, Copy)]
pub struct ExpressionBinder<'a> {
    schema: &'a Schema,
    node: &'a dyn fmt::Display,
}

impl<'a> ExpressionBinder<'a> {
    pub fn new(schema: &'a Schema, node: &'a dyn fmt::Display) -> Self {
        ExpressionBinder { schema, node }
    }

    pub fn error(&self, message: impl Into<String>) -> RelError {
        RelError::analysis(message, self.node)
    }

    pub fn resolve_column(&self, col: &ColumnRef) -> Result<usize> {
        match self.schema.lookup(col.qualifier.as_deref(), &col.name) {
            ColumnLookup::Found(idx) => Ok(idx),
            ColumnLookup::Missing => Err(self.error(format!(
                "cannot resolve column '{col}' given input columns {}",
                self.schema
            ))),
            ColumnLookup::Ambiguous => Err(self.error(format!(
                "column reference '{col}' is ambiguous, qualify it with an alias"
            ))),
        }
    }

    /// Bind an expression and derive the field it produces when projected.
    pub fn bind_field(&self, expr: &Expression) -> Result<(BoundExpr, Field)> {
        let bound = self.bind(expr)?;
        let field = match expr {
            // Plain column references keep their qualifier.
            Expression::Column(col) => {
                let idx = self.resolve_column(col)?;
                match self.schema.field(idx) {
                    Some(field) => field.clone(),
                    None => return Err(self.error(format!("missing field for column '{col}'"))),
                }
            }
            other => Field::new(other.output_name(), bound.datatype.clone(), bound.nullable),
        };
        Ok((bound, field))
    }

    /// Bind a predicate, which must produce a boolean.
    pub fn bind_predicate(&self, expr: &Expression) -> Result<PhysicalExpr> {
        let bound = self.bind(expr)?;
        if matches!(bound.datatype, DataType::Boolean | DataType::Null) {
            Ok(bound.expr)
        } else {
            Err(self.error(format!(
                "predicate '{expr}' must be a boolean, got {}",
                bound.datatype
            )))
        }
    }

    pub fn bind(&self, expr: &Expression) -> Result<BoundExpr> {
        Ok(match expr {
            Expression::Column(col) => {
                let idx = self.resolve_column(col)?;
                let field = self
                    .schema
                    .field(idx)
                    .ok_or_else(|| self.error(format!("missing field for column '{col}'")))?;
                BoundExpr {
                    expr: PhysicalExpr::Column(idx),
                    datatype: field.datatype.clone(),
                    nullable: field.nullable,
                }
            }
            Expression::Literal(v) => BoundExpr {
                expr: PhysicalExpr::Literal(v.clone()),
                datatype: v.datatype(),
                nullable: v.is_null(),
            },
            Expression::Comparison { op, left, right } => {
                let left = self.bind(left)?;
                let right = self.bind(right)?;
                if left.datatype.unify(&right.datatype).is_none() {
                    return Err(self.error(format!(
                        "cannot compare {} with {} in '{expr}'",
                        left.datatype, right.datatype
                    )));
                }
                BoundExpr {
                    nullable: left.nullable || right.nullable,
                    expr: PhysicalExpr::Comparison {
                        op: *op,
                        left: Box::new(left.expr),
                        right: Box::new(right.expr),
                    },
                    datatype: DataType::Boolean,
                }
            }
            Expression::Arith { op, left, right } => {
                let left = self.bind(left)?;
                let right = self.bind(right)?;
                let numeric = |t: &DataType| t.is_numeric() || t.is_null();
                if !numeric(&left.datatype) || !numeric(&right.datatype) {
                    return Err(self.error(format!(
                        "cannot apply '{op}' to {} and {} in '{expr}'",
                        left.datatype, right.datatype
                    )));
                }
                let datatype = left
                    .datatype
                    .unify(&right.datatype)
                    .ok_or_else(|| self.error(format!("incompatible operand types in '{expr}'")))?;
                BoundExpr {
                    nullable: left.nullable || right.nullable,
                    expr: PhysicalExpr::Arith {
                        op: *op,
                        left: Box::new(left.expr),
                        right: Box::new(right.expr),
                    },
                    datatype,
                }
            }
            Expression::Conjunction { op, left, right } => {
                let left = self.bind_boolean(left)?;
                let right = self.bind_boolean(right)?;
                BoundExpr {
                    nullable: left.nullable || right.nullable,
                    expr: PhysicalExpr::Conjunction {
                        op: *op,
                        left: Box::new(left.expr),
                        right: Box::new(right.expr),
                    },
                    datatype: DataType::Boolean,
                }
            }
            Expression::Not(inner) => {
                let inner = self.bind_boolean(inner)?;
                BoundExpr {
                    nullable: inner.nullable,
                    expr: PhysicalExpr::Not(Box::new(inner.expr)),
                    datatype: DataType::Boolean,
                }
            }
            Expression::IsNull(inner) => BoundExpr {
                expr: PhysicalExpr::IsNull(Box::new(self.bind(inner)?.expr)),
                datatype: DataType::Boolean,
                nullable: false,
            },
            Expression::IsNotNull(inner) => BoundExpr {
                expr: PhysicalExpr::IsNotNull(Box::new(self.bind(inner)?.expr)),
                datatype: DataType::Boolean,
                nullable: false,
            },
            Expression::Alias { expr, .. } => self.bind(expr)?,
            Expression::Aggregate { .. } => {
                return Err(self.error(format!(
                    "aggregate '{expr}' is only allowed in the outputs of group_by"
                )));
            }
            Expression::ScalarUdf { function, inputs } => {
                let inputs = inputs
                    .iter()
                    .map(|input| self.bind(input).map(|b| b.expr))
                    .collect::<Result<Vec<_>>>()?;
                BoundExpr {
                    expr: PhysicalExpr::Udf {
                        function: function.clone(),
                        inputs,
                    },
                    datatype: function.return_type().clone(),
                    nullable: true,
                }
            }
            #[cfg(feature = "unstable-dynamic-rows")]
            Expression::DynamicRowPredicate(predicate) => BoundExpr {
                expr: PhysicalExpr::Dynamic {
                    names: self.schema.field_names(),
                    predicate: predicate.clone(),
                },
                datatype: DataType::Boolean,
                nullable: false,
            },
        })
    }

    fn bind_boolean(&self, expr: &Expression) -> Result<BoundExpr> {
        let bound = self.bind(expr)?;
        if matches!(bound.datatype, DataType::Boolean | DataType::Null) {
            Ok(bound)
        } else {
            Err(self.error(format!(
                "expected a boolean for '{expr}', got {}",
                bound.datatype
            )))
        }
    }
}
