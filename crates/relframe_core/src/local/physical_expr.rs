use std::cmp::Ordering;

use relframe_error::{Result, execution, internal};

#[cfg(feature = "unstable-dynamic-rows")]
use crate::dynamic::DynamicPredicate;
use crate::expr::arith_expr::ArithOperator;
use crate::expr::comparison_expr::ComparisonOperator;
use crate::expr::conjunction_expr::ConjunctionOperator;
use crate::expr::udf::UserFunction;
use crate::values::row::Row;
use crate::values::scalar::ScalarValue;

/// An expression bound to column positions of its input.
///
/// Produced by the binder, which has already checked types. Type errors
/// surfacing during evaluation are internal errors.
#[derive(Debug, Clone)]
pub enum PhysicalExpr {
    Column(usize),
    Literal(ScalarValue),
    Comparison {
        op: ComparisonOperator,
        left: Box<PhysicalExpr>,
        right: Box<PhysicalExpr>,
    },
    Arith {
        op: ArithOperator,
        left: Box<PhysicalExpr>,
        right: Box<PhysicalExpr>,
    },
    Conjunction {
        op: ConjunctionOperator,
        left: Box<PhysicalExpr>,
        right: Box<PhysicalExpr>,
    },
    Not(Box<PhysicalExpr>),
    IsNull(Box<PhysicalExpr>),
    IsNotNull(Box<PhysicalExpr>),
    Udf {
        function: UserFunction,
        inputs: Vec<PhysicalExpr>,
    },
    #[cfg(feature = "unstable-dynamic-rows")]
    Dynamic {
        names: Vec<String>,
        predicate: DynamicPredicate,
    },
}

impl PhysicalExpr {
    pub fn eval(&self, row: &Row) -> Result<ScalarValue> {
        match self {
            Self::Column(idx) => row
                .get(*idx)
                .cloned()
                .ok_or_else(|| internal!("column {idx} out of bounds for row {row}")),
            Self::Literal(v) => Ok(v.clone()),
            Self::Comparison { op, left, right } => {
                let left = left.eval(row)?;
                let right = right.eval(row)?;
                if left.is_null() || right.is_null() {
                    return Ok(ScalarValue::Null);
                }
                Ok(ScalarValue::Boolean(op.holds(left.sort_cmp(&right))))
            }
            Self::Arith { op, left, right } => eval_arith(*op, left.eval(row)?, right.eval(row)?),
            Self::Conjunction { op, left, right } => {
                let left = as_bool(left.eval(row)?)?;
                let right = as_bool(right.eval(row)?)?;
                let out = match op {
                    ConjunctionOperator::And => match (left, right) {
                        (Some(false), _) | (_, Some(false)) => Some(false),
                        (Some(true), Some(true)) => Some(true),
                        _ => None,
                    },
                    ConjunctionOperator::Or => match (left, right) {
                        (Some(true), _) | (_, Some(true)) => Some(true),
                        (Some(false), Some(false)) => Some(false),
                        _ => None,
                    },
                };
                Ok(out.into())
            }
            Self::Not(expr) => Ok(as_bool(expr.eval(row)?)?.map(|b| !b).into()),
            Self::IsNull(expr) => Ok(ScalarValue::Boolean(expr.eval(row)?.is_null())),
            Self::IsNotNull(expr) => Ok(ScalarValue::Boolean(!expr.eval(row)?.is_null())),
            Self::Udf { function, inputs } => {
                let args = inputs
                    .iter()
                    .map(|input| input.eval(row))
                    .collect::<Result<Vec<_>>>()?;
                function.invoke(&args)
            }
            #[cfg(feature = "unstable-dynamic-rows")]
            Self::Dynamic { names, predicate } => {
                Ok(ScalarValue::Boolean(predicate.evaluate(names, row)?))
            }
        }
    }

    /// Evaluate as a predicate. Null counts as false.
    pub fn eval_predicate(&self, row: &Row) -> Result<bool> {
        Ok(as_bool(self.eval(row)?)?.unwrap_or(false))
    }
}

fn as_bool(v: ScalarValue) -> Result<Option<bool>> {
    match v {
        ScalarValue::Null => Ok(None),
        ScalarValue::Boolean(b) => Ok(Some(b)),
        other => Err(internal!("expected a boolean, got {other}")),
    }
}

fn eval_arith(op: ArithOperator, left: ScalarValue, right: ScalarValue) -> Result<ScalarValue> {
    match (&left, &right) {
        (ScalarValue::Null, _) | (_, ScalarValue::Null) => Ok(ScalarValue::Null),
        (ScalarValue::Int64(a), ScalarValue::Int64(b)) => {
            let out = match op {
                ArithOperator::Add => a.checked_add(*b),
                ArithOperator::Sub => a.checked_sub(*b),
                ArithOperator::Mul => a.checked_mul(*b),
                ArithOperator::Div => {
                    if *b == 0 {
                        return Err(execution!("division by zero: {a} / {b}"));
                    }
                    a.checked_div(*b)
                }
            };
            out.map(ScalarValue::Int64)
                .ok_or_else(|| execution!("integer overflow: {a} {op} {b}"))
        }
        _ => {
            let (Some(a), Some(b)) = (left.try_as_f64(), right.try_as_f64()) else {
                return Err(internal!("cannot apply {op} to {left} and {right}"));
            };
            let out = match op {
                ArithOperator::Add => a + b,
                ArithOperator::Sub => a - b,
                ArithOperator::Mul => a * b,
                ArithOperator::Div => a / b,
            };
            Ok(ScalarValue::Float64(out))
        }
    }
}

/// Compare rows on a list of keys.
pub fn compare_keys(a: &[ScalarValue], b: &[ScalarValue], descending: &[bool]) -> Ordering {
    for ((a, b), desc) in a.iter().zip(b).zip(descending) {
        let ord = a.sort_cmp(b);
        let ord = if *desc { ord.reverse() } else { ord };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;

    fn col(idx: usize) -> Box<PhysicalExpr> {
        Box::new(PhysicalExpr::Column(idx))
    }

    fn lit(v: impl Into<ScalarValue>) -> Box<PhysicalExpr> {
        Box::new(PhysicalExpr::Literal(v.into()))
    }

    #[test]
    fn comparison_with_nulls() {
        let expr = PhysicalExpr::Comparison {
            op: ComparisonOperator::Gt,
            left: col(0),
            right: lit(1),
        };

        assert_eq!(ScalarValue::Boolean(true), expr.eval(&row![2]).unwrap());
        assert_eq!(ScalarValue::Boolean(false), expr.eval(&row![1]).unwrap());
        assert_eq!(ScalarValue::Null, expr.eval(&row![None::<i64>]).unwrap());
        assert!(!expr.eval_predicate(&row![None::<i64>]).unwrap());
    }

    #[test]
    fn mixed_numeric_comparison() {
        let expr = PhysicalExpr::Comparison {
            op: ComparisonOperator::Eq,
            left: col(0),
            right: lit(2.0),
        };
        assert_eq!(ScalarValue::Boolean(true), expr.eval(&row![2]).unwrap());
    }

    #[test]
    fn arith() {
        let add = PhysicalExpr::Arith {
            op: ArithOperator::Add,
            left: col(0),
            right: lit(1.5),
        };
        assert_eq!(ScalarValue::Float64(3.5), add.eval(&row![2]).unwrap());

        let div = PhysicalExpr::Arith {
            op: ArithOperator::Div,
            left: col(0),
            right: lit(0),
        };
        let err = div.eval(&row![2]).unwrap_err();
        assert!(!err.is_analysis());

        let overflow = PhysicalExpr::Arith {
            op: ArithOperator::Mul,
            left: col(0),
            right: lit(2),
        };
        assert!(overflow.eval(&row![i64::MAX]).is_err());
    }

    #[test]
    fn three_valued_logic() {
        let and = PhysicalExpr::Conjunction {
            op: ConjunctionOperator::And,
            left: col(0),
            right: col(1),
        };
        let or = PhysicalExpr::Conjunction {
            op: ConjunctionOperator::Or,
            left: col(0),
            right: col(1),
        };

        let r = row![None::<bool>, false];
        assert_eq!(ScalarValue::Boolean(false), and.eval(&r).unwrap());
        assert_eq!(ScalarValue::Null, or.eval(&r).unwrap());

        let r = row![None::<bool>, true];
        assert_eq!(ScalarValue::Null, and.eval(&r).unwrap());
        assert_eq!(ScalarValue::Boolean(true), or.eval(&r).unwrap());
    }

    #[test]
    fn descending_keys() {
        let a = [ScalarValue::Int64(1), ScalarValue::from("b")];
        let b = [ScalarValue::Int64(1), ScalarValue::from("a")];
        assert_eq!(Ordering::Greater, compare_keys(&a, &b, &[false, false]));
        assert_eq!(Ordering::Less, compare_keys(&a, &b, &[false, true]));
    }
}
