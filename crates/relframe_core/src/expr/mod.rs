//! Logical expressions.
//!
//! Expressions are built against column *names*. Nothing is resolved or type
//! checked until the plan holding the expression gets compiled.

pub mod aggregate_expr;
pub mod arith_expr;
pub mod column_expr;
pub mod comparison_expr;
pub mod conjunction_expr;
pub mod sort_expr;
pub mod udf;

use std::fmt;
use std::ops;

use aggregate_expr::AggregateFunction;
use arith_expr::ArithOperator;
use column_expr::ColumnRef;
use comparison_expr::ComparisonOperator;
use conjunction_expr::ConjunctionOperator;
use sort_expr::{SortDirection, SortExpr};
use udf::UserFunction;

#[cfg(feature = "unstable-dynamic-rows")]
use crate::dynamic::DynamicPredicate;
use crate::values::scalar::ScalarValue;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Column(ColumnRef),
    Literal(ScalarValue),
    Comparison {
        op: ComparisonOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Arith {
        op: ArithOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Conjunction {
        op: ConjunctionOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Not(Box<Expression>),
    IsNull(Box<Expression>),
    IsNotNull(Box<Expression>),
    /// A named expression.
    Alias {
        name: String,
        expr: Box<Expression>,
    },
    /// An aggregate call. `input` is `None` only for `count(*)`.
    Aggregate {
        func: AggregateFunction,
        input: Option<Box<Expression>>,
    },
    ScalarUdf {
        function: UserFunction,
        inputs: Vec<Expression>,
    },
    /// A predicate over a textual view of the entire input row.
    #[cfg(feature = "unstable-dynamic-rows")]
    DynamicRowPredicate(DynamicPredicate),
}

/// Reference a column by name. `x.key` references `key` under qualifier `x`.
pub fn col(name: &str) -> Expression {
    Expression::Column(ColumnRef::parse(name))
}

pub fn lit(value: impl Into<ScalarValue>) -> Expression {
    Expression::Literal(value.into())
}

impl Expression {
    fn comparison(self, op: ComparisonOperator, other: Expression) -> Expression {
        Expression::Comparison {
            op,
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    fn arith(self, op: ArithOperator, other: Expression) -> Expression {
        Expression::Arith {
            op,
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    fn conjunction(self, op: ConjunctionOperator, other: Expression) -> Expression {
        Expression::Conjunction {
            op,
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    pub fn equals(self, other: Expression) -> Expression {
        self.comparison(ComparisonOperator::Eq, other)
    }

    pub fn not_equals(self, other: Expression) -> Expression {
        self.comparison(ComparisonOperator::NotEq, other)
    }

    pub fn lt(self, other: Expression) -> Expression {
        self.comparison(ComparisonOperator::Lt, other)
    }

    pub fn lt_eq(self, other: Expression) -> Expression {
        self.comparison(ComparisonOperator::LtEq, other)
    }

    pub fn gt(self, other: Expression) -> Expression {
        self.comparison(ComparisonOperator::Gt, other)
    }

    pub fn gt_eq(self, other: Expression) -> Expression {
        self.comparison(ComparisonOperator::GtEq, other)
    }

    pub fn and(self, other: Expression) -> Expression {
        self.conjunction(ConjunctionOperator::And, other)
    }

    pub fn or(self, other: Expression) -> Expression {
        self.conjunction(ConjunctionOperator::Or, other)
    }

    pub fn is_null(self) -> Expression {
        Expression::IsNull(Box::new(self))
    }

    pub fn is_not_null(self) -> Expression {
        Expression::IsNotNull(Box::new(self))
    }

    pub fn alias(self, name: impl Into<String>) -> Expression {
        Expression::Alias {
            name: name.into(),
            expr: Box::new(self),
        }
    }

    pub fn asc(self) -> SortExpr {
        SortExpr {
            expr: self,
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(self) -> SortExpr {
        SortExpr {
            expr: self,
            direction: SortDirection::Descending,
        }
    }

    /// If this expression carries a name of its own. Column references and
    /// aliases are named, everything else is not.
    pub const fn is_named(&self) -> bool {
        matches!(self, Expression::Column(_) | Expression::Alias { .. })
    }

    /// Name of the column this expression produces when projected.
    pub fn output_name(&self) -> String {
        match self {
            Expression::Column(col) => col.name.clone(),
            Expression::Alias { name, .. } => name.clone(),
            other => other.to_string(),
        }
    }

    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Column(_) | Expression::Literal(_) => Vec::new(),
            Expression::Comparison { left, right, .. }
            | Expression::Arith { left, right, .. }
            | Expression::Conjunction { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Expression::Not(expr)
            | Expression::IsNull(expr)
            | Expression::IsNotNull(expr)
            | Expression::Alias { expr, .. } => vec![expr.as_ref()],
            Expression::Aggregate { input, .. } => input.iter().map(|e| e.as_ref()).collect(),
            Expression::ScalarUdf { inputs, .. } => inputs.iter().collect(),
            #[cfg(feature = "unstable-dynamic-rows")]
            Expression::DynamicRowPredicate(_) => Vec::new(),
        }
    }

    pub fn contains_aggregate(&self) -> bool {
        matches!(self, Expression::Aggregate { .. })
            || self.children().into_iter().any(|c| c.contains_aggregate())
    }
}

impl ops::Add for Expression {
    type Output = Expression;

    fn add(self, rhs: Self) -> Self::Output {
        self.arith(ArithOperator::Add, rhs)
    }
}

impl ops::Sub for Expression {
    type Output = Expression;

    fn sub(self, rhs: Self) -> Self::Output {
        self.arith(ArithOperator::Sub, rhs)
    }
}

impl ops::Mul for Expression {
    type Output = Expression;

    fn mul(self, rhs: Self) -> Self::Output {
        self.arith(ArithOperator::Mul, rhs)
    }
}

impl ops::Div for Expression {
    type Output = Expression;

    fn div(self, rhs: Self) -> Self::Output {
        self.arith(ArithOperator::Div, rhs)
    }
}

impl ops::Not for Expression {
    type Output = Expression;

    fn not(self) -> Self::Output {
        Expression::Not(Box::new(self))
    }
}

/// Canonical textual form. Used to name unnamed aggregate outputs.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(col) => write!(f, "{col}"),
            Self::Literal(lit) => lit.fmt_literal(f),
            Self::Comparison { op, left, right } => write!(f, "({left} {op} {right})"),
            Self::Arith { op, left, right } => write!(f, "({left} {op} {right})"),
            Self::Conjunction { op, left, right } => write!(f, "({left} {op} {right})"),
            Self::Not(expr) => write!(f, "NOT {expr}"),
            Self::IsNull(expr) => write!(f, "({expr} IS NULL)"),
            Self::IsNotNull(expr) => write!(f, "({expr} IS NOT NULL)"),
            Self::Alias { name, expr } => write!(f, "{expr} AS {name}"),
            Self::Aggregate { func, input } => match input {
                Some(input) => write!(f, "{func}({input})"),
                None => write!(f, "{func}(*)"),
            },
            Self::ScalarUdf { function, inputs } => {
                write!(f, "{}(", function.name())?;
                for (idx, input) in inputs.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{input}")?;
                }
                write!(f, ")")
            }
            #[cfg(feature = "unstable-dynamic-rows")]
            Self::DynamicRowPredicate(_) => write!(f, "dynamic_row_predicate(*)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::aggregate_expr::{count_star, sum};
    use super::*;

    #[test]
    fn canonical_text() {
        assert_eq!("(key > 1)", col("key").gt(lit(1)).to_string());
        assert_eq!("sum(value)", sum(col("value")).to_string());
        assert_eq!("count(*)", count_star().to_string());
        assert_eq!(
            "((a.x + 2) = 'b')",
            (col("a.x") + lit(2)).equals(lit("b")).to_string()
        );
        assert_eq!("NOT (k IS NULL)", (!col("k").is_null()).to_string());
        assert_eq!("sum(v) AS total", sum(col("v")).alias("total").to_string());
    }

    #[test]
    fn named_expressions() {
        assert!(col("k").is_named());
        assert!(sum(col("k")).alias("s").is_named());
        assert!(!sum(col("k")).is_named());
        assert!(!lit(1).is_named());

        assert_eq!("k", col("x.k").output_name());
        assert_eq!("(k * 2)", (col("k") * lit(2)).output_name());
    }

    #[test]
    fn finds_nested_aggregates() {
        assert!((sum(col("k")) + lit(1)).contains_aggregate());
        assert!(!(col("k") + lit(1)).contains_aggregate());
    }
}
