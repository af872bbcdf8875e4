use std::fmt;

use super::Expression;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Count,
    Sum,
    Min,
    Max,
    Avg,
    First,
}

impl AggregateFunction {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Sum => "sum",
            Self::Min => "min",
            Self::Max => "max",
            Self::Avg => "avg",
            Self::First => "first",
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn aggregate(func: AggregateFunction, input: Expression) -> Expression {
    Expression::Aggregate {
        func,
        input: Some(Box::new(input)),
    }
}

/// Count non-null values of `input`.
pub fn count(input: Expression) -> Expression {
    aggregate(AggregateFunction::Count, input)
}

/// Count all rows.
pub fn count_star() -> Expression {
    Expression::Aggregate {
        func: AggregateFunction::Count,
        input: None,
    }
}

pub fn sum(input: Expression) -> Expression {
    aggregate(AggregateFunction::Sum, input)
}

pub fn min(input: Expression) -> Expression {
    aggregate(AggregateFunction::Min, input)
}

pub fn max(input: Expression) -> Expression {
    aggregate(AggregateFunction::Max, input)
}

pub fn avg(input: Expression) -> Expression {
    aggregate(AggregateFunction::Avg, input)
}

pub fn first(input: Expression) -> Expression {
    aggregate(AggregateFunction::First, input)
}
