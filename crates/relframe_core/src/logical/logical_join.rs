use std::fmt;

use super::operator::LogicalPlan;
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::expr::Expression;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JoinKind {
    #[default]
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
}

impl JoinKind {
    /// If unmatched rows from the left side are emitted padded with nulls.
    pub const fn preserves_left(&self) -> bool {
        matches!(self, JoinKind::LeftOuter | JoinKind::FullOuter)
    }

    /// If unmatched rows from the right side are emitted padded with nulls.
    pub const fn preserves_right(&self) -> bool {
        matches!(self, JoinKind::RightOuter | JoinKind::FullOuter)
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inner => write!(f, "INNER"),
            Self::LeftOuter => write!(f, "LEFT OUTER"),
            Self::RightOuter => write!(f, "RIGHT OUTER"),
            Self::FullOuter => write!(f, "FULL OUTER"),
        }
    }
}

/// Join two inputs.
///
/// An inner join without a condition is a cartesian product.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalJoin {
    pub left: Box<LogicalPlan>,
    pub right: Box<LogicalPlan>,
    pub kind: JoinKind,
    pub condition: Option<Expression>,
}

impl Explainable for LogicalJoin {
    fn explain_entry(&self, _conf: ExplainConfig) -> ExplainEntry {
        let ent = ExplainEntry::new("Join").with_value("kind", self.kind);
        match &self.condition {
            Some(condition) => ent.with_value("condition", condition),
            None => ent,
        }
    }
}
