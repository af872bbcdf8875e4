use super::operator::LogicalPlan;
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::expr::Expression;

#[derive(Debug, Clone, PartialEq)]
pub struct LogicalAggregate {
    /// Expressions to group on.
    pub group_exprs: Vec<Expression>,
    /// Output expressions. Every expression here is named (column reference
    /// or alias).
    pub aggregates: Vec<Expression>,
    pub input: Box<LogicalPlan>,
}

impl Explainable for LogicalAggregate {
    fn explain_entry(&self, _conf: ExplainConfig) -> ExplainEntry {
        let ent = ExplainEntry::new("Aggregate").with_values("aggregates", &self.aggregates);
        if self.group_exprs.is_empty() {
            ent
        } else {
            ent.with_values("group_expressions", &self.group_exprs)
        }
    }
}
