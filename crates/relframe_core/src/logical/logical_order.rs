use super::operator::LogicalPlan;
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::expr::sort_expr::SortExpr;

#[derive(Debug, Clone, PartialEq)]
pub struct LogicalOrder {
    pub exprs: Vec<SortExpr>,
    pub input: Box<LogicalPlan>,
}

impl Explainable for LogicalOrder {
    fn explain_entry(&self, _conf: ExplainConfig) -> ExplainEntry {
        ExplainEntry::new("Order").with_values("expressions", &self.exprs)
    }
}
