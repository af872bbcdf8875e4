use super::operator::LogicalPlan;
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};

/// UNION ALL. Inputs are matched by position, duplicates are kept.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalUnion {
    pub left: Box<LogicalPlan>,
    pub right: Box<LogicalPlan>,
}

impl Explainable for LogicalUnion {
    fn explain_entry(&self, _conf: ExplainConfig) -> ExplainEntry {
        ExplainEntry::new("Union").with_value("all", true)
    }
}
