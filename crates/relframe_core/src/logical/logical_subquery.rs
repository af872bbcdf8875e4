use super::operator::LogicalPlan;
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};

/// Qualifies every output column of the input with `alias`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalSubquery {
    pub alias: String,
    pub input: Box<LogicalPlan>,
}

impl Explainable for LogicalSubquery {
    fn explain_entry(&self, _conf: ExplainConfig) -> ExplainEntry {
        ExplainEntry::new("Subquery").with_value("alias", &self.alias)
    }
}
