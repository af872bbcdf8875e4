use super::operator::LogicalPlan;
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};

#[derive(Debug, Clone, PartialEq)]
pub struct LogicalSample {
    /// Expected fraction of rows to keep. When sampling with replacement this
    /// is the expected number of times each row is emitted.
    pub fraction: f64,
    pub with_replacement: bool,
    pub seed: u64,
    pub input: Box<LogicalPlan>,
}

impl Explainable for LogicalSample {
    fn explain_entry(&self, conf: ExplainConfig) -> ExplainEntry {
        ExplainEntry::new("Sample")
            .with_value("fraction", self.fraction)
            .with_value("with_replacement", self.with_replacement)
            .with_verbose_value(conf, "seed", self.seed)
    }
}
