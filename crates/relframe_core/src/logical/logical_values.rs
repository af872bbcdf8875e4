use std::sync::Arc;

use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::values::field::Schema;
use crate::values::row::SharedRow;

/// In-memory rows, already split into partitions.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalValues {
    pub schema: Schema,
    pub partitions: Arc<Vec<Vec<SharedRow>>>,
}

impl Explainable for LogicalValues {
    fn explain_entry(&self, conf: ExplainConfig) -> ExplainEntry {
        ExplainEntry::new("Values")
            .with_value("schema", &self.schema)
            .with_value("partitions", self.partitions.len())
            .with_verbose_value(
                conf,
                "rows",
                self.partitions.iter().map(|p| p.len()).sum::<usize>(),
            )
    }
}
