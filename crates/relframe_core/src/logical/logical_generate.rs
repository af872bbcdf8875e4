use super::generator::GeneratorOp;
use super::operator::LogicalPlan;
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};

/// Apply a generator to every input row, producing zero or more rows each.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalGenerate {
    pub generator: GeneratorOp,
    /// Concatenate each generated row onto the input row that produced it.
    pub join: bool,
    /// Emit a single null-padded row for inputs that generate nothing.
    pub outer: bool,
    /// Qualifier for the generated columns.
    pub alias: Option<String>,
    pub input: Box<LogicalPlan>,
}

impl Explainable for LogicalGenerate {
    fn explain_entry(&self, _conf: ExplainConfig) -> ExplainEntry {
        let ent = ExplainEntry::new("Generate")
            .with_value("generator", &self.generator)
            .with_value("join", self.join)
            .with_value("outer", self.outer);
        match &self.alias {
            Some(alias) => ent.with_value("alias", alias),
            None => ent,
        }
    }
}
