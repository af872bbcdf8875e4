use std::fmt;

use serde::{Deserialize, Serialize};

use super::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::logical::operator::LogicalPlan;

/// A fully explained plan tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExplainNode {
    pub entry: ExplainEntry,
    pub children: Vec<ExplainNode>,
}

impl ExplainNode {
    pub fn walk_logical(conf: ExplainConfig, plan: &LogicalPlan) -> Self {
        let children = plan
            .children()
            .into_iter()
            .map(|child| Self::walk_logical(conf, child))
            .collect();

        ExplainNode {
            entry: plan.explain_entry(conf),
            children,
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(f, "{:indent$}{}", "", self.entry, indent = depth * 2)?;
        for child in &self.children {
            child.fmt_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for ExplainNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}
