use std::fmt;

use super::logical_aggregate::LogicalAggregate;
use super::logical_filter::LogicalFilter;
use super::logical_generate::LogicalGenerate;
use super::logical_join::LogicalJoin;
use super::logical_order::LogicalOrder;
use super::logical_project::LogicalProject;
use super::logical_sample::LogicalSample;
use super::logical_subquery::LogicalSubquery;
use super::logical_union::LogicalUnion;
use super::logical_values::LogicalValues;
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::explain::node::ExplainNode;

#[derive(Debug, Clone, PartialEq)]
pub enum LogicalPlan {
    Values(LogicalValues),
    Project(LogicalProject),
    Filter(LogicalFilter),
    Join(LogicalJoin),
    Order(LogicalOrder),
    Aggregate(LogicalAggregate),
    Subquery(LogicalSubquery),
    Union(LogicalUnion),
    Sample(LogicalSample),
    Generate(LogicalGenerate),
}

impl LogicalPlan {
    /// Name of the operator.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Values(_) => "Values",
            Self::Project(_) => "Project",
            Self::Filter(_) => "Filter",
            Self::Join(_) => "Join",
            Self::Order(_) => "Order",
            Self::Aggregate(_) => "Aggregate",
            Self::Subquery(_) => "Subquery",
            Self::Union(_) => "Union",
            Self::Sample(_) => "Sample",
            Self::Generate(_) => "Generate",
        }
    }

    /// Direct inputs, left before right for binary operators.
    pub fn children(&self) -> Vec<&LogicalPlan> {
        match self {
            Self::Values(_) => Vec::new(),
            Self::Project(n) => vec![n.input.as_ref()],
            Self::Filter(n) => vec![n.input.as_ref()],
            Self::Order(n) => vec![n.input.as_ref()],
            Self::Aggregate(n) => vec![n.input.as_ref()],
            Self::Subquery(n) => vec![n.input.as_ref()],
            Self::Sample(n) => vec![n.input.as_ref()],
            Self::Generate(n) => vec![n.input.as_ref()],
            Self::Join(n) => vec![n.left.as_ref(), n.right.as_ref()],
            Self::Union(n) => vec![n.left.as_ref(), n.right.as_ref()],
        }
    }

    /// Explain this plan and all of its inputs.
    pub fn explain(&self, verbose: bool) -> ExplainNode {
        ExplainNode::walk_logical(ExplainConfig { verbose }, self)
    }
}

impl Explainable for LogicalPlan {
    fn explain_entry(&self, conf: ExplainConfig) -> ExplainEntry {
        match self {
            Self::Values(n) => n.explain_entry(conf),
            Self::Project(n) => n.explain_entry(conf),
            Self::Filter(n) => n.explain_entry(conf),
            Self::Join(n) => n.explain_entry(conf),
            Self::Order(n) => n.explain_entry(conf),
            Self::Aggregate(n) => n.explain_entry(conf),
            Self::Subquery(n) => n.explain_entry(conf),
            Self::Union(n) => n.explain_entry(conf),
            Self::Sample(n) => n.explain_entry(conf),
            Self::Generate(n) => n.explain_entry(conf),
        }
    }
}

/// Displays only this node, not its inputs.
impl fmt::Display for LogicalPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.explain_entry(ExplainConfig::default()))
    }
}
