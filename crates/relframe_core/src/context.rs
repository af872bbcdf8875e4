//! Interfaces to whatever analyzes, compiles, and runs logical plans.

use std::fmt::Debug;
use std::sync::Arc;

use relframe_error::Result;

use crate::config::execution::ExecutionConfig;
use crate::logical::operator::LogicalPlan;
use crate::partition::Partition;
use crate::values::field::Schema;
use crate::values::row::SharedRow;

/// Rows of a single partition as produced by a compiled plan. Rows may share
/// storage with rows handed out earlier.
pub type SharedRowIter = Box<dyn Iterator<Item = Result<SharedRow>> + Send>;

/// The executable form of a logical plan.
pub trait CompiledPlan: Debug + Send + Sync {
    /// Output schema.
    fn schema(&self) -> &Schema;

    /// All partitions this plan produces.
    fn partitions(&self) -> Vec<Partition>;

    /// Start producing rows for a partition.
    ///
    /// Each call starts from scratch. Errors raised while producing rows are
    /// returned through the iterator.
    fn rows_of(&self, partition: &Partition) -> Result<SharedRowIter>;
}

/// Analyzes and compiles logical plans.
///
/// Shared by every collection created from it.
pub trait ExecutionContext: Debug + Send + Sync {
    fn config(&self) -> &ExecutionConfig;

    /// Analyze and compile a plan.
    ///
    /// This is where unresolved columns, type mismatches, and incompatible
    /// union inputs get reported.
    fn compile(&self, plan: &LogicalPlan) -> Result<Arc<dyn CompiledPlan>>;
}
