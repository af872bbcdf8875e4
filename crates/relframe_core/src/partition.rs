//! Partitioned iteration.

use std::fmt;
use std::sync::Arc;

use relframe_error::Result;

use crate::context::CompiledPlan;
use crate::values::row::Row;

/// A disjoint shard of a collection's rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Partition {
    pub index: usize,
}

impl Partition {
    pub const fn new(index: usize) -> Self {
        Partition { index }
    }

    /// Partitions `0..n`.
    pub fn range(n: usize) -> Vec<Partition> {
        (0..n).map(Partition::new).collect()
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "partition-{}", self.index)
    }
}

/// Context for computing a single partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskContext {
    pub partition: Partition,
    /// Incremented each time the partition gets recomputed.
    pub attempt: u32,
}

impl TaskContext {
    pub const fn new(partition: Partition) -> Self {
        TaskContext {
            partition,
            attempt: 0,
        }
    }

    pub const fn retry(&self) -> Self {
        TaskContext {
            partition: self.partition,
            attempt: self.attempt + 1,
        }
    }
}

/// Owned rows for a partition.
pub type RowIter = Box<dyn Iterator<Item = Result<Row>> + Send>;

/// Partition `i` depends only on partition `i` of the parent. No shuffle
/// happens across this boundary.
#[derive(Debug, Clone)]
pub struct OneToOneDependency {
    parent: Arc<dyn CompiledPlan>,
}

impl OneToOneDependency {
    pub fn new(parent: Arc<dyn CompiledPlan>) -> Self {
        OneToOneDependency { parent }
    }

    pub fn parent(&self) -> &Arc<dyn CompiledPlan> {
        &self.parent
    }

    /// Parent partitions that `partition` reads from.
    pub fn parents(&self, partition: &Partition) -> Vec<Partition> {
        vec![*partition]
    }
}

/// What a scheduler needs to run a collection partition by partition.
pub trait PartitionedCollection {
    fn partitions(&self) -> Result<Vec<Partition>>;

    fn dependencies(&self) -> Result<Vec<OneToOneDependency>>;

    /// Lazily produce the rows for a partition.
    ///
    /// Rows are independent copies. Restarting a partition means calling this
    /// again.
    fn compute(&self, partition: &Partition, task: &TaskContext) -> Result<RowIter>;
}
