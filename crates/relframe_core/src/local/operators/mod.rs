//! Pull based physical operators.
//!
//! Operators either work partition by partition (values, project, filter,
//! sample, generate, union) or gather every input partition and produce a
//! single output partition (sort, aggregate, join).

pub mod aggregate;
pub mod filter;
pub mod generate;
pub mod join;
pub mod project;
pub mod sample;
pub mod sort;
pub mod union;
pub mod values;

use std::fmt::Debug;

use relframe_error::{Result, internal};

use crate::context::SharedRowIter;
use crate::values::row::SharedRow;

pub trait PhysicalOperator: Debug + Sync + Send {
    /// Number of partitions this operator produces.
    fn output_partitions(&self) -> usize;

    /// Begin producing rows for a partition.
    fn execute(&self, partition: usize) -> Result<SharedRowIter>;
}

/// Drain every partition of `input` in order.
pub(crate) fn gather(input: &dyn PhysicalOperator) -> Result<Vec<SharedRow>> {
    let mut rows = Vec::new();
    for partition in 0..input.output_partitions() {
        for row in input.execute(partition)? {
            rows.push(row?);
        }
    }
    Ok(rows)
}

/// Errors if `partition` isn't the only partition of a gathering operator.
pub(crate) fn check_single_partition(operator: &str, partition: usize) -> Result<()> {
    if partition != 0 {
        return Err(internal!(
            "{operator} produces a single partition, requested partition {partition}"
        ));
    }
    Ok(())
}
