//! In-process execution of logical plans.
//!
//! Partitions are computed on the calling thread, rows are pulled through a
//! tree of operators one at a time.

pub mod binder;
pub mod operators;
pub mod physical_expr;
pub mod planner;

use std::sync::Arc;

use relframe_error::{Result, internal};
use tracing::debug;

use crate::collection::RelationalCollection;
use crate::config::execution::ExecutionConfig;
use crate::context::{CompiledPlan, ExecutionContext, SharedRowIter};
use crate::logical::logical_values::LogicalValues;
use crate::logical::operator::LogicalPlan;
use crate::partition::Partition;
use crate::values::field::Schema;
use crate::values::row::Row;
use operators::PhysicalOperator;
use planner::PhysicalPlanner;

#[derive(Debug, Clone, Default)]
pub struct LocalExecutionContext {
    config: ExecutionConfig,
}

impl LocalExecutionContext {
    pub fn new(config: ExecutionConfig) -> Self {
        LocalExecutionContext { config }
    }

    pub fn new_arc() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Create a collection over rows that are already partitioned.
    ///
    /// Rows are checked against `schema` once the collection is compiled.
    pub fn values(self: &Arc<Self>, schema: Schema, partitions: Vec<Vec<Row>>) -> RelationalCollection {
        let partitions = partitions
            .into_iter()
            .map(|p| p.into_iter().map(Arc::new).collect())
            .collect();

        RelationalCollection::new(
            self.clone(),
            LogicalPlan::Values(LogicalValues {
                schema,
                partitions: Arc::new(partitions),
            }),
        )
    }

    /// Create a collection over rows, split evenly into `target_partitions`
    /// partitions while keeping their order.
    pub fn values_from_rows(
        self: &Arc<Self>,
        schema: Schema,
        rows: impl IntoIterator<Item = Row>,
    ) -> RelationalCollection {
        let rows: Vec<Row> = rows.into_iter().collect();
        let num_partitions = self.config.target_partitions.max(1);

        let mut rows = rows.into_iter();
        let total = rows.len();
        let partitions = (0..num_partitions)
            .map(|idx| {
                let start = idx * total / num_partitions;
                let end = (idx + 1) * total / num_partitions;
                rows.by_ref().take(end - start).collect()
            })
            .collect();

        self.values(schema, partitions)
    }
}

impl ExecutionContext for LocalExecutionContext {
    fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    fn compile(&self, plan: &LogicalPlan) -> Result<Arc<dyn CompiledPlan>> {
        let physical = PhysicalPlanner.plan(plan)?;
        debug!(
            schema = %physical.schema,
            partitions = physical.root.output_partitions(),
            "compiled plan"
        );

        Ok(Arc::new(LocalCompiledPlan {
            schema: physical.schema,
            root: physical.root,
        }))
    }
}

#[derive(Debug)]
pub struct LocalCompiledPlan {
    schema: Schema,
    root: Arc<dyn PhysicalOperator>,
}

impl CompiledPlan for LocalCompiledPlan {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn partitions(&self) -> Vec<Partition> {
        Partition::range(self.root.output_partitions())
    }

    fn rows_of(&self, partition: &Partition) -> Result<SharedRowIter> {
        let num_partitions = self.root.output_partitions();
        if partition.index >= num_partitions {
            return Err(internal!(
                "{partition} requested from a plan with {num_partitions} partitions"
            ));
        }
        self.root.execute(partition.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;
    use crate::values::datatype::DataType;
    use crate::values::field::Field;

    fn schema() -> Schema {
        Schema::new([Field::new("k", DataType::Int64, false)])
    }

    #[test]
    fn splits_rows_evenly() {
        logutil::init_test();

        let ctx = Arc::new(LocalExecutionContext::new(ExecutionConfig {
            target_partitions: 3,
            enable_parallel_collect: false,
        }));
        let c = ctx.values_from_rows(schema(), (0..7).map(|i| row![i]));

        let LogicalPlan::Values(values) = c.plan() else {
            panic!("expected values");
        };
        let sizes: Vec<_> = values.partitions.iter().map(|p| p.len()).collect();
        assert_eq!(vec![2, 2, 3], sizes);
        assert_eq!((0..7).map(|i| row![i]).collect::<Vec<_>>(), c.collect().unwrap());
    }

    #[test]
    fn empty_input_keeps_partitions() {
        let ctx = Arc::new(LocalExecutionContext::new(ExecutionConfig {
            target_partitions: 2,
            enable_parallel_collect: true,
        }));
        let c = ctx.values_from_rows(schema(), Vec::new());

        let compiled = ctx.compile(c.plan()).unwrap();
        assert_eq!(Partition::range(2), compiled.partitions());
        assert!(compiled.rows_of(&Partition::new(2)).is_err());
        assert_eq!(0, c.count().unwrap());
    }
}
