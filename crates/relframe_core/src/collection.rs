//! Lazily evaluated relational collections.

use std::sync::{Arc, OnceLock};

use rayon::prelude::*;
use relframe_error::{Result, internal};
use tracing::{debug, trace, warn};

use crate::context::{CompiledPlan, ExecutionContext};
#[cfg(feature = "unstable-dynamic-rows")]
use crate::dynamic::{DynamicPredicate, DynamicRow};
use crate::expr::Expression;
use crate::expr::column_expr::ColumnRef;
use crate::expr::sort_expr::SortExpr;
use crate::expr::udf::{BoxError, UserFunction};
use crate::logical::generator::GeneratorOp;
use crate::logical::logical_aggregate::LogicalAggregate;
use crate::logical::logical_filter::LogicalFilter;
use crate::logical::logical_generate::LogicalGenerate;
use crate::logical::logical_join::{JoinKind, LogicalJoin};
use crate::logical::logical_order::LogicalOrder;
use crate::logical::logical_project::LogicalProject;
use crate::logical::logical_sample::LogicalSample;
use crate::logical::logical_subquery::LogicalSubquery;
use crate::logical::logical_union::LogicalUnion;
use crate::logical::operator::LogicalPlan;
use crate::partition::{OneToOneDependency, Partition, PartitionedCollection, RowIter, TaskContext};
use crate::values::field::Schema;
use crate::values::row::Row;
use crate::values::scalar::ScalarValue;

/// Options for [`RelationalCollection::sample`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleOptions {
    pub with_replacement: bool,
    /// Seed for the sampler. When `None`, a random seed is drawn when the
    /// collection is built and results will differ between runs.
    pub seed: Option<u64>,
}

impl Default for SampleOptions {
    fn default() -> Self {
        SampleOptions {
            with_replacement: true,
            seed: None,
        }
    }
}

/// Options for [`RelationalCollection::generate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Output the input row followed by each generated row.
    pub join: bool,
    /// Output one row with null generated columns for input rows that
    /// generate nothing.
    pub outer: bool,
    /// Qualifier for generated columns.
    pub alias: Option<String>,
}

/// A distributed, partitioned sequence of rows described by a logical plan.
///
/// Every operation returns a new collection wrapping a new plan node, the
/// receiver is left untouched. Building a collection never fails; problems
/// with the plan are reported once it gets compiled, which happens the first
/// time the collection's partitions, schema, or rows are requested.
///
/// Binary operations use the context of the receiver.
#[derive(Debug, Clone)]
pub struct RelationalCollection {
    context: Arc<dyn ExecutionContext>,
    plan: LogicalPlan,
    /// Compiled form of `plan`, filled on first use.
    compiled: Arc<OnceLock<Arc<dyn CompiledPlan>>>,
}

impl RelationalCollection {
    pub fn new(context: Arc<dyn ExecutionContext>, plan: LogicalPlan) -> Self {
        RelationalCollection {
            context,
            plan,
            compiled: Arc::new(OnceLock::new()),
        }
    }

    pub fn plan(&self) -> &LogicalPlan {
        &self.plan
    }

    pub fn context(&self) -> &Arc<dyn ExecutionContext> {
        &self.context
    }

    fn with_plan(&self, plan: LogicalPlan) -> Self {
        Self::new(self.context.clone(), plan)
    }

    fn boxed_plan(&self) -> Box<LogicalPlan> {
        Box::new(self.plan.clone())
    }

    pub fn select(&self, exprs: impl IntoIterator<Item = Expression>) -> Self {
        self.with_plan(LogicalPlan::Project(LogicalProject {
            exprs: exprs.into_iter().collect(),
            input: self.boxed_plan(),
        }))
    }

    /// Keep rows where `predicate` is true.
    ///
    /// Each call adds exactly one filter node, predicates are never merged.
    pub fn filter(&self, predicate: Expression) -> Self {
        self.with_plan(LogicalPlan::Filter(LogicalFilter {
            predicate,
            input: self.boxed_plan(),
        }))
    }

    /// Keep rows where a host predicate over a single named column holds.
    ///
    /// The column is resolved when the plan is compiled.
    pub fn filter_column<F>(&self, column: &str, name: &str, predicate: F) -> Self
    where
        F: Fn(&ScalarValue) -> Result<bool, BoxError> + Send + Sync + 'static,
    {
        self.filter(Expression::ScalarUdf {
            function: UserFunction::predicate(name, predicate),
            inputs: vec![Expression::Column(ColumnRef::parse(column))],
        })
    }

    /// Keep rows where a predicate over a textual view of the whole row holds.
    ///
    /// Unstable. Field names are only checked when the predicate runs.
    #[cfg(feature = "unstable-dynamic-rows")]
    pub fn filter_dynamic<F>(&self, predicate: F) -> Self
    where
        F: Fn(&DynamicRow<'_>) -> Result<bool, BoxError> + Send + Sync + 'static,
    {
        self.filter(Expression::DynamicRowPredicate(DynamicPredicate::new(
            predicate,
        )))
    }

    pub fn join(
        &self,
        other: &RelationalCollection,
        kind: JoinKind,
        condition: Option<Expression>,
    ) -> Self {
        self.with_plan(LogicalPlan::Join(LogicalJoin {
            left: self.boxed_plan(),
            right: other.boxed_plan(),
            kind,
            condition,
        }))
    }

    /// Inner join with no condition.
    pub fn cross_join(&self, other: &RelationalCollection) -> Self {
        self.join(other, JoinKind::Inner, None)
    }

    pub fn order_by(&self, exprs: impl IntoIterator<Item = SortExpr>) -> Self {
        self.with_plan(LogicalPlan::Order(LogicalOrder {
            exprs: exprs.into_iter().collect(),
            input: self.boxed_plan(),
        }))
    }

    /// Group by `group_exprs` and compute `aggregates` for each group.
    ///
    /// Output columns are exactly `aggregates`. Aggregates that aren't already
    /// named are aliased with their textual form, e.g. `sum(value)`.
    pub fn group_by(
        &self,
        group_exprs: impl IntoIterator<Item = Expression>,
        aggregates: impl IntoIterator<Item = Expression>,
    ) -> Self {
        let aggregates = aggregates
            .into_iter()
            .map(|expr| {
                if expr.is_named() {
                    expr
                } else {
                    let name = expr.to_string();
                    expr.alias(name)
                }
            })
            .collect();

        self.with_plan(LogicalPlan::Aggregate(LogicalAggregate {
            group_exprs: group_exprs.into_iter().collect(),
            aggregates,
            input: self.boxed_plan(),
        }))
    }

    /// Qualify all output columns with `alias`, e.g. to tell apart both sides
    /// of a self join.
    pub fn alias(&self, alias: impl Into<String>) -> Self {
        self.with_plan(LogicalPlan::Subquery(LogicalSubquery {
            alias: alias.into(),
            input: self.boxed_plan(),
        }))
    }

    /// Rows of both collections, duplicates kept. Columns are matched by
    /// position.
    pub fn union_all(&self, other: &RelationalCollection) -> Self {
        self.with_plan(LogicalPlan::Union(LogicalUnion {
            left: self.boxed_plan(),
            right: other.boxed_plan(),
        }))
    }

    /// Sample a fraction of rows.
    ///
    /// Without an explicit seed the result is not reproducible.
    pub fn sample(&self, fraction: f64, opts: SampleOptions) -> Self {
        let seed = match opts.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::random::<u64>();
                warn!(%seed, "sampling without a seed, results will not be reproducible");
                seed
            }
        };

        self.with_plan(LogicalPlan::Sample(LogicalSample {
            fraction,
            with_replacement: opts.with_replacement,
            seed,
            input: self.boxed_plan(),
        }))
    }

    pub fn generate(&self, generator: GeneratorOp, opts: GenerateOptions) -> Self {
        self.with_plan(LogicalPlan::Generate(LogicalGenerate {
            generator,
            join: opts.join,
            outer: opts.outer,
            alias: opts.alias,
            input: self.boxed_plan(),
        }))
    }

    /// View this collection as a plain partitioned collection of rows.
    pub fn to_collection(&self) -> &dyn PartitionedCollection {
        self
    }

    /// Compile the plan, reusing a previous compilation if there is one.
    pub fn compiled(&self) -> Result<Arc<dyn CompiledPlan>> {
        if let Some(compiled) = self.compiled.get() {
            return Ok(compiled.clone());
        }

        debug!(plan = %self.plan, "compiling plan");
        let compiled = self.context.compile(&self.plan)?;
        // Another thread may have won, either result is equivalent.
        let compiled = self.compiled.get_or_init(|| compiled);

        Ok(compiled.clone())
    }

    pub fn schema(&self) -> Result<Schema> {
        Ok(self.compiled()?.schema().clone())
    }

    /// Render the logical plan as an indented tree.
    pub fn explain(&self, verbose: bool) -> String {
        self.plan.explain(verbose).to_string()
    }

    /// Drain a single partition.
    pub fn collect_partition(&self, partition: &Partition) -> Result<Vec<Row>> {
        self.compute(partition, &TaskContext::new(*partition))?
            .collect()
    }

    /// Execute all partitions and return their rows in partition order.
    pub fn collect(&self) -> Result<Vec<Row>> {
        let partitions = self.partitions()?;

        let per_partition: Vec<Vec<Row>> = if self.context.config().enable_parallel_collect {
            partitions
                .par_iter()
                .map(|p| self.collect_partition(p))
                .collect::<Result<_>>()?
        } else {
            partitions
                .iter()
                .map(|p| self.collect_partition(p))
                .collect::<Result<_>>()?
        };

        Ok(per_partition.into_iter().flatten().collect())
    }

    /// Count rows across all partitions.
    pub fn count(&self) -> Result<usize> {
        let count_partition = |p: &Partition| -> Result<usize> {
            let mut count = 0;
            for row in self.compute(p, &TaskContext::new(*p))? {
                row?;
                count += 1;
            }
            Ok(count)
        };

        let partitions = self.partitions()?;
        if self.context.config().enable_parallel_collect {
            partitions.par_iter().map(count_partition).sum()
        } else {
            partitions.iter().map(count_partition).sum()
        }
    }
}

impl PartitionedCollection for RelationalCollection {
    fn partitions(&self) -> Result<Vec<Partition>> {
        Ok(self.compiled()?.partitions())
    }

    fn dependencies(&self) -> Result<Vec<OneToOneDependency>> {
        Ok(vec![OneToOneDependency::new(self.compiled()?)])
    }

    fn compute(&self, partition: &Partition, task: &TaskContext) -> Result<RowIter> {
        let compiled = self.compiled()?;
        let num_partitions = compiled.partitions().len();
        if partition.index >= num_partitions {
            return Err(internal!(
                "{partition} does not exist in a plan with {num_partitions} partitions"
            ));
        }

        trace!(%partition, attempt = task.attempt, "computing partition");

        let rows = compiled.rows_of(partition)?;
        Ok(Box::new(rows.map(|row| row.map(|row| Row::clone(&row)))))
    }
}
