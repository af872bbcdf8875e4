use std::cmp::Ordering;
use std::sync::Arc;

use indexmap::IndexMap;
use relframe_error::{Result, execution};

use super::{PhysicalOperator, check_single_partition, gather};
use crate::context::SharedRowIter;
use crate::expr::aggregate_expr::AggregateFunction;
use crate::local::physical_expr::PhysicalExpr;
use crate::values::datatype::DataType;
use crate::values::row::Row;
use crate::values::scalar::ScalarValue;

/// A single output column of an aggregate.
#[derive(Debug, Clone)]
pub enum AggregateOutput {
    /// Value of the group key at this index.
    GroupKey(usize),
    Aggregate {
        func: AggregateFunction,
        /// `None` for `count(*)`.
        input: Option<PhysicalExpr>,
        /// Type of the input, decides how sums accumulate.
        input_type: DataType,
    },
}

#[derive(Debug)]
enum Accumulator {
    Count(i64),
    SumInt(Option<i64>),
    SumFloat(Option<f64>),
    Min(Option<ScalarValue>),
    Max(Option<ScalarValue>),
    Avg { sum: f64, count: i64 },
    First(Option<ScalarValue>),
}

impl Accumulator {
    fn new(func: AggregateFunction, input_type: &DataType) -> Self {
        match func {
            AggregateFunction::Count => Accumulator::Count(0),
            AggregateFunction::Sum if matches!(input_type, DataType::Float64) => {
                Accumulator::SumFloat(None)
            }
            AggregateFunction::Sum => Accumulator::SumInt(None),
            AggregateFunction::Min => Accumulator::Min(None),
            AggregateFunction::Max => Accumulator::Max(None),
            AggregateFunction::Avg => Accumulator::Avg { sum: 0.0, count: 0 },
            AggregateFunction::First => Accumulator::First(None),
        }
    }

    /// Update with a value. `None` means `count(*)` with no input
    /// expression.
    fn update(&mut self, value: Option<ScalarValue>) -> Result<()> {
        let value = match value {
            Some(value) => value,
            None => {
                if let Accumulator::Count(n) = self {
                    *n += 1;
                }
                return Ok(());
            }
        };

        if let Accumulator::First(first) = self {
            if first.is_none() {
                *first = Some(value);
            }
            return Ok(());
        }

        if value.is_null() {
            return Ok(());
        }

        match self {
            Accumulator::Count(n) => *n += 1,
            Accumulator::SumInt(sum) => {
                let v = value
                    .try_as_i64()
                    .ok_or_else(|| execution!("cannot sum {value} as an integer"))?;
                *sum = Some(
                    sum.unwrap_or(0)
                        .checked_add(v)
                        .ok_or_else(|| execution!("integer overflow in sum"))?,
                );
            }
            Accumulator::SumFloat(sum) => {
                let v = value
                    .try_as_f64()
                    .ok_or_else(|| execution!("cannot sum {value}"))?;
                *sum = Some(sum.unwrap_or(0.0) + v);
            }
            Accumulator::Min(min) => {
                if min
                    .as_ref()
                    .is_none_or(|m| value.sort_cmp(m) == Ordering::Less)
                {
                    *min = Some(value);
                }
            }
            Accumulator::Max(max) => {
                if max
                    .as_ref()
                    .is_none_or(|m| value.sort_cmp(m) == Ordering::Greater)
                {
                    *max = Some(value);
                }
            }
            Accumulator::Avg { sum, count } => {
                let v = value
                    .try_as_f64()
                    .ok_or_else(|| execution!("cannot average {value}"))?;
                *sum += v;
                *count += 1;
            }
            Accumulator::First(_) => (),
        }

        Ok(())
    }

    fn finish(self) -> ScalarValue {
        match self {
            Accumulator::Count(n) => ScalarValue::Int64(n),
            Accumulator::SumInt(sum) => sum.into(),
            Accumulator::SumFloat(sum) => sum.into(),
            Accumulator::Min(v) | Accumulator::Max(v) | Accumulator::First(v) => {
                v.unwrap_or(ScalarValue::Null)
            }
            Accumulator::Avg { sum, count } => {
                if count == 0 {
                    ScalarValue::Null
                } else {
                    ScalarValue::Float64(sum / count as f64)
                }
            }
        }
    }
}

/// Hash aggregate over all input partitions.
///
/// Groups are emitted in the order they were first seen. Without group
/// expressions a single row is emitted, even for empty input.
#[derive(Debug)]
pub struct AggregateOperator {
    group_exprs: Vec<PhysicalExpr>,
    outputs: Vec<AggregateOutput>,
    input: Arc<dyn PhysicalOperator>,
}

impl AggregateOperator {
    pub fn new(
        group_exprs: Vec<PhysicalExpr>,
        outputs: Vec<AggregateOutput>,
        input: Arc<dyn PhysicalOperator>,
    ) -> Self {
        AggregateOperator {
            group_exprs,
            outputs,
            input,
        }
    }

    fn new_accumulators(&self) -> Vec<Option<Accumulator>> {
        self.outputs
            .iter()
            .map(|out| match out {
                AggregateOutput::GroupKey(_) => None,
                AggregateOutput::Aggregate {
                    func, input_type, ..
                } => Some(Accumulator::new(*func, input_type)),
            })
            .collect()
    }
}

impl PhysicalOperator for AggregateOperator {
    fn output_partitions(&self) -> usize {
        1
    }

    fn execute(&self, partition: usize) -> Result<SharedRowIter> {
        check_single_partition("aggregate", partition)?;

        let mut groups: IndexMap<Vec<ScalarValue>, Vec<Option<Accumulator>>> = IndexMap::new();
        if self.group_exprs.is_empty() {
            groups.insert(Vec::new(), self.new_accumulators());
        }

        for row in gather(self.input.as_ref())? {
            let key = self
                .group_exprs
                .iter()
                .map(|expr| expr.eval(&row))
                .collect::<Result<Vec<_>>>()?;

            let accumulators = groups
                .entry(key)
                .or_insert_with(|| self.new_accumulators());

            for (out, acc) in self.outputs.iter().zip(accumulators.iter_mut()) {
                if let (AggregateOutput::Aggregate { input, .. }, Some(acc)) = (out, acc) {
                    let value = input.as_ref().map(|expr| expr.eval(&row)).transpose()?;
                    acc.update(value)?;
                }
            }
        }

        let outputs = self.outputs.clone();
        let rows = groups.into_iter().map(move |(key, accumulators)| {
            let values = outputs
                .iter()
                .zip(accumulators)
                .map(|(out, acc)| match (out, acc) {
                    (AggregateOutput::GroupKey(idx), _) => {
                        key.get(*idx).cloned().unwrap_or(ScalarValue::Null)
                    }
                    (_, Some(acc)) => acc.finish(),
                    (_, None) => ScalarValue::Null,
                })
                .collect::<Vec<_>>();
            Ok(Arc::new(Row::from(values)))
        });

        Ok(Box::new(rows))
    }
}
