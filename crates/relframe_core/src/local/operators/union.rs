use std::sync::Arc;

use relframe_error::Result;

use super::PhysicalOperator;
use crate::context::SharedRowIter;
use crate::values::datatype::DataType;
use crate::values::row::{Row, SharedRow};

/// Columns on one side of a union whose integers need widening to the
/// unified float type.
#[derive(Debug, Clone, Default)]
pub struct Widening {
    columns: Arc<[(usize, DataType)]>,
}

impl Widening {
    pub fn new(columns: Vec<(usize, DataType)>) -> Self {
        Widening {
            columns: columns.into(),
        }
    }

    fn apply(&self, iter: SharedRowIter) -> SharedRowIter {
        if self.columns.is_empty() {
            return iter;
        }
        let columns = self.columns.clone();
        Box::new(iter.map(move |row| {
            let row: SharedRow = row?;
            let mut widened: Option<Row> = None;
            for (idx, datatype) in columns.iter() {
                if let Some(v) = row.get(*idx).and_then(|v| v.widen_to(datatype)) {
                    widened.get_or_insert_with(|| Row::clone(&row))[*idx] = v;
                }
            }
            Ok(widened.map(Arc::new).unwrap_or(row))
        }))
    }
}

/// Concatenates the partitions of both inputs, left partitions first.
#[derive(Debug)]
pub struct UnionOperator {
    left: Arc<dyn PhysicalOperator>,
    right: Arc<dyn PhysicalOperator>,
    left_widening: Widening,
    right_widening: Widening,
}

impl UnionOperator {
    pub fn new(
        left: Arc<dyn PhysicalOperator>,
        right: Arc<dyn PhysicalOperator>,
        left_widening: Widening,
        right_widening: Widening,
    ) -> Self {
        UnionOperator {
            left,
            right,
            left_widening,
            right_widening,
        }
    }
}

impl PhysicalOperator for UnionOperator {
    fn output_partitions(&self) -> usize {
        self.left.output_partitions() + self.right.output_partitions()
    }

    fn execute(&self, partition: usize) -> Result<SharedRowIter> {
        let left_partitions = self.left.output_partitions();
        if partition < left_partitions {
            Ok(self.left_widening.apply(self.left.execute(partition)?))
        } else {
            Ok(self
                .right_widening
                .apply(self.right.execute(partition - left_partitions)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil;
    use super::*;
    use crate::row;

    #[test]
    fn concatenates_partitions() {
        logutil::init_test();

        let left = testutil::values(vec![vec![row![1]], vec![row![2]]]);
        let right = testutil::values(vec![vec![row![3]]]);
        let op = UnionOperator::new(left, right, Widening::default(), Widening::default());

        assert_eq!(3, op.output_partitions());
        assert_eq!(vec![row![3]], testutil::collect_partition(&op, 2));
        assert_eq!(vec![row![1], row![2], row![3]], testutil::collect_all(&op));
    }

    #[test]
    fn widens_integers() {
        let left = testutil::values(vec![vec![row![1.5]]]);
        let right = testutil::values(vec![vec![row![2], row![None::<i64>]]]);
        let op = UnionOperator::new(left, right, Widening::default(), Widening::new(vec![(0, DataType::Float64)]));

        assert_eq!(
            vec![row![1.5], row![2.0], row![None::<f64>]],
            testutil::collect_all(&op)
        );
    }
}
