use std::sync::Arc;

use relframe_error::Result;

use super::{PhysicalOperator, check_single_partition, gather};
use crate::context::SharedRowIter;
use crate::local::physical_expr::{PhysicalExpr, compare_keys};

/// A stable sort over all input partitions.
#[derive(Debug)]
pub struct SortOperator {
    keys: Vec<PhysicalExpr>,
    descending: Vec<bool>,
    input: Arc<dyn PhysicalOperator>,
}

impl SortOperator {
    pub fn new(keys: Vec<(PhysicalExpr, bool)>, input: Arc<dyn PhysicalOperator>) -> Self {
        let (keys, descending) = keys.into_iter().unzip();
        SortOperator {
            keys,
            descending,
            input,
        }
    }
}

impl PhysicalOperator for SortOperator {
    fn output_partitions(&self) -> usize {
        1
    }

    fn execute(&self, partition: usize) -> Result<SharedRowIter> {
        check_single_partition("sort", partition)?;

        let mut keyed = gather(self.input.as_ref())?
            .into_iter()
            .map(|row| {
                let keys = self
                    .keys
                    .iter()
                    .map(|key| key.eval(&row))
                    .collect::<Result<Vec<_>>>()?;
                Ok((keys, row))
            })
            .collect::<Result<Vec<_>>>()?;

        keyed.sort_by(|(a, _), (b, _)| compare_keys(a, b, &self.descending));

        Ok(Box::new(keyed.into_iter().map(|(_, row)| Ok(row))))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil;
    use super::*;
    use crate::row;

    #[test]
    fn sorts_across_partitions() {
        logutil::init_test();

        let input = testutil::values(vec![
            vec![row![3, "a"], row![1, "b"]],
            vec![row![None::<i64>, "c"], row![1, "d"]],
        ]);
        let op = SortOperator::new(vec![(PhysicalExpr::Column(0), false)], input);

        assert_eq!(1, op.output_partitions());
        assert_eq!(
            vec![
                row![None::<i64>, "c"],
                row![1, "b"],
                row![1, "d"],
                row![3, "a"],
            ],
            testutil::collect_partition(&op, 0)
        );
        assert!(op.execute(1).is_err());
    }

    #[test]
    fn descending_then_ascending() {
        let input = testutil::values(vec![vec![row![1, "b"], row![2, "a"], row![1, "a"]]]);
        let op = SortOperator::new(
            vec![(PhysicalExpr::Column(0), true), (PhysicalExpr::Column(1), false)],
            input,
        );

        assert_eq!(
            vec![row![2, "a"], row![1, "a"], row![1, "b"]],
            testutil::collect_all(&op)
        );
    }
}
