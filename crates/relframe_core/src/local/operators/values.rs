use std::sync::Arc;

use relframe_error::{Result, internal};

use super::PhysicalOperator;
use crate::context::SharedRowIter;
use crate::values::row::SharedRow;

/// Yields in-memory rows. Rows are shared, not copied.
#[derive(Debug)]
pub struct ValuesOperator {
    partitions: Arc<Vec<Vec<SharedRow>>>,
}

impl ValuesOperator {
    pub fn new(partitions: Arc<Vec<Vec<SharedRow>>>) -> Self {
        ValuesOperator { partitions }
    }
}

impl PhysicalOperator for ValuesOperator {
    fn output_partitions(&self) -> usize {
        self.partitions.len()
    }

    fn execute(&self, partition: usize) -> Result<SharedRowIter> {
        if partition >= self.partitions.len() {
            return Err(internal!(
                "values has {} partitions, requested partition {partition}",
                self.partitions.len()
            ));
        }
        let partitions = self.partitions.clone();
        let mut idx = 0;
        Ok(Box::new(std::iter::from_fn(move || {
            let row = partitions[partition].get(idx)?.clone();
            idx += 1;
            Some(Ok(row))
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil;
    use super::*;
    use crate::row;

    #[test]
    fn yields_partitions() {
        logutil::init_test();

        let op = testutil::values(vec![vec![row![1], row![2]], vec![], vec![row![3]]]);
        assert_eq!(3, op.output_partitions());
        assert_eq!(vec![row![1], row![2]], testutil::collect_partition(op.as_ref(), 0));
        assert!(testutil::collect_partition(op.as_ref(), 1).is_empty());
        assert!(op.execute(3).is_err());
    }
}
