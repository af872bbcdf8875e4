use std::sync::Arc;

use relframe_error::Result;

use super::{PhysicalOperator, check_single_partition, gather};
use crate::context::SharedRowIter;
use crate::local::physical_expr::PhysicalExpr;
use crate::logical::logical_join::JoinKind;
use crate::values::row::{Row, SharedRow};

/// Nested loop join over all partitions of both inputs.
///
/// Output order follows the left input, with unmatched right rows at the end
/// for right and full joins.
#[derive(Debug)]
pub struct NestedLoopJoinOperator {
    kind: JoinKind,
    /// Evaluated against the concatenated row. `None` matches everything.
    condition: Option<PhysicalExpr>,
    left_width: usize,
    right_width: usize,
    left: Arc<dyn PhysicalOperator>,
    right: Arc<dyn PhysicalOperator>,
}

impl NestedLoopJoinOperator {
    pub fn new(
        kind: JoinKind,
        condition: Option<PhysicalExpr>,
        left_width: usize,
        right_width: usize,
        left: Arc<dyn PhysicalOperator>,
        right: Arc<dyn PhysicalOperator>,
    ) -> Self {
        NestedLoopJoinOperator {
            kind,
            condition,
            left_width,
            right_width,
            left,
            right,
        }
    }

    fn matches(&self, row: &Row) -> Result<bool> {
        match &self.condition {
            Some(condition) => condition.eval_predicate(row),
            None => Ok(true),
        }
    }
}

impl PhysicalOperator for NestedLoopJoinOperator {
    fn output_partitions(&self) -> usize {
        1
    }

    fn execute(&self, partition: usize) -> Result<SharedRowIter> {
        check_single_partition("join", partition)?;

        let left = gather(self.left.as_ref())?;
        let right = gather(self.right.as_ref())?;

        let mut right_matched = vec![false; right.len()];
        let mut output: Vec<SharedRow> = Vec::new();

        for left_row in &left {
            let mut matched = false;
            for (right_row, right_matched) in right.iter().zip(right_matched.iter_mut()) {
                let joined = left_row.concat(right_row);
                if self.matches(&joined)? {
                    matched = true;
                    *right_matched = true;
                    output.push(Arc::new(joined));
                }
            }
            if !matched && self.kind.preserves_left() {
                output.push(Arc::new(left_row.concat(&Row::nulls(self.right_width))));
            }
        }

        if self.kind.preserves_right() {
            let nulls = Row::nulls(self.left_width);
            for (right_row, matched) in right.iter().zip(right_matched) {
                if !matched {
                    output.push(Arc::new(nulls.concat(right_row)));
                }
            }
        }

        Ok(Box::new(output.into_iter().map(Ok)))
    }
}
