use std::sync::Arc;

use relframe_error::Result;

use super::PhysicalOperator;
use crate::context::SharedRowIter;
use crate::local::physical_expr::PhysicalExpr;
use crate::values::row::Row;

#[derive(Debug)]
pub struct ProjectOperator {
    exprs: Arc<[PhysicalExpr]>,
    input: Arc<dyn PhysicalOperator>,
}

impl ProjectOperator {
    pub fn new(exprs: Vec<PhysicalExpr>, input: Arc<dyn PhysicalOperator>) -> Self {
        ProjectOperator {
            exprs: exprs.into(),
            input,
        }
    }
}

impl PhysicalOperator for ProjectOperator {
    fn output_partitions(&self) -> usize {
        self.input.output_partitions()
    }

    fn execute(&self, partition: usize) -> Result<SharedRowIter> {
        let exprs = self.exprs.clone();
        let rows = self.input.execute(partition)?.map(move |row| {
            let row = row?;
            let values = exprs
                .iter()
                .map(|expr| expr.eval(&row))
                .collect::<Result<Vec<_>>>()?;
            Ok(Arc::new(Row::from(values)))
        });
        Ok(Box::new(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil;
    use super::*;
    use crate::expr::arith_expr::ArithOperator;
    use crate::row;
    use crate::values::scalar::ScalarValue;

    #[test]
    fn project_per_partition() {
        logutil::init_test();

        let input = testutil::values(vec![vec![row![1, "a"]], vec![row![2, "b"]]]);
        let op = ProjectOperator::new(
            vec![
                PhysicalExpr::Column(1),
                PhysicalExpr::Arith {
                    op: ArithOperator::Mul,
                    left: Box::new(PhysicalExpr::Column(0)),
                    right: Box::new(PhysicalExpr::Literal(ScalarValue::Int64(10))),
                },
            ],
            input,
        );

        assert_eq!(2, op.output_partitions());
        assert_eq!(vec![row!["a", 10]], testutil::collect_partition(&op, 0));
        assert_eq!(vec![row!["b", 20]], testutil::collect_partition(&op, 1));
    }
}
