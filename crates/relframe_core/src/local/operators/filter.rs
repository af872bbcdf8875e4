use std::sync::Arc;

use relframe_error::Result;

use super::PhysicalOperator;
use crate::context::SharedRowIter;
use crate::local::physical_expr::PhysicalExpr;

/// Keeps rows where the predicate is true. Null and false both drop the row.
#[derive(Debug)]
pub struct FilterOperator {
    predicate: Arc<PhysicalExpr>,
    input: Arc<dyn PhysicalOperator>,
}

impl FilterOperator {
    pub fn new(predicate: PhysicalExpr, input: Arc<dyn PhysicalOperator>) -> Self {
        FilterOperator {
            predicate: Arc::new(predicate),
            input,
        }
    }
}

impl PhysicalOperator for FilterOperator {
    fn output_partitions(&self) -> usize {
        self.input.output_partitions()
    }

    fn execute(&self, partition: usize) -> Result<SharedRowIter> {
        let predicate = self.predicate.clone();
        let rows = self
            .input
            .execute(partition)?
            .filter_map(move |row| match row {
                Ok(row) => match predicate.eval_predicate(&row) {
                    Ok(true) => Some(Ok(row)),
                    Ok(false) => None,
                    Err(e) => Some(Err(e)),
                },
                Err(e) => Some(Err(e)),
            });
        Ok(Box::new(rows))
    }
}
