use std::sync::Arc;

use relframe_error::{Result, internal};

use super::PhysicalOperator;
use crate::context::SharedRowIter;
use crate::local::physical_expr::PhysicalExpr;
use crate::logical::generator::UserGenerator;
use crate::values::row::{Row, SharedRow};
use crate::values::scalar::ScalarValue;

#[derive(Debug)]
pub enum BoundGenerator {
    Explode(PhysicalExpr),
    User {
        generator: UserGenerator,
        inputs: Vec<PhysicalExpr>,
    },
}

impl BoundGenerator {
    fn generate(&self, row: &Row) -> Result<Vec<Row>> {
        match self {
            Self::Explode(expr) => match expr.eval(row)? {
                ScalarValue::Null => Ok(Vec::new()),
                ScalarValue::List(vals) => Ok(vals.into_iter().map(|v| Row::new([v])).collect()),
                other => Err(internal!("explode expected a list, got {other}")),
            },
            Self::User { generator, inputs } => {
                let args = inputs
                    .iter()
                    .map(|input| input.eval(row))
                    .collect::<Result<Vec<_>>>()?;
                generator.invoke(&args)
            }
        }
    }
}

/// Applies a generator to every input row.
#[derive(Debug)]
pub struct GenerateOperator {
    generator: Arc<BoundGenerator>,
    /// Number of generated columns.
    width: usize,
    join: bool,
    outer: bool,
    input: Arc<dyn PhysicalOperator>,
}

impl GenerateOperator {
    pub fn new(
        generator: BoundGenerator,
        width: usize,
        join: bool,
        outer: bool,
        input: Arc<dyn PhysicalOperator>,
    ) -> Self {
        GenerateOperator {
            generator: Arc::new(generator),
            width,
            join,
            outer,
            input,
        }
    }
}

impl PhysicalOperator for GenerateOperator {
    fn output_partitions(&self) -> usize {
        self.input.output_partitions()
    }

    fn execute(&self, partition: usize) -> Result<SharedRowIter> {
        let generator = self.generator.clone();
        let width = self.width;
        let join = self.join;
        let outer = self.outer;

        let rows = self.input.execute(partition)?.flat_map(move |row| {
            let row = match row {
                Ok(row) => row,
                Err(e) => return vec![Err(e)],
            };
            let mut generated = match generator.generate(&row) {
                Ok(generated) => generated,
                Err(e) => return vec![Err(e)],
            };
            if generated.is_empty() && outer {
                generated.push(Row::nulls(width));
            }
            generated
                .into_iter()
                .map(|g| -> Result<SharedRow> {
                    if join {
                        Ok(Arc::new(row.concat(&g)))
                    } else {
                        Ok(Arc::new(g))
                    }
                })
                .collect()
        });
        Ok(Box::new(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil;
    use super::*;
    use crate::expr::col;
    use crate::row;
    use crate::values::datatype::DataType;
    use crate::values::field::Field;

    fn input() -> Arc<dyn PhysicalOperator> {
        testutil::values(vec![vec![
            row![1, vec!["a", "b"]],
            row![2, Vec::<&str>::new()],
            row![3, None::<i64>],
        ]])
    }

    #[test]
    fn explode() {
        logutil::init_test();

        let op = GenerateOperator::new(
            BoundGenerator::Explode(PhysicalExpr::Column(1)),
            1,
            false,
            false,
            input(),
        );
        assert_eq!(vec![row!["a"], row!["b"]], testutil::collect_all(&op));
    }

    #[test]
    fn explode_outer_join() {
        let op = GenerateOperator::new(
            BoundGenerator::Explode(PhysicalExpr::Column(1)),
            1,
            true,
            true,
            input(),
        );

        let rows = testutil::collect_all(&op);
        assert_eq!(4, rows.len());
        assert_eq!(row![1, vec!["a", "b"], "a"], rows[0]);
        assert_eq!(row![2, Vec::<&str>::new(), None::<i64>], rows[2]);
        assert_eq!(ScalarValue::Null, rows[3][2]);
    }

    #[test]
    fn user_generator() {
        let generator = UserGenerator::new(
            "repeat",
            vec![col("n")],
            vec![Field::new("i", DataType::Int64, false)],
            |args| {
                let n = args[0].try_as_i64().ok_or("expected an integer")?;
                Ok((0..n).map(|i| row![i]).collect())
            },
        );
        let op = GenerateOperator::new(
            BoundGenerator::User {
                generator,
                inputs: vec![PhysicalExpr::Column(0)],
            },
            1,
            true,
            false,
            testutil::values(vec![vec![row![2], row![0]]]),
        );

        assert_eq!(vec![row![2, 0], row![2, 1]], testutil::collect_all(&op));
    }
}
