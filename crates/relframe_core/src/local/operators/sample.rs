use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use relframe_error::Result;

use super::PhysicalOperator;
use crate::context::SharedRowIter;

/// Random sampling, independently per partition.
///
/// Without replacement each row is kept with probability `fraction`. With
/// replacement each row is emitted a Poisson distributed number of times with
/// mean `fraction`. Partition `i` seeds its rng with `seed + i`, so reruns of a
/// partition produce the same rows.
#[derive(Debug)]
pub struct SampleOperator {
    fraction: f64,
    with_replacement: bool,
    seed: u64,
    input: Arc<dyn PhysicalOperator>,
}

impl SampleOperator {
    pub fn new(
        fraction: f64,
        with_replacement: bool,
        seed: u64,
        input: Arc<dyn PhysicalOperator>,
    ) -> Self {
        SampleOperator {
            fraction,
            with_replacement,
            seed,
            input,
        }
    }
}

impl PhysicalOperator for SampleOperator {
    fn output_partitions(&self) -> usize {
        self.input.output_partitions()
    }

    fn execute(&self, partition: usize) -> Result<SharedRowIter> {
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(partition as u64));
        let fraction = self.fraction;
        let with_replacement = self.with_replacement;

        let rows = self.input.execute(partition)?.flat_map(move |row| {
            let row = match row {
                Ok(row) => row,
                Err(e) => return vec![Err(e)],
            };
            let n = if with_replacement {
                poisson(&mut rng, fraction)
            } else if rng.random::<f64>() < fraction {
                1
            } else {
                0
            };
            std::iter::repeat_n(row, n).map(Ok).collect()
        });
        Ok(Box::new(rows))
    }
}

/// Knuth's method, fine for the small means sampling uses.
fn poisson(rng: &mut impl Rng, mean: f64) -> usize {
    if mean <= 0.0 {
        return 0;
    }
    let limit = (-mean).exp();
    let mut k = 0;
    let mut p = rng.random::<f64>();
    while p > limit {
        k += 1;
        p *= rng.random::<f64>();
    }
    k
}

#[cfg(test)]
mod tests {
    use rand_chacha::ChaCha8Rng;

    use super::super::testutil;
    use super::*;
    use crate::row;
    use crate::values::row::Row;

    fn input() -> Arc<dyn PhysicalOperator> {
        testutil::values(vec![
            (0..500).map(|i| row![i]).collect(),
            (500..1000).map(|i| row![i]).collect(),
        ])
    }

    #[test]
    fn deterministic_per_partition() {
        logutil::init_test();

        let op = SampleOperator::new(0.3, false, 7, input());
        let first = testutil::collect_partition(&op, 1);
        let second = testutil::collect_partition(&op, 1);
        assert_eq!(first, second);

        let other_seed = SampleOperator::new(0.3, false, 8, input());
        assert_ne!(first, testutil::collect_partition(&other_seed, 1));
    }

    #[test]
    fn without_replacement_is_subset() {
        let op = SampleOperator::new(0.5, false, 1, input());
        let rows = testutil::collect_all(&op);

        assert!(rows.len() > 350 && rows.len() < 650, "sampled {}", rows.len());
        let mut keys: Vec<_> = rows.iter().map(|r| r[0].clone()).collect();
        keys.dedup();
        assert_eq!(rows.len(), keys.len());
    }

    #[test]
    fn zero_and_full_fraction() {
        let none = SampleOperator::new(0.0, false, 3, input());
        assert!(testutil::collect_all(&none).is_empty());

        let all = SampleOperator::new(1.0, false, 3, input());
        assert_eq!(1000, testutil::collect_all(&all).len());
    }

    #[test]
    fn with_replacement_repeats_rows() {
        let op = SampleOperator::new(2.0, true, 11, input());
        let rows: Vec<Row> = testutil::collect_all(&op);
        assert!(rows.len() > 1700 && rows.len() < 2300, "sampled {}", rows.len());
    }

    #[test]
    fn poisson_mean() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let n = 10_000;
        let total: usize = (0..n).map(|_| poisson(&mut rng, 1.5)).sum();
        let mean = total as f64 / n as f64;
        assert!((mean - 1.5).abs() < 0.1, "mean {mean}");
    }
}
