use std::sync::Arc;

use relframe_core::collection::{GenerateOptions, RelationalCollection, SampleOptions};
use relframe_core::config::execution::ExecutionConfig;
use relframe_core::export::JsonRowSerializer;
use relframe_core::expr::aggregate_expr::{avg, count_star, max, sum};
use relframe_core::expr::{col, lit};
use relframe_core::local::LocalExecutionContext;
use relframe_core::logical::generator::{GeneratorOp, UserGenerator};
use relframe_core::logical::logical_join::JoinKind;
use relframe_core::partition::{Partition, PartitionedCollection, TaskContext};
use relframe_core::row;
use relframe_core::values::datatype::DataType;
use relframe_core::values::field::{Field, Schema};
use relframe_core::values::row::Row;
use relframe_core::values::scalar::ScalarValue;

fn context() -> Arc<LocalExecutionContext> {
    Arc::new(LocalExecutionContext::new(ExecutionConfig {
        target_partitions: 2,
        enable_parallel_collect: true,
    }))
}

fn key_values(ctx: &Arc<LocalExecutionContext>) -> RelationalCollection {
    ctx.values(
        Schema::new([
            Field::new("key", DataType::Int64, false),
            Field::new("value", DataType::Utf8, true),
        ]),
        vec![vec![row![1, "a"], row![2, "b"]], vec![row![3, "c"]]],
    )
}

#[test]
fn filter_then_select() {
    logutil::init_test();

    let c = key_values(&context());
    let keys = c.filter(col("key").gt(lit(1))).select([col("key")]);

    assert_eq!(vec![row![2], row![3]], keys.collect().unwrap());
    assert_eq!(
        Schema::new([Field::new("key", DataType::Int64, false)]),
        keys.schema().unwrap()
    );
}

#[test]
fn union_all_doubles_count() {
    let c = key_values(&context());
    let n = c.count().unwrap();

    let unioned = c.union_all(&c);
    assert_eq!(2 * n, unioned.count().unwrap());
    assert_eq!(4, unioned.partitions().unwrap().len());
}

#[test]
fn union_rejects_mismatched_inputs() {
    let c = key_values(&context());
    let unioned = c.union_all(&c.select([col("key")]));

    let err = unioned.collect().unwrap_err();
    assert!(err.is_analysis());

    let unioned = c.union_all(&c.select([col("value"), col("key")]));
    assert!(unioned.count().unwrap_err().is_analysis());
}

#[test]
fn partitions_match_compiled_plan() {
    let c = key_values(&context()).filter(col("key").gt(lit(0)));

    let compiled = c.compiled().unwrap();
    assert_eq!(compiled.partitions(), c.partitions().unwrap());

    let deps = c.dependencies().unwrap();
    assert_eq!(1, deps.len());
    for p in c.partitions().unwrap() {
        assert_eq!(vec![p], deps[0].parents(&p));
    }
    assert!(Arc::ptr_eq(&compiled, deps[0].parent()));
}

#[test]
fn compute_is_restartable() {
    let c = key_values(&context());
    let p = Partition::new(0);
    let task = TaskContext::new(p);

    let first: Vec<Row> = c.compute(&p, &task).unwrap().map(|r| r.unwrap()).collect();
    let retried: Vec<Row> = c
        .compute(&p, &task.retry())
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(first, retried);
    assert_eq!(vec![row![1, "a"], row![2, "b"]], first);

    assert!(c.compute(&Partition::new(5), &TaskContext::new(Partition::new(5))).is_err());
}

#[test]
fn rows_are_isolated() {
    let c = key_values(&context());
    let p = Partition::new(0);

    let mut rows: Vec<Row> = c
        .to_collection()
        .compute(&p, &TaskContext::new(p))
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    rows[0][1] = ScalarValue::from("changed");

    let again = c.collect_partition(&p).unwrap();
    assert_eq!(row![1, "a"], again[0]);
}

#[test]
fn analysis_errors_are_deferred() {
    let c = key_values(&context());
    let bad = c.select([col("nope")]);

    assert!(bad.schema().unwrap_err().is_analysis());
    assert!(bad.partitions().unwrap_err().is_analysis());
    // The input is untouched.
    assert_eq!(3, c.count().unwrap());
}

#[test]
fn execution_errors_surface_while_iterating() {
    let c = key_values(&context()).select([(col("key") / (col("key") - lit(2))).alias("q")]);

    // Compiles fine, fails when the row with key 2 is pulled.
    assert!(c.schema().is_ok());
    let err = c.collect().unwrap_err();
    assert!(!err.is_analysis());
}

#[test]
fn self_join_with_aliases() {
    let c = key_values(&context());
    let joined = c.alias("l").join(
        &c.alias("r"),
        JoinKind::Inner,
        Some(col("l.key").equals(col("r.key") + lit(1))),
    );

    let rows = joined.select([col("l.value"), col("r.value")]).collect().unwrap();
    assert_eq!(vec![row!["b", "a"], row!["c", "b"]], rows);

    // Unqualified names are ambiguous once both sides carry them.
    let err = joined.select([col("key")]).collect().unwrap_err();
    assert!(err.is_analysis());
}

#[test]
fn outer_joins_pad_with_nulls() {
    let ctx = context();
    let c = key_values(&ctx);
    let other = ctx.values(
        Schema::new([
            Field::new("id", DataType::Int64, false),
            Field::new("score", DataType::Float64, false),
        ]),
        vec![vec![row![3, 0.5], row![4, 1.5]]],
    );

    let full = c
        .join(&other, JoinKind::FullOuter, Some(col("key").equals(col("id"))))
        .order_by([col("key").asc(), col("id").asc()]);

    let schema = full.schema().unwrap();
    assert!(schema.fields.iter().all(|f| f.nullable));

    assert_eq!(
        vec![
            row![None::<i64>, None::<&str>, 4, 1.5],
            row![1, "a", None::<i64>, None::<f64>],
            row![2, "b", None::<i64>, None::<f64>],
            row![3, "c", 3, 0.5],
        ],
        full.collect().unwrap()
    );

    let cross = c.cross_join(&other);
    assert_eq!(6, cross.count().unwrap());
}

#[test]
fn group_by_names_and_values() {
    let ctx = context();
    let c = ctx.values_from_rows(
        Schema::new([
            Field::new("team", DataType::Utf8, false),
            Field::new("points", DataType::Int64, true),
        ]),
        vec![
            row!["red", 3],
            row!["blue", 1],
            row!["red", 5],
            row!["blue", None::<i64>],
        ],
    );

    let grouped = c.group_by(
        [col("team")],
        [
            col("team"),
            sum(col("points")),
            max(col("points")).alias("best"),
            count_star(),
            avg(col("points")),
        ],
    );

    assert_eq!(
        vec!["team", "sum(points)", "best", "count(*)", "avg(points)"],
        grouped.schema().unwrap().field_names()
    );
    assert_eq!(
        vec![row!["red", 8, 5, 2, 4.0], row!["blue", 1, 1, 2, 1.0]],
        grouped.collect().unwrap()
    );
}

#[test]
fn float_columns_hold_floats() {
    let c = context().values(
        Schema::new([Field::new("x", DataType::Float64, false)]),
        vec![vec![row![1], row![1.0]], vec![row![2.5]]],
    );

    assert_eq!(2, c.filter(col("x").equals(lit(1.0))).count().unwrap());

    let grouped = c
        .group_by([col("x")], [col("x"), count_star()])
        .order_by([col("x").asc()]);
    assert_eq!(vec![row![1.0, 2], row![2.5, 1]], grouped.collect().unwrap());

    let exported = c.export(Arc::new(JsonRowSerializer)).unwrap();
    let rows: Vec<String> = exported
        .partition(0)
        .unwrap()
        .map(|r| String::from_utf8(r.unwrap()).unwrap())
        .collect();
    assert_eq!(vec![r#"[{"x":1.0}]"#, r#"[{"x":1.0}]"#], rows);
}

#[test]
fn null_in_non_nullable_field() {
    let ctx = context();
    let strict = ctx.values(
        Schema::new([Field::new("x", DataType::Int64, false)]),
        vec![vec![row![1], row![None::<i64>]]],
    );
    let err = strict.collect().unwrap_err();
    assert!(err.is_analysis());
    assert!(err.to_string().contains("non-nullable field x: Int64"));

    let lenient = ctx.values(
        Schema::new([Field::new("x", DataType::Int64, true)]),
        vec![vec![row![1], row![None::<i64>]]],
    );
    assert_eq!(2, lenient.count().unwrap());
}

#[test]
fn order_by_is_global() {
    let c = key_values(&context()).order_by([col("key").desc()]);
    assert_eq!(1, c.partitions().unwrap().len());
    assert_eq!(
        vec![row![3, "c"], row![2, "b"], row![1, "a"]],
        c.collect().unwrap()
    );
}

#[test]
fn outer_generate_keeps_every_input() {
    let ctx = context();
    let c = ctx.values(
        Schema::new([
            Field::new("key", DataType::Int64, false),
            Field::new("tags", DataType::List(Box::new(DataType::Utf8)), true),
        ]),
        vec![vec![
            row![1, vec!["x", "y"]],
            row![2, Vec::<&str>::new()],
            row![3, None::<i64>],
        ]],
    );

    let generated = c.generate(
        GeneratorOp::Explode(col("tags")),
        GenerateOptions {
            join: true,
            outer: true,
            alias: Some("t".to_string()),
        },
    );

    let rows = generated.select([col("key"), col("t.col")]).collect().unwrap();
    assert_eq!(
        vec![
            row![1, "x"],
            row![1, "y"],
            row![2, None::<&str>],
            row![3, None::<&str>],
        ],
        rows
    );

    // Without outer, inputs that generate nothing disappear.
    let inner = c.generate(
        GeneratorOp::Explode(col("tags")),
        GenerateOptions::default(),
    );
    assert_eq!(vec![row!["x"], row!["y"]], inner.collect().unwrap());
    assert_eq!(vec!["col"], inner.schema().unwrap().field_names());
}

#[test]
fn outer_generate_without_join() {
    let ctx = context();
    let c = ctx.values(
        Schema::new([
            Field::new("key", DataType::Int64, false),
            Field::new("tags", DataType::List(Box::new(DataType::Utf8)), true),
        ]),
        vec![
            vec![row![1, vec!["x", "y"]], row![2, Vec::<&str>::new()]],
            vec![row![3, None::<i64>]],
        ],
    );

    let generated = c.generate(
        GeneratorOp::Explode(col("tags")),
        GenerateOptions {
            join: false,
            outer: true,
            alias: None,
        },
    );

    let schema = generated.schema().unwrap();
    assert_eq!(vec!["col"], schema.field_names());
    assert!(schema.fields[0].nullable);

    // One all-null row for each input that generated nothing.
    assert_eq!(
        vec![row!["x"], row!["y"], row![None::<&str>]],
        generated.collect_partition(&Partition::new(0)).unwrap()
    );
    assert_eq!(
        vec![row![None::<&str>]],
        generated.collect_partition(&Partition::new(1)).unwrap()
    );
}

#[test]
fn user_generator_errors_propagate() {
    let c = key_values(&context());
    let generator = UserGenerator::new(
        "split",
        vec![col("value")],
        vec![Field::new("ch", DataType::Utf8, false)],
        |args| match args[0].try_as_str() {
            Some("c") => Err("refusing to split 'c'".into()),
            Some(s) => Ok(s.chars().map(|ch| row![ch.to_string()]).collect()),
            None => Ok(Vec::new()),
        },
    );

    let generated = c.generate(GeneratorOp::User(generator), GenerateOptions::default());
    assert_eq!(
        vec![row!["a"], row!["b"]],
        generated.collect_partition(&Partition::new(0)).unwrap()
    );

    let err = generated.collect().unwrap_err();
    assert!(err.to_string().contains("refusing to split 'c'"));
}

#[test]
fn seeded_sampling_is_reproducible() {
    let ctx = context();
    let c = ctx.values_from_rows(
        Schema::new([Field::new("k", DataType::Int64, false)]),
        (0..200).map(|i| row![i]),
    );
    let opts = SampleOptions {
        with_replacement: false,
        seed: Some(1234),
    };

    let first = c.sample(0.25, opts).collect().unwrap();
    let second = c.sample(0.25, opts).collect().unwrap();
    assert_eq!(first, second);
    assert!(first.len() < 200);

    let err = c.sample(1.5, opts).collect().unwrap_err();
    assert!(err.is_analysis());
    assert!(c.sample(f64::NAN, SampleOptions::default()).count().is_err());
}

#[test]
fn filter_column_with_host_predicate() {
    let c = key_values(&context());
    let odd = c.filter_column("key", "is_odd", |v| {
        v.try_as_i64()
            .map(|k| k % 2 == 1)
            .ok_or_else(|| "expected an integer".into())
    });
    assert_eq!(vec![row![1, "a"], row![3, "c"]], odd.collect().unwrap());

    let failing = c.filter_column("value", "is_odd", |v| {
        v.try_as_i64()
            .map(|k| k % 2 == 1)
            .ok_or_else(|| "expected an integer".into())
    });
    let err = failing.collect().unwrap_err();
    assert_eq!(
        "user function 'is_odd' failed: expected an integer",
        err.to_string()
    );
}

#[cfg(feature = "unstable-dynamic-rows")]
#[test]
fn dynamic_row_filter() {
    let c = key_values(&context());
    let filtered = c.filter_dynamic(|row| Ok(row.get("value") != Some("b")));
    assert_eq!(2, filtered.count().unwrap());
}

#[test]
fn explain_shows_nested_plan() {
    let c = key_values(&context());
    let out = c
        .alias("x")
        .sample(
            0.5,
            SampleOptions {
                with_replacement: false,
                seed: Some(9),
            },
        )
        .explain(true);

    let lines: Vec<_> = out.lines().collect();
    assert_eq!(
        vec![
            "Sample (fraction = 0.5, seed = 9, with_replacement = false)",
            "  Subquery (alias = x)",
            "    Values (partitions = 2, rows = 3, schema = [key: Int64, value: Utf8])",
        ],
        lines
    );
}
