//! Analyze logical plans and turn them into physical operators.

use std::sync::Arc;

use relframe_error::{RelError, Result};
use tracing::trace;

use super::binder::ExpressionBinder;
use super::operators::PhysicalOperator;
use super::operators::aggregate::{AggregateOperator, AggregateOutput};
use super::operators::filter::FilterOperator;
use super::operators::generate::{BoundGenerator, GenerateOperator};
use super::operators::join::NestedLoopJoinOperator;
use super::operators::project::ProjectOperator;
use super::operators::sample::SampleOperator;
use super::operators::sort::SortOperator;
use super::operators::union::{UnionOperator, Widening};
use super::operators::values::ValuesOperator;
use crate::expr::Expression;
use crate::expr::aggregate_expr::AggregateFunction;
use crate::expr::sort_expr::SortDirection;
use crate::logical::generator::GeneratorOp;
use crate::logical::logical_aggregate::LogicalAggregate;
use crate::logical::logical_generate::LogicalGenerate;
use crate::logical::logical_join::LogicalJoin;
use crate::logical::logical_sample::LogicalSample;
use crate::logical::logical_union::LogicalUnion;
use crate::logical::logical_values::LogicalValues;
use crate::logical::operator::LogicalPlan;
use crate::values::datatype::DataType;
use crate::values::field::{Field, Schema};
use crate::values::row::{Row, SharedRow};

/// An operator tree along with the schema it produces.
#[derive(Debug, Clone)]
pub struct PhysicalPlan {
    pub schema: Schema,
    pub root: Arc<dyn PhysicalOperator>,
}

#[derive(Debug, Default)]
pub struct PhysicalPlanner;

impl PhysicalPlanner {
    pub fn plan(&self, plan: &LogicalPlan) -> Result<PhysicalPlan> {
        trace!(node = plan.name(), "planning node");

        match plan {
            LogicalPlan::Values(values) => self.plan_values(plan, values),
            LogicalPlan::Project(project) => {
                let input = self.plan(&project.input)?;
                let binder = ExpressionBinder::new(&input.schema, plan);

                let mut exprs = Vec::with_capacity(project.exprs.len());
                let mut fields = Vec::with_capacity(project.exprs.len());
                for expr in &project.exprs {
                    let (bound, field) = binder.bind_field(expr)?;
                    exprs.push(bound.expr);
                    fields.push(field);
                }

                Ok(PhysicalPlan {
                    schema: Schema::new(fields),
                    root: Arc::new(ProjectOperator::new(exprs, input.root)),
                })
            }
            LogicalPlan::Filter(filter) => {
                let input = self.plan(&filter.input)?;
                let predicate =
                    ExpressionBinder::new(&input.schema, plan).bind_predicate(&filter.predicate)?;

                Ok(PhysicalPlan {
                    schema: input.schema,
                    root: Arc::new(FilterOperator::new(predicate, input.root)),
                })
            }
            LogicalPlan::Join(join) => self.plan_join(plan, join),
            LogicalPlan::Order(order) => {
                let input = self.plan(&order.input)?;
                let binder = ExpressionBinder::new(&input.schema, plan);

                let keys = order
                    .exprs
                    .iter()
                    .map(|sort| {
                        let bound = binder.bind(&sort.expr)?;
                        Ok((bound.expr, sort.direction == SortDirection::Descending))
                    })
                    .collect::<Result<Vec<_>>>()?;

                Ok(PhysicalPlan {
                    schema: input.schema,
                    root: Arc::new(SortOperator::new(keys, input.root)),
                })
            }
            LogicalPlan::Aggregate(agg) => self.plan_aggregate(plan, agg),
            LogicalPlan::Subquery(subquery) => {
                let input = self.plan(&subquery.input)?;
                Ok(PhysicalPlan {
                    schema: input.schema.requalify(&subquery.alias),
                    root: input.root,
                })
            }
            LogicalPlan::Union(union) => self.plan_union(plan, union),
            LogicalPlan::Sample(sample) => self.plan_sample(plan, sample),
            LogicalPlan::Generate(generate) => self.plan_generate(plan, generate),
        }
    }

    fn plan_values(&self, plan: &LogicalPlan, values: &LogicalValues) -> Result<PhysicalPlan> {
        let schema = &values.schema;
        let width = schema.num_fields();
        let mut needs_widening = false;
        for row in values.partitions.iter().flatten() {
            if row.num_columns() != width {
                return Err(RelError::analysis(
                    format!("row {row} has {} columns, expected {width}", row.num_columns()),
                    plan,
                ));
            }
            for (value, field) in row.iter().zip(&schema.fields) {
                if value.is_null() && !field.nullable {
                    return Err(RelError::analysis(
                        format!("null in row {row} for non-nullable field {field}"),
                        plan,
                    ));
                }
                if value.datatype().unify(&field.datatype).is_none() {
                    return Err(RelError::analysis(
                        format!("value {value} in row {row} does not match field {field}"),
                        plan,
                    ));
                }
                needs_widening |= value.widen_to(&field.datatype).is_some();
            }
        }

        // Integers given for float fields are stored as floats.
        let partitions = if needs_widening {
            let widened: Vec<Vec<SharedRow>> = values
                .partitions
                .iter()
                .map(|partition| {
                    partition
                        .iter()
                        .map(|row| {
                            Arc::new(Row::new(row.iter().zip(&schema.fields).map(
                                |(value, field)| {
                                    value
                                        .widen_to(&field.datatype)
                                        .unwrap_or_else(|| value.clone())
                                },
                            )))
                        })
                        .collect()
                })
                .collect();
            Arc::new(widened)
        } else {
            values.partitions.clone()
        };

        Ok(PhysicalPlan {
            schema: schema.clone(),
            root: Arc::new(ValuesOperator::new(partitions)),
        })
    }

    fn plan_join(&self, plan: &LogicalPlan, join: &LogicalJoin) -> Result<PhysicalPlan> {
        let left = self.plan(&join.left)?;
        let right = self.plan(&join.right)?;

        let left_width = left.schema.num_fields();
        let right_width = right.schema.num_fields();

        // Condition sees the columns before outer join nullability is applied.
        let merged = left.schema.merge(&right.schema);
        let condition = join
            .condition
            .as_ref()
            .map(|cond| ExpressionBinder::new(&merged, plan).bind_predicate(cond))
            .transpose()?;

        let left_schema = if join.kind.preserves_right() {
            left.schema.into_nullable()
        } else {
            left.schema
        };
        let right_schema = if join.kind.preserves_left() {
            right.schema.into_nullable()
        } else {
            right.schema
        };

        Ok(PhysicalPlan {
            schema: left_schema.merge(&right_schema),
            root: Arc::new(NestedLoopJoinOperator::new(
                join.kind,
                condition,
                left_width,
                right_width,
                left.root,
                right.root,
            )),
        })
    }

    fn plan_aggregate(&self, plan: &LogicalPlan, agg: &LogicalAggregate) -> Result<PhysicalPlan> {
        let input = self.plan(&agg.input)?;
        let binder = ExpressionBinder::new(&input.schema, plan);

        let mut group_exprs = Vec::with_capacity(agg.group_exprs.len());
        let mut group_types = Vec::with_capacity(agg.group_exprs.len());
        for expr in &agg.group_exprs {
            let bound = binder.bind(expr)?;
            group_exprs.push(bound.expr);
            group_types.push((bound.datatype, bound.nullable));
        }

        let mut outputs = Vec::with_capacity(agg.aggregates.len());
        let mut fields = Vec::with_capacity(agg.aggregates.len());
        for expr in &agg.aggregates {
            let name = expr.output_name();
            let inner = unalias(expr);

            match inner {
                Expression::Aggregate { func, input } => {
                    let bound = input.as_ref().map(|input| binder.bind(input)).transpose()?;
                    let input_type = bound
                        .as_ref()
                        .map(|b| b.datatype.clone())
                        .unwrap_or(DataType::Null);
                    let (datatype, nullable) = aggregate_type(*func, &input_type)
                        .ok_or_else(|| binder.error(format!("cannot compute {inner} over {input_type}")))?;

                    outputs.push(AggregateOutput::Aggregate {
                        func: *func,
                        input: bound.map(|b| b.expr),
                        input_type,
                    });
                    fields.push(Field::new(name, datatype, nullable));
                }
                other => {
                    let group_idx = agg
                        .group_exprs
                        .iter()
                        .position(|group| unalias(group) == other)
                        .ok_or_else(|| {
                            if other.contains_aggregate() {
                                binder.error(format!(
                                    "aggregates nested inside '{other}' are not supported"
                                ))
                            } else {
                                binder.error(format!(
                                    "'{other}' is neither grouped on nor an aggregate"
                                ))
                            }
                        })?;

                    let (datatype, nullable) = group_types[group_idx].clone();
                    outputs.push(AggregateOutput::GroupKey(group_idx));
                    fields.push(Field::new(name, datatype, nullable));
                }
            }
        }

        Ok(PhysicalPlan {
            schema: Schema::new(fields),
            root: Arc::new(AggregateOperator::new(group_exprs, outputs, input.root)),
        })
    }

    fn plan_union(&self, plan: &LogicalPlan, union: &LogicalUnion) -> Result<PhysicalPlan> {
        let left = self.plan(&union.left)?;
        let right = self.plan(&union.right)?;

        if left.schema.num_fields() != right.schema.num_fields() {
            return Err(RelError::analysis(
                format!(
                    "union inputs have different numbers of columns: {} and {}",
                    left.schema.num_fields(),
                    right.schema.num_fields()
                ),
                plan,
            ));
        }

        let mut fields = Vec::with_capacity(left.schema.num_fields());
        let mut widen_left = Vec::new();
        let mut widen_right = Vec::new();
        for (idx, (l, r)) in left
            .schema
            .fields
            .iter()
            .zip(&right.schema.fields)
            .enumerate()
        {
            let datatype = l.datatype.unify(&r.datatype).ok_or_else(|| {
                RelError::analysis(
                    format!(
                        "union column {idx} has incompatible types {} and {}",
                        l.datatype, r.datatype
                    ),
                    plan,
                )
            })?;
            if l.datatype != datatype {
                widen_left.push((idx, datatype.clone()));
            }
            if r.datatype != datatype {
                widen_right.push((idx, datatype.clone()));
            }

            let mut field = l.clone();
            field.datatype = datatype;
            field.nullable = l.nullable || r.nullable;
            fields.push(field);
        }

        Ok(PhysicalPlan {
            schema: Schema::new(fields),
            root: Arc::new(UnionOperator::new(
                left.root,
                right.root,
                Widening::new(widen_left),
                Widening::new(widen_right),
            )),
        })
    }

    fn plan_sample(&self, plan: &LogicalPlan, sample: &LogicalSample) -> Result<PhysicalPlan> {
        if !sample.fraction.is_finite() || sample.fraction < 0.0 {
            return Err(RelError::analysis(
                format!("sample fraction must be a non-negative number, got {}", sample.fraction),
                plan,
            ));
        }
        if !sample.with_replacement && sample.fraction > 1.0 {
            return Err(RelError::analysis(
                format!(
                    "sample fraction must be at most 1 without replacement, got {}",
                    sample.fraction
                ),
                plan,
            ));
        }

        let input = self.plan(&sample.input)?;
        Ok(PhysicalPlan {
            schema: input.schema,
            root: Arc::new(SampleOperator::new(
                sample.fraction,
                sample.with_replacement,
                sample.seed,
                input.root,
            )),
        })
    }

    fn plan_generate(&self, plan: &LogicalPlan, generate: &LogicalGenerate) -> Result<PhysicalPlan> {
        let input = self.plan(&generate.input)?;
        let binder = ExpressionBinder::new(&input.schema, plan);

        let (generator, generated) = match &generate.generator {
            GeneratorOp::Explode(expr) => {
                let bound = binder.bind(expr)?;
                let element = match &bound.datatype {
                    DataType::List(inner) => inner.as_ref().clone(),
                    DataType::Null => DataType::Null,
                    other => {
                        return Err(binder.error(format!(
                            "explode requires a list, got {other} for '{expr}'"
                        )));
                    }
                };
                (
                    BoundGenerator::Explode(bound.expr),
                    vec![Field::new("col", element, true)],
                )
            }
            GeneratorOp::User(generator) => {
                let inputs = generator
                    .inputs
                    .iter()
                    .map(|input| binder.bind(input).map(|b| b.expr))
                    .collect::<Result<Vec<_>>>()?;
                (
                    BoundGenerator::User {
                        generator: generator.clone(),
                        inputs,
                    },
                    generator.output.clone(),
                )
            }
        };

        let mut generated = Schema::new(generated);
        if let Some(alias) = &generate.alias {
            generated = generated.requalify(alias);
        }
        if generate.outer {
            generated = generated.into_nullable();
        }

        let width = generated.num_fields();
        let schema = if generate.join {
            input.schema.merge(&generated)
        } else {
            generated
        };

        Ok(PhysicalPlan {
            schema,
            root: Arc::new(GenerateOperator::new(
                generator,
                width,
                generate.join,
                generate.outer,
                input.root,
            )),
        })
    }
}

fn unalias(expr: &Expression) -> &Expression {
    match expr {
        Expression::Alias { expr, .. } => unalias(expr),
        other => other,
    }
}

/// Output type and nullability of an aggregate given its input type.
fn aggregate_type(func: AggregateFunction, input: &DataType) -> Option<(DataType, bool)> {
    match func {
        AggregateFunction::Count => Some((DataType::Int64, false)),
        AggregateFunction::Sum => match input {
            DataType::Int64 | DataType::Null => Some((DataType::Int64, true)),
            DataType::Float64 => Some((DataType::Float64, true)),
            _ => None,
        },
        AggregateFunction::Avg => match input {
            DataType::Int64 | DataType::Float64 | DataType::Null => {
                Some((DataType::Float64, true))
            }
            _ => None,
        },
        AggregateFunction::Min | AggregateFunction::Max | AggregateFunction::First => {
            Some((input.clone(), true))
        }
    }
}
