//! Logical plan nodes.
//!
//! Each node owns its inputs. Building a new plan on top of an existing one
//! clones the input into the new node, plans are never mutated in place.

pub mod generator;
pub mod logical_aggregate;
pub mod logical_filter;
pub mod logical_generate;
pub mod logical_join;
pub mod logical_order;
pub mod logical_project;
pub mod logical_sample;
pub mod logical_subquery;
pub mod logical_union;
pub mod logical_values;
pub mod operator;
