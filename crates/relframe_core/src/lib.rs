//! Lazily evaluated, partitioned relational collections.
//!
//! A [`RelationalCollection`](collection::RelationalCollection) pairs an
//! execution context with a logical plan. Relational operations build new
//! collections over larger plans without running anything; rows are only
//! produced when partitions of the collection are computed.
//!
//! ```
//! use relframe_core::expr::{col, lit};
//! use relframe_core::local::LocalExecutionContext;
//! use relframe_core::row;
//! use relframe_core::values::datatype::DataType;
//! use relframe_core::values::field::{Field, Schema};
//!
//! let ctx = LocalExecutionContext::new_arc();
//! let c = ctx.values(
//!     Schema::new([
//!         Field::new("key", DataType::Int64, false),
//!         Field::new("value", DataType::Utf8, true),
//!     ]),
//!     vec![vec![row![1, "a"], row![2, "b"]], vec![row![3, "c"]]],
//! );
//!
//! let keys = c.filter(col("key").gt(lit(1))).select([col("key")]);
//! assert_eq!(vec![row![2], row![3]], keys.collect().unwrap());
//! ```

pub mod collection;
pub mod config;
pub mod context;
#[cfg(feature = "unstable-dynamic-rows")]
pub mod dynamic;
pub mod explain;
pub mod export;
pub mod expr;
pub mod local;
pub mod logical;
pub mod partition;
pub mod values;
