//! Hand rows to a foreign runtime as serialized byte buffers.
//!
//! Field names are exposed once for the whole collection. Each row is then
//! serialized on its own, lazily, as the foreign side pulls it.

use std::fmt::Debug;
use std::sync::Arc;

use relframe_error::Result;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::collection::RelationalCollection;
use crate::partition::{Partition, PartitionedCollection, TaskContext};
use crate::values::row::Row;

/// Encodes a single row for a foreign runtime.
pub trait RowSerializer: Debug + Send + Sync {
    fn serialize_row(&self, names: &[String], row: &Row) -> Result<Vec<u8>>;
}

/// Encodes each row as a json array holding a single object from field name
/// to value, e.g. `[{"key":1,"value":"a"}]`. Fields keep schema order.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRowSerializer;

struct NamedRow<'a> {
    names: &'a [String],
    row: &'a Row,
}

impl Serialize for NamedRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.names.len()))?;
        for (name, value) in self.names.iter().zip(self.row.iter()) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl RowSerializer for JsonRowSerializer {
    fn serialize_row(&self, names: &[String], row: &Row) -> Result<Vec<u8>> {
        let named = [NamedRow { names, row }];
        Ok(serde_json::to_vec(&named)?)
    }
}

pub type ExportIter = Box<dyn Iterator<Item = Result<Vec<u8>>> + Send>;

/// A collection prepared for export.
#[derive(Debug, Clone)]
pub struct ExportedCollection {
    field_names: Arc<[String]>,
    collection: RelationalCollection,
    serializer: Arc<dyn RowSerializer>,
}

impl ExportedCollection {
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    pub fn num_partitions(&self) -> Result<usize> {
        Ok(self.collection.partitions()?.len())
    }

    /// Serialized rows of a single partition.
    pub fn partition(&self, index: usize) -> Result<ExportIter> {
        let partition = Partition::new(index);
        let rows = self
            .collection
            .compute(&partition, &TaskContext::new(partition))?;

        let names = self.field_names.clone();
        let serializer = self.serializer.clone();
        Ok(Box::new(rows.map(move |row| {
            serializer.serialize_row(&names, &row?)
        })))
    }
}

impl RelationalCollection {
    /// Prepare this collection for export.
    ///
    /// Compiles the plan to learn the field names, so analysis errors surface
    /// here.
    pub fn export(&self, serializer: Arc<dyn RowSerializer>) -> Result<ExportedCollection> {
        let field_names = self.schema()?.field_names();
        Ok(ExportedCollection {
            field_names: field_names.into(),
            collection: self.clone(),
            serializer,
        })
    }
}
