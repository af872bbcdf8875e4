use std::fmt;

use serde::{Deserialize, Serialize};

use super::datatype::DataType;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub datatype: DataType,
    pub nullable: bool,
    /// Qualifier introduced by aliasing a collection. Lets columns from two
    /// sides of a self join be told apart.
    pub qualifier: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, datatype: DataType, nullable: bool) -> Self {
        Field {
            name: name.into(),
            datatype,
            nullable,
            qualifier: None,
        }
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    fn matches(&self, qualifier: Option<&str>, name: &str) -> bool {
        if self.name != name {
            return false;
        }
        match qualifier {
            Some(qualifier) => self.qualifier.as_deref() == Some(qualifier),
            None => true,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(qualifier) = &self.qualifier {
            write!(f, "{qualifier}.")?;
        }
        write!(f, "{}: {}", self.name, self.datatype)
    }
}

/// Result of looking up a possibly qualified column name in a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnLookup {
    Found(usize),
    Missing,
    /// More than one column matched.
    Ambiguous,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: impl IntoIterator<Item = Field>) -> Self {
        Schema {
            fields: fields.into_iter().collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, idx: usize) -> Option<&Field> {
        self.fields.get(idx)
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    pub fn lookup(&self, qualifier: Option<&str>, name: &str) -> ColumnLookup {
        let mut found = None;
        for (idx, field) in self.fields.iter().enumerate() {
            if field.matches(qualifier, name) {
                if found.is_some() {
                    return ColumnLookup::Ambiguous;
                }
                found = Some(idx);
            }
        }

        match found {
            Some(idx) => ColumnLookup::Found(idx),
            None => ColumnLookup::Missing,
        }
    }

    /// Replace the qualifier on every field.
    pub fn requalify(&self, qualifier: &str) -> Schema {
        Schema::new(
            self.fields
                .iter()
                .cloned()
                .map(|f| f.with_qualifier(qualifier)),
        )
    }

    /// Mark every field nullable.
    pub fn into_nullable(self) -> Schema {
        Schema::new(self.fields.into_iter().map(|mut f| {
            f.nullable = true;
            f
        }))
    }

    /// Fields of `self` followed by fields of `other`.
    pub fn merge(&self, other: &Schema) -> Schema {
        Schema::new(self.fields.iter().chain(other.fields.iter()).cloned())
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (idx, field) in self.fields.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{field}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::new([
            Field::new("key", DataType::Int64, false).with_qualifier("a"),
            Field::new("value", DataType::Utf8, true).with_qualifier("a"),
            Field::new("key", DataType::Int64, false).with_qualifier("b"),
        ])
    }

    #[test]
    fn lookup_qualified() {
        let s = schema();
        assert_eq!(ColumnLookup::Found(0), s.lookup(Some("a"), "key"));
        assert_eq!(ColumnLookup::Found(2), s.lookup(Some("b"), "key"));
        assert_eq!(ColumnLookup::Missing, s.lookup(Some("b"), "value"));
    }

    #[test]
    fn lookup_unqualified() {
        let s = schema();
        assert_eq!(ColumnLookup::Found(1), s.lookup(None, "value"));
        assert_eq!(ColumnLookup::Ambiguous, s.lookup(None, "key"));
        assert_eq!(ColumnLookup::Missing, s.lookup(None, "other"));
    }

    #[test]
    fn requalify_replaces() {
        let s = schema().requalify("c");
        assert_eq!(ColumnLookup::Missing, s.lookup(Some("a"), "value"));
        assert_eq!(ColumnLookup::Found(1), s.lookup(Some("c"), "value"));
    }
}
