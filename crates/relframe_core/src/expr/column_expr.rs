use std::fmt;

/// Reference to a column by name.
///
/// Unresolved until a plan is analyzed; the name may not exist in the input at
/// all, which is only reported once the plan is compiled.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub qualifier: Option<String>,
    pub name: String,
}

impl ColumnRef {
    /// Parse a possibly qualified column name, e.g. `x.key`.
    ///
    /// Only the first dot splits, so `a.b.c` is qualifier `a` and name `b.c`.
    pub fn parse(ident: &str) -> Self {
        match ident.split_once('.') {
            Some((qualifier, name)) if !qualifier.is_empty() && !name.is_empty() => ColumnRef {
                qualifier: Some(qualifier.to_string()),
                name: name.to_string(),
            },
            _ => ColumnRef {
                qualifier: None,
                name: ident.to_string(),
            },
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(qualifier) => write!(f, "{qualifier}.{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}
