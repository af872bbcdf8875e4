use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// How much detail plan nodes should put in their entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplainConfig {
    pub verbose: bool,
}

/// Something that can describe itself as one line of a plan explanation.
pub trait Explainable {
    fn explain_entry(&self, conf: ExplainConfig) -> ExplainEntry;
}

/// A node name followed by rendered properties.
///
/// Properties are kept sorted by key so explanations are stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainEntry {
    pub name: String,
    pub properties: BTreeMap<String, String>,
}

impl ExplainEntry {
    pub fn new(name: impl Into<String>) -> Self {
        ExplainEntry {
            name: name.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.properties.insert(key.into(), value.to_string());
        self
    }

    /// Like `with_value`, but skipped unless `conf` asks for verbose output.
    pub fn with_verbose_value(
        self,
        conf: ExplainConfig,
        key: impl Into<String>,
        value: impl fmt::Display,
    ) -> Self {
        if conf.verbose {
            self.with_value(key, value)
        } else {
            self
        }
    }

    /// Render a sequence as `[a, b, c]`.
    pub fn with_values<S: fmt::Display>(
        self,
        key: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        let rendered: Vec<String> = values.into_iter().map(|v| v.to_string()).collect();
        self.with_value(key, format_args!("[{}]", rendered.join(", ")))
    }
}

impl fmt::Display for ExplainEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        let mut sep = " (";
        for (key, value) in &self.properties {
            write!(f, "{sep}{key} = {value}")?;
            sep = ", ";
        }
        if !self.properties.is_empty() {
            f.write_str(")")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_name() {
        assert_eq!("Union", ExplainEntry::new("Union").to_string());
    }

    #[test]
    fn properties_sorted_by_key() {
        let entry = ExplainEntry::new("Project")
            .with_values("projections", ["a", "b"])
            .with_value("alias", "t");

        assert_eq!("Project (alias = t, projections = [a, b])", entry.to_string());
    }

    #[test]
    fn verbose_values_need_verbose_config() {
        let entry = |verbose| {
            ExplainEntry::new("Sample").with_verbose_value(ExplainConfig { verbose }, "seed", 4)
        };

        assert_eq!("Sample", entry(false).to_string());
        assert_eq!("Sample (seed = 4)", entry(true).to_string());
    }
}
