use crate::catalog::{ConstantEntry, LayoutEntry};
use crate::error::{Error, Result};
use crate::fact::{Constant, LayoutFact, LayoutSubject, Metric};
use std::collections::BTreeMap;

/// The values an oracle assigned to symbols and layout subjects.
///
/// A resolution holds raw values only; the declared widths and the output order come from the
/// catalog when the values are turned into statements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    source: String,
    constants: BTreeMap<String, i128>,
    layouts: BTreeMap<(String, Metric), usize>,
}

impl Resolution {
    pub fn new<S: Into<String>>(source: S) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    /// Human readable description of the oracle which produced the values.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn insert_constant<S: Into<String>>(&mut self, name: S, value: i128) {
        self.constants.insert(name.into(), value);
    }

    pub fn insert_layout<S: Into<String>>(&mut self, key: S, metric: Metric, value: usize) {
        self.layouts.insert((key.into(), metric), value);
    }

    pub fn constant(&self, name: &str) -> Option<i128> {
        self.constants.get(name).copied()
    }

    pub fn layout(&self, subject: &LayoutSubject, metric: Metric) -> Option<usize> {
        self.layout_by_key(&subject.key(), metric)
    }

    pub fn layout_by_key(&self, key: &str, metric: Metric) -> Option<usize> {
        self.layouts.get(&(key.to_string(), metric)).copied()
    }

    pub fn constants(&self) -> impl Iterator<Item = (&str, i128)> {
        self.constants.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn layouts(&self) -> impl Iterator<Item = (&str, Metric, usize)> {
        self.layouts.iter().map(|((k, m), v)| (k.as_str(), *m, *v))
    }

    pub fn len(&self) -> usize {
        self.constants.len() + self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a catalog constant. Missing symbols and values outside the declared width are
    /// errors, a value is never substituted or truncated.
    pub fn require_constant(&self, entry: &ConstantEntry) -> Result<Constant> {
        let value = self
            .constant(entry.name)
            .ok_or_else(|| Error::Unresolved(entry.name.to_string()))?;

        if !entry.width.contains(value) {
            return Err(Error::OutOfRange {
                name: entry.name.to_string(),
                width: entry.width,
                value,
            });
        }

        Ok(Constant {
            name: entry.name,
            group: entry.group,
            width: entry.width,
            value,
        })
    }

    pub fn require_layout(&self, entry: &LayoutEntry) -> Result<LayoutFact> {
        let value = self
            .layout(&entry.subject, entry.metric)
            .ok_or_else(|| Error::Unresolved(format!("{} of {}", entry.metric, entry.subject)))?;

        Ok(LayoutFact {
            subject: entry.subject,
            metric: entry.metric,
            value,
        })
    }
}
