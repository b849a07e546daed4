use crate::oracle::Oracle;
use crate::{Error, Result};
use abigen_common::{Catalog, LayoutSubject, Metric, Resolution, Statement};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Integer as written in a platform table: a plain TOML integer, or a string holding a decimal or
/// `0x` prefixed hexadecimal number for values TOML integers can not carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableValue {
    Int(i64),
    Text(String),
}

impl TableValue {
    pub fn value(&self) -> Option<i128> {
        match self {
            TableValue::Int(v) => Some(*v as i128),
            TableValue::Text(s) => {
                let s = s.trim();
                let (negative, digits) = match s.strip_prefix('-') {
                    Some(rest) => (true, rest),
                    None => (false, s),
                };
                let (radix, digits) = match digits
                    .strip_prefix("0x")
                    .or_else(|| digits.strip_prefix("0X"))
                {
                    Some(hex) => (16, hex),
                    None => (10, digits),
                };
                // one sign at most, and only in front of the prefix
                if digits.starts_with(['+', '-']) {
                    return None;
                }
                let magnitude = i128::from_str_radix(digits, radix).ok()?;
                Some(if negative { -magnitude } else { magnitude })
            }
        }
    }
}

impl From<i128> for TableValue {
    fn from(value: i128) -> Self {
        match i64::try_from(value) {
            Ok(v) => TableValue::Int(v),
            Err(_) if value < 0 => TableValue::Text(format!("-{:#x}", value.unsigned_abs())),
            Err(_) => TableValue::Text(format!("{:#x}", value)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLayout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<usize>,
}

/// Structured description of a platform's `<linux/kvm.h>`.
///
/// ```toml
/// arch = "x86_64"
/// kernel = "6.8"
///
/// [constants]
/// KVM_API_VERSION = 12
/// KVM_EXIT_HLT = 5
///
/// [layouts.kvm_regs]
/// size = 144
/// align = 8
///
/// [layouts."kvm_run.io"]
/// size = 16
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernel: Option<String>,
    #[serde(default)]
    pub constants: BTreeMap<String, TableValue>,
    #[serde(default)]
    pub layouts: BTreeMap<String, TableLayout>,
}

impl PlatformTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        content.parse()
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    pub fn with_constant<S: Into<String>>(mut self, name: S, value: i128) -> Self {
        self.constants.insert(name.into(), TableValue::from(value));
        self
    }

    pub fn with_layout<S: Into<String>>(mut self, key: S, metric: Metric, value: usize) -> Self {
        let layout = self.layouts.entry(key.into()).or_default();
        match metric {
            Metric::Size => layout.size = Some(value),
            Metric::Align => layout.align = Some(value),
        }
        self
    }

    /// Snapshot a resolution, e.g. of the host headers, to replay it elsewhere.
    pub fn capture(res: &Resolution) -> Self {
        let mut table = Self::new();
        for (name, value) in res.constants() {
            table = table.with_constant(name, value);
        }
        for (key, metric, value) in res.layouts() {
            table = table.with_layout(key, metric, value);
        }
        table
    }

    /// Snapshot exactly the values of a generator run.
    pub fn from_statements(statements: &[Statement]) -> Self {
        statements
            .iter()
            .fold(Self::new(), |table, stmt| match stmt {
                Statement::Constant(c) => table.with_constant(c.name, c.value),
                Statement::Layout(l) => table.with_layout(l.subject.key(), l.metric, l.value),
            })
    }

    fn to_resolution(&self) -> Result<Resolution> {
        let mut res = Resolution::new(self.describe());

        for (name, value) in &self.constants {
            let value = value.value().ok_or_else(|| Error::TableEntry {
                key: name.clone(),
                reason: "not an integer",
            })?;
            res.insert_constant(name.as_str(), value);
        }

        for (key, layout) in &self.layouts {
            if !LayoutSubject::is_valid_key(key) {
                return Err(Error::TableEntry {
                    key: key.clone(),
                    reason: "expected 'record' or 'record.field'",
                });
            }
            if let Some(size) = layout.size {
                res.insert_layout(key.as_str(), Metric::Size, size);
            }
            if let Some(align) = layout.align {
                res.insert_layout(key.as_str(), Metric::Align, align);
            }
        }

        Ok(res)
    }
}

impl FromStr for PlatformTable {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

impl Oracle for PlatformTable {
    fn describe(&self) -> String {
        match (&self.arch, &self.kernel) {
            (Some(arch), Some(kernel)) => format!("platform table ({}, kernel {})", arch, kernel),
            (Some(arch), None) => format!("platform table ({})", arch),
            (None, Some(kernel)) => format!("platform table (kernel {})", kernel),
            (None, None) => "platform table".to_string(),
        }
    }

    fn resolve(&self, _catalog: &Catalog) -> Result<Resolution> {
        let res = self.to_resolution()?;
        log::debug!("platform table provides {} values", res.len());
        Ok(res)
    }
}
