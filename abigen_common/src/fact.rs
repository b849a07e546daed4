use crate::catalog::Group;
use crate::width::Width;
use core::fmt::{Display, Formatter};

/// A named constant with the value the oracle assigned to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Constant {
    pub name: &'static str,
    pub group: Group,
    pub width: Width,
    /// Exact value, always within the range of `width`.
    pub value: i128,
}

/// The kernel record (or a named field of it) a layout fact talks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayoutSubject {
    record: &'static str,
    field: Option<&'static str>,
    alias: Option<&'static str>,
}

impl LayoutSubject {
    /// A whole record, named by its C struct tag (e.g. `kvm_regs`).
    pub const fn record(record: &'static str) -> Self {
        Self {
            record,
            field: None,
            alias: None,
        }
    }

    /// A named field of a record, e.g. `kvm_run.io`. Members of anonymous unions are addressed
    /// directly by their name, just like in C.
    pub const fn field(record: &'static str, field: &'static str) -> Self {
        Self {
            record,
            field: Some(field),
            alias: None,
        }
    }

    /// Use `alias` instead of the field name when deriving the constant name.
    pub const fn alias(mut self, alias: &'static str) -> Self {
        self.alias = Some(alias);
        self
    }

    pub const fn record_name(&self) -> &'static str {
        self.record
    }

    pub const fn field_name(&self) -> Option<&'static str> {
        self.field
    }

    pub const fn is_field(&self) -> bool {
        self.field.is_some()
    }

    /// Lookup key shared by all oracles: `record` or `record.field`.
    pub fn key(&self) -> String {
        match self.field {
            Some(field) => format!("{}.{}", self.record, field),
            None => self.record.to_string(),
        }
    }

    /// Upper-case stem of the generated constant name, e.g. `KVM_RUN_UNION_S`.
    pub fn const_stem(&self) -> String {
        let stem = match self.alias.or(self.field) {
            Some(field) => format!("{}_{}", self.record, field),
            None => self.record.to_string(),
        };
        stem.to_ascii_uppercase()
    }

    /// Check the syntax of a subject key as accepted by [`LayoutSubject::key`].
    pub fn is_valid_key(key: &str) -> bool {
        let mut parts = key.split('.');
        let record = parts.next().is_some_and(is_ident);
        let field = parts.next().is_none_or(is_ident);
        record && field && parts.next().is_none()
    }
}

impl Display for LayoutSubject {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.key())
    }
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Size,
    Align,
}

impl Metric {
    pub const fn as_str(self) -> &'static str {
        match self {
            Metric::Size => "size",
            Metric::Align => "align",
        }
    }

    pub const fn suffix(self) -> &'static str {
        match self {
            Metric::Size => "SIZE",
            Metric::Align => "ALIGN",
        }
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host resolved size or alignment of a kernel record, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutFact {
    pub subject: LayoutSubject,
    pub metric: Metric,
    pub value: usize,
}

impl LayoutFact {
    /// Name of the test-only constant, e.g. `TEST_KVM_REGS_SIZE`.
    pub fn const_name(&self) -> String {
        format!("TEST_{}_{}", self.subject.const_stem(), self.metric.suffix())
    }
}

/// One item of generator output. Constants are production declarations, layout facts are test
/// fixtures for the downstream binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statement {
    Constant(Constant),
    Layout(LayoutFact),
}

impl Statement {
    pub fn name(&self) -> String {
        match self {
            Statement::Constant(c) => c.name.to_string(),
            Statement::Layout(l) => l.const_name(),
        }
    }

    pub const fn is_test_only(&self) -> bool {
        matches!(self, Statement::Layout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_const_names() {
        let regs = LayoutFact {
            subject: LayoutSubject::record("kvm_regs"),
            metric: Metric::Align,
            value: 8,
        };
        assert_eq!("TEST_KVM_REGS_ALIGN", regs.const_name());

        let bitmap = LayoutFact {
            subject: LayoutSubject::field("kvm_sregs", "interrupt_bitmap"),
            metric: Metric::Size,
            value: 32,
        };
        assert_eq!("TEST_KVM_SREGS_INTERRUPT_BITMAP_SIZE", bitmap.const_name());

        let storage = LayoutFact {
            subject: LayoutSubject::field("kvm_run", "s").alias("union_s"),
            metric: Metric::Size,
            value: 2048,
        };
        assert_eq!("TEST_KVM_RUN_UNION_S_SIZE", storage.const_name());
        assert_eq!("kvm_run.s", storage.subject.key());
    }

    #[test]
    fn subject_keys() {
        assert!(LayoutSubject::is_valid_key("kvm_regs"));
        assert!(LayoutSubject::is_valid_key("kvm_run.io"));
        assert!(!LayoutSubject::is_valid_key(""));
        assert!(!LayoutSubject::is_valid_key("kvm_run."));
        assert!(!LayoutSubject::is_valid_key("kvm_run.io.port"));
        assert!(!LayoutSubject::is_valid_key("1kvm"));
    }

    #[test]
    fn statement_scope() {
        let c = Statement::Constant(Constant {
            name: "KVM_RUN",
            group: Group::Vcpu,
            width: Width::U64,
            value: 0xae80,
        });
        assert!(!c.is_test_only());
        assert_eq!("KVM_RUN", c.name());
    }
}
