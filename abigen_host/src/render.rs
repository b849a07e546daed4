//! Turn generated statements into text. Rendering never changes a value, it only formats.

use crate::Result;
use crate::emit::Generated;
use crate::oracle::PlatformTable;
use abigen_common::{Constant, LayoutFact, Statement};
use std::fmt::Write;
use std::str::FromStr;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// Rust declarations, ready to be `include!`d next to the binding.
    #[default]
    Rust,
    /// Human readable table.
    Table,
    /// A [`PlatformTable`] which can be used as oracle again.
    Toml,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s {
            "rust" => Ok(Format::Rust),
            "table" => Ok(Format::Table),
            "toml" => Ok(Format::Toml),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

pub fn render(generated: &Generated, format: Format) -> Result<String> {
    match format {
        Format::Rust => Ok(rust(generated)),
        Format::Table => Ok(table(generated)),
        Format::Toml => toml(generated),
    }
}

/// Hexadecimal literal, negative values keep their sign.
fn hex(value: i128) -> String {
    match value < 0 {
        true => format!("-{:#x}", value.unsigned_abs()),
        false => format!("{:#x}", value),
    }
}

fn rust_constant(c: &Constant) -> String {
    format!(
        "pub(crate) const {}: {} = {};",
        c.name,
        c.width.rust_type(),
        hex(c.value)
    )
}

/// Fixtures whose name changed, as `(current, previous)`. The previous name stays available as
/// an alias so existing bindings keep building.
const RENAMED_FIXTURES: &[(&str, &str)] = &[(
    "TEST_KVM_SREGS_INTERRUPT_BITMAP_SIZE",
    "TEST_KVM_SREGS_INTERRTUP_BITMAP_SIZE",
)];

fn rust_layout(l: &LayoutFact) -> String {
    let name = l.const_name();
    let mut decl = format!("#[cfg(test)] const {}: usize = {};", name, l.value);
    for (_, previous) in RENAMED_FIXTURES.iter().filter(|(current, _)| *current == name) {
        let _ = write!(
            decl,
            "\n// {} was renamed to {}\n#[cfg(test)] #[allow(dead_code)] const {}: usize = {};",
            previous, name, previous, name
        );
    }
    decl
}

/// Rust source text: one declaration per line, each constant group introduced by a comment.
pub fn rust(generated: &Generated) -> String {
    let mut out = format!(
        "// @generated by kvm-abigen from {}. Do not edit.\n",
        generated.source
    );

    let mut group = None;
    let mut testing = false;
    for stmt in &generated.statements {
        match stmt {
            Statement::Constant(c) => {
                if group != Some(c.group) {
                    group = Some(c.group);
                    let _ = write!(out, "\n// {}\n", c.group);
                }
                out.push_str(&rust_constant(c));
            }
            Statement::Layout(l) => {
                if !testing {
                    testing = true;
                    out.push_str("\n// Testing constants\n");
                }
                out.push_str(&rust_layout(l));
            }
        }
        out.push('\n');
    }

    out
}

#[derive(Tabled)]
struct Row {
    name: String,
    scope: &'static str,
    #[tabled(rename = "type")]
    ty: &'static str,
    value: String,
}

impl From<&Statement> for Row {
    fn from(stmt: &Statement) -> Self {
        match stmt {
            Statement::Constant(c) => Row {
                name: c.name.to_string(),
                scope: "crate",
                ty: c.width.rust_type(),
                value: hex(c.value),
            },
            Statement::Layout(l) => Row {
                name: l.const_name(),
                scope: "test",
                ty: "usize",
                value: l.value.to_string(),
            },
        }
    }
}

pub fn table(generated: &Generated) -> String {
    let mut table = Table::new(generated.statements.iter().map(Row::from));
    table.with(Style::modern());
    format!("{}\n{}\n", generated.source, table)
}

pub fn toml(generated: &Generated) -> Result<String> {
    PlatformTable::from_statements(&generated.statements).to_toml()
}

#[cfg(test)]
mod tests {
    use super::*;
    use abigen_common::{Group, LayoutSubject, Metric, Width};

    fn sample() -> Generated {
        Generated {
            source: "test".to_string(),
            statements: vec![
                Statement::Constant(Constant {
                    name: "KVM_API_VERSION",
                    group: Group::Global,
                    width: Width::I32,
                    value: 12,
                }),
                Statement::Constant(Constant {
                    name: "KVM_GET_API_VERSION",
                    group: Group::System,
                    width: Width::U64,
                    value: 0xae00,
                }),
                Statement::Constant(Constant {
                    name: "KVM_CREATE_VM",
                    group: Group::System,
                    width: Width::U64,
                    value: 0xae01,
                }),
                Statement::Layout(LayoutFact {
                    subject: LayoutSubject::record("kvm_regs"),
                    metric: Metric::Size,
                    value: 144,
                }),
            ],
        }
    }

    #[test]
    fn rust_output() {
        let expected = "\
// @generated by kvm-abigen from test. Do not edit.

// Global constants
pub(crate) const KVM_API_VERSION: i32 = 0xc;

// ioctls for /dev/kvm
pub(crate) const KVM_GET_API_VERSION: u64 = 0xae00;
pub(crate) const KVM_CREATE_VM: u64 = 0xae01;

// Testing constants
#[cfg(test)] const TEST_KVM_REGS_SIZE: usize = 144;
";
        assert_eq!(expected, rust(&sample()));
    }

    #[test]
    fn renamed_fixture_keeps_previous_name() {
        let generated = Generated {
            source: "test".to_string(),
            statements: vec![Statement::Layout(LayoutFact {
                subject: LayoutSubject::field("kvm_sregs", "interrupt_bitmap"),
                metric: Metric::Size,
                value: 32,
            })],
        };
        let expected = "\
// @generated by kvm-abigen from test. Do not edit.

// Testing constants
#[cfg(test)] const TEST_KVM_SREGS_INTERRUPT_BITMAP_SIZE: usize = 32;
// TEST_KVM_SREGS_INTERRTUP_BITMAP_SIZE was renamed to TEST_KVM_SREGS_INTERRUPT_BITMAP_SIZE
#[cfg(test)] #[allow(dead_code)] const TEST_KVM_SREGS_INTERRTUP_BITMAP_SIZE: usize = TEST_KVM_SREGS_INTERRUPT_BITMAP_SIZE;
";
        assert_eq!(expected, rust(&generated));
    }

    #[test]
    fn negative_hex() {
        assert_eq!("-0x1", hex(-1));
        assert_eq!("0x0", hex(0));
        assert_eq!("0xffffffffffffffff", hex(u64::MAX as i128));
    }

    #[test]
    fn table_output_lists_every_statement() {
        let text = table(&sample());
        for name in [
            "KVM_API_VERSION",
            "KVM_GET_API_VERSION",
            "KVM_CREATE_VM",
            "TEST_KVM_REGS_SIZE",
        ] {
            assert!(text.contains(name), "{} missing in\n{}", name, text);
        }
    }

    #[test]
    fn toml_output_is_a_platform_table() {
        let text = toml(&sample()).unwrap();
        let table: PlatformTable = text.parse().unwrap();
        assert_eq!(PlatformTable::from_statements(&sample().statements), table);
    }

    #[test]
    fn format_names() {
        assert_eq!(Ok(Format::Rust), "rust".parse());
        assert_eq!(Ok(Format::Toml), "toml".parse());
        assert!("json".parse::<Format>().is_err());
    }
}
