use abigen_common::{Catalog, Group, LayoutSubject, Metric, Statement};
use abigen_host::{Format, PlatformTable, generate, render};

/// A table resolving the whole catalog, with the given overrides applied on top.
fn table(overrides: &[(&str, i128)], regs: (usize, usize)) -> PlatformTable {
    let catalog = Catalog::kvm();
    let mut table = PlatformTable::new();
    for entry in catalog.constants() {
        table = table.with_constant(entry.name, 0x10);
    }
    for entry in catalog.layouts() {
        table = table.with_layout(entry.subject.key(), entry.metric, 16);
    }
    for (name, value) in overrides {
        table = table.with_constant(*name, *value);
    }
    table
        .with_layout("kvm_regs", Metric::Size, regs.0)
        .with_layout("kvm_regs", Metric::Align, regs.1)
}

fn constant(statements: &[Statement], name: &str) -> i128 {
    statements
        .iter()
        .find_map(|s| match s {
            Statement::Constant(c) if c.name == name => Some(c.value),
            _ => None,
        })
        .unwrap()
}

fn layout(statements: &[Statement], subject: LayoutSubject, metric: Metric) -> usize {
    statements
        .iter()
        .find_map(|s| match s {
            Statement::Layout(l) if l.subject == subject && l.metric == metric => Some(l.value),
            _ => None,
        })
        .unwrap()
}

#[test]
fn version_halt_and_regs_scenario() {
    let oracle = table(&[("KVM_API_VERSION", 12), ("KVM_EXIT_HLT", 0x5)], (232, 8));
    let generated = generate(&oracle, &Catalog::kvm()).unwrap();
    let regs = LayoutSubject::record("kvm_regs");

    assert_eq!(12, constant(&generated.statements, "KVM_API_VERSION"));
    assert_eq!(0x5, constant(&generated.statements, "KVM_EXIT_HLT"));
    assert_eq!(232, layout(&generated.statements, regs, Metric::Size));
    assert_eq!(8, layout(&generated.statements, regs, Metric::Align));

    let text = render::rust(&generated);
    assert!(text.contains("pub(crate) const KVM_API_VERSION: i32 = 0xc;\n"));
    assert!(text.contains("pub(crate) const KVM_EXIT_HLT: u64 = 0x5;\n"));
    assert!(text.contains("#[cfg(test)] const TEST_KVM_REGS_SIZE: usize = 232;\n"));
    assert!(text.contains("#[cfg(test)] const TEST_KVM_REGS_ALIGN: usize = 8;\n"));
}

#[test]
fn exit_reasons_match_as_u64() {
    let generated = generate(&table(&[], (144, 8)), &Catalog::kvm()).unwrap();
    let text = render::rust(&generated);

    for name in [
        "KVM_EXIT_HLT",
        "KVM_EXIT_IO",
        "KVM_EXIT_MMIO",
        "KVM_EXIT_DEBUG",
        "KVM_EXIT_IO_IN",
        "KVM_EXIT_IO_OUT",
    ] {
        assert!(text.contains(&format!("pub(crate) const {}: u64 = ", name)), "{}", name);
    }
}

#[test]
fn every_entry_exactly_once() {
    let catalog = Catalog::kvm();
    let generated = generate(&table(&[], (144, 8)), &catalog).unwrap();
    let text = render::rust(&generated);

    for entry in catalog.constants() {
        let decl = format!("pub(crate) const {}: ", entry.name);
        assert_eq!(1, text.matches(&decl).count(), "{}", entry.name);
    }
    for stmt in generated.layouts() {
        let decl = format!("const {}: usize", stmt.name());
        assert_eq!(1, text.matches(&decl).count(), "{}", stmt.name());
    }
}

#[test]
fn groups_in_fixed_order() {
    let generated = generate(&table(&[], (144, 8)), &Catalog::kvm()).unwrap();
    let text = render::rust(&generated);

    let positions: Vec<usize> = [
        Group::Global,
        Group::System,
        Group::Vm,
        Group::Vcpu,
        Group::GuestDebug,
        Group::ExitReason,
        Group::Capability,
    ]
    .iter()
    .map(|g| text.find(&format!("// {}\n", g.title())).unwrap())
    .collect();

    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(positions[6] < text.find("// Testing constants").unwrap());
}

#[test]
fn rendering_is_deterministic() {
    let oracle = table(&[], (144, 8));
    for format in [Format::Rust, Format::Table, Format::Toml] {
        let a = render::render(&generate(&oracle, &Catalog::kvm()).unwrap(), format).unwrap();
        let b = render::render(&generate(&oracle, &Catalog::kvm()).unwrap(), format).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn different_platforms_diverge() {
    let a = generate(&table(&[], (144, 8)), &Catalog::kvm()).unwrap();
    let b = generate(&table(&[("KVM_CAP_MAX_VCPUS", 0x42)], (144, 8)), &Catalog::kvm()).unwrap();

    assert_ne!(render::rust(&a), render::rust(&b));
}

#[test]
fn out_of_range_value_is_rejected() {
    let oracle = table(&[("KVM_CAP_MAX_VCPUS", 0x1_0000_0000)], (144, 8));
    assert!(generate(&oracle, &Catalog::kvm()).is_err());

    let oracle = table(&[("KVM_EXIT_IO_IN", -1)], (144, 8));
    assert!(generate(&oracle, &Catalog::kvm()).is_err());
}

#[test]
fn toml_snapshot_replays_identically() {
    let original = generate(&table(&[], (144, 8)), &Catalog::kvm()).unwrap();
    let snapshot: PlatformTable = render::toml(&original).unwrap().parse().unwrap();
    let replayed = generate(&snapshot, &Catalog::kvm()).unwrap();

    assert_eq!(original.statements, replayed.statements);
}
