//! The curated list of symbols and records taken from `<linux/kvm.h>`.
//!
//! Output order is the order of the tables below. Constants are grouped by the object the request
//! operates on (system fd, VM fd, vCPU fd), followed by the values those requests exchange.

use crate::error::{Error, Result};
use crate::fact::{LayoutSubject, Metric};
use crate::width::Width;
use core::fmt::{Display, Formatter};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Group {
    Global,
    System,
    Vm,
    Vcpu,
    GuestDebug,
    ExitReason,
    Capability,
}

impl Group {
    pub const fn title(self) -> &'static str {
        match self {
            Group::Global => "Global constants",
            Group::System => "ioctls for /dev/kvm",
            Group::Vm => "ioctls for VM fd",
            Group::Vcpu => "ioctls for VCPU fd",
            Group::GuestDebug => "struct kvm_guest_debug constants",
            Group::ExitReason => "struct kvm_run constants",
            Group::Capability => "Capability constants",
        }
    }
}

impl Display for Group {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantEntry {
    pub name: &'static str,
    pub group: Group,
    pub width: Width,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutEntry {
    pub subject: LayoutSubject,
    pub metric: Metric,
}

const fn constant(name: &'static str, group: Group, width: Width) -> ConstantEntry {
    ConstantEntry { name, group, width }
}

const fn size(subject: LayoutSubject) -> LayoutEntry {
    LayoutEntry {
        subject,
        metric: Metric::Size,
    }
}

const fn align(subject: LayoutSubject) -> LayoutEntry {
    LayoutEntry {
        subject,
        metric: Metric::Align,
    }
}

const KVM_CONSTANTS: &[ConstantEntry] = &[
    constant("KVM_API_VERSION", Group::Global, Width::I32),
    // param: none, ret: KVM_API_VERSION
    constant("KVM_GET_API_VERSION", Group::System, Width::U64),
    // param: machine type identifier, ret: VM fd
    constant("KVM_CREATE_VM", Group::System, Width::U64),
    // param: none, ret: size of the vcpu mmap region
    constant("KVM_GET_VCPU_MMAP_SIZE", Group::System, Width::U64),
    // param: vcpu id, ret: VCPU fd
    constant("KVM_CREATE_VCPU", Group::Vm, Width::U64),
    // param: struct kvm_userspace_memory_region
    constant("KVM_SET_USER_MEMORY_REGION", Group::Vm, Width::U64),
    constant("KVM_RUN", Group::Vcpu, Width::U64),
    // param: struct kvm_regs
    constant("KVM_GET_REGS", Group::Vcpu, Width::U64),
    constant("KVM_SET_REGS", Group::Vcpu, Width::U64),
    // param: struct kvm_sregs
    constant("KVM_GET_SREGS", Group::Vcpu, Width::U64),
    constant("KVM_SET_SREGS", Group::Vcpu, Width::U64),
    // param: struct kvm_debugregs
    constant("KVM_GET_DEBUGREGS", Group::Vcpu, Width::U64),
    constant("KVM_SET_DEBUGREGS", Group::Vcpu, Width::U64),
    // param: struct kvm_guest_debug
    constant("KVM_SET_GUEST_DEBUG", Group::Vcpu, Width::U64),
    constant("KVM_GUESTDBG_ENABLE", Group::GuestDebug, Width::U32),
    constant("KVM_GUESTDBG_SINGLESTEP", Group::GuestDebug, Width::U32),
    // matched as `kvm_run.exit_reason as u64` and `io.direction as u64` by the binding
    constant("KVM_EXIT_HLT", Group::ExitReason, Width::U64),
    constant("KVM_EXIT_IO", Group::ExitReason, Width::U64),
    constant("KVM_EXIT_MMIO", Group::ExitReason, Width::U64),
    constant("KVM_EXIT_DEBUG", Group::ExitReason, Width::U64),
    constant("KVM_EXIT_IO_IN", Group::ExitReason, Width::U64),
    constant("KVM_EXIT_IO_OUT", Group::ExitReason, Width::U64),
    // param: capability, ret: 0 unsupported, > 0 supported or amount
    constant("KVM_CHECK_EXTENSION", Group::Capability, Width::U64),
    constant("KVM_CAP_CHECK_EXTENSION_VM", Group::Capability, Width::U32),
    constant("KVM_CAP_NR_VCPUS", Group::Capability, Width::U32),
    constant("KVM_CAP_MAX_VCPUS", Group::Capability, Width::U32),
];

const KVM_REGS: LayoutSubject = LayoutSubject::record("kvm_regs");
const KVM_SREGS: LayoutSubject = LayoutSubject::record("kvm_sregs");
const KVM_SEGMENT: LayoutSubject = LayoutSubject::record("kvm_segment");
const KVM_DTABLE: LayoutSubject = LayoutSubject::record("kvm_dtable");
const KVM_USERSPACE_MEMORY_REGION: LayoutSubject =
    LayoutSubject::record("kvm_userspace_memory_region");
const KVM_RUN: LayoutSubject = LayoutSubject::record("kvm_run");
const KVM_DEBUGREGS: LayoutSubject = LayoutSubject::record("kvm_debugregs");
const KVM_GUEST_DEBUG: LayoutSubject = LayoutSubject::record("kvm_guest_debug");
const KVM_GUEST_DEBUG_ARCH: LayoutSubject = LayoutSubject::record("kvm_guest_debug_arch");

const KVM_LAYOUTS: &[LayoutEntry] = &[
    size(KVM_REGS),
    align(KVM_REGS),
    size(KVM_SREGS),
    align(KVM_SREGS),
    size(LayoutSubject::field("kvm_sregs", "interrupt_bitmap")),
    size(KVM_SEGMENT),
    align(KVM_SEGMENT),
    size(KVM_DTABLE),
    align(KVM_DTABLE),
    size(KVM_USERSPACE_MEMORY_REGION),
    align(KVM_USERSPACE_MEMORY_REGION),
    size(KVM_RUN),
    align(KVM_RUN),
    // exit payloads, members of the anonymous union in struct kvm_run
    size(LayoutSubject::field("kvm_run", "io")),
    size(LayoutSubject::field("kvm_run", "mmio")),
    size(LayoutSubject::field("kvm_run", "debug")),
    // shared register storage trailing the exit payloads
    size(LayoutSubject::field("kvm_run", "s").alias("union_s")),
    size(KVM_DEBUGREGS),
    align(KVM_DEBUGREGS),
    size(KVM_GUEST_DEBUG),
    align(KVM_GUEST_DEBUG),
    size(KVM_GUEST_DEBUG_ARCH),
    align(KVM_GUEST_DEBUG_ARCH),
];

/// Ordered list of everything a generator run emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Catalog {
    constants: &'static [ConstantEntry],
    layouts: &'static [LayoutEntry],
}

impl Catalog {
    /// Build a catalog from custom tables. Use [`Catalog::validate`] before handing it out.
    pub const fn new(constants: &'static [ConstantEntry], layouts: &'static [LayoutEntry]) -> Self {
        Self { constants, layouts }
    }

    /// The KVM catalog consumed by the binding.
    pub const fn kvm() -> Self {
        Self::new(KVM_CONSTANTS, KVM_LAYOUTS)
    }

    pub const fn constants(&self) -> &'static [ConstantEntry] {
        self.constants
    }

    pub const fn layouts(&self) -> &'static [LayoutEntry] {
        self.layouts
    }

    pub const fn len(&self) -> usize {
        self.constants.len() + self.layouts.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ensure every constant and layout entry is unique, constant groups appear in their fixed
    /// order and only whole records carry an alignment entry.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        let mut prev = Group::Global;
        for entry in self.constants {
            if !seen.insert(entry.name.to_string()) {
                return Err(Error::DuplicateEntry(entry.name.to_string()));
            }
            if entry.group < prev {
                return Err(Error::GroupOrder(entry.name.to_string()));
            }
            prev = entry.group;
        }

        for entry in self.layouts {
            let key = format!("{}:{}", entry.subject.key(), entry.metric);
            if !seen.insert(key.clone()) {
                return Err(Error::DuplicateEntry(key));
            }
            // C11 alignof only accepts type names
            if entry.subject.is_field() && entry.metric == Metric::Align {
                return Err(Error::InvalidSubject(key));
            }
        }

        Ok(())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::kvm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kvm_catalog_is_valid() {
        Catalog::kvm().validate().unwrap();
    }

    #[test]
    fn kvm_catalog_group_order() {
        let groups: Vec<Group> = Catalog::kvm().constants().iter().map(|c| c.group).collect();
        let mut dedup = groups.clone();
        dedup.dedup();
        assert_eq!(
            vec![
                Group::Global,
                Group::System,
                Group::Vm,
                Group::Vcpu,
                Group::GuestDebug,
                Group::ExitReason,
                Group::Capability,
            ],
            dedup
        );
    }

    #[test]
    fn kvm_catalog_widths() {
        let catalog = Catalog::kvm();
        let width = |name: &str| {
            catalog
                .constants()
                .iter()
                .find(|c| c.name == name)
                .map(|c| c.width)
                .unwrap()
        };

        assert_eq!(Width::I32, width("KVM_API_VERSION"));
        assert_eq!(Width::U64, width("KVM_SET_USER_MEMORY_REGION"));
        assert_eq!(Width::U32, width("KVM_GUESTDBG_SINGLESTEP"));
        assert_eq!(Width::U64, width("KVM_EXIT_HLT"));
        assert_eq!(Width::U64, width("KVM_EXIT_IO_OUT"));
        assert_eq!(Width::U32, width("KVM_GUESTDBG_ENABLE"));
        assert_eq!(Width::U64, width("KVM_CHECK_EXTENSION"));
        assert_eq!(Width::U32, width("KVM_CAP_MAX_VCPUS"));
    }

    #[test]
    fn kvm_catalog_layouts() {
        let layouts = Catalog::kvm().layouts();
        assert_eq!(23, layouts.len());
        assert_eq!(LayoutSubject::record("kvm_regs"), layouts[0].subject);
        assert_eq!(Metric::Size, layouts[0].metric);
        assert_eq!(Metric::Align, layouts[1].metric);
        assert!(
            layouts
                .iter()
                .filter(|l| l.subject.is_field())
                .all(|l| l.metric == Metric::Size)
        );
    }

    #[test]
    fn duplicate_constant_rejected() {
        const DUP: &[ConstantEntry] = &[
            constant("KVM_RUN", Group::Vcpu, Width::U64),
            constant("KVM_RUN", Group::Vcpu, Width::U64),
        ];
        assert_eq!(
            Err(Error::DuplicateEntry("KVM_RUN".to_string())),
            Catalog::new(DUP, &[]).validate()
        );
    }

    #[test]
    fn misordered_group_rejected() {
        const MISORDERED: &[ConstantEntry] = &[
            constant("KVM_RUN", Group::Vcpu, Width::U64),
            constant("KVM_CREATE_VM", Group::System, Width::U64),
        ];
        assert_eq!(
            Err(Error::GroupOrder("KVM_CREATE_VM".to_string())),
            Catalog::new(MISORDERED, &[]).validate()
        );
    }

    #[test]
    fn field_alignment_rejected() {
        const FIELD_ALIGN: &[LayoutEntry] = &[align(LayoutSubject::field("kvm_run", "io"))];
        assert!(Catalog::new(&[], FIELD_ALIGN).validate().is_err());
    }
}
