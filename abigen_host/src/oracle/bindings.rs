use crate::Result;
use crate::oracle::Oracle;
use abigen_common::{Catalog, KVMIO, Metric, Resolution};
use kvm_bindings::{
    KVM_API_VERSION, KVM_CAP_CHECK_EXTENSION_VM, KVM_CAP_MAX_VCPUS, KVM_CAP_NR_VCPUS,
    KVM_EXIT_DEBUG, KVM_EXIT_HLT, KVM_EXIT_IO, KVM_EXIT_IO_IN, KVM_EXIT_IO_OUT, KVM_EXIT_MMIO,
    KVM_GUESTDBG_ENABLE, KVM_GUESTDBG_SINGLESTEP, kvm_debugregs, kvm_dtable, kvm_guest_debug,
    kvm_guest_debug_arch, kvm_regs, kvm_run, kvm_segment, kvm_sregs, kvm_userspace_memory_region,
};

/// Size of a field, given an accessor. Nothing is ever instantiated.
fn size_of_field<T, F>(_: impl Fn(&T) -> &F) -> usize {
    size_of::<F>()
}

/// Declarations of the `kvm-bindings` crate, generated from some kernel's `<linux/kvm.h>`.
///
/// Serves as an independent witness for the host headers on x86_64. Request codes are not part of
/// `kvm-bindings` and are encoded here from their ioctl number and argument record.
#[derive(Debug, Default, Clone, Copy)]
pub struct KvmBindings;

impl KvmBindings {
    fn constants(res: &mut Resolution) {
        let io = |nr: u8| nix::request_code_none!(KVMIO, nr) as i128;
        let ior = |nr: u8, size: usize| nix::request_code_read!(KVMIO, nr, size) as i128;
        let iow = |nr: u8, size: usize| nix::request_code_write!(KVMIO, nr, size) as i128;

        res.insert_constant("KVM_API_VERSION", KVM_API_VERSION as i128);

        res.insert_constant("KVM_GET_API_VERSION", io(0x00));
        res.insert_constant("KVM_CREATE_VM", io(0x01));
        res.insert_constant("KVM_CHECK_EXTENSION", io(0x03));
        res.insert_constant("KVM_GET_VCPU_MMAP_SIZE", io(0x04));

        res.insert_constant("KVM_CREATE_VCPU", io(0x41));
        res.insert_constant(
            "KVM_SET_USER_MEMORY_REGION",
            iow(0x46, size_of::<kvm_userspace_memory_region>()),
        );

        res.insert_constant("KVM_RUN", io(0x80));
        res.insert_constant("KVM_GET_REGS", ior(0x81, size_of::<kvm_regs>()));
        res.insert_constant("KVM_SET_REGS", iow(0x82, size_of::<kvm_regs>()));
        res.insert_constant("KVM_GET_SREGS", ior(0x83, size_of::<kvm_sregs>()));
        res.insert_constant("KVM_SET_SREGS", iow(0x84, size_of::<kvm_sregs>()));
        res.insert_constant(
            "KVM_SET_GUEST_DEBUG",
            iow(0x9b, size_of::<kvm_guest_debug>()),
        );
        res.insert_constant("KVM_GET_DEBUGREGS", ior(0xa1, size_of::<kvm_debugregs>()));
        res.insert_constant("KVM_SET_DEBUGREGS", iow(0xa2, size_of::<kvm_debugregs>()));

        res.insert_constant("KVM_GUESTDBG_ENABLE", KVM_GUESTDBG_ENABLE as i128);
        res.insert_constant("KVM_GUESTDBG_SINGLESTEP", KVM_GUESTDBG_SINGLESTEP as i128);

        res.insert_constant("KVM_EXIT_HLT", KVM_EXIT_HLT as i128);
        res.insert_constant("KVM_EXIT_IO", KVM_EXIT_IO as i128);
        res.insert_constant("KVM_EXIT_MMIO", KVM_EXIT_MMIO as i128);
        res.insert_constant("KVM_EXIT_DEBUG", KVM_EXIT_DEBUG as i128);
        res.insert_constant("KVM_EXIT_IO_IN", KVM_EXIT_IO_IN as i128);
        res.insert_constant("KVM_EXIT_IO_OUT", KVM_EXIT_IO_OUT as i128);

        res.insert_constant(
            "KVM_CAP_CHECK_EXTENSION_VM",
            KVM_CAP_CHECK_EXTENSION_VM as i128,
        );
        res.insert_constant("KVM_CAP_NR_VCPUS", KVM_CAP_NR_VCPUS as i128);
        res.insert_constant("KVM_CAP_MAX_VCPUS", KVM_CAP_MAX_VCPUS as i128);
    }

    fn record<T>(res: &mut Resolution, key: &str) {
        res.insert_layout(key, Metric::Size, size_of::<T>());
        res.insert_layout(key, Metric::Align, align_of::<T>());
    }

    fn layouts(res: &mut Resolution) {
        Self::record::<kvm_regs>(res, "kvm_regs");
        Self::record::<kvm_sregs>(res, "kvm_sregs");
        Self::record::<kvm_segment>(res, "kvm_segment");
        Self::record::<kvm_dtable>(res, "kvm_dtable");
        Self::record::<kvm_userspace_memory_region>(res, "kvm_userspace_memory_region");
        Self::record::<kvm_run>(res, "kvm_run");
        Self::record::<kvm_debugregs>(res, "kvm_debugregs");
        Self::record::<kvm_guest_debug>(res, "kvm_guest_debug");
        Self::record::<kvm_guest_debug_arch>(res, "kvm_guest_debug_arch");

        res.insert_layout(
            "kvm_sregs.interrupt_bitmap",
            Metric::Size,
            size_of_field(|s: &kvm_sregs| &s.interrupt_bitmap),
        );
        // the exit payloads live in an anonymous union
        res.insert_layout(
            "kvm_run.io",
            Metric::Size,
            size_of_field(|r: &kvm_run| unsafe { &r.__bindgen_anon_1.io }),
        );
        res.insert_layout(
            "kvm_run.mmio",
            Metric::Size,
            size_of_field(|r: &kvm_run| unsafe { &r.__bindgen_anon_1.mmio }),
        );
        res.insert_layout(
            "kvm_run.debug",
            Metric::Size,
            size_of_field(|r: &kvm_run| unsafe { &r.__bindgen_anon_1.debug }),
        );
        res.insert_layout(
            "kvm_run.s",
            Metric::Size,
            size_of_field(|r: &kvm_run| &r.s),
        );
    }
}

impl Oracle for KvmBindings {
    fn describe(&self) -> String {
        "kvm-bindings (x86_64)".to_string()
    }

    fn resolve(&self, _catalog: &Catalog) -> Result<Resolution> {
        let mut res = Resolution::new(self.describe());
        Self::constants(&mut res);
        Self::layouts(&mut res);
        log::debug!("kvm-bindings provide {} values", res.len());
        Ok(res)
    }
}
