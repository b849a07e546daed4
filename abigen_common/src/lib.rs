pub mod catalog;
pub mod error;
pub mod fact;
pub mod resolution;
pub mod width;

pub use crate::catalog::{Catalog, ConstantEntry, Group, LayoutEntry};
pub use crate::fact::{Constant, LayoutFact, LayoutSubject, Metric, Statement};
pub use crate::resolution::Resolution;
pub use crate::width::Width;

/// The ioctl type number of all KVM requests (`KVMIO`).
pub const KVMIO: u8 = 0xAE;
/// The header every oracle is ultimately describing.
pub const KVM_HEADER: &str = "linux/kvm.h";
