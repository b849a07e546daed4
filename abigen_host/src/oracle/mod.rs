//! Sources of numeric and layout facts for the catalog.

#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
mod bindings;
mod host;
pub(crate) mod probe;
mod table;

use crate::Result;
use abigen_common::{Catalog, Resolution};

#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
pub use bindings::KvmBindings;
pub use host::HostHeaders;
pub use table::{PlatformTable, TableLayout, TableValue};

/// An oracle assigns values to the symbols and layout subjects of a catalog.
///
/// Implementations must not make up values: whatever the oracle cannot answer is left out of the
/// [`Resolution`] (or reported as an error), never filled with a default.
pub trait Oracle {
    /// Stable description of the oracle, part of the generated output.
    fn describe(&self) -> String;

    fn resolve(&self, catalog: &Catalog) -> Result<Resolution>;
}

impl<O: Oracle + ?Sized> Oracle for &O {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn resolve(&self, catalog: &Catalog) -> Result<Resolution> {
        (**self).resolve(catalog)
    }
}

impl<O: Oracle + ?Sized> Oracle for Box<O> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn resolve(&self, catalog: &Catalog) -> Result<Resolution> {
        (**self).resolve(catalog)
    }
}
