//! Helpers for build scripts of crates binding KVM.
//!
//! ```no_run
//! // build.rs
//! fn main() {
//!     abigen_host::build_support::write_to_out_dir("kvm_constants.rs", Default::default()).unwrap();
//! }
//! ```
//!
//! The binding then pulls the constants in with
//! `include!(concat!(env!("OUT_DIR"), "/kvm_constants.rs"));`.

use crate::config::Config;
use crate::oracle::HostHeaders;
use crate::{Error, Result, emit, render};
use abigen_common::{Catalog, KVM_HEADER};
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Default system include directory searched by the host compiler.
const SYSTEM_INCLUDE: &str = "/usr/include";

/// Architecture header pulled in by `<linux/kvm.h>`. Declares the register records.
const ARCH_HEADER: &str = "asm/kvm.h";

/// Header files a build script should watch for the given configuration.
pub fn watched_headers(cfg: &Config) -> Vec<PathBuf> {
    cfg.include_dirs
        .iter()
        .map(PathBuf::as_path)
        .chain(std::iter::once(Path::new(SYSTEM_INCLUDE)))
        .flat_map(|dir| [dir.join(KVM_HEADER), dir.join(ARCH_HEADER)])
        .filter(|header| header.exists())
        .collect()
}

/// Generate the constants from the host headers into `path`.
pub fn write_constants<P: AsRef<Path>>(path: P, cfg: Config) -> Result<()> {
    for header in watched_headers(&cfg) {
        println!("cargo:rerun-if-changed={}", header.display());
    }

    let generated = emit::generate(&HostHeaders::new(cfg), &Catalog::kvm())?;
    fs::write(path.as_ref(), render::rust(&generated))?;
    log::debug!("constants written to {}", path.as_ref().display());
    Ok(())
}

/// Generate the constants into `$OUT_DIR/<file_name>` and return the full path.
pub fn write_to_out_dir(file_name: &str, cfg: Config) -> Result<PathBuf> {
    write_into(env::var_os("OUT_DIR"), file_name, cfg)
}

fn write_into(out_dir: Option<OsString>, file_name: &str, cfg: Config) -> Result<PathBuf> {
    let out = out_dir.ok_or(Error::MissingOutDir)?;
    let path = PathBuf::from(out).join(file_name);
    write_constants(&path, cfg)?;
    Ok(path)
}
