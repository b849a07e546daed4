pub mod build_support;
mod config;
pub mod emit;
pub mod oracle;
pub mod render;

pub use abigen_common::{Catalog, Statement};
pub use config::{Config, ConfigBuilder};
pub use emit::{Generated, generate};
pub use oracle::{HostHeaders, Oracle, PlatformTable};
#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
pub use oracle::KvmBindings;
pub use render::Format;

pub type Result<T> = core::result::Result<T, Error>;

/// The stage of the host probe which failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Compile,
    Run,
}

impl core::fmt::Display for Stage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Stage::Compile => f.write_str("compilation"),
            Stage::Run => f.write_str("execution"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Model(#[from] abigen_common::error::Error),
    #[error("C compiler not available: {0}")]
    Compiler(#[from] cc::Error),
    #[error("probe {stage} failed ({status}):\n{stderr}")]
    Probe {
        stage: Stage,
        status: String,
        stderr: String,
    },
    #[error("invalid probe output '{line}': {reason}")]
    ProbeOutput { line: String, reason: &'static str },
    #[error("invalid platform table: {0}")]
    TableDecode(#[from] toml::de::Error),
    #[error("platform table could not be written: {0}")]
    TableEncode(#[from] toml::ser::Error),
    #[error("invalid platform table entry '{key}': {reason}")]
    TableEntry { key: String, reason: &'static str },
    #[error("OUT_DIR is not set, not running inside a build script?")]
    MissingOutDir,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
