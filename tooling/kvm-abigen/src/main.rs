use abigen_common::Catalog;
use abigen_host::{ConfigBuilder, Format, HostHeaders, Oracle, PlatformTable, generate, render};
use clap::{Parser, ValueEnum};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    /// Rust declarations to include next to the binding
    Rust,
    /// Table for inspection
    Table,
    /// Platform table, usable with --table
    Toml,
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Rust => Format::Rust,
            OutputFormat::Table => Format::Table,
            OutputFormat::Toml => Format::Toml,
        }
    }
}

/// Generate KVM constants and layout test fixtures from <linux/kvm.h>.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Resolve values from a platform table instead of the host headers
    #[arg(long, conflicts_with = "bindings")]
    table: Option<PathBuf>,

    /// Resolve values from the kvm-bindings crate (x86_64 Linux)
    #[arg(long, default_value_t = false)]
    bindings: bool,

    /// C compiler used to build the header probe
    #[arg(long)]
    cc: Option<PathBuf>,

    /// Additional include directory searched before the system headers
    #[arg(short = 'I', long = "include")]
    include: Vec<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Rust)]
    format: OutputFormat,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
fn bindings() -> anyhow::Result<Box<dyn Oracle>> {
    Ok(Box::new(abigen_host::KvmBindings))
}

#[cfg(not(all(target_os = "linux", target_arch = "x86_64")))]
fn bindings() -> anyhow::Result<Box<dyn Oracle>> {
    Err(anyhow::anyhow!(
        "kvm-bindings are only available on x86_64 Linux"
    ))
}

fn oracle(args: &Args) -> anyhow::Result<Box<dyn Oracle>> {
    if let Some(path) = &args.table {
        log::debug!("loading platform table {}", path.display());
        return Ok(Box::new(PlatformTable::from_path(path)?));
    }
    if args.bindings {
        return bindings();
    }

    let mut cfg = ConfigBuilder::new().include_dirs(args.include.iter().cloned());
    if let Some(cc) = &args.cc {
        cfg = cfg.compiler(cc.clone());
    }
    Ok(Box::new(HostHeaders::new(cfg)))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // logging
    let mut log_builder = env_logger::Builder::from_default_env();
    match args.verbose {
        true => log_builder.filter_level(log::LevelFilter::Debug),
        false => log_builder.filter_level(log::LevelFilter::Info),
    }
    .init();

    let oracle = oracle(&args)?;
    let generated = generate(&oracle, &Catalog::kvm())?;
    // nothing is written unless every value resolved
    let text = render::render(&generated, args.format.into())?;

    match &args.output {
        Some(path) => {
            fs::write(path, &text)?;
            log::info!(
                "{} statements from {} written to {}",
                generated.statements.len(),
                generated.source,
                path.display()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}
