use crate::config::Config;
use crate::oracle::{Oracle, probe};
use crate::{Error, Result, Stage};
use abigen_common::{Catalog, KVM_HEADER, Resolution};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

/// Target triple this crate was built for; the probe is built for the same target.
const TARGET: &str = env!("ABIGEN_TARGET");

/// The kernel headers installed on the build host.
///
/// Resolution compiles a small C program against `<linux/kvm.h>` and runs it. A symbol or record
/// the headers do not define makes the compiler fail, which is reported together with the
/// compiler's own diagnostics.
pub struct HostHeaders {
    cfg: Config,
}

impl Default for HostHeaders {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl HostHeaders {
    pub fn new<CONFIG: Into<Config>>(cfg: CONFIG) -> Self {
        Self { cfg: cfg.into() }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    fn compiler(&self) -> Result<cc::Tool> {
        let mut build = cc::Build::new();
        // stdout carries the generated output, cc must not print cargo directives to it
        build
            .cargo_metadata(false)
            .cargo_warnings(false)
            .emit_rerun_if_env_changed(false)
            .target(TARGET)
            .host(TARGET)
            .opt_level(0)
            .debug(false)
            .warnings(false);
        if let Some(compiler) = &self.cfg.compiler {
            build.compiler(compiler);
        }

        Ok(build.try_get_compiler()?)
    }

    fn build_and_run(&self, dir: &Path, catalog: &Catalog) -> Result<Resolution> {
        let src = dir.join("kvm_probe.c");
        let exe = dir.join("kvm_probe");
        fs::write(&src, probe::source(catalog))?;
        log::debug!("probe source written to {}", src.display());

        let mut cmd = self.compiler()?.to_command();
        for inc in &self.cfg.include_dirs {
            cmd.arg("-I").arg(inc);
        }
        cmd.arg(&src).arg("-o").arg(&exe);
        log::debug!("compiling probe: {:?}", cmd);
        check(Stage::Compile, cmd.output()?)?;

        log::debug!("running probe {}", exe.display());
        let output = check(Stage::Run, Command::new(&exe).output()?)?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        probe::parse(&stdout, &self.describe())
    }
}

/// Turn an unsuccessful child process into an error, logging its diagnostics verbatim.
fn check(stage: Stage, output: Output) -> Result<Output> {
    if output.status.success() {
        return Ok(output);
    }

    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    stderr
        .lines()
        .for_each(|l| log::error!("probe {}: {}", stage, l));

    Err(Error::Probe {
        stage,
        status: output.status.to_string(),
        stderr,
    })
}

impl Oracle for HostHeaders {
    fn describe(&self) -> String {
        let mut desc = format!("host headers <{}> ({})", KVM_HEADER, TARGET);
        for inc in &self.cfg.include_dirs {
            desc.push_str(&format!(" -I {}", inc.display()));
        }
        desc
    }

    fn resolve(&self, catalog: &Catalog) -> Result<Resolution> {
        let res = match &self.cfg.scratch_dir {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                self.build_and_run(dir, catalog)?
            }
            None => {
                let dir = tempfile::Builder::new().prefix("kvm-abigen-").tempdir()?;
                self.build_and_run(dir.path(), catalog)?
            }
        };

        log::debug!("host headers resolved {} values", res.len());
        Ok(res)
    }
}
