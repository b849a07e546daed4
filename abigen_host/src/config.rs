use std::path::PathBuf;

/// Configuration of the host header probe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub(crate) compiler: Option<PathBuf>,
    pub(crate) include_dirs: Vec<PathBuf>,
    pub(crate) scratch_dir: Option<PathBuf>,
}

impl Config {
    pub fn compiler(&self) -> Option<&PathBuf> {
        self.compiler.as_ref()
    }

    pub fn include_dirs(&self) -> &[PathBuf] {
        &self.include_dirs
    }

    pub fn scratch_dir(&self) -> Option<&PathBuf> {
        self.scratch_dir.as_ref()
    }
}

pub struct ConfigBuilder {
    config: Config,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::default(),
        }
    }

    /// Use the compiler at `path` instead of the one `cc` discovers for the target.
    pub fn compiler<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.compiler = Some(path.into());
        self
    }

    /// Search `dir` for `<linux/kvm.h>` before the system include directories.
    pub fn include_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.include_dirs.push(dir.into());
        self
    }

    pub fn include_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.config
            .include_dirs
            .extend(dirs.into_iter().map(Into::into));
        self
    }

    /// Build the probe inside `dir` and keep it there, instead of a temporary directory.
    pub fn scratch_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.scratch_dir = Some(dir.into());
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl From<ConfigBuilder> for Config {
    fn from(builder: ConfigBuilder) -> Self {
        builder.build()
    }
}
