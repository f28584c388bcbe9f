//! Blocking `cardityc` subprocess wrapper.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::project::module_stem;

/// Handle to the external Cardity compiler binary.
///
/// Invocations are blocking call-and-wait. A non-zero exit aborts the run
/// with both captured output streams embedded in the error, since registry
/// integrity cannot be guaranteed past a failed compile.
#[derive(Debug, Clone)]
pub struct Compiler {
    bin: PathBuf,
}

/// Output of compiling one module to its deployable binary form.
#[derive(Debug, Clone)]
pub struct CompiledArtifact {
    /// Path of the `.carc` binary payload.
    pub binary_path: PathBuf,
    /// Path of the interface description written beside the binary.
    pub interface_path: PathBuf,
}

impl Compiler {
    /// Use an explicit compiler binary path.
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        Self { bin: bin.into() }
    }

    /// Resolve the compiler binary: explicit path if given, else the
    /// `CARDITYC` environment variable, else `cardityc` on PATH.
    pub fn resolve(explicit: Option<&Path>) -> Self {
        let bin = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("CARDITYC").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("cardityc"));
        Self { bin }
    }

    /// The resolved compiler binary path.
    pub fn bin(&self) -> &Path {
        &self.bin
    }

    /// Compile one `.car` source to its JSON interface description.
    ///
    /// Returns the path of the written JSON file.
    pub fn compile_interface(&self, car_file: &Path, out_dir: &Path) -> Result<PathBuf> {
        let out_json = out_dir.join(format!("{}.json", module_stem(car_file)?));
        self.run(car_file, "json", &out_json)?;
        Ok(out_json)
    }

    /// Compile one `.car` source to its binary `.carc` payload.
    ///
    /// The compiler writes the module's interface description beside the
    /// binary as `<name>.abi.json`; its absence after a successful compile is
    /// a compiler contract violation and aborts the run.
    pub fn compile_binary(&self, car_file: &Path, out_dir: &Path) -> Result<CompiledArtifact> {
        let stem = module_stem(car_file)?;
        let binary_path = out_dir.join(format!("{stem}.carc"));
        self.run(car_file, "carc", &binary_path)?;

        let interface_path = out_dir.join(format!("{stem}.abi.json"));
        if !interface_path.exists() {
            return Err(anyhow!(
                "Interface description not found for {}: expected {}",
                car_file.display(),
                interface_path.display()
            ));
        }
        Ok(CompiledArtifact {
            binary_path,
            interface_path,
        })
    }

    fn run(&self, car_file: &Path, format: &str, out: &Path) -> Result<()> {
        tracing::debug!(
            compiler = %self.bin.display(),
            source = %car_file.display(),
            format,
            "invoking cardityc"
        );
        let output = Command::new(&self.bin)
            .arg(car_file)
            .args(["--format", format])
            .arg("-o")
            .arg(out)
            .output()
            .with_context(|| {
                format!(
                    "Failed to run '{}'. Is the Cardity compiler installed?",
                    self.bin.display()
                )
            })?;

        if !output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "Compile failed for {}:\n{}\n{}",
                car_file.display(),
                stdout,
                stderr
            ));
        }
        Ok(())
    }
}
