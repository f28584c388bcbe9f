//! cardity-deploy: link, package and split Cardity contract inscriptions.
//!
//! The pipeline is validate -> compile -> bundle -> (if needed) chunk, with
//! the `cardityc` compiler invoked as an external black box.
//!
//! ## Commands
//!
//! - **check**: cross-module import/using validation for a project
//! - **package**: bundle every module into one `deploy_package` inscription
//! - **split**: chunk an oversized binary into `deploy_part` inscriptions
//! - **join**: reassemble a payload from its part files
//!
//! ## Example usage
//!
//! ```bash
//! # Validate cross-module calls
//! cardity-deploy check ./my_package
//!
//! # Build the deployable manifest
//! cardity-deploy package ./my_package -o package.inscription.json
//!
//! # Split a compiled module for inscription
//! cardity-deploy split build/token.carc my_package Token --max-bytes 50000
//!
//! # Put the parts back together
//! cardity-deploy join token.carc build/token.carc.*.part.json
//! ```
//!
//! Exit codes: 0 success, 1 fatal error, 2 no modules found, 3 validation
//! failed.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use cardity_compiler::{list_car_files, Compiler, ProjectConfig};
use cardity_linker::{build_link_unit, validate_unit, LinkFailure, NoModulesFound};
use cardity_packager::{
    build_package, default_manifest_path, reassemble, split_payload, write_manifest, write_parts,
    PackageOptions,
};
use cardity_types::manifest::{PartEnvelope, DEFAULT_MAX_PART_BYTES, DEFAULT_VERSION};

/// Scratch directory for compiler outputs during a standalone check.
const CHECK_BUILD_DIR: &str = ".cardity_check_build";

#[derive(Parser)]
#[command(
    name = "cardity-deploy",
    author,
    version,
    about = "Link, package and split Cardity contract inscriptions"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path of the cardityc compiler (default: $CARDITYC, then PATH lookup)
    #[arg(long, global = true, value_name = "PATH")]
    compiler: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate cross-module imports and calls for a project
    Check(CheckCmd),

    /// Compile and bundle a project into one package inscription
    Package(PackageCmd),

    /// Split an oversized binary payload into part inscriptions
    Split(SplitCmd),

    /// Reassemble a payload from part inscription files
    Join(JoinCmd),
}

#[derive(Parser, Debug)]
struct CheckCmd {
    /// Project directory containing .car sources
    project_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct PackageCmd {
    /// Project directory containing .car sources
    project_dir: PathBuf,

    /// Output manifest path (default: <project>/package.inscription.json)
    #[arg(short, long, value_name = "PATH")]
    out: Option<PathBuf>,

    /// Leave interface descriptions out of the manifest
    #[arg(long)]
    no_abi: bool,
}

#[derive(Parser, Debug)]
struct SplitCmd {
    /// Binary payload file (.carc)
    file: PathBuf,

    /// Package identity the parts belong to
    package_id: String,

    /// Module name the payload was compiled from
    module: String,

    /// Package version recorded in every part
    #[arg(long, default_value = DEFAULT_VERSION)]
    version: String,

    /// Maximum bytes per part
    #[arg(long, default_value_t = DEFAULT_MAX_PART_BYTES)]
    max_bytes: usize,

    /// Output directory (default: the payload's directory)
    #[arg(short, long, value_name = "DIR")]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct JoinCmd {
    /// Output file for the reassembled payload
    out_file: PathBuf,

    /// Part files (.part.json), in any order
    #[arg(required = true)]
    parts: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let compiler = Compiler::resolve(cli.compiler.as_deref());

    let result = match &cli.command {
        Commands::Check(cmd) => cmd.execute(&compiler),
        Commands::Package(cmd) => cmd.execute(&compiler),
        Commands::Split(cmd) => cmd.execute(),
        Commands::Join(cmd) => cmd.execute(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_and_exit_code(&e),
    }
}

/// Map fatal errors to the exit-code contract shared with the deploy
/// tooling: 2 = no modules found, 3 = validation failed, 1 = anything else.
fn report_and_exit_code(error: &anyhow::Error) -> ExitCode {
    if let Some(failure) = error.downcast_ref::<LinkFailure>() {
        eprintln!("Import/using semantic check failed:");
        for link_error in &failure.errors {
            eprintln!(" - {}", link_error);
        }
        return ExitCode::from(3);
    }
    if let Some(missing) = error.downcast_ref::<NoModulesFound>() {
        eprintln!("{}", missing);
        return ExitCode::from(2);
    }
    eprintln!("Error: {:#}", error);
    ExitCode::from(1)
}

impl CheckCmd {
    fn execute(&self, compiler: &Compiler) -> Result<()> {
        let config = ProjectConfig::load(&self.project_dir);
        let car_files = list_car_files(&self.project_dir, &config)?;
        if car_files.is_empty() {
            return Err(NoModulesFound {
                dir: self.project_dir.display().to_string(),
            }
            .into());
        }

        let scratch = self.project_dir.join(CHECK_BUILD_DIR);
        let unit = build_link_unit(compiler, &car_files, &scratch)?;
        let errors = validate_unit(&unit);
        if !errors.is_empty() {
            return Err(LinkFailure { errors }.into());
        }

        println!(
            "Import/using semantic check passed ({} modules)",
            unit.modules.len()
        );
        Ok(())
    }
}

impl PackageCmd {
    fn execute(&self, compiler: &Compiler) -> Result<()> {
        let options = PackageOptions {
            include_abi: !self.no_abi,
        };
        let manifest = build_package(compiler, &self.project_dir, &options)?;

        let out = self
            .out
            .clone()
            .unwrap_or_else(|| default_manifest_path(&self.project_dir));
        write_manifest(&out, &manifest)?;

        println!(
            "Package inscription generated: {} ({} modules)",
            out.display(),
            manifest.modules.len()
        );
        Ok(())
    }
}

impl SplitCmd {
    fn execute(&self) -> Result<()> {
        let payload = std::fs::read(&self.file)
            .with_context(|| format!("Failed to read {}", self.file.display()))?;
        let parts = split_payload(
            &payload,
            &self.package_id,
            &self.module,
            &self.version,
            self.max_bytes,
        )?;
        if parts.is_empty() {
            println!("Payload is empty; no parts written");
            return Ok(());
        }

        let out_dir = self
            .out
            .clone()
            .or_else(|| {
                self.file
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(Path::to_path_buf)
            })
            .unwrap_or_else(|| PathBuf::from("."));
        let payload_name = self
            .file
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("payload");

        let written = write_parts(&out_dir, payload_name, &parts)?;
        for (path, part) in written.iter().zip(&parts) {
            println!("Wrote {} ({} of {})", path.display(), part.idx, part.total);
        }
        Ok(())
    }
}

impl JoinCmd {
    fn execute(&self) -> Result<()> {
        let mut parts = Vec::with_capacity(self.parts.len());
        for path in &self.parts {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let part: PartEnvelope = serde_json::from_str(&text)
                .with_context(|| format!("Malformed part envelope {}", path.display()))?;
            parts.push(part);
        }

        let payload = reassemble(&parts)?;
        std::fs::write(&self.out_file, &payload)
            .with_context(|| format!("Failed to write {}", self.out_file.display()))?;

        println!(
            "Reassembled {} bytes into {}",
            payload.len(),
            self.out_file.display()
        );
        Ok(())
    }
}
