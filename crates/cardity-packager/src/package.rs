//! Package manifest assembly.

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use cardity_compiler::{list_car_files, module_stem, Compiler, ProjectConfig};
use cardity_linker::{build_link_unit, validate_unit, LinkFailure, NoModulesFound};
use cardity_types::encoding::base64_encode;
use cardity_types::manifest::{ModuleBundle, PackageManifest, INSCRIPTION_KIND, OP_DEPLOY_PACKAGE};

/// Scratch directory for compiler outputs during packaging.
const PKG_BUILD_DIR: &str = ".cardity_pkg_build";

/// Packaging options.
#[derive(Debug, Clone)]
pub struct PackageOptions {
    /// Embed per-module interfaces and the package-level ABI maps.
    pub include_abi: bool,
}

impl Default for PackageOptions {
    fn default() -> Self {
        Self { include_abi: true }
    }
}

/// Validate, compile and bundle a project into one package manifest.
///
/// The cross-module validator runs over the whole project first; any link
/// error aborts packaging with the full [`LinkFailure`] list. Nothing is
/// written to the output path by this function.
pub fn build_package(
    compiler: &Compiler,
    project_dir: &Path,
    options: &PackageOptions,
) -> Result<PackageManifest> {
    let config = ProjectConfig::load(project_dir);
    let car_files = list_car_files(project_dir, &config)?;
    if car_files.is_empty() {
        return Err(NoModulesFound {
            dir: project_dir.display().to_string(),
        }
        .into());
    }

    let scratch = project_dir.join(PKG_BUILD_DIR);
    if scratch.exists() {
        fs::remove_dir_all(&scratch)
            .with_context(|| format!("Failed to clear {}", scratch.display()))?;
    }

    let unit = build_link_unit(compiler, &car_files, &scratch)?;
    let errors = validate_unit(&unit);
    if !errors.is_empty() {
        return Err(LinkFailure { errors }.into());
    }

    let package_id = config.package_id(project_dir);
    let version = config.package_version();

    let mut modules = Vec::with_capacity(car_files.len());
    let mut package_abi: BTreeMap<String, Value> = BTreeMap::new();
    let mut seen_names = BTreeSet::new();
    for car_file in &car_files {
        let artifact = compiler.compile_binary(car_file, &scratch)?;
        let binary = fs::read(&artifact.binary_path)
            .with_context(|| format!("Failed to read {}", artifact.binary_path.display()))?;
        let interface_text = fs::read_to_string(&artifact.interface_path)
            .with_context(|| format!("Failed to read {}", artifact.interface_path.display()))?;
        let interface: Value = serde_json::from_str(&interface_text).with_context(|| {
            format!(
                "Malformed interface description {}",
                artifact.interface_path.display()
            )
        })?;

        let name = interface
            .get("protocol")
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .unwrap_or(module_stem(car_file)?);

        if binary.is_empty() {
            return Err(anyhow!("Empty binary payload for module '{}'", name));
        }
        if !seen_names.insert(name.clone()) {
            return Err(anyhow!("Duplicate module name '{}' in package", name));
        }

        tracing::debug!(module = %name, bytes = binary.len(), "bundled module");
        if options.include_abi {
            package_abi.insert(name.clone(), interface.clone());
        }
        modules.push(ModuleBundle {
            name,
            binary_base64: base64_encode(&binary),
            interface: options.include_abi.then_some(interface),
        });
    }

    Ok(PackageManifest {
        kind: INSCRIPTION_KIND.to_string(),
        operation: OP_DEPLOY_PACKAGE.to_string(),
        package_id: package_id.clone(),
        package: package_id,
        version,
        modules,
        abi: options.include_abi.then(|| package_abi.clone()),
        package_abi: options.include_abi.then_some(package_abi),
    })
}

/// Default manifest output path for a project.
pub fn default_manifest_path(project_dir: &Path) -> PathBuf {
    project_dir.join("package.inscription.json")
}

/// Write a manifest as pretty-printed JSON.
pub fn write_manifest(path: &Path, manifest: &PackageManifest) -> Result<()> {
    write_pretty_json(path, manifest)
}

pub(crate) fn write_pretty_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).context("serialize JSON")?;
    writer.write_all(b"\n").ok();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_pretty_json_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.json");
        write_pretty_json(&path, &serde_json::json!({ "ok": true })).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"ok\": true"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_default_manifest_path() {
        assert_eq!(
            default_manifest_path(Path::new("/proj")),
            PathBuf::from("/proj/package.inscription.json")
        );
    }
}
