//! Whole-program module registry.
//!
//! Every module of the project is compiled to its interface description
//! before any validation starts, so a module may freely call methods of a
//! module discovered later in file order.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use cardity_compiler::{module_stem, Compiler};
use cardity_types::interface::ModuleInterface;

/// Signature of one exported method.
#[derive(Debug, Clone)]
pub struct MethodSig {
    /// Declared parameter count.
    pub param_count: usize,
    /// Declared parameter types; may be shorter than `param_count` when the
    /// interface omits some.
    pub param_types: Vec<String>,
}

/// Global map of canonical module name to exported method signatures.
///
/// Populated once per pipeline run, then read-only.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: BTreeMap<String, BTreeMap<String, MethodSig>>,
}

impl ModuleRegistry {
    /// Record one module's exported methods. A later registration for the
    /// same name replaces the earlier one.
    pub fn insert(&mut self, name: impl Into<String>, interface: &ModuleInterface) {
        let methods = interface
            .cpl
            .methods
            .iter()
            .map(|(method_name, def)| {
                (
                    method_name.clone(),
                    MethodSig {
                        param_count: def.params.len(),
                        param_types: def.param_types.clone(),
                    },
                )
            })
            .collect();
        self.modules.insert(name.into(), methods);
    }

    /// Look up a module's method table by canonical name.
    pub fn module(&self, name: &str) -> Option<&BTreeMap<String, MethodSig>> {
        self.modules.get(name)
    }

    /// Look up one method signature.
    pub fn method(&self, module: &str, method: &str) -> Option<&MethodSig> {
        self.modules.get(module).and_then(|m| m.get(method))
    }

    pub fn contains_module(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// One module loaded for validation.
#[derive(Debug, Clone)]
pub struct LoadedModule {
    /// Path of the `.car` source.
    pub file: PathBuf,
    /// Canonical module name (declared protocol, else file stem).
    pub name: String,
    /// Original source text; alias declarations are read from here.
    pub source: String,
    /// Compiled interface description.
    pub interface: ModuleInterface,
}

/// A project's modules together with the registry built over all of them.
#[derive(Debug, Clone)]
pub struct LinkUnit {
    pub registry: ModuleRegistry,
    pub modules: Vec<LoadedModule>,
}

/// Compile every module's interface and assemble the link unit.
///
/// This is the registry barrier: it completes for all modules before the
/// caller validates any of them. A compiler failure for any module aborts
/// the whole build, since registry integrity cannot be guaranteed.
pub fn build_link_unit(
    compiler: &Compiler,
    car_files: &[PathBuf],
    scratch_dir: &Path,
) -> Result<LinkUnit> {
    fs::create_dir_all(scratch_dir)
        .with_context(|| format!("Failed to create {}", scratch_dir.display()))?;

    let mut registry = ModuleRegistry::default();
    let mut modules = Vec::with_capacity(car_files.len());
    for car_file in car_files {
        let json_path = compiler.compile_interface(car_file, scratch_dir)?;
        let text = fs::read_to_string(&json_path)
            .with_context(|| format!("Failed to read {}", json_path.display()))?;
        let interface: ModuleInterface = serde_json::from_str(&text)
            .with_context(|| format!("Malformed interface description {}", json_path.display()))?;
        let source = fs::read_to_string(car_file)
            .with_context(|| format!("Failed to read {}", car_file.display()))?;

        let name = interface.module_name(&module_stem(car_file)?);
        tracing::debug!(
            module = %name,
            file = %car_file.display(),
            methods = interface.cpl.methods.len(),
            "registered module"
        );
        registry.insert(&name, &interface);
        modules.push(LoadedModule {
            file: car_file.clone(),
            name,
            source,
            interface,
        });
    }

    Ok(LinkUnit { registry, modules })
}
