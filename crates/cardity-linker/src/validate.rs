//! Cross-module call validation.
//!
//! Checks every extracted call site against the registry and collects every
//! violation. Validation is exhaustive, not fail-fast: link errors are meant
//! to be fixed in batches by a human before re-running.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::path::Path;

use crate::alias::AliasTable;
use crate::callsite::{extract_call_sites, CallSite};
use crate::infer::{infer_arg_type, normalize_type};
use crate::registry::{LinkUnit, LoadedModule, MethodSig, ModuleRegistry};

/// Kind of one link violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkErrorKind {
    UnknownAlias,
    UnknownMethod,
    ArityMismatch,
    TypeMismatch,
}

/// One link violation with its module/method context.
#[derive(Debug, Clone)]
pub struct LinkError {
    pub kind: LinkErrorKind,
    /// Base name of the offending source file.
    pub file: String,
    /// Method whose body contains the offending call site.
    pub method: String,
    pub message: String,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.file, self.method, self.message)
    }
}

/// Validation failure carrying the complete error list.
///
/// Built only after every module has been checked, so the caller can report
/// the whole batch at once.
#[derive(Debug)]
pub struct LinkFailure {
    pub errors: Vec<LinkError>,
}

impl fmt::Display for LinkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Import/using semantic check failed:")?;
        for error in &self.errors {
            writeln!(f, " - {}", error)?;
        }
        Ok(())
    }
}

impl Error for LinkFailure {}

/// No `.car` sources were discovered for a project.
#[derive(Debug)]
pub struct NoModulesFound {
    pub dir: String,
}

impl fmt::Display for NoModulesFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No .car files found in {}", self.dir)
    }
}

impl Error for NoModulesFound {}

/// Validate every module of a link unit and return the complete error list.
///
/// An empty list means the link graph is sound.
pub fn validate_unit(unit: &LinkUnit) -> Vec<LinkError> {
    let mut errors = Vec::new();
    for module in &unit.modules {
        validate_module(module, &unit.registry, &mut errors);
    }
    errors
}

fn validate_module(module: &LoadedModule, registry: &ModuleRegistry, errors: &mut Vec<LinkError>) {
    let aliases = AliasTable::parse(&module.source);
    let file = file_base_name(&module.file);
    for (method_name, def) in &module.interface.cpl.methods {
        let body = def.logic_text();
        if body.is_empty() {
            continue;
        }
        let local_types = def.param_type_map();
        for site in extract_call_sites(&body) {
            check_call_site(
                &file,
                method_name,
                &site,
                &aliases,
                registry,
                &local_types,
                errors,
            );
        }
    }
}

/// Run the per-call-site checks in order. A missing module or method
/// suppresses the later checks for that site, since no signature exists to
/// check against; an arity mismatch suppresses the type check for the same
/// reason.
fn check_call_site(
    file: &str,
    method: &str,
    site: &CallSite,
    aliases: &AliasTable,
    registry: &ModuleRegistry,
    local_types: &BTreeMap<String, String>,
    errors: &mut Vec<LinkError>,
) {
    let module_name = aliases.resolve(&site.alias);

    let Some(target) = registry.module(module_name) else {
        errors.push(LinkError {
            kind: LinkErrorKind::UnknownAlias,
            file: file.to_string(),
            method: method.to_string(),
            message: format!(
                "Unknown module alias '{}' -> '{}'",
                site.alias, module_name
            ),
        });
        return;
    };

    let Some(sig) = target.get(&site.method) else {
        errors.push(LinkError {
            kind: LinkErrorKind::UnknownMethod,
            file: file.to_string(),
            method: method.to_string(),
            message: format!("Unknown method '{}.{}'", module_name, site.method),
        });
        return;
    };

    if sig.param_count != site.arg_count() {
        errors.push(LinkError {
            kind: LinkErrorKind::ArityMismatch,
            file: file.to_string(),
            method: method.to_string(),
            message: format!(
                "Argument count mismatch for '{}.{}' (expected {}, got {})",
                module_name,
                site.method,
                sig.param_count,
                site.arg_count()
            ),
        });
        return;
    }

    check_argument_types(file, method, site, module_name, sig, local_types, errors);
}

/// Type-check argument positions, only when the target declares one type per
/// parameter. Indeterminate inferred types are never flagged; absence of
/// evidence is not evidence of error.
fn check_argument_types(
    file: &str,
    method: &str,
    site: &CallSite,
    module_name: &str,
    sig: &MethodSig,
    local_types: &BTreeMap<String, String>,
    errors: &mut Vec<LinkError>,
) {
    if sig.param_types.len() != sig.param_count {
        return;
    }
    for (position, (declared, arg)) in sig.param_types.iter().zip(&site.args).enumerate() {
        let want = normalize_type(declared);
        if !want.is_known() {
            continue;
        }
        let have = infer_arg_type(arg, local_types);
        if have.is_known() && have != want {
            errors.push(LinkError {
                kind: LinkErrorKind::TypeMismatch,
                file: file.to_string(),
                method: method.to_string(),
                message: format!(
                    "Type mismatch for '{}.{}' arg{} (expected {}, got {})",
                    module_name,
                    site.method,
                    position + 1,
                    want,
                    have
                ),
            });
        }
    }
}

fn file_base_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{LinkUnit, LoadedModule, ModuleRegistry};
    use cardity_types::interface::ModuleInterface;
    use std::path::PathBuf;

    fn module(name: &str, file: &str, source: &str, interface: serde_json::Value) -> LoadedModule {
        LoadedModule {
            file: PathBuf::from(file),
            name: name.to_string(),
            source: source.to_string(),
            interface: serde_json::from_value::<ModuleInterface>(interface).unwrap(),
        }
    }

    /// Unit with a `Token` module exporting `greet(name: string)` and a
    /// caller module whose single `main` method has the given body.
    fn unit_with_caller(caller_source: &str, caller_body: &str) -> LinkUnit {
        let token = module(
            "Token",
            "/proj/token.car",
            "protocol Token {}",
            serde_json::json!({
                "protocol": "Token",
                "cpl": { "methods": {
                    "greet": { "params": ["name"], "param_types": ["string"], "logic": "" }
                } }
            }),
        );
        let caller = module(
            "App",
            "/proj/app.car",
            caller_source,
            serde_json::json!({
                "protocol": "App",
                "cpl": { "methods": {
                    "main": { "params": [], "param_types": [], "logic": caller_body }
                } }
            }),
        );

        let mut registry = ModuleRegistry::default();
        registry.insert("Token", &token.interface);
        registry.insert("App", &caller.interface);
        LinkUnit {
            registry,
            modules: vec![token, caller],
        }
    }

    #[test]
    fn test_valid_call_produces_no_errors() {
        let unit = unit_with_caller("using Token as g;", r#"g.greet("hi")"#);
        assert!(validate_unit(&unit).is_empty());
    }

    #[test]
    fn test_unknown_alias() {
        let unit = unit_with_caller("", "nope.greet(1)");
        let errors = validate_unit(&unit);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, LinkErrorKind::UnknownAlias);
        assert_eq!(errors[0].file, "app.car");
        assert_eq!(errors[0].method, "main");
        assert!(errors[0]
            .message
            .contains("Unknown module alias 'nope' -> 'nope'"));
    }

    #[test]
    fn test_unknown_method() {
        let unit = unit_with_caller("using Token as g;", "g.unknown_method()");
        let errors = validate_unit(&unit);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, LinkErrorKind::UnknownMethod);
        assert!(errors[0]
            .message
            .contains("Unknown method 'Token.unknown_method'"));
    }

    #[test]
    fn test_arity_mismatch_suppresses_type_check() {
        let unit = unit_with_caller("using Token as g;", "g.greet(1, 2)");
        let errors = validate_unit(&unit);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, LinkErrorKind::ArityMismatch);
        assert!(errors[0].message.contains("(expected 1, got 2)"));
    }

    #[test]
    fn test_type_mismatch_names_position() {
        let unit = unit_with_caller("using Token as g;", "g.greet(123)");
        let errors = validate_unit(&unit);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, LinkErrorKind::TypeMismatch);
        assert!(errors[0]
            .message
            .contains("Type mismatch for 'Token.greet' arg1 (expected string, got int)"));
    }

    #[test]
    fn test_unknown_inferred_type_never_flagged() {
        let unit = unit_with_caller("using Token as g;", "g.greet(state.name)");
        assert!(validate_unit(&unit).is_empty());
    }

    #[test]
    fn test_unaliased_identity_lookup() {
        // No using declaration at all: the raw alias text is the module name.
        let unit = unit_with_caller("", r#"Token.greet("hi")"#);
        assert!(validate_unit(&unit).is_empty());
    }

    #[test]
    fn test_partially_declared_types_skip_type_check() {
        let target = module(
            "Vault",
            "/proj/vault.car",
            "protocol Vault {}",
            serde_json::json!({
                "protocol": "Vault",
                "cpl": { "methods": {
                    // Two params, one declared type: not fully declared.
                    "lock": { "params": ["owner", "amount"], "param_types": ["address"], "logic": "" }
                } }
            }),
        );
        let caller = module(
            "App",
            "/proj/app.car",
            "using Vault as v;",
            serde_json::json!({
                "protocol": "App",
                "cpl": { "methods": {
                    "main": { "params": [], "param_types": [], "logic": "v.lock(1, 2)" }
                } }
            }),
        );
        let mut registry = ModuleRegistry::default();
        registry.insert("Vault", &target.interface);
        registry.insert("App", &caller.interface);
        let unit = LinkUnit {
            registry,
            modules: vec![target, caller],
        };

        assert!(validate_unit(&unit).is_empty());
    }

    #[test]
    fn test_all_call_sites_collected() {
        let body = "g.greet(123); g.unknown_method(); nope.x(1)";
        let unit = unit_with_caller("using Token as g;", body);
        let errors = validate_unit(&unit);
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].kind, LinkErrorKind::TypeMismatch);
        assert_eq!(errors[1].kind, LinkErrorKind::UnknownMethod);
        assert_eq!(errors[2].kind, LinkErrorKind::UnknownAlias);
    }

    #[test]
    fn test_param_reference_type_flows_through() {
        // Caller's own declared param type is the evidence for the check.
        let token = module(
            "Token",
            "/proj/token.car",
            "protocol Token {}",
            serde_json::json!({
                "protocol": "Token",
                "cpl": { "methods": {
                    "greet": { "params": ["name"], "param_types": ["string"], "logic": "" }
                } }
            }),
        );
        let caller = module(
            "App",
            "/proj/app.car",
            "using Token as g;",
            serde_json::json!({
                "protocol": "App",
                "cpl": { "methods": {
                    "main": {
                        "params": ["count"],
                        "param_types": ["int"],
                        "logic": "g.greet(params.count)"
                    }
                } }
            }),
        );
        let mut registry = ModuleRegistry::default();
        registry.insert("Token", &token.interface);
        registry.insert("App", &caller.interface);
        let unit = LinkUnit {
            registry,
            modules: vec![token, caller],
        };

        let errors = validate_unit(&unit);
        assert_eq!(errors.len(), 1);
        assert!(errors[0]
            .message
            .contains("arg1 (expected string, got int)"));
    }

    #[test]
    fn test_display_format() {
        let error = LinkError {
            kind: LinkErrorKind::UnknownMethod,
            file: "app.car".to_string(),
            method: "main".to_string(),
            message: "Unknown method 'Token.x'".to_string(),
        };
        assert_eq!(error.to_string(), "app.car:main: Unknown method 'Token.x'");
    }
}
