//! Module interface descriptions produced by `cardityc`.
//!
//! The compiler is consumed as a black box; this is the canonical JSON
//! document it emits with `--format json` (and writes beside a `.carc`
//! binary as `<name>.abi.json`). Only the fields the linker needs are
//! modeled; everything else is ignored on deserialization.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Interface description for one compiled module.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModuleInterface {
    /// Declared protocol (module) name.
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub cpl: CplSection,
}

/// The contract-logic section of an interface description.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CplSection {
    /// Exported methods keyed by name.
    #[serde(default)]
    pub methods: BTreeMap<String, MethodDef>,
}

/// One exported method's description.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MethodDef {
    /// Ordered parameter names.
    #[serde(default)]
    pub params: Vec<String>,
    /// Ordered declared parameter types. May be shorter than `params` when
    /// the source left types off; missing entries count as undeclared.
    #[serde(default)]
    pub param_types: Vec<String>,
    /// Method body text, as one string or a list of lines.
    #[serde(default)]
    pub logic: Option<LogicText>,
}

/// Method body text in either of the compiler's two emission forms.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LogicText {
    Text(String),
    Lines(Vec<String>),
}

impl ModuleInterface {
    /// Canonical module name: the declared protocol, falling back to the
    /// source file's stem.
    pub fn module_name(&self, fallback_stem: &str) -> String {
        self.protocol
            .clone()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| fallback_stem.to_string())
    }
}

impl MethodDef {
    /// The method body as one string; the line-list form is joined with
    /// newlines.
    pub fn logic_text(&self) -> String {
        match &self.logic {
            Some(LogicText::Text(s)) => s.clone(),
            Some(LogicText::Lines(lines)) => lines.join("\n"),
            None => String::new(),
        }
    }

    /// Map parameter name to declared type for positions that carry one.
    ///
    /// Parameters without a declared type map to the empty string.
    pub fn param_type_map(&self) -> BTreeMap<String, String> {
        self.params
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let ty = self.param_types.get(i).cloned().unwrap_or_default();
                (name.clone(), ty)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_logic_string() {
        let iface: ModuleInterface = serde_json::from_value(serde_json::json!({
            "protocol": "Token",
            "cpl": {
                "methods": {
                    "transfer": {
                        "params": ["to", "amount"],
                        "param_types": ["address", "int"],
                        "logic": "state.balance = state.balance - params.amount;"
                    }
                }
            }
        }))
        .unwrap();

        assert_eq!(iface.protocol.as_deref(), Some("Token"));
        let def = &iface.cpl.methods["transfer"];
        assert_eq!(def.params, vec!["to", "amount"]);
        assert!(def.logic_text().contains("state.balance"));
    }

    #[test]
    fn test_deserialize_logic_lines() {
        let iface: ModuleInterface = serde_json::from_value(serde_json::json!({
            "cpl": {
                "methods": {
                    "noop": { "logic": ["line one;", "line two;"] }
                }
            }
        }))
        .unwrap();

        assert_eq!(iface.cpl.methods["noop"].logic_text(), "line one;\nline two;");
    }

    #[test]
    fn test_missing_sections_default() {
        let iface: ModuleInterface = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(iface.protocol.is_none());
        assert!(iface.cpl.methods.is_empty());
        assert_eq!(iface.module_name("fallback"), "fallback");
    }

    #[test]
    fn test_module_name_prefers_protocol() {
        let iface: ModuleInterface =
            serde_json::from_value(serde_json::json!({ "protocol": "Vault" })).unwrap();
        assert_eq!(iface.module_name("vault_src"), "Vault");

        // Empty protocol string falls back to the stem.
        let iface: ModuleInterface =
            serde_json::from_value(serde_json::json!({ "protocol": "" })).unwrap();
        assert_eq!(iface.module_name("vault_src"), "vault_src");
    }

    #[test]
    fn test_param_type_map_short_types() {
        let def: MethodDef = serde_json::from_value(serde_json::json!({
            "params": ["a", "b"],
            "param_types": ["int"]
        }))
        .unwrap();

        let map = def.param_type_map();
        assert_eq!(map["a"], "int");
        assert_eq!(map["b"], "");
    }
}
