//! Argument type inference.
//!
//! Classifies a raw argument expression into the small semantic type domain
//! used for call-site checking. Inference is intentionally shallow: anything
//! without direct evidence is `Unknown`, and unknown never produces a
//! finding.

use std::collections::BTreeMap;
use std::fmt;

/// Semantic type of an argument or declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    String,
    Int,
    Bool,
    Address,
    Map,
    /// No evidence either way; never flagged.
    Unknown,
}

impl ArgType {
    /// Whether classification produced a definite type.
    pub fn is_known(self) -> bool {
        !matches!(self, ArgType::Unknown)
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArgType::String => "string",
            ArgType::Int => "int",
            ArgType::Bool => "bool",
            ArgType::Address => "address",
            ArgType::Map => "map",
            ArgType::Unknown => "unknown",
        })
    }
}

/// Normalize a declared type name.
///
/// Case-insensitive, with the synonyms the compiler accepts folded to one
/// canonical spelling. Unrecognized names carry no checkable evidence and
/// normalize to `Unknown`.
pub fn normalize_type(name: &str) -> ArgType {
    match name.trim().to_ascii_lowercase().as_str() {
        "string" => ArgType::String,
        "int" | "number" | "integer" => ArgType::Int,
        "bool" | "boolean" => ArgType::Bool,
        "address" => ArgType::Address,
        "map" => ArgType::Map,
        _ => ArgType::Unknown,
    }
}

/// Infer the semantic type of one raw argument expression.
///
/// `local_param_types` maps the enclosing method's parameter names to their
/// declared types. Classification order, first match wins: quoted literal,
/// digit literal, boolean literal, the `ctx.sender` accessor, then a
/// `params.<name>` reference resolved through the enclosing method's
/// declarations.
pub fn infer_arg_type(arg: &str, local_param_types: &BTreeMap<String, String>) -> ArgType {
    let arg = arg.trim();
    if is_quoted(arg) {
        return ArgType::String;
    }
    if !arg.is_empty() && arg.bytes().all(|b| b.is_ascii_digit()) {
        return ArgType::Int;
    }
    if arg == "true" || arg == "false" {
        return ArgType::Bool;
    }
    if field_access(arg, "ctx") == Some("sender") {
        return ArgType::Address;
    }
    if let Some(param) = field_access(arg, "params") {
        return local_param_types
            .get(param)
            .map(|ty| normalize_type(ty))
            .unwrap_or(ArgType::Unknown);
    }
    ArgType::Unknown
}

fn is_quoted(s: &str) -> bool {
    s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"'))
            || (s.starts_with('\'') && s.ends_with('\'')))
}

/// Match `base . field` exactly (whitespace allowed around the dot) and
/// return the field identifier.
fn field_access<'a>(s: &'a str, base: &str) -> Option<&'a str> {
    let rest = s.strip_prefix(base)?;
    let rest = rest.trim_start().strip_prefix('.')?;
    let field = rest.trim_start();
    is_identifier(field).then_some(field)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
